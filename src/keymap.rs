use crossterm::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    Natural,
    Sharp,
}

/// One physical key bound to a note relative to the current octave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub symbol: char,
    pub note: u8,
    pub class: KeyClass,
}

/// Index of a binding inside its [`KeyMap`].
pub type BindingId = usize;

/// Two rows of a QWERTY keyboard: the lower row starts at C, the upper row
/// continues one octave higher.
pub const DEFAULT_NATURALS: &[(char, u8)] = &[
    ('z', 0),
    ('x', 2),
    ('c', 4),
    ('v', 5),
    ('b', 7),
    ('n', 9),
    ('m', 11),
    ('q', 12),
    ('w', 14),
    ('e', 16),
    ('r', 17),
    ('t', 19),
    ('y', 21),
    ('u', 23),
    ('i', 24),
    ('o', 26),
    ('p', 28),
];

pub const DEFAULT_SHARPS: &[(char, u8)] = &[
    ('s', 1),
    ('d', 3),
    ('g', 6),
    ('h', 8),
    ('j', 10),
    ('2', 13),
    ('3', 15),
    ('5', 18),
    ('6', 20),
    ('7', 22),
    ('9', 25),
    ('0', 27),
];

/// Immutable keyboard layout. Naturals come first, in layout order,
/// followed by sharps.
#[derive(Debug, Clone)]
pub struct KeyMap {
    bindings: Vec<KeyBinding>,
}

impl Default for KeyMap {
    fn default() -> Self {
        KeyMap::from_rows(DEFAULT_NATURALS, DEFAULT_SHARPS)
    }
}

impl KeyMap {
    /// Build a layout, rejecting duplicate symbols and notes above 127.
    pub fn new(naturals: &[(char, u8)], sharps: &[(char, u8)]) -> anyhow::Result<Self> {
        if naturals.is_empty() && sharps.is_empty() {
            anyhow::bail!("Keyboard layout has no keys");
        }

        let map = KeyMap::from_rows(naturals, sharps);
        for (i, b) in map.bindings.iter().enumerate() {
            if b.note > 127 {
                anyhow::bail!("Key '{}' is bound to note {} (max 127)", b.symbol, b.note);
            }
            if map.bindings[..i].iter().any(|prev| prev.symbol == b.symbol) {
                anyhow::bail!("Key '{}' is bound more than once", b.symbol);
            }
        }
        Ok(map)
    }

    fn from_rows(naturals: &[(char, u8)], sharps: &[(char, u8)]) -> Self {
        let row = |keys: &[(char, u8)], class: KeyClass| {
            keys.iter()
                .map(move |&(symbol, note)| KeyBinding {
                    symbol: symbol.to_ascii_lowercase(),
                    note,
                    class,
                })
                .collect::<Vec<_>>()
        };
        let mut bindings = row(naturals, KeyClass::Natural);
        bindings.extend(row(sharps, KeyClass::Sharp));

        KeyMap { bindings }
    }

    /// Find the binding for a key code. Letters match regardless of case.
    pub fn lookup(&self, code: KeyCode) -> Option<BindingId> {
        let KeyCode::Char(ch) = code else {
            return None;
        };
        let ch = ch.to_ascii_lowercase();
        self.bindings.iter().position(|b| b.symbol == ch)
    }

    pub fn get(&self, id: BindingId) -> Option<&KeyBinding> {
        self.bindings.get(id)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Natural keys with their binding ids, in layout order.
    pub fn naturals(&self) -> impl Iterator<Item = (BindingId, &KeyBinding)> {
        self.of_class(KeyClass::Natural)
    }

    /// Sharp keys with their binding ids, in layout order.
    pub fn sharps(&self) -> impl Iterator<Item = (BindingId, &KeyBinding)> {
        self.of_class(KeyClass::Sharp)
    }

    fn of_class(&self, class: KeyClass) -> impl Iterator<Item = (BindingId, &KeyBinding)> {
        self.bindings
            .iter()
            .enumerate()
            .filter(move |(_, b)| b.class == class)
    }
}
