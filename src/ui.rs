use std::io;

use crossterm::event::{
    self, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use view::{InstrumentGrid, Keyboard, PianoKey, Prompt, StatusBar, centered_rect};

use crate::catalog;
use crate::dispatch::{Dispatcher, Mode, Outcome};
use crate::midi::MidiSink;
use crate::piano::Piano;

const HINT: &str = "^K/^J octave  ^L/^H channel  ^I instrument  ^Q quit";

/// The terminal while it is in raw mode on the alternate screen.
pub struct Screen {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    catalog: Vec<String>,
    prev_log_level: log::LevelFilter,
}

impl Screen {
    /// Take over the terminal. Fails if the terminal cannot report key
    /// releases, since notes would never stop.
    pub fn enter() -> anyhow::Result<Self> {
        // Must be probed before entering raw mode.
        let kitty_supported = crossterm::terminal::supports_keyboard_enhancement().unwrap_or(false);
        if !kitty_supported {
            anyhow::bail!(
                "Terminal does not support the Kitty keyboard protocol; \
                 key releases cannot be detected (try kitty, foot, WezTerm or Alacritty)"
            );
        }

        crossterm::terminal::enable_raw_mode()?;
        let terminal = match Self::setup() {
            Ok(t) => t,
            Err(e) => {
                restore_terminal(&mut io::stdout());
                return Err(e);
            }
        };
        log::info!("Kitty keyboard protocol enabled (press/release detection active)");

        // When stderr is redirected (e.g. `svmidi 2> debug.log`), keep logging.
        // When it is the terminal, logging would corrupt the screen.
        let prev_log_level = log::max_level();
        if io::IsTerminal::is_terminal(&io::stderr()) {
            log::set_max_level(log::LevelFilter::Off);
        }

        Ok(Screen {
            terminal,
            catalog: catalog::entries(),
            prev_log_level,
        })
    }

    fn setup() -> anyhow::Result<Terminal<CrosstermBackend<io::Stdout>>> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            EnterAlternateScreen,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                    | KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
            )
        )?;
        Ok(Terminal::new(CrosstermBackend::new(stdout))?)
    }

    pub fn draw(&mut self, d: &Dispatcher) -> io::Result<()> {
        let catalog = &self.catalog;
        self.terminal.draw(|frame| render(frame, d, catalog))?;
        Ok(())
    }

    /// Give the terminal back.
    pub fn leave(mut self) {
        log::set_max_level(self.prev_log_level);
        restore_terminal(self.terminal.backend_mut());
        if let Err(e) = self.terminal.show_cursor() {
            log::warn!("Failed to show cursor: {e}");
        }
    }
}

fn restore_terminal<W: io::Write>(out: &mut W) {
    if let Err(e) = execute!(out, PopKeyboardEnhancementFlags, LeaveAlternateScreen) {
        log::warn!("Failed to restore terminal: {e}");
    }
    if let Err(e) = crossterm::terminal::disable_raw_mode() {
        log::warn!("Failed to leave raw mode: {e}");
    }
}

/// Block on terminal input, feeding every event to the dispatcher until it
/// asks to quit.
pub fn event_loop(
    screen: &mut Screen,
    dispatcher: &mut Dispatcher,
    sink: &mut dyn MidiSink,
) -> anyhow::Result<()> {
    screen.draw(dispatcher)?;
    loop {
        let ev = event::read()?;
        match dispatcher.handle(&ev, sink) {
            Outcome::Quit => break,
            Outcome::Redraw => screen.draw(dispatcher)?,
            Outcome::Unchanged => {}
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

fn render(frame: &mut ratatui::Frame, d: &Dispatcher, catalog: &[String]) {
    let area = frame.area();
    match d.mode() {
        Mode::Normal => render_piano(frame, area, d),
        Mode::InstrumentSelect(buffer) => {
            let [grid_area, prompt_area] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
            let typed = (!buffer.is_empty()).then(|| buffer.value() as usize);
            frame.render_widget(InstrumentGrid::new(catalog).highlight(typed), grid_area);
            frame.render_widget(Prompt::new("> ", buffer.as_str()), prompt_area);
        }
        Mode::InvalidInstrument { entered } => {
            let [grid_area, _] =
                Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(area);
            frame.render_widget(
                InstrumentGrid::new(catalog).style(Style::default().fg(Color::DarkGray)),
                grid_area,
            );
            render_error_popup(frame, area, *entered);
        }
    }
}

fn render_piano(frame: &mut ratatui::Frame, area: Rect, d: &Dispatcher) {
    let [status_area, _, keys_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Fill(1),
    ])
    .areas(area);

    let ctx = d.context();
    let fields = [
        ("octave", ctx.octave().to_string()),
        ("channel", ctx.channel().to_string()),
        (
            "instrument",
            format!("{} - {}", ctx.instrument(), catalog::name(ctx.instrument())),
        ),
    ];
    frame.render_widget(StatusBar::new(&fields).hint(HINT), status_area);

    let (naturals, sharps) = piano_keys(d.piano());
    frame.render_widget(Keyboard::new(&naturals, &sharps), keys_area);
}

fn render_error_popup(frame: &mut ratatui::Frame, area: Rect, entered: u32) {
    let text = format!("ERROR: number out of range ({entered})\n\npress any key");
    let popup = centered_rect(40, 6, area);
    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Instrument ")
        .border_style(Style::default().fg(Color::Red));
    frame.render_widget(
        Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)),
        popup,
    );
}

/// Drawable keys in layout order. Each sharp is attached to the natural a
/// semitone below it; sharps without one are not drawn.
fn piano_keys(piano: &Piano) -> (Vec<PianoKey>, Vec<(usize, PianoKey)>) {
    let keymap = piano.keymap();
    let naturals: Vec<PianoKey> = keymap
        .naturals()
        .map(|(id, b)| PianoKey {
            label: b.symbol,
            pressed: piano.is_pressed(id),
        })
        .collect();

    let sharps = keymap
        .sharps()
        .filter_map(|(id, b)| {
            let below = b.note.checked_sub(1)?;
            let after = keymap.naturals().position(|(_, n)| n.note == below)?;
            Some((
                after,
                PianoKey {
                    label: b.symbol,
                    pressed: piano.is_pressed(id),
                },
            ))
        })
        .collect();

    (naturals, sharps)
}
