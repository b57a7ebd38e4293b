use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Cli;
use crate::context::PerformanceContext;
use crate::keymap::{DEFAULT_NATURALS, DEFAULT_SHARPS, KeyMap};

const DEFAULT_OCTAVE: i64 = 4;
const DEFAULT_CHANNEL: i64 = 0;
const DEFAULT_INSTRUMENT: i64 = 0;
const DEFAULT_VELOCITY: i64 = 100;

/// Contents of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub octave: Option<i64>,
    pub channel: Option<i64>,
    pub instrument: Option<i64>,
    pub velocity: Option<i64>,
    pub port: Option<String>,
    pub layout: Option<LayoutConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub natural: Vec<KeyConfig>,
    pub sharp: Vec<KeyConfig>,
}

#[derive(Debug, Deserialize)]
pub struct KeyConfig {
    pub key: char,
    pub note: u8,
}

pub fn load(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {e}", path.display()))?;
    toml::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid config {}: {e}", path.display()))
}

/// `$XDG_CONFIG_HOME/svmidi/config.toml`, falling back to `~/.config`.
pub fn default_path() -> Option<PathBuf> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
    Some(base.join("svmidi").join("config.toml"))
}

/// Load an explicitly named config file, or the default one if it exists.
pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return load(path);
    }
    match default_path() {
        Some(path) if path.is_file() => {
            log::info!("Using config {}", path.display());
            load(&path)
        }
        _ => Ok(Config::default()),
    }
}

/// Validated startup parameters.
#[derive(Debug)]
pub struct Settings {
    pub context: PerformanceContext,
    pub keymap: KeyMap,
    pub velocity: u8,
    pub port: Option<String>,
    pub virtual_port: bool,
}

impl Settings {
    /// Merge command line over config file over defaults, checking every
    /// range before anything is opened.
    pub fn resolve(cli: &Cli, file: Config) -> anyhow::Result<Self> {
        let octave = cli.octave.or(file.octave).unwrap_or(DEFAULT_OCTAVE);
        let channel = cli.channel.or(file.channel).unwrap_or(DEFAULT_CHANNEL);
        let instrument = cli.instrument.or(file.instrument).unwrap_or(DEFAULT_INSTRUMENT);
        let velocity = file.velocity.unwrap_or(DEFAULT_VELOCITY);

        let context = PerformanceContext::new(
            narrow("Octave", octave)?,
            narrow("Channel", channel)?,
            narrow("Instrument", instrument)?,
        )?;

        let velocity: u8 = narrow("Velocity", velocity)?;
        if velocity > 127 {
            anyhow::bail!("Velocity {velocity} out of range (0..=127)");
        }

        let keymap = match file.layout {
            Some(layout) => {
                let pairs = |keys: &[KeyConfig]| -> Vec<(char, u8)> {
                    keys.iter().map(|k| (k.key, k.note)).collect()
                };
                KeyMap::new(&pairs(&layout.natural), &pairs(&layout.sharp))?
            }
            None => KeyMap::new(DEFAULT_NATURALS, DEFAULT_SHARPS)?,
        };

        Ok(Settings {
            context,
            keymap,
            velocity,
            port: cli.port.clone().or(file.port),
            virtual_port: cli.virtual_port,
        })
    }
}

fn narrow<T: TryFrom<i64>>(what: &str, value: i64) -> anyhow::Result<T> {
    T::try_from(value).map_err(|_| anyhow::anyhow!("{what} {value} out of range"))
}
