#![allow(clippy::collapsible_if)]

mod catalog;
mod cli;
mod config;
mod context;
mod device;
mod dispatch;
mod keymap;
mod midi;
mod piano;
mod select;
mod ui;

use std::io::Write;
use std::time::SystemTime;

use clap::Parser;
use cli::Cli;
use config::Settings;
use device::MidiDevice;
use dispatch::Dispatcher;
use midi::MidiSink;
use piano::Piano;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.list {
        env_logger::init();
        return device::list_ports();
    }

    log::set_logger(&RAW_MODE_LOGGER).ok();
    log::set_max_level(
        std::env::var("RUST_LOG")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(log::LevelFilter::Info),
    );

    // Bad configuration is reported before anything is opened.
    let file = config::discover(cli.config.as_deref())?;
    let settings = Settings::resolve(&cli, file)?;

    play(settings)
}

/// Custom logger that writes to stderr with \r\n line endings for raw mode.
struct RawModeLogger;

impl log::Log for RawModeLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let now = SystemTime::now()
                .duration_since(SystemTime::UNIX_EPOCH)
                .unwrap_or_default();
            let secs = now.as_secs() % 86400; // time of day
            let h = secs / 3600;
            let m = (secs % 3600) / 60;
            let s = secs % 60;
            let ms = now.subsec_millis();
            let _ = write!(
                std::io::stderr(),
                "[{h:02}:{m:02}:{s:02}.{ms:03} {}] {}\r\n",
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static RAW_MODE_LOGGER: RawModeLogger = RawModeLogger;

fn play(settings: Settings) -> anyhow::Result<()> {
    let mut device = if settings.virtual_port {
        MidiDevice::open_virtual()?
    } else {
        MidiDevice::open(settings.port.as_deref())?
    };

    let piano = Piano::new(settings.keymap, settings.velocity);
    let mut dispatcher = Dispatcher::new(piano, settings.context);

    if let Err(e) = device.send(dispatcher.context().program_change()) {
        shutdown(None, &mut dispatcher, device);
        return Err(e);
    }

    let mut screen = match ui::Screen::enter() {
        Ok(s) => s,
        Err(e) => {
            shutdown(None, &mut dispatcher, device);
            return Err(e);
        }
    };

    log::info!("Playing on {}. Ctrl+Q to quit.", device.name());
    let result = ui::event_loop(&mut screen, &mut dispatcher, &mut device);

    shutdown(Some(screen), &mut dispatcher, device);
    result
}

/// The one exit path once the device is open: silence held notes, give the
/// terminal back, close the port.
fn shutdown(screen: Option<ui::Screen>, dispatcher: &mut Dispatcher, mut device: MidiDevice) {
    let held = dispatcher.piano().held_count();
    if held > 0 {
        log::debug!("Releasing {held} held key(s)");
    }
    let failed = dispatcher.all_notes_off(&mut device);
    if failed > 0 {
        log::warn!("Failed to release {failed} held note(s)");
    }
    if let Some(screen) = screen {
        screen.leave();
    }
    log::info!("Stopping...");
    device.close();
}
