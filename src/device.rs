use midir::{MidiOutput, MidiOutputConnection};

use crate::midi::{MidiMessage, MidiSink};

const CLIENT_NAME: &str = "svmidi";

/// An open connection to a MIDI output port.
pub struct MidiDevice {
    name: String,
    conn: MidiOutputConnection,
}

impl MidiDevice {
    /// Connect to the first output port whose name contains `filter`
    /// (or the first port at all when no filter is given).
    pub fn open(filter: Option<&str>) -> anyhow::Result<Self> {
        let midi_out = MidiOutput::new(CLIENT_NAME)?;
        let ports = midi_out.ports();

        let mut chosen = None;
        for port in &ports {
            let name = match midi_out.port_name(port) {
                Ok(n) => n,
                Err(_) => continue,
            };

            if let Some(filter) = filter {
                if !name.contains(filter) {
                    log::debug!("Skipping MIDI output {name} (filter {filter:?})");
                    continue;
                }
            }

            chosen = Some((port.clone(), name));
            break;
        }

        let Some((port, name)) = chosen else {
            match filter {
                Some(f) => anyhow::bail!("No MIDI output port matching {f:?} (try --list)"),
                None => anyhow::bail!("No MIDI output ports available"),
            }
        };

        let conn = midi_out
            .connect(&port, "svmidi-out")
            .map_err(|e| anyhow::anyhow!("Failed to open MIDI output {name}: {e}"))?;
        log::info!("Opened MIDI output: {name}");

        Ok(MidiDevice { name, conn })
    }

    /// Create a virtual output port other applications can subscribe to.
    #[cfg(unix)]
    pub fn open_virtual() -> anyhow::Result<Self> {
        use midir::os::unix::VirtualOutput;

        let midi_out = MidiOutput::new(CLIENT_NAME)?;
        let conn = midi_out
            .create_virtual("out")
            .map_err(|e| anyhow::anyhow!("Failed to create virtual MIDI output: {e}"))?;
        let name = format!("{CLIENT_NAME}:out");
        log::info!("Created virtual MIDI output: {name}");

        Ok(MidiDevice { name, conn })
    }

    #[cfg(not(unix))]
    pub fn open_virtual() -> anyhow::Result<Self> {
        anyhow::bail!("Virtual MIDI ports are not supported on this platform")
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn close(self) {
        self.conn.close();
        log::info!("Closed MIDI output: {}", self.name);
    }
}

impl MidiSink for MidiDevice {
    fn send(&mut self, msg: MidiMessage) -> anyhow::Result<()> {
        let bytes = msg.encode();
        log::debug!("MIDI out [{}] {msg} data={:02x?}", self.name, bytes.as_ref());
        self.conn
            .send(bytes.as_ref())
            .map_err(|e| anyhow::anyhow!("MIDI send to {} failed: {e}", self.name))
    }
}

/// Print every MIDI output port to stdout.
pub fn list_ports() -> anyhow::Result<()> {
    println!("=== MIDI Output Devices ===");
    let midi_out = MidiOutput::new("svmidi-enumerate")?;
    let ports = midi_out.ports();
    if ports.is_empty() {
        println!("  (none found)");
    }
    for port in &ports {
        let name = midi_out.port_name(port).unwrap_or_else(|_| "Unknown".into());
        println!("  {name}");
    }
    Ok(())
}
