//! MIDI output sinks.
//!
//! The conductor writes every message through a [`MidiSink`]. A real port is
//! backed by midir; when no port can be opened the [`NullSink`] swallows
//! messages so the mapping, lane state, and audio buses keep working without
//! MIDI hardware.

use midir::{MidiOutput, MidiOutputConnection};
use tracing::{debug, info, warn};

use super::midi::MidiEvent;
use crate::error::{ConductorError, Result};

/// Client name registered with the system MIDI service.
pub const CLIENT_NAME: &str = "lane_conductor";

/// Port-name fragments preferred when picking an output (case-insensitive).
pub const DEFAULT_OUTPUT_HINTS: &[&str] = &["IAC", "loopMIDI", "Ableton", "DAW", "Bus 1"];

/// Port-name fragments preferred when picking a feedback input.
pub const DEFAULT_INPUT_HINTS: &[&str] = &["From Ableton", "from DAW", "to Browser", "IAC", "loopMIDI"];

pub trait MidiSink: Send {
    fn send(&mut self, event: &MidiEvent);

    /// Human-readable port name, `None` for sinks without a device.
    fn port_name(&self) -> Option<&str> {
        None
    }
}

impl<S: MidiSink + ?Sized> MidiSink for Box<S> {
    fn send(&mut self, event: &MidiEvent) {
        (**self).send(event)
    }

    fn port_name(&self) -> Option<&str> {
        (**self).port_name()
    }
}

// ── midir backend ─────────────────────────────────────────────────────────

pub struct MidirSink {
    conn: MidiOutputConnection,
    name: String,
}

impl MidiSink for MidirSink {
    fn send(&mut self, event: &MidiEvent) {
        let (bytes, len) = event.to_bytes();
        if let Err(e) = self.conn.send(&bytes[..len]) {
            warn!(port = %self.name, error = %e, "MIDI send failed");
        }
    }

    fn port_name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

// ── null backend (no device attached) ─────────────────────────────────────

/// Discards messages. Warns once on the first message so a missing device
/// shows up in the log without flooding it.
#[derive(Debug, Default)]
pub struct NullSink {
    warned: bool,
    dropped: u64,
}

impl NullSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages discarded so far.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl MidiSink for NullSink {
    fn send(&mut self, event: &MidiEvent) {
        if !self.warned {
            warn!("no MIDI output attached; dropping messages");
            self.warned = true;
        }
        self.dropped += 1;
        debug!(?event, "dropped");
    }
}

// ── in-memory backend ─────────────────────────────────────────────────────

/// Records every message in order. Handy for dry runs and tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub events: Vec<MidiEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the recorded messages, leaving the sink empty.
    pub fn drain(&mut self) -> Vec<MidiEvent> {
        std::mem::take(&mut self.events)
    }
}

impl MidiSink for MemorySink {
    fn send(&mut self, event: &MidiEvent) {
        self.events.push(*event);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Port selection
// ════════════════════════════════════════════════════════════════════════════

/// Index of the first name containing any hint, else the first port.
pub fn pick_port(names: &[String], hints: &[String]) -> Option<usize> {
    if names.is_empty() {
        return None;
    }
    let found = names.iter().position(|name| {
        let name = name.to_lowercase();
        hints
            .iter()
            .any(|hint| !hint.is_empty() && name.contains(&hint.to_lowercase()))
    });
    Some(found.unwrap_or(0))
}

/// Connect to an output port chosen by [`pick_port`].
pub fn connect_output(hints: &[String]) -> Result<MidirSink> {
    let midi_out = MidiOutput::new(CLIENT_NAME)?;
    let ports = midi_out.ports();
    let names: Vec<String> = ports
        .iter()
        .map(|p| midi_out.port_name(p).unwrap_or_else(|_| "Unknown".to_string()))
        .collect();

    let idx = pick_port(&names, hints).ok_or(ConductorError::NoMidiPort { direction: "output" })?;
    let name = names[idx].clone();
    let conn = midi_out
        .connect(&ports[idx], "lane-conductor-out")
        .map_err(|e| ConductorError::MidiConnect(e.to_string()))?;

    info!(port = %name, "opened MIDI output");
    Ok(MidirSink { conn, name })
}

/// Open the best available output, falling back to [`NullSink`].
pub fn open_output(hints: &[String]) -> Box<dyn MidiSink> {
    match connect_output(hints) {
        Ok(sink) => Box::new(sink),
        Err(e) => {
            warn!(error = %e, "MIDI output unavailable; continuing without MIDI");
            Box::new(NullSink::new())
        }
    }
}
