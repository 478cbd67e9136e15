//! MIDI input feedback.
//!
//! A DAW can echo notes and pan back to the conductor; incoming messages
//! are parsed on midir's callback thread and handed to the UI thread through
//! a lock-free ring. Nothing blocks in the callback: when the ring is full
//! the newest message is dropped.

use midir::{Ignore, MidiInput, MidiInputConnection};
use rtrb::{Consumer, Producer, RingBuffer};
use tracing::{info, warn};

use super::midi::MidiEvent;
use super::output::{pick_port, CLIENT_NAME};
use crate::error::{ConductorError, Result};

const FEEDBACK_QUEUE_SIZE: usize = 256;

/// Producer half, owned by the input callback.
struct FeedbackWriter {
    tx: Producer<MidiEvent>,
}

impl FeedbackWriter {
    fn on_message(&mut self, bytes: &[u8]) {
        if let Some(event) = MidiEvent::from_bytes(bytes) {
            let _ = self.tx.push(event);
        }
    }
}

/// Open input connection plus the consumer end of its queue.
pub struct MidiFeedback {
    _conn: Option<MidiInputConnection<()>>,
    rx: Consumer<MidiEvent>,
    port: Option<String>,
}

impl MidiFeedback {
    /// Connect to the input port chosen by [`pick_port`].
    pub fn connect(hints: &[String]) -> Result<Self> {
        let mut midi_in = MidiInput::new(CLIENT_NAME)?;
        midi_in.ignore(Ignore::All);

        let ports = midi_in.ports();
        let names: Vec<String> = ports
            .iter()
            .map(|p| midi_in.port_name(p).unwrap_or_else(|_| "Unknown".to_string()))
            .collect();
        let idx = pick_port(&names, hints).ok_or(ConductorError::NoMidiPort { direction: "input" })?;

        let (tx, rx) = RingBuffer::<MidiEvent>::new(FEEDBACK_QUEUE_SIZE);
        let mut writer = FeedbackWriter { tx };
        let conn = midi_in
            .connect(
                &ports[idx],
                "lane-conductor-in",
                move |_stamp, bytes, _| writer.on_message(bytes),
                (),
            )
            .map_err(|e| ConductorError::MidiConnect(e.to_string()))?;

        info!(port = %names[idx], "opened MIDI input");
        Ok(Self {
            _conn: Some(conn),
            rx,
            port: Some(names[idx].clone()),
        })
    }

    /// Like [`MidiFeedback::connect`], but logs and returns `None` on failure.
    pub fn open(hints: &[String]) -> Option<Self> {
        match Self::connect(hints) {
            Ok(feedback) => Some(feedback),
            Err(e) => {
                warn!(error = %e, "MIDI input unavailable; feedback disabled");
                None
            }
        }
    }

    /// Queue fed by hand instead of a device. Returns the producer end.
    pub fn detached() -> (Self, Producer<MidiEvent>) {
        let (tx, rx) = RingBuffer::<MidiEvent>::new(FEEDBACK_QUEUE_SIZE);
        (
            Self {
                _conn: None,
                rx,
                port: None,
            },
            tx,
        )
    }

    pub fn port_name(&self) -> Option<&str> {
        self.port.as_deref()
    }

    /// Pop every message queued since the last call.
    pub fn drain(&mut self) -> Vec<MidiEvent> {
        let mut out = Vec::new();
        while let Ok(event) = self.rx.pop() {
            out.push(event);
        }
        out
    }
}
