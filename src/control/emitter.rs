//! Turning lane updates into MIDI messages.

/*
Diffing Lane State into MIDI
============================

The mapper runs at up to ~30 Hz while a gesture is live, but most samples
change nothing audible: the quantized pitch stays on the same scale degree
and the pan moves by less than one step. The emitter therefore remembers
what it last sent per lane and only emits the difference.

For each target lane:

    last note    new note    messages
    ---------    --------    ---------------------------------
    none         60          NoteOn 60
    60           60          (nothing)
    60           64          NoteOff 60, NoteOn 64

    last pan     new pan     messages
    --------     -------     ---------------------------------
    none / 40    64          CC10 64
    64           64          (nothing)

A NoteOff for the old note always precedes the NoteOn for the new one on
the same channel, so a receiving synth never holds two notes per lane.


Channels
--------

Lane i plays on channel `clamp(i + base, base, 16)` (1-based). With the
default base of 1, lanes 0..7 use channels 1..8. On the wire the channel
nibble is 0-based, so `channel_for` returns the 1-based value minus one.


Flushing
--------

Three paths end notes:

  release_all     gesture ended: NoteOff for every sounding lane
  release_beyond  lane count shrank: NoteOff, then optionally CC123 for
                  lanes that are leaving
  shutdown        session over: NoteOff for sounding lanes, then CC123
                  on the first min(16, L) lane channels
*/

use tracing::debug;

use super::state::VoiceControlState;
use crate::io::midi::MidiEvent;
use crate::music::velocity_for;
use crate::MIDI_CHANNEL_BASE;

/// Highest 1-based MIDI channel.
pub const MAX_CHANNEL: u8 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiEmitter {
    channel_base: u8,
    all_sound_off: bool,
}

impl Default for MidiEmitter {
    fn default() -> Self {
        Self::new(MIDI_CHANNEL_BASE)
    }
}

impl MidiEmitter {
    /// Emitter whose lane 0 plays on `channel_base` (1-based, clamped to 1..=16).
    pub fn new(channel_base: u8) -> Self {
        Self {
            channel_base: channel_base.clamp(1, MAX_CHANNEL),
            all_sound_off: true,
        }
    }

    /// Also send CC123 when lanes are dropped.
    pub fn with_all_sound_off(mut self, enabled: bool) -> Self {
        self.all_sound_off = enabled;
        self
    }

    pub fn channel_base(&self) -> u8 {
        self.channel_base
    }

    /// 1-based channel for `lane`, collapsing onto 16 past the ceiling.
    pub fn lane_channel(&self, lane: usize) -> u8 {
        let ch = (lane as u64 + self.channel_base as u64).min(MAX_CHANNEL as u64) as u8;
        ch.max(self.channel_base)
    }

    /// 0-based wire channel for `lane`.
    pub fn channel_for(&self, lane: usize) -> u8 {
        self.lane_channel(lane) - 1
    }

    /// Lane addressed by a 0-based wire channel, clamped into `0..lanes`.
    pub fn lane_for_channel(&self, channel: u8, lanes: usize) -> usize {
        let offset = (channel as i32 + 1 - self.channel_base as i32).max(0) as usize;
        offset.min(lanes.saturating_sub(1))
    }

    /// Diff `pitch`/`pan` against what each target lane last sent.
    ///
    /// Targets outside the active lane range are skipped.
    pub fn apply_targets(
        &self,
        targets: &[usize],
        pitch: u8,
        pan: u8,
        voices: &mut VoiceControlState,
    ) -> Vec<MidiEvent> {
        let pitch = pitch.min(127);
        let pan = pan.min(127);
        let mut out = Vec::with_capacity(targets.len() * 3);

        for &lane in targets {
            if lane >= voices.len() {
                continue;
            }
            let channel = self.channel_for(lane);

            let previous = voices.last_note(lane);
            if previous != Some(pitch) {
                if let Some(old) = previous {
                    out.push(MidiEvent::note_off(channel, old));
                }
                out.push(MidiEvent::note_on(channel, pitch, velocity_for(pitch)));
                voices.set_last_note(lane, Some(pitch));
            }

            if voices.last_pan(lane) != Some(pan) {
                out.push(MidiEvent::pan(channel, pan));
                voices.set_last_pan(lane, Some(pan));
            }
        }

        if !out.is_empty() {
            debug!(?targets, pitch, pan, count = out.len(), "lane diff");
        }
        out
    }

    /// NoteOff for every active lane with a sounding note.
    pub fn release_all(&self, voices: &mut VoiceControlState) -> Vec<MidiEvent> {
        let sounding: Vec<(usize, u8)> = voices.active_notes().collect();
        let mut out = Vec::with_capacity(sounding.len());
        for (lane, note) in sounding {
            out.push(MidiEvent::note_off(self.channel_for(lane), note));
            voices.set_last_note(lane, None);
        }
        out
    }

    /// Silence lanes at or beyond `new_len` and shrink `voices` to it.
    ///
    /// CC123 is skipped for channels still used by a remaining lane.
    pub fn release_beyond(&self, voices: &mut VoiceControlState, new_len: usize) -> Vec<MidiEvent> {
        let new_len = new_len.max(1);
        let kept: Vec<u8> = (0..new_len).map(|lane| self.channel_for(lane)).collect();
        let mut out = Vec::new();

        for (lane, note) in voices.sounding_from(new_len) {
            let channel = self.channel_for(lane);
            out.push(MidiEvent::note_off(channel, note));
            if self.all_sound_off && !kept.contains(&channel) {
                out.push(MidiEvent::all_sound_off(channel));
            }
        }
        voices.resize(new_len);
        out
    }

    /// NoteOff for sounding lanes, then CC123 on each distinct lane channel.
    pub fn shutdown(&self, voices: &mut VoiceControlState) -> Vec<MidiEvent> {
        let mut out = self.release_all(voices);
        let lanes = voices.len().min(MAX_CHANNEL as usize);
        let mut channels: Vec<u8> = (0..lanes).map(|lane| self.channel_for(lane)).collect();
        channels.dedup();
        out.extend(channels.into_iter().map(MidiEvent::all_sound_off));
        for lane in 0..voices.len() {
            voices.set_last_pan(lane, None);
        }
        out
    }
}
