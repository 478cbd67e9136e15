//! The conductor: input gestures in, MIDI and lane state out.
//!
//! One [`Conductor`] owns everything a session mutates: lane state, the
//! voice cache, the MIDI sink, and the bus registry. All calls happen on a
//! single thread; overlapping input sources (two hands in one frame) are
//! applied in arrival order, so per-lane NoteOff-before-NoteOn ordering
//! holds even when their target sets overlap.
//!
//! ```text
//!   pointer / hand sample
//!          │  marker position (every sample)
//!          ▼
//!      throttle ──✗── dropped
//!          │ ✓
//!          ▼
//!   map_point ─► quantize ─► resolve_targets ─► lane state
//!                                    │                │
//!                                    ▼                ▼
//!                              MidiEmitter       BusRegistry
//!                                    │          (pan, preview)
//!                                    ▼
//!                                MidiSink
//! ```

use std::time::Instant;

use tracing::{debug, info};

use super::emitter::MidiEmitter;
use super::state::{LaneBank, LaneState, VoiceControlState};
use super::throttle::InputThrottle;
use crate::config::ConductorConfig;
use crate::io::midi::{MidiEvent, CC_PAN};
use crate::io::output::MidiSink;
use crate::mapping::{map_point, Direction, HandFrame, Marker, StageRect};
use crate::monitor::{AudioContext, BusRegistry};
use crate::music::Scale;
use crate::MAX_LANES;

/// Read-only view of one lane for drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneView {
    pub index: usize,
    pub pitch: u8,
    pub pan: u8,
    /// 1-based MIDI channel.
    pub channel: u8,
    /// Note currently held on this lane, if any.
    pub sounding: Option<u8>,
    /// Highlight strength, 0.0..=1.0.
    pub highlight: f32,
}

pub struct Conductor<S: MidiSink> {
    config: ConductorConfig,
    stage: StageRect,
    lanes: LaneBank,
    voices: VoiceControlState,
    emitter: MidiEmitter,
    sink: S,
    buses: BusRegistry,
    markers: [(f64, f64); 2],
    dragging: Option<Marker>,
    hand_tracking: bool,
    pointer_throttle: InputThrottle,
    hands_throttle: InputThrottle,
    last_snap: [Option<u8>; MAX_LANES],
    last_preview: [Option<Instant>; MAX_LANES],
}

fn marker_slot(marker: Marker) -> usize {
    match marker {
        Marker::Left => 0,
        Marker::Right => 1,
    }
}

impl<S: MidiSink> Conductor<S> {
    /// Build a session from `config`, writing MIDI to `sink`.
    ///
    /// Buses use the configured sample rate; swap in a registry bound to the
    /// real device rate with [`Conductor::with_buses`].
    pub fn new(config: ConductorConfig, sink: S) -> Self {
        let config = config.sanitized();
        let buses = if config.monitor.enabled {
            BusRegistry::new(AudioContext::new(
                config.monitor.sample_rate,
                config.monitor.native_panner,
            ))
        } else {
            BusRegistry::disabled()
        };
        let stage = StageRect::new(0.0, 0.0, 640.0, 480.0);

        Self {
            lanes: LaneBank::new(config.lane_count),
            voices: VoiceControlState::new(config.lane_count),
            emitter: MidiEmitter::new(config.channel_base).with_all_sound_off(config.midi.all_sound_off),
            pointer_throttle: InputThrottle::new(config.throttle.pointer()),
            hands_throttle: InputThrottle::new(config.throttle.hands()),
            markers: default_markers(&stage),
            stage,
            sink,
            buses,
            dragging: None,
            hand_tracking: false,
            last_snap: [None; MAX_LANES],
            last_preview: [None; MAX_LANES],
            config,
        }
    }

    pub fn with_buses(mut self, buses: BusRegistry) -> Self {
        self.buses = buses;
        self
    }

    pub fn config(&self) -> &ConductorConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn buses(&self) -> &BusRegistry {
        &self.buses
    }

    pub fn buses_mut(&mut self) -> &mut BusRegistry {
        &mut self.buses
    }

    pub fn voices(&self) -> &VoiceControlState {
        &self.voices
    }

    pub fn lanes(&self) -> &[LaneState] {
        self.lanes.as_slice()
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn stage(&self) -> StageRect {
        self.stage
    }

    /// Replace the stage rect, keeping markers at the same relative spot.
    pub fn set_stage(&mut self, rect: StageRect) {
        if rect == self.stage {
            return;
        }
        let old = self.stage;
        for (x, y) in &mut self.markers {
            let tx = if old.width > 0.0 { (*x - old.left) / old.width } else { 0.5 };
            let ty = if old.height > 0.0 { (*y - old.top) / old.height } else { 0.5 };
            *x = rect.left + tx * rect.width;
            *y = rect.top + ty * rect.height;
        }
        self.stage = rect;
    }

    pub fn marker(&self, marker: Marker) -> (f64, f64) {
        self.markers[marker_slot(marker)]
    }

    pub fn dragging(&self) -> Option<Marker> {
        self.dragging
    }

    pub fn hand_tracking(&self) -> bool {
        self.hand_tracking
    }

    fn direction_for(&self, marker: Marker) -> Direction {
        match marker {
            Marker::Left => self.config.hands.left_direction,
            Marker::Right => self.config.hands.right_direction,
        }
    }

    // ── gestures ─────────────────────────────────────────────────────────

    /// Start dragging `marker`. Ignored while hand tracking is on.
    pub fn pointer_down(&mut self, marker: Marker, x: f64, y: f64, now: Instant) {
        if self.hand_tracking {
            return;
        }
        self.dragging = Some(marker);
        self.pointer_throttle.reset();
        self.pointer_move(x, y, now);
    }

    /// Move the marker being dragged, if any.
    pub fn pointer_move(&mut self, x: f64, y: f64, now: Instant) {
        let Some(marker) = self.dragging else {
            return;
        };
        self.markers[marker_slot(marker)] = (x, y);
        if self.pointer_throttle.admit(now) {
            self.process(marker, x, y, now);
        }
    }

    /// End the drag and release every sounding note.
    pub fn pointer_up(&mut self) {
        if self.dragging.take().is_some() {
            self.flush();
        }
    }

    /// Apply one frame from the hand tracker. Ignored unless tracking is on.
    pub fn handle_hand_frame(&mut self, frame: &HandFrame, now: Instant) {
        if !self.hand_tracking {
            return;
        }
        let video = self.config.hands.video();
        let points: Vec<(Marker, f64, f64)> = frame
            .hands
            .iter()
            .map(|hand| {
                let (x, y) = video.to_stage(hand, &self.stage);
                (hand.label.marker(), x, y)
            })
            .collect();

        for &(marker, x, y) in &points {
            self.markers[marker_slot(marker)] = (x, y);
        }
        if points.is_empty() || !self.hands_throttle.admit(now) {
            return;
        }
        for (marker, x, y) in points {
            self.process(marker, x, y, now);
        }
    }

    /// Switch between pointer and hand input. Either way, notes held by the
    /// source being switched away from are released.
    pub fn set_hand_tracking(&mut self, enabled: bool) {
        if enabled == self.hand_tracking {
            return;
        }
        self.dragging = None;
        self.flush();
        self.hand_tracking = enabled;
        self.hands_throttle.reset();
        info!(enabled, "hand tracking");
    }

    /// Map, quantize, resolve, and emit for one admitted sample.
    fn process(&mut self, marker: Marker, x: f64, y: f64, now: Instant) {
        let lanes = self.lanes.len();
        let point = map_point(x, y, &self.stage, lanes, &self.config.pitch);
        let pitch = self
            .config
            .scale
            .quantize(point.raw_pitch, self.config.root)
            .clamp(0, 127) as u8;
        let targets = self
            .config
            .edit_group()
            .resolve(lanes, point.lane, self.direction_for(marker));

        for &lane in &targets {
            self.lanes.set(lane, pitch, point.pan);
            self.buses.set_pan(lane, point.pan);
            self.maybe_preview(lane, pitch, point.pan, now);
        }

        let events = self
            .emitter
            .apply_targets(&targets, pitch, point.pan, &mut self.voices);
        self.send(&events);
        self.voices.mark_highlight(&targets, now);
    }

    fn maybe_preview(&mut self, lane: usize, pitch: u8, pan: u8, now: Instant) {
        if !self.config.monitor.preview_tone || self.last_snap[lane] == Some(pitch) {
            return;
        }
        self.last_snap[lane] = Some(pitch);
        let recent = self.last_preview[lane]
            .is_some_and(|at| now.saturating_duration_since(at) < self.config.monitor.preview_gap());
        if recent {
            return;
        }
        self.last_preview[lane] = Some(now);
        self.buses.preview(lane, pitch, pan);
    }

    fn flush(&mut self) {
        let events = self.emitter.release_all(&mut self.voices);
        self.send(&events);
    }

    fn send(&mut self, events: &[MidiEvent]) {
        for event in events {
            debug!(?event, "midi out");
            self.sink.send(event);
        }
    }

    // ── session parameters ───────────────────────────────────────────────

    /// Resize to `count` lanes (clamped to `1..=lane_cap`). Lanes that go
    /// away are silenced first.
    pub fn set_lane_count(&mut self, count: usize) {
        let count = count.clamp(1, self.config.lane_cap);
        let current = self.lanes.len();
        if count == current {
            return;
        }
        if count < current {
            let events = self.emitter.release_beyond(&mut self.voices, count);
            self.send(&events);
            for lane in count..MAX_LANES {
                self.last_snap[lane] = None;
                self.last_preview[lane] = None;
            }
        } else {
            self.voices.resize(count);
        }
        self.lanes.resize(count);
        self.config.lane_count = count;
        self.config.edit_count = self.config.edit_count.clamp(1, count);
        info!(lanes = count, "lane count");
    }

    pub fn set_root(&mut self, root: u8) {
        self.config.root = root % 12;
    }

    pub fn set_scale(&mut self, scale: Scale) {
        self.config.scale = scale;
    }

    pub fn set_edit_count(&mut self, count: usize) {
        self.config.edit_count = count.clamp(1, self.lanes.len());
    }

    pub fn set_select_all(&mut self, select_all: bool) {
        self.config.select_all = select_all;
    }

    // ── feedback, rendering, teardown ────────────────────────────────────

    /// Reflect a message echoed back from the DAW in lane state.
    ///
    /// NoteOn sets the addressed lane's pitch, CC10 its pan. The voice cache
    /// is left alone so the next local gesture still diffs against what this
    /// conductor sent.
    pub fn apply_feedback(&mut self, event: &MidiEvent) {
        let lanes = self.lanes.len();
        match *event {
            MidiEvent::NoteOn { channel, key, velocity } if velocity > 0 => {
                let lane = self.emitter.lane_for_channel(channel, lanes);
                self.lanes.set_pitch(lane, key);
            }
            MidiEvent::ControlChange {
                channel,
                controller: CC_PAN,
                value,
            } => {
                let lane = self.emitter.lane_for_channel(channel, lanes);
                self.lanes.set_pan(lane, value);
                self.buses.set_pan(lane, value.min(127));
            }
            _ => {}
        }
    }

    /// Render interleaved stereo from every lane bus.
    pub fn render(&mut self, out: &mut [f32]) {
        self.buses.render(out);
    }

    pub fn highlight(&self, lane: usize, now: Instant) -> f32 {
        self.voices
            .highlight_alpha(lane, now, self.config.monitor.highlight_fade())
    }

    pub fn lane_views(&self, now: Instant) -> Vec<LaneView> {
        self.lanes
            .as_slice()
            .iter()
            .enumerate()
            .map(|(index, lane)| LaneView {
                index,
                pitch: lane.pitch,
                pan: lane.pan,
                channel: self.emitter.lane_channel(index),
                sounding: self.voices.last_note(index),
                highlight: self.highlight(index, now),
            })
            .collect()
    }

    /// Release everything and send all-sound-off on every lane channel.
    pub fn shutdown(&mut self) {
        self.dragging = None;
        let events = self.emitter.shutdown(&mut self.voices);
        self.send(&events);
        info!("conductor shut down");
    }
}

fn default_markers(stage: &StageRect) -> [(f64, f64); 2] {
    let y = stage.top + stage.height * 0.4;
    [
        (stage.left + stage.width * 0.25, y),
        (stage.left + stage.width * 0.75, y),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::output::MemorySink;
    use crate::mapping::{HandLabel, HandSample};
    use crate::music::velocity_for;
    use std::time::Duration;

    // 600×600 stage: y = 480 → raw 60, y = 440 → raw 64 (top 108, span 60).
    const Y60: f64 = 480.0;
    const Y64: f64 = 440.0;

    fn conductor(lanes: usize) -> Conductor<MemorySink> {
        let config = ConductorConfig {
            lane_count: lanes,
            scale: Scale::Chromatic,
            ..ConductorConfig::default()
        };
        let mut c = Conductor::new(config, MemorySink::new());
        c.set_stage(StageRect::new(0.0, 0.0, 600.0, 600.0));
        c
    }

    fn lane_centre(c: &Conductor<MemorySink>, lane: usize) -> f64 {
        c.stage().lane_span(lane, c.lane_count()).1
    }

    #[test]
    fn drag_emits_diffs_then_releases() {
        let mut c = conductor(1);
        let t0 = Instant::now();
        let x = lane_centre(&c, 0);

        c.pointer_down(Marker::Left, x, Y60, t0);
        c.pointer_move(x, Y64, t0 + Duration::from_millis(40));
        c.pointer_move(x, Y60, t0 + Duration::from_millis(80));
        c.pointer_up();

        assert_eq!(
            c.sink_mut().drain(),
            vec![
                MidiEvent::note_on(0, 60, velocity_for(60)),
                MidiEvent::pan(0, 64),
                MidiEvent::note_off(0, 60),
                MidiEvent::note_on(0, 64, velocity_for(64)),
                MidiEvent::note_off(0, 64),
                MidiEvent::note_on(0, 60, velocity_for(60)),
                MidiEvent::note_off(0, 60),
            ]
        );
    }

    #[test]
    fn throttled_samples_move_marker_only() {
        let mut c = conductor(1);
        let t0 = Instant::now();
        let x = lane_centre(&c, 0);

        c.pointer_down(Marker::Right, x, Y60, t0);
        c.sink_mut().drain();
        c.pointer_move(x, Y64, t0 + Duration::from_millis(5));

        assert!(c.sink().events.is_empty());
        assert_eq!(c.marker(Marker::Right), (x, Y64));
        assert_eq!(c.lanes()[0].pitch, 60);
    }

    #[test]
    fn moves_without_drag_are_ignored() {
        let mut c = conductor(2);
        c.pointer_move(10.0, 10.0, Instant::now());
        c.pointer_up();
        assert!(c.sink().events.is_empty());
    }

    #[test]
    fn edit_group_follows_marker_direction() {
        let mut c = conductor(4);
        c.set_edit_count(2);
        let t0 = Instant::now();

        c.pointer_down(Marker::Left, lane_centre(&c, 1), Y60, t0);
        c.pointer_up();
        let left: Vec<u8> = c.sink_mut().drain().iter().filter_map(note_on_channel).collect();
        assert_eq!(left, vec![1, 2]);

        c.pointer_down(Marker::Right, lane_centre(&c, 2), Y60, t0 + Duration::from_secs(1));
        let right: Vec<u8> = c.sink_mut().drain().iter().filter_map(note_on_channel).collect();
        assert_eq!(right, vec![1, 2]);
    }

    fn note_on_channel(e: &MidiEvent) -> Option<u8> {
        match *e {
            MidiEvent::NoteOn { channel, .. } => Some(channel),
            _ => None,
        }
    }

    #[test]
    fn lane_state_tracks_targets() {
        let mut c = conductor(3);
        c.set_select_all(true);
        c.pointer_down(Marker::Left, 0.0, Y64, Instant::now());
        assert!(c.lanes().iter().all(|l| l.pitch == 64 && l.pan == 0));
    }

    #[test]
    fn scale_and_root_shape_pitch() {
        let mut c = conductor(1);
        c.set_scale(Scale::Major);
        c.set_root(14); // D
        // raw 61 → C# is in D major
        c.pointer_down(Marker::Left, 300.0, 470.0, Instant::now());
        assert_eq!(c.lanes()[0].pitch, 61);
        assert_eq!(c.config().root, 2);
    }

    #[test]
    fn shrinking_lanes_silences_dropped_notes() {
        let mut c = conductor(4);
        c.set_select_all(true);
        c.pointer_down(Marker::Left, 10.0, Y60, Instant::now());
        c.sink_mut().drain();

        c.set_lane_count(2);
        let out = c.sink_mut().drain();
        assert_eq!(
            out,
            vec![
                MidiEvent::note_off(2, 60),
                MidiEvent::all_sound_off(2),
                MidiEvent::note_off(3, 60),
                MidiEvent::all_sound_off(3),
            ]
        );
        assert_eq!(c.lane_count(), 2);

        c.pointer_up();
        assert_eq!(
            c.sink_mut().drain(),
            vec![MidiEvent::note_off(0, 60), MidiEvent::note_off(1, 60)]
        );
    }

    #[test]
    fn lane_count_respects_cap_and_clamps_edit_count() {
        let config = ConductorConfig {
            lane_cap: 4,
            edit_count: 3,
            lane_count: 4,
            ..ConductorConfig::default()
        };
        let mut c = Conductor::new(config, MemorySink::new());
        c.set_lane_count(9);
        assert_eq!(c.lane_count(), 4);
        c.set_lane_count(2);
        assert_eq!(c.config().edit_count, 2);
        c.set_lane_count(0);
        assert_eq!(c.lane_count(), 1);
    }

    #[test]
    fn hand_frames_need_tracking_enabled() {
        let mut c = conductor(2);
        let frame = HandFrame {
            hands: vec![HandSample {
                x: 480.0,
                y: 320.0,
                label: HandLabel::Right,
            }],
        };
        c.handle_hand_frame(&frame, Instant::now());
        assert!(c.sink().events.is_empty());

        c.set_hand_tracking(true);
        c.handle_hand_frame(&frame, Instant::now());
        // mirrored: video x 480 of 640 → stage x 150 of 600, lane 0
        assert_eq!(c.marker(Marker::Left), (150.0, 400.0));
        assert_eq!(note_on_channel(&c.sink().events[0]), Some(0));
    }

    #[test]
    fn disabling_hands_flushes_notes() {
        let mut c = conductor(2);
        c.set_hand_tracking(true);
        let frame = HandFrame {
            hands: vec![HandSample {
                x: 320.0,
                y: 240.0,
                label: HandLabel::Left,
            }],
        };
        c.handle_hand_frame(&frame, Instant::now());
        c.sink_mut().drain();

        c.set_hand_tracking(false);
        let out = c.sink_mut().drain();
        assert_eq!(out.len(), 1);
        assert!(matches!(out[0], MidiEvent::NoteOff { .. }));
    }

    #[test]
    fn pointer_ignored_while_tracking_hands() {
        let mut c = conductor(1);
        c.set_hand_tracking(true);
        c.pointer_down(Marker::Left, 300.0, Y60, Instant::now());
        assert!(c.sink().events.is_empty());
        assert_eq!(c.dragging(), None);
    }

    #[test]
    fn feedback_updates_lane_state_only() {
        let mut c = conductor(4);
        c.apply_feedback(&MidiEvent::note_on(2, 72, 100));
        c.apply_feedback(&MidiEvent::pan(9, 20));
        c.apply_feedback(&MidiEvent::note_off(1, 50));

        assert_eq!(c.lanes()[2].pitch, 72);
        assert_eq!(c.lanes()[3].pan, 20);
        assert_eq!(c.lanes()[1], LaneState::default());
        assert_eq!(c.voices().last_note(2), None);
        assert!(c.sink().events.is_empty());
    }

    #[test]
    fn highlight_marks_targets() {
        let mut c = conductor(2);
        let t0 = Instant::now();
        c.pointer_down(Marker::Left, lane_centre(&c, 1), Y60, t0);
        let views = c.lane_views(t0);
        assert_eq!(views[0].highlight, 0.0);
        assert_eq!(views[1].highlight, 1.0);
        assert_eq!(views[1].sounding, Some(60));
        assert_eq!(views[1].channel, 2);
        assert_eq!(c.highlight(1, t0 + Duration::from_secs(1)), 0.0);
    }

    #[test]
    fn preview_respects_gap() {
        let config = ConductorConfig {
            lane_count: 1,
            scale: Scale::Chromatic,
            monitor: crate::config::MonitorConfig {
                preview_tone: true,
                sample_rate: 8_000.0,
                ..Default::default()
            },
            ..ConductorConfig::default()
        };
        let mut c = Conductor::new(config, MemorySink::new());
        c.set_stage(StageRect::new(0.0, 0.0, 600.0, 600.0));
        let t0 = Instant::now();

        c.pointer_down(Marker::Left, 300.0, Y60, t0);
        c.pointer_move(300.0, Y64, t0 + Duration::from_millis(40));
        c.pointer_move(300.0, Y60, t0 + Duration::from_millis(150));

        assert_eq!(c.buses().bus(0).map(|b| b.active_tones()), Some(2));
    }

    #[test]
    fn shutdown_silences_every_lane_channel() {
        let mut c = conductor(2);
        c.pointer_down(Marker::Left, 10.0, Y60, Instant::now());
        c.sink_mut().drain();
        c.shutdown();
        assert_eq!(
            c.sink_mut().drain(),
            vec![
                MidiEvent::note_off(0, 60),
                MidiEvent::all_sound_off(0),
                MidiEvent::all_sound_off(1),
            ]
        );
    }
}
