//! Conductor app - device setup and the TUI event loop

use std::io::stdout;
use std::time::{Duration, Instant};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::{style::Style, widgets::Paragraph, DefaultTerminal, Frame};
use rtrb::Consumer;
use tracing::{info, warn};

use super::audio::AudioOut;
use super::hands::spawn_stdin_reader;
use super::ui::{self, AudioStats, StatusInfo, SPECTRUM_BARS};
use super::Options;

use lane_conductor::{
    io::{input::MidiFeedback, open_output, MidiSink},
    mapping::{HandFrame, Marker, StageRect},
    monitor::{AudioContext, BusRegistry},
    music::notes::NOTE_NAMES,
    Conductor, ConductorConfig, MAX_BLOCK_SIZE,
};

/// Scope length in samples
const SCOPE_SIZE: usize = 1024;

pub struct App {
    conductor: Conductor<Box<dyn MidiSink>>,
    audio: Option<AudioOut>,
    feedback: Option<MidiFeedback>,
    hands_rx: Option<Consumer<HandFrame>>,
    midi_out: Option<String>,
    sample_rate: f32,
    selected: usize,
    scope: Vec<f32>,
    bars: Vec<f32>,
    rms: f32,
    render_buf: Vec<f32>,
    last_pump: Instant,
    should_quit: bool,
}

impl App {
    pub fn new(config: ConductorConfig, options: Options) -> EyreResult<Self> {
        let sink = open_output(&config.midi.output_hints);
        let midi_out = sink.port_name().map(str::to_string);

        let feedback = if config.midi.feedback {
            MidiFeedback::open(&config.midi.input_hints)
        } else {
            None
        };

        let audio = if options.audio && config.monitor.enabled {
            match AudioOut::open() {
                Ok(out) => Some(out),
                Err(e) => {
                    warn!(error = %e, "audio output unavailable; monitoring silently");
                    None
                }
            }
        } else {
            None
        };

        let sample_rate = audio
            .as_ref()
            .map_or(config.monitor.sample_rate, AudioOut::sample_rate);
        let buses = if config.monitor.enabled {
            BusRegistry::new(AudioContext::new(sample_rate, config.monitor.native_panner))
        } else {
            BusRegistry::disabled()
        };

        let mut conductor = Conductor::new(config, sink).with_buses(buses);
        let hands_rx = if options.hands_stdin {
            conductor.set_hand_tracking(true);
            Some(spawn_stdin_reader())
        } else {
            None
        };

        info!(
            lanes = conductor.lane_count(),
            midi_out = midi_out.as_deref().unwrap_or("none"),
            "session ready"
        );

        Ok(Self {
            conductor,
            audio,
            feedback,
            hands_rx,
            midi_out,
            sample_rate,
            selected: 0,
            scope: vec![0.0; SCOPE_SIZE],
            bars: vec![0.0; SPECTRUM_BARS],
            rms: 0.0,
            render_buf: vec![0.0; MAX_BLOCK_SIZE * 2],
            last_pump: Instant::now(),
            should_quit: false,
        })
    }

    /// Take over the terminal until the user quits, then silence every lane.
    pub fn run(mut self) -> EyreResult<()> {
        let mut terminal = ratatui::init();
        execute!(stdout(), EnableMouseCapture).wrap_err("failed to enable mouse capture")?;

        let result = self.event_loop(&mut terminal);

        self.conductor.shutdown();
        let _ = execute!(stdout(), DisableMouseCapture);
        ratatui::restore();
        result
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            let now = Instant::now();
            self.poll_feedback();
            self.poll_hands(now);
            self.pump_audio(now);
            self.refresh_monitor();

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }
        }
        Ok(())
    }

    fn poll_feedback(&mut self) {
        let Some(feedback) = self.feedback.as_mut() else {
            return;
        };
        for event in feedback.drain() {
            self.conductor.apply_feedback(&event);
        }
    }

    fn poll_hands(&mut self, now: Instant) {
        let Some(rx) = self.hands_rx.as_mut() else {
            return;
        };
        while let Ok(frame) = rx.pop() {
            self.conductor.handle_hand_frame(&frame, now);
        }
    }

    /// Render as much audio as the device can take, or as much time as has
    /// passed when there is no device.
    fn pump_audio(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_pump);
        self.last_pump = now;

        let wanted = match &self.audio {
            Some(audio) => audio.free_frames(),
            None => (elapsed.as_secs_f64() * self.sample_rate as f64) as usize,
        };
        let frames = wanted.min(MAX_BLOCK_SIZE);
        if frames == 0 {
            return;
        }

        let buf = &mut self.render_buf[..frames * 2];
        self.conductor.render(buf);
        if let Some(audio) = self.audio.as_mut() {
            audio.push_interleaved(buf);
        }
    }

    fn refresh_monitor(&mut self) {
        self.selected = self.selected.min(self.conductor.lane_count() - 1);
        if let Some(bus) = self.conductor.buses_mut().get_bus(self.selected) {
            bus.time_tap().float_time_domain(&mut self.scope);
            self.rms = bus.time_tap().rms();
            self.bars = bus.freq_tap_mut().bars(SPECTRUM_BARS);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let config = self.conductor.config();
        let (root, scale, edit_count, select_all) =
            (config.root, config.scale, config.edit_count, config.select_all);
        let lanes = self.conductor.lane_count();

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(c @ '1'..='8') => {
                let count = c as usize - '0' as usize;
                self.conductor.set_lane_count(count);
            }
            KeyCode::Char('r') => self.conductor.set_root(root + 1),
            KeyCode::Char('R') => self.conductor.set_root(root + 11),
            KeyCode::Char('s') => self.conductor.set_scale(scale.next()),
            KeyCode::Char('e') => {
                let next = if edit_count >= lanes { 1 } else { edit_count + 1 };
                self.conductor.set_edit_count(next);
            }
            KeyCode::Char('a') => self.conductor.set_select_all(!select_all),
            KeyCode::Char('h') => {
                let enabled = !self.conductor.hand_tracking();
                self.conductor.set_hand_tracking(enabled);
            }
            KeyCode::Tab => self.selected = (self.selected + 1) % lanes,
            _ => {}
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let now = Instant::now();
        // Centre of the cell under the cursor.
        let x = mouse.column as f64 + 0.5;
        let y = mouse.row as f64 + 0.5;

        match mouse.kind {
            MouseEventKind::Down(button) => {
                if !self.stage_contains(x, y) {
                    return;
                }
                let marker = match button {
                    MouseButton::Right => Marker::Right,
                    _ => Marker::Left,
                };
                self.conductor.pointer_down(marker, x, y, now);
            }
            MouseEventKind::Drag(_) => self.conductor.pointer_move(x, y, now),
            MouseEventKind::Up(_) => self.conductor.pointer_up(),
            _ => {}
        }
    }

    fn stage_contains(&self, x: f64, y: f64) -> bool {
        let s = self.conductor.stage();
        x >= s.left && x < s.right() && y >= s.top && y < s.bottom()
    }

    fn render(&mut self, frame: &mut Frame) {
        let areas = ui::layout(frame.area());

        let inner = ui::stage_block().inner(areas.stage);
        self.conductor.set_stage(StageRect::new(
            inner.x as f64,
            inner.y as f64,
            inner.width as f64,
            inner.height as f64,
        ));

        let config = self.conductor.config();
        let status = StatusInfo {
            lanes: self.conductor.lane_count(),
            root: NOTE_NAMES[config.root as usize % 12],
            scale: config.scale.name(),
            edit_count: config.edit_count,
            select_all: config.select_all,
            hand_tracking: self.conductor.hand_tracking(),
            midi_out: self.midi_out.as_deref(),
            midi_in: self.feedback.as_ref().and_then(|f| f.port_name()),
            sample_rate: self.audio.as_ref().map(AudioOut::sample_rate),
            stats: AudioStats::new(&self.scope, self.rms),
        };
        ui::render_status(frame, areas.status, &status);

        let lanes = self.conductor.lane_views(Instant::now());
        let markers = [
            (Marker::Left, self.conductor.marker(Marker::Left)),
            (Marker::Right, self.conductor.marker(Marker::Right)),
        ];
        ui::render_stage(frame, areas.stage, &lanes, &markers, self.selected, &config.pitch);

        let title = format!("lane {}", self.selected + 1);
        ui::render_scope(frame, areas.scope, &title, &self.scope);
        ui::render_spectrum(frame, areas.spectrum, &title, &self.bars);

        let help = Paragraph::new(ui::HELP).style(Style::default().fg(ratatui::style::Color::DarkGray));
        frame.render_widget(help, areas.help);
    }
}
