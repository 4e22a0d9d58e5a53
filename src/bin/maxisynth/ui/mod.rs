//! TUI for the synth host
//!
//! Parameter pages on top, status line, then scope and spectrum of the output.

mod params;
mod spectrum;
mod status;
mod waveform;

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::{Consumer, Producer};
use tracing::{debug, warn};

use maxisynth::{
    dsp::EnvelopeKind,
    unit::{NUM_PAGES, PAGE_SIZE, UNIT_HEADER},
    SynthMessage, NUM_PARAMS, SAMPLE_RATE,
};

use params::render_params;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_status, OutputLevel};
use waveform::render_waveform;

/// Samples kept for the scope and the FFT
const SCOPE_LEN: usize = 1024;

/// Lower row plays naturals, upper row the sharps, like a piano octave.
const KEY_ROW: [(char, u8); 13] = [
    ('a', 0),
    ('w', 1),
    ('s', 2),
    ('e', 3),
    ('d', 4),
    ('f', 5),
    ('t', 6),
    ('g', 7),
    ('y', 8),
    ('h', 9),
    ('u', 10),
    ('j', 11),
    ('k', 12),
];

/// Snapshot of the voice sent back from the audio callback
#[derive(Clone, Copy, Debug, Default)]
pub struct VoiceStatus {
    pub gate: u32,
    pub note: i32,
    pub level: f32,
}

pub struct UiApp {
    control_tx: Producer<SynthMessage>,
    scope_rx: Consumer<f32>,
    status_rx: Consumer<VoiceStatus>,

    envelope: EnvelopeKind,
    hold: Duration,
    /// Mirror of what the UI has written; the synth stores values verbatim.
    values: [i32; NUM_PARAMS],
    page: usize,
    selected: usize,
    octave: u8,
    pending_offs: Vec<(Instant, u8)>,

    status: VoiceStatus,
    scope: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        control_tx: Producer<SynthMessage>,
        scope_rx: Consumer<f32>,
        status_rx: Consumer<VoiceStatus>,
        envelope: EnvelopeKind,
        hold: Duration,
    ) -> Self {
        let mut values = [0; NUM_PARAMS];
        for (value, desc) in values.iter_mut().zip(UNIT_HEADER.params.iter()) {
            *value = desc.default;
        }

        Self {
            control_tx,
            scope_rx,
            status_rx,
            envelope,
            hold,
            values,
            page: 0,
            selected: 0,
            octave: 4,
            pending_offs: Vec::new(),
            status: VoiceStatus::default(),
            scope: vec![0.0; SCOPE_LEN],
            spectrum: SpectrumAnalyzer::new(SCOPE_LEN, SAMPLE_RATE as f32),
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.release_due_notes(Instant::now());

            terminal.draw(|frame| self.render(frame))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }
        }

        self.release_all();
        Ok(())
    }

    /// Close the gates of notes still waiting for their timed release.
    fn release_all(&mut self) {
        for (_, note) in std::mem::take(&mut self.pending_offs) {
            self.send(SynthMessage::NoteOff { note });
        }
    }

    fn poll_audio(&mut self) {
        let available = self.scope_rx.slots();
        if available > 0 {
            if let Ok(chunk) = self.scope_rx.read_chunk(available) {
                let (a, b) = chunk.as_slices();
                self.scope.extend_from_slice(a);
                self.scope.extend_from_slice(b);
                chunk.commit_all();
            }
            if self.scope.len() > SCOPE_LEN {
                let excess = self.scope.len() - SCOPE_LEN;
                self.scope.drain(..excess);
            }
            self.spectrum.update(&self.scope);
        }

        while let Ok(status) = self.status_rx.pop() {
            self.status = status;
        }
    }

    fn release_due_notes(&mut self, now: Instant) {
        let mut due = Vec::new();
        self.pending_offs.retain(|&(at, note)| {
            if at <= now {
                due.push(note);
                false
            } else {
                true
            }
        });
        for note in due {
            self.send(SynthMessage::NoteOff { note });
        }
    }

    fn send(&mut self, msg: SynthMessage) {
        if self.control_tx.push(msg).is_err() {
            warn!(?msg, "control queue full, message dropped");
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let coarse = key.modifiers.contains(KeyModifiers::SHIFT);
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.page = (self.page + 1) % NUM_PAGES,
            KeyCode::BackTab => self.page = (self.page + NUM_PAGES - 1) % NUM_PAGES,
            KeyCode::Up => self.selected = (self.selected + PAGE_SIZE - 1) % PAGE_SIZE,
            KeyCode::Down => self.selected = (self.selected + 1) % PAGE_SIZE,
            KeyCode::Left => self.step_selected(if coarse { -10 } else { -1 }),
            KeyCode::Right => self.step_selected(if coarse { 10 } else { 1 }),
            KeyCode::Char('z') => self.octave = self.octave.saturating_sub(1),
            KeyCode::Char('x') => self.octave = (self.octave + 1).min(9),
            KeyCode::Char('r') => {
                self.pending_offs.clear();
                self.send(SynthMessage::Reset);
            }
            KeyCode::Char(c) => {
                if let Some(&(_, offset)) = KEY_ROW.iter().find(|(k, _)| *k == c) {
                    self.play(offset);
                }
            }
            _ => {}
        }
    }

    fn play(&mut self, offset: u8) {
        let note = (self.octave * 12 + 12 + offset).min(127);
        self.send(SynthMessage::NoteOn { note, velocity: 100 });
        self.pending_offs.push((Instant::now() + self.hold, note));
    }

    fn step_selected(&mut self, delta: i32) {
        let index = self.page * PAGE_SIZE + self.selected;
        let Some(desc) = UNIT_HEADER.params.get(index) else {
            return;
        };
        let value = (self.values[index] + delta).clamp(desc.min, desc.max);
        if value == self.values[index] {
            return;
        }
        self.values[index] = value;
        debug!(param = desc.name, value, "parameter edited");
        self.send(SynthMessage::SetParameter {
            index: index as u8,
            value,
        });
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status
                Constraint::Length(PAGE_SIZE as u16 + 2), // Parameters
                Constraint::Min(6), // Scope
                Constraint::Length(10), // Spectrum
                Constraint::Length(1), // Help
            ])
            .split(frame.area());

        render_status(
            frame,
            chunks[0],
            self.envelope,
            self.octave,
            &self.status,
            &OutputLevel::from_buffer(&self.scope),
        );
        render_params(frame, chunks[1], self.page, self.selected, &self.values);
        render_waveform(frame, chunks[2], &self.scope);
        render_spectrum(frame, chunks[3], self.spectrum.data());

        let help = Paragraph::new(
            " [A-K] Play  [Z/X] Octave  [Tab] Page  [↑↓] Select  [←→] Edit (Shift ×10)  [R] Reset  [Q] Quit",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[4]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtrb::RingBuffer;

    fn app() -> (UiApp, Consumer<SynthMessage>) {
        let (control_tx, control_rx) = RingBuffer::new(16);
        let (_, scope_rx) = RingBuffer::new(16);
        let (_, status_rx) = RingBuffer::new(4);
        let app = UiApp::new(
            control_tx,
            scope_rx,
            status_rx,
            EnvelopeKind::Exponential,
            Duration::from_secs(60),
        );
        (app, control_rx)
    }

    #[test]
    fn quitting_releases_held_notes() {
        let (mut app, mut rx) = app();
        app.play(0);
        app.play(4);
        assert_eq!(rx.pop(), Ok(SynthMessage::NoteOn { note: 60, velocity: 100 }));
        assert_eq!(rx.pop(), Ok(SynthMessage::NoteOn { note: 64, velocity: 100 }));

        app.release_all();

        assert_eq!(rx.pop(), Ok(SynthMessage::NoteOff { note: 60 }));
        assert_eq!(rx.pop(), Ok(SynthMessage::NoteOff { note: 64 }));
        assert!(rx.pop().is_err());
        assert!(app.pending_offs.is_empty());
    }
}
