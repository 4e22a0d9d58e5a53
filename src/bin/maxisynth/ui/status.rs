//! Status line: envelope engine, keyboard octave, gate and level meters

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use maxisynth::dsp::EnvelopeKind;

use super::VoiceStatus;

pub struct OutputLevel {
    pub peak: f32,
    pub rms: f32,
}

impl OutputLevel {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    envelope: EnvelopeKind,
    octave: u8,
    voice: &VoiceStatus,
    level: &OutputLevel,
) {
    let engine = match envelope {
        EnvelopeKind::Exponential => "exp",
        EnvelopeKind::Linear => "linear",
    };
    let gate_color = if voice.gate > 0 { Color::Green } else { Color::DarkGray };

    let line = Line::from(vec![
        Span::styled(format!(" env: {engine}  "), Style::default().fg(Color::Cyan)),
        Span::styled(format!("oct: {octave}  "), Style::default().fg(Color::White)),
        Span::styled(format!("gate: {}  ", voice.gate), Style::default().fg(gate_color)),
        Span::styled(format!("note: {}  ", voice.note), Style::default().fg(Color::White)),
        Span::styled(format!("amp env: {:.2}  ", voice.level), Style::default().fg(Color::Yellow)),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", level.peak, level.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(Block::default().title(" maxisynth ").borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}
