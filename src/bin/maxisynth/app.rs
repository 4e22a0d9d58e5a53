//! Audio host: owns the output stream and feeds the synth from a control queue

use std::time::Duration;

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;
use tracing::{error, info};

use maxisynth::{
    dsp::EnvelopeKind, Synth, SynthMessage, MAX_BLOCK_SIZE, OUTPUT_CHANNELS, SAMPLE_RATE,
};

use super::ui::{UiApp, VoiceStatus};

const CONTROL_QUEUE_SIZE: usize = 256;
/// Mono samples returned to the UI for the scope and spectrum.
const SCOPE_QUEUE_SIZE: usize = 8192;
const STATUS_QUEUE_SIZE: usize = 64;

pub struct Host {
    envelope: EnvelopeKind,
    gate: Duration,
}

impl Host {
    pub fn new(envelope: EnvelopeKind) -> Self {
        Self {
            envelope,
            gate: Duration::from_millis(250),
        }
    }

    /// Hold time for notes played from the computer keyboard
    pub fn gate_ms(mut self, ms: u64) -> Self {
        self.gate = Duration::from_millis(ms);
        self
    }

    /// Open the output device and run the UI until the user quits
    pub fn run(self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;

        let config = cpal::StreamConfig {
            channels: OUTPUT_CHANNELS as u16,
            sample_rate: cpal::SampleRate(SAMPLE_RATE),
            buffer_size: cpal::BufferSize::Default,
        };

        let mut synth = Synth::with_envelope(self.envelope);
        synth
            .initialize(config.sample_rate.0, config.channels as usize)
            .wrap_err("synth rejected the stream configuration")?;
        let envelope = synth.envelope_kind();

        let (control_tx, mut control_rx) = RingBuffer::<SynthMessage>::new(CONTROL_QUEUE_SIZE);
        let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_QUEUE_SIZE);
        let (mut status_tx, status_rx) = RingBuffer::<VoiceStatus>::new(STATUS_QUEUE_SIZE);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _| {
                    synth.drain(&mut control_rx);

                    for block in data.chunks_mut(MAX_BLOCK_SIZE * OUTPUT_CHANNELS) {
                        let frames = block.len() / OUTPUT_CHANNELS;
                        synth.render(block, frames);

                        for frame in block.chunks_exact(OUTPUT_CHANNELS) {
                            if scope_tx.push(frame[0]).is_err() {
                                break;
                            }
                        }
                    }

                    // Dropped when the UI falls behind; the next callback sends a fresher one.
                    let _ = status_tx.push(VoiceStatus {
                        gate: synth.gate(),
                        note: synth.note(),
                        level: synth.envelope_level(),
                    });
                },
                |err| error!(%err, "audio stream error"),
                None,
            )
            .wrap_err("failed to build output stream")?;

        stream.play().wrap_err("failed to start output stream")?;
        info!(?envelope, gate = ?self.gate, "audio running");

        let mut terminal = ratatui::init();
        let result = UiApp::new(control_tx, scope_rx, status_rx, envelope, self.gate)
            .run(&mut terminal);
        ratatui::restore();

        drop(stream);
        info!("audio stopped");
        result
    }
}
