//! maxisynth - terminal host for the synth voice
//!
//! Run with: cargo run -- --envelope linear --gate-ms 400

mod app;
mod ui;

use std::{fs::File, sync::Mutex};

use clap::{Parser, ValueEnum};
use color_eyre::eyre::WrapErr;
use maxisynth::dsp::EnvelopeKind;

use app::Host;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EnvelopeArg {
    Exp,
    Linear,
}

impl From<EnvelopeArg> for EnvelopeKind {
    fn from(arg: EnvelopeArg) -> Self {
        match arg {
            EnvelopeArg::Exp => EnvelopeKind::Exponential,
            EnvelopeArg::Linear => EnvelopeKind::Linear,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "maxisynth", about = "Two-oscillator subtractive synth in the terminal")]
struct Args {
    /// Envelope engine used by both envelopes
    #[arg(long, value_enum, default_value = "exp")]
    envelope: EnvelopeArg,

    /// How long a key-triggered note is held before its note-off
    #[arg(long, default_value_t = 250)]
    gate_ms: u64,

    /// Log file (the terminal belongs to the UI)
    #[arg(long, default_value = "maxisynth.log")]
    log_file: String,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let log = File::create(&args.log_file)
        .wrap_err_with(|| format!("failed to create log file {}", args.log_file))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(log))
        .with_ansi(false)
        .init();

    Host::new(args.envelope.into())
        .gate_ms(args.gate_ms)
        .run()
}
