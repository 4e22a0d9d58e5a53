//! Benchmarks for `Synth::render` with a held note.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use maxisynth::{dsp::EnvelopeKind, Param, Synth, OUTPUT_CHANNELS, SAMPLE_RATE};

use crate::BLOCK_SIZES;

fn patch(kind: EnvelopeKind, settings: &[(Param, i32)]) -> Synth {
    let mut synth = Synth::with_envelope(kind);
    synth
        .initialize(SAMPLE_RATE, OUTPUT_CHANNELS)
        .expect("native rate and layout");
    for &(param, value) in settings {
        synth.set_parameter(param.index(), value);
    }
    synth.note_on(45, 100); // A2
    synth
}

pub fn bench_voice(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voice");

    // Default patch: one saw, lowpass wide open
    let init: &[(Param, i32)] = &[];

    // Detuned pair with modulated cutoff and PWM
    let sweep: &[(Param, i32)] = &[
        (Param::Waveform, 1),
        (Param::Waveform2, 0),
        (Param::Cents, 30),
        (Param::Balance, 50),
        (Param::Cutoff, 40),
        (Param::Resonance, 64),
        (Param::Decay, 400),
        (Param::Sustain, 30),
        (Param::EnvCutoffInt, 60),
        (Param::EnvPWMInt, 50),
    ];

    // All four responses blended
    let custom: &[(Param, i32)] = &[
        (Param::Filter, 4),
        (Param::MixLP, 40),
        (Param::MixBP, 30),
        (Param::MixHP, 20),
        (Param::MixNotch, 10),
    ];

    for &size in BLOCK_SIZES {
        let mut out = vec![0.0f32; size * OUTPUT_CHANNELS];

        for (name, kind, settings) in [
            ("init", EnvelopeKind::Exponential, init),
            ("sweep", EnvelopeKind::Exponential, sweep),
            ("sweep_linear", EnvelopeKind::Linear, sweep),
            ("custom_mix", EnvelopeKind::Exponential, custom),
        ] {
            let mut synth = patch(kind, settings);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, &frames| {
                b.iter(|| synth.render(black_box(&mut out), frames))
            });
        }
    }

    group.finish();
}
