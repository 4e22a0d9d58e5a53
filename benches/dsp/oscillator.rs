//! Benchmarks for the PolyBLEP oscillator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use maxisynth::dsp::{PolyBlepOscillator, Waveform};

use crate::BLOCK_SIZES;

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, waveform) in [
            ("saw", Waveform::Saw),
            ("rectangle", Waveform::Rectangle),
            ("triangle", Waveform::Triangle),
        ] {
            let mut osc = PolyBlepOscillator::new(waveform);
            osc.set_pulse_width(0.3);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| osc.render(black_box(&mut buffer), black_box(440.0)))
            });
        }
    }

    group.finish();
}
