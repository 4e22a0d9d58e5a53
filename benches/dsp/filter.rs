//! Benchmarks for the state-variable filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use maxisynth::dsp::{FilterMix, FilterType, SVFilter};

use crate::BLOCK_SIZES;

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    let mixes = [
        ("lowpass", FilterMix::single(FilterType::LowPass)),
        ("notch", FilterMix::single(FilterType::Notch)),
        ("custom", FilterMix::new(0.5, 0.2, 0.2, 0.1)),
    ];

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut buffer = input.clone();

        for (name, mix) in &mixes {
            let mut filter = SVFilter::new();
            filter.set_params(1000.0, 2.0);
            group.bench_with_input(BenchmarkId::new(*name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer), black_box(mix));
                })
            });
        }

        // Cutoff recomputed every sample, as the voice does under envelope modulation
        let mut filter = SVFilter::new();
        let mix = FilterMix::single(FilterType::LowPass);
        group.bench_with_input(BenchmarkId::new("modulated", size), &size, |b, _| {
            b.iter(|| {
                for (i, sample) in buffer.iter_mut().enumerate() {
                    filter.set_params(200.0 + i as f32 * 10.0, 2.0);
                    *sample = filter.process(black_box(input[i]), &mix);
                }
            })
        });
    }

    group.finish();
}
