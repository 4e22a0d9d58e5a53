//! Benchmarks for both envelope engines.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use maxisynth::dsp::{Envelope, EnvelopeGenerator, EnvelopeKind};

use crate::BLOCK_SIZES;

fn sustaining(kind: EnvelopeKind) -> Envelope {
    let mut env = Envelope::new(kind);
    env.set_attack_ms(10.0);
    env.set_decay_ms(100.0);
    env.set_sustain(0.6);
    env.set_release_ms(200.0);
    env
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, kind) in [
            ("exponential", EnvelopeKind::Exponential),
            ("linear", EnvelopeKind::Linear),
        ] {
            let mut env = sustaining(kind);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| env.render(black_box(&mut buffer), black_box(true)))
            });
        }
    }

    group.finish();
}
