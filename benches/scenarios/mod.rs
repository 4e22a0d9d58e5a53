//! Full-voice scenario benchmarks.

mod voice;

pub use voice::bench_voice;
