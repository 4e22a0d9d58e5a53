use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::SAMPLE_RATE;

/*
| type              | passes          | rejects      | output      |
| ----------------- | --------------- | ------------ | ----------- |
| low-pass          | below cutoff    | above cutoff | v2          |
| band-pass         | around cutoff   | outside      | v1          |
| high-pass         | above cutoff    | below cutoff | x - k*v1 - v2 |
| notch / band-stop | outside         | around       | low + high  |

All four responses come out of the same two integrators every sample, so a
blend of them costs nothing extra: the voice weights them with a `FilterMix`.

Resonance here is Q. Damping is k = 1/Q, so Q = 1/16 is heavily damped and
Q = 16 rings hard. Q = 0 is treated as "no damping" (k = 0).
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
    BandPass,
    Notch,
}

/// Weights applied to the four simultaneous filter outputs.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FilterMix {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
    pub notch: f32,
}

impl FilterMix {
    pub const fn new(lowpass: f32, bandpass: f32, highpass: f32, notch: f32) -> Self {
        Self {
            lowpass,
            bandpass,
            highpass,
            notch,
        }
    }

    /// A mix that passes exactly one response at unity gain.
    pub const fn single(filter_type: FilterType) -> Self {
        match filter_type {
            FilterType::LowPass => Self::new(1.0, 0.0, 0.0, 0.0),
            FilterType::HighPass => Self::new(0.0, 0.0, 1.0, 0.0),
            FilterType::BandPass => Self::new(0.0, 1.0, 0.0, 0.0),
            FilterType::Notch => Self::new(0.0, 0.0, 0.0, 1.0),
        }
    }

    pub fn sum(&self) -> f32 {
        self.lowpass + self.bandpass + self.highpass + self.notch
    }
}

pub struct FilterOutputs {
    pub lowpass: f32,
    pub bandpass: f32,
    pub highpass: f32,
    pub notch: f32,
}

impl FilterOutputs {
    #[inline]
    pub fn mix(&self, mix: &FilterMix) -> f32 {
        self.lowpass * mix.lowpass
            + self.bandpass * mix.bandpass
            + self.highpass * mix.highpass
            + self.notch * mix.notch
    }
}

pub struct SVFilter {
    ic1eq: f32, // First integrator's memory
    ic2eq: f32, // Second integrator's memory

    cutoff_hz: f32,
    resonance: f32,
    sample_rate: f32,

    // Cached coefficients, refreshed whenever cutoff/resonance change
    g: f32,
    k: f32,
}

impl SVFilter {
    pub fn new() -> Self {
        let mut filter = Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            cutoff_hz: 1000.0,
            resonance: 1.0,
            sample_rate: SAMPLE_RATE as f32,
            g: 0.0,
            k: 1.0,
        };
        filter.update_coefficients();
        filter
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_coefficients();
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        self.cutoff_hz = cutoff;
        self.update_coefficients();
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance;
        self.update_coefficients();
    }

    /// Set cutoff and resonance together, recomputing coefficients once.
    #[inline]
    pub fn set_params(&mut self, cutoff: f32, resonance: f32) {
        self.cutoff_hz = cutoff;
        self.resonance = resonance;
        self.update_coefficients();
    }

    #[inline]
    fn update_coefficients(&mut self) {
        // Bilinear prewarp: g = tan(pi * fc / fs)
        self.g = (PI * self.cutoff_hz / self.sample_rate).tan();
        self.k = if self.resonance == 0.0 {
            0.0
        } else {
            1.0 / self.resonance
        };
    }

    /// Advance one sample and return all four responses.
    #[inline]
    pub fn next_sample(&mut self, sample: f32) -> FilterOutputs {
        let (g, k) = (self.g, self.k);
        let h = 1.0 / (1.0 + g * (g + k));
        let v3 = sample - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;

        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;

        let highpass = sample - k * v1 - v2;
        FilterOutputs {
            lowpass: v2,
            bandpass: v1,
            highpass,
            notch: v2 + highpass,
        }
    }

    /// Advance one sample and return the weighted blend of the responses.
    #[inline]
    pub fn process(&mut self, sample: f32, mix: &FilterMix) -> f32 {
        self.next_sample(sample).mix(mix)
    }

    /// Filter a block in place with a fixed mix.
    pub fn render(&mut self, buffer: &mut [f32], mix: &FilterMix) {
        for sample in buffer.iter_mut() {
            *sample = self.process(*sample, mix);
        }
    }

    /// Clear integrator memory.
    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }
}

impl Default for SVFilter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::oscillator::{PolyBlepOscillator, Waveform};
    use std::f32::consts::TAU;

    const SR: f32 = 48_000.0;

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| (TAU * freq * n as f32 / SR).sin())
            .collect()
    }

    fn peak_after_transient(buffer: &[f32]) -> f32 {
        let skip = buffer.len().min(256);
        buffer
            .get(skip..)
            .unwrap_or(buffer)
            .iter()
            .fold(0.0f32, |acc, &x| acc.max(x.abs()))
    }

    fn filtered_peak(filter_type: FilterType, cutoff: f32, q: f32, freq: f32) -> f32 {
        let mut filter = SVFilter::new();
        filter.set_cutoff(cutoff);
        filter.set_resonance(q);
        let mut buffer = sine(freq, 2048);
        filter.render(&mut buffer, &FilterMix::single(filter_type));
        peak_after_transient(&buffer)
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut filter = SVFilter::new();
        filter.set_cutoff(500.0);
        let mut buffer = vec![1.0; 512];

        filter.render(&mut buffer, &FilterMix::single(FilterType::LowPass));

        assert!(buffer[511] > 0.99, "got {}", buffer[511]);
    }

    #[test]
    fn test_highpass_blocks_dc() {
        let mut filter = SVFilter::new();
        filter.set_cutoff(500.0);
        let mut buffer = vec![1.0; 512];

        filter.render(&mut buffer, &FilterMix::single(FilterType::HighPass));

        assert!(buffer[511].abs() < 0.001, "got {}", buffer[511]);
    }

    #[test]
    fn test_lowpass_filters_high_freq() {
        let peak = filtered_peak(FilterType::LowPass, 500.0, 0.707, 5_000.0);
        assert!(peak < 0.05, "expected high freq attenuation, got peak: {peak}");
    }

    #[test]
    fn test_bandpass_emphasizes_cutoff_frequency() {
        let pass = filtered_peak(FilterType::BandPass, 1_000.0, 2.0, 1_000.0);
        let off = filtered_peak(FilterType::BandPass, 1_000.0, 2.0, 200.0);
        assert!(pass > off * 2.0, "pass={pass}, off={off}");
    }

    #[test]
    fn test_notch_rejects_cutoff_frequency() {
        let center = filtered_peak(FilterType::Notch, 1_000.0, 1.0, 1_000.0);
        let off = filtered_peak(FilterType::Notch, 1_000.0, 1.0, 200.0);
        assert!(center * 2.0 < off, "center={center}, off={off}");
    }

    #[test]
    fn test_resonance_boosts_cutoff() {
        let low_q = filtered_peak(FilterType::LowPass, 1_000.0, 0.5, 1_000.0);
        let high_q = filtered_peak(FilterType::LowPass, 1_000.0, 4.0, 1_000.0);
        assert!(high_q > low_q * 2.0, "high_q={high_q}, low_q={low_q}");
    }

    #[test]
    fn test_outputs_mix_linearly() {
        let mut a = SVFilter::new();
        let mut b = SVFilter::new();
        let mix = FilterMix::new(0.25, 0.5, 0.75, 1.0);

        let mut osc = PolyBlepOscillator::new(Waveform::Saw);
        for _ in 0..256 {
            let x = osc.next_sample(330.0);
            let outputs = a.next_sample(x);
            let expected = 0.25 * outputs.lowpass
                + 0.5 * outputs.bandpass
                + 0.75 * outputs.highpass
                + outputs.notch;
            assert!((b.process(x, &mix) - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_near_nyquist_cutoff_stays_finite() {
        let mut filter = SVFilter::new();
        filter.set_cutoff(23_999.0);
        filter.set_resonance(16.0);
        let mut osc = PolyBlepOscillator::new(Waveform::Rectangle);

        for _ in 0..48_000 {
            let y = filter.process(osc.next_sample(110.0), &FilterMix::single(FilterType::LowPass));
            assert!(y.is_finite());
        }
    }

    #[test]
    fn test_single_mixes_have_unit_sum() {
        for filter_type in [
            FilterType::LowPass,
            FilterType::HighPass,
            FilterType::BandPass,
            FilterType::Notch,
        ] {
            assert_eq!(FilterMix::single(filter_type).sum(), 1.0);
        }
    }

    #[test]
    fn test_reset_clears_memory() {
        let mut filter = SVFilter::new();
        let mix = FilterMix::single(FilterType::LowPass);
        for _ in 0..64 {
            filter.process(1.0, &mix);
        }
        filter.reset();
        let mut fresh = SVFilter::new();
        assert_eq!(filter.process(0.5, &mix), fresh.process(0.5, &mix));
    }
}
