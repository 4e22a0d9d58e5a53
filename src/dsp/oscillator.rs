#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::SAMPLE_RATE;

/*
PolyBLEP Oscillator
===================

A naive sawtooth or pulse wave jumps instantly between two values. That
discontinuity contains energy at every frequency, and everything above
Nyquist folds back into the audible band as aliasing.

PolyBLEP (polynomial band-limited step) smooths each jump with a two-sample
polynomial correction centered on the discontinuity:

    naive saw:   ╱│╱│╱│      corrected:  ╱╲╱╲╱  (edges rounded over ±1 sample)

Triangle has no jumps, only corners (slope discontinuities). It is corrected
with the integrated version of the step, the BLAMP.

Vocabulary
----------

  phase        Position within one cycle, kept in [0, 1).
  dt           Phase increment per sample = freq / sample_rate.
  pulse width  Fraction of the cycle the rectangle spends high (0.5 = square).

The rectangle output is DC-free: it swings between `2 - 2*pw` and `-2*pw`, so
narrowing the pulse does not shift the signal's average.
*/

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Saw,
    Rectangle,
    Triangle,
}

impl Waveform {
    /// Map a raw selector value: 0 → saw, 1 → rectangle, anything else → triangle.
    pub fn from_raw(value: i32) -> Self {
        match value {
            0 => Waveform::Saw,
            1 => Waveform::Rectangle,
            _ => Waveform::Triangle,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PolyBlepOscillator {
    waveform: Waveform,
    phase: f32,
    pulse_width: f32,
    sample_rate: f32,
}

impl PolyBlepOscillator {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            phase: 0.0,
            pulse_width: 0.5,
            sample_rate: SAMPLE_RATE as f32,
        }
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn set_pulse_width(&mut self, pulse_width: f32) {
        self.pulse_width = pulse_width;
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    /// Rewind to the start of the cycle.
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Produce one sample at `freq_hz`, then advance the phase.
    ///
    /// Frequencies are limited to 0..=Nyquist.
    #[inline]
    pub fn next_sample(&mut self, freq_hz: f32) -> f32 {
        let dt = (freq_hz / self.sample_rate).clamp(0.0, 0.5);
        if !self.phase.is_finite() {
            self.phase = 0.0;
        }

        let sample = match self.waveform {
            Waveform::Saw => self.saw(dt),
            Waveform::Rectangle => self.rectangle(dt),
            Waveform::Triangle => self.triangle(dt),
        };

        self.phase += dt;
        self.phase -= self.phase.floor();

        sample
    }

    /// Fill `buffer` with consecutive samples at a fixed frequency.
    pub fn render(&mut self, buffer: &mut [f32], freq_hz: f32) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(freq_hz);
        }
    }

    #[inline]
    fn saw(&self, dt: f32) -> f32 {
        let t = wrap(self.phase + 0.5);
        2.0 * t - 1.0 - poly_blep(t, dt)
    }

    #[inline]
    fn rectangle(&self, dt: f32) -> f32 {
        let pw = self.pulse_width;
        let t2 = wrap(self.phase + 1.0 - pw);

        let mut y = -2.0 * pw;
        if self.phase < pw {
            y += 2.0;
        }
        y + poly_blep(self.phase, dt) - poly_blep(t2, dt)
    }

    #[inline]
    fn triangle(&self, dt: f32) -> f32 {
        let t1 = wrap(self.phase + 0.25);
        let t2 = wrap(self.phase + 0.75);

        let mut y = self.phase * 4.0;
        if y >= 3.0 {
            y -= 4.0;
        } else if y > 1.0 {
            y = 2.0 - y;
        }
        y + 4.0 * dt * (poly_blamp(t1, dt) - poly_blamp(t2, dt))
    }
}

impl Default for PolyBlepOscillator {
    fn default() -> Self {
        Self::new(Waveform::Saw)
    }
}

#[inline]
fn wrap(t: f32) -> f32 {
    t - t.floor()
}

/// Band-limited step residual around a discontinuity at phase 0.
#[inline]
fn poly_blep(t: f32, dt: f32) -> f32 {
    if t < dt {
        let x = t / dt - 1.0;
        -x * x
    } else if t > 1.0 - dt {
        let x = (t - 1.0) / dt + 1.0;
        x * x
    } else {
        0.0
    }
}

/// Band-limited ramp residual (integrated step) for slope discontinuities.
#[inline]
fn poly_blamp(t: f32, dt: f32) -> f32 {
    if t < dt {
        let x = t / dt - 1.0;
        -(x * x * x) / 3.0
    } else if t > 1.0 - dt {
        let x = (t - 1.0) / dt + 1.0;
        (x * x * x) / 3.0
    } else {
        0.0
    }
}
