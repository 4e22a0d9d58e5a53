#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::SAMPLE_RATE;

/*
ADSR Envelope Generators
========================

Two engines live here behind one trait. The voice picks one at construction
and never branches on it again.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0).

  gate        The note held signal, sampled every tick. The envelope watches
              the gate itself: a high gate starts (or continues) the sounding
              phases, a low gate lets it release.

  stage       Which phase we're in: Idle, Attack, Decay, Hold/Sustain, Release.


Exponential engine (ExpAdsr)
----------------------------

  Level
    1.0 ┐    /\
        │   /  `-.__________
    S   │  /                 \
        │ /                   `-._
    0.0 └/────────────────────────`--→ Time

Attack is a straight ramp. Decay and release are multiplicative: every sample
the level is scaled by a coefficient chosen so that after the configured time
only 1% of the starting level is left:

    coeff = 0.01 ^ (1 / (time_ms * sample_rate / 1000))

Because release only ever multiplies, it approaches zero but never overshoots
below it. A rising gate during release re-enters attack from the current
level, so retriggers do not click.

After decay reaches sustain the engine holds for one sample before it starts
listening to the gate for release.


Linear engine (LinearAdsr)
--------------------------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲
    0.0 └─╱───────────────────╲──→ Time

All four stages are straight lines. A rising gate edge restarts attack from
zero; a falling edge releases linearly from wherever the level is, hitting
exactly 0.0 after the release time.
*/

/// Level the multiplicative stages fall to after their configured time.
const EXP_TARGET_RATIO: f32 = 0.01;
/// Samples spent at sustain before a low gate may start release.
const HOLD_SAMPLES: u32 = 1;
/// Decaying levels below this snap to zero (about -120 dB).
const SILENCE_FLOOR: f32 = 1e-6;

/// An ADSR generator driven by a per-sample gate.
pub trait EnvelopeGenerator {
    fn set_sample_rate(&mut self, sample_rate: f32);
    fn set_attack_ms(&mut self, ms: f32);
    fn set_decay_ms(&mut self, ms: f32);
    fn set_sustain(&mut self, level: f32);
    fn set_release_ms(&mut self, ms: f32);

    /// Advance one sample with the current gate and return the new level.
    fn next_sample(&mut self, gate: bool) -> f32;

    /// Current level without advancing.
    fn level(&self) -> f32;

    /// True while the envelope is producing a non-idle level.
    fn is_active(&self) -> bool;

    /// Return to idle at level zero.
    fn reset(&mut self);

    /// Render a block of envelope values with a fixed gate.
    fn render(&mut self, buffer: &mut [f32], gate: bool) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(gate);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeKind {
    #[default]
    Exponential,
    Linear,
}

#[inline]
fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    (ms * sample_rate * 0.001).max(1.0)
}

#[derive(Debug, Clone)]
pub struct ExpAdsr {
    attack_ms: f32,
    decay_ms: f32,
    release_ms: f32,
    sustain: f32,
    sample_rate: f32,

    // Per-sample coefficients derived from the times above
    attack_step: f32,
    decay_coeff: f32,
    release_coeff: f32,

    stage: EnvelopeStage,
    level: f32,
    hold_count: u32,
}

impl ExpAdsr {
    pub fn new() -> Self {
        let mut env = Self {
            attack_ms: 1.0,
            decay_ms: 1.0,
            release_ms: 1.0,
            sustain: 1.0,
            sample_rate: SAMPLE_RATE as f32,
            attack_step: 1.0,
            decay_coeff: 0.0,
            release_coeff: 0.0,
            stage: EnvelopeStage::Idle,
            level: 0.0,
            hold_count: 0,
        };
        env.update_coefficients();
        env
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    fn update_coefficients(&mut self) {
        self.attack_step = 1.0 / ms_to_samples(self.attack_ms, self.sample_rate);
        self.decay_coeff =
            EXP_TARGET_RATIO.powf(1.0 / ms_to_samples(self.decay_ms, self.sample_rate));
        self.release_coeff =
            EXP_TARGET_RATIO.powf(1.0 / ms_to_samples(self.release_ms, self.sample_rate));
    }
}

impl Default for ExpAdsr {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeGenerator for ExpAdsr {
    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.update_coefficients();
    }

    fn set_attack_ms(&mut self, ms: f32) {
        self.attack_ms = ms;
        self.update_coefficients();
    }

    fn set_decay_ms(&mut self, ms: f32) {
        self.decay_ms = ms;
        self.update_coefficients();
    }

    fn set_sustain(&mut self, level: f32) {
        self.sustain = level;
    }

    fn set_release_ms(&mut self, ms: f32) {
        self.release_ms = ms;
        self.update_coefficients();
    }

    fn next_sample(&mut self, gate: bool) -> f32 {
        let sounding = matches!(
            self.stage,
            EnvelopeStage::Attack | EnvelopeStage::Decay | EnvelopeStage::Sustain
        );
        if gate && !sounding {
            self.hold_count = 0;
            self.stage = EnvelopeStage::Attack;
        }

        // Stages fall through within one sample, so a transition is applied
        // immediately rather than on the next tick.
        if self.stage == EnvelopeStage::Attack {
            self.level += self.attack_step;
            if self.level >= 1.0 {
                self.level = 1.0;
                self.stage = EnvelopeStage::Decay;
            }
        }

        if self.stage == EnvelopeStage::Decay {
            self.level *= self.decay_coeff;
            if self.level < SILENCE_FLOOR {
                self.level = 0.0;
            }
            if self.level <= self.sustain {
                self.stage = EnvelopeStage::Sustain;
            }
        }

        if self.stage == EnvelopeStage::Sustain {
            if self.hold_count < HOLD_SAMPLES {
                self.hold_count += 1;
            }
            if self.hold_count >= HOLD_SAMPLES && !gate {
                self.stage = EnvelopeStage::Release;
            }
        }

        if self.stage == EnvelopeStage::Release {
            self.level *= self.release_coeff;
            if self.level < SILENCE_FLOOR {
                self.level = 0.0;
                self.stage = EnvelopeStage::Idle;
            }
        }

        self.level
    }

    fn level(&self) -> f32 {
        self.level
    }

    fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeStage::Idle) && self.level > 0.0
    }

    fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
        self.hold_count = 0;
    }
}

#[derive(Debug, Clone)]
pub struct LinearAdsr {
    // ADSR parameters (define the envelope shape)
    attack_ms: f32,
    decay_ms: f32,
    sustain_level: f32,
    release_ms: f32,
    sample_rate: f32,

    // Runtime state (changes every sample)
    stage: EnvelopeStage,
    level: f32,
    last_gate: bool,

    // Decay bookkeeping
    decay_start_level: f32,

    // Release bookkeeping (snapshotted at the falling gate edge)
    release_start_level: f32,
    release_total_samples: u32,
    release_elapsed_samples: u32,
}

impl LinearAdsr {
    pub fn new() -> Self {
        Self {
            attack_ms: 10.0,
            decay_ms: 100.0,
            sustain_level: 0.7,
            release_ms: 300.0,
            sample_rate: SAMPLE_RATE as f32,

            stage: EnvelopeStage::Idle,
            level: 0.0,
            last_gate: false,
            decay_start_level: 0.0,
            release_start_level: 0.0,
            release_total_samples: 1,
            release_elapsed_samples: 0,
        }
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    fn note_on(&mut self) {
        self.level = 0.0;
        self.stage = EnvelopeStage::Attack;
        self.release_elapsed_samples = 0;
    }

    fn note_off(&mut self) {
        if matches!(self.stage, EnvelopeStage::Idle) {
            return;
        }

        self.release_start_level = self.level;
        self.release_total_samples = ms_to_samples(self.release_ms, self.sample_rate).round() as u32;
        self.release_elapsed_samples = 0;
        self.stage = EnvelopeStage::Release;
    }
}

impl Default for LinearAdsr {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeGenerator for LinearAdsr {
    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    fn set_attack_ms(&mut self, ms: f32) {
        self.attack_ms = ms;
    }

    fn set_decay_ms(&mut self, ms: f32) {
        self.decay_ms = ms;
    }

    fn set_sustain(&mut self, level: f32) {
        self.sustain_level = level.clamp(0.0, 1.0);
    }

    fn set_release_ms(&mut self, ms: f32) {
        self.release_ms = ms;
    }

    fn next_sample(&mut self, gate: bool) -> f32 {
        match (self.last_gate, gate) {
            (false, true) => self.note_on(),
            (true, false) => self.note_off(),
            _ => {}
        }
        self.last_gate = gate;

        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }

            EnvelopeStage::Attack => {
                self.level += 1.0 / ms_to_samples(self.attack_ms, self.sample_rate);

                if self.level >= 1.0 {
                    self.level = 1.0;
                    self.decay_start_level = 1.0;
                    self.stage = EnvelopeStage::Decay;
                }
            }

            EnvelopeStage::Decay => {
                let target = self.sustain_level;
                let total_drop = self.decay_start_level - target;
                self.level -= total_drop / ms_to_samples(self.decay_ms, self.sample_rate);

                if self.level <= target {
                    self.level = target;
                    self.stage = EnvelopeStage::Sustain;
                }
            }

            EnvelopeStage::Sustain => {
                self.level = self.sustain_level;
            }

            EnvelopeStage::Release => {
                // level = start * (1 - elapsed/total)
                let progress =
                    self.release_elapsed_samples as f32 / self.release_total_samples as f32;
                self.level = (self.release_start_level * (1.0 - progress)).max(0.0);

                self.release_elapsed_samples = self.release_elapsed_samples.saturating_add(1);

                if self.release_elapsed_samples >= self.release_total_samples {
                    self.level = 0.0;
                    self.stage = EnvelopeStage::Idle;
                }
            }
        }

        self.level
    }

    fn level(&self) -> f32 {
        self.level
    }

    fn is_active(&self) -> bool {
        !matches!(self.stage, EnvelopeStage::Idle)
    }

    fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
        self.last_gate = false;
        self.decay_start_level = 0.0;
        self.release_elapsed_samples = 0;
        self.release_start_level = 0.0;
    }
}

/// Envelope engine chosen once at construction.
#[derive(Debug, Clone)]
pub enum Envelope {
    Exponential(ExpAdsr),
    Linear(LinearAdsr),
}

impl Envelope {
    pub fn new(kind: EnvelopeKind) -> Self {
        match kind {
            EnvelopeKind::Exponential => Envelope::Exponential(ExpAdsr::new()),
            EnvelopeKind::Linear => Envelope::Linear(LinearAdsr::new()),
        }
    }

    pub fn kind(&self) -> EnvelopeKind {
        match self {
            Envelope::Exponential(_) => EnvelopeKind::Exponential,
            Envelope::Linear(_) => EnvelopeKind::Linear,
        }
    }

    pub fn stage(&self) -> EnvelopeStage {
        match self {
            Envelope::Exponential(env) => env.stage(),
            Envelope::Linear(env) => env.stage(),
        }
    }

    #[inline]
    fn engine(&self) -> &dyn EnvelopeGenerator {
        match self {
            Envelope::Exponential(env) => env,
            Envelope::Linear(env) => env,
        }
    }

    #[inline]
    fn engine_mut(&mut self) -> &mut dyn EnvelopeGenerator {
        match self {
            Envelope::Exponential(env) => env,
            Envelope::Linear(env) => env,
        }
    }
}

impl EnvelopeGenerator for Envelope {
    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.engine_mut().set_sample_rate(sample_rate)
    }

    fn set_attack_ms(&mut self, ms: f32) {
        self.engine_mut().set_attack_ms(ms)
    }

    fn set_decay_ms(&mut self, ms: f32) {
        self.engine_mut().set_decay_ms(ms)
    }

    fn set_sustain(&mut self, level: f32) {
        self.engine_mut().set_sustain(level)
    }

    fn set_release_ms(&mut self, ms: f32) {
        self.engine_mut().set_release_ms(ms)
    }

    #[inline]
    fn next_sample(&mut self, gate: bool) -> f32 {
        match self {
            Envelope::Exponential(env) => env.next_sample(gate),
            Envelope::Linear(env) => env.next_sample(gate),
        }
    }

    fn level(&self) -> f32 {
        self.engine().level()
    }

    fn is_active(&self) -> bool {
        self.engine().is_active()
    }

    fn reset(&mut self) {
        self.engine_mut().reset()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 1_000.0;

    fn configured(kind: EnvelopeKind, a: f32, d: f32, s: f32, r: f32) -> Envelope {
        let mut env = Envelope::new(kind);
        env.set_sample_rate(SAMPLE_RATE);
        env.set_attack_ms(a);
        env.set_decay_ms(d);
        env.set_sustain(s);
        env.set_release_ms(r);
        env
    }

    fn run(env: &mut Envelope, samples: usize, gate: bool) -> f32 {
        for _ in 0..samples {
            env.next_sample(gate);
        }
        env.level()
    }

    #[test]
    fn attack_reaches_full_level() {
        for kind in [EnvelopeKind::Exponential, EnvelopeKind::Linear] {
            // 100 ms attack at 1 kHz = 100 samples
            let mut env = configured(kind, 100.0, 100.0, 0.7, 20.0);
            let mut peak = 0.0f32;
            for _ in 0..101 {
                peak = peak.max(env.next_sample(true));
            }
            assert!(peak > 0.98, "{kind:?} attack peaked at {peak}");
        }
    }

    #[test]
    fn sustain_holds_target_level() {
        for kind in [EnvelopeKind::Exponential, EnvelopeKind::Linear] {
            let mut env = configured(kind, 5.0, 1_000.0, 0.6, 20.0);
            let level = run(&mut env, 2_000, true);
            assert!((level - 0.6).abs() < 0.01, "{kind:?} sustain at {level}");
            assert_eq!(env.stage(), EnvelopeStage::Sustain);
        }
    }

    #[test]
    fn exponential_release_falls_below_one_percent() {
        let mut env = configured(EnvelopeKind::Exponential, 1.0, 1_000.0, 1.0, 50.0);
        run(&mut env, 20, true);
        let start = env.level();
        let level = run(&mut env, 50, false);
        assert!(level <= start * 0.0101, "level {level} after release time");
        let level = run(&mut env, 2_000, false);
        assert!(level < 1e-6);
    }

    #[test]
    fn exponential_release_settles_at_zero() {
        let mut env = configured(EnvelopeKind::Exponential, 1.0, 1_000.0, 1.0, 10.0);
        run(&mut env, 20, true);
        assert_eq!(run(&mut env, 200, false), 0.0);
        assert_eq!(env.stage(), EnvelopeStage::Idle);
        assert!(!env.is_active());

        // Zero sustain ends the decay on an exact zero too
        let mut env = configured(EnvelopeKind::Exponential, 1.0, 10.0, 0.0, 10.0);
        assert_eq!(run(&mut env, 200, true), 0.0);
        assert_eq!(env.stage(), EnvelopeStage::Sustain);
    }

    #[test]
    fn linear_release_falls_back_to_idle() {
        let mut env = configured(EnvelopeKind::Linear, 10.0, 50.0, 0.5, 30.0);
        run(&mut env, 20, true);
        let level = run(&mut env, 32, false);
        assert!(level <= 0.001);
        assert_eq!(env.stage(), EnvelopeStage::Idle);
        assert!(!env.is_active());
    }

    #[test]
    fn exponential_retrigger_starts_from_current_level() {
        let mut env = configured(EnvelopeKind::Exponential, 100.0, 1_000.0, 1.0, 100.0);
        run(&mut env, 200, true);
        run(&mut env, 30, false);
        let released = env.level();
        assert!(released > 0.1 && released < 1.0);

        let next = env.next_sample(true);
        assert_eq!(env.stage(), EnvelopeStage::Attack);
        assert!(next > released, "retrigger should continue upward without a reset");
    }

    #[test]
    fn exponential_short_gate_still_completes_attack() {
        let mut env = configured(EnvelopeKind::Exponential, 100.0, 10.0, 0.5, 10.0);
        env.next_sample(true);
        let mut peak = 0.0f32;
        for _ in 0..110 {
            peak = peak.max(env.next_sample(false));
        }
        assert!(peak > 0.98, "attack should run to the top, peak {peak}");
    }

    #[test]
    fn idle_envelope_outputs_zero() {
        for kind in [EnvelopeKind::Exponential, EnvelopeKind::Linear] {
            let mut env = configured(kind, 1.0, 1.0, 1.0, 1.0);
            assert_eq!(run(&mut env, 100, false), 0.0);
        }
    }

    #[test]
    fn reset_returns_to_idle() {
        for kind in [EnvelopeKind::Exponential, EnvelopeKind::Linear] {
            let mut env = configured(kind, 1.0, 1.0, 1.0, 1.0);
            run(&mut env, 10, true);
            env.reset();
            assert_eq!(env.level(), 0.0);
            assert_eq!(env.stage(), EnvelopeStage::Idle);
            assert_eq!(env.kind(), kind);
        }
    }
}
