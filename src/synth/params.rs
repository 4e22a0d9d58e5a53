//! Parameter table and the raw → coefficient mapping.
//!
//! The host writes signed integers. Each write is stored verbatim (so it can
//! be read back unchanged) and then mapped into engineering units the render
//! loop consumes: semitones, Hz, mix weights and milliseconds.

use crate::{
    dsp::{note_to_freq, FilterMix, FilterType, Waveform},
    NUM_PARAMS,
};

/// Highest cutoff handed to the filter, just under Nyquist at 48 kHz.
pub const MAX_CUTOFF_HZ: f32 = 23_999.0;

/// Semitones of pitch swing at EnvPitchInt = ±100.
const ENV_PITCH_RANGE: f32 = 24.0;
/// Semitones of cutoff swing at EnvCutoffInt = ±100.
const ENV_CUTOFF_RANGE: f32 = 60.0;
/// Pulse-width swing at EnvPWMInt = 100.
const ENV_PWM_RANGE: f32 = 0.49;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Param {
    Note = 0,
    Waveform,
    Cutoff,
    Resonance,
    Attack,
    Decay,
    Sustain,
    Release,
    Filter,
    EnvPitchInt,
    EnvCutoffInt,
    EnvPWMInt,
    AmpAttack,
    AmpDecay,
    AmpSustain,
    AmpRelease,
    Waveform2,
    Cents,
    Semis,
    Balance,
    MixLP,
    MixBP,
    MixHP,
    MixNotch,
}

impl Param {
    pub const ALL: [Param; NUM_PARAMS] = [
        Param::Note,
        Param::Waveform,
        Param::Cutoff,
        Param::Resonance,
        Param::Attack,
        Param::Decay,
        Param::Sustain,
        Param::Release,
        Param::Filter,
        Param::EnvPitchInt,
        Param::EnvCutoffInt,
        Param::EnvPWMInt,
        Param::AmpAttack,
        Param::AmpDecay,
        Param::AmpSustain,
        Param::AmpRelease,
        Param::Waveform2,
        Param::Cents,
        Param::Semis,
        Param::Balance,
        Param::MixLP,
        Param::MixBP,
        Param::MixHP,
        Param::MixNotch,
    ];

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Short display label for enumerated parameters, `None` otherwise or
    /// when `value` is outside the enumeration.
    pub fn display_str(self, value: i32) -> Option<&'static str> {
        let labels: &[&'static str] = match self {
            Param::Waveform | Param::Waveform2 => &WAVEFORM_LABELS,
            Param::Filter => &FILTER_LABELS,
            _ => return None,
        };
        usize::try_from(value).ok().and_then(|i| labels.get(i).copied())
    }
}

impl TryFrom<u8> for Param {
    type Error = u8;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        Param::from_index(index).ok_or(index)
    }
}

const WAVEFORM_LABELS: [&str; 3] = ["Saw", "Sqr", "Tri"];
const FILTER_LABELS: [&str; 5] = ["Low", "High", "Band", "Notch", "Custom"];

/// Filter-select values 0..=3 pick a single response; 4 picks the custom blend.
pub const FILTER_CUSTOM: i32 = 4;

/// The fixed response selected by a Filter value, or `None` for custom mode.
pub fn filter_preset(value: i32) -> Option<FilterType> {
    match value {
        0 => Some(FilterType::LowPass),
        1 => Some(FilterType::HighPass),
        2 => Some(FilterType::BandPass),
        3 => Some(FilterType::Notch),
        _ => None,
    }
}

/// Raw parameter values, exactly as last written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParamTable {
    values: [i32; NUM_PARAMS],
}

impl ParamTable {
    pub fn set(&mut self, param: Param, value: i32) {
        self.values[param as usize] = value;
    }

    pub fn get(&self, param: Param) -> i32 {
        self.values[param as usize]
    }

}

/// Envelope stage configuration produced by a parameter write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnvelopeSetting {
    AttackMs(f32),
    DecayMs(f32),
    Sustain(f32),
    ReleaseMs(f32),
}

/// Side effect on a DSP primitive's configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveUpdate {
    None,
    Osc1Waveform(Waveform),
    Osc2Waveform(Waveform),
    ModEnvelope(EnvelopeSetting),
    AmpEnvelope(EnvelopeSetting),
}

/// Everything the render loop derives from the parameter table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coefficients {
    /// Base note for both oscillators and the cutoff tracking.
    pub note: i32,
    /// Cutoff offset from the note, in semitones (about ±63.5).
    pub cutoff_offset: f32,
    /// Filter Q, 2^-4 ..= 2^4 over the host range.
    pub resonance: f32,

    /// Envelope depth into pitch, semitones.
    pub env_pitch: f32,
    /// Envelope depth into cutoff, semitones.
    pub env_cutoff: f32,
    /// Envelope depth into pulse width.
    pub env_pwm: f32,

    /// 0 = oscillator 1 only, 1 = oscillator 2 only.
    pub balance: f32,
    /// Oscillator 2 coarse offset, semitones.
    pub semis: f32,
    /// Oscillator 2 fine offset, semitones.
    pub cents: f32,

    /// Filter mode: `false` for a fixed preset, `true` for the custom blend.
    pub custom: bool,
    /// Active filter output weights.
    pub mix: FilterMix,
    /// Stored custom weights, active only when `custom` is set.
    pub custom_mix: FilterMix,
}

impl Default for Coefficients {
    fn default() -> Self {
        Self {
            note: 60,
            cutoff_offset: 0.0,
            resonance: 1.0,
            env_pitch: 0.0,
            env_cutoff: 0.0,
            env_pwm: 0.0,
            balance: 0.0,
            semis: 0.0,
            cents: 0.0,
            custom: false,
            mix: FilterMix::single(FilterType::LowPass),
            custom_mix: FilterMix::default(),
        }
    }
}

/// Stage times are never zero: raw 0 maps to 1 ms.
#[inline]
fn stage_ms(value: i32) -> f32 {
    value as f32 + 1.0
}

#[inline]
fn percent(value: i32) -> f32 {
    0.01 * value as f32
}

impl Coefficients {
    /// Map one raw write into the coefficient set and report what, if
    /// anything, the caller must reconfigure on the primitives.
    pub fn apply(&mut self, param: Param, value: i32) -> PrimitiveUpdate {
        use EnvelopeSetting::*;

        match param {
            Param::Note => self.note = value,
            Param::Waveform => return PrimitiveUpdate::Osc1Waveform(Waveform::from_raw(value)),
            Param::Waveform2 => return PrimitiveUpdate::Osc2Waveform(Waveform::from_raw(value)),
            Param::Cutoff => self.cutoff_offset = 1.27 * value as f32 - 63.5,
            Param::Resonance => self.resonance = 2.0_f32.powf(value as f32 / 32.0),
            Param::Filter => self.select_filter(value),
            Param::EnvPitchInt => self.env_pitch = ENV_PITCH_RANGE * percent(value),
            Param::EnvCutoffInt => self.env_cutoff = ENV_CUTOFF_RANGE * percent(value),
            Param::EnvPWMInt => self.env_pwm = ENV_PWM_RANGE * percent(value),
            Param::Balance => self.balance = percent(value),
            Param::Semis => self.semis = value as f32,
            Param::Cents => self.cents = percent(value),
            Param::MixLP | Param::MixBP | Param::MixHP | Param::MixNotch => {
                self.set_custom_weight(param, value)
            }

            Param::Attack => return PrimitiveUpdate::ModEnvelope(AttackMs(stage_ms(value))),
            Param::Decay => return PrimitiveUpdate::ModEnvelope(DecayMs(stage_ms(value))),
            Param::Sustain => return PrimitiveUpdate::ModEnvelope(Sustain(percent(value))),
            Param::Release => return PrimitiveUpdate::ModEnvelope(ReleaseMs(stage_ms(value))),
            Param::AmpAttack => return PrimitiveUpdate::AmpEnvelope(AttackMs(stage_ms(value))),
            Param::AmpDecay => return PrimitiveUpdate::AmpEnvelope(DecayMs(stage_ms(value))),
            Param::AmpSustain => return PrimitiveUpdate::AmpEnvelope(Sustain(percent(value))),
            Param::AmpRelease => return PrimitiveUpdate::AmpEnvelope(ReleaseMs(stage_ms(value))),
        }
        PrimitiveUpdate::None
    }

    fn select_filter(&mut self, value: i32) {
        match filter_preset(value) {
            Some(filter_type) => {
                self.custom = false;
                self.mix = FilterMix::single(filter_type);
            }
            None => {
                self.custom = true;
                self.mix = self.custom_mix;
            }
        }
    }

    fn set_custom_weight(&mut self, param: Param, value: i32) {
        let w = percent(value);
        if let Some(slot) = weight_mut(&mut self.custom_mix, param) {
            *slot = w;
        }
        if self.custom {
            if let Some(slot) = weight_mut(&mut self.mix, param) {
                *slot = w;
            }
        }
    }

    /// Oscillator 1 note for a given modulation envelope level.
    #[inline]
    pub fn osc1_note(&self, env: f32) -> f32 {
        self.note as f32 + self.env_pitch * env
    }

    /// Oscillator 2 note: oscillator 1 plus the fixed semitone/cent detune.
    #[inline]
    pub fn osc2_note(&self, env: f32) -> f32 {
        self.note as f32 + self.semis + self.cents + self.env_pitch * env
    }

    #[inline]
    pub fn pulse_width(&self, env: f32) -> f32 {
        0.5 + self.env_pwm * env
    }

    #[inline]
    pub fn cutoff_note(&self, env: f32) -> f32 {
        self.note as f32 + self.cutoff_offset + self.env_cutoff * env
    }
}

fn weight_mut(mix: &mut FilterMix, param: Param) -> Option<&mut f32> {
    match param {
        Param::MixLP => Some(&mut mix.lowpass),
        Param::MixBP => Some(&mut mix.bandpass),
        Param::MixHP => Some(&mut mix.highpass),
        Param::MixNotch => Some(&mut mix.notch),
        _ => None,
    }
}

/// Filter cutoff for a cutoff note, floored at note 0 and capped at
/// `MAX_CUTOFF_HZ`.
#[inline]
pub fn cutoff_frequency(cutoff_note: f32) -> f32 {
    note_to_freq(cutoff_note.max(0.0)).min(MAX_CUTOFF_HZ)
}
