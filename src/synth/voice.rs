use tracing::{debug, info, trace, warn};

use crate::{
    dsp::{
        envelope::{Envelope, EnvelopeGenerator, EnvelopeKind},
        filter::SVFilter,
        note_to_freq,
        oscillator::{PolyBlepOscillator, Waveform},
    },
    error::InitError,
    synth::{
        flags::{RenderFlags, RESET_DSP},
        gate::Gate,
        message::{MessageReceiver, SynthMessage},
        params::{
            cutoff_frequency, Coefficients, EnvelopeSetting, Param, ParamTable, PrimitiveUpdate,
        },
    },
    unit::UNIT_HEADER,
    OUTPUT_CHANNELS, SAMPLE_RATE,
};

/*
Signal Path
===========

One voice, two oscillators, one filter, two envelopes:

    ┌──────────┐  pitch/pw    ┌──────┐
    │ mod env  │─────────────→│ osc1 │──┐ (1 - balance)
    └──────────┘  │           └──────┘  │
                  │           ┌──────┐  ├──→ × velocity ──→ ┌─────┐
                  ├──────────→│ osc2 │──┘ balance            │ SVF │──→ × amp env ──→ L/R
                  │           └──────┘                       └─────┘
                  └─────────────────── cutoff ──────────────────↑

Every sample runs the same fixed order: envelopes, oscillators, filter,
amplifier. Each stage feeds the next within the sample, so nothing here is
reordered or batched across stages.

The gate is an aggregate counter, not a per-note list: overlapping keys keep
the envelopes sounding until every key is released, and the most recent
note-on decides the pitch.
*/

/// The voice controller: parameter table, note/gate state and render loop.
pub struct Synth {
    flags: RenderFlags,
    params: ParamTable,
    coeffs: Coefficients,

    osc1: PolyBlepOscillator,
    osc2: PolyBlepOscillator,
    filter: SVFilter,
    mod_env: Envelope,
    amp_env: Envelope,

    gate: Gate,
    /// Velocity scale of the last note-on, 0.0 to 1.0.
    amp: f32,
    initialized: bool,
}

impl Synth {
    pub fn new() -> Self {
        Self::with_envelope(EnvelopeKind::default())
    }

    /// Build a synth whose envelopes use the given engine.
    pub fn with_envelope(kind: EnvelopeKind) -> Self {
        debug!(?kind, "selecting envelope engine");

        let mut synth = Self {
            flags: RenderFlags::new(),
            params: ParamTable::default(),
            coeffs: Coefficients::default(),
            osc1: PolyBlepOscillator::new(Waveform::Saw),
            osc2: PolyBlepOscillator::new(Waveform::Saw),
            filter: SVFilter::new(),
            mod_env: Envelope::new(kind),
            amp_env: Envelope::new(kind),
            gate: Gate::new(),
            amp: 1.0,
            initialized: false,
        };

        for (index, param) in UNIT_HEADER.params.iter().enumerate() {
            synth.set_parameter(index as u8, param.default);
        }
        synth
    }

    /// Accept the host's runtime description.
    ///
    /// Only 48 kHz interleaved stereo is supported. On failure the synth stays
    /// uninitialized and renders silence.
    pub fn initialize(&mut self, sample_rate: u32, output_channels: usize) -> Result<(), InitError> {
        if sample_rate != SAMPLE_RATE {
            warn!(sample_rate, "rejecting unsupported sample rate");
            return Err(InitError::UnsupportedSampleRate {
                rate: sample_rate,
                expected: SAMPLE_RATE,
            });
        }

        if output_channels != OUTPUT_CHANNELS {
            warn!(output_channels, "rejecting unsupported channel layout");
            return Err(InitError::UnsupportedChannelLayout {
                channels: output_channels,
                expected: OUTPUT_CHANNELS,
            });
        }

        let sr = sample_rate as f32;
        self.osc1.set_sample_rate(sr);
        self.osc2.set_sample_rate(sr);
        self.filter.set_sample_rate(sr);
        self.mod_env.set_sample_rate(sr);
        self.amp_env.set_sample_rate(sr);
        self.initialized = true;

        info!(
            unit = UNIT_HEADER.name,
            sample_rate,
            output_channels,
            envelope = ?self.mod_env.kind(),
            "synth initialized"
        );
        Ok(())
    }

    pub fn teardown(&mut self) {
        self.initialized = false;
        debug!("synth torn down");
    }

    /// Back to the default waveform with every gate closed.
    ///
    /// The parameter table and its coefficients are preserved; oscillator
    /// phase and filter memory are cleared at the start of the next block.
    pub fn reset(&mut self) {
        self.osc1.set_waveform(Waveform::Saw);
        self.osc2.set_waveform(Waveform::Saw);
        self.gate.clear();
        self.flags.raise(RESET_DSP);
        debug!("synth reset");
    }

    pub fn resume(&mut self) {}

    pub fn suspend(&mut self) {}

    /// Render `frames` interleaved stereo frames into `out`.
    ///
    /// Left and right carry the same sample. If `out` holds fewer than
    /// `frames` frames, only the frames that fit are written.
    pub fn render(&mut self, out: &mut [f32], frames: usize) {
        let frames = frames.min(out.len() / OUTPUT_CHANNELS);
        let out = &mut out[..frames * OUTPUT_CHANNELS];

        if !self.initialized {
            out.fill(0.0);
            return;
        }

        if self.flags.take() & RESET_DSP != 0 {
            self.osc1.reset();
            self.osc2.reset();
            self.filter.reset();
        }

        let trigger = self.gate.trigger();
        let c = &self.coeffs;

        for frame in out.chunks_exact_mut(OUTPUT_CHANNELS) {
            // Envelope
            let env = self.mod_env.next_sample(trigger);
            let amp_env = self.amp_env.next_sample(trigger);

            // Oscillator
            let pitch1 = note_to_freq(c.osc1_note(env));
            let pitch2 = note_to_freq(c.osc2_note(env));
            let pulse_width = c.pulse_width(env);
            self.osc1.set_pulse_width(pulse_width);
            self.osc2.set_pulse_width(pulse_width);
            let sig = (1.0 - c.balance) * self.osc1.next_sample(pitch1)
                + c.balance * self.osc2.next_sample(pitch2);

            // Filter
            self.filter
                .set_params(cutoff_frequency(c.cutoff_note(env)), c.resonance);
            let sig = self.filter.process(sig * self.amp, &c.mix);

            // Amplifier
            let mut sig = sig * amp_env;
            if !sig.is_finite() {
                self.osc1.reset();
                self.osc2.reset();
                self.filter.reset();
                sig = 0.0;
            }

            frame.fill(sig);
        }
    }

    /// Store `value` verbatim and update the derived coefficients.
    ///
    /// No range checking is done here; indices past the table are ignored.
    pub fn set_parameter(&mut self, index: u8, value: i32) {
        let Some(param) = Param::from_index(index) else {
            debug!(index, value, "ignoring write to unknown parameter");
            return;
        };

        trace!(?param, value, "set parameter");
        self.params.set(param, value);

        match self.coeffs.apply(param, value) {
            PrimitiveUpdate::None => {}
            PrimitiveUpdate::Osc1Waveform(waveform) => self.osc1.set_waveform(waveform),
            PrimitiveUpdate::Osc2Waveform(waveform) => self.osc2.set_waveform(waveform),
            PrimitiveUpdate::ModEnvelope(setting) => configure_envelope(&mut self.mod_env, setting),
            PrimitiveUpdate::AmpEnvelope(setting) => configure_envelope(&mut self.amp_env, setting),
        }
    }

    /// The raw value last written to `index`, or 0 for unknown indices.
    pub fn get_parameter_value(&self, index: u8) -> i32 {
        Param::from_index(index)
            .map(|param| self.params.get(param))
            .unwrap_or(0)
    }

    /// Display label for enumerated parameters (waveforms, filter mode).
    ///
    /// Labels are static and stay valid across calls.
    pub fn get_parameter_str(&self, index: u8, value: i32) -> Option<&'static str> {
        Param::from_index(index).and_then(|param| param.display_str(value))
    }

    /// Bitmap display values are not provided by this unit.
    pub fn get_parameter_bmp(&self, _index: u8, _value: i32) -> Option<&'static [u8]> {
        None
    }

    pub fn note_on(&mut self, note: u8, velocity: u8) {
        self.coeffs.note = i32::from(note);
        self.gate_on(velocity);
    }

    /// Close one gate. The note number is not matched against held notes.
    pub fn note_off(&mut self, _note: u8) {
        self.gate_off();
    }

    pub fn gate_on(&mut self, velocity: u8) {
        self.amp = f32::from(velocity) / 127.0;
        self.gate.open();
    }

    pub fn gate_off(&mut self) {
        self.gate.close();
    }

    pub fn all_notes_off(&mut self) {}

    pub fn pitch_bend(&mut self, _bend: u16) {}

    pub fn channel_pressure(&mut self, _pressure: u8) {}

    pub fn aftertouch(&mut self, _note: u8, _aftertouch: u8) {}

    pub fn load_preset(&mut self, _index: u8) {}

    pub fn preset_index(&self) -> u8 {
        0
    }

    pub fn preset_name(_index: u8) -> Option<&'static str> {
        None
    }

    pub fn handle_message(&mut self, msg: SynthMessage) {
        match msg {
            SynthMessage::NoteOn { note, velocity } => self.note_on(note, velocity),
            SynthMessage::NoteOff { note } => self.note_off(note),
            SynthMessage::SetParameter { index, value } => self.set_parameter(index, value),
            SynthMessage::PitchBend { value } => self.pitch_bend(value),
            SynthMessage::ChannelPressure { value } => self.channel_pressure(value),
            SynthMessage::Aftertouch { note, value } => self.aftertouch(note, value),
            SynthMessage::AllNotesOff => self.all_notes_off(),
            SynthMessage::Reset => self.reset(),
        }
    }

    /// Apply every pending message. Call before `render` on the audio thread.
    pub fn drain<R: MessageReceiver + ?Sized>(&mut self, rx: &mut R) {
        while let Some(msg) = rx.pop() {
            self.handle_message(msg);
        }
    }

    /// Number of currently open gates.
    pub fn gate(&self) -> u32 {
        self.gate.count()
    }

    pub fn note(&self) -> i32 {
        self.coeffs.note
    }

    pub fn amplitude(&self) -> f32 {
        self.amp
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coeffs
    }

    pub fn params(&self) -> &ParamTable {
        &self.params
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn envelope_kind(&self) -> EnvelopeKind {
        self.mod_env.kind()
    }

    pub fn waveforms(&self) -> (Waveform, Waveform) {
        (self.osc1.waveform(), self.osc2.waveform())
    }

    /// Current amplitude envelope level, for metering.
    pub fn envelope_level(&self) -> f32 {
        self.amp_env.level()
    }
}

impl Default for Synth {
    fn default() -> Self {
        Self::new()
    }
}

fn configure_envelope(env: &mut Envelope, setting: EnvelopeSetting) {
    match setting {
        EnvelopeSetting::AttackMs(ms) => env.set_attack_ms(ms),
        EnvelopeSetting::DecayMs(ms) => env.set_decay_ms(ms),
        EnvelopeSetting::Sustain(level) => env.set_sustain(level),
        EnvelopeSetting::ReleaseMs(ms) => env.set_release_ms(ms),
    }
}
