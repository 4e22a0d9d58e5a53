//! Static unit header: identity, parameter descriptors and status codes.
//!
//! This is what a hosting runtime reads to discover the unit. It is pure data;
//! the only behavior that depends on it is `Synth::new`, which loads each
//! parameter's default through `set_parameter`.

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::{error::InitError, NUM_PARAMS};

/// Success.
pub const ERR_NONE: i8 = 0;
/// Sample rate not supported by the unit.
pub const ERR_SAMPLE_RATE: i8 = -3;
/// Output geometry (channel count) not supported by the unit.
pub const ERR_GEOMETRY: i8 = -4;

/// Parameters shown together on one page of the host display.
pub const PAGE_SIZE: usize = 4;
pub const NUM_PAGES: usize = NUM_PARAMS / PAGE_SIZE;

/// How the host should display a parameter value.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    None,
    Percent,
    Msec,
    MidiNote,
    /// Enumerated; labels come from `Synth::get_parameter_str`.
    Strings,
}

#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamDescriptor {
    pub min: i32,
    pub max: i32,
    pub center: i32,
    pub default: i32,
    pub kind: ParamKind,
    /// Number of fractional decimal digits the host shows.
    pub fractional: u8,
    pub name: &'static str,
}

const fn desc(
    min: i32,
    max: i32,
    center: i32,
    default: i32,
    kind: ParamKind,
    fractional: u8,
    name: &'static str,
) -> ParamDescriptor {
    ParamDescriptor {
        min,
        max,
        center,
        default,
        kind,
        fractional,
        name,
    }
}

#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Debug, Clone, Copy)]
pub struct UnitHeader {
    pub name: &'static str,
    /// major << 16 | minor << 8 | patch
    pub version: u32,
    pub num_presets: u8,
    pub params: [ParamDescriptor; NUM_PARAMS],
}

impl UnitHeader {
    pub fn version_string(&self) -> String {
        format!(
            "{}.{}.{}",
            self.version >> 16,
            (self.version >> 8) & 0xff,
            self.version & 0xff
        )
    }

    /// Descriptors on `page`, or an empty slice past the last page.
    pub fn page(&self, page: usize) -> &[ParamDescriptor] {
        let start = page * PAGE_SIZE;
        self.params
            .get(start..start + PAGE_SIZE)
            .unwrap_or(&[])
    }
}

use ParamKind::{Msec, MidiNote, None as Plain, Percent, Strings};

pub static UNIT_HEADER: UnitHeader = UnitHeader {
    name: "maxisynthsvf",
    version: 0x0001_0000,
    num_presets: 0,
    params: [
        // Page 1
        desc(0, 127, 60, 60, MidiNote, 0, "Note"),
        desc(0, 2, 0, 0, Strings, 0, "Wave"),
        desc(0, 100, 0, 100, Percent, 0, "Cutoff"),
        desc(-128, 128, 0, 16, Plain, 5, "Reso"),
        // Page 2
        desc(0, 2000, 0, 0, Msec, 0, "Attack"),
        desc(0, 2000, 0, 0, Msec, 0, "Decay"),
        desc(0, 100, 0, 100, Percent, 0, "Sustain"),
        desc(0, 200, 0, 0, Percent, 1, "Release"),
        // Page 3
        desc(0, 4, 0, 0, Strings, 0, "Filter"),
        desc(-100, 100, 0, 0, Percent, 0, ">Pitch"),
        desc(-100, 100, 0, 0, Percent, 0, ">Cutoff"),
        desc(0, 100, 0, 0, Percent, 0, ">PWM"),
        // Page 4
        desc(0, 2000, 0, 0, Msec, 0, "vAttack"),
        desc(0, 2000, 0, 0, Msec, 0, "vDecay"),
        desc(0, 100, 0, 100, Percent, 0, "vSustain"),
        desc(0, 200, 0, 0, Percent, 1, "vRelease"),
        // Page 5
        desc(0, 2, 0, 0, Strings, 0, "OSC2"),
        desc(0, 100, 0, 0, Plain, 0, "Detune"),
        desc(-24, 24, 0, 0, Plain, 0, "Semis"),
        desc(0, 100, 0, 0, Percent, 0, "Balance"),
        // Page 6
        desc(0, 100, 0, 100, Percent, 0, "MixLP"),
        desc(0, 100, 0, 0, Percent, 0, "MixBP"),
        desc(0, 100, 0, 0, Percent, 0, "MixHP"),
        desc(0, 100, 0, 0, Percent, 0, "MixNotch"),
    ],
};

/// Collapse an initialization result into the runtime's status code.
pub fn status_code(result: &Result<(), InitError>) -> i8 {
    match result {
        Ok(()) => ERR_NONE,
        Err(err) => err.code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_lie_within_range() {
        for param in UNIT_HEADER.params.iter() {
            assert!(
                (param.min..=param.max).contains(&param.default),
                "{} default {} outside {}..={}",
                param.name,
                param.default,
                param.min,
                param.max
            );
        }
    }

    #[test]
    fn pages_cover_every_parameter() {
        let total: usize = (0..NUM_PAGES).map(|p| UNIT_HEADER.page(p).len()).sum();
        assert_eq!(total, NUM_PARAMS);
        assert_eq!(UNIT_HEADER.page(0)[0].name, "Note");
        assert_eq!(UNIT_HEADER.page(5)[3].name, "MixNotch");
        assert!(UNIT_HEADER.page(NUM_PAGES).is_empty());
    }

    #[test]
    fn version_is_one_zero_zero() {
        assert_eq!(UNIT_HEADER.version_string(), "1.0.0");
    }

    #[test]
    fn status_code_reports_success_and_failures() {
        assert_eq!(status_code(&Ok(())), ERR_NONE);
        let err = InitError::UnsupportedChannelLayout {
            channels: 6,
            expected: 2,
        };
        assert_eq!(status_code(&Err(err)), ERR_GEOMETRY);
    }
}
