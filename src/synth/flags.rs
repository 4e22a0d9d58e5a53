//! Flags word shared between the control path and the render path.
//!
//! Writers set bits, the render loop takes them all at the start of a block.
//! Only "latest write wins" is guaranteed: the word is accessed with relaxed
//! ordering and implies nothing about the order of other field updates.

use std::sync::atomic::{AtomicU32, Ordering};

/// Clear oscillator phase and filter memory before the next block.
pub const RESET_DSP: u32 = 1 << 0;

#[derive(Debug, Default)]
pub struct RenderFlags(AtomicU32);

impl RenderFlags {
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    pub fn raise(&self, bits: u32) {
        self.0.fetch_or(bits, Ordering::Relaxed);
    }

    pub fn peek(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    /// Return every pending bit and clear the word.
    pub fn take(&self) -> u32 {
        self.0.swap(0, Ordering::Relaxed)
    }
}
