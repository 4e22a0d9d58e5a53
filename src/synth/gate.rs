//! Aggregate gate counter for the single voice.
//!
//! Overlapping key presses are counted, not tracked per note: a note-off for
//! any key closes one gate. The envelopes see a single boolean, "at least one
//! key is held".

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Gate {
    count: u32,
}

impl Gate {
    pub fn new() -> Self {
        Self { count: 0 }
    }

    /// Open one more gate.
    pub fn open(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    /// Close one gate; a no-op when none are open.
    pub fn close(&mut self) {
        if self.count > 0 {
            self.count -= 1;
        }
    }

    pub fn clear(&mut self) {
        self.count = 0;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Envelope trigger: true while any gate is open.
    pub fn trigger(&self) -> bool {
        self.count > 0
    }
}
