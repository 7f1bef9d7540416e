use std::fmt;

use serde::{Deserialize, Serialize};

/// Encoded sequence of transmit (0) / reflect (1) choices from a beam origin.
///
/// A split on key `k` yields `2k` for the transmitted branch and `2k + 1`
/// for the reflected one, so the most recent choice sits in the lowest bit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct BranchKey(pub u64);

impl BranchKey {
    pub const ROOT: BranchKey = BranchKey(0);

    pub fn new(bits: u64) -> Self {
        Self(bits)
    }

    pub fn bits(self) -> u64 {
        self.0
    }

    /// Key of the straight-through continuation, `None` on overflow.
    pub fn transmitted(self) -> Option<BranchKey> {
        self.0.checked_mul(2).map(BranchKey)
    }

    /// Key of the reflected continuation, `None` on overflow.
    pub fn reflected(self) -> Option<BranchKey> {
        self.0
            .checked_mul(2)
            .and_then(|k| k.checked_add(1))
            .map(BranchKey)
    }

    /// True when the transmitted child is the same key (only the zero key).
    pub fn continues_in_place(self) -> bool {
        self.transmitted() == Some(self)
    }
}

impl From<u64> for BranchKey {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}

impl fmt::Display for BranchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0b{:b}", self.0)
    }
}

/// How far a beam is marched before an element is placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Constraint {
    /// Distance along the propagation direction from the previous frame.
    Distance(f64),
    /// March until the beam reaches this x coordinate.
    AbsoluteX(f64),
    /// March until the beam reaches this y coordinate.
    AbsoluteY(f64),
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Distance(d) => write!(f, "distance {d}"),
            Constraint::AbsoluteX(x) => write!(f, "x = {x}"),
            Constraint::AbsoluteY(y) => write!(f, "y = {y}"),
        }
    }
}
