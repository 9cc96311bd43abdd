//! Numeric range semantics
//!
//! A `NumericRange` is the closed interval constraining a numeric feature,
//! with an optional step. A range whose step is a whole number is an
//! *integer range*: only whole values are members.

use serde::{Deserialize, Serialize};

/// Closed interval with optional step
///
/// Invariant: `min <= max`. Malformed ranges are a caller responsibility
/// and not defended against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericRange {
    /// Lower bound (inclusive)
    pub min: f64,
    /// Upper bound (inclusive)
    pub max: f64,
    /// Step between admissible values, if any
    pub step: Option<f64>,
}

impl NumericRange {
    /// Create a range without a step
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            step: None,
        }
    }

    /// Set the step
    #[must_use]
    pub const fn with_step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    /// Membership test
    ///
    /// A value is in range iff `min <= value <= max`, and, for integer
    /// ranges, the value carries no fractional part.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        if value < self.min || value > self.max {
            return false;
        }
        if self.is_integer() && value.fract() != 0.0 {
            return false;
        }
        true
    }

    /// True iff the step is defined and is a whole number
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.step.is_some_and(|step| step.fract() == 0.0)
    }

    /// Number of whole values covered: `floor(max - min) + 1`
    ///
    /// Only meaningful when [`Self::is_integer`] is true.
    #[must_use]
    pub fn length(&self) -> u64 {
        (self.max - self.min).floor() as u64 + 1
    }
}

impl std::fmt::Display for NumericRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} - {}", self.min, self.max)
    }
}
