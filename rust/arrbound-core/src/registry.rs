//! Length domain registry: the boundary values probed for each width.

use crate::width::{IntValue, LengthWidth};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One boundary length under test, tagged with its declared width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LengthProbe {
    value: IntValue,
}

impl LengthProbe {
    pub fn new(value: IntValue) -> Self {
        Self { value }
    }

    pub fn width(&self) -> LengthWidth {
        self.value.width()
    }

    pub fn value(&self) -> IntValue {
        self.value
    }

    /// The exact length requested, independent of width.
    pub fn magnitude(&self) -> i128 {
        self.value.as_i128()
    }
}

impl From<IntValue> for LengthProbe {
    fn from(value: IntValue) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for LengthProbe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.width(), self.magnitude())
    }
}

/// Ordered boundary values for `width`: 0, 1, then -1 and MIN for signed
/// widths, then MAX.
pub fn boundaries(width: LengthWidth) -> Vec<LengthProbe> {
    let mut values = vec![width.wrap(0), width.wrap(1)];
    if width.is_signed() {
        values.push(width.wrap(-1));
        values.push(width.min_value());
    }
    values.push(width.max_value());
    values.into_iter().map(LengthProbe::new).collect()
}

/// Every boundary probe of every width, in [`LengthWidth::ALL`] order.
pub fn all_probes() -> Vec<LengthProbe> {
    LengthWidth::ALL.iter().flat_map(|w| boundaries(*w)).collect()
}
