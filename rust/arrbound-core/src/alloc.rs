//! Checked array allocation for the VM's `NewArray`.
//!
//! A request is validated against [`AllocationLimits`] before any memory is
//! reserved, and the reservation itself is fallible, so a multi-exabyte
//! request fails fast instead of aborting the process.

use crate::outcome::FailureKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Largest element count a single array may hold.
pub const MAX_ARRAY_LENGTH: u64 = 0x7FFF_FFC7;

/// Default memory budget for a single array: 256 MiB.
pub const DEFAULT_MAX_BYTES: u64 = 256 * 1024 * 1024;

/// Largest budget a configuration may set: 4 GiB.
pub const MAX_BYTES_CEILING: u64 = 4 * 1024 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AllocationLimits {
    pub max_length: u64,
    pub max_bytes: u64,
}

impl Default for AllocationLimits {
    fn default() -> Self {
        Self {
            max_length: MAX_ARRAY_LENGTH,
            max_bytes: DEFAULT_MAX_BYTES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("array length {0} is negative")]
    NegativeLength(i128),
    #[error("array length {length} exceeds the maximum of {max} elements")]
    LengthOverflow { length: i128, max: u64 },
    #[error("{length} elements of {element_size} bytes exceed the {budget}-byte budget")]
    BudgetExceeded {
        length: u64,
        element_size: usize,
        budget: u64,
    },
    #[error("reserving {length} elements failed: {reason}")]
    Reserve { length: usize, reason: String },
}

impl AllocError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AllocError::NegativeLength(_) => FailureKind::NegativeLength,
            AllocError::LengthOverflow { .. }
            | AllocError::BudgetExceeded { .. }
            | AllocError::Reserve { .. } => FailureKind::CapacityExceeded,
        }
    }
}

impl AllocationLimits {
    /// Validate a request for `length` slots of `element_size` bytes and
    /// return the length as a `usize`.
    pub fn check(&self, length: i128, element_size: usize) -> Result<usize, AllocError> {
        if length < 0 {
            return Err(AllocError::NegativeLength(length));
        }
        if length > self.max_length as i128 {
            return Err(AllocError::LengthOverflow {
                length,
                max: self.max_length,
            });
        }
        // length <= max_length <= u64::MAX from here on
        let count = length as u64;
        let bytes = count.checked_mul(element_size as u64);
        if !matches!(bytes, Some(b) if b <= self.max_bytes) {
            return Err(AllocError::BudgetExceeded {
                length: count,
                element_size,
                budget: self.max_bytes,
            });
        }
        usize::try_from(count).map_err(|_| AllocError::LengthOverflow {
            length,
            max: self.max_length,
        })
    }
}

/// Allocate `length` copies of `fill`, charging `element_size` bytes per
/// slot against `limits`.
pub fn allocate_filled<T: Clone>(
    length: i128,
    element_size: usize,
    limits: &AllocationLimits,
    fill: T,
) -> Result<Vec<T>, AllocError> {
    let count = limits.check(length, element_size)?;
    let mut items = Vec::new();
    items
        .try_reserve_exact(count)
        .map_err(|e| AllocError::Reserve {
            length: count,
            reason: e.to_string(),
        })?;
    items.resize(count, fill);
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_length_is_allowed() {
        let items = allocate_filled(0, 8, &AllocationLimits::default(), 0u8).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn negative_length_is_rejected_first() {
        let err = AllocationLimits::default().check(-1, 8).unwrap_err();
        assert_eq!(err, AllocError::NegativeLength(-1));
        assert_eq!(err.kind(), FailureKind::NegativeLength);
    }

    #[test]
    fn int32_max_overflows_the_length_cap() {
        let err = AllocationLimits::default()
            .check(i32::MAX as i128, 4)
            .unwrap_err();
        assert!(matches!(err, AllocError::LengthOverflow { .. }));
        assert_eq!(err.kind(), FailureKind::CapacityExceeded);
    }

    #[test]
    fn u64_max_overflows_the_length_cap() {
        let err = AllocationLimits::default()
            .check(u64::MAX as i128, 8)
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::CapacityExceeded);
    }

    #[test]
    fn budget_is_charged_per_byte() {
        let limits = AllocationLimits {
            max_length: MAX_ARRAY_LENGTH,
            max_bytes: 1024,
        };
        assert_eq!(limits.check(128, 8), Ok(128));
        assert!(matches!(
            limits.check(129, 8),
            Err(AllocError::BudgetExceeded { length: 129, .. })
        ));
    }

    #[test]
    fn fills_every_slot() {
        let items = allocate_filled(3, 16, &AllocationLimits::default(), "x").unwrap();
        assert_eq!(items, vec!["x", "x", "x"]);
    }
}
