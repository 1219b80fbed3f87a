//! Reference leg: native, statically typed allocation.
//!
//! The probe is first widened to a signed 64-bit length, then checked
//! against the length cap and byte budget and reserved directly as `Vec<T>`.
//! None of this goes through the VM's allocation routine, so a fault in
//! either one shows up as a disagreement.

use crate::native::NativeElement;
use arrbound_core::alloc::AllocationLimits;
use arrbound_core::outcome::{FailureKind, Outcome};
use arrbound_core::registry::LengthProbe;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the reference leg widens a probe to a signed 64-bit length.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceWidening {
    /// Values above `i64::MAX` cannot be expressed and fail as
    /// `CapacityExceeded`.
    #[default]
    Checked,
    /// Bare two's-complement cast: `u64::MAX` becomes -1.
    Faithful,
}

impl fmt::Display for ReferenceWidening {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceWidening::Checked => f.write_str("checked"),
            ReferenceWidening::Faithful => f.write_str("faithful"),
        }
    }
}

impl FromStr for ReferenceWidening {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "checked" => Ok(ReferenceWidening::Checked),
            "faithful" => Ok(ReferenceWidening::Faithful),
            other => Err(format!(
                "unknown widening mode '{}' (expected checked or faithful)",
                other
            )),
        }
    }
}

impl ReferenceWidening {
    /// The signed 64-bit length the reference allocates, or `None` when the
    /// probe has no such representation under this mode.
    pub fn widen(self, probe: &LengthProbe) -> Option<i64> {
        match self {
            ReferenceWidening::Checked => i64::try_from(probe.magnitude()).ok(),
            ReferenceWidening::Faithful => Some(probe.value().widen_to_i64()),
        }
    }
}

/// Allocate `Vec<T>` of the probe's length, every slot `T::default()`.
pub fn allocate<T: NativeElement>(
    probe: &LengthProbe,
    widening: ReferenceWidening,
    limits: &AllocationLimits,
) -> Outcome<T> {
    let Some(length) = widening.widen(probe) else {
        return Outcome::failure(
            FailureKind::CapacityExceeded,
            format!("length {} exceeds the signed 64-bit range", probe.magnitude()),
        );
    };
    let Ok(count) = u64::try_from(length) else {
        return Outcome::failure(
            FailureKind::NegativeLength,
            format!("length {} is negative", length),
        );
    };
    if count > limits.max_length {
        return Outcome::failure(
            FailureKind::CapacityExceeded,
            format!("length {} is above the cap of {}", count, limits.max_length),
        );
    }
    let size = T::descriptor().element_size() as u64;
    match count.checked_mul(size) {
        Some(bytes) if bytes <= limits.max_bytes => {}
        _ => {
            return Outcome::failure(
                FailureKind::CapacityExceeded,
                format!(
                    "{} x {} bytes is over the {}-byte budget",
                    count, size, limits.max_bytes
                ),
            )
        }
    }
    let Ok(count) = usize::try_from(count) else {
        return Outcome::failure(
            FailureKind::CapacityExceeded,
            format!("length {} does not fit in usize", count),
        );
    };

    let mut items: Vec<T> = Vec::new();
    if let Err(e) = items.try_reserve_exact(count) {
        return Outcome::failure(FailureKind::CapacityExceeded, e.to_string());
    }
    items.resize_with(count, T::default);
    Outcome::Success(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::{ClassRef, El, Sc, Text, E};
    use arrbound_core::width::IntValue;

    fn probe(value: IntValue) -> LengthProbe {
        LengthProbe::new(value)
    }

    #[test]
    fn allocates_defaults() {
        let outcome = allocate::<E>(
            &probe(IntValue::U8(3)),
            ReferenceWidening::Checked,
            &AllocationLimits::default(),
        );
        assert_eq!(outcome, Outcome::Success(vec![E(0); 3]));
    }

    #[test]
    fn negative_length() {
        let outcome = allocate::<Text>(
            &probe(IntValue::I32(-1)),
            ReferenceWidening::Checked,
            &AllocationLimits::default(),
        );
        assert_eq!(outcome.failure_kind(), Some(FailureKind::NegativeLength));
    }

    #[test]
    fn u64_max_depends_on_widening() {
        let limits = AllocationLimits::default();
        let max = probe(IntValue::U64(u64::MAX));
        assert_eq!(
            allocate::<ClassRef>(&max, ReferenceWidening::Checked, &limits).failure_kind(),
            Some(FailureKind::CapacityExceeded)
        );
        assert_eq!(
            allocate::<ClassRef>(&max, ReferenceWidening::Faithful, &limits).failure_kind(),
            Some(FailureKind::NegativeLength)
        );
    }

    #[test]
    fn widening_agrees_below_i64_max() {
        let p = probe(IntValue::U32(u32::MAX));
        assert_eq!(ReferenceWidening::Checked.widen(&p), Some(4_294_967_295));
        assert_eq!(ReferenceWidening::Faithful.widen(&p), Some(4_294_967_295));
    }

    #[test]
    fn budget_uses_descriptor_size() {
        let limits = AllocationLimits {
            max_bytes: 16 * 4 - 1,
            ..AllocationLimits::default()
        };
        let outcome = allocate::<Sc>(&probe(IntValue::I16(4)), ReferenceWidening::Checked, &limits);
        assert_eq!(outcome.failure_kind(), Some(FailureKind::CapacityExceeded));
    }

    #[test]
    fn length_cap_is_inclusive() {
        let limits = AllocationLimits {
            max_length: 4,
            ..AllocationLimits::default()
        };
        let at_cap = allocate::<El>(&probe(IntValue::U8(4)), ReferenceWidening::Checked, &limits);
        assert_eq!(at_cap, Outcome::Success(vec![El(0); 4]));
        let over = allocate::<El>(&probe(IntValue::U8(5)), ReferenceWidening::Checked, &limits);
        assert_eq!(over.failure_kind(), Some(FailureKind::CapacityExceeded));
    }

    #[test]
    fn budget_is_inclusive() {
        let limits = AllocationLimits {
            max_bytes: 16 * 4,
            ..AllocationLimits::default()
        };
        let outcome = allocate::<Sc>(&probe(IntValue::I16(4)), ReferenceWidening::Checked, &limits);
        assert_eq!(outcome, Outcome::Success(vec![Sc::default(); 4]));
    }

    #[test]
    fn parses_modes() {
        assert_eq!(
            "Faithful".parse::<ReferenceWidening>(),
            Ok(ReferenceWidening::Faithful)
        );
        assert!("lossy".parse::<ReferenceWidening>().is_err());
    }
}
