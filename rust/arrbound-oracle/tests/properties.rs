//! Agreement across the matrix, notable single cases, and the comparator's
//! behavior against constructors that get things wrong.

use arrbound_core::alloc::AllocationLimits;
use arrbound_core::element::{ElementType, GenericShape};
use arrbound_core::outcome::{FailureKind, Outcome, OutcomeSummary};
use arrbound_core::registry::{boundaries, LengthProbe};
use arrbound_core::values::Value;
use arrbound_core::width::{IntValue, LengthWidth};
use arrbound_oracle::adapter::{ArrayConstructor, CompiledConstructor};
use arrbound_oracle::case::{check_case, matrix, CaseId, CaseResult, OracleSettings};
use arrbound_oracle::comparator::{Leg, Mismatch};
use arrbound_oracle::reference::ReferenceWidening;
use arrbound_oracle::runner::Runner;
use std::sync::Arc;

fn check(element: ElementType, value: IntValue) -> CaseResult {
    check_with(&CompiledConstructor::default(), element, value, OracleSettings::default())
}

fn check_with(
    constructor: &dyn ArrayConstructor,
    element: ElementType,
    value: IntValue,
    settings: OracleSettings,
) -> CaseResult {
    check_case(
        constructor,
        &CaseId::new(LengthProbe::new(value), element),
        &settings,
    )
}

fn failure_kind(summary: &OutcomeSummary) -> Option<FailureKind> {
    match summary {
        OutcomeSummary::Failure { kind, .. } => Some(*kind),
        OutcomeSummary::Success { .. } => None,
    }
}

fn concrete_elements() -> Vec<ElementType> {
    ElementType::catalog()
        .into_iter()
        .filter(|e| !e.is_generic())
        .collect()
}

// ─── Agreement across the matrix ───

#[test]
fn failure_classes_agree_across_matrix() {
    for case in matrix(&LengthWidth::ALL, &concrete_elements()) {
        let result = check_case(
            &CompiledConstructor::default(),
            &case,
            &OracleSettings::default(),
        );
        assert_eq!(
            failure_kind(&result.candidate),
            failure_kind(&result.reference),
            "{}",
            result
        );
    }
}

#[test]
fn u8_max_contents_agree_for_every_element() {
    for element in ElementType::catalog() {
        let result = check(element.clone(), IntValue::U8(255));
        assert!(result.passed(), "{}", result);
        assert_eq!(result.candidate, OutcomeSummary::Success { length: 255 });
    }
}

#[test]
fn zero_length_succeeds_everywhere() {
    for width in LengthWidth::ALL {
        for element in ElementType::catalog() {
            let result = check(element, width.wrap(0));
            assert!(result.passed(), "{}", result);
            assert_eq!(result.reference, OutcomeSummary::Success { length: 0 });
        }
    }
}

#[test]
fn negative_lengths_are_rejected() {
    let signed = LengthWidth::ALL.into_iter().filter(|w| w.is_signed());
    for width in signed {
        for value in [width.wrap(-1), width.min_value()] {
            for element in concrete_elements() {
                let result = check(element, value);
                assert!(result.passed(), "{}", result);
                assert_eq!(
                    failure_kind(&result.candidate),
                    Some(FailureKind::NegativeLength)
                );
            }
        }
    }
}

#[test]
fn wide_maxima_exceed_capacity() {
    for width in [
        LengthWidth::I32,
        LengthWidth::U32,
        LengthWidth::I64,
        LengthWidth::U64,
    ] {
        for element in ElementType::catalog() {
            let result = check(element, width.max_value());
            assert!(result.passed(), "{}", result);
            assert_eq!(
                failure_kind(&result.reference),
                Some(FailureKind::CapacityExceeded)
            );
        }
    }
}

#[test]
fn narrow_maxima_succeed() {
    for width in [LengthWidth::I8, LengthWidth::U8, LengthWidth::I16, LengthWidth::U16] {
        let max = width.max_value();
        let result = check(ElementType::StructWithString, max);
        assert_eq!(
            result.candidate,
            OutcomeSummary::Success {
                length: max.as_i128() as usize
            }
        );
        assert!(result.passed());
    }
}

// ─── Single cases ───

#[test]
fn single_boxed_u8_element_is_null() {
    let result = check(ElementType::Any, IntValue::U8(1));
    assert!(result.passed());
    assert_eq!(result.candidate, OutcomeSummary::Success { length: 1 });
    let items = CompiledConstructor::default().construct(
        &ElementType::Any,
        &LengthProbe::new(IntValue::U8(1)),
    );
    assert_eq!(items, Outcome::Success(vec![Value::Null]));
}

#[test]
fn text_with_minus_one_length_is_negative() {
    let result = check(ElementType::Text, IntValue::I32(-1));
    assert!(result.passed());
    assert_eq!(
        failure_kind(&result.candidate),
        Some(FailureKind::NegativeLength)
    );
    assert_eq!(
        failure_kind(&result.reference),
        Some(FailureKind::NegativeLength)
    );
}

#[test]
fn interface_at_i64_max_exceeds_capacity() {
    let result = check(ElementType::Interface, IntValue::I64(i64::MAX));
    assert!(result.passed());
    assert_eq!(
        failure_kind(&result.candidate),
        Some(FailureKind::CapacityExceeded)
    );
}

#[test]
fn generic_struct_with_string_at_u16_max_fits_the_budget() {
    let element = ElementType::generic(GenericShape::ValueType, ElementType::StructWithString);
    let result = check(element.clone(), IntValue::U16(65535));
    assert!(result.passed());
    assert_eq!(result.reference, OutcomeSummary::Success { length: 65535 });

    // 65535 * 16 bytes = 1_048_560
    let tight = AllocationLimits {
        max_bytes: 1_048_559,
        ..AllocationLimits::default()
    };
    let settings = OracleSettings {
        limits: tight,
        ..OracleSettings::default()
    };
    let result = check_with(
        &CompiledConstructor::new(tight),
        element,
        IntValue::U16(65535),
        settings,
    );
    assert!(result.passed(), "{}", result);
    assert_eq!(
        failure_kind(&result.candidate),
        Some(FailureKind::CapacityExceeded)
    );
}

#[test]
fn uint32_max_is_never_negative() {
    let result = check(ElementType::Class, IntValue::U32(u32::MAX));
    assert_eq!(
        failure_kind(&result.candidate),
        Some(FailureKind::CapacityExceeded)
    );
}

// ─── Widening ───

#[test]
fn faithful_widening_exposes_u64_max() {
    let settings = OracleSettings {
        widening: ReferenceWidening::Faithful,
        ..OracleSettings::default()
    };
    let result = check_with(
        &CompiledConstructor::default(),
        ElementType::Class,
        IntValue::U64(u64::MAX),
        settings,
    );
    assert_eq!(
        result.mismatch,
        Some(Mismatch::Kind {
            candidate: FailureKind::CapacityExceeded,
            reference: FailureKind::NegativeLength,
        })
    );
    let text = result.to_string();
    assert!(text.contains("width u64"), "{}", text);
    assert!(text.contains("value 18446744073709551615"), "{}", text);
    assert!(text.contains("element C"), "{}", text);
}

#[test]
fn faithful_widening_only_affects_u64_max() {
    let settings = OracleSettings {
        widening: ReferenceWidening::Faithful,
        ..OracleSettings::default()
    };
    let runner = Runner::new(Arc::new(CompiledConstructor::default()), settings);
    let report = runner.run(matrix(&LengthWidth::ALL, &ElementType::catalog()));
    assert_eq!(report.failed, ElementType::catalog().len());
    assert!(report
        .failures()
        .all(|r| r.case.probe.value() == IntValue::U64(u64::MAX)));
}

// ─── Faulty constructors ───

/// Wraps the compiled constructor and corrupts its successful results.
struct Corrupting<F> {
    inner: CompiledConstructor,
    corrupt: F,
}

impl<F> ArrayConstructor for Corrupting<F>
where
    F: Fn(Vec<Value>) -> Outcome<Value> + Send + Sync,
{
    fn name(&self) -> &str {
        "corrupting"
    }

    fn construct(&self, element: &ElementType, probe: &LengthProbe) -> Outcome<Value> {
        match self.inner.construct(element, probe) {
            Outcome::Success(items) => (self.corrupt)(items),
            failure => failure,
        }
    }
}

fn corrupting<F>(corrupt: F) -> Corrupting<F>
where
    F: Fn(Vec<Value>) -> Outcome<Value> + Send + Sync,
{
    Corrupting {
        inner: CompiledConstructor::default(),
        corrupt,
    }
}

fn check_faulty(constructor: &dyn ArrayConstructor, element: ElementType) -> CaseResult {
    check_with(
        constructor,
        element,
        IntValue::I32(3),
        OracleSettings::default(),
    )
}

#[test]
fn extra_element_is_a_length_mismatch() {
    let faulty = corrupting(|mut items| {
        items.push(Value::Null);
        Outcome::Success(items)
    });
    let result = check_faulty(&faulty, ElementType::Class);
    assert_eq!(
        result.mismatch,
        Some(Mismatch::Length {
            candidate: 4,
            reference: 3
        })
    );
}

#[test]
fn non_default_reference_is_an_element_mismatch() {
    let faulty = corrupting(|mut items| {
        items[2] = Value::Object {
            class: "D".to_string(),
        };
        Outcome::Success(items)
    });
    let result = check_faulty(&faulty, ElementType::DerivedClass);
    assert!(matches!(
        result.mismatch,
        Some(Mismatch::Element { index: 2, .. })
    ));
}

#[test]
fn non_default_text_is_an_element_mismatch() {
    let faulty = corrupting(|mut items| {
        items[0] = Value::Str(String::new());
        Outcome::Success(items)
    });
    let result = check_faulty(&faulty, ElementType::Text);
    assert!(matches!(
        result.mismatch,
        Some(Mismatch::Element { index: 0, .. })
    ));
}

#[test]
fn wrong_record_shape_is_undecodable() {
    let faulty = corrupting(|items| {
        Outcome::Success(items.into_iter().map(|_| Value::Null).collect())
    });
    let element = ElementType::generic(GenericShape::ValueType, ElementType::Struct);
    let result = check_faulty(&faulty, element);
    assert!(matches!(
        result.mismatch,
        Some(Mismatch::Undecodable { index: 0, .. })
    ));
}

#[test]
fn spurious_failure_is_an_outcome_mismatch() {
    let faulty = corrupting(|_| Outcome::failure(FailureKind::CapacityExceeded, "too big"));
    let result = check_faulty(&faulty, ElementType::WideEnum);
    assert!(matches!(result.mismatch, Some(Mismatch::OutcomeClass { .. })));
}

#[test]
fn unknown_failure_fails_the_case() {
    let faulty = corrupting(|_| Outcome::failure(FailureKind::Unknown, "lost"));
    let result = check_faulty(&faulty, ElementType::Struct);
    assert_eq!(
        result.mismatch,
        Some(Mismatch::UnknownFailure {
            leg: Leg::Candidate,
            detail: "lost".to_string(),
        })
    );
}

#[test]
fn legs_with_different_limits_disagree() {
    // The candidate allows 4 elements, the reference only 3.
    let loose = CompiledConstructor::new(AllocationLimits {
        max_length: 4,
        ..AllocationLimits::default()
    });
    let settings = OracleSettings {
        limits: AllocationLimits {
            max_length: 3,
            ..AllocationLimits::default()
        },
        ..OracleSettings::default()
    };
    let result = check_with(&loose, ElementType::NarrowEnum, IntValue::I8(4), settings);
    assert_eq!(result.candidate, OutcomeSummary::Success { length: 4 });
    assert_eq!(
        failure_kind(&result.reference),
        Some(FailureKind::CapacityExceeded)
    );
    assert!(matches!(result.mismatch, Some(Mismatch::OutcomeClass { .. })));

    let at_cap = check_with(&loose, ElementType::NarrowEnum, IntValue::I8(3), settings);
    assert!(at_cap.passed(), "{}", at_cap);
}

#[test]
fn every_boundary_is_checked_once() {
    let cases = matrix(&[LengthWidth::I64], &[ElementType::Func]);
    let probes: Vec<LengthProbe> = cases.into_iter().map(|c| c.probe).collect();
    assert_eq!(probes, boundaries(LengthWidth::I64));
}
