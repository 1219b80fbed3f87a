//! Cases: one (probe, element) pair evaluated on both legs.
//!
//! The descriptor is matched once onto a native type, and the rest of the
//! pipeline is generic over that type. Generic shapes dispatch through
//! helpers whose bounds mirror the shape's constraint, so an instantiation
//! that would not type-check natively has no reference leg at all.
//!
//! Each leg runs under its own [`catch_panic`], so a panic is reported as an
//! unknown failure of the leg that raised it.

use crate::adapter::ArrayConstructor;
use crate::comparator::{compare, Leg, Mismatch};
use crate::native::*;
use crate::panic_boundary::catch_panic;
use crate::reference::{self, ReferenceWidening};
use arrbound_core::alloc::AllocationLimits;
use arrbound_core::element::{ElementType, GenericShape};
use arrbound_core::outcome::{FailureKind, Outcome, OutcomeSummary};
use arrbound_core::registry::{boundaries, LengthProbe};
use arrbound_core::width::LengthWidth;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::AssertUnwindSafe;

/// Settings shared by both legs of every case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OracleSettings {
    pub limits: AllocationLimits,
    pub widening: ReferenceWidening,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CaseId {
    pub probe: LengthProbe,
    pub element: ElementType,
}

impl CaseId {
    pub fn new(probe: LengthProbe, element: ElementType) -> Self {
        Self { probe, element }
    }
}

impl fmt::Display for CaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "new {}[{}]", self.element, self.probe)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseResult {
    pub case: CaseId,
    pub candidate: OutcomeSummary,
    pub reference: OutcomeSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mismatch: Option<Mismatch>,
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        self.mismatch.is_none()
    }

    /// A case that panicked outside both legs, so neither outcome is known.
    pub fn panicked(case: CaseId, message: &str) -> Self {
        let summary = OutcomeSummary::Failure {
            kind: FailureKind::Unknown,
            detail: "not recorded".to_string(),
        };
        Self {
            case,
            candidate: summary.clone(),
            reference: summary,
            mismatch: Some(Mismatch::Panicked {
                detail: format!("panic: {}", message),
            }),
        }
    }
}

impl fmt::Display for CaseResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.mismatch {
            None => write!(f, "ok   {}: {}", self.case, self.candidate),
            Some(m) => write!(
                f,
                "FAIL {} (width {}, value {}, element {}): {}",
                self.case,
                self.case.probe.width(),
                self.case.probe.magnitude(),
                self.case.element,
                m
            ),
        }
    }
}

/// Run one leg, turning a panic into an unknown failure of that leg.
fn guarded<T>(leg: impl FnOnce() -> Outcome<T>) -> Outcome<T> {
    catch_panic(AssertUnwindSafe(leg))
        .unwrap_or_else(|panic| Outcome::failure(FailureKind::Unknown, panic.to_string()))
}

fn evaluate<T: NativeElement>(
    constructor: &dyn ArrayConstructor,
    case: &CaseId,
    settings: &OracleSettings,
) -> CaseResult {
    let candidate = guarded(|| constructor.construct(&case.element, &case.probe));
    let reference = guarded(|| {
        reference::allocate::<T>(&case.probe, settings.widening, &settings.limits)
    });
    CaseResult {
        case: case.clone(),
        candidate: candidate.summary(),
        reference: reference.summary(),
        mismatch: compare(&candidate, &reference).err(),
    }
}

fn unconstrained<T: NativeElement>(
    constructor: &dyn ArrayConstructor,
    case: &CaseId,
    settings: &OracleSettings,
) -> CaseResult {
    evaluate::<T>(constructor, case, settings)
}

fn class<T: ReferenceElement>(
    constructor: &dyn ArrayConstructor,
    case: &CaseId,
    settings: &OracleSettings,
) -> CaseResult {
    evaluate::<T>(constructor, case, settings)
}

fn class_new<T: ReferenceElement + Constructible>(
    constructor: &dyn ArrayConstructor,
    case: &CaseId,
    settings: &OracleSettings,
) -> CaseResult {
    evaluate::<T>(constructor, case, settings)
}

fn subtype_of_c<T: DerivesFromC>(
    constructor: &dyn ArrayConstructor,
    case: &CaseId,
    settings: &OracleSettings,
) -> CaseResult {
    evaluate::<T>(constructor, case, settings)
}

fn value_type<T: ValueElement + Constructible>(
    constructor: &dyn ArrayConstructor,
    case: &CaseId,
    settings: &OracleSettings,
) -> CaseResult {
    evaluate::<T>(constructor, case, settings)
}

/// The argument cannot instantiate the shape. The candidate still runs so
/// its own diagnosis is reported, but the case cannot pass.
fn unsatisfiable(
    constructor: &dyn ArrayConstructor,
    case: &CaseId,
    shape: GenericShape,
    argument: &ElementType,
) -> CaseResult {
    let candidate = guarded(|| constructor.construct(&case.element, &case.probe));
    let detail = format!("{} cannot instantiate {}", argument, shape);
    let reference: Outcome<()> = Outcome::failure(FailureKind::Unknown, detail.clone());
    CaseResult {
        case: case.clone(),
        candidate: candidate.summary(),
        reference: reference.summary(),
        mismatch: Some(Mismatch::UnknownFailure {
            leg: Leg::Reference,
            detail,
        }),
    }
}

macro_rules! dispatch {
    (@call $check:ident, $native:ty, ($($arg:expr),*)) => {
        $check::<$native>($($arg),*)
    };
    ($check:ident, $element:expr, $args:tt, { $($pattern:pat => $native:ty),+ $(,)? }) => {
        match $element {
            $($pattern => Some(dispatch!(@call $check, $native, $args)),)+
            #[allow(unreachable_patterns)]
            _ => None,
        }
    };
}

/// Evaluate one case on both legs and compare.
pub fn check_case(
    constructor: &dyn ArrayConstructor,
    case: &CaseId,
    settings: &OracleSettings,
) -> CaseResult {
    use ElementType as Ty;

    match &case.element {
        Ty::Generic { shape, argument } => {
            let argument = argument.as_ref();
            let result = match shape {
                GenericShape::Unconstrained => dispatch!(unconstrained, argument, (constructor, case, settings), {
                    Ty::Class => ClassRef,
                    Ty::DerivedClass => DerivedRef,
                    Ty::Delegate => DelegateRef,
                    Ty::NarrowEnum => E,
                    Ty::WideEnum => El,
                    Ty::Func => FuncRef,
                    Ty::Interface => InterfaceRef,
                    Ty::Struct => S,
                    Ty::StructWithString => Sc,
                    Ty::Any => AnyRef,
                    Ty::Text => Text,
                }),
                GenericShape::Class => dispatch!(class, argument, (constructor, case, settings), {
                    Ty::Class => ClassRef,
                    Ty::DerivedClass => DerivedRef,
                    Ty::Delegate => DelegateRef,
                    Ty::Func => FuncRef,
                    Ty::Interface => InterfaceRef,
                    Ty::Any => AnyRef,
                    Ty::Text => Text,
                }),
                GenericShape::ClassDefaultConstructible => dispatch!(class_new, argument, (constructor, case, settings), {
                    Ty::Class => ClassRef,
                    Ty::DerivedClass => DerivedRef,
                    Ty::Any => AnyRef,
                }),
                GenericShape::SubtypeOfC => dispatch!(subtype_of_c, argument, (constructor, case, settings), {
                    Ty::Class => ClassRef,
                    Ty::DerivedClass => DerivedRef,
                }),
                GenericShape::ValueType => dispatch!(value_type, argument, (constructor, case, settings), {
                    Ty::NarrowEnum => E,
                    Ty::WideEnum => El,
                    Ty::Struct => S,
                    Ty::StructWithString => Sc,
                }),
            };
            result.unwrap_or_else(|| unsatisfiable(constructor, case, *shape, argument))
        }
        Ty::Class => evaluate::<ClassRef>(constructor, case, settings),
        Ty::DerivedClass => evaluate::<DerivedRef>(constructor, case, settings),
        Ty::Delegate => evaluate::<DelegateRef>(constructor, case, settings),
        Ty::NarrowEnum => evaluate::<E>(constructor, case, settings),
        Ty::WideEnum => evaluate::<El>(constructor, case, settings),
        Ty::Func => evaluate::<FuncRef>(constructor, case, settings),
        Ty::Interface => evaluate::<InterfaceRef>(constructor, case, settings),
        Ty::Struct => evaluate::<S>(constructor, case, settings),
        Ty::StructWithString => evaluate::<Sc>(constructor, case, settings),
        Ty::Any => evaluate::<AnyRef>(constructor, case, settings),
        Ty::Text => evaluate::<Text>(constructor, case, settings),
    }
}

/// Every boundary value of `width` for one element type.
pub fn check_width_element(
    constructor: &dyn ArrayConstructor,
    width: LengthWidth,
    element: &ElementType,
    settings: &OracleSettings,
) -> Vec<CaseResult> {
    boundaries(width)
        .into_iter()
        .map(|probe| check_case(constructor, &CaseId::new(probe, element.clone()), settings))
        .collect()
}

/// The cross product of `elements` and the boundary values of `widths`,
/// element-major.
pub fn matrix(widths: &[LengthWidth], elements: &[ElementType]) -> Vec<CaseId> {
    elements
        .iter()
        .flat_map(|element| {
            widths.iter().flat_map(move |width| {
                boundaries(*width)
                    .into_iter()
                    .map(move |probe| CaseId::new(probe, element.clone()))
            })
        })
        .collect()
}
