//! Native Rust counterparts of every element descriptor.
//!
//! The reference leg allocates `Vec<T>` of these types directly. Each type
//! knows its descriptor and how to decode a VM [`Value`] into itself, which
//! is how the comparator checks candidate elements under `T`'s own
//! equality.
//!
//! Reference classes are modelled as nullable shared pointers with identity
//! equality ([`Ref`]). Text compares by value. Enums and structs compare
//! field by field.

use arrbound_core::element::ElementType;
use arrbound_core::values::Value;
use arrbound_core::width::IntValue;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub trait NativeElement: Clone + Default + PartialEq + fmt::Debug + Send + 'static {
    fn descriptor() -> ElementType;

    /// Decode a VM value, or `None` if the value cannot inhabit `Self`.
    fn decode(value: &Value) -> Option<Self>;
}

/// Types admitted by a `class` constraint.
pub trait ReferenceElement: NativeElement {}

/// Types with a public parameterless constructor.
pub trait Constructible: NativeElement {}

/// `C` and its subtypes.
pub trait DerivesFromC: ReferenceElement {}

/// Types admitted by a `struct` constraint.
pub trait ValueElement: NativeElement {}

/// Nullable reference with identity equality.
pub struct Ref<T: ?Sized>(pub Option<Arc<T>>);

impl<T: ?Sized> Ref<T> {
    pub fn null() -> Self {
        Ref(None)
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }
}

impl<T> Ref<T> {
    pub fn new(value: T) -> Self {
        Ref(Some(Arc::new(value)))
    }
}

impl<T: ?Sized> Clone for Ref<T> {
    fn clone(&self) -> Self {
        Ref(self.0.clone())
    }
}

impl<T: ?Sized> Default for Ref<T> {
    fn default() -> Self {
        Ref(None)
    }
}

impl<T: ?Sized> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T: ?Sized> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => f.write_str("null"),
            Some(arc) => write!(f, "<ref {:p}>", Arc::as_ptr(arc)),
        }
    }
}

/// Reference class `C`.
#[derive(Debug, Default)]
pub struct C {
    pub value: i32,
}

/// Reference class `D`, a subtype of `C`.
#[derive(Debug, Default)]
pub struct D {
    pub base: C,
}

/// Interface `I`.
pub trait Interface: Send + Sync {
    fn describe(&self) -> String;
}

impl Interface for C {
    fn describe(&self) -> String {
        format!("C({})", self.value)
    }
}

impl Interface for D {
    fn describe(&self) -> String {
        format!("D({})", self.base.value)
    }
}

/// Enum `E`, 32-bit backed. Any discriminant is representable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct E(pub i32);

/// Enum `El`, 64-bit backed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct El(pub i64);

/// Value struct `S`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct S {
    pub x: i32,
}

/// Value struct `Sc`: a text reference and a value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sc {
    pub s: Option<String>,
    pub x: i32,
}

pub type ClassRef = Ref<C>;
pub type DerivedRef = Ref<D>;
pub type DelegateRef = Ref<dyn Fn() + Send + Sync>;
pub type FuncRef = Ref<dyn Fn(i32) -> i32 + Send + Sync>;
pub type InterfaceRef = Ref<dyn Interface>;
pub type AnyRef = Ref<dyn Any + Send + Sync>;
pub type Text = Option<String>;

fn is_object_of(value: &Value, classes: &[&str]) -> bool {
    matches!(value, Value::Object { class } if classes.contains(&class.as_str()))
}

fn decode_i32(value: &Value) -> Option<i32> {
    match value {
        Value::Integer(IntValue::I32(x)) => Some(*x),
        _ => None,
    }
}

fn decode_text(value: &Value) -> Option<Text> {
    match value {
        Value::Null => Some(None),
        Value::Str(s) => Some(Some(s.clone())),
        _ => None,
    }
}

impl NativeElement for ClassRef {
    fn descriptor() -> ElementType {
        ElementType::Class
    }

    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Ref::null()),
            v if is_object_of(v, &["C"]) => Some(Ref::new(C::default())),
            _ => None,
        }
    }
}

impl NativeElement for DerivedRef {
    fn descriptor() -> ElementType {
        ElementType::DerivedClass
    }

    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Ref::null()),
            v if is_object_of(v, &["D"]) => Some(Ref::new(D::default())),
            _ => None,
        }
    }
}

// Callables have no runtime value representation; only null decodes.
impl NativeElement for DelegateRef {
    fn descriptor() -> ElementType {
        ElementType::Delegate
    }

    fn decode(value: &Value) -> Option<Self> {
        value.is_null().then(Ref::null)
    }
}

impl NativeElement for FuncRef {
    fn descriptor() -> ElementType {
        ElementType::Func
    }

    fn decode(value: &Value) -> Option<Self> {
        value.is_null().then(Ref::null)
    }
}

impl NativeElement for InterfaceRef {
    fn descriptor() -> ElementType {
        ElementType::Interface
    }

    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Ref::null()),
            Value::Object { class } if class == "C" => {
                Some(Ref(Some(Arc::new(C::default()) as Arc<dyn Interface>)))
            }
            Value::Object { class } if class == "D" => {
                Some(Ref(Some(Arc::new(D::default()) as Arc<dyn Interface>)))
            }
            _ => None,
        }
    }
}

impl NativeElement for AnyRef {
    fn descriptor() -> ElementType {
        ElementType::Any
    }

    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Ref::null()),
            // Boxing produces a fresh identity.
            other => Some(Ref(Some(Arc::new(other.clone()) as Arc<dyn Any + Send + Sync>))),
        }
    }
}

impl NativeElement for Text {
    fn descriptor() -> ElementType {
        ElementType::Text
    }

    fn decode(value: &Value) -> Option<Self> {
        decode_text(value)
    }
}

impl NativeElement for E {
    fn descriptor() -> ElementType {
        ElementType::NarrowEnum
    }

    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::Enum {
                type_name,
                discriminant,
            } if type_name == "E" => i32::try_from(*discriminant).ok().map(E),
            _ => None,
        }
    }
}

impl NativeElement for El {
    fn descriptor() -> ElementType {
        ElementType::WideEnum
    }

    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::Enum {
                type_name,
                discriminant,
            } if type_name == "El" => Some(El(*discriminant)),
            _ => None,
        }
    }
}

impl NativeElement for S {
    fn descriptor() -> ElementType {
        ElementType::Struct
    }

    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::Record { type_name, fields } if type_name == "S" => match fields.as_slice() {
                [x] => Some(S { x: decode_i32(x)? }),
                _ => None,
            },
            _ => None,
        }
    }
}

impl NativeElement for Sc {
    fn descriptor() -> ElementType {
        ElementType::StructWithString
    }

    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::Record { type_name, fields } if type_name == "Sc" => match fields.as_slice() {
                [s, x] => Some(Sc {
                    s: decode_text(s)?,
                    x: decode_i32(x)?,
                }),
                _ => None,
            },
            _ => None,
        }
    }
}

impl ReferenceElement for ClassRef {}
impl ReferenceElement for DerivedRef {}
impl ReferenceElement for DelegateRef {}
impl ReferenceElement for FuncRef {}
impl ReferenceElement for InterfaceRef {}
impl ReferenceElement for AnyRef {}
impl ReferenceElement for Text {}

impl Constructible for ClassRef {}
impl Constructible for DerivedRef {}
impl Constructible for AnyRef {}
impl Constructible for E {}
impl Constructible for El {}
impl Constructible for S {}
impl Constructible for Sc {}

impl DerivesFromC for ClassRef {}
impl DerivesFromC for DerivedRef {}

impl ValueElement for E {}
impl ValueElement for El {}
impl ValueElement for S {}
impl ValueElement for Sc {}
