//! Element type descriptors.
//!
//! An [`ElementType`] names the kind of value an array holds. The set is
//! closed: reference classes, a delegate, two enum backings, a function
//! object, an interface, two value structs, the boxed "any" type, text, and
//! generic parameters instantiated under one of five constraint shapes.
//!
//! Sizes reported by [`ElementType::element_size`] follow a managed-heap
//! layout (8-byte references, 4-byte `int`-backed enums) and are what both
//! allocation paths charge against the memory budget.

use crate::values::Value;
use crate::width::IntValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Size of a reference slot in bytes.
pub const REFERENCE_SIZE: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    /// Reference class `C`.
    Class,
    /// Reference class `D`, a subtype of `C`.
    DerivedClass,
    /// A parameterless callable.
    Delegate,
    /// Enum `E` backed by a 32-bit integer.
    NarrowEnum,
    /// Enum `El` backed by a 64-bit integer.
    WideEnum,
    /// A function object taking and returning an integer.
    Func,
    /// Interface `I`.
    Interface,
    /// Value struct `S` with a single 32-bit field.
    Struct,
    /// Value struct `Sc` holding a text reference and a 32-bit value.
    StructWithString,
    /// The boxed top type.
    Any,
    /// Text.
    Text,
    /// A generic parameter instantiated with `argument`.
    Generic {
        shape: GenericShape,
        argument: Box<ElementType>,
    },
}

/// Constraint placed on a generic parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GenericShape {
    Unconstrained,
    /// Reference types only.
    Class,
    /// Reference types with a parameterless constructor.
    ClassDefaultConstructible,
    /// `C` or any subtype of it.
    SubtypeOfC,
    /// Value types only.
    ValueType,
}

impl GenericShape {
    pub const ALL: [GenericShape; 5] = [
        GenericShape::Unconstrained,
        GenericShape::Class,
        GenericShape::ClassDefaultConstructible,
        GenericShape::SubtypeOfC,
        GenericShape::ValueType,
    ];

    fn prefix(self) -> &'static str {
        match self {
            GenericShape::Unconstrained => "T",
            GenericShape::Class => "T:class",
            GenericShape::ClassDefaultConstructible => "T:class+new",
            GenericShape::SubtypeOfC => "T:C",
            GenericShape::ValueType => "T:struct",
        }
    }

    /// Whether `argument` satisfies this constraint. Generic arguments are
    /// never admitted; instantiation is one level deep.
    pub fn admits(self, argument: &ElementType) -> bool {
        if argument.is_generic() {
            return false;
        }
        match self {
            GenericShape::Unconstrained => true,
            GenericShape::Class => argument.is_reference(),
            GenericShape::ClassDefaultConstructible => {
                argument.is_reference() && argument.is_default_constructible()
            }
            GenericShape::SubtypeOfC => argument.derives_from_class(),
            GenericShape::ValueType => !argument.is_reference(),
        }
    }
}

impl fmt::Display for GenericShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl ElementType {
    pub fn generic(shape: GenericShape, argument: ElementType) -> Self {
        ElementType::Generic {
            shape,
            argument: Box::new(argument),
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, ElementType::Generic { .. })
    }

    /// The concrete type that actually occupies each slot.
    pub fn concrete(&self) -> &ElementType {
        match self {
            ElementType::Generic { argument, .. } => argument.concrete(),
            other => other,
        }
    }

    /// Reference-like types default to null.
    pub fn is_reference(&self) -> bool {
        match self {
            ElementType::Class
            | ElementType::DerivedClass
            | ElementType::Delegate
            | ElementType::Func
            | ElementType::Interface
            | ElementType::Any
            | ElementType::Text => true,
            ElementType::NarrowEnum
            | ElementType::WideEnum
            | ElementType::Struct
            | ElementType::StructWithString => false,
            ElementType::Generic { argument, .. } => argument.is_reference(),
        }
    }

    /// Whether the type has a public parameterless constructor.
    pub fn is_default_constructible(&self) -> bool {
        match self {
            ElementType::Class | ElementType::DerivedClass | ElementType::Any => true,
            ElementType::Delegate
            | ElementType::Func
            | ElementType::Interface
            | ElementType::Text => false,
            ElementType::NarrowEnum
            | ElementType::WideEnum
            | ElementType::Struct
            | ElementType::StructWithString => true,
            ElementType::Generic { argument, .. } => argument.is_default_constructible(),
        }
    }

    pub fn derives_from_class(&self) -> bool {
        match self {
            ElementType::Class | ElementType::DerivedClass => true,
            ElementType::Generic { argument, .. } => argument.derives_from_class(),
            _ => false,
        }
    }

    /// Bytes one slot occupies in the managed layout.
    pub fn element_size(&self) -> usize {
        match self.concrete() {
            ElementType::NarrowEnum | ElementType::Struct => 4,
            ElementType::WideEnum => 8,
            // text reference + int32, padded to 8
            ElementType::StructWithString => REFERENCE_SIZE + 8,
            _ => REFERENCE_SIZE,
        }
    }

    /// Value of a freshly allocated slot.
    pub fn default_value(&self) -> Value {
        match self.concrete() {
            ElementType::NarrowEnum => Value::Enum {
                type_name: "E".to_string(),
                discriminant: 0,
            },
            ElementType::WideEnum => Value::Enum {
                type_name: "El".to_string(),
                discriminant: 0,
            },
            ElementType::Struct => Value::Record {
                type_name: "S".to_string(),
                fields: vec![Value::Integer(IntValue::I32(0))],
            },
            ElementType::StructWithString => Value::Record {
                type_name: "Sc".to_string(),
                fields: vec![Value::Null, Value::Integer(IntValue::I32(0))],
            },
            _ => Value::Null,
        }
    }

    /// Every element type the boundary matrix probes.
    pub fn catalog() -> Vec<ElementType> {
        use ElementType::*;
        use GenericShape as G;
        vec![
            Class,
            DerivedClass,
            Delegate,
            NarrowEnum,
            WideEnum,
            Func,
            Interface,
            Struct,
            StructWithString,
            Any,
            Text,
            ElementType::generic(G::Unconstrained, Any),
            ElementType::generic(G::Unconstrained, Struct),
            ElementType::generic(G::Class, Class),
            ElementType::generic(G::Class, Text),
            ElementType::generic(G::ClassDefaultConstructible, Class),
            ElementType::generic(G::ClassDefaultConstructible, Any),
            ElementType::generic(G::SubtypeOfC, Class),
            ElementType::generic(G::SubtypeOfC, DerivedClass),
            ElementType::generic(G::ValueType, NarrowEnum),
            ElementType::generic(G::ValueType, Struct),
            ElementType::generic(G::ValueType, StructWithString),
        ]
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Class => "C",
            ElementType::DerivedClass => "D",
            ElementType::Delegate => "delegate",
            ElementType::NarrowEnum => "E",
            ElementType::WideEnum => "El",
            ElementType::Func => "func",
            ElementType::Interface => "I",
            ElementType::Struct => "S",
            ElementType::StructWithString => "Sc",
            ElementType::Any => "any",
            ElementType::Text => "text",
            ElementType::Generic { shape, argument } => {
                return write!(f, "{}<{}>", shape, argument);
            }
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseElementError {
    #[error("unknown element type '{0}'")]
    Unknown(String),
    #[error("unknown generic constraint in '{0}'")]
    UnknownShape(String),
}

impl FromStr for ElementType {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let (Some(open), true) = (s.find('<'), s.ends_with('>')) {
            let prefix = &s[..open];
            let shape = GenericShape::ALL
                .iter()
                .copied()
                .find(|shape| shape.prefix() == prefix)
                .ok_or_else(|| ParseElementError::UnknownShape(s.to_string()))?;
            let argument: ElementType = s[open + 1..s.len() - 1].parse()?;
            return Ok(ElementType::generic(shape, argument));
        }
        let element = match s {
            "C" => ElementType::Class,
            "D" => ElementType::DerivedClass,
            "delegate" => ElementType::Delegate,
            "E" => ElementType::NarrowEnum,
            "El" => ElementType::WideEnum,
            "func" => ElementType::Func,
            "I" => ElementType::Interface,
            "S" => ElementType::Struct,
            "Sc" => ElementType::StructWithString,
            "any" | "object" => ElementType::Any,
            "text" | "string" => ElementType::Text,
            _ => return Err(ParseElementError::Unknown(s.to_string())),
        };
        Ok(element)
    }
}
