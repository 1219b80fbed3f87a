//! Runtime value representation shared by the VM and the oracle.

use crate::element::ElementType;
use crate::width::IntValue;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Integer(IntValue),
    Str(String),
    Enum {
        type_name: String,
        discriminant: i64,
    },
    Record {
        type_name: String,
        fields: Vec<Value>,
    },
    /// A live instance of a reference class.
    Object { class: String },
    Array(ArrayValue),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayValue {
    pub element: ElementType,
    pub items: Vec<Value>,
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_integer(&self) -> Option<IntValue> {
        match self {
            Value::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&ArrayValue> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_array(self) -> Option<ArrayValue> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Short name of the value's runtime kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Str(_) => "text",
            Value::Enum { .. } => "enum",
            Value::Record { .. } => "record",
            Value::Object { .. } => "object",
            Value::Array(_) => "array",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Enum {
                type_name,
                discriminant,
            } => write!(f, "{}({})", type_name, discriminant),
            Value::Record { type_name, fields } => {
                let fields: Vec<String> = fields.iter().map(|v| v.to_string()).collect();
                write!(f, "{} {{ {} }}", type_name, fields.join(", "))
            }
            Value::Object { class } => write!(f, "<{}>", class),
            Value::Array(a) => write!(f, "{}[{}]", a.element, a.items.len()),
        }
    }
}
