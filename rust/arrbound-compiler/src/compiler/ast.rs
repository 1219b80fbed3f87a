use arrbound_core::element::ElementType;
use arrbound_core::width::{IntValue, LengthWidth};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Static type of an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    Integer(LengthWidth),
    Array(ElementType),
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Integer(w) => write!(f, "{}", w),
            Type::Array(e) => write!(f, "{}[]", e),
        }
    }
}

/// An expression node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// Reference to a lambda parameter by name.
    Parameter(String),
    /// Integer literal of a fixed width.
    Constant(IntValue),
    /// Integer conversion. Unchecked conversions truncate; checked ones
    /// fail at runtime when the value does not fit.
    Convert {
        operand: Box<Expr>,
        to: LengthWidth,
        checked: bool,
    },
    /// `new element[bound]`
    NewArrayBounds {
        element: ElementType,
        bound: Box<Expr>,
    },
}

impl Expr {
    pub fn parameter(name: impl Into<String>) -> Self {
        Expr::Parameter(name.into())
    }

    pub fn constant(value: IntValue) -> Self {
        Expr::Constant(value)
    }

    pub fn convert(operand: Expr, to: LengthWidth) -> Self {
        Expr::Convert {
            operand: Box::new(operand),
            to,
            checked: false,
        }
    }

    pub fn convert_checked(operand: Expr, to: LengthWidth) -> Self {
        Expr::Convert {
            operand: Box::new(operand),
            to,
            checked: true,
        }
    }

    pub fn new_array_bounds(element: ElementType, bound: Expr) -> Self {
        Expr::NewArrayBounds {
            element,
            bound: Box::new(bound),
        }
    }
}

/// A typed lambda parameter. Parameters are integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: LengthWidth,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: LengthWidth) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lambda {
    pub name: String,
    pub params: Vec<Param>,
    pub body: Expr,
}

impl Lambda {
    pub fn new(name: impl Into<String>, params: Vec<Param>, body: Expr) -> Self {
        Self {
            name: name.into(),
            params,
            body,
        }
    }
}
