//! Type checking for expression lambdas.
//!
//! Infers the type of the lambda body, requires array bounds to be
//! integers, and rejects generic element types whose argument violates the
//! constraint of its shape. Errors are collected rather than stopping at the
//! first one.

use crate::compiler::ast::*;
use arrbound_core::element::{ElementType, GenericShape};
use arrbound_core::width::LengthWidth;

use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("undefined parameter '{name}'")]
    UndefinedParameter { name: String },
    #[error("duplicate parameter '{name}'")]
    DuplicateParameter { name: String },
    #[error("array bound must be an integer, got {actual}")]
    NonIntegerBound { actual: Type },
    #[error("cannot convert {actual} to {to}")]
    InvalidConversion { actual: Type, to: LengthWidth },
    #[error("type argument {argument} does not satisfy constraint {shape}")]
    ConstraintViolation {
        shape: GenericShape,
        argument: ElementType,
    },
}

struct TypeChecker<'a> {
    params: HashMap<&'a str, LengthWidth>,
    errors: Vec<TypeError>,
}

impl<'a> TypeChecker<'a> {
    fn new(params: &'a [Param]) -> Self {
        let mut checker = Self {
            params: HashMap::new(),
            errors: Vec::new(),
        };
        for p in params {
            if checker.params.insert(p.name.as_str(), p.ty).is_some() {
                checker.errors.push(TypeError::DuplicateParameter {
                    name: p.name.clone(),
                });
            }
        }
        checker
    }

    /// Returns `None` when the type could not be determined; the reason has
    /// already been recorded.
    fn infer(&mut self, expr: &Expr) -> Option<Type> {
        match expr {
            Expr::Parameter(name) => match self.params.get(name.as_str()) {
                Some(w) => Some(Type::Integer(*w)),
                None => {
                    self.errors
                        .push(TypeError::UndefinedParameter { name: name.clone() });
                    None
                }
            },
            Expr::Constant(v) => Some(Type::Integer(v.width())),
            Expr::Convert { operand, to, .. } => {
                let actual = self.infer(operand)?;
                match actual {
                    Type::Integer(_) => Some(Type::Integer(*to)),
                    Type::Array(_) => {
                        self.errors
                            .push(TypeError::InvalidConversion { actual, to: *to });
                        None
                    }
                }
            }
            Expr::NewArrayBounds { element, bound } => {
                self.check_element(element);
                if let Some(actual) = self.infer(bound) {
                    if !matches!(actual, Type::Integer(_)) {
                        self.errors.push(TypeError::NonIntegerBound { actual });
                    }
                }
                // The array type is known even when the bound is ill-typed.
                Some(Type::Array(element.clone()))
            }
        }
    }

    fn check_element(&mut self, element: &ElementType) {
        if let ElementType::Generic { shape, argument } = element {
            if !shape.admits(argument) {
                self.errors.push(TypeError::ConstraintViolation {
                    shape: *shape,
                    argument: (**argument).clone(),
                });
            }
        }
    }
}

/// Type-check `lambda` and return the type of its body.
pub fn typecheck(lambda: &Lambda) -> Result<Type, Vec<TypeError>> {
    let mut checker = TypeChecker::new(&lambda.params);
    let ty = checker.infer(&lambda.body);
    match ty {
        Some(ty) if checker.errors.is_empty() => Ok(ty),
        _ => Err(checker.errors),
    }
}
