//! arrbound compiler
//!
//! Turns expression-tree lambdas into LIR: a short, register-based
//! instruction list that `arrbound-vm` executes.

pub mod compiler;

use compiler::ast::Lambda;
use compiler::lir::LirLambda;
use compiler::lower::LowerError;
use compiler::typecheck::TypeError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("type errors: {}", join_errors(.0))]
    Type(Vec<TypeError>),
    #[error("lowering error: {0}")]
    Lower(#[from] LowerError),
}

fn join_errors(errors: &[TypeError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl CompileError {
    pub fn type_errors(&self) -> &[TypeError] {
        match self {
            CompileError::Type(errors) => errors,
            CompileError::Lower(_) => &[],
        }
    }
}

/// Type-check and lower a lambda.
pub fn compile(lambda: &Lambda) -> Result<LirLambda, CompileError> {
    let returns = compiler::typecheck::typecheck(lambda).map_err(CompileError::Type)?;
    Ok(compiler::lower::lower(lambda, returns)?)
}
