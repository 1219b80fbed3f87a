//! Lambda → LIR lowering.
//!
//! Parameters occupy the first registers in declaration order. Conversions
//! whose operand is a constant are folded, except checked conversions that
//! would overflow: those are emitted as instructions so the failure happens
//! at invocation time, where the caller observes it.

use crate::compiler::ast::*;
use crate::compiler::lir::*;
use crate::compiler::regalloc::{RegAlloc, RegisterLimit};
use arrbound_core::element::ElementType;
use arrbound_core::width::IntValue;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LowerError {
    #[error(transparent)]
    Registers(#[from] RegisterLimit),
    #[error("lambda '{0}' has more than 65536 constants")]
    TooManyConstants(String),
    #[error("lambda '{0}' uses more than 256 element types")]
    TooManyElementTypes(String),
    #[error("unbound parameter '{0}'")]
    UnboundParameter(String),
}

struct Lowerer {
    name: String,
    regs: RegAlloc,
    constants: Vec<IntValue>,
    element_types: Vec<ElementType>,
    instructions: Vec<Instruction>,
}

impl Lowerer {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            regs: RegAlloc::new(name),
            constants: Vec::new(),
            element_types: Vec::new(),
            instructions: Vec::new(),
        }
    }

    fn add_constant(&mut self, value: IntValue) -> Result<u16, LowerError> {
        if let Some(idx) = self.constants.iter().position(|k| *k == value) {
            return Ok(idx as u16);
        }
        let idx = u16::try_from(self.constants.len())
            .map_err(|_| LowerError::TooManyConstants(self.name.clone()))?;
        self.constants.push(value);
        Ok(idx)
    }

    fn add_element_type(&mut self, element: &ElementType) -> Result<u8, LowerError> {
        if let Some(idx) = self.element_types.iter().position(|e| e == element) {
            return Ok(idx as u8);
        }
        let idx = u8::try_from(self.element_types.len())
            .map_err(|_| LowerError::TooManyElementTypes(self.name.clone()))?;
        self.element_types.push(element.clone());
        Ok(idx)
    }

    fn load_constant(&mut self, value: IntValue) -> Result<u8, LowerError> {
        let k = self.add_constant(value)?;
        let dst = self.regs.alloc_temp()?;
        self.instructions.push(Instruction::abx(OpCode::LoadK, dst, k));
        Ok(dst)
    }

    /// Lower `expr` and return the register holding its value.
    fn lower_expr(&mut self, expr: &Expr) -> Result<u8, LowerError> {
        if let Some(value) = fold_constant(expr) {
            return self.load_constant(value);
        }
        match expr {
            Expr::Parameter(name) => self
                .regs
                .lookup(name)
                .ok_or_else(|| LowerError::UnboundParameter(name.clone())),
            Expr::Constant(v) => self.load_constant(*v),
            Expr::Convert {
                operand,
                to,
                checked,
            } => {
                let src = self.lower_expr(operand)?;
                let dst = self.regs.alloc_temp()?;
                let op = if *checked {
                    OpCode::ConvertChecked
                } else {
                    OpCode::Convert
                };
                self.instructions
                    .push(Instruction::abc(op, dst, src, to.index()));
                Ok(dst)
            }
            Expr::NewArrayBounds { element, bound } => {
                let src = self.lower_expr(bound)?;
                let ty = self.add_element_type(element)?;
                let dst = self.regs.alloc_temp()?;
                self.instructions
                    .push(Instruction::abc(OpCode::NewArray, dst, src, ty));
                Ok(dst)
            }
        }
    }
}

/// Evaluate `expr` at compile time if it is built only from constants and
/// cannot trap.
pub fn fold_constant(expr: &Expr) -> Option<IntValue> {
    match expr {
        Expr::Constant(v) => Some(*v),
        Expr::Convert {
            operand,
            to,
            checked,
        } => {
            let value = fold_constant(operand)?;
            if *checked {
                to.checked(value.as_i128())
            } else {
                Some(to.wrap(value.as_i128()))
            }
        }
        Expr::Parameter(_) | Expr::NewArrayBounds { .. } => None,
    }
}

/// Lower a type-checked lambda. `returns` is the body type from the checker.
pub fn lower(lambda: &Lambda, returns: Type) -> Result<LirLambda, LowerError> {
    let mut lowerer = Lowerer::new(&lambda.name);
    let mut params = Vec::with_capacity(lambda.params.len());
    for p in &lambda.params {
        let register = lowerer.regs.alloc_named(&p.name)?;
        params.push(LirParam {
            name: p.name.clone(),
            width: p.ty,
            register,
        });
    }

    let result = lowerer.lower_expr(&lambda.body)?;
    lowerer
        .instructions
        .push(Instruction::abc(OpCode::Return, result, 0, 0));

    Ok(LirLambda {
        name: lambda.name.clone(),
        params,
        returns,
        registers: lowerer.regs.max_regs(),
        constants: lowerer.constants,
        element_types: lowerer.element_types,
        instructions: lowerer.instructions,
    })
}
