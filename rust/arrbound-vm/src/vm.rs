//! Dispatch loop for compiled lambdas.

use arrbound_compiler::compiler::lir::*;
use arrbound_core::alloc::{allocate_filled, AllocError, AllocationLimits};
use arrbound_core::values::{ArrayValue, Value};
use arrbound_core::width::{IntValue, LengthWidth};

use thiserror::Error;
use tracing::{debug, trace};

/// Upper bound on executed instructions per invocation.
pub const DEFAULT_MAX_INSTRUCTIONS: u64 = 1_000_000;

#[derive(Debug, Error)]
pub enum VmError {
    #[error("lambda '{lambda}' expects {expected} arguments, got {actual}")]
    Arity {
        lambda: String,
        expected: usize,
        actual: usize,
    },
    #[error("argument '{param}' expects {expected}, got {actual}")]
    ArgumentType {
        param: String,
        expected: LengthWidth,
        actual: String,
    },
    #[error("{value} does not fit in {to}")]
    Overflow { value: IntValue, to: LengthWidth },
    #[error("allocation failed: {0}")]
    Allocation(#[from] AllocError),
    #[error("type error at runtime: {0}")]
    TypeError(String),
    #[error("register out of bounds: r{0} in lambda with {1} registers")]
    RegisterOOB(u8, u8),
    #[error("malformed instruction at {ip}: {reason}")]
    Malformed { ip: usize, reason: String },
    #[error("lambda '{0}' finished without returning")]
    MissingReturn(String),
    #[error("instruction limit exceeded: {0}")]
    InstructionLimitExceeded(u64),
}

#[derive(Debug)]
pub struct VM {
    limits: AllocationLimits,
    registers: Vec<Value>,
    max_instructions: u64,
    instruction_count: u64,
}

impl Default for VM {
    fn default() -> Self {
        Self::new()
    }
}

impl VM {
    pub fn new() -> Self {
        Self::with_limits(AllocationLimits::default())
    }

    pub fn with_limits(limits: AllocationLimits) -> Self {
        Self {
            limits,
            registers: Vec::new(),
            max_instructions: DEFAULT_MAX_INSTRUCTIONS,
            instruction_count: 0,
        }
    }

    pub fn limits(&self) -> &AllocationLimits {
        &self.limits
    }

    pub fn set_max_instructions(&mut self, max: u64) {
        self.max_instructions = max;
    }

    /// Instructions executed by the most recent invocation.
    pub fn instruction_count(&self) -> u64 {
        self.instruction_count
    }

    /// Run `lambda` with `args` bound to its parameters.
    pub fn invoke(&mut self, lambda: &LirLambda, args: Vec<Value>) -> Result<Value, VmError> {
        if args.len() != lambda.params.len() {
            return Err(VmError::Arity {
                lambda: lambda.name.clone(),
                expected: lambda.params.len(),
                actual: args.len(),
            });
        }

        self.registers.clear();
        self.registers
            .resize(lambda.registers as usize, Value::Null);

        for (param, arg) in lambda.params.iter().zip(args) {
            match arg.as_integer() {
                Some(v) if v.width() == param.width => {}
                _ => {
                    return Err(VmError::ArgumentType {
                        param: param.name.clone(),
                        expected: param.width,
                        actual: arg.to_string(),
                    })
                }
            }
            self.check_register(param.register, lambda.registers)?;
            self.registers[param.register as usize] = arg;
        }

        self.instruction_count = 0;
        self.run(lambda)
    }

    fn run(&mut self, lambda: &LirLambda) -> Result<Value, VmError> {
        for (ip, instr) in lambda.instructions.iter().enumerate() {
            self.instruction_count = self.instruction_count.saturating_add(1);
            if self.instruction_count > self.max_instructions {
                return Err(VmError::InstructionLimitExceeded(self.max_instructions));
            }
            trace!(lambda = %lambda.name, ip, op = ?instr.op, "step");

            let a = instr.a;
            self.check_register(a, lambda.registers)?;

            match instr.op {
                OpCode::LoadK => {
                    let k = lambda
                        .constants
                        .get(instr.bx() as usize)
                        .ok_or_else(|| VmError::Malformed {
                            ip,
                            reason: format!("constant k{} out of bounds", instr.bx()),
                        })?;
                    self.registers[a as usize] = Value::Integer(*k);
                }
                OpCode::Convert | OpCode::ConvertChecked => {
                    let value = self.integer(instr.b, lambda.registers)?;
                    let to = LengthWidth::from_index(instr.c).ok_or_else(|| VmError::Malformed {
                        ip,
                        reason: format!("unknown width index {}", instr.c),
                    })?;
                    let converted = if instr.op == OpCode::ConvertChecked {
                        to.checked(value.as_i128())
                            .ok_or(VmError::Overflow { value, to })?
                    } else {
                        to.wrap(value.as_i128())
                    };
                    self.registers[a as usize] = Value::Integer(converted);
                }
                OpCode::NewArray => {
                    let length = self.integer(instr.b, lambda.registers)?;
                    let element = lambda
                        .element_types
                        .get(instr.c as usize)
                        .ok_or_else(|| VmError::Malformed {
                            ip,
                            reason: format!("element type t{} out of bounds", instr.c),
                        })?;
                    debug!(%element, %length, "allocating array");
                    let items = allocate_filled(
                        length.as_i128(),
                        element.element_size(),
                        &self.limits,
                        element.default_value(),
                    )?;
                    self.registers[a as usize] = Value::Array(ArrayValue {
                        element: element.clone(),
                        items,
                    });
                }
                OpCode::Return => {
                    let result = std::mem::replace(&mut self.registers[a as usize], Value::Null);
                    self.registers.clear();
                    return Ok(result);
                }
            }
        }
        Err(VmError::MissingReturn(lambda.name.clone()))
    }

    fn check_register(&self, reg: u8, count: u8) -> Result<(), VmError> {
        if reg >= count || reg as usize >= self.registers.len() {
            return Err(VmError::RegisterOOB(reg, count));
        }
        Ok(())
    }

    fn integer(&self, reg: u8, count: u8) -> Result<IntValue, VmError> {
        self.check_register(reg, count)?;
        let value = &self.registers[reg as usize];
        value.as_integer().ok_or_else(|| {
            VmError::TypeError(format!(
                "expected integer in r{}, found {}",
                reg,
                value.kind_name()
            ))
        })
    }
}
