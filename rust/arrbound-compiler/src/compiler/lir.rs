//! LIR data types: fixed-width three-operand instructions for a register VM.

use crate::compiler::ast::Type;
use arrbound_core::element::ElementType;
use arrbound_core::width::{IntValue, LengthWidth};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum OpCode {
    LoadK = 0,          // A, Bx:   A = constants[Bx]
    Convert = 1,        // A, B, C: A = B wrapped to width C
    ConvertChecked = 2, // A, B, C: A = B converted to width C, trap on overflow
    NewArray = 3,       // A, B, C: A = new element_types[C][B]
    Return = 4,         // A:       return A
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub op: OpCode,
    pub a: u8,
    pub b: u8,
    pub c: u8,
}

impl Instruction {
    pub fn abc(op: OpCode, a: u8, b: u8, c: u8) -> Self { Self { op, a, b, c } }
    pub fn abx(op: OpCode, a: u8, bx: u16) -> Self { Self { op, a, b: (bx >> 8) as u8, c: (bx & 0xFF) as u8 } }
    pub fn bx(&self) -> u16 { ((self.b as u16) << 8) | (self.c as u16) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LirParam {
    pub name: String,
    pub width: LengthWidth,
    pub register: u8,
}

/// A compiled lambda.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LirLambda {
    pub name: String,
    pub params: Vec<LirParam>,
    pub returns: Type,
    pub registers: u8,
    pub constants: Vec<IntValue>,
    pub element_types: Vec<ElementType>,
    pub instructions: Vec<Instruction>,
}

impl LirLambda {
    /// Human-readable listing, one instruction per line.
    pub fn disassemble(&self) -> String {
        let mut out = format!("lambda {} ({} registers)\n", self.name, self.registers);
        for (ip, instr) in self.instructions.iter().enumerate() {
            let line = match instr.op {
                OpCode::LoadK => format!(
                    "LoadK r{} k{} ; {}",
                    instr.a,
                    instr.bx(),
                    self.constants
                        .get(instr.bx() as usize)
                        .map(|k| k.to_string())
                        .unwrap_or_else(|| "?".to_string())
                ),
                OpCode::Convert | OpCode::ConvertChecked => format!(
                    "{:?} r{} r{} {}",
                    instr.op,
                    instr.a,
                    instr.b,
                    LengthWidth::from_index(instr.c)
                        .map(|w| w.name())
                        .unwrap_or("?")
                ),
                OpCode::NewArray => format!(
                    "NewArray r{} r{} {}",
                    instr.a,
                    instr.b,
                    self.element_types
                        .get(instr.c as usize)
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "?".to_string())
                ),
                OpCode::Return => format!("Return r{}", instr.a),
            };
            out.push_str(&format!("{:04} {}\n", ip, line));
        }
        out
    }
}
