//! Linear register allocator for lambda parameters and temporaries.

use std::collections::HashMap;
use thiserror::Error;

/// Maximum number of registers available per lambda (u8::MAX)
pub const MAX_REGISTERS: u8 = 255;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lambda '{lambda}' needs more than {max} registers", max = MAX_REGISTERS)]
pub struct RegisterLimit {
    pub lambda: String,
}

#[derive(Debug)]
pub struct RegAlloc {
    next_reg: u8,
    bindings: HashMap<String, u8>,
    lambda_name: String,
}

impl RegAlloc {
    pub fn new(lambda_name: &str) -> Self {
        Self {
            next_reg: 0,
            bindings: HashMap::new(),
            lambda_name: lambda_name.to_string(),
        }
    }

    /// Allocate a named register for a parameter
    pub fn alloc_named(&mut self, name: &str) -> Result<u8, RegisterLimit> {
        let reg = self.alloc_temp()?;
        self.bindings.insert(name.to_string(), reg);
        Ok(reg)
    }

    pub fn alloc_temp(&mut self) -> Result<u8, RegisterLimit> {
        let reg = self.next_reg;
        if reg == MAX_REGISTERS {
            return Err(RegisterLimit {
                lambda: self.lambda_name.clone(),
            });
        }
        self.next_reg += 1;
        Ok(reg)
    }

    pub fn lookup(&self, name: &str) -> Option<u8> {
        self.bindings.get(name).copied()
    }

    pub fn max_regs(&self) -> u8 {
        self.next_reg
    }
}
