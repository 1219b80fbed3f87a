//! Candidate leg: array construction through a compiled lambda.

use arrbound_compiler::compile;
use arrbound_compiler::compiler::ast::{Expr, Lambda, Param};
use arrbound_core::alloc::AllocationLimits;
use arrbound_core::element::ElementType;
use arrbound_core::outcome::{FailureKind, Outcome};
use arrbound_core::registry::LengthProbe;
use arrbound_core::values::Value;
use arrbound_core::width::LengthWidth;
use arrbound_vm::vm::{VmError, VM};

use tracing::{debug, warn};

/// Anything that can build an array of `element` with a probed length.
pub trait ArrayConstructor: Send + Sync {
    fn name(&self) -> &str;

    fn construct(&self, element: &ElementType, probe: &LengthProbe) -> Outcome<Value>;
}

/// Builds `(len: <width>) => new <element>[len]`, compiles it and invokes it
/// with the probe value.
#[derive(Debug, Clone, Default)]
pub struct CompiledConstructor {
    limits: AllocationLimits,
}

impl CompiledConstructor {
    pub fn new(limits: AllocationLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &AllocationLimits {
        &self.limits
    }

    pub fn lambda_for(element: &ElementType, width: LengthWidth) -> Lambda {
        Lambda::new(
            format!("new_{}_array", width),
            vec![Param::new("len", width)],
            Expr::new_array_bounds(element.clone(), Expr::parameter("len")),
        )
    }
}

impl ArrayConstructor for CompiledConstructor {
    fn name(&self) -> &str {
        "compiled"
    }

    fn construct(&self, element: &ElementType, probe: &LengthProbe) -> Outcome<Value> {
        let lambda = Self::lambda_for(element, probe.width());
        let lir = match compile(&lambda) {
            Ok(lir) => lir,
            Err(e) => {
                warn!(%element, %probe, error = %e, "lambda failed to compile");
                return Outcome::failure(FailureKind::Unknown, e.to_string());
            }
        };

        let mut vm = VM::with_limits(self.limits);
        match vm.invoke(&lir, vec![Value::Integer(probe.value())]) {
            Ok(value) => match value.into_array() {
                Some(array) => {
                    debug!(%element, %probe, length = array.items.len(), "constructed");
                    Outcome::Success(array.items)
                }
                None => Outcome::failure(FailureKind::Unknown, "lambda did not return an array"),
            },
            Err(VmError::Allocation(e)) => {
                debug!(%element, %probe, error = %e, "allocation rejected");
                Outcome::failure(e.kind(), e.to_string())
            }
            Err(e) => Outcome::failure(FailureKind::Unknown, e.to_string()),
        }
    }
}
