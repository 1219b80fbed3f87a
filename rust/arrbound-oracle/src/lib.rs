//! Boundary oracle for dynamically constructed arrays.
//!
//! Each case builds `new <element>[len]` twice: once through a compiled
//! lambda ([`adapter`]) and once as a native `Vec<T>` ([`reference`]). The
//! [`comparator`] requires both to fail the same way or to produce equal
//! arrays. [`case`] spans the cross product of widths, boundary values and
//! element types, and [`runner`] evaluates it on a worker pool.

pub mod adapter;
pub mod case;
pub mod comparator;
pub mod config;
pub mod native;
pub mod panic_boundary;
pub mod reference;
pub mod report;
pub mod runner;

use crate::adapter::CompiledConstructor;
use crate::case::matrix;
use crate::config::{ConfigError, HarnessConfig};
use crate::report::RunReport;
use crate::runner::Runner;

use std::sync::Arc;

/// Run the configured matrix against the compiled constructor.
pub fn run_configured(config: &HarnessConfig) -> Result<RunReport, ConfigError> {
    config.validate()?;
    let cases = matrix(&config.widths()?, &config.elements()?);
    let runner = Runner::new(
        Arc::new(CompiledConstructor::new(config.limits)),
        config.settings(),
    )
    .with_workers(config.run.workers);
    Ok(runner.run(cases))
}
