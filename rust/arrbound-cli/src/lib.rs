//! Command-line front end for the arrbound oracle.

use arrbound_core::element::{ElementType, ParseElementError};
use arrbound_core::registry::{boundaries, LengthProbe};
use arrbound_core::width::{LengthWidth, ParseWidthError};
use arrbound_oracle::adapter::CompiledConstructor;
use arrbound_oracle::case::{check_case, CaseId};
use arrbound_oracle::config::{ConfigError, HarnessConfig};
use arrbound_oracle::reference::ReferenceWidening;
use arrbound_oracle::run_configured;

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "arrbound",
    version,
    about = "Boundary oracle for dynamically constructed arrays"
)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the boundary matrix
    Run {
        /// Configuration file (default: nearest arrbound.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Restrict to a length width (repeatable)
        #[arg(long = "width")]
        widths: Vec<String>,

        /// Restrict to an element type (repeatable)
        #[arg(long = "element")]
        elements: Vec<String>,

        /// Worker threads (0 = one per CPU)
        #[arg(long)]
        workers: Option<usize>,

        /// How the reference leg widens lengths: checked or faithful
        #[arg(long)]
        widening: Option<ReferenceWidening>,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,

        /// List passing cases too
        #[arg(long)]
        all: bool,
    },
    /// List widths, boundary values and element types
    List,
    /// Evaluate one (element, width, value) case
    Probe {
        /// Element type, e.g. `Sc` or `T:struct<Sc>`
        element: String,
        /// Length width, e.g. `u16`
        width: String,
        /// Length value, or `min` / `max`
        #[arg(allow_negative_numbers = true)]
        value: String,

        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        widening: Option<ReferenceWidening>,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Width(#[from] ParseWidthError),
    #[error(transparent)]
    Element(#[from] ParseElementError),
    #[error("cannot encode report: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// How a successful command finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Passed,
    CasesFailed,
}

impl Status {
    pub fn exit_code(self) -> i32 {
        match self {
            Status::Passed => 0,
            Status::CasesFailed => 1,
        }
    }
}

/// Exit code for configuration and usage errors.
pub const USAGE_EXIT_CODE: i32 = 2;

pub fn init_logging(verbose: bool) {
    let default = if verbose {
        "arrbound=debug"
    } else {
        "arrbound=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Load `path`, or the nearest `arrbound.toml`, or defaults.
pub fn load_config(path: Option<&Path>) -> Result<HarnessConfig, CliError> {
    if let Some(path) = path {
        return Ok(HarnessConfig::load_from(path)?);
    }
    let discovered = std::env::current_dir()
        .ok()
        .and_then(|dir| HarnessConfig::discover(&dir));
    match discovered {
        Some(path) => {
            debug!(path = %path.display(), "using discovered configuration");
            Ok(HarnessConfig::load_from(&path)?)
        }
        None => Ok(HarnessConfig::default()),
    }
}

pub fn execute(cli: Cli, out: &mut impl Write) -> Result<Status, CliError> {
    match cli.command {
        Commands::Run {
            config,
            widths,
            elements,
            workers,
            widening,
            json,
            all,
        } => {
            let mut config = load_config(config.as_deref())?;
            if !widths.is_empty() {
                config.run.widths = widths;
            }
            if !elements.is_empty() {
                config.run.elements = elements;
            }
            if let Some(workers) = workers {
                config.run.workers = workers;
            }
            if let Some(widening) = widening {
                config.run.widening = widening;
            }
            cmd_run(&config, json, all, out)
        }
        Commands::List => cmd_list(out),
        Commands::Probe {
            element,
            width,
            value,
            config,
            widening,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(widening) = widening {
                config.run.widening = widening;
            }
            cmd_probe(&config, &element, &width, &value, out)
        }
    }
}

fn cmd_run(
    config: &HarnessConfig,
    json: bool,
    all: bool,
    out: &mut impl Write,
) -> Result<Status, CliError> {
    let report = run_configured(config)?;
    if json {
        writeln!(out, "{}", report.to_json()?)?;
    } else {
        write!(out, "{}", report.render_text(all))?;
    }
    Ok(if report.is_success() {
        Status::Passed
    } else {
        Status::CasesFailed
    })
}

fn cmd_list(out: &mut impl Write) -> Result<Status, CliError> {
    writeln!(out, "widths:")?;
    for width in LengthWidth::ALL {
        let values: Vec<String> = boundaries(width)
            .iter()
            .map(|p| p.magnitude().to_string())
            .collect();
        writeln!(out, "  {:<4} {}", width.to_string(), values.join(", "))?;
    }
    writeln!(out, "elements:")?;
    for element in ElementType::catalog() {
        let kind = if element.is_reference() {
            "reference"
        } else {
            "value"
        };
        writeln!(
            out,
            "  {:<16} {:<9} {:>2} bytes",
            element.to_string(),
            kind,
            element.element_size()
        )?;
    }
    Ok(Status::Passed)
}

fn cmd_probe(
    config: &HarnessConfig,
    element: &str,
    width: &str,
    value: &str,
    out: &mut impl Write,
) -> Result<Status, CliError> {
    config.validate()?;
    let element: ElementType = element.parse()?;
    let width: LengthWidth = width.parse()?;
    let probe = LengthProbe::new(width.parse_value(value)?);
    let case = CaseId::new(probe, element);
    let constructor = CompiledConstructor::new(config.limits);
    let result = check_case(&constructor, &case, &config.settings());

    writeln!(out, "case:      {}", result.case)?;
    writeln!(out, "candidate: {}", result.candidate)?;
    writeln!(out, "reference: {}", result.reference)?;
    match &result.mismatch {
        None => writeln!(out, "verdict:   agree")?,
        Some(m) => writeln!(out, "verdict:   {}", m)?,
    }
    Ok(if result.passed() {
        Status::Passed
    } else {
        Status::CasesFailed
    })
}
