//! Command parsing and execution, with output captured in memory.

use arrbound_cli::{execute, Cli, CliError, Commands, Status};
use arrbound_oracle::reference::ReferenceWidening;
use clap::Parser;
use std::path::PathBuf;

fn run(args: &[&str]) -> (Result<Status, CliError>, String) {
    let cli = Cli::try_parse_from(args).expect("arguments should parse");
    let mut out = Vec::new();
    let status = execute(cli, &mut out);
    (status, String::from_utf8(out).expect("output is utf-8"))
}

fn write_config(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("arrbound-{}-{}.toml", name, std::process::id()));
    std::fs::write(&path, contents).expect("temp config should be writable");
    path
}

#[test]
fn parses_run_flags() {
    let cli = Cli::try_parse_from([
        "arrbound", "-v", "run", "--width", "u8", "--width", "i64", "--element", "Sc",
        "--workers", "2", "--widening", "faithful", "--json",
    ])
    .unwrap();
    assert!(cli.verbose);
    match cli.command {
        Commands::Run {
            widths,
            elements,
            workers,
            widening,
            json,
            ..
        } => {
            assert_eq!(widths, vec!["u8", "i64"]);
            assert_eq!(elements, vec!["Sc"]);
            assert_eq!(workers, Some(2));
            assert_eq!(widening, Some(ReferenceWidening::Faithful));
            assert!(json);
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn rejects_unknown_widening() {
    assert!(Cli::try_parse_from(["arrbound", "run", "--widening", "lossy"]).is_err());
}

#[test]
fn run_subset_passes() {
    let (status, out) = run(&[
        "arrbound", "run", "--width", "i8", "--width", "u16", "--element", "T:struct<Sc>",
        "--element", "text", "--all",
    ]);
    assert_eq!(status.unwrap(), Status::Passed);
    assert!(out.contains("ok   new T:struct<Sc>[u16=65535]: success(length 65535)"));
    assert!(out.contains("16 cases: 16 passed, 0 failed"));
}

#[test]
fn faithful_widening_fails_u64_max() {
    let (status, out) = run(&[
        "arrbound", "run", "--width", "u64", "--element", "C", "--widening", "faithful",
    ]);
    assert_eq!(status.unwrap(), Status::CasesFailed);
    assert_eq!(Status::CasesFailed.exit_code(), 1);
    assert!(out.contains("FAIL new C[u64=18446744073709551615]"));
}

#[test]
fn json_report() {
    let (status, out) = run(&["arrbound", "run", "--width", "u8", "--element", "any", "--json"]);
    assert_eq!(status.unwrap(), Status::Passed);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(value["total"], 3);
    assert_eq!(value["failed"], 0);
}

#[test]
fn unknown_element_is_a_usage_error() {
    let (status, _) = run(&["arrbound", "run", "--element", "Q"]);
    assert!(matches!(status, Err(CliError::Config(_))));
}

#[test]
fn config_file_sets_budget() {
    let path = write_config(
        "budget",
        "[limits]\nmax_bytes = 1048559\n\n[run]\nwidths = [\"u16\"]\nelements = [\"Sc\"]\n",
    );
    let (status, out) = run(&[
        "arrbound",
        "run",
        "--all",
        "--config",
        path.to_str().unwrap(),
    ]);
    std::fs::remove_file(&path).ok();
    assert_eq!(status.unwrap(), Status::Passed);
    assert!(out.contains("ok   new Sc[u16=65535]: failure(capacity exceeded)"));
}

#[test]
fn missing_config_file() {
    let (status, _) = run(&["arrbound", "run", "--config", "/nonexistent/arrbound.toml"]);
    assert!(matches!(status, Err(CliError::Config(_))));
}

#[test]
fn list_shows_registry() {
    let (status, out) = run(&["arrbound", "list"]);
    assert_eq!(status.unwrap(), Status::Passed);
    assert!(out.contains("u16  0, 1, 65535"));
    assert!(out.contains("i8   0, 1, -1, -128, 127"));
    assert!(out.contains("T:struct<Sc>"));
}

#[test]
fn probe_one_case() {
    let (status, out) = run(&["arrbound", "probe", "text", "i32", "-1"]);
    assert_eq!(status.unwrap(), Status::Passed);
    assert!(out.contains("candidate: failure(negative length)"));
    assert!(out.contains("reference: failure(negative length)"));
    assert!(out.contains("verdict:   agree"));
}

#[test]
fn probe_accepts_max() {
    let (status, out) = run(&["arrbound", "probe", "I", "i64", "max"]);
    assert_eq!(status.unwrap(), Status::Passed);
    assert!(out.contains("failure(capacity exceeded)"));
}

#[test]
fn probe_out_of_range_value() {
    let (status, _) = run(&["arrbound", "probe", "C", "u8", "256"]);
    assert!(matches!(status, Err(CliError::Width(_))));
}
