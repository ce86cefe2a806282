// crates/fair_cli/src/main.rs
//
// Offline run path: load → resolve params → distribute (traced) → validate →
// artifacts, or `--check` (load → validate). Exit codes are stable for scripts.

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    /// Bad flags, bad input shape, or an allocation that fails validation.
    pub const VALIDATION: i32 = 2;
    pub const IO: i32 = 4;
    /// The engine refused the input (empty store, parameter domain).
    pub const ENGINE: i32 = 5;
}

use std::fmt;
use std::fs;
use std::path::Path;
use std::process::ExitCode;

use serde_json::{json, Value};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use args::{parse_and_validate as parse_cli, Args};
use fair_core::{Params, Severity, ValidationResult};
use fair_io::artifacts::allocation_to_value;
use fair_io::canonical_json::{write_canonical_file, write_pretty_file};
use fair_io::hasher::{sha256_canonical, sha256_canonical_value};
use fair_io::loader::{self, LoadedInput};
use fair_io::IoError;
use fair_pipeline::{distribute_traced, validate, DistributeError, DistributionRun, ENGINE_NAME, ENGINE_VERSION};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Input shape, parameter resolution or domain failures.
    Validation(String),
    /// The produced or checked allocation has blocking errors (artifacts are still written).
    Invalid(usize),
    /// Read/write/limit errors.
    Io(String),
    /// Distribution refused by the engine.
    Engine(String),
}

impl fmt::Display for MainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "{m}"),
            MainError::Invalid(n) => write!(f, "allocation is invalid ({n} error(s))"),
            MainError::Io(m) => write!(f, "{m}"),
            MainError::Engine(m) => write!(f, "{m}"),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("fairshare: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION as u8);
        }
    };
    init_tracing(args.verbose);

    let res = if args.check { check_only(&args) } else { run_once(&args) };
    let rc = match res {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("fairshare: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// `RUST_LOG` when set; otherwise `-v` / `-vv` pick the level, else `warn`.
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity_level(verbose)));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}

fn verbosity_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) | MainError::Invalid(_) => VALIDATION,
        MainError::Io(_) => IO,
        MainError::Engine(_) => ENGINE,
    }
}

/// Translate fair_io::IoError into MainError buckets.
fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Json { pointer, msg } => MainError::Validation(format!("json {pointer}: {msg}")),
        IoError::Shape { pointer, msg } => MainError::Validation(format!("input {pointer}: {msg}")),
        IoError::Read(e) => MainError::Io(format!("read: {e}")),
        IoError::Write(e) => MainError::Io(format!("write: {e}")),
        IoError::Limit(m) => MainError::Io(format!("limit: {m}")),
    }
}

fn map_distribute_err(e: DistributeError) -> MainError {
    MainError::Engine(e.to_string())
}

/// Load the input and settle the effective parameters.
fn load(args: &Args) -> Result<(LoadedInput, Params), MainError> {
    let loaded = loader::load_input(&args.input).map_err(map_io_err)?;
    let file_params = match &args.params {
        Some(p) => Some(loader::load_params(p).map_err(map_io_err)?),
        None => None,
    };
    let params = args
        .resolve_params(file_params, loaded.params.clone())
        .map_err(|e| MainError::Validation(e.to_string()))?;
    params.validate_domains().map_err(|e| MainError::Validation(e.to_string()))?;
    debug!(
        stores = loaded.stores.len(),
        minimum = params.minimum_per_competitor,
        max_variance = params.max_variance_percent,
        "input loaded"
    );
    Ok((loaded, params))
}

/// `--check`: validate the input as a finished allocation.
fn check_only(args: &Args) -> Result<(), MainError> {
    let (loaded, params) = load(args)?;
    let result = validate(&loaded.stores, &params);

    ensure_out_dir(&args.out)?;
    write_json(&args.out.join("validation.json"), &to_value(&result)?)?;

    if !args.quiet {
        eprintln!("check: {} store(s), input sha256 {}", loaded.stores.len(), loaded.input_sha256);
        print_validation(&result);
    }
    verdict(&result)
}

fn run_once(args: &Args) -> Result<(), MainError> {
    let (loaded, params) = load(args)?;
    let run = distribute_traced(&loaded.stores, &params).map_err(map_distribute_err)?;
    info!(strategy = %run.strategy, valid = run.validation.valid, out = %args.out.display(), "writing artifacts");

    write_artifacts(args, &loaded, &params, &run)?;

    if !args.quiet {
        eprintln!("run: strategy {}, {} store(s)", run.strategy, run.allocation.stores().len());
        if let Some(b) = &run.balance {
            eprintln!(
                "run: balancing {} round(s), {} transfer(s){}",
                b.rounds,
                b.transfers.len(),
                if b.converged { "" } else { ", not converged" }
            );
        }
        print_validation(&run.validation);
        eprintln!("run: artifacts written to {}", args.out.to_string_lossy());
    }
    verdict(&run.validation)
}

fn write_artifacts(args: &Args, loaded: &LoadedInput, params: &Params, run: &DistributionRun) -> Result<(), MainError> {
    let out_dir = &args.out;
    ensure_out_dir(out_dir)?;

    // allocation.json (store order preserved)
    let alloc = allocation_to_value(&run.allocation);
    write_json(&out_dir.join("allocation.json"), &alloc)?;

    // validation.json
    write_json(&out_dir.join("validation.json"), &to_value(&run.validation)?)?;

    // trace.json (optional)
    if args.trace {
        write_json(&out_dir.join("trace.json"), &to_value(run)?)?;
    }

    // run_record.json (canonical)
    let record = json!({
        "engine": { "name": ENGINE_NAME, "version": ENGINE_VERSION },
        "strategy": run.strategy.as_str(),
        "input_sha256": loaded.input_sha256,
        "params_sha256": sha256_canonical(params).map_err(map_io_err)?,
        "allocation_sha256": sha256_canonical_value(&alloc).map_err(map_io_err)?,
        "valid": run.validation.valid,
        "balance_rounds": run.balance.as_ref().map_or(0, |b| b.rounds),
    });
    write_canonical_file(&out_dir.join("run_record.json"), &record).map_err(map_io_err)?;
    Ok(())
}

fn ensure_out_dir(out_dir: &Path) -> Result<(), MainError> {
    fs::create_dir_all(out_dir).map_err(|e| MainError::Io(format!("mkdir {}: {e}", out_dir.to_string_lossy())))
}

fn write_json(path: &Path, v: &Value) -> Result<(), MainError> {
    write_pretty_file(path, v).map_err(map_io_err)
}

fn to_value<T: serde::Serialize>(v: &T) -> Result<Value, MainError> {
    serde_json::to_value(v).map_err(|e| MainError::Io(format!("serialize: {e}")))
}

fn verdict(result: &ValidationResult) -> Result<(), MainError> {
    if result.valid {
        Ok(())
    } else {
        Err(MainError::Invalid(result.errors.len()))
    }
}

fn print_validation(result: &ValidationResult) {
    let stats = &result.statistics;
    eprintln!(
        "validation: {} ({} competitor(s), {} product(s), variance {:.2}%)",
        if result.valid { "valid" } else { "INVALID" },
        stats.competitor_count,
        stats.total_products,
        stats.variance_percent
    );
    for e in &result.errors {
        eprintln!("  error: {e}");
    }
    for sev in [Severity::Critical, Severity::Attention, Severity::Info] {
        for w in result.warnings_with(sev) {
            eprintln!("  {}: {}: {}", sev.as_str(), w.title, w.description);
        }
    }
}
