// crates/fair_cli/src/args.rs
//
// Offline CLI argument surface.
// - Inputs are local files only (reject any scheme:// like http/https/file)
// - --input is required; --params and the numeric flags are optional overrides
// - --check validates the input as a finished allocation, no distribution
// - -v / -vv raise the log level (RUST_LOG still wins when set)

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use fair_core::Params;

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "fairshare",
    version,
    disable_help_subcommand = true,
    about = "Offline, deterministic fair-share allocation of store quantities among competitors"
)]
pub struct Args {
    /// Store set JSON (object keyed by store name, or a {params, stores} envelope).
    #[arg(long)]
    pub input: PathBuf,

    /// Parameter JSON; overrides parameters embedded in the input envelope.
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Output directory for artifacts.
    #[arg(long, default_value = "out")]
    pub out: PathBuf,

    // --- Parameter overrides (highest precedence) ---
    /// Minimum amount per (store, competitor) slot.
    #[arg(long)]
    pub minimum: Option<u64>,
    /// Maximum variance percent inside an appearance group.
    #[arg(long = "max-variance")]
    pub max_variance: Option<f64>,
    /// Upper bound on balancing rounds.
    #[arg(long = "max-iterations", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_iterations: Option<u32>,
    /// Percentage points tolerated above --max-variance before validation fails.
    #[arg(long)]
    pub tolerance: Option<f64>,

    // --- Modes & output control ---
    /// Also write trace.json with the step-by-step history.
    #[arg(long, conflicts_with = "check")]
    pub trace: bool,

    /// Validate the input as an existing allocation; do not distribute.
    #[arg(long)]
    pub check: bool,

    /// Suppress the stderr summary.
    #[arg(long)]
    pub quiet: bool,

    /// More logging (-v debug, -vv trace).
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,
}

/// Errors surfaced by argument parsing/validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
    BadNumber(&'static str, String),
    MissingParams,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
            BadNumber(flag, v) => write!(f, "{flag} must be finite and >= 0, got {v}"),
            MissingParams => write!(
                f,
                "no parameters: pass --params, a {{params, stores}} envelope, or both --minimum and --max-variance"
            ),
        }
    }
}
impl std::error::Error for CliError {}

/// Reject any explicit URI scheme (e.g., http://, https://, file://).
#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

fn ensure_local_file(p: &Path) -> Result<(), CliError> {
    let shown = p.to_string_lossy();
    if has_scheme(&shown) {
        return Err(CliError::NonLocalPath(shown.into_owned()));
    }
    if !p.is_file() {
        return Err(CliError::NotFound(shown.into_owned()));
    }
    Ok(())
}

fn ensure_percent(flag: &'static str, v: Option<f64>) -> Result<(), CliError> {
    match v {
        Some(x) if !x.is_finite() || x < 0.0 => Err(CliError::BadNumber(flag, x.to_string())),
        _ => Ok(()),
    }
}

/// Parse from the process arguments and run the cheap checks.
pub fn parse_and_validate() -> Result<Args, CliError> {
    let args = Args::parse();
    validate_args(&args)?;
    Ok(args)
}

pub fn validate_args(args: &Args) -> Result<(), CliError> {
    ensure_local_file(&args.input)?;
    if let Some(p) = &args.params {
        ensure_local_file(p)?;
    }
    if has_scheme(&args.out.to_string_lossy()) {
        return Err(CliError::NonLocalPath(args.out.to_string_lossy().into_owned()));
    }
    ensure_percent("--max-variance", args.max_variance)?;
    ensure_percent("--tolerance", args.tolerance)?;
    Ok(())
}

impl Args {
    /// Precedence: flags > `--params` file > input envelope.
    /// Without any base, both `--minimum` and `--max-variance` are required.
    pub fn resolve_params(&self, file: Option<Params>, envelope: Option<Params>) -> Result<Params, CliError> {
        let mut params = match file.or(envelope) {
            Some(p) => p,
            None => match (self.minimum, self.max_variance) {
                (Some(min), Some(maxvar)) => Params::new(min, maxvar),
                _ => return Err(CliError::MissingParams),
            },
        };
        if let Some(v) = self.minimum {
            params.minimum_per_competitor = v;
        }
        if let Some(v) = self.max_variance {
            params.max_variance_percent = v;
        }
        if let Some(v) = self.max_iterations {
            params.max_balance_iterations = v;
        }
        if let Some(v) = self.tolerance {
            params.variance_tolerance_points = v;
        }
        Ok(params)
    }
}
