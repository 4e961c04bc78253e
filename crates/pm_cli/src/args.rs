//! Deterministic, offline CLI argument parsing & validation (spec §7.2).
//! Grounded on `vm_cli::args`'s shape: a `clap::Parser` struct, a
//! dedicated `CliError`, local-file existence checks, and a non-local-
//! path (URL scheme) guard — scaled down to this engine's smaller,
//! flat flag surface (no manifest/explicit mode split).

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;

#[derive(Debug, Parser)]
#[command(name = "pm-match", about = "Deterministic reviewer/paper assignment engine")]
pub struct Args {
    #[arg(long)]
    pub config: PathBuf,

    /// Repeatable `<source>=<path>` score edge file, one per signal
    /// source named in the configuration's `scores_specification`.
    #[arg(long = "score", value_name = "SOURCE=PATH")]
    pub score: Vec<String>,

    #[arg(long)]
    pub conflicts: Option<PathBuf>,
    #[arg(long)]
    pub vetoes: Option<PathBuf>,
    #[arg(long)]
    pub locks: Option<PathBuf>,
    #[arg(long = "custom-max")]
    pub custom_max: Option<PathBuf>,
    #[arg(long = "custom-demand")]
    pub custom_demand: Option<PathBuf>,

    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    #[arg(long, value_parser = ["json", "html"])]
    pub render: Vec<String>,

    /// Decimal seed for every deterministic draw this run makes.
    /// Defaults to 0 when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long = "validate-only")]
    pub validate_only: bool,

    #[arg(long)]
    pub quiet: bool,
}

#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
    BadScoreFlag(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::NonLocalPath(p) => write!(f, "path must be local (no URL scheme): {p}"),
            CliError::NotFound(p) => write!(f, "file not found: {p}"),
            CliError::BadScoreFlag(s) => {
                write!(f, "--score expects <source>=<path>, got {s:?}")
            }
        }
    }
}

impl std::error::Error for CliError {}

/// One `--score <source>=<path>` pairing, already split and validated.
pub struct ScoreArg {
    pub source: String,
    pub path: PathBuf,
}

fn has_scheme(s: &str) -> bool {
    if let Some(idx) = s.find("://") {
        s[..idx].chars().all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '-' || c == '.')
    } else {
        false
    }
}

fn ensure_local_file(path: &Path, label: &str) -> Result<(), CliError> {
    let s = path.to_string_lossy().to_string();
    if has_scheme(&s) {
        return Err(CliError::NonLocalPath(format!("{label} {s}")));
    }
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(CliError::NotFound(format!("{label} {s}"))),
    }
}

/// Parse and validate CLI arguments: every input path must be a local
/// file with no URL scheme, and every `--score` flag must split on a
/// single `=` into a non-empty source name and path.
pub fn parse_and_validate() -> Result<(Args, Vec<ScoreArg>), CliError> {
    let mut args = Args::parse();
    if args.render.is_empty() {
        args.render.push("json".to_string());
    }

    ensure_local_file(&args.config, "--config")?;
    if let Some(p) = &args.conflicts {
        ensure_local_file(p, "--conflicts")?;
    }
    if let Some(p) = &args.vetoes {
        ensure_local_file(p, "--vetoes")?;
    }
    if let Some(p) = &args.locks {
        ensure_local_file(p, "--locks")?;
    }
    if let Some(p) = &args.custom_max {
        ensure_local_file(p, "--custom-max")?;
    }
    if let Some(p) = &args.custom_demand {
        ensure_local_file(p, "--custom-demand")?;
    }

    let mut scores = Vec::with_capacity(args.score.len());
    for raw in &args.score {
        let (source, path) = raw.split_once('=').ok_or_else(|| CliError::BadScoreFlag(raw.clone()))?;
        if source.is_empty() || path.is_empty() {
            return Err(CliError::BadScoreFlag(raw.clone()));
        }
        let path = PathBuf::from(path);
        ensure_local_file(&path, "--score")?;
        scores.push(ScoreArg { source: source.to_string(), path });
    }

    Ok((args, scores))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_url_scheme() {
        assert!(has_scheme("https://example.com/a.json"));
        assert!(!has_scheme("/tmp/a.json"));
        assert!(!has_scheme(r"C:\a.json"));
    }
}
