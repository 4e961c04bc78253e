// crates/pm_cli/src/main.rs
//
// Offline CLI entrypoint: load local config/edge files, run one match
// synchronously, write canonical artifacts, render any requested
// reports. Strictly offline and deterministic — no network, no OS RNG.

mod args;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use args::{parse_and_validate, Args, CliError, ScoreArg};
use pm_io::loader::{load_inputs, LoadedInputs, ScoreSource};
use pm_pipeline::run::{run_match, RunOptions};
use pm_pipeline::status_channel::{NullSink, StatusRegistry};
use pm_pipeline::{build_run_record, EngineError};

#[cfg(feature = "report-json")]
use pm_report::render_json as render_json_report;
#[cfg(feature = "report-html")]
use pm_report::render_html as render_html_report;

const ASSIGNMENT_FILE: &str = "assignment.json";
const RUN_RECORD_FILE: &str = "run_record.json";

fn main() -> ExitCode {
    let (args, scores) = match parse_and_validate() {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("pm-match: error: {e}");
            return ExitCode::from(2);
        }
    };

    match run(args, scores) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("pm-match: error: {e}");
            ExitCode::from(1)
        }
    }
}

fn run(args: Args, scores: Vec<ScoreArg>) -> Result<ExitCode, String> {
    fs::create_dir_all(&args.out)
        .map_err(|e| format!("cannot create output directory {}: {e}", args.out.display()))?;

    let score_sources: Vec<ScoreSource<'_>> =
        scores.iter().map(|s| ScoreSource { name: &s.source, path: &s.path }).collect();

    let inputs: LoadedInputs = load_inputs(
        &args.config,
        &score_sources,
        args.conflicts.as_deref(),
        args.vetoes.as_deref(),
        args.locks.as_deref(),
        args.custom_max.as_deref(),
        args.custom_demand.as_deref(),
    )
    .map_err(|e| format!("loading inputs: {e}"))?;

    if args.validate_only {
        if !args.quiet {
            println!(
                "pm-match: inputs validated — {} reviewers, {} papers",
                inputs.reviewers.len(),
                inputs.papers.len()
            );
        }
        return Ok(ExitCode::from(0));
    }

    let options = RunOptions { seed: args.seed.unwrap_or(0) };
    let registry = StatusRegistry::new();
    let sink = NullSink;
    let cancel = || false;

    let outcome = match run_match(&inputs, &options, &registry, &sink, &cancel) {
        Ok(outcome) => outcome,
        Err(EngineError::Solve(pm_algo::SolveError::Infeasible(msg))) => {
            if !args.quiet {
                println!("pm-match: no solution — {msg}");
            }
            return Ok(ExitCode::from(3));
        }
        Err(e) => return Err(e.to_string()),
    };

    let record = build_run_record(&inputs, &options, &outcome).map_err(|e| e.to_string())?;

    write_artifacts(&args.out, &record).map_err(|e| format!("write artifacts: {e}"))?;

    if !args.render.is_empty() {
        render_reports(&args.out, &inputs, &record, &args.render).map_err(|e| format!("render reports: {e}"))?;
    }

    if !args.quiet {
        println!(
            "pm-match: completed — {} papers, {} total assignments",
            record.assignments.len(),
            record.assignments.iter().map(|a| a.assigned.len()).sum::<usize>()
        );
        println!("pm-match: artifacts written to {}", args.out.display());
    }

    Ok(ExitCode::from(0))
}

fn write_artifacts(out_dir: &Path, record: &pm_pipeline::RunRecord) -> io::Result<()> {
    let assignment_bytes = serde_json::to_vec_pretty(&record.assignments)?;
    let run_record_bytes = serde_json::to_vec_pretty(record)?;

    write_bytes_atomically(&out_dir.join(ASSIGNMENT_FILE), &assignment_bytes)?;
    write_bytes_atomically(&out_dir.join(RUN_RECORD_FILE), &run_record_bytes)?;
    Ok(())
}

fn render_reports(
    out_dir: &Path,
    inputs: &LoadedInputs,
    record: &pm_pipeline::RunRecord,
    formats: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let model = pm_report::build_model(&inputs.config, record);

    for fmt in formats {
        match fmt.as_str() {
            #[cfg(feature = "report-json")]
            "json" => {
                let value = render_json_report(&model);
                let bytes = serde_json::to_vec_pretty(&value)?;
                write_bytes_atomically(&out_dir.join("report.json"), &bytes)?;
            }
            #[cfg(feature = "report-html")]
            "html" => {
                let html = render_html_report(&model)?;
                write_bytes_atomically(&out_dir.join("report.html"), html.as_bytes())?;
            }
            other => eprintln!("pm-match: warning: unknown --render format: {other}"),
        }
    }
    Ok(())
}

/// Write bytes with a single trailing LF and an atomic rename.
fn write_bytes_atomically(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = tmp_path_for(path);
    {
        let mut f = fs::File::create(&tmp)?;
        f.write_all(bytes)?;
        if !bytes.last().is_some_and(|b| *b == b'\n') {
            f.write_all(b"\n")?;
        }
        f.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path_for(final_path: &Path) -> PathBuf {
    let mut s = final_path.as_os_str().to_owned();
    s.push(".tmp");
    PathBuf::from(s)
}
