//! CLI entrypoint for the specfun reference-conformance harness.

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, Subcommand};
use specfun_harness::cases::{self, CATALOG, CheckCase};
use specfun_harness::structured_log::{LogEmitter, LogEntry, LogLevel, now_utc};
use specfun_harness::{
    Availability, ConformanceReport, FixtureSet, MpmathOracle, ReferenceGate, ReferenceOracle,
    TestRunner, VerificationResult, VerificationSummary,
};

/// Conformance tooling for specfun.
#[derive(Debug, Parser)]
#[command(name = "harness")]
#[command(about = "Check specfun special functions against mpmath")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the check catalog.
    List,
    /// Report whether the reference is available and its version.
    Probe,
    /// Run catalog checks against the live reference.
    Run {
        /// Case to run (repeatable). Defaults to the whole catalog.
        #[arg(long = "case")]
        cases: Vec<String>,
        /// Also run cases marked slow.
        #[arg(long)]
        include_slow: bool,
        /// Output report path (`.json` for JSON, markdown otherwise).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Evaluate the reference and write one fixture JSON per case.
    Capture {
        /// Output directory for fixture JSON files.
        #[arg(long)]
        output: PathBuf,
        /// Case to capture (repeatable). Defaults to the whole catalog.
        #[arg(long = "case")]
        cases: Vec<String>,
    },
    /// Verify the library against captured fixtures, offline.
    Verify {
        /// Directory containing fixture JSON files.
        #[arg(long)]
        fixture: PathBuf,
        /// Output report path (`.json` for JSON, markdown otherwise).
        #[arg(long)]
        report: Option<PathBuf>,
        /// Structured JSONL log path.
        #[arg(long)]
        log: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::List => {
            println!(
                "{:<26} {:<8} {:<8} {:<8} {:<8} notes",
                "case", "function", "kind", "min ref", "rtol"
            );
            for case in CATALOG {
                let mut notes = Vec::new();
                if case.slow {
                    notes.push("slow");
                }
                if case.known_failure.is_some() {
                    notes.push("known failure");
                }
                println!(
                    "{:<26} {:<8} {:<8} {:<8} {:<8.0e} {}",
                    case.name,
                    case.function,
                    case.kind,
                    case.min_reference,
                    case.rtol,
                    notes.join(", ")
                );
            }
        }
        Command::Probe => {
            let oracle = MpmathOracle::from_env();
            match oracle.probe() {
                Availability::Installed { name, version } => {
                    println!("{name} {version} (interpreter: {})", oracle.python());
                }
                Availability::Missing { reason } => {
                    println!("reference unavailable: {reason}");
                }
            }
        }
        Command::Run {
            cases,
            include_slow,
            report,
            log,
        } => {
            let selected = select_cases(&cases)?;
            let oracle = MpmathOracle::from_env();
            let gate = ReferenceGate::from_availability(oracle.probe());
            let reference = describe(gate.availability());
            eprintln!("Running {} case(s) against {reference}", selected.len());

            let runner = TestRunner::new("run").with_slow(include_slow);
            let mut results = Vec::with_capacity(selected.len());
            let mut timings = Vec::with_capacity(selected.len());
            for case in &selected {
                let started = Instant::now();
                let result = runner.run_gated(&gate, &oracle, case);
                timings.push(elapsed_ms(started));
                eprintln!("[{}] {}", result.status.label(), result.case_name);
                results.push(result);
            }

            let summary = VerificationSummary::from_results(results);
            finish_run(
                "specfun vs reference",
                &reference,
                summary,
                &timings,
                report.as_deref(),
                log.as_deref(),
            )?;
        }
        Command::Capture { output, cases } => {
            let selected = select_cases(&cases)?;
            let oracle = MpmathOracle::from_env();
            let gate = ReferenceGate::from_availability(oracle.probe());
            eprintln!("Capturing from {}", describe(gate.availability()));

            let runner = TestRunner::new("capture").with_slow(true);
            for case in selected {
                match runner.capture_case(&gate, &oracle, case)? {
                    Some(fixture) => {
                        let path = output.join(format!("{}.json", case.name));
                        fixture.write_file(&path)?;
                        eprintln!(
                            "Wrote {} rows for {} to {}",
                            fixture.rows.len(),
                            case.name,
                            path.display()
                        );
                    }
                    None => eprintln!("Skipped {}: reference gate closed", case.name),
                }
            }
        }
        Command::Verify {
            fixture,
            report,
            log,
        } => {
            let sets = FixtureSet::load_dir(&fixture)?;
            eprintln!(
                "Verifying {} fixture set(s) from {}",
                sets.len(),
                fixture.display()
            );

            let runner = TestRunner::new("verify");
            let mut results = Vec::with_capacity(sets.len());
            let mut timings = Vec::with_capacity(sets.len());
            for (path, set) in &sets {
                let started = Instant::now();
                let result = runner.run_fixture(set);
                timings.push(elapsed_ms(started));
                eprintln!("[{}] {} ({})", result.status.label(), set.case, path.display());
                results.push(result);
            }

            let summary = VerificationSummary::from_results(results);
            finish_run(
                "specfun fixture verification",
                &format!("fixtures in {}", fixture.display()),
                summary,
                &timings,
                report.as_deref(),
                log.as_deref(),
            )?;
        }
    }

    Ok(())
}

fn select_cases(names: &[String]) -> Result<Vec<&'static CheckCase>, Box<dyn std::error::Error>> {
    if names.is_empty() {
        return Ok(CATALOG.iter().collect());
    }
    names
        .iter()
        .map(|name| {
            cases::find(name).ok_or_else(|| {
                let known: Vec<_> = CATALOG.iter().map(|c| c.name).collect();
                let err: Box<dyn std::error::Error> =
                    format!("Unknown case '{name}', expected one of {}", known.join("|")).into();
                err
            })
        })
        .collect()
}

fn describe(availability: &Availability) -> String {
    match availability {
        Availability::Installed { name, version } => format!("{name} {version}"),
        Availability::Missing { reason } => format!("no reference ({reason})"),
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

fn finish_run(
    title: &str,
    reference: &str,
    summary: VerificationSummary,
    timings: &[u64],
    report: Option<&Path>,
    log: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(log) = log {
        write_log(log, reference, &summary.results, timings, report)?;
        eprintln!("Wrote structured log to {}", log.display());
    }

    eprintln!(
        "{} passed, {} failed, {} skipped, {} known failures, {} unexpected passes, {} errors",
        summary.passed,
        summary.failed,
        summary.skipped,
        summary.known_failures,
        summary.unexpected_passes,
        summary.errors
    );
    let all_passed = summary.all_passed();
    let failing: Vec<VerificationResult> = summary
        .results
        .iter()
        .filter(|r| r.status.is_failure())
        .cloned()
        .collect();

    if let Some(path) = report {
        let report = ConformanceReport {
            title: title.to_string(),
            reference: reference.to_string(),
            timestamp: now_utc(),
            summary,
        };
        let body = if path.extension().is_some_and(|ext| ext == "json") {
            report.to_json()
        } else {
            report.to_markdown()
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, body)?;
        eprintln!("Wrote report to {}", path.display());
    }

    if !all_passed {
        for result in &failing {
            if let Some(detail) = &result.detail {
                eprintln!("{detail}");
            }
        }
        return Err(format!("{} case(s) did not pass", failing.len()).into());
    }
    Ok(())
}

fn write_log(
    path: &Path,
    reference: &str,
    results: &[VerificationResult],
    timings: &[u64],
    report: Option<&Path>,
) -> std::io::Result<()> {
    let mut emitter = LogEmitter::to_file(path, "specfun")?;
    emitter.emit_entry(
        LogEntry::new("", LogLevel::Info, "run_start")
            .with_details(serde_json::json!({ "reference": reference, "cases": results.len() })),
    )?;
    for (result, ms) in results.iter().zip(timings) {
        emitter.emit_entry(LogEntry::for_result(result).with_duration_ms(*ms))?;
    }
    let mut end = LogEntry::new("", LogLevel::Info, "run_end")
        .with_duration_ms(timings.iter().sum());
    if let Some(report) = report {
        end = end.with_artifacts(vec![report.display().to_string()]);
    }
    emitter.emit_entry(end)?;
    emitter.flush()
}
