//! supercheck CLI entry point
//!
//! Processes each file independently: a file that fails to parse or read is
//! reported and the run moves on, so one bad file never blocks the rest of a
//! pre-commit batch. The exit code tells the hook runner whether a re-run is
//! needed: non-zero when violations remain (check mode) or when any file was
//! rewritten (fix mode).

use std::process::ExitCode;
use std::time::Instant;

use supercheck::{check_file, fix_file, Cli, OutputFormat, Violation};

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let mut violations: Vec<Violation> = Vec::new();
    let mut any_modified = false;
    let mut any_error = false;
    let mut timings: Vec<(String, f64)> = Vec::new();

    for path in &cli.files {
        let display = path.display().to_string();
        let started = Instant::now();

        if cli.fix {
            match fix_file(path) {
                Ok(outcome) => {
                    if outcome.modified {
                        any_modified = true;
                        if cli.verbose {
                            eprintln!("fixed: {}", display);
                        }
                    }
                    violations.extend(outcome.unfixed);
                }
                Err(e) => {
                    eprintln!("{}", e);
                    any_error = true;
                }
            }
        } else {
            match check_file(path) {
                Ok(found) => violations.extend(found),
                Err(e) => {
                    eprintln!("{}", e);
                    any_error = true;
                }
            }
        }

        timings.push((display, started.elapsed().as_secs_f64() * 1000.0));
    }

    if cli.profile && !timings.is_empty() {
        for (path, ms) in &timings {
            eprintln!("{:.2}ms  {}", ms, path);
        }
        let total: f64 = timings.iter().map(|(_, ms)| ms).sum();
        eprintln!("--- {:.2}ms total ({} files)", total, timings.len());
    }

    match cli.format {
        OutputFormat::Text => {
            for v in &violations {
                println!("{}", v);
            }
        }
        OutputFormat::Json => match serde_json::to_string_pretty(&violations) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: JSON serialization failed: {}", e);
                any_error = true;
            }
        },
    }

    let failed = if cli.fix {
        any_error || any_modified || !violations.is_empty()
    } else {
        any_error || !violations.is_empty()
    };

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
