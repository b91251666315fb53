use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error};
use mtrext::cli::Cli;
use mtrext::{Mtr, MtrError};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logger
    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    // Validate the target before anything is spawned
    let target = cli.to_target()?;
    let mtr = Mtr::new(target, cli.to_options());
    debug!("Invocation: {} {}", mtr.options().program, mtr.args().join(" "));

    // Show a spinner while mtr runs, unless output is machine-readable
    let spinner = if cli.json || cli.raw {
        None
    } else {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.blue} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Tracing {} with {}", mtr.target(), mtr.options().program));
        pb.enable_steady_tick(Duration::from_millis(120));
        Some(pb)
    };

    // Run the trace
    let outcome = mtr.traceroute().await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let report = match outcome {
        Ok(report) => report,
        Err(MtrError::Failed(envelope)) => {
            error!(
                "{} exited with {:?} after {:.2}s",
                mtr.options().program,
                envelope.code,
                envelope.timetaken.as_secs_f64()
            );
            eprintln!("{}", envelope.results.raw.trim_end().red());
            std::process::exit(envelope.code.filter(|code| *code != 0).unwrap_or(1));
        }
        Err(e) => return Err(e.into()),
    };

    // Display results based on options
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if cli.raw {
        print!("{}", report.results.raw);
    } else {
        report.print_table();
    }

    // Save results if output path provided
    if let Some(output_path) = &cli.output {
        if output_path.ends_with(".json") {
            report.to_json_file(output_path)?;
        } else {
            report.to_text_file(output_path)?;
        }
    }

    Ok(())
}
