//! Command-line interface for digitsweep
//!
//! Reads the sweep scalars from stdin (or `--input`), merges ambient
//! settings, runs the sweep and prints the result. It uses clap for argument
//! parsing and tracing for logs on stderr.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::sync::Arc;

mod output;

pub use output::Output;

use crate::config::{OutputFormat, Settings, parse_sweep};
use crate::emit::{Emitter, NullEmitter, StdoutEmitter};
use crate::sweep::{SweepConfig, SweepReport, run_sweep};
use crate::worker::Mode;

/// Parallel weighted-digit checksum sweeps
#[derive(Parser, Debug)]
#[command(
    name = "digitsweep",
    version,
    about = "Parallel weighted-digit checksum sweeps with tally, list and fingerprint search modes",
    long_about = "Reads `lock_kind lower upper modulus worker_count mode [target]` from standard \
                  input, splits [lower, upper) across worker threads and prints the result.\n\n\
                  lock_kind: 0 = spin, 1 = blocking\n\
                  mode:      0 = tally, 1 = list, 2 = search (reads a SHA-1 target)"
)]
pub struct Cli {
    /// Read the input scalars from FILE instead of standard input
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Use a custom settings file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Zero-padding width for fingerprinted numbers
    #[arg(long, value_name = "DIGITS")]
    pub fingerprint_width: Option<usize>,

    /// Result format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output on stderr
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// Output handler matching the verbosity flags
    pub fn output(&self) -> Output {
        Output::new(self.verbose > 0, self.quiet)
    }

    /// Execute the sweep described by the input
    pub fn run(self, output: &Output) -> Result<()> {
        let settings = Settings::load(self.config.as_deref()).context("Failed to load settings")?;
        setup_logging(self.verbose, self.quiet, &settings.log_level);

        let text = self.read_input()?;
        let width = self.fingerprint_width.unwrap_or(settings.fingerprint_width);
        let format = self.format.unwrap_or(settings.format);

        let config = parse_sweep(&text, width).context("Invalid sweep configuration")?;
        describe(&config, output);

        let lines = Arc::new(StdoutEmitter::new());
        let emitter: Arc<dyn Emitter> = match config.mode {
            Mode::List => lines.clone(),
            Mode::Tally | Mode::Search => Arc::new(NullEmitter),
        };
        let report = run_sweep(&config, emitter)?;
        if lines.failed() {
            bail!("Failed to write list output to stdout");
        }

        render(&report, format)?;
        summarize(&report, output);
        Ok(())
    }

    fn read_input(&self) -> Result<String> {
        match &self.input {
            Some(path) => fs::read_to_string(path)
                .with_context(|| format!("Failed to read input file {}", path.display())),
            None => {
                let mut text = String::new();
                io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read standard input")?;
                Ok(text)
            }
        }
    }
}

fn describe(config: &SweepConfig, output: &Output) {
    let span = config.upper as i128 - config.lower as i128;
    if (config.workers as i128) > span {
        output.warning(&format!(
            "{} workers for {} numbers: {} workers will have nothing to scan",
            config.workers,
            span,
            config.workers as i128 - span
        ));
    }

    if output.is_verbose() {
        output.verbose(&format!("Sweeping [{}, {})", config.lower, config.upper));
        output.key_value("Mode:", &config.mode.to_string());
        output.key_value("Lock:", &config.lock_kind.to_string());
        output.key_value("Workers:", &config.workers.to_string());
        output.key_value("Modulus:", &config.modulus.get().to_string());
        if let Some(target) = &config.target {
            output.key_value("Target:", target.as_hex());
            output.key_value("Fingerprint width:", &config.fingerprint_width.to_string());
        }
    }
}

fn render(report: &SweepReport, format: OutputFormat) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match format {
        OutputFormat::Text => {
            if let Some(text) = report.outcome.render() {
                stdout.write_all(text.as_bytes())?;
            }
        }
        OutputFormat::Json => {
            serde_json::to_writer(&mut stdout, report)?;
            writeln!(stdout)?;
        }
    }
    stdout.flush()?;
    Ok(())
}

fn summarize(report: &SweepReport, output: &Output) {
    output.verbose(&format!(
        "Scanned {} numbers in {:.2}s with {} {} workers",
        report.scanned(),
        report.elapsed.as_secs_f64(),
        report.workers,
        report.lock
    ));
    let stopped = report.worker_stats.iter().filter(|s| s.stopped_early).count();
    if stopped > 0 {
        output.key_value("Stopped early:", &format!("{stopped} workers"));
    }
}

fn setup_logging(verbose: u8, quiet: bool, default_filter: &str) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::try_new(default_filter)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            1 => tracing_subscriber::EnvFilter::new("info"),
            2 => tracing_subscriber::EnvFilter::new("debug"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    // Logs share stderr with diagnostics; stdout is reserved for results.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}
