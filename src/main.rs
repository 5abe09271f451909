use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use log::{error, info, warn};
use nascertime::config::Config;
use nascertime::display::{format_clock, rows, Summary, TABLE_HEADER};
use nascertime::error::ConfigError;
use nascertime::records::{now_millis, EpochMillis};
use nascertime::storage::JsonFileStore;
use nascertime::timer::{Stopwatch, Ticker};
use nascertime::{ContractionRecord, ContractionTracker};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// Command-line arguments for the contraction timer
#[derive(Parser)]
#[command(
    name = "nascertime",
    about = "Contraction timer - times contractions, keeps a local history and flags labor patterns",
    long_about = "Times contractions from the terminal, classifies each one as valid (at least one \
                  minute) or prodromal, keeps the history in a local JSON file and evaluates the \
                  3-1-1 heuristic over the last hour."
)]
struct Cli {
    /// Path to configuration file
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Configuration file path (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Override the history file location
    #[arg(long, value_name = "FILE")]
    history: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging output (debug level)")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Time a contraction interactively: Enter stops, Ctrl+C cancels
    Time,

    /// Record a contraction from explicit timestamps
    Record {
        /// Start instant in epoch milliseconds
        #[arg(long, value_name = "MS", conflicts_with = "duration")]
        start: Option<EpochMillis>,

        /// End instant in epoch milliseconds (defaults to now)
        #[arg(long, value_name = "MS", conflicts_with = "duration")]
        end: Option<EpochMillis>,

        /// Duration in seconds, ending now
        #[arg(long, value_name = "SECS")]
        duration: Option<u64>,
    },

    /// Show counts, last interval and the current alert
    Status,

    /// Show the full history table
    History,

    /// Delete the whole local history
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Export the history as JSON
    Export {
        /// Destination file (defaults to the configured export file)
        #[arg(short, long, value_name = "FILE", conflicts_with = "stdout")]
        output: Option<PathBuf>,

        /// Write to standard output instead of a file
        #[arg(long)]
        stdout: bool,
    },
}

impl Cli {
    /// Validate the CLI arguments
    ///
    /// # Returns
    ///
    /// `Ok(())` if all arguments are valid, `Err(String)` with error message otherwise
    fn validate(&self) -> Result<(), String> {
        if let Some(ref config_path) = self.config {
            // Missing files fall back to defaults in load_config
            if config_path.exists() && !config_path.is_file() {
                return Err(format!(
                    "Configuration path is not a file: {}",
                    config_path.display()
                ));
            }
        }

        if let Some(ref history_path) = self.history {
            if history_path.is_dir() {
                return Err(format!(
                    "History path is a directory: {}",
                    history_path.display()
                ));
            }
        }

        Ok(())
    }
}

/// Resolve the `(start, end)` pair of a manual `record` invocation
fn resolve_record_window(
    start: Option<EpochMillis>,
    end: Option<EpochMillis>,
    duration: Option<u64>,
    now: EpochMillis,
) -> Result<(EpochMillis, EpochMillis), String> {
    if let Some(secs) = duration {
        let span = i64::try_from(secs)
            .ok()
            .and_then(|s| s.checked_mul(1000))
            .ok_or_else(|| format!("Duration too large: {}s", secs))?;
        return Ok((now.saturating_sub(span), now));
    }

    match start {
        Some(start) => Ok((start, end.unwrap_or(now))),
        None => Err("Either --start or --duration is required".to_string()),
    }
}

/// Load configuration from file or use defaults
///
/// A missing or invalid file is reported and replaced by the defaults.
fn load_config(config_path: Option<&Path>) -> Config {
    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            match Config::from_file(path) {
                Ok(config) => config,
                Err(ConfigError::ReadError(_)) => {
                    warn!(
                        "Configuration file '{}' not found or unreadable, using defaults",
                        path.display()
                    );
                    Config::default()
                }
                Err(e) => {
                    error!("Configuration error in '{}': {}", path.display(), e);
                    warn!("Using default configuration due to invalid config file");
                    Config::default()
                }
            }
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    }
}

/// How an interactive timing ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimingSignal {
    Stop,
    Cancel,
}

fn time_contraction(tracker: &mut ContractionTracker, config: &Config) -> Result<()> {
    let mut stopwatch = Stopwatch::new();
    let started_at = stopwatch.start()?;

    let (signal_sender, signal_receiver) = mpsc::channel();

    let cancel_sender = signal_sender.clone();
    ctrlc::set_handler(move || {
        let _ = cancel_sender.send(TimingSignal::Cancel);
    })
    .context("Failed to install Ctrl+C handler")?;

    // Stdin blocks, so it gets its own thread; the process exits without joining it.
    std::thread::spawn(move || {
        let mut line = String::new();
        let signal = match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => TimingSignal::Cancel,
            Ok(_) => TimingSignal::Stop,
        };
        let _ = signal_sender.send(signal);
    });

    println!("Timing contraction. Press Enter to stop, Ctrl+C to cancel.");
    let ticker = Ticker::spawn(started_at, config.timer.tick_interval(), |secs| {
        print!("\r{}", format_clock(secs));
        let _ = io::stdout().flush();
    });

    let signal = signal_receiver.recv().unwrap_or(TimingSignal::Cancel);
    ticker.stop();
    println!();

    match signal {
        TimingSignal::Stop => {
            let (start, end) = stopwatch.stop()?;
            let record = tracker.record(start, end);
            print_recorded(tracker, &record);
        }
        TimingSignal::Cancel => {
            stopwatch.cancel();
            println!("Timing cancelled, nothing recorded.");
        }
    }
    Ok(())
}

fn print_recorded(tracker: &ContractionTracker, record: &ContractionRecord) {
    println!(
        "Recorded {} contraction of {}",
        record.kind().label().to_lowercase(),
        format_clock(record.duration_sec())
    );
    println!("{}", Summary::of(tracker.log(), now_millis()));
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

fn print_history(tracker: &ContractionTracker) {
    if tracker.log().is_empty() {
        println!("No contractions recorded.");
        return;
    }
    println!("{}", TABLE_HEADER);
    for row in rows(tracker.log().records()) {
        println!("{}", row);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref());
    let history_path = cli
        .history
        .clone()
        .unwrap_or_else(|| config.storage.history_path.clone());

    info!("Using history at {}", history_path.display());
    let mut tracker = ContractionTracker::open(Box::new(JsonFileStore::new(history_path)));

    match cli.command {
        Command::Time => time_contraction(&mut tracker, &config)?,
        Command::Record {
            start,
            end,
            duration,
        } => {
            let (start, end) = resolve_record_window(start, end, duration, now_millis())
                .map_err(anyhow::Error::msg)?;
            let record = tracker.record(start, end);
            print_recorded(&tracker, &record);
        }
        Command::Status => println!("{}", Summary::of(tracker.log(), now_millis())),
        Command::History => print_history(&tracker),
        Command::Clear { yes } => {
            if !yes && !confirm("Clear the entire local history? This cannot be undone.")? {
                println!("Nothing cleared.");
                return Ok(());
            }
            tracker.clear();
            println!("History cleared.");
        }
        Command::Export { output, stdout } => {
            let json = tracker
                .export_json()
                .context("Failed to serialize history")?;
            if stdout {
                println!("{}", json);
            } else {
                let path = output.unwrap_or_else(|| config.export.default_file.clone());
                if path.is_dir() {
                    bail!("Export path is a directory: {}", path.display());
                }
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write export to {}", path.display()))?;
                println!(
                    "Exported {} contractions to {}",
                    tracker.log().len(),
                    path.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    if let Err(e) = cli.validate() {
        error!("Invalid arguments: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn cli_with(config: Option<PathBuf>, history: Option<PathBuf>) -> Cli {
        Cli {
            config,
            history,
            verbose: false,
            command: Command::Status,
        }
    }

    #[test]
    fn test_cli_validation_with_existing_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("nascertime.toml");
        std::fs::write(&config_path, "[timer]\ntick_interval_ms = 200\n").unwrap();

        assert!(cli_with(Some(config_path), None).validate().is_ok());
    }

    #[test]
    fn test_cli_validation_with_missing_file() {
        let cli = cli_with(Some(PathBuf::from("/nonexistent/config.toml")), None);
        // Missing files are handled gracefully
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn test_cli_validation_with_directory() {
        let dir = TempDir::new().unwrap();
        assert!(cli_with(Some(dir.path().to_path_buf()), None)
            .validate()
            .is_err());
        assert!(cli_with(None, Some(dir.path().to_path_buf()))
            .validate()
            .is_err());
    }

    #[test]
    fn test_parse_record_with_duration() {
        let cli = Cli::try_parse_from(["nascertime", "record", "--duration", "75"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Record {
                start: None,
                end: None,
                duration: Some(75)
            }
        );
    }

    #[test]
    fn test_parse_record_rejects_mixed_forms() {
        let result =
            Cli::try_parse_from(["nascertime", "record", "--start", "0", "--duration", "75"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_export_rejects_output_and_stdout() {
        let result =
            Cli::try_parse_from(["nascertime", "export", "--output", "a.json", "--stdout"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_record_window() {
        assert_eq!(
            resolve_record_window(None, None, Some(70), 100_000),
            Ok((30_000, 100_000))
        );
        assert_eq!(
            resolve_record_window(Some(1_000), Some(5_000), None, 100_000),
            Ok((1_000, 5_000))
        );
        assert_eq!(
            resolve_record_window(Some(1_000), None, None, 100_000),
            Ok((1_000, 100_000))
        );
        assert!(resolve_record_window(None, Some(5_000), None, 100_000).is_err());
        assert!(resolve_record_window(None, None, Some(u64::MAX), 100_000).is_err());
    }

    #[test]
    fn test_load_config_falls_back_on_invalid_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("bad.toml");
        std::fs::write(&config_path, "[timer]\ntick_interval_ms = 0\n").unwrap();

        assert_eq!(load_config(Some(config_path.as_path())), Config::default());
        assert_eq!(
            load_config(Some(Path::new("/nonexistent/nascertime.toml"))),
            Config::default()
        );
    }

    #[test]
    fn test_run_records_and_clears_through_file_store() {
        let dir = TempDir::new().unwrap();
        let history = dir.path().join("history.json");

        let record = Cli {
            config: None,
            history: Some(history.clone()),
            verbose: false,
            command: Command::Record {
                start: Some(0),
                end: Some(70_000),
                duration: None,
            },
        };
        run(record).unwrap();

        let saved = std::fs::read_to_string(&history).unwrap();
        assert!(saved.contains("\"type\":\"valid\""));

        let clear = Cli {
            config: None,
            history: Some(history.clone()),
            verbose: false,
            command: Command::Clear { yes: true },
        };
        run(clear).unwrap();
        assert_eq!(std::fs::read_to_string(&history).unwrap(), "[]");
    }
}
