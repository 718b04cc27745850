//! BLE Trace Recorder CLI
//!
//! Records intercepted characteristic writes into per-session trace files
//! and inspects the traces afterwards.

use anyhow::{bail, Context, Result};
use ble_trace_recorder::{
    config::Config,
    ingest::BoundaryCall,
    trace::{expand_short_uuid, list_trace_files, read_trace},
    transparency::{create_shared_log, create_shared_log_with_persistence},
    SessionController, SessionState, VERSION,
};
use clap::{Parser, Subcommand};
use crossbeam_channel::{bounded, RecvTimeoutError};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ble-trace")]
#[command(version = VERSION)]
#[command(about = "Session-scoped recorder for intercepted BLE writes", long_about = None)]
struct Cli {
    /// Override the storage root from the config file
    #[arg(long, global = true)]
    storage_root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record boundary calls read from stdin, one per line
    Record,

    /// List recorded trace files, newest first
    List {
        /// Directory to list (defaults to the configured record directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Decode and print a trace file
    Dump {
        /// Trace file to decode
        file: PathBuf,
    },

    /// Show persisted recording statistics
    Status,

    /// Show configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.storage_root);

    let result = match cli.command {
        Commands::Record => cmd_record(&config),
        Commands::List { dir } => cmd_list(dir.unwrap_or_else(|| config.record_path())),
        Commands::Dump { file } => cmd_dump(&file),
        Commands::Status => cmd_status(&config),
        Commands::Config => cmd_config(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn load_config(storage_root: Option<PathBuf>) -> Config {
    let mut config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("could not load config, using defaults: {e}");
            Config::default()
        }
    };
    if let Some(root) = storage_root {
        config.storage_root = root;
    }
    config
}

fn cmd_record(config: &Config) -> Result<()> {
    let transparency = match &config.transparency_file {
        Some(path) => create_shared_log_with_persistence(path.clone()),
        None => create_shared_log(),
    };
    let controller = SessionController::new(config.record_path())
        .with_transparency_log(transparency.clone());

    info!(record_dir = %controller.record_dir().display(), "waiting for boundary calls on stdin");

    let running = Arc::new(AtomicBool::new(true));
    ctrlc_handler(running.clone())?;

    // Stdin blocks, so it gets its own thread; the channel closing means EOF.
    let (sender, receiver) = bounded::<String>(1_024);
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if sender.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("stdin read failed: {e}");
                    break;
                }
            }
        }
    });

    let mut line_no = 0usize;
    while running.load(Ordering::SeqCst) {
        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(line) => {
                line_no += 1;
                match BoundaryCall::parse(&line) {
                    Ok(Some(call)) => call.apply(&controller),
                    Ok(None) => {}
                    Err(e) => warn!(line = line_no, "skipping input: {e}"),
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    if let SessionState::Recording { session_id, path } = controller.state() {
        info!(session = %session_id, path = %path.display(), "input ended with a session open");
    }
    controller.on_session_stop();

    if let Err(e) = transparency.save() {
        warn!("could not save transparency log: {e}");
    }

    println!();
    println!("{}", transparency.summary());
    Ok(())
}

fn cmd_list(dir: PathBuf) -> Result<()> {
    if !dir.exists() {
        println!("No traces found in {dir:?}");
        return Ok(());
    }

    let entries =
        list_trace_files(&dir).with_context(|| format!("listing {}", dir.display()))?;
    if entries.is_empty() {
        println!("No traces found in {dir:?}");
        return Ok(());
    }

    for (index, entry) in entries.iter().enumerate() {
        match &entry.session {
            Some((id, started)) => println!(
                "index: {index}, session: {id}, started: {}",
                started.format("%Y-%m-%d %H:%M")
            ),
            None => println!("index: {index}, file: {}", entry.file_name()),
        }
    }
    Ok(())
}

fn cmd_dump(file: &Path) -> Result<()> {
    if !file.is_file() {
        bail!("{} is not a file", file.display());
    }
    let records = read_trace(file).with_context(|| format!("reading {}", file.display()))?;

    let mut offset_ms: i64 = 0;
    for record in &records {
        offset_ms += record.elapsed_ms;
        println!(
            "{:>+7}ms (t={:>8}ms) {} {} {}",
            record.elapsed_ms,
            offset_ms,
            expand_short_uuid(&record.service),
            expand_short_uuid(&record.characteristic),
            hex::encode(&record.payload)
        );
    }
    println!();
    println!("{} records, {} ms total", records.len(), offset_ms);
    Ok(())
}

fn cmd_status(config: &Config) -> Result<()> {
    println!("BLE Trace Recorder Status");
    println!("=========================");
    println!();
    println!("Record directory: {:?}", config.record_path());
    println!();

    let stats_path = match &config.transparency_file {
        Some(path) if path.exists() => path,
        _ => {
            println!("No previous recording data found.");
            return Ok(());
        }
    };

    let content = std::fs::read_to_string(stats_path)
        .with_context(|| format!("reading {}", stats_path.display()))?;
    let stats: serde_json::Value = serde_json::from_str(&content)?;

    println!("Cumulative Statistics:");
    for (key, label) in [
        ("sessions_started", "Sessions started"),
        ("sessions_ended", "Sessions ended"),
        ("setup_failures", "Session setup failures"),
        ("events_recorded", "Events recorded"),
        ("events_dropped", "Events dropped"),
        ("write_failures", "Write failures"),
    ] {
        if let Some(value) = stats.get(key) {
            println!("  {label}: {value}");
        }
    }
    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) -> Result<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .context("setting Ctrl+C handler")
}
