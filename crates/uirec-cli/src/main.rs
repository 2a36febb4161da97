//! uirec CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use uirec_recorder::prelude::*;

#[derive(Parser)]
#[command(name = "uirec")]
#[command(about = "GUI interaction recorder - combine, stream and manage recorded sessions")]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Recorder configuration (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Session directory (default: ~/.uirec)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Combine a file of raw events
    Combine {
        /// JSON lines, one raw event per line
        input: PathBuf,

        /// Save as a named session instead of printing
        #[arg(long)]
        save: Option<String>,

        /// Skip a combining stage
        #[arg(long, value_enum)]
        bypass: Vec<BypassStage>,
    },

    /// Combine raw events from stdin as they arrive
    Stream {
        #[arg(long, value_enum)]
        bypass: Vec<BypassStage>,

        /// Lines buffered between reader and pipeline
        #[arg(long)]
        capacity: Option<usize>,

        /// Log combined events to stderr instead of printing JSON lines
        #[arg(long)]
        log: bool,
    },

    /// List saved sessions
    List,

    /// Show session info
    Show {
        /// Session file
        file: String,

        /// Show all events
        #[arg(long)]
        all: bool,
    },

    /// Delete a session
    Delete {
        /// Session file
        file: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BypassStage {
    LowLevel,
    HighLevel,
}

impl From<BypassStage> for Stage {
    fn from(stage: BypassStage) -> Self {
        match stage {
            BypassStage::LowLevel => Stage::LowLevel,
            BypassStage::HighLevel => Stage::HighLevel,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // stdout carries events, logs go to stderr
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Commands::Combine { ref input, ref save, ref bypass } => {
            let config = load_config(cli.config.as_deref(), bypass)?;
            combine(input, save.as_deref(), &config, cli.dir.as_deref())?;
        }
        Commands::Stream { ref bypass, capacity, log } => {
            let mut config = load_config(cli.config.as_deref(), bypass)?;
            if let Some(capacity) = capacity {
                config.channel_capacity = capacity.max(1);
            }
            stream(config, log)?;
        }
        Commands::List => {
            list(cli.dir.as_deref())?;
        }
        Commands::Show { ref file, all } => {
            show(file, all, cli.dir.as_deref())?;
        }
        Commands::Delete { ref file } => {
            delete(file, cli.dir.as_deref())?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>, bypass: &[BypassStage]) -> Result<RecorderConfig> {
    let mut config = match path {
        Some(path) => RecorderConfig::from_json_file(path)?,
        None => RecorderConfig::default(),
    };
    for &stage in bypass {
        match Stage::from(stage) {
            Stage::LowLevel => config.low_level_combining = false,
            Stage::HighLevel => config.high_level_combining = false,
        }
    }
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn open_storage(dir: Option<&Path>) -> Result<SessionStorage> {
    match dir {
        Some(dir) => SessionStorage::with_dir(dir),
        None => SessionStorage::new(),
    }
}

/// Parse one input line. Blank lines and `#` comments yield nothing,
/// malformed lines are logged and skipped.
fn parse_line(line: &str, lineno: usize) -> Option<Event> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    match Event::from_json(trimmed) {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!(line = lineno, error = %e, "skipping malformed event");
            None
        }
    }
}

fn read_events<R: BufRead>(reader: R) -> Result<Vec<Event>> {
    let mut events = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", i + 1))?;
        events.extend(parse_line(&line, i + 1));
    }
    Ok(events)
}

/// Run `events` through the configured pipeline and collect the output
fn combine_events(events: Vec<Event>, config: &RecorderConfig) -> Vec<Event> {
    let sink = CollectingSink::new();
    let mut recorder = EventRecorder::with_pipeline(sink.clone(), config.clone());
    recorder.start();
    for event in events {
        recorder.record(event);
    }
    recorder.stop();
    sink.take()
}

fn combine(input: &Path, save: Option<&str>, config: &RecorderConfig, dir: Option<&Path>) -> Result<()> {
    let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;
    let raw = read_events(BufReader::new(file))?;
    let raw_count = raw.len();
    let combined = combine_events(raw, config);
    tracing::info!(raw = raw_count, combined = combined.len(), "combined events");

    match save {
        Some(name) => {
            let storage = open_storage(dir)?;
            let session = RecordedSession {
                name: name.to_string(),
                events: combined,
            };
            let path = storage.save(&session)?;
            println!("Saved: {}", path.display());
        }
        None => {
            let mut out = JsonLinesSink::new(io::stdout().lock());
            for event in combined {
                out.handle_event(event);
            }
            out.flush();
        }
    }

    Ok(())
}

fn stream(config: RecorderConfig, log: bool) -> Result<()> {
    let (tx, rx) = crossbeam_channel::bounded::<String>(config.channel_capacity);

    // the reader may stay blocked on stdin after Ctrl+C, so it is never joined
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "stdin read failed");
                    break;
                }
            }
        }
    });

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let sink: Box<dyn EventHandler> = if log {
        Box::new(LogSink::new())
    } else {
        Box::new(JsonLinesSink::new(io::stdout()))
    };
    let mut recorder = EventRecorder::with_pipeline(sink, config);
    recorder.start();

    let lines = pump(&rx, &running, &mut recorder);
    tracing::info!(lines, "stream finished");
    Ok(())
}

/// Feed lines into the recorder until `running` clears or the sender hangs
/// up, then stop it so both stages drain. Returns the number of lines read.
fn pump<H: EventHandler>(
    rx: &Receiver<String>,
    running: &AtomicBool,
    recorder: &mut EventRecorder<H>,
) -> usize {
    let mut lineno = 0;
    while running.load(Ordering::SeqCst) {
        match rx.recv_timeout(Duration::from_millis(100)) {
            Ok(line) => {
                lineno += 1;
                if let Some(event) = parse_line(&line, lineno) {
                    recorder.record(event);
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    recorder.stop();
    lineno
}

fn list(dir: Option<&Path>) -> Result<()> {
    let storage = open_storage(dir)?;
    let files = storage.list()?;

    if files.is_empty() {
        println!("No sessions saved.");
    } else {
        for f in files {
            println!("{}", f);
        }
    }

    Ok(())
}

fn show(file: &str, all: bool, dir: Option<&Path>) -> Result<()> {
    let storage = open_storage(dir)?;
    let session = storage.load(file)?;

    println!("Name: {}", session.name);
    println!("Events: {}", session.events.len());
    for (kind, count) in count_kinds(&session.events) {
        println!("  {:<7} {}", kind, count);
    }

    if all {
        println!();
        for (i, e) in session.events.iter().enumerate() {
            println!("{:>4} {:<7} {} {}", i, e.kind(), e.target, describe(&e.payload));
        }
    }

    Ok(())
}

fn delete(file: &str, dir: Option<&Path>) -> Result<()> {
    let storage = open_storage(dir)?;
    storage.delete(file)?;
    println!("Deleted: {}", file);
    Ok(())
}

fn count_kinds(events: &[Event]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for e in events {
        *counts.entry(e.kind().as_str()).or_insert(0) += 1;
    }
    counts
}

fn describe(payload: &Payload) -> String {
    match payload {
        Payload::Mouse(m) => format!("{:?} at ({}, {})", m.subtype, m.position.x, m.position.y),
        Payload::Key(k) => format!("{:?} {:?}", k.subtype, k.text),
        Payload::Resize(r) => format!(
            "{}x{} -> {}x{}",
            r.old_size.width, r.old_size.height, r.new_size.width, r.new_size.height
        ),
        Payload::Action(a) => a.action_name.clone(),
        Payload::Probe(p) => format!("{:?}", p.data),
        Payload::Type(t) => format!("{:?}", t.text),
        Payload::Click(c) if c.count > 1 => {
            format!("{:?} x{} at ({}, {})", c.button, c.count, c.position.x, c.position.y)
        }
        Payload::Click(c) => format!("{:?} at ({}, {})", c.button, c.position.x, c.position.y),
    }
}
