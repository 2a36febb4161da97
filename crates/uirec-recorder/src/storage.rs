//! Session storage - JSON lines, metadata first

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use uirec_core::{CollectingSink, Event};

/// A named, finished recording
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedSession {
    pub name: String,
    pub events: Vec<Event>,
}

impl RecordedSession {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            events: Vec::new(),
        }
    }

    /// Take everything a collecting sink has received so far
    pub fn from_sink(name: impl Into<String>, sink: &CollectingSink) -> Self {
        Self {
            name: name.into(),
            events: sink.take(),
        }
    }
}

pub struct SessionStorage {
    dir: PathBuf,
}

impl SessionStorage {
    pub fn new() -> Result<Self> {
        let home = std::env::var("HOME").context("HOME not set")?;
        Self::with_dir(PathBuf::from(home).join(".uirec"))
    }

    pub fn with_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating storage dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Save a session as `<name>_<timestamp>.jsonl`
    pub fn save(&self, session: &RecordedSession) -> Result<PathBuf> {
        let ts = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let filename = format!("{}_{}.jsonl", sanitize(&session.name), ts);
        let path = self.dir.join(&filename);

        let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
        let mut w = BufWriter::new(file);

        let meta = serde_json::json!({
            "name": session.name,
            "events": session.events.len(),
        });
        serde_json::to_writer(&mut w, &meta)?;
        writeln!(w)?;

        for e in &session.events {
            serde_json::to_writer(&mut w, e)?;
            writeln!(w)?;
        }

        w.flush()?;
        tracing::debug!(path = %path.display(), events = session.events.len(), "saved session");
        Ok(path)
    }

    pub fn load(&self, filename: &str) -> Result<RecordedSession> {
        let path = self.dir.join(filename);
        let file = File::open(&path).with_context(|| format!("opening {}", path.display()))?;
        let mut lines = BufReader::new(file).lines();

        let meta_line = lines.next().context("empty session file")??;
        let meta: serde_json::Value =
            serde_json::from_str(&meta_line).context("parsing session metadata")?;
        let name = meta["name"].as_str().unwrap_or("unknown").to_string();

        let mut events = Vec::new();
        for (i, line) in lines.enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let e = Event::from_json(&line)
                .with_context(|| format!("{}: line {}", filename, i + 2))?;
            events.push(e);
        }

        if let Some(expected) = meta["events"].as_u64() {
            if expected as usize != events.len() {
                tracing::warn!(
                    file = filename,
                    expected,
                    found = events.len(),
                    "session event count does not match metadata"
                );
            }
        }

        Ok(RecordedSession { name, events })
    }

    /// Session file names, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if let Some(s) = entry.file_name().to_str() {
                if s.ends_with(".jsonl") {
                    files.push(s.to_string());
                }
            }
        }
        files.sort();
        Ok(files)
    }

    pub fn delete(&self, filename: &str) -> Result<()> {
        let path = self.dir.join(filename);
        fs::remove_file(&path).with_context(|| format!("deleting {}", path.display()))?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }
}

fn sanitize(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}
