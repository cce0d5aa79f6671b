// Logging setup: stdout, a bounded in-memory buffer and an on-disk live log

use chrono::Utc;
use once_cell::sync::Lazy;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

const MAX_BUFFERED_LINES: usize = 2000;
const LIVE_LOG_FILE: &str = "champselect-live.log";

// Global in-memory log buffer
pub static LOG_BUFFER: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(Vec::new()));

static LIVE_LOG_PATH: Lazy<Mutex<Option<PathBuf>>> = Lazy::new(|| Mutex::new(None));

/// Installs the global subscriber. Calling it again is harmless; the first
/// subscriber stays in place.
pub fn init(data_dir: Option<&Path>, verbose: bool) {
  if let Some(dir) = data_dir {
    let logs_dir = dir.join("logs");
    match fs::create_dir_all(&logs_dir) {
      Ok(()) => {
        if let Ok(mut path) = LIVE_LOG_PATH.lock() {
          *path = Some(logs_dir.join(LIVE_LOG_FILE));
        }
      }
      // Non-fatal: we still keep logs in memory
      Err(e) => eprintln!("[Logging] Failed to ensure logs dir exists: {}", e),
    }
  }

  let default_level = if verbose { "debug" } else { "info" };
  let filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

  let _ = tracing_subscriber::registry()
    .with(filter)
    .with(fmt::layer().with_target(false))
    .with(
      fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(|| BufferWriter),
    )
    .try_init();
}

/// Writer handed to the fmt layer; every formatted line lands in the buffer
/// and the live log.
struct BufferWriter;

impl Write for BufferWriter {
  fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
    let text = String::from_utf8_lossy(buf);
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
      record_line(line);
    }
    Ok(buf.len())
  }

  fn flush(&mut self) -> io::Result<()> {
    Ok(())
  }
}

pub fn record_line(message: &str) {
  if let Ok(mut buf) = LOG_BUFFER.lock() {
    buf.push(message.to_string());
    if buf.len() > MAX_BUFFERED_LINES {
      let excess = buf.len() - MAX_BUFFERED_LINES;
      buf.drain(0..excess);
    }
  }

  let live_log = LIVE_LOG_PATH.lock().ok().and_then(|p| p.clone());
  if let Some(live_log) = live_log {
    // Ignore failures to avoid taking the watcher down with the log file
    if let Ok(mut f) = File::options().create(true).append(true).open(&live_log) {
      let _ = writeln!(f, "{}", message);
    }
  }
}

pub fn buffered_lines() -> Vec<String> {
  LOG_BUFFER.lock().map(|b| b.clone()).unwrap_or_default()
}

/// Writes a timestamped copy of the logs into `out_dir` and returns its path.
pub fn export_logs(out_dir: &Path) -> Result<PathBuf> {
  let live_log = LIVE_LOG_PATH.lock().ok().and_then(|p| p.clone());
  export_logs_from(live_log.as_deref(), out_dir)
}

fn export_logs_from(live_log: Option<&Path>, out_dir: &Path) -> Result<PathBuf> {
  fs::create_dir_all(out_dir)?;

  // Prefer the live log (everything since start), fall back to the buffer.
  let from_file = live_log
    .and_then(|p| fs::read_to_string(p).ok())
    .filter(|s| !s.is_empty());
  let contents = match from_file {
    Some(s) => s,
    None => {
      let lines = buffered_lines();
      if lines.is_empty() {
        return Err(io::Error::new(io::ErrorKind::NotFound, "No logs available").into());
      }
      lines.join("\n")
    }
  };

  let filename = format!("champselect-logs-{}.txt", Utc::now().format("%Y%m%d-%H%M%S"));
  let out_path = out_dir.join(filename);
  let mut file = File::create(&out_path)?;
  write!(file, "{}", contents)?;
  Ok(out_path)
}
