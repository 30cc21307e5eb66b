//! Rolling File Logger
//!
//! A small `log::Log` backend that writes timestamped lines to a log file,
//! rotates the file when it grows past a size limit, and keeps a circular
//! buffer of the most recent lines for in-app diagnostics.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{Level, LevelFilter, Log, Metadata, Record};

/// Maximum size of the active log file before rotation (bytes)
const MAX_FILE_SIZE: u64 = 1024 * 1024;
/// Number of rotated files kept around (app.log.1 .. app.log.N)
const MAX_ROTATED_FILES: usize = 3;
/// Capacity of the in-memory ring of recent lines
const RECENT_CAPACITY: usize = 256;

/// Logger state behind a single mutex (log::Log requires Sync)
struct Inner {
    file: File,
    written: u64,
    recent: VecDeque<String>,
}

/// Rolling file logger
pub struct RollingLogger {
    path: PathBuf,
    inner: Mutex<Inner>,
    level: LevelFilter,
}

impl RollingLogger {
    /// Open (or create) the log file under `log_dir` for `app_name`
    pub fn new(log_dir: &Path, app_name: &str) -> std::io::Result<Self> {
        fs::create_dir_all(log_dir)?;
        let path = log_dir.join(format!("{}.log", app_name));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok(Self {
            path,
            inner: Mutex::new(Inner {
                file,
                written,
                recent: VecDeque::with_capacity(RECENT_CAPACITY),
            }),
            level: LevelFilter::Debug,
        })
    }

    /// Override the maximum level (default: Debug)
    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Most recent log lines, oldest first
    pub fn recent_lines(&self) -> Vec<String> {
        let inner = self.inner.lock().expect("logger mutex poisoned");
        inner.recent.iter().cloned().collect()
    }

    fn format_line(record: &Record) -> String {
        format!(
            "[{}] [{}] [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    }

    /// Shift app.log -> app.log.1 -> ... -> app.log.N, dropping the oldest
    fn rotate(&self, inner: &mut Inner) -> std::io::Result<()> {
        inner.file.flush()?;
        let oldest = rotated_path(&self.path, MAX_ROTATED_FILES);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }
        for i in (1..MAX_ROTATED_FILES).rev() {
            let from = rotated_path(&self.path, i);
            if from.exists() {
                fs::rename(&from, rotated_path(&self.path, i + 1))?;
            }
        }
        fs::rename(&self.path, rotated_path(&self.path, 1))?;
        inner.file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        inner.written = 0;
        Ok(())
    }
}

fn rotated_path(base: &Path, index: usize) -> PathBuf {
    let mut os = base.as_os_str().to_owned();
    os.push(format!(".{}", index));
    PathBuf::from(os)
}

impl Log for RollingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = Self::format_line(record);
        let mut inner = self.inner.lock().expect("logger mutex poisoned");
        if inner.recent.len() == RECENT_CAPACITY {
            inner.recent.pop_front();
        }
        inner.recent.push_back(line.clone());

        if inner.written >= MAX_FILE_SIZE {
            if let Err(e) = self.rotate(&mut inner) {
                eprintln!("rolling-logger: rotation failed: {}", e);
            }
        }
        if writeln!(inner.file, "{}", line).is_ok() {
            inner.written += line.len() as u64 + 1;
        }
        // Mirror warnings and errors to stderr so they are visible headless
        if record.level() <= Level::Warn {
            eprintln!("{}", line);
        }
    }

    fn flush(&self) {
        let mut inner = self.inner.lock().expect("logger mutex poisoned");
        let _ = inner.file.flush();
    }
}

/// Install a `RollingLogger` as the global logger.
///
/// Returns an error if a global logger is already set.
pub fn init_logger(log_dir: PathBuf, app_name: &str) -> Result<(), String> {
    let logger = RollingLogger::new(&log_dir, app_name).map_err(|e| e.to_string())?;
    let level = logger.level;
    log::set_boxed_logger(Box::new(logger)).map_err(|e| e.to_string())?;
    log::set_max_level(level);
    Ok(())
}
