//! Append-only event log
//!
//! Separate from `tracing`, which covers internal diagnostics: this is the
//! operator-facing audit trail the specification requires verbatim —
//! one line per accept/disconnect/timeout/command/posting-error, each
//! stamped `[<Day Mon DD HH:MM:SS YYYY>]` in GMT.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Lines matching this prefix have their password argument masked before
/// being logged.
const AUTHINFO_PASS_PREFIX: &str = "AUTHINFO PASS";

/// A shared handle to the event log file, cloneable across connection tasks.
#[derive(Clone)]
pub struct EventLog {
    file: Arc<Mutex<tokio::fs::File>>,
}

impl EventLog {
    /// Open (creating/appending) the event log at `path`
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path).await?;
        Ok(Self {
            file: Arc::new(Mutex::new(file)),
        })
    }

    /// Append one event line, stamped with the current GMT time
    pub async fn log(&self, message: &str) {
        let stamp = Utc::now().format("%a %b %d %H:%M:%S %Y");
        let line = format!("[{stamp}] {message}\n");
        let mut file = self.file.lock().await;
        // Logging must never take down a connection handler; swallow write errors.
        let _ = file.write_all(line.as_bytes()).await;
        let _ = file.flush().await;
    }

    /// Log a raw received command line, masking `AUTHINFO PASS` arguments
    pub async fn log_command(&self, line: &str) {
        if mask_authinfo_pass(line) {
            self.log("Received request: AUTHINFO PASS ****").await;
        } else {
            self.log(&format!("Received request: {line}")).await;
        }
    }
}

/// Mask a command line's password before logging, used where the caller
/// already has a borrowed line and wants to decide whether to log at all.
pub fn mask_authinfo_pass(line: &str) -> bool {
    line.trim_start().to_ascii_uppercase().starts_with(AUTHINFO_PASS_PREFIX)
}
