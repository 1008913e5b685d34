//! JSON output for machine consumers
//!
//! When --json-progress flag is enabled, progress and status information
//! is emitted as JSON lines to stdout and the progress bars are hidden.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::image_processing::batch::ProgressUpdate;
use crate::image_processing::Split;

/// Last progress emission timestamp (milliseconds since epoch)
/// Used for throttling progress updates to ~25 FPS (40ms between updates)
static LAST_PROGRESS_MS: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JsonMessage {
    /// A split is about to be processed
    SplitStarted { split: String, total: usize },
    /// Progress update within a split
    Progress {
        split: String,
        current: usize,
        total: usize,
        fraction: f64,
        eta_secs: Option<f64>,
    },
    /// All files of a split were written
    SplitCompleted {
        split: String,
        processed: usize,
        duration_secs: f64,
    },
    /// A file of the split could not be processed; the run stops here
    SplitFailed { split: String, error: String },
    /// Processing summary
    Summary {
        total_files: usize,
        processed: usize,
        dry_run: bool,
        duration_secs: f64,
    },
}

impl JsonMessage {
    /// Serialize to a single JSON line
    pub fn to_line(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }

    /// Emit JSON message to stdout
    pub fn emit(&self) {
        if let Some(json) = self.to_line() {
            println!("{}", json);
        }
    }

    pub fn split_started(split: Split, total: usize) {
        Self::SplitStarted {
            split: split.to_string(),
            total,
        }
        .emit();
    }

    /// Create and emit progress message (throttled to ~25 FPS).
    /// The final progress (current == total) is always emitted.
    pub fn progress(split: Split, update: ProgressUpdate) {
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        let last_ms = LAST_PROGRESS_MS.load(Ordering::Relaxed);

        if now_ms.saturating_sub(last_ms) >= 40 || update.completed == update.total {
            LAST_PROGRESS_MS.store(now_ms, Ordering::Relaxed);
            Self::from_update(split, update).emit();
        }
    }

    pub fn from_update(split: Split, update: ProgressUpdate) -> Self {
        Self::Progress {
            split: split.to_string(),
            current: update.completed,
            total: update.total,
            fraction: update.fraction,
            eta_secs: update.eta.map(|eta| eta.as_secs_f64()),
        }
    }

    pub fn split_completed(split: Split, processed: usize, duration_secs: f64) {
        Self::SplitCompleted {
            split: split.to_string(),
            processed,
            duration_secs,
        }
        .emit();
    }

    pub fn split_failed(split: Split, error: impl Into<String>) {
        Self::SplitFailed {
            split: split.to_string(),
            error: error.into(),
        }
        .emit();
    }

    /// Create and emit summary message
    pub fn summary(total_files: usize, processed: usize, dry_run: bool, duration_secs: f64) {
        Self::Summary {
            total_files,
            processed,
            dry_run,
            duration_secs,
        }
        .emit();
    }
}
