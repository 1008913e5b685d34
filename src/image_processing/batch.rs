use anyhow::{Context, Result};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Snapshot taken each time a file of the split finishes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressUpdate {
    pub completed: usize,
    pub total: usize,
    /// 0.0 to 1.0
    pub fraction: f64,
    pub eta: Option<Duration>,
}

/// Completion counter shared by the workers of one split
pub struct SplitProgress {
    total: usize,
    completed: AtomicUsize,
    started: Instant,
}

impl SplitProgress {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            started: Instant::now(),
        }
    }

    /// Count one finished file and describe where the split stands
    pub fn record(&self) -> ProgressUpdate {
        let completed = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        self.snapshot(completed, self.started.elapsed())
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    fn snapshot(&self, completed: usize, elapsed: Duration) -> ProgressUpdate {
        let fraction = if self.total == 0 {
            1.0
        } else {
            completed as f64 / self.total as f64
        };

        // Linear extrapolation from the average time per finished file
        let eta = (completed > 0).then(|| {
            let remaining = self.total.saturating_sub(completed);
            elapsed.mul_f64(remaining as f64 / completed as f64)
        });

        ProgressUpdate {
            completed,
            total: self.total,
            fraction,
            eta,
        }
    }
}

/// Build the worker pool used for every split of a run
pub fn build_pool(jobs: usize) -> Result<ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .thread_name(|i| format!("crop-worker-{}", i))
        .build()
        .context("Failed to initialize thread pool")
}

/// Run `process_fn` over every item on `pool` and wait for all of them.
///
/// Items are handed to the pool in order but may finish in any order. The
/// first error stops scheduling of new items and is returned once the
/// in-flight ones have settled. On success the number of items is returned.
pub fn process_files_parallel<T, F, P>(
    pool: &ThreadPool,
    items: &[T],
    process_fn: F,
    progress_callback: P,
) -> Result<usize>
where
    T: Sync,
    F: Fn(&T) -> Result<()> + Send + Sync,
    P: Fn(ProgressUpdate) + Send + Sync,
{
    let progress = SplitProgress::new(items.len());

    pool.install(|| {
        items.par_iter().try_for_each(|item| -> Result<()> {
            process_fn(item)?;
            progress_callback(progress.record());
            Ok(())
        })
    })?;

    Ok(progress.completed())
}
