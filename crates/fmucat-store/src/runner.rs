//! Sequential batch runner with duplicate skip, checkpoints and test-mode cap

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use indicatif::ProgressBar;

use crate::record::Record;
use crate::store::{KeyedResultStore, SessionStats, StoreError};
use crate::summary::Summary;

/// Turns one work item into one record.
///
/// `process` never fails: failures of the external collaborator it calls
/// become failed-class records, so one bad item cannot abort a batch.
pub trait ItemProcessor {
    type Item;
    type Record: Record;

    /// Key the item's record will be stored under.
    fn key(&self, item: &Self::Item) -> String;

    /// Whether the item's work already exists outside the table
    /// (e.g. the download target is on disk). Checked after the table.
    fn is_complete(&self, _key: &str) -> bool {
        false
    }

    fn process(&mut self, item: Self::Item, key: String) -> Self::Record;
}

/// Batch policies.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Stop after `test_cap` processed items
    pub test_mode: bool,
    pub test_cap: usize,
    /// Save every N processed items (0 = only at the end)
    pub checkpoint_interval: usize,
    /// Log a progress line every N processed items (0 = never)
    pub progress_every: usize,
    /// Pause after each processed item
    pub item_delay: Duration,
}

impl RunOptions {
    pub const CHECKPOINT_INTERVAL: usize = 10;
    pub const TEST_CHECKPOINT_INTERVAL: usize = 2;
    pub const TEST_CAP: usize = 5;
    pub const PROGRESS_EVERY: usize = 10;

    /// Defaults for production or test runs.
    pub fn for_mode(test_mode: bool) -> Self {
        Self {
            test_mode,
            test_cap: Self::TEST_CAP,
            checkpoint_interval: if test_mode {
                Self::TEST_CHECKPOINT_INTERVAL
            } else {
                Self::CHECKPOINT_INTERVAL
            },
            progress_every: Self::PROGRESS_EVERY,
            item_delay: Duration::ZERO,
        }
    }

    pub fn with_item_delay(mut self, delay: Duration) -> Self {
        self.item_delay = delay;
        self
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self::for_mode(false)
    }
}

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Source sequence ran out
    Exhausted,
    /// Test-mode cap reached
    CapReached,
    /// Shutdown requested (signal)
    Interrupted,
}

/// Outcome of one `run`.
#[derive(Debug, Clone, Copy)]
pub struct RunReport {
    /// Items that went through the processor
    pub processed: usize,
    /// Counts accumulated during this run
    pub stats: SessionStats,
    pub stop: StopReason,
}

/// Result of one pipeline stage: the run itself plus the table summary.
#[derive(Debug, Clone)]
pub struct StageReport {
    pub report: RunReport,
    pub summary: Summary,
}

/// Drives work items one at a time through an [`ItemProcessor`].
pub struct BatchRunner<'a> {
    label: String,
    options: RunOptions,
    stop_flag: &'a AtomicBool,
    progress: ProgressBar,
}

impl BatchRunner<'static> {
    /// Runner that honors the process-wide shutdown flag.
    pub fn new(label: impl Into<String>, options: RunOptions) -> Self {
        Self {
            label: label.into(),
            options,
            stop_flag: fmucat_core::shutdown_flag(),
            progress: ProgressBar::hidden(),
        }
    }
}

impl<'a> BatchRunner<'a> {
    /// Use a different stop flag than the process-wide one.
    pub fn with_stop_flag<'b>(self, stop_flag: &'b AtomicBool) -> BatchRunner<'b> {
        BatchRunner {
            label: self.label,
            options: self.options,
            stop_flag,
            progress: self.progress,
        }
    }

    /// Show per-item activity on a status line.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Process `items` in order, then save once more.
    ///
    /// Only store errors escape: an unwritable table or a duplicate key
    /// returned by `add_result`, which means the processor's key and its
    /// record's key disagree.
    pub fn run<P: ItemProcessor>(
        &self,
        items: impl IntoIterator<Item = P::Item>,
        processor: &mut P,
        store: &mut KeyedResultStore<P::Record>,
    ) -> Result<RunReport, StoreError> {
        let label = &self.label;
        let opts = &self.options;
        let before = store.stats();
        let mut processed = 0usize;
        let mut stop = StopReason::Exhausted;
        let cap_reached = |processed: usize| opts.test_mode && processed >= opts.test_cap;

        for item in items {
            if cap_reached(processed) {
                stop = StopReason::CapReached;
                break;
            }
            if self.stop_flag.load(Ordering::Relaxed) {
                log::warn!("{label}: shutdown requested, stopping after {processed} items");
                stop = StopReason::Interrupted;
                break;
            }

            let key = processor.key(&item);
            if store.contains_key(&key) {
                log::debug!("{label}: {key} already recorded, skipping");
                continue;
            }
            if processor.is_complete(&key) {
                store.record_skip();
                log::debug!("{label}: {key} already complete, skipping");
                continue;
            }

            self.progress.set_message(key.clone());
            let record = processor.process(item, key);
            if record.outcome().is_failed() {
                log::warn!(
                    "{label}: {}: {}",
                    record.key(),
                    record.diagnostic().unwrap_or("failed")
                );
            } else {
                log::debug!("{label}: {} ok", record.key());
            }
            store.add_result(record)?;
            processed += 1;
            self.progress.inc(1);

            if opts.progress_every > 0 && processed % opts.progress_every == 0 {
                let s = store.stats().since(&before);
                log::info!(
                    "{label}: {processed} processed ({} succeeded, {} failed, {} skipped)",
                    s.succeeded,
                    s.failed,
                    s.skipped
                );
            }

            if cap_reached(processed) {
                log::info!("{label}: limiting to {} items in test mode", opts.test_cap);
                stop = StopReason::CapReached;
                break;
            }

            if opts.checkpoint_interval > 0 && processed % opts.checkpoint_interval == 0 {
                store.save()?;
                log::debug!("{label}: checkpoint after {processed} items");
            }

            if !opts.item_delay.is_zero() {
                std::thread::sleep(opts.item_delay);
            }
        }

        store.save()?;
        self.progress.finish_and_clear();

        Ok(RunReport {
            processed,
            stats: store.stats().since(&before),
            stop,
        })
    }
}
