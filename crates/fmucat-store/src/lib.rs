//! fmucat-store: incremental, resumable result tables
//!
//! Every pipeline stage accumulates one CSV table of typed records under
//! unique string keys. [`KeyedResultStore`] owns the table and its session
//! counters; [`BatchRunner`] drives a lazy sequence of work items through an
//! [`ItemProcessor`], skipping keys that are already recorded and saving a
//! checkpoint every few items so an interrupted run resumes where it stopped.

pub mod record;
pub mod runner;
pub mod store;
pub mod summary;

pub use record::{Outcome, Record};
pub use runner::{BatchRunner, ItemProcessor, RunOptions, RunReport, StageReport, StopReason};
pub use store::{KeyedResultStore, SessionStats, StoreError};
pub use summary::{Failure, Summary};
