//! fmucat core - shared infrastructure for the FMU catalog pipelines
//!
//! Logging, progress display, graceful shutdown, the blocking HTTP bridge
//! and the boundary used around external collaborator calls.

pub mod boundary;
pub mod logging;
pub mod progress;
pub mod shutdown;
pub mod stream;

// Re-exports for convenience
pub use boundary::call_boundary;
pub use logging::{Verbosity, init_logging};
pub use progress::{ProgressContext, fmt_num};
pub use shutdown::{install_signal_handlers, is_shutdown_requested, shutdown_flag};
pub use stream::{Downloaded, HttpResponse, StreamError, download_to_file, http_get};
