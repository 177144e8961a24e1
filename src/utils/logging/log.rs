//! Consistent log lines for file-level operations and pipeline steps

use std::path::Path;
use std::time::Duration;

use log::{info, warn};

/// Log the start of an operation on a file or directory
pub fn log_operation_start(operation: &str, path: &Path) {
    info!("{operation} {}", path.display());
}

/// Log the completion of an operation that handled `items` things
pub fn log_operation_complete(
    operation: &str,
    path: &Path,
    items: usize,
    elapsed: Option<Duration>,
) {
    match elapsed {
        Some(duration) => info!("{operation} {items} items, {} in {duration:?}", path.display()),
        None => info!("{operation} {items} items, {}", path.display()),
    }
}

/// Log a warning, optionally tied to a path
pub fn log_warning(message: &str, path: Option<&Path>) {
    match path {
        Some(path) => warn!("{message}: {}", path.display()),
        None => warn!("{message}"),
    }
}

/// Log the end of a named pipeline step with a short result summary
pub fn log_step_complete(step: &str, summary: &str, elapsed: Duration) {
    info!("[{step}] {summary} ({elapsed:.2?})");
}
