//! Logging utilities and structured logging support

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// Respects the `RUST_LOG` environment variable for level filtering.
pub fn init() {
    env_logger::init();
}
