//! Logging setup
//!
//! Library code only emits through the `log` facade; the hosting binary
//! decides where the output goes.

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging backend for the host process.
///
/// Call once from the binary before the first tick. Respects the standard
/// `RUST_LOG` environment variable.
pub fn init() {
    env_logger::init();
}
