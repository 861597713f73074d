//! Conditional logging macros gated on a module-level `ENABLE_LOGS` flag.
//!
//! Usage:
//! ```ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_debug, log_info, log_warn};
//!
//! log_info!("block {} completed", block_id);
//! log_debug!(settings.debug_logging, "sample for {} dropped", block_id);
//! ```

/// Info logging, emitted only when the calling module sets `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// Warn logging, emitted only when the calling module sets `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// Debug logging for per-sample traces.
///
/// The first argument is the runtime toggle (usually
/// `GateSettings::debug_logging`); the module's `ENABLE_LOGS` must also be set.
#[macro_export]
macro_rules! log_debug {
    ($enabled:expr, $($arg:tt)*) => {
        if ENABLE_LOGS && $enabled {
            log::debug!($($arg)*);
        }
    };
}
