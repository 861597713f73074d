//! Comprehension gate for reshared content.
//!
//! A post that quotes an external source, or a long original, cannot be shared
//! until the user has read the article (coverage plus dwell per block) and
//! passed a short quiz. See `GateSession` for the lifecycle.

pub mod classifier;
pub mod error;
pub mod gate;
pub mod quiz;
pub mod reader;
pub mod reading;
pub mod settings;
pub mod telemetry;
pub mod unlock;
mod utils;

pub use classifier::{classify, classify_mix, count_words, GateRequirement, QuestionCount, TestMode, TextMix};
pub use error::{GateError, GateResult};
pub use gate::{ExemptReason, GateSession, GateState};
pub use quiz::{Question, QuestionOrigin, Quiz, QuizResult};
pub use reader::ReaderController;
pub use reading::{segment_article, BlockSample, ReadingBlock, ReadingProgressTracker, ReadingState};
pub use settings::{GateSettings, SettingsStore};
pub use telemetry::{FileTelemetryStore, TelemetryEvent, TelemetryRecord, TelemetryRecorder, TelemetrySink};
pub use unlock::{UnlockPolicy, VelocityViolation};

/// Initialize logging (reads the `RUST_LOG` env var, defaults to info).
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init();
}
