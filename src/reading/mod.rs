pub mod block;
pub mod config;
pub mod tracker;

pub use block::{segment_article, BlockSample, ReadingBlock};
pub use config::ReadingConfig;
pub use tracker::{BlockCompletion, Observation, ReadingProgressTracker, ReadingState};
