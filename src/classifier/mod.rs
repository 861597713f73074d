pub mod config;
pub mod text_mix;

pub use config::ClassifierConfig;
pub use text_mix::{classify, classify_mix, count_words, GateRequirement, QuestionCount, TestMode, TextMix};
