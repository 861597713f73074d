use serde::{Deserialize, Serialize};

/// Word-count brackets used to pick a test mode or question count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClassifierConfig {
    /// Upper bound (inclusive) of the "short" bracket
    pub short_max_words: usize,

    /// Upper bound (inclusive) of the "mixed" bracket; anything above is long-form
    pub mixed_max_words: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            short_max_words: 30,
            mixed_max_words: 120,
        }
    }
}
