use serde::{Deserialize, Serialize};

use super::config::ClassifierConfig;

/// Which text population the comprehension quiz draws from.
///
/// Only meaningful for posts that quote an external source.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TestMode {
    SourceOnly,
    Mixed,
    UserOnly,
}

impl TestMode {
    /// Number of questions drawn from the source pool and the user-text pool.
    pub fn split(&self) -> (usize, usize) {
        match self {
            TestMode::SourceOnly => (3, 0),
            TestMode::Mixed => (2, 1),
            TestMode::UserOnly => (0, 3),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TestMode::SourceOnly => "SOURCE_ONLY",
            TestMode::Mixed => "MIXED",
            TestMode::UserOnly => "USER_ONLY",
        }
    }
}

/// Gate size for original posts (no external source).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum QuestionCount {
    Zero,
    One,
    Three,
}

impl QuestionCount {
    pub fn get(&self) -> usize {
        match self {
            QuestionCount::Zero => 0,
            QuestionCount::One => 1,
            QuestionCount::Three => 3,
        }
    }
}

/// Outcome of classifying a post. Exactly one of the two shapes applies.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase", tag = "kind", content = "value")]
pub enum GateRequirement {
    Quoted(TestMode),
    Original(QuestionCount),
}

impl GateRequirement {
    pub fn question_total(&self) -> usize {
        match self {
            GateRequirement::Quoted(mode) => {
                let (source, user) = mode.split();
                source + user
            }
            GateRequirement::Original(count) => count.get(),
        }
    }

    /// `(source, user)` question counts. Originals are tested on the user's own text.
    pub fn split(&self) -> (usize, usize) {
        match self {
            GateRequirement::Quoted(mode) => mode.split(),
            GateRequirement::Original(count) => (0, count.get()),
        }
    }

    pub fn is_gate_required(&self) -> bool {
        self.question_total() > 0
    }
}

/// Word composition of a composed post.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TextMix {
    pub user_word_count: usize,
    pub has_external_source: bool,
}

impl TextMix {
    pub fn new(user_word_count: usize, has_external_source: bool) -> Self {
        Self {
            user_word_count,
            has_external_source,
        }
    }

    /// Builds the mix from the composer's draft. A quoted source with no words
    /// in it is not treated as an external source.
    pub fn from_draft(user_text: &str, source_text: Option<&str>) -> Self {
        let has_external_source = source_text.map(count_words).unwrap_or(0) > 0;
        Self::new(count_words(user_text), has_external_source)
    }

    pub fn is_empty(&self) -> bool {
        self.user_word_count == 0 && !self.has_external_source
    }
}

/// Counts words as runs of non-whitespace (Unicode whitespace).
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn classify(
    user_word_count: usize,
    has_external_source: bool,
    config: &ClassifierConfig,
) -> GateRequirement {
    classify_mix(&TextMix::new(user_word_count, has_external_source), config)
}

pub fn classify_mix(mix: &TextMix, config: &ClassifierConfig) -> GateRequirement {
    // Empty drafts never require a gate, whatever the brackets say.
    if mix.is_empty() {
        return GateRequirement::Original(QuestionCount::Zero);
    }

    let words = mix.user_word_count;
    if mix.has_external_source {
        let mode = if words <= config.short_max_words {
            TestMode::SourceOnly
        } else if words <= config.mixed_max_words {
            TestMode::Mixed
        } else {
            TestMode::UserOnly
        };
        GateRequirement::Quoted(mode)
    } else {
        let count = if words <= config.short_max_words {
            QuestionCount::Zero
        } else if words <= config.mixed_max_words {
            QuestionCount::One
        } else {
            QuestionCount::Three
        };
        GateRequirement::Original(count)
    }
}
