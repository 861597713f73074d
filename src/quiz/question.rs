use std::fmt;

use serde::{Deserialize, Serialize};

use crate::classifier::GateRequirement;

/// Which text a question was written about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum QuestionOrigin {
    Source,
    UserText,
}

impl QuestionOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionOrigin::Source => "source",
            QuestionOrigin::UserText => "user text",
        }
    }
}

impl fmt::Display for QuestionOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Multiple-choice question supplied by the content service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_index: usize,
}

impl Question {
    pub fn is_well_formed(&self) -> bool {
        self.options.len() >= 2 && self.correct_index < self.options.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizItem {
    pub origin: QuestionOrigin,
    pub question: Question,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    pub requirement: GateRequirement,
    pub items: Vec<QuizItem>,
}

impl Quiz {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn count_from(&self, origin: QuestionOrigin) -> usize {
        self.items.iter().filter(|item| item.origin == origin).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub passed: bool,
    pub correct_count: usize,
    pub total: usize,
}
