use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ExemptReason {
    /// The post's text mix needs no quiz
    NotRequired,
    /// Too few questions were available to build a fair quiz
    InsufficientContent,
}

/// Lifecycle of one article view behind the gate.
///
/// `Passed` and `Exempt` are terminal; `Failed` may return to `Reading`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "state", content = "reason")]
pub enum GateState {
    Idle,
    Reading,
    Unlockable,
    Quizzing,
    Passed,
    Failed,
    Exempt(ExemptReason),
}

impl Default for GateState {
    fn default() -> Self {
        GateState::Idle
    }
}

impl GateState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GateState::Idle => "idle",
            GateState::Reading => "reading",
            GateState::Unlockable => "unlockable",
            GateState::Quizzing => "quizzing",
            GateState::Passed => "passed",
            GateState::Failed => "failed",
            GateState::Exempt(_) => "exempt",
        }
    }

    pub fn can_share(&self) -> bool {
        matches!(self, GateState::Passed | GateState::Exempt(_))
    }

    /// States in which viewport samples still feed reading progress.
    pub fn accepts_samples(&self) -> bool {
        matches!(self, GateState::Reading | GateState::Unlockable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_passed_and_exempt_allow_sharing() {
        let blocked = [
            GateState::Idle,
            GateState::Reading,
            GateState::Unlockable,
            GateState::Quizzing,
            GateState::Failed,
        ];
        assert!(blocked.iter().all(|state| !state.can_share()));
        assert!(GateState::Passed.can_share());
        assert!(GateState::Exempt(ExemptReason::NotRequired).can_share());
        assert!(GateState::Exempt(ExemptReason::InsufficientContent).can_share());
    }

    #[test]
    fn serializes_with_reason() {
        let json =
            serde_json::to_value(GateState::Exempt(ExemptReason::InsufficientContent)).unwrap();
        assert_eq!(json["state"], "exempt");
        assert_eq!(json["reason"], "insufficientContent");
        assert_eq!(serde_json::to_value(GateState::Reading).unwrap()["state"], "reading");
    }
}
