use serde::Serialize;

use crate::reading::{BlockCompletion, ReadingState};

use super::config::UnlockConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VelocityViolation {
    pub block_id: String,
    pub velocity: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnlockDecision {
    pub unlockable: bool,
    /// True only on the evaluation that first crossed the threshold
    pub newly_unlocked: bool,
    pub violation: Option<VelocityViolation>,
}

/// Decides when enough reading has happened to present the quiz.
///
/// Fast completions still count as read, but each session that has seen one
/// must reach the elevated ratio. Unlocking is memoized and never revoked.
#[derive(Debug, Clone)]
pub struct UnlockPolicy {
    config: UnlockConfig,
    violations: u32,
    unlocked: bool,
}

impl UnlockPolicy {
    pub fn new(config: UnlockConfig) -> Self {
        Self {
            config,
            violations: 0,
            unlocked: false,
        }
    }

    pub fn violation_count(&self) -> u32 {
        self.violations
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    pub fn required_read_ratio(&self) -> f64 {
        if self.violations > 0 {
            self.config.elevated_read_ratio
        } else {
            self.config.required_read_ratio
        }
    }

    /// Evaluate after a sample. `completed` is the block the sample just finished, if any.
    pub fn evaluate(
        &mut self,
        state: &ReadingState,
        completed: Option<&BlockCompletion>,
    ) -> UnlockDecision {
        let violation = completed.and_then(|completion| {
            let velocity = completion.velocity();
            (velocity > self.config.max_plausible_velocity).then(|| VelocityViolation {
                block_id: completion.block_id.clone(),
                velocity,
                threshold: self.config.max_plausible_velocity,
            })
        });
        if violation.is_some() {
            self.violations += 1;
        }

        let was_unlocked = self.unlocked;
        if !self.unlocked && state.read_ratio >= self.required_read_ratio() {
            self.unlocked = true;
        }

        UnlockDecision {
            unlockable: self.unlocked,
            newly_unlocked: self.unlocked && !was_unlocked,
            violation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashSet;

    fn state(read_ratio: f64) -> ReadingState {
        ReadingState {
            completed_blocks: HashSet::new(),
            total_dwell_ms: 0,
            read_ratio,
        }
    }

    fn completion(word_count: usize, dwell_ms: u64) -> BlockCompletion {
        BlockCompletion {
            block_id: "b".into(),
            block_index: 0,
            word_count,
            dwell_ms,
            coverage: 1.0,
            elapsed_ms: dwell_ms,
            completed_at: Utc::now(),
        }
    }

    fn policy() -> UnlockPolicy {
        UnlockPolicy::new(UnlockConfig {
            max_plausible_velocity: 5.0,
            required_read_ratio: 0.7,
            elevated_read_ratio: 0.9,
        })
    }

    #[test]
    fn unlocks_at_required_ratio() {
        let mut policy = policy();
        assert!(!policy.evaluate(&state(0.5), None).unlockable);
        let decision = policy.evaluate(&state(0.7), None);
        assert!(decision.unlockable);
        assert!(decision.newly_unlocked);
    }

    #[test]
    fn plausible_speed_raises_no_violation() {
        let mut policy = policy();
        let decision = policy.evaluate(&state(0.5), Some(&completion(100, 35_000)));
        assert!(decision.violation.is_none());
        assert_eq!(policy.required_read_ratio(), 0.7);
    }

    #[test]
    fn fast_completion_raises_one_violation_and_the_bar() {
        let mut policy = policy();
        let decision = policy.evaluate(&state(0.75), Some(&completion(50, 2_000)));
        let violation = decision.violation.expect("25 w/s is above the ceiling");
        assert_eq!(violation.velocity, 25.0);
        assert_eq!(violation.threshold, 5.0);
        assert_eq!(policy.violation_count(), 1);
        assert!(policy.required_read_ratio() > 0.7);
        // 0.75 would have unlocked on a clean record.
        assert!(!decision.unlockable);

        let decision = policy.evaluate(&state(0.95), None);
        assert!(decision.violation.is_none());
        assert!(decision.unlockable);
        assert_eq!(policy.violation_count(), 1);
    }

    #[test]
    fn unlock_is_never_revoked() {
        let mut policy = policy();
        assert!(policy.evaluate(&state(0.8), None).unlockable);
        let decision = policy.evaluate(&state(0.0), Some(&completion(50, 1_000)));
        assert!(decision.unlockable);
        assert!(!decision.newly_unlocked);
        assert!(decision.violation.is_some());
    }

    #[test]
    fn zero_dwell_counts_as_implausible() {
        let mut policy = policy();
        let decision = policy.evaluate(&state(0.1), Some(&completion(10, 0)));
        assert!(decision.violation.is_some());
    }
}
