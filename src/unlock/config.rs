use serde::{Deserialize, Serialize};

/// Thresholds for opening the quiz.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnlockConfig {
    /// Words per second above which a completion is implausible
    pub max_plausible_velocity: f64,

    /// Read ratio needed to unlock with a clean record
    pub required_read_ratio: f64,

    /// Read ratio needed once any velocity violation was seen; must exceed the base
    pub elevated_read_ratio: f64,
}

impl Default for UnlockConfig {
    fn default() -> Self {
        Self {
            max_plausible_velocity: 8.0,
            required_read_ratio: 0.7,
            elevated_read_ratio: 0.9,
        }
    }
}
