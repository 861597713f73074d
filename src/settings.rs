use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::classifier::ClassifierConfig;
use crate::reading::ReadingConfig;
use crate::telemetry::DEFAULT_TELEMETRY_CAP;
use crate::unlock::UnlockConfig;

const DEBUG_ENV_VAR: &str = "READGATE_DEBUG";

/// Every tunable of the gate, as deployed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GateSettings {
    pub classifier: ClassifierConfig,
    pub reading: ReadingConfig,
    pub unlock: UnlockConfig,
    pub telemetry_cap: usize,
    pub debug_logging: bool,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            reading: ReadingConfig::default(),
            unlock: UnlockConfig::default(),
            telemetry_cap: DEFAULT_TELEMETRY_CAP,
            debug_logging: false,
        }
    }
}

impl GateSettings {
    /// Turns on debug logging when `READGATE_DEBUG` is `1` or `true`.
    pub fn with_env_overrides(mut self) -> Self {
        let debug_mode = std::env::var(DEBUG_ENV_VAR)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        self.debug_logging |= debug_mode;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let reading = &self.reading;
        let unlock = &self.unlock;

        validate_fraction("visibilityFloor", reading.visibility_floor)?;
        validate_fraction("completionCoverage", reading.completion_coverage)?;
        validate_fraction("requiredReadRatio", unlock.required_read_ratio)?;
        validate_fraction("elevatedReadRatio", unlock.elevated_read_ratio)?;

        if unlock.elevated_read_ratio <= unlock.required_read_ratio {
            bail!(
                "elevatedReadRatio ({}) must be greater than requiredReadRatio ({})",
                unlock.elevated_read_ratio,
                unlock.required_read_ratio
            );
        }
        if !(unlock.max_plausible_velocity.is_finite() && unlock.max_plausible_velocity > 0.0) {
            bail!("maxPlausibleVelocity must be a positive number");
        }
        if self.classifier.short_max_words >= self.classifier.mixed_max_words {
            bail!(
                "shortMaxWords ({}) must be below mixedMaxWords ({})",
                self.classifier.short_max_words,
                self.classifier.mixed_max_words
            );
        }
        if self.telemetry_cap == 0 {
            bail!("telemetryCap must be at least 1");
        }
        Ok(())
    }
}

fn validate_fraction(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        bail!("{name} must be between 0 and 1, got {value}");
    }
    Ok(())
}

/// JSON-file backed settings, read once and rewritten on update.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<GateSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str::<GateSettings>(&contents)
                .ok()
                .filter(|settings| settings.validate().is_ok())
                .unwrap_or_default()
        } else {
            GateSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data.with_env_overrides()),
        })
    }

    pub fn get(&self) -> GateSettings {
        self.data
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn update(&self, settings: GateSettings) -> Result<()> {
        settings.validate()?;
        let mut guard = self
            .data
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    fn persist(&self, data: &GateSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
