use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// How the stepper chooses between a single exact event and a leap.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum LeapCriterion {
    /// Exact iff the drawn waiting time exceeds its own mean `1 / a0`.
    SelfRelative,
    /// Exact iff the drawn waiting time exceeds a fixed `tau`.
    FixedThreshold { tau: f64 },
    /// Never leap: plain Gillespie direct method.
    ExactOnly,
}

impl LeapCriterion {
    #[inline]
    pub fn is_exact(self, tau: f64, total_rate: f64) -> bool {
        match self {
            Self::SelfRelative => tau > 1.0 / total_rate,
            Self::FixedThreshold { tau: threshold } => tau > threshold,
            Self::ExactOnly => true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DroughtConfig {
    /// Simulated time after which plant reproduction switches regime.
    pub onset: f64,
    /// Replaces `SimConfig::growth_scale` for plants once the drought is on.
    pub growth_scale: f64,
}

impl Default for DroughtConfig {
    fn default() -> Self {
        Self {
            onset: 0.4,
            growth_scale: 10.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub growth_scale: f64,
    pub drought: Option<DroughtConfig>,
    pub starvation_epsilon: f64,
    pub leap_criterion: LeapCriterion,
    pub poisson_threshold: f64,
    pub clamp_negative: bool,
    pub max_steps: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            growth_scale: 1000.0,
            drought: Some(DroughtConfig::default()),
            starvation_epsilon: 0.1,
            leap_criterion: LeapCriterion::SelfRelative,
            poisson_threshold: 5.0,
            clamp_negative: true,
            max_steps: None,
        }
    }
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, SimError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        check_non_negative("growth_scale", self.growth_scale)?;
        check_non_negative("poisson_threshold", self.poisson_threshold)?;
        if !(self.starvation_epsilon.is_finite() && self.starvation_epsilon > 0.0) {
            return Err(SimError::Configuration(format!(
                "starvation_epsilon must be positive, got {}",
                self.starvation_epsilon
            )));
        }
        if let Some(drought) = &self.drought {
            check_non_negative("drought.onset", drought.onset)?;
            check_non_negative("drought.growth_scale", drought.growth_scale)?;
        }
        if let LeapCriterion::FixedThreshold { tau } = self.leap_criterion {
            check_non_negative("leap_criterion.tau", tau)?;
        }
        Ok(())
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<(), SimError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::Configuration(format!(
            "{name} must be finite and non-negative, got {value}"
        )))
    }
}
