/**
 * Simulation session configuration
 *
 */
use crate::constants::*;
use serde::{Deserialize, Serialize};
use simsync_common::{SimError, Vec3};
use std::time::Duration;

pub const ENV_FIXED_STEP: &str = "SIMSYNC_FIXED_STEP";
pub const ENV_SUB_STEPS: &str = "SIMSYNC_SUB_STEPS";
pub const ENV_RESET_COOLDOWN_MS: &str = "SIMSYNC_RESET_COOLDOWN_MS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Simulated seconds per `step`
    pub fixed_step: f32,
    /// Engine sub-steps per `step`
    pub sub_steps: usize,
    pub gravity: Vec3,
    pub reset_cooldown: Duration,
    pub reset_key: String,
    pub terminate_key: String,
    pub continue_key: String,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            fixed_step: DEFAULT_FIXED_STEP,
            sub_steps: DEFAULT_SUB_STEPS,
            gravity: DEFAULT_GRAVITY,
            reset_cooldown: Duration::from_millis(RESET_COOLDOWN_MS),
            reset_key: RESET_KEY.to_string(),
            terminate_key: TERMINATE_KEY.to_string(),
            continue_key: CONTINUE_KEY.to_string(),
        }
    }
}

impl SimConfig {
    /// Defaults overridden by `SIMSYNC_*` environment variables
    pub fn from_env() -> Result<Self, SimError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for the `SIMSYNC_*` keys
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SimError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = SimConfig::default();
        if let Some(raw) = lookup(ENV_FIXED_STEP) {
            config.fixed_step = parse_var(ENV_FIXED_STEP, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SUB_STEPS) {
            config.sub_steps = parse_var(ENV_SUB_STEPS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_RESET_COOLDOWN_MS) {
            config.reset_cooldown = Duration::from_millis(parse_var(ENV_RESET_COOLDOWN_MS, &raw)?);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.fixed_step > 0.0 && self.fixed_step.is_finite()) {
            return Err(SimError::invalid_config(format!("fixed_step must be positive, got {}", self.fixed_step)));
        }
        if self.sub_steps == 0 {
            return Err(SimError::invalid_config("sub_steps must be at least 1"));
        }
        Ok(())
    }

    pub fn fixed_step_duration(&self) -> Duration {
        Duration::from_secs_f32(self.fixed_step)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, SimError>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| SimError::invalid_config(format!("{key}={raw:?}: {e}")))
}
