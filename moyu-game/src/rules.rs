//! Overridable balance rules.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants;
use crate::stats::PlayerLevel;

/// Errors raised when rule invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum RulesError {
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: i64,
        value: i64,
    },
    #[error("stat range inverted (min {min} > max {max})")]
    StatRange { min: i32, max: i32 },
    #[error("{field} must be a probability in [0, 1] (got {value})")]
    Probability { field: &'static str, value: f64 },
    #[error("promotion thresholds must be non-decreasing (got {thresholds:?})")]
    PromotionOrder { thresholds: [i32; 4] },
}

/// Every constant the engine consults.
///
/// Missing fields fall back to the shipped defaults, so a rules file only
/// needs to mention what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    #[serde(default = "Rules::default_max_turns_per_day")]
    pub max_turns_per_day: u32,
    #[serde(default = "Rules::default_max_days")]
    pub max_days: u32,
    #[serde(default = "Rules::default_max_weeks")]
    pub max_weeks: u32,
    #[serde(default = "Rules::default_days_per_week")]
    pub days_per_week: u32,
    #[serde(default = "Rules::default_stat_min")]
    pub stat_min: i32,
    #[serde(default = "Rules::default_stat_max")]
    pub stat_max: i32,
    #[serde(default = "Rules::default_day_progress_decay")]
    pub day_progress_decay: i32,
    #[serde(default = "Rules::default_day_restore_energy")]
    pub day_restore_energy: i32,
    #[serde(default = "Rules::default_boss_patrol_chance")]
    pub boss_patrol_chance: f64,
    #[serde(default = "Rules::default_coffee_spill_chance")]
    pub coffee_spill_chance: f64,
    #[serde(default = "Rules::default_fired_suspicion")]
    pub fired_suspicion: i32,
    #[serde(default = "Rules::default_deadline_progress")]
    pub deadline_progress: i32,
    /// Reputation needed for Junior, Senior, Lead and CTO.
    #[serde(default = "Rules::default_promotion_reputation")]
    pub promotion_reputation: [i32; 4],
}

impl Rules {
    const fn default_max_turns_per_day() -> u32 {
        constants::MAX_TURNS_PER_DAY
    }

    const fn default_max_days() -> u32 {
        constants::MAX_DAYS
    }

    const fn default_max_weeks() -> u32 {
        constants::MAX_WEEKS
    }

    const fn default_days_per_week() -> u32 {
        constants::DAYS_PER_WEEK
    }

    const fn default_stat_min() -> i32 {
        constants::STAT_MIN
    }

    const fn default_stat_max() -> i32 {
        constants::STAT_MAX
    }

    const fn default_day_progress_decay() -> i32 {
        constants::DAY_PROGRESS_DECAY
    }

    const fn default_day_restore_energy() -> i32 {
        constants::DAY_RESTORE_ENERGY
    }

    const fn default_boss_patrol_chance() -> f64 {
        constants::BOSS_PATROL_CHANCE
    }

    const fn default_coffee_spill_chance() -> f64 {
        constants::COFFEE_SPILL_CHANCE
    }

    const fn default_fired_suspicion() -> i32 {
        constants::FIRED_SUSPICION
    }

    const fn default_deadline_progress() -> i32 {
        constants::DEADLINE_PROGRESS
    }

    const fn default_promotion_reputation() -> [i32; 4] {
        constants::PROMOTION_REPUTATION
    }

    /// Parse a (possibly partial) rules document and validate it.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the rules are invalid.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let rules: Self = serde_json::from_str(json)?;
        rules.validate()?;
        Ok(rules)
    }

    /// Check the rule invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), RulesError> {
        ensure_min("max_turns_per_day", i64::from(self.max_turns_per_day), 1)?;
        ensure_min("max_days", i64::from(self.max_days), 1)?;
        ensure_min("max_weeks", i64::from(self.max_weeks), 1)?;
        ensure_min("days_per_week", i64::from(self.days_per_week), 1)?;
        ensure_min("day_progress_decay", i64::from(self.day_progress_decay), 0)?;
        if self.stat_min > self.stat_max {
            return Err(RulesError::StatRange {
                min: self.stat_min,
                max: self.stat_max,
            });
        }
        ensure_probability("boss_patrol_chance", self.boss_patrol_chance)?;
        ensure_probability("coffee_spill_chance", self.coffee_spill_chance)?;
        if self
            .promotion_reputation
            .windows(2)
            .any(|pair| pair[0] > pair[1])
        {
            return Err(RulesError::PromotionOrder {
                thresholds: self.promotion_reputation,
            });
        }
        Ok(())
    }

    /// Clamp a bounded stat into the configured window.
    #[must_use]
    pub fn clamp_stat(&self, value: i32) -> i32 {
        value.clamp(self.stat_min, self.stat_max)
    }

    /// Week number for a (one-based) day, capped at `max_weeks`.
    #[must_use]
    pub fn week_for_day(&self, day: u32) -> u32 {
        let week = day.saturating_sub(1) / self.days_per_week.max(1) + 1;
        week.min(self.max_weeks)
    }

    /// Reputation needed to be promoted into `level`, if it is reachable.
    #[must_use]
    pub const fn promotion_threshold(&self, level: PlayerLevel) -> Option<i32> {
        match level {
            PlayerLevel::Intern => None,
            PlayerLevel::Junior => Some(self.promotion_reputation[0]),
            PlayerLevel::Senior => Some(self.promotion_reputation[1]),
            PlayerLevel::Lead => Some(self.promotion_reputation[2]),
            PlayerLevel::Cto => Some(self.promotion_reputation[3]),
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            max_turns_per_day: Self::default_max_turns_per_day(),
            max_days: Self::default_max_days(),
            max_weeks: Self::default_max_weeks(),
            days_per_week: Self::default_days_per_week(),
            stat_min: Self::default_stat_min(),
            stat_max: Self::default_stat_max(),
            day_progress_decay: Self::default_day_progress_decay(),
            day_restore_energy: Self::default_day_restore_energy(),
            boss_patrol_chance: Self::default_boss_patrol_chance(),
            coffee_spill_chance: Self::default_coffee_spill_chance(),
            fired_suspicion: Self::default_fired_suspicion(),
            deadline_progress: Self::default_deadline_progress(),
            promotion_reputation: Self::default_promotion_reputation(),
        }
    }
}

const fn ensure_min(field: &'static str, value: i64, min: i64) -> Result<(), RulesError> {
    if value < min {
        return Err(RulesError::MinViolation { field, min, value });
    }
    Ok(())
}

fn ensure_probability(field: &'static str, value: f64) -> Result<(), RulesError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(RulesError::Probability { field, value });
    }
    Ok(())
}
