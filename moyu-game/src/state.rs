use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::constants::{INITIAL_CHILL, INITIAL_ENERGY, INITIAL_SALARY, INITIAL_SKILL};
use crate::stats::{PlayerLevel, Stat};

/// Authoritative snapshot of a single player's run.
///
/// The engine only ever reads a `PlayerState`; changes come back as a
/// [`StateChanges`] which the owner merges with [`PlayerState::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub chill: i32,
    pub progress: i32,
    pub suspicion: i32,
    pub energy: i32,
    pub reputation: i32,
    pub salary: i32,
    #[serde(default)]
    pub level: PlayerLevel,
    pub day: u32,
    pub week: u32,
    pub turn: u32,
    #[serde(default)]
    pub unlocked_skills: BTreeSet<String>,
    #[serde(default)]
    pub unlocked_achievements: BTreeSet<String>,
    #[serde(default)]
    pub seen_events: BTreeSet<String>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            chill: INITIAL_CHILL,
            progress: 0,
            suspicion: 0,
            energy: INITIAL_ENERGY,
            reputation: 0,
            salary: INITIAL_SALARY,
            level: PlayerLevel::Intern,
            day: 1,
            week: 1,
            turn: 0,
            unlocked_skills: BTreeSet::from([INITIAL_SKILL.to_string()]),
            unlocked_achievements: BTreeSet::new(),
            seen_events: BTreeSet::new(),
        }
    }
}

impl PlayerState {
    /// Fresh state for a new game.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Throw the run away and start over from the initial configuration.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub const fn stat(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Chill => self.chill,
            Stat::Progress => self.progress,
            Stat::Suspicion => self.suspicion,
            Stat::Energy => self.energy,
            Stat::Reputation => self.reputation,
            Stat::Salary => self.salary,
        }
    }

    /// Shallow merge: every field set in `changes` overwrites this state.
    pub fn apply(&mut self, changes: &StateChanges) {
        if let Some(value) = changes.chill {
            self.chill = value;
        }
        if let Some(value) = changes.progress {
            self.progress = value;
        }
        if let Some(value) = changes.suspicion {
            self.suspicion = value;
        }
        if let Some(value) = changes.energy {
            self.energy = value;
        }
        if let Some(value) = changes.reputation {
            self.reputation = value;
        }
        if let Some(value) = changes.salary {
            self.salary = value;
        }
        if let Some(level) = changes.level {
            self.level = level;
        }
        if let Some(day) = changes.day {
            self.day = day;
        }
        if let Some(week) = changes.week {
            self.week = week;
        }
        if let Some(turn) = changes.turn {
            self.turn = turn;
        }
    }

    /// Copy of this state with `changes` merged in.
    #[must_use]
    pub fn merged(&self, changes: &StateChanges) -> Self {
        let mut next = self.clone();
        next.apply(changes);
        next
    }

    /// Returns `true` when the skill was not already unlocked.
    pub fn unlock_skill(&mut self, skill_id: impl Into<String>) -> bool {
        self.unlocked_skills.insert(skill_id.into())
    }

    /// Returns `true` when the achievement was not already held.
    pub fn add_achievement(&mut self, achievement_id: impl Into<String>) -> bool {
        self.unlocked_achievements.insert(achievement_id.into())
    }

    /// Returns `true` when the event had not been seen before.
    pub fn mark_event_seen(&mut self, event_id: impl Into<String>) -> bool {
        self.seen_events.insert(event_id.into())
    }

    #[must_use]
    pub fn has_skill(&self, skill_id: &str) -> bool {
        self.unlocked_skills.contains(skill_id)
    }

    #[must_use]
    pub fn has_seen(&self, event_id: &str) -> bool {
        self.seen_events.contains(event_id)
    }
}

/// Sparse override of [`PlayerState`] produced by a resolution call.
///
/// Unset fields mean "unchanged". Set collections are never part of a
/// changeset; they move only through the explicit unlock operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chill: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspicion: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reputation: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<PlayerLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turn: Option<u32>,
}

impl StateChanges {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn stat(&self, stat: Stat) -> Option<i32> {
        match stat {
            Stat::Chill => self.chill,
            Stat::Progress => self.progress,
            Stat::Suspicion => self.suspicion,
            Stat::Energy => self.energy,
            Stat::Reputation => self.reputation,
            Stat::Salary => self.salary,
        }
    }

    pub const fn set_stat(&mut self, stat: Stat, value: i32) {
        let slot = match stat {
            Stat::Chill => &mut self.chill,
            Stat::Progress => &mut self.progress,
            Stat::Suspicion => &mut self.suspicion,
            Stat::Energy => &mut self.energy,
            Stat::Reputation => &mut self.reputation,
            Stat::Salary => &mut self.salary,
        };
        *slot = Some(value);
    }

    /// Pending value for `stat`, falling back to the snapshot.
    #[must_use]
    pub const fn stat_or(&self, stat: Stat, base: &PlayerState) -> i32 {
        match self.stat(stat) {
            Some(value) => value,
            None => base.stat(stat),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
