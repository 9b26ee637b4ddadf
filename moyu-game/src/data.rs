use serde::{Deserialize, Serialize};

use crate::stats::Stat;

/// A single signed delta against one stat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub stat: Stat,
    pub value: i32,
}

impl Effect {
    #[must_use]
    pub const fn new(stat: Stat, value: i32) -> Self {
        Self { stat, value }
    }
}

/// Resource deduction charged before an action's effects run.
///
/// Only positive values are ever charged; a negative cost is not a refund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Cost {
    #[serde(default)]
    pub energy: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionCategory {
    Work,
    Slack,
    Social,
    Skill,
    Growth,
}

impl ActionCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Work => "work",
            Self::Slack => "slack",
            Self::Social => "social",
            Self::Skill => "skill",
            Self::Growth => "growth",
        }
    }

    /// Case-insensitive lookup of a category label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        [
            Self::Work,
            Self::Slack,
            Self::Social,
            Self::Skill,
            Self::Growth,
        ]
        .into_iter()
        .find(|category| category.as_str().eq_ignore_ascii_case(label.trim()))
    }
}

/// Something the player can spend a turn on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: ActionCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default)]
    pub cost: Cost,
    /// Applied in listed order; later entries see earlier results.
    #[serde(default)]
    pub effects: Vec<Effect>,
    /// Unlock id the player is expected to hold. Advisory only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Work,
    Social,
    Boss,
    Random,
    Special,
    Story,
}

/// Curation hint only; sampling does not read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Legendary,
}

/// One player-facing option inside an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventChoice {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

/// A random or scripted interruption.
///
/// Carries either direct `effects` or a `choices` menu, never both; the
/// catalog loader rejects anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub rarity: Rarity,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub effects: Vec<Effect>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<EventChoice>,
    #[serde(default)]
    pub one_time: bool,
}

impl Event {
    #[must_use]
    pub fn has_choices(&self) -> bool {
        !self.choices.is_empty()
    }

    #[must_use]
    pub fn choice(&self, choice_id: &str) -> Option<&EventChoice> {
        self.choices.iter().find(|choice| choice.id == choice_id)
    }
}
