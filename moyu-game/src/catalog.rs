//! Action and event catalogs plus their load-time validation.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::constants::{EVENT_BOSS_PATROL, EVENT_COFFEE_SPILL};
use crate::data::{Action, Event};
use crate::state::PlayerState;

const DEFAULT_ACTIONS_DATA: &str = include_str!("../assets/actions.json");
const DEFAULT_EVENTS_DATA: &str = include_str!("../assets/events.json");

/// Event ids the turn engine can emit; they must resolve in every catalog.
pub const SAMPLED_EVENT_IDS: &[&str] = &[EVENT_BOSS_PATROL, EVENT_COFFEE_SPILL];

/// Configuration errors caught when catalogs are loaded.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog JSON is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{kind} id must not be empty")]
    EmptyId { kind: &'static str },
    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: &'static str, id: String },
    #[error("event `{id}` declares both direct effects and choices")]
    EffectsAndChoices { id: String },
    #[error("event `{id}` declares neither effects nor choices")]
    NoOutcome { id: String },
    #[error("event `{event}` repeats choice id `{choice}`")]
    DuplicateChoice { event: String, choice: String },
    #[error("sampled event `{id}` is missing from the event catalog")]
    MissingSampledEvent { id: String },
}

/// Immutable list of actions keyed by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ActionCatalog {
    pub actions: Vec<Action>,
}

impl ActionCatalog {
    /// Build a catalog, rejecting empty or duplicate ids.
    ///
    /// # Errors
    ///
    /// Returns an error if any action id is empty or repeated.
    pub fn new(actions: Vec<Action>) -> Result<Self, CatalogError> {
        let catalog = Self { actions };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse and validate an action catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the catalog is invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Actions shipped with the game.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled asset fails validation.
    pub fn load_from_static() -> Result<Self, CatalogError> {
        Self::from_json(DEFAULT_ACTIONS_DATA)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        ensure_unique_ids("action", self.actions.iter().map(|a| a.id.as_str()))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Action> {
        self.actions.iter().find(|action| action.id == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Action> {
        self.actions.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.actions.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

impl<'a> IntoIterator for &'a ActionCatalog {
    type Item = &'a Action;
    type IntoIter = std::slice::Iter<'a, Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Immutable list of events keyed by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EventCatalog {
    pub events: Vec<Event>,
}

impl EventCatalog {
    /// Build a catalog, rejecting malformed events.
    ///
    /// # Errors
    ///
    /// Returns an error if ids repeat or an event's outcome shape is invalid.
    pub fn new(events: Vec<Event>) -> Result<Self, CatalogError> {
        let catalog = Self { events };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse and validate an event catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the catalog is invalid.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Events shipped with the game.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled asset fails validation.
    pub fn load_from_static() -> Result<Self, CatalogError> {
        Self::from_json(DEFAULT_EVENTS_DATA)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        ensure_unique_ids("event", self.events.iter().map(|e| e.id.as_str()))?;
        for event in &self.events {
            match (event.effects.is_empty(), event.choices.is_empty()) {
                (false, false) => {
                    return Err(CatalogError::EffectsAndChoices {
                        id: event.id.clone(),
                    });
                }
                (true, true) => {
                    return Err(CatalogError::NoOutcome {
                        id: event.id.clone(),
                    });
                }
                _ => {}
            }
            let mut seen = HashSet::new();
            for choice in &event.choices {
                if !seen.insert(choice.id.as_str()) {
                    return Err(CatalogError::DuplicateChoice {
                        event: event.id.clone(),
                        choice: choice.id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    /// The event, unless it is one-time and the player has already seen it.
    ///
    /// Unknown ids resolve to `None` rather than failing.
    #[must_use]
    pub fn offerable(&self, id: &str, state: &PlayerState) -> Option<&Event> {
        self.get(id)
            .filter(|event| !(event.one_time && state.has_seen(&event.id)))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<'a> IntoIterator for &'a EventCatalog {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Both catalogs, cross-checked against the ids the engine can emit.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameData {
    pub actions: ActionCatalog,
    pub events: EventCatalog,
}

impl GameData {
    /// Pair two catalogs after checking every sampled event id resolves.
    ///
    /// # Errors
    ///
    /// Returns an error if a sampled event id is missing from `events`.
    pub fn new(actions: ActionCatalog, events: EventCatalog) -> Result<Self, CatalogError> {
        if let Some(missing) = SAMPLED_EVENT_IDS
            .iter()
            .find(|id| events.get(id).is_none())
        {
            return Err(CatalogError::MissingSampledEvent {
                id: (*missing).to_string(),
            });
        }
        Ok(Self { actions, events })
    }

    /// Shipped catalogs, validated.
    ///
    /// # Errors
    ///
    /// Returns an error if a bundled asset fails validation.
    pub fn load_from_static() -> Result<Self, CatalogError> {
        Self::new(
            ActionCatalog::load_from_static()?,
            EventCatalog::load_from_static()?,
        )
    }

    /// Catalogs parsed from caller-supplied JSON documents.
    ///
    /// # Errors
    ///
    /// Returns an error if either document is malformed or invalid.
    pub fn from_json(actions_json: &str, events_json: &str) -> Result<Self, CatalogError> {
        Self::new(
            ActionCatalog::from_json(actions_json)?,
            EventCatalog::from_json(events_json)?,
        )
    }
}

fn ensure_unique_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for id in ids {
        if id.is_empty() {
            return Err(CatalogError::EmptyId { kind });
        }
        if !seen.insert(id) {
            return Err(CatalogError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ActionCategory, Cost, Effect, EventChoice, EventKind, Rarity};
    use crate::stats::Stat;

    fn event(id: &str, effects: Vec<Effect>, choices: Vec<EventChoice>) -> Event {
        Event {
            id: id.to_string(),
            kind: EventKind::Random,
            name: id.to_string(),
            description: String::new(),
            rarity: Rarity::Common,
            effects,
            choices,
            one_time: false,
        }
    }

    fn choice(id: &str) -> EventChoice {
        EventChoice {
            id: id.to_string(),
            text: id.to_string(),
            effects: vec![Effect::new(Stat::Chill, 1)],
        }
    }

    #[test]
    fn bundled_catalogs_load() {
        let data = GameData::load_from_static().unwrap();
        assert!(data.actions.get("work_hard").is_some());
        assert!(data.actions.get("coffee_break").is_some());
        assert!(data.events.get("boss_patrol").unwrap().has_choices());
        assert!(data.events.get("coffee_spill").is_some());
        assert!(data.actions.get("removed_action").is_none());
    }

    #[test]
    fn duplicate_action_ids_are_rejected() {
        let action = Action {
            id: "nap".to_string(),
            name: "Nap".to_string(),
            description: String::new(),
            category: ActionCategory::Slack,
            icon: None,
            cost: Cost::default(),
            effects: Vec::new(),
            required: None,
        };
        let err = ActionCatalog::new(vec![action.clone(), action]).unwrap_err();
        assert!(matches!(err, CatalogError::DuplicateId { kind: "action", .. }));
    }

    #[test]
    fn event_outcome_shape_is_enforced() {
        let both = event("both", vec![Effect::new(Stat::Energy, 1)], vec![choice("a")]);
        assert!(matches!(
            EventCatalog::new(vec![both]),
            Err(CatalogError::EffectsAndChoices { .. })
        ));

        let neither = event("neither", Vec::new(), Vec::new());
        assert!(matches!(
            EventCatalog::new(vec![neither]),
            Err(CatalogError::NoOutcome { .. })
        ));

        let repeated = event("repeat", Vec::new(), vec![choice("a"), choice("a")]);
        assert!(matches!(
            EventCatalog::new(vec![repeated]),
            Err(CatalogError::DuplicateChoice { .. })
        ));
    }

    #[test]
    fn missing_sampled_event_fails_fast() {
        let events = EventCatalog::new(vec![event(
            "boss_patrol",
            Vec::new(),
            vec![choice("hide")],
        )])
        .unwrap();
        let err = GameData::new(ActionCatalog::default(), events).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MissingSampledEvent { ref id } if id == "coffee_spill"
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            ActionCatalog::from_json("{ \"actions\": 3 }"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn one_time_events_are_offered_once() {
        let data = GameData::load_from_static().unwrap();
        let mut state = PlayerState::new();
        assert!(data.events.offerable("performance_review", &state).is_some());
        state.mark_event_seen("performance_review");
        assert!(data.events.offerable("performance_review", &state).is_none());

        state.mark_event_seen("boss_patrol");
        assert!(data.events.offerable("boss_patrol", &state).is_some());
        assert!(data.events.offerable("deleted_event", &state).is_none());
    }
}
