//! Resolution of triggered events and the player's pick from their menu.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::Event;
use crate::effects::apply_effects;
use crate::rules::Rules;
use crate::state::{PlayerState, StateChanges};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("event `{event}` has no choice `{choice}`")]
    UnknownChoice { event: String, choice: String },
    #[error("event `{event}` needs a choice before it can resolve")]
    ChoiceRequired { event: String },
}

/// Outcome of one event, ready for the caller to merge.
///
/// `event_id` must be recorded in `seen_events` once the changes are applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventResolution {
    pub event_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_id: Option<String>,
    pub changes: StateChanges,
}

impl EventResolution {
    /// Merge the changes and mark the event as seen.
    pub fn apply_to(&self, state: &mut PlayerState) {
        state.apply(&self.changes);
        state.mark_event_seen(self.event_id.clone());
    }
}

/// Resolve `event` against `state`.
///
/// Direct-effect events ignore `choice`. Choice events need one of their own
/// choice ids.
///
/// # Errors
///
/// Returns [`DispatchError::ChoiceRequired`] when a choice event gets no
/// choice, and [`DispatchError::UnknownChoice`] when the id does not belong
/// to the event.
pub fn resolve_event(
    event: &Event,
    choice: Option<&str>,
    state: &PlayerState,
    rules: &Rules,
) -> Result<EventResolution, DispatchError> {
    if !event.has_choices() {
        log::debug!("event {} applies directly", event.id);
        return Ok(EventResolution {
            event_id: event.id.clone(),
            choice_id: None,
            changes: apply_effects(&event.effects, state, rules),
        });
    }

    let choice_id = choice.ok_or_else(|| DispatchError::ChoiceRequired {
        event: event.id.clone(),
    })?;
    let picked = event
        .choice(choice_id)
        .ok_or_else(|| DispatchError::UnknownChoice {
            event: event.id.clone(),
            choice: choice_id.to_string(),
        })?;
    log::debug!("event {} resolved with {}", event.id, picked.id);

    Ok(EventResolution {
        event_id: event.id.clone(),
        choice_id: Some(picked.id.clone()),
        changes: apply_effects(&picked.effects, state, rules),
    })
}
