//! Payloads and trait for the narrative content service.
//!
//! Transport lives outside this crate. [`LocalContentService`] answers the
//! same contract from the bundled catalogs so the game stays playable with no
//! backend at all.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::catalog::GameData;
use crate::data::{Action, ActionCategory, Cost, Effect, EventChoice};
use crate::endings::Difficulty;
use crate::rng::derive_stream_seed;
use crate::rules::Rules;
use crate::session::{GameSession, SessionError};
use crate::state::PlayerState;
use crate::stats::Stat;
use crate::turn::ActionFeedback;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartSessionRequest {
    pub player_name: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

/// Backend-authored option. Effects are keyed by stat name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrativeChoice {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub effects: BTreeMap<String, i32>,
}

impl NarrativeChoice {
    /// Engine action equivalent to this choice.
    ///
    /// Effect keys that name no known stat are dropped; unknown categories
    /// count as work. The choice carries no cost.
    #[must_use]
    pub fn into_action(self) -> Action {
        let effects = self
            .effects
            .iter()
            .filter_map(|(key, value)| match key.parse::<Stat>() {
                Ok(stat) => Some(Effect::new(stat, *value)),
                Err(()) => {
                    log::warn!("choice {} targets unknown stat {key}", self.id);
                    None
                }
            })
            .collect();
        let category = self
            .category
            .as_deref()
            .and_then(ActionCategory::from_label)
            .unwrap_or(ActionCategory::Work);
        Action {
            name: self.text.clone(),
            description: self.text,
            id: self.id,
            category,
            icon: None,
            cost: Cost::default(),
            effects,
            required: None,
        }
    }

    fn from_action(action: &Action) -> Self {
        Self {
            id: action.id.clone(),
            text: action.name.clone(),
            category: Some(action.category.as_str().to_string()),
            effects: effect_map(&action.effects),
        }
    }

    fn from_event_choice(choice: &EventChoice) -> Self {
        Self {
            id: choice.id.clone(),
            text: choice.text.clone(),
            category: None,
            effects: effect_map(&choice.effects),
        }
    }
}

fn effect_map(effects: &[Effect]) -> BTreeMap<String, i32> {
    let mut map = BTreeMap::new();
    for effect in effects {
        *map.entry(effect.stat.as_str().to_string()).or_insert(0) += effect.value;
    }
    map
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceSubmission {
    pub session_id: String,
    pub choice_id: String,
}

/// Session view returned by every call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub player_state: PlayerState,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub choices: Vec<NarrativeChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<ActionFeedback>,
    #[serde(default)]
    pub triggered_events: Vec<String>,
    #[serde(default)]
    pub game_over: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_over_reason: Option<String>,
}

/// Session-scoped narrative content provider.
pub trait ContentService {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Open a session and return its first menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the service cannot create the session.
    fn start_session(&mut self, request: &StartSessionRequest)
    -> Result<SessionSnapshot, Self::Error>;

    /// Apply the player's pick and return the updated session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session or the choice is unknown.
    fn submit_choice(&mut self, submission: &ChoiceSubmission)
    -> Result<SessionSnapshot, Self::Error>;

    /// Current view of a session without advancing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown.
    fn fetch_state(&self, session_id: &str) -> Result<SessionSnapshot, Self::Error>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("player name must not be empty")]
    EmptyPlayerName,
    #[error("no session `{0}`")]
    UnknownSession(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Offline content provider backed by [`GameSession`]s.
///
/// Menus are the available catalog actions, or the choices of the event
/// waiting for a decision.
#[derive(Debug, Clone)]
pub struct LocalContentService {
    data: GameData,
    rules: Rules,
    sessions: BTreeMap<String, GameSession>,
    next_id: u64,
}

impl LocalContentService {
    #[must_use]
    pub const fn new(data: GameData, rules: Rules) -> Self {
        Self {
            data,
            rules,
            sessions: BTreeMap::new(),
            next_id: 1,
        }
    }

    #[must_use]
    pub fn session(&self, session_id: &str) -> Option<&GameSession> {
        self.sessions.get(session_id)
    }

    fn snapshot(
        session_id: &str,
        session: &GameSession,
        message: String,
        feedback: Option<ActionFeedback>,
        triggered_events: Vec<String>,
    ) -> SessionSnapshot {
        let choices = match session.pending_event() {
            Some(event) if event.has_choices() => event
                .choices
                .iter()
                .map(NarrativeChoice::from_event_choice)
                .collect(),
            Some(_) => Vec::new(),
            None if session.is_finished() => Vec::new(),
            None => session
                .available_actions()
                .map(NarrativeChoice::from_action)
                .collect(),
        };
        let ending = session.ending();
        SessionSnapshot {
            session_id: session_id.to_string(),
            player_state: session.state().clone(),
            message,
            choices,
            feedback,
            triggered_events,
            game_over: ending.is_some(),
            game_over_reason: ending.map(|ending| ending.headline()),
        }
    }
}

impl ContentService for LocalContentService {
    type Error = ContentError;

    fn start_session(
        &mut self,
        request: &StartSessionRequest,
    ) -> Result<SessionSnapshot, Self::Error> {
        let player_name = request.player_name.trim();
        if player_name.is_empty() {
            return Err(ContentError::EmptyPlayerName);
        }
        let seed = request
            .seed
            .unwrap_or_else(|| derive_stream_seed(self.next_id, player_name.as_bytes()));
        let session_id = format!("local-{:04}", self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        let session = GameSession::new(
            self.data.clone(),
            self.rules.clone(),
            request.difficulty,
            seed,
        );
        log::info!("session {session_id} started for {player_name} (seed {seed})");
        let message = format!("Welcome aboard, {player_name}. Day one starts now.");
        let snapshot = Self::snapshot(&session_id, &session, message, None, Vec::new());
        self.sessions.insert(session_id, session);
        Ok(snapshot)
    }

    fn submit_choice(
        &mut self,
        submission: &ChoiceSubmission,
    ) -> Result<SessionSnapshot, Self::Error> {
        let session = self
            .sessions
            .get_mut(&submission.session_id)
            .ok_or_else(|| ContentError::UnknownSession(submission.session_id.clone()))?;

        if session.pending_event().is_some() {
            let resolution = session.resolve_pending(Some(&submission.choice_id))?;
            let message = format!("Handled {}.", resolution.event_id);
            return Ok(Self::snapshot(
                &submission.session_id,
                session,
                message,
                None,
                Vec::new(),
            ));
        }

        let result = session.take_action(&submission.choice_id)?;
        let message = result.feedback.success.clone();
        Ok(Self::snapshot(
            &submission.session_id,
            session,
            message,
            Some(result.feedback),
            result.triggered_events.into_iter().collect(),
        ))
    }

    fn fetch_state(&self, session_id: &str) -> Result<SessionSnapshot, Self::Error> {
        let session = self
            .sessions
            .get(session_id)
            .ok_or_else(|| ContentError::UnknownSession(session_id.to_string()))?;
        Ok(Self::snapshot(
            session_id,
            session,
            String::new(),
            None,
            Vec::new(),
        ))
    }
}
