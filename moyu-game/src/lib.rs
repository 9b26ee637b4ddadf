//! Moyu Game Engine
//!
//! Platform-agnostic rules core for Moyu, the turn-based office slacking
//! simulator. Actions and events are resolved by pure functions that return
//! sparse changesets; the caller owns the player state and merges them.

pub mod catalog;
pub mod constants;
pub mod contract;
pub mod data;
pub mod dispatch;
pub mod effects;
pub mod endings;
pub mod progression;
pub mod rng;
pub mod rules;
pub mod session;
pub mod state;
pub mod stats;
pub mod turn;

// Re-export commonly used types
pub use catalog::{ActionCatalog, CatalogError, EventCatalog, GameData, SAMPLED_EVENT_IDS};
pub use contract::{
    ChoiceSubmission, ContentError, ContentService, LocalContentService, NarrativeChoice,
    SessionSnapshot, StartSessionRequest,
};
pub use data::{Action, ActionCategory, Cost, Effect, Event, EventChoice, EventKind, Rarity};
pub use dispatch::{DispatchError, EventResolution, resolve_event};
pub use effects::{apply_effects, apply_effects_onto};
pub use endings::{Difficulty, Ending, evaluate_ending, evaluate_ending_at};
pub use progression::{
    action_available, can_slack, can_work, is_game_over, promotion_changes, promotion_due,
};
pub use rng::{CountingRng, FixedRoll, RollSource, ScriptedRolls, derive_stream_seed};
pub use rules::{Rules, RulesError};
pub use session::{GameSession, SessionError};
pub use state::{PlayerState, StateChanges};
pub use stats::{ClampPolicy, PlayerLevel, Stat};
pub use turn::{ActionFeedback, ActionResult, TriggeredEvents, resolve_action, sample_events};

use anyhow::Context;

/// Trait for abstracting data loading operations
/// Platform-specific implementations should provide this
pub trait DataLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the action and event catalogs.
    ///
    /// # Errors
    ///
    /// Returns an error if either catalog cannot be loaded or fails validation.
    fn load_game_data(&self) -> Result<GameData, Self::Error>;

    /// Load balance rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the rules cannot be loaded or parsed.
    fn load_rules(&self) -> Result<Rules, Self::Error>;
}

/// Loader for the catalogs compiled into this crate with default rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledData;

impl DataLoader for BundledData {
    type Error = CatalogError;

    fn load_game_data(&self) -> Result<GameData, Self::Error> {
        GameData::load_from_static()
    }

    fn load_rules(&self) -> Result<Rules, Self::Error> {
        Ok(Rules::default())
    }
}

/// Main game engine: validated catalogs and rules shared by every session.
#[derive(Debug, Clone)]
pub struct GameEngine {
    data: GameData,
    rules: Rules,
}

impl GameEngine {
    /// Pair already-loaded catalogs with rules after validating the rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the rules violate an invariant.
    pub fn new(data: GameData, rules: Rules) -> Result<Self, RulesError> {
        rules.validate()?;
        Ok(Self { data, rules })
    }

    /// Build an engine from whatever the loader provides.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or the rules are invalid.
    pub fn from_loader<L: DataLoader>(loader: &L) -> anyhow::Result<Self> {
        let data = loader
            .load_game_data()
            .context("failed to load game catalogs")?;
        let rules = loader.load_rules().context("failed to load rules")?;
        let engine = Self::new(data, rules).context("rules failed validation")?;
        log::info!(
            "engine ready: {} actions, {} events",
            engine.data.actions.len(),
            engine.data.events.len()
        );
        Ok(engine)
    }

    /// Resolve a catalog action by id against `state`.
    ///
    /// Returns `None` when the id is not in the catalog.
    pub fn resolve_action_id<S>(
        &self,
        action_id: &str,
        state: &PlayerState,
        rolls: &mut S,
    ) -> Option<ActionResult>
    where
        S: RollSource + ?Sized,
    {
        let action = self.data.actions.get(action_id)?;
        Some(resolve_action(action, state, &self.rules, rolls))
    }

    /// Resolve a catalog event by id, unless it is no longer offerable.
    ///
    /// # Errors
    ///
    /// Returns an error if the event needs a choice and `choice` does not
    /// name one of its options.
    pub fn resolve_event_id(
        &self,
        event_id: &str,
        choice: Option<&str>,
        state: &PlayerState,
    ) -> Result<Option<EventResolution>, DispatchError> {
        self.data
            .events
            .offerable(event_id, state)
            .map(|event| resolve_event(event, choice, state, &self.rules))
            .transpose()
    }

    #[must_use]
    pub fn is_game_over(&self, state: &PlayerState) -> bool {
        is_game_over(state, &self.rules)
    }

    /// Start a seeded session sharing this engine's catalogs and rules.
    #[must_use]
    pub fn new_session(&self, seed: u64, difficulty: Difficulty) -> GameSession {
        GameSession::new(self.data.clone(), self.rules.clone(), difficulty, seed)
    }

    #[must_use]
    pub const fn data(&self) -> &GameData {
        &self.data
    }

    #[must_use]
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }
}
