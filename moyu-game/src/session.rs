//! Caller-side owner of a run: holds the authoritative state and merges
//! every changeset the engine hands back.
use rand::rngs::SmallRng;
use std::collections::VecDeque;
use thiserror::Error;

use crate::catalog::GameData;
use crate::constants::EVENT_STREAM_TAG;
use crate::data::{Action, Event};
use crate::dispatch::{DispatchError, EventResolution, resolve_event};
use crate::effects::apply_effects;
use crate::endings::{Difficulty, Ending, evaluate_ending_at};
use crate::progression::{action_available, is_game_over, promotion_changes};
use crate::rng::CountingRng;
use crate::rules::Rules;
use crate::state::PlayerState;
use crate::stats::PlayerLevel;
use crate::turn::{ActionResult, resolve_action};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no action `{0}` in the catalog")]
    UnknownAction(String),
    #[error("event `{0}` must be resolved before the next action")]
    EventPending(String),
    #[error("no event is waiting for a decision")]
    NoPendingEvent,
    #[error("the game is already over")]
    GameOver,
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

/// Seeded run binding catalogs, rules and a single player's state.
#[derive(Debug, Clone)]
pub struct GameSession {
    state: PlayerState,
    data: GameData,
    rules: Rules,
    difficulty: Difficulty,
    seed: u64,
    events_rng: CountingRng<SmallRng>,
    pending: VecDeque<String>,
    closing_progress: Option<i32>,
}

impl GameSession {
    /// Fresh run from the initial player configuration.
    #[must_use]
    pub fn new(data: GameData, rules: Rules, difficulty: Difficulty, seed: u64) -> Self {
        Self::from_state(PlayerState::new(), data, rules, difficulty, seed)
    }

    /// Resume from an existing state with a freshly seeded event stream.
    #[must_use]
    pub fn from_state(
        state: PlayerState,
        data: GameData,
        rules: Rules,
        difficulty: Difficulty,
        seed: u64,
    ) -> Self {
        Self {
            state,
            data,
            rules,
            difficulty,
            seed,
            events_rng: CountingRng::from_user_seed(seed, EVENT_STREAM_TAG),
            pending: VecDeque::new(),
            closing_progress: None,
        }
    }

    /// Spend a turn on the catalog action `action_id`.
    ///
    /// Triggered events that can still be offered are queued and must be
    /// resolved with [`Self::resolve_pending`] before the next action.
    ///
    /// # Errors
    ///
    /// Fails when the game is over, an event is still pending, or the id is
    /// not in the action catalog.
    pub fn take_action(&mut self, action_id: &str) -> Result<ActionResult, SessionError> {
        if self.is_finished() {
            return Err(SessionError::GameOver);
        }
        let action = self
            .data
            .actions
            .get(action_id)
            .cloned()
            .ok_or_else(|| SessionError::UnknownAction(action_id.to_string()))?;
        self.play(&action)
    }

    /// Spend a turn on an action that is not in the catalog, such as a
    /// narrative choice authored by the content service.
    ///
    /// # Errors
    ///
    /// Fails when the game is over or an event is still pending.
    pub fn play(&mut self, action: &Action) -> Result<ActionResult, SessionError> {
        if self.is_finished() {
            return Err(SessionError::GameOver);
        }
        if let Some(event_id) = self.pending.front() {
            return Err(SessionError::EventPending(event_id.clone()));
        }

        let result = resolve_action(action, &self.state, &self.rules, &mut self.events_rng);
        if result
            .changes
            .day
            .is_some_and(|day| day > self.rules.max_days)
        {
            let closing = apply_effects(&action.effects, &self.state, &self.rules);
            self.closing_progress = Some(closing.progress.unwrap_or(self.state.progress));
        }
        self.state.apply(&result.changes);

        if self.is_finished() {
            if !result.triggered_events.is_empty() {
                log::debug!(
                    "campaign over; dropping triggered {:?}",
                    result.triggered_events
                );
            }
        } else {
            for event_id in &result.triggered_events {
                if self.data.events.offerable(event_id, &self.state).is_some() {
                    self.pending.push_back(event_id.clone());
                }
            }
        }
        self.promote_if_due();
        Ok(result)
    }

    /// Event at the head of the queue, if any.
    #[must_use]
    pub fn pending_event(&self) -> Option<&Event> {
        self.pending
            .front()
            .and_then(|event_id| self.data.events.get(event_id))
    }

    /// Resolve the head of the event queue with the player's pick.
    ///
    /// On error the event stays queued so the caller can retry.
    ///
    /// # Errors
    ///
    /// Fails when the game is over, nothing is pending, or the choice does not
    /// fit the event.
    pub fn resolve_pending(
        &mut self,
        choice: Option<&str>,
    ) -> Result<EventResolution, SessionError> {
        if self.is_finished() {
            return Err(SessionError::GameOver);
        }
        let event = self.pending_event().ok_or(SessionError::NoPendingEvent)?;
        let resolution = resolve_event(event, choice, &self.state, &self.rules)?;
        self.pending.pop_front();
        resolution.apply_to(&mut self.state);
        self.promote_if_due();
        Ok(resolution)
    }

    fn promote_if_due(&mut self) -> Option<PlayerLevel> {
        let changes = promotion_changes(&self.state, &self.rules)?;
        self.state.apply(&changes);
        changes.level
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        is_game_over(&self.state, &self.rules)
    }

    /// Whether the campaign has reached any ending, including shipping on time.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.ending().is_some()
    }

    /// Ending reached so far, judged at this session's difficulty.
    ///
    /// The deadline is graded on the progress the final day closed with,
    /// before the last rollover decayed it.
    #[must_use]
    pub fn ending(&self) -> Option<Ending> {
        let progress = self.closing_progress.unwrap_or(self.state.progress);
        evaluate_ending_at(&self.state, progress, self.difficulty, &self.rules)
    }

    /// Actions whose required unlock the player holds.
    pub fn available_actions(&self) -> impl Iterator<Item = &Action> {
        self.data
            .actions
            .iter()
            .filter(|action| action_available(action, &self.state))
    }

    /// Throw the run away and start over with the same seed.
    pub fn new_game(&mut self) {
        self.state.reset();
        self.pending.clear();
        self.closing_progress = None;
        self.events_rng = CountingRng::from_user_seed(self.seed, EVENT_STREAM_TAG);
    }

    /// Deterministically reseed the event stream.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.events_rng = CountingRng::from_user_seed(seed, EVENT_STREAM_TAG);
    }

    #[must_use]
    pub const fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Apply a closure to the mutable player state.
    pub fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut PlayerState) -> R) -> R {
        f(&mut self.state)
    }

    #[must_use]
    pub const fn data(&self) -> &GameData {
        &self.data
    }

    #[must_use]
    pub const fn rules(&self) -> &Rules {
        &self.rules
    }

    #[must_use]
    pub const fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of draws made against the event stream.
    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.events_rng.draws()
    }

    /// Consume the session, returning the underlying player state.
    #[must_use]
    pub fn into_state(self) -> PlayerState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(seed: u64) -> GameSession {
        GameSession::new(
            GameData::load_from_static().unwrap(),
            Rules::default(),
            Difficulty::Normal,
            seed,
        )
    }

    fn always_patrol() -> Rules {
        Rules {
            boss_patrol_chance: 1.0,
            ..Rules::default()
        }
    }

    #[test]
    fn taking_an_action_merges_changes() {
        let mut session = session(7);
        let result = session.take_action("work_hard").unwrap();
        assert_eq!(session.state().turn, 1);
        assert_eq!(session.state().progress, 8);
        assert_eq!(session.state().energy, 60);
        assert_eq!(session.draws(), 1);
        assert_eq!(result.action.id, "work_hard");
    }

    #[test]
    fn unknown_actions_are_rejected() {
        let mut session = session(7);
        assert_eq!(
            session.take_action("nap_under_desk").unwrap_err(),
            SessionError::UnknownAction("nap_under_desk".to_string())
        );
        assert_eq!(session.state(), &PlayerState::new());
    }

    #[test]
    fn triggered_events_block_until_resolved() {
        let mut session = GameSession::new(
            GameData::load_from_static().unwrap(),
            always_patrol(),
            Difficulty::Normal,
            1,
        );
        let result = session.take_action("browse_reddit").unwrap();
        assert_eq!(result.triggered_events.as_slice(), ["boss_patrol"]);
        assert_eq!(session.pending_event().unwrap().id, "boss_patrol");
        assert!(matches!(
            session.take_action("work_hard"),
            Err(SessionError::EventPending(_))
        ));

        assert!(matches!(
            session.resolve_pending(None),
            Err(SessionError::Dispatch(DispatchError::ChoiceRequired { .. }))
        ));
        assert!(session.pending_event().is_some());

        let resolution = session.resolve_pending(Some("pretend_work")).unwrap();
        assert_eq!(resolution.changes.suspicion, Some(0));
        assert!(session.state().has_seen("boss_patrol"));
        assert!(session.pending_event().is_none());
        assert_eq!(
            session.resolve_pending(None).unwrap_err(),
            SessionError::NoPendingEvent
        );
        assert!(session.take_action("work_hard").is_ok());
    }

    #[test]
    fn same_seed_replays_identically() {
        let script = ["work_hard", "slack_off", "coffee_break", "jira_update"];
        let mut a = session(99);
        let mut b = session(99);
        for action_id in script.iter().cycle().take(40) {
            let left = a.take_action(action_id);
            let right = b.take_action(action_id);
            assert_eq!(left, right);
            if a.pending_event().is_some() {
                a.resolve_pending(Some("pretend_work")).unwrap();
                b.resolve_pending(Some("pretend_work")).unwrap();
            }
        }
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn finished_games_refuse_more_turns() {
        let mut session = session(3);
        session.with_state_mut(|state| state.suspicion = 80);
        assert!(session.is_game_over());
        assert_eq!(
            session.ending(),
            Some(Ending::Fired { suspicion: 80 })
        );
        assert_eq!(
            session.take_action("work_hard").unwrap_err(),
            SessionError::GameOver
        );
    }

    #[test]
    fn the_firing_turn_does_not_queue_its_event() {
        let mut session = GameSession::new(
            GameData::load_from_static().unwrap(),
            always_patrol(),
            Difficulty::Normal,
            4,
        );
        session.with_state_mut(|state| state.suspicion = 79);

        let result = session.take_action("slack_off").unwrap();
        assert_eq!(result.triggered_events.as_slice(), ["boss_patrol"]);
        assert_eq!(session.state().suspicion, 82);
        assert_eq!(session.ending(), Some(Ending::Fired { suspicion: 82 }));
        assert!(session.pending_event().is_none());

        assert_eq!(
            session.resolve_pending(Some("pretend_work")).unwrap_err(),
            SessionError::GameOver
        );
        assert_eq!(
            session.take_action("coffee_break").unwrap_err(),
            SessionError::GameOver
        );
        assert_eq!(
            session.take_action("nap_under_desk").unwrap_err(),
            SessionError::GameOver
        );
        assert_eq!(session.state().suspicion, 82);
    }

    #[test]
    fn a_finished_project_is_delivered_on_deadline_day() {
        let quiet = Rules {
            boss_patrol_chance: 0.0,
            coffee_spill_chance: 0.0,
            ..Rules::default()
        };
        let mut session = GameSession::new(
            GameData::load_from_static().unwrap(),
            quiet,
            Difficulty::Hard,
            8,
        );
        session.with_state_mut(|state| {
            state.day = 30;
            state.week = 4;
            state.turn = 7;
            state.progress = 100;
        });

        session.take_action("jira_update").unwrap();
        assert_eq!(session.state().day, 31);
        assert_eq!(session.state().progress, 98);
        assert!(session.is_game_over());
        assert_eq!(session.ending(), Some(Ending::Delivered));

        session.new_game();
        assert_eq!(session.ending(), None);
    }

    #[test]
    fn deadline_grading_ignores_the_last_decay_only() {
        let mut session = session(21);
        session.with_state_mut(|state| {
            state.day = 30;
            state.week = 4;
            state.turn = 7;
            state.progress = 64;
        });
        session.take_action("slack_off").unwrap();
        assert_eq!(session.state().progress, 62);
        assert_eq!(
            session.ending(),
            Some(Ending::DeadlineMissed {
                progress: 64,
                required: 70
            })
        );
    }

    #[test]
    fn reputation_milestones_promote_automatically() {
        let mut session = session(5);
        session.with_state_mut(|state| state.reputation = 24);
        session.take_action("jira_update").unwrap();
        assert_eq!(session.state().level, PlayerLevel::Junior);
    }

    #[test]
    fn new_game_resets_state_and_stream() {
        let mut session = session(11);
        let first = session.take_action("work_hard").unwrap();
        session.new_game();
        assert_eq!(session.state(), &PlayerState::new());
        assert_eq!(session.draws(), 0);
        let replay = session.take_action("work_hard").unwrap();
        assert_eq!(first, replay);

        session.reseed(12);
        assert_eq!(session.seed(), 12);
        assert_eq!(session.into_state().turn, 1);
    }
}
