//! Turn resolution: cost, effects, calendar rollover and event sampling.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{
    EVENT_BOSS_PATROL, EVENT_COFFEE_SPILL, FLAVOR_LINES, FLAVOR_LINES_PER_RESULT,
};
use crate::data::Action;
use crate::effects::apply_effects_onto;
use crate::rng::RollSource;
use crate::rules::Rules;
use crate::state::{PlayerState, StateChanges};

/// Event ids emitted by a single resolution; at most one in practice.
pub type TriggeredEvents = SmallVec<[String; 1]>;

/// Player-facing text attached to a resolved action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionFeedback {
    pub success: String,
    pub flavor: Vec<String>,
}

/// Everything a caller needs after one action resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub action: Action,
    pub changes: StateChanges,
    pub feedback: ActionFeedback,
    pub triggered_events: TriggeredEvents,
}

impl ActionResult {
    /// Whether this turn crossed into a new day.
    #[must_use]
    pub const fn rolled_over(&self) -> bool {
        self.changes.day.is_some()
    }
}

/// Resolve `action` against `state` without touching it.
///
/// Cost is charged first (positive energy only), then effects are layered in
/// order, the turn advances and may roll the day over, and finally one roll
/// decides which event, if any, fires.
pub fn resolve_action<S>(
    action: &Action,
    state: &PlayerState,
    rules: &Rules,
    rolls: &mut S,
) -> ActionResult
where
    S: RollSource + ?Sized,
{
    let mut changes = StateChanges::new();

    if action.cost.energy > 0 {
        changes.energy = Some(
            state
                .energy
                .saturating_sub(action.cost.energy)
                .max(rules.stat_min),
        );
    }

    apply_effects_onto(&mut changes, &action.effects, state, rules);

    let turn = changes.turn.unwrap_or(state.turn) + 1;
    changes.turn = Some(turn);
    if turn >= rules.max_turns_per_day {
        roll_over_day(&mut changes, state, rules);
    }

    let triggered_events = sample_events(rolls.roll(), rules);
    if !triggered_events.is_empty() {
        log::debug!(
            "day {} turn {}: {} triggered {:?}",
            state.day,
            state.turn,
            action.id,
            triggered_events
        );
    }

    ActionResult {
        success: true,
        action: action.clone(),
        changes,
        feedback: feedback_for(action, state, rules),
        triggered_events,
    }
}

fn roll_over_day(changes: &mut StateChanges, state: &PlayerState, rules: &Rules) {
    let day = state.day + 1;
    let progress = changes.progress.unwrap_or(state.progress);
    changes.turn = Some(0);
    changes.day = Some(day);
    changes.week = Some(rules.week_for_day(day));
    changes.energy = Some(rules.clamp_stat(rules.day_restore_energy));
    changes.progress = Some((progress - rules.day_progress_decay).max(rules.stat_min));
    log::debug!("day {} closed; starting day {day}", state.day);
}

/// Map one uniform draw onto the event ids it triggers.
///
/// The coffee spill check only runs when the boss check failed, so with the
/// shipped odds it can never fire. Kept as-is until the intended odds are
/// confirmed.
#[must_use]
pub fn sample_events(roll: f64, rules: &Rules) -> TriggeredEvents {
    let mut triggered = TriggeredEvents::new();
    if roll < rules.boss_patrol_chance {
        triggered.push(EVENT_BOSS_PATROL.to_string());
    } else if roll < rules.coffee_spill_chance {
        triggered.push(EVENT_COFFEE_SPILL.to_string());
    }
    triggered
}

fn feedback_for(action: &Action, state: &PlayerState, rules: &Rules) -> ActionFeedback {
    let turns_per_day = usize::try_from(rules.max_turns_per_day).unwrap_or_default();
    let slot = usize::try_from(state.day)
        .unwrap_or_default()
        .wrapping_mul(turns_per_day)
        .wrapping_add(usize::try_from(state.turn).unwrap_or_default());
    let flavor = (0..FLAVOR_LINES_PER_RESULT)
        .map(|offset| FLAVOR_LINES[slot.wrapping_add(offset) % FLAVOR_LINES.len()].to_string())
        .collect();
    ActionFeedback {
        success: format!("Pulled it off: {}", action.name),
        flavor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ActionCategory, Cost, Effect};
    use crate::rng::{FixedRoll, ScriptedRolls};
    use crate::stats::Stat;

    fn action(cost: i32, effects: Vec<Effect>) -> Action {
        Action {
            id: "test_action".to_string(),
            name: "Test Action".to_string(),
            description: String::new(),
            category: ActionCategory::Work,
            icon: None,
            cost: Cost { energy: cost },
            effects,
            required: None,
        }
    }

    fn work_hard() -> Action {
        action(
            20,
            vec![
                Effect::new(Stat::Progress, 8),
                Effect::new(Stat::Energy, -20),
                Effect::new(Stat::Chill, -10),
            ],
        )
    }

    #[test]
    fn work_hard_from_fresh_state() {
        let state = PlayerState::new();
        let result = resolve_action(
            &work_hard(),
            &state,
            &Rules::default(),
            &mut FixedRoll(0.5),
        );
        let expected = StateChanges {
            energy: Some(60),
            progress: Some(8),
            chill: Some(40),
            turn: Some(1),
            ..StateChanges::default()
        };
        assert!(result.success);
        assert_eq!(result.changes, expected);
        assert!(result.triggered_events.is_empty());
        assert!(!result.rolled_over());
        assert_eq!(result.action.id, "test_action");
    }

    #[test]
    fn negative_cost_is_not_a_refund() {
        let state = PlayerState {
            energy: 50,
            ..PlayerState::new()
        };
        let result = resolve_action(
            &action(-10, Vec::new()),
            &state,
            &Rules::default(),
            &mut FixedRoll(0.9),
        );
        assert_eq!(result.changes.energy, None);
        assert_eq!(
            result.changes,
            StateChanges {
                turn: Some(1),
                ..StateChanges::default()
            }
        );
    }

    #[test]
    fn cost_floors_at_zero() {
        let state = PlayerState {
            energy: 5,
            ..PlayerState::new()
        };
        let result = resolve_action(
            &action(20, Vec::new()),
            &state,
            &Rules::default(),
            &mut FixedRoll(0.9),
        );
        assert_eq!(result.changes.energy, Some(0));
    }

    #[test]
    fn cost_floors_at_a_custom_stat_min() {
        let rules = Rules {
            stat_min: 10,
            ..Rules::default()
        };
        let state = PlayerState {
            energy: 15,
            ..PlayerState::new()
        };
        let result = resolve_action(&action(20, Vec::new()), &state, &rules, &mut FixedRoll(0.9));
        assert_eq!(result.changes.energy, Some(10));

        let drained = resolve_action(
            &action(20, vec![Effect::new(Stat::Energy, -20)]),
            &state,
            &rules,
            &mut FixedRoll(0.9),
        );
        assert_eq!(drained.changes.energy, Some(10));
    }

    #[test]
    fn each_turn_draws_exactly_one_roll() {
        let rules = Rules::default();
        let mut rolls = ScriptedRolls::new([0.1, 0.5, 0.01, 0.9]);
        let mut state = PlayerState::new();
        let mut triggered = Vec::new();
        for _ in 0..4 {
            let result = resolve_action(&action(0, Vec::new()), &state, &rules, &mut rolls);
            state.apply(&result.changes);
            triggered.push(result.triggered_events.into_vec());
        }
        assert_eq!(state.turn, 4);
        assert_eq!(
            triggered,
            vec![
                vec!["boss_patrol".to_string()],
                Vec::new(),
                vec!["boss_patrol".to_string()],
                Vec::new(),
            ]
        );

        let next = resolve_action(&action(0, Vec::new()), &state, &rules, &mut rolls);
        assert_eq!(next.triggered_events.as_slice(), ["boss_patrol"]);
    }

    #[test]
    fn last_turn_rolls_the_day_over() {
        let state = PlayerState {
            turn: 7,
            progress: 10,
            energy: 30,
            ..PlayerState::new()
        };
        let result = resolve_action(
            &action(10, vec![Effect::new(Stat::Progress, 5)]),
            &state,
            &Rules::default(),
            &mut FixedRoll(0.9),
        );
        assert!(result.rolled_over());
        assert_eq!(result.changes.turn, Some(0));
        assert_eq!(result.changes.day, Some(2));
        assert_eq!(result.changes.week, Some(1));
        assert_eq!(result.changes.energy, Some(100));
        assert_eq!(result.changes.progress, Some(13));
    }

    #[test]
    fn rollover_decay_uses_post_effect_progress_and_floors() {
        let state = PlayerState {
            turn: 7,
            progress: 3,
            ..PlayerState::new()
        };
        let result = resolve_action(
            &action(0, vec![Effect::new(Stat::Progress, -2)]),
            &state,
            &Rules::default(),
            &mut FixedRoll(0.9),
        );
        assert_eq!(result.changes.progress, Some(0));
    }

    #[test]
    fn rollover_advances_the_week() {
        let state = PlayerState {
            turn: 7,
            day: 7,
            ..PlayerState::new()
        };
        let result = resolve_action(
            &action(0, Vec::new()),
            &state,
            &Rules::default(),
            &mut FixedRoll(0.9),
        );
        assert_eq!(result.changes.day, Some(8));
        assert_eq!(result.changes.week, Some(2));
    }

    #[test]
    fn event_sampling_follows_literal_thresholds() {
        let rules = Rules::default();
        assert_eq!(sample_events(0.1, &rules).as_slice(), ["boss_patrol"]);
        assert_eq!(sample_events(0.01, &rules).as_slice(), ["boss_patrol"]);
        assert!(sample_events(0.5, &rules).is_empty());
        assert!(sample_events(0.2, &rules).is_empty());
    }

    #[test]
    fn coffee_spill_fires_only_when_odds_are_reordered() {
        let rules = Rules {
            boss_patrol_chance: 0.01,
            ..Rules::default()
        };
        assert_eq!(sample_events(0.03, &rules).as_slice(), ["coffee_spill"]);
    }

    #[test]
    fn feedback_is_deterministic() {
        let state = PlayerState::new();
        let rules = Rules::default();
        let first = resolve_action(&work_hard(), &state, &rules, &mut FixedRoll(0.3));
        let second = resolve_action(&work_hard(), &state, &rules, &mut FixedRoll(0.3));
        assert_eq!(first, second);
        assert_eq!(first.feedback.flavor.len(), 2);
        assert!(first.feedback.success.contains("Test Action"));
    }
}
