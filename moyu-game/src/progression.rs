//! Predicates the caller evaluates between turns.
use crate::constants::{SLACK_SUSPICION_CEILING, WORK_ENERGY_FLOOR};
use crate::data::Action;
use crate::rules::Rules;
use crate::state::{PlayerState, StateChanges};
use crate::stats::PlayerLevel;

/// Fired for suspicion, or out of days with the project unfinished.
#[must_use]
pub fn is_game_over(state: &PlayerState, rules: &Rules) -> bool {
    state.suspicion >= rules.fired_suspicion
        || (state.day > rules.max_days && state.progress < rules.deadline_progress)
}

/// Enough energy left to do real work.
#[must_use]
pub const fn can_work(state: &PlayerState) -> bool {
    state.energy > WORK_ENERGY_FLOOR
}

/// Suspicion still low enough to get away with slacking.
#[must_use]
pub const fn can_slack(state: &PlayerState) -> bool {
    state.suspicion < SLACK_SUSPICION_CEILING
}

/// Next level the player has earned but not yet received.
#[must_use]
pub fn promotion_due(state: &PlayerState, rules: &Rules) -> Option<PlayerLevel> {
    let next = state.level.next()?;
    let threshold = rules.promotion_threshold(next)?;
    (state.reputation >= threshold).then_some(next)
}

/// Changeset carrying a due promotion, if any.
#[must_use]
pub fn promotion_changes(state: &PlayerState, rules: &Rules) -> Option<StateChanges> {
    promotion_due(state, rules).map(|level| {
        log::debug!("promotion to {level} at reputation {}", state.reputation);
        StateChanges {
            level: Some(level),
            ..StateChanges::default()
        }
    })
}

/// Whether the player holds the unlock `action` asks for.
///
/// The turn engine never checks this; menus and policies do.
#[must_use]
pub fn action_available(action: &Action, state: &PlayerState) -> bool {
    action
        .required
        .as_deref()
        .is_none_or(|required| state.has_skill(required))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ActionCatalog;
    use crate::rng::FixedRoll;
    use crate::turn::resolve_action;

    #[test]
    fn suspicion_threshold_ends_the_game() {
        let rules = Rules::default();
        let mut state = PlayerState::new();
        state.suspicion = 79;
        assert!(!is_game_over(&state, &rules));
        state.suspicion = 80;
        assert!(is_game_over(&state, &rules));
    }

    #[test]
    fn one_more_slack_at_79_suspicion_gets_you_fired() {
        let rules = Rules::default();
        let actions = ActionCatalog::load_from_static().unwrap();
        let slack = actions.get("slack_off").unwrap();
        let mut state = PlayerState {
            suspicion: 79,
            ..PlayerState::new()
        };
        let result = resolve_action(slack, &state, &rules, &mut FixedRoll(0.9));
        state.apply(&result.changes);
        assert_eq!(state.suspicion, 82);
        assert!(is_game_over(&state, &rules));
    }

    #[test]
    fn deadline_counts_only_after_the_last_day() {
        let rules = Rules::default();
        let state = PlayerState {
            day: 30,
            progress: 40,
            ..PlayerState::new()
        };
        assert!(!is_game_over(&state, &rules));

        let late = PlayerState { day: 31, ..state };
        assert!(is_game_over(&late, &rules));

        let shipped = PlayerState {
            progress: 100,
            ..late
        };
        assert!(!is_game_over(&shipped, &rules));
    }

    #[test]
    fn affordances_use_store_thresholds() {
        let mut state = PlayerState::new();
        state.energy = 11;
        assert!(can_work(&state));
        state.energy = 10;
        assert!(!can_work(&state));
        state.suspicion = 69;
        assert!(can_slack(&state));
        state.suspicion = 70;
        assert!(!can_slack(&state));
    }

    #[test]
    fn promotions_climb_one_rung_at_a_time() {
        let rules = Rules::default();
        let mut state = PlayerState {
            reputation: 60,
            ..PlayerState::new()
        };
        assert_eq!(promotion_due(&state, &rules), Some(PlayerLevel::Junior));
        state.apply(&promotion_changes(&state, &rules).unwrap());
        assert_eq!(promotion_due(&state, &rules), Some(PlayerLevel::Senior));
        state.level = PlayerLevel::Senior;
        assert_eq!(promotion_due(&state, &rules), None);

        state.level = PlayerLevel::Cto;
        state.reputation = 100;
        assert!(promotion_changes(&state, &rules).is_none());
    }

    #[test]
    fn required_unlocks_gate_availability() {
        let actions = ActionCatalog::load_from_static().unwrap();
        let stealth = actions.get("stealth_browse").unwrap();
        let work = actions.get("work_hard").unwrap();
        let mut state = PlayerState::new();
        assert!(action_available(stealth, &state));
        assert!(action_available(work, &state));
        state.unlocked_skills.clear();
        assert!(!action_available(stealth, &state));
        assert!(action_available(work, &state));
    }
}
