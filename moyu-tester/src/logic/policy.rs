use std::fmt;

use moyu_game::constants::POLICY_STREAM_TAG;
use moyu_game::{Action, Effect, Event, PlayerState, Stat, can_slack, can_work, derive_stream_seed};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Decision returned by a [`PlayerPolicy`]
#[derive(Debug, Clone)]
pub struct PolicyDecision {
    pub index: usize,
    pub rationale: Option<String>,
}

impl PolicyDecision {
    #[must_use]
    pub fn new(index: usize, rationale: Option<String>) -> Self {
        Self { index, rationale }
    }
}

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Select one of the offered actions for this turn.
    fn pick_action(&mut self, state: &PlayerState, actions: &[&Action]) -> PolicyDecision;

    /// Select one of an event's choices.
    fn pick_choice(&mut self, state: &PlayerState, event: &Event) -> PolicyDecision;
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GameplayStrategy {
    Workaholic,
    Slacker,
    Balanced,
    Random,
}

impl GameplayStrategy {
    pub const ALL: &'static [Self] = &[
        Self::Workaholic,
        Self::Slacker,
        Self::Balanced,
        Self::Random,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            GameplayStrategy::Workaholic => "Workaholic",
            GameplayStrategy::Slacker => "Slacker",
            GameplayStrategy::Balanced => "Balanced",
            GameplayStrategy::Random => "Random",
        }
    }

    /// Token accepted on the command line.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            GameplayStrategy::Workaholic => "workaholic",
            GameplayStrategy::Slacker => "slacker",
            GameplayStrategy::Balanced => "balanced",
            GameplayStrategy::Random => "random",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            GameplayStrategy::Workaholic => "Always works when energy allows, refuels otherwise",
            GameplayStrategy::Slacker => "Slacks while suspicion is safe, covers tracks otherwise",
            GameplayStrategy::Balanced => "Keeps energy and suspicion in check, tracks the schedule",
            GameplayStrategy::Random => "Uniformly random picks from a seeded ChaCha20 stream",
        }
    }

    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|strategy| strategy.key().eq_ignore_ascii_case(key.trim()))
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            GameplayStrategy::Workaholic => Box::new(WorkaholicPolicy),
            GameplayStrategy::Slacker => Box::new(SlackerPolicy),
            GameplayStrategy::Balanced => Box::new(BalancedPolicy),
            GameplayStrategy::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct WorkaholicPolicy;
struct SlackerPolicy;
struct BalancedPolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(derive_stream_seed(seed, POLICY_STREAM_TAG)),
        }
    }
}

fn delta(effects: &[Effect], stat: Stat) -> i32 {
    effects
        .iter()
        .filter(|effect| effect.stat == stat)
        .map(|effect| effect.value)
        .sum()
}

/// Net energy change of an action, cost included.
fn energy_gain(action: &Action) -> i32 {
    delta(&action.effects, Stat::Energy) - action.cost.energy.max(0)
}

/// Index of the highest-scoring item; ties keep the earliest.
fn best_by<T>(items: &[T], score: impl Fn(&T) -> i32) -> (usize, i32) {
    let mut best = (0, i32::MIN);
    for (idx, item) in items.iter().enumerate() {
        let value = score(item);
        if value > best.1 {
            best = (idx, value);
        }
    }
    best
}

fn safest_choice(event: &Event) -> PolicyDecision {
    let (idx, score) = best_by(&event.choices, |choice| {
        -delta(&choice.effects, Stat::Suspicion) * 2 + delta(&choice.effects, Stat::Reputation)
    });
    PolicyDecision::new(idx, Some(format!("safety {score}")))
}

impl PlayerPolicy for WorkaholicPolicy {
    fn name(&self) -> &'static str {
        "Workaholic"
    }

    fn pick_action(&mut self, state: &PlayerState, actions: &[&Action]) -> PolicyDecision {
        if can_work(state) {
            let (idx, progress) = best_by(actions, |action| delta(&action.effects, Stat::Progress));
            PolicyDecision::new(idx, Some(format!("progress {progress:+}")))
        } else {
            let (idx, energy) = best_by(actions, |action| energy_gain(action));
            PolicyDecision::new(idx, Some(format!("refuel {energy:+}")))
        }
    }

    fn pick_choice(&mut self, _state: &PlayerState, event: &Event) -> PolicyDecision {
        safest_choice(event)
    }
}

impl PlayerPolicy for SlackerPolicy {
    fn name(&self) -> &'static str {
        "Slacker"
    }

    fn pick_action(&mut self, state: &PlayerState, actions: &[&Action]) -> PolicyDecision {
        if can_slack(state) {
            let (idx, chill) = best_by(actions, |action| delta(&action.effects, Stat::Chill));
            PolicyDecision::new(idx, Some(format!("chill {chill:+}")))
        } else {
            let (idx, cover) = best_by(actions, |action| -delta(&action.effects, Stat::Suspicion));
            PolicyDecision::new(idx, Some(format!("cover {cover:+}")))
        }
    }

    fn pick_choice(&mut self, _state: &PlayerState, event: &Event) -> PolicyDecision {
        let (idx, score) = best_by(&event.choices, |choice| {
            delta(&choice.effects, Stat::Chill) * 2 - delta(&choice.effects, Stat::Suspicion)
        });
        PolicyDecision::new(idx, Some(format!("score {score}")))
    }
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "Balanced"
    }

    fn pick_action(&mut self, state: &PlayerState, actions: &[&Action]) -> PolicyDecision {
        let on_schedule = i64::from(state.progress) * 30 >= i64::from(state.day) * 100;
        let (idx, score, reason) = if state.suspicion >= 50 {
            let (idx, score) = best_by(actions, |action| -delta(&action.effects, Stat::Suspicion));
            (idx, score, "cool down")
        } else if state.energy <= 30 {
            let (idx, score) = best_by(actions, |action| energy_gain(action));
            (idx, score, "recharge")
        } else if !on_schedule {
            let (idx, score) = best_by(actions, |action| delta(&action.effects, Stat::Progress));
            (idx, score, "catch up")
        } else {
            let (idx, score) = best_by(actions, |action| {
                delta(&action.effects, Stat::Chill) - delta(&action.effects, Stat::Suspicion)
            });
            (idx, score, "enjoy")
        };
        PolicyDecision::new(idx, Some(format!("{reason} {score:+}")))
    }

    fn pick_choice(&mut self, _state: &PlayerState, event: &Event) -> PolicyDecision {
        safest_choice(event)
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn pick_action(&mut self, _state: &PlayerState, actions: &[&Action]) -> PolicyDecision {
        if actions.is_empty() {
            return PolicyDecision::new(0, Some("no actions".to_string()));
        }
        PolicyDecision::new(self.rng.gen_range(0..actions.len()), None)
    }

    fn pick_choice(&mut self, _state: &PlayerState, event: &Event) -> PolicyDecision {
        if event.choices.is_empty() {
            return PolicyDecision::new(0, Some("no choices".to_string()));
        }
        PolicyDecision::new(self.rng.gen_range(0..event.choices.len()), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moyu_game::GameData;

    fn fixtures() -> GameData {
        GameData::load_from_static().unwrap()
    }

    fn pick(strategy: GameplayStrategy, state: &PlayerState) -> String {
        let data = fixtures();
        let actions: Vec<&Action> = data.actions.iter().collect();
        let mut policy = strategy.create_policy(1);
        let decision = policy.pick_action(state, &actions);
        actions[decision.index].id.clone()
    }

    #[test]
    fn keys_round_trip() {
        for strategy in GameplayStrategy::ALL {
            assert_eq!(GameplayStrategy::from_key(strategy.key()), Some(*strategy));
        }
        assert_eq!(
            GameplayStrategy::from_key(" Slacker "),
            Some(GameplayStrategy::Slacker)
        );
        assert_eq!(GameplayStrategy::from_key("intern"), None);
    }

    #[test]
    fn workaholic_works_then_refuels() {
        let fresh = PlayerState::new();
        assert_eq!(pick(GameplayStrategy::Workaholic, &fresh), "work_hard");
        let drained = PlayerState {
            energy: 5,
            ..PlayerState::new()
        };
        assert_eq!(pick(GameplayStrategy::Workaholic, &drained), "coffee_break");
    }

    #[test]
    fn slacker_covers_tracks_when_suspicious() {
        let fresh = PlayerState::new();
        assert_eq!(pick(GameplayStrategy::Slacker, &fresh), "browse_reddit");
        let watched = PlayerState {
            suspicion: 75,
            ..PlayerState::new()
        };
        assert_eq!(pick(GameplayStrategy::Slacker, &watched), "jira_update");
    }

    #[test]
    fn balanced_reacts_to_pressure() {
        let behind = PlayerState {
            day: 10,
            progress: 5,
            ..PlayerState::new()
        };
        assert_eq!(pick(GameplayStrategy::Balanced, &behind), "work_hard");
        let tired = PlayerState {
            energy: 20,
            ..behind.clone()
        };
        assert_eq!(pick(GameplayStrategy::Balanced, &tired), "coffee_break");
        let hot = PlayerState {
            suspicion: 60,
            ..behind
        };
        assert_eq!(pick(GameplayStrategy::Balanced, &hot), "jira_update");
    }

    #[test]
    fn event_choices_prefer_low_suspicion() {
        let data = fixtures();
        let patrol = data.events.get("boss_patrol").unwrap();
        let state = PlayerState::new();
        let mut policy = GameplayStrategy::Balanced.create_policy(1);
        let decision = policy.pick_choice(&state, patrol);
        assert_eq!(patrol.choices[decision.index].id, "pretend_work");
    }

    #[test]
    fn random_policy_is_seeded() {
        let data = fixtures();
        let actions: Vec<&Action> = data.actions.iter().collect();
        let state = PlayerState::new();
        let mut a = GameplayStrategy::Random.create_policy(9);
        let mut b = GameplayStrategy::Random.create_policy(9);
        for _ in 0..20 {
            let left = a.pick_action(&state, &actions).index;
            let right = b.pick_action(&state, &actions).index;
            assert_eq!(left, right);
            assert!(left < actions.len());
        }
    }
}
