use anyhow::{Context, Result, bail};
use serde::Serialize;

use moyu_game::{
    Action, Difficulty, GameEngine, GameSession, PlayerLevel, PlayerState, Rules, Stat,
};

use crate::logic::policy::{GameplayStrategy, PlayerPolicy, PolicyDecision};

/// Configuration for a single automated campaign.
#[derive(Debug, Clone, Copy)]
pub struct SimulationConfig {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub difficulty: Difficulty,
    pub max_turns: u32,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(strategy: GameplayStrategy, difficulty: Difficulty, seed: u64) -> Self {
        Self {
            seed,
            strategy,
            difficulty,
            max_turns: 1_000,
        }
    }

    #[must_use]
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }
}

/// Snapshot of one policy decision.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionRecord {
    pub day: u32,
    pub turn: u32,
    pub picked: String,
    pub policy_name: String,
    pub rationale: Option<String>,
}

/// Outcome of one full campaign.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub strategy: String,
    pub seed: u64,
    pub ending: String,
    pub victory: bool,
    pub final_day: u32,
    pub final_progress: i32,
    pub final_suspicion: i32,
    pub final_reputation: i32,
    pub final_level: PlayerLevel,
    pub turns_taken: u32,
    pub events_resolved: u32,
    pub violations: Vec<String>,
    #[serde(skip)]
    pub decisions: Vec<DecisionRecord>,
}

/// Drives a [`GameSession`] with a policy until the campaign ends.
pub struct SimulationSession {
    session: GameSession,
    config: SimulationConfig,
    turns_taken: u32,
    events_resolved: u32,
    violations: Vec<String>,
    decisions: Vec<DecisionRecord>,
}

impl SimulationSession {
    #[must_use]
    pub fn new(engine: &GameEngine, config: SimulationConfig) -> Self {
        Self {
            session: engine.new_session(config.seed, config.difficulty),
            config,
            turns_taken: 0,
            events_resolved: 0,
            violations: Vec::new(),
            decisions: Vec::new(),
        }
    }

    /// Advance by one decision: a pending event if any, otherwise an action.
    ///
    /// Returns `true` once the campaign has ended.
    pub fn advance(&mut self, policy: &mut dyn PlayerPolicy) -> Result<bool> {
        if self.session.is_finished() {
            return Ok(true);
        }

        if let Some(event) = self.session.pending_event().cloned() {
            let decision = if event.has_choices() {
                Some(policy.pick_choice(self.session.state(), &event))
            } else {
                None
            };
            let choice = decision.as_ref().map(|decision| {
                let idx = decision.index.min(event.choices.len().saturating_sub(1));
                event.choices[idx].id.clone()
            });
            if let (Some(decision), Some(choice_id)) = (decision, choice.as_ref()) {
                self.record(policy, choice_id.clone(), decision);
            }
            self.session
                .resolve_pending(choice.as_deref())
                .with_context(|| format!("resolving {}", event.id))?;
            self.events_resolved += 1;
        } else {
            let actions: Vec<&Action> = self.session.available_actions().collect();
            if actions.is_empty() {
                bail!("no actions available on day {}", self.session.state().day);
            }
            let decision = policy.pick_action(self.session.state(), &actions);
            let action_id = actions[decision.index.min(actions.len() - 1)].id.clone();
            self.record(policy, action_id.clone(), decision);
            self.session
                .take_action(&action_id)
                .with_context(|| format!("taking {action_id}"))?;
            self.turns_taken += 1;
        }

        self.violations
            .extend(check_invariants(self.session.state(), self.session.rules()));
        Ok(self.session.is_finished())
    }

    fn record(&mut self, policy: &dyn PlayerPolicy, picked: String, decision: PolicyDecision) {
        let state = self.session.state();
        log::trace!(
            "{} day {} turn {}: {picked} ({})",
            policy.name(),
            state.day,
            state.turn,
            decision.rationale.as_deref().unwrap_or("-")
        );
        self.decisions.push(DecisionRecord {
            day: state.day,
            turn: state.turn,
            picked,
            policy_name: policy.name().to_string(),
            rationale: decision.rationale,
        });
    }

    /// Play to the end and summarise.
    pub fn run(mut self, policy: &mut dyn PlayerPolicy) -> Result<RunRecord> {
        while !self.advance(policy)? {
            if self.turns_taken >= self.config.max_turns {
                self.violations.push(format!(
                    "campaign still running after {} turns",
                    self.turns_taken
                ));
                break;
            }
        }

        let state = self.session.state();
        let ending = self.session.ending();
        Ok(RunRecord {
            strategy: self.config.strategy.label().to_string(),
            seed: self.config.seed,
            ending: ending.map_or_else(|| "unfinished".to_string(), |e| e.key().to_string()),
            victory: ending.is_some_and(|e| e.is_victory()),
            final_day: state.day,
            final_progress: state.progress,
            final_suspicion: state.suspicion,
            final_reputation: state.reputation,
            final_level: state.level,
            turns_taken: self.turns_taken,
            events_resolved: self.events_resolved,
            violations: self.violations,
            decisions: self.decisions,
        })
    }
}

/// Engine invariants every reachable state must satisfy.
#[must_use]
pub fn check_invariants(state: &PlayerState, rules: &Rules) -> Vec<String> {
    let mut violations = Vec::new();
    for stat in Stat::BOUNDED {
        let value = state.stat(*stat);
        if !(rules.stat_min..=rules.stat_max).contains(&value) {
            violations.push(format!("day {}: {stat} out of range ({value})", state.day));
        }
    }
    if state.salary < 0 {
        violations.push(format!("day {}: salary negative ({})", state.day, state.salary));
    }
    if state.turn >= rules.max_turns_per_day {
        violations.push(format!("day {}: turn out of range ({})", state.day, state.turn));
    }
    if state.week == 0 || state.week > rules.max_weeks {
        violations.push(format!("day {}: week out of range ({})", state.day, state.week));
    }
    violations
}

/// Run every strategy over every seed for `iterations` consecutive seeds each.
pub fn run_batch(
    engine: &GameEngine,
    strategies: &[GameplayStrategy],
    seeds: &[u64],
    iterations: usize,
    difficulty: Difficulty,
) -> Result<Vec<RunRecord>> {
    let mut records = Vec::with_capacity(strategies.len() * seeds.len() * iterations.max(1));
    for strategy in strategies {
        for seed in seeds {
            for iteration in 0..iterations.max(1) {
                let run_seed = seed.wrapping_add(iteration as u64);
                let mut policy = strategy.create_policy(run_seed);
                let config = SimulationConfig::new(*strategy, difficulty, run_seed);
                let record = SimulationSession::new(engine, config)
                    .run(policy.as_mut())
                    .with_context(|| format!("{strategy} seed {run_seed}"))?;
                log::debug!(
                    "{strategy} seed {run_seed}: {} on day {}",
                    record.ending,
                    record.final_day
                );
                records.push(record);
            }
        }
    }
    Ok(records)
}
