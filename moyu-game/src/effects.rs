//! The single stat-mutation routine shared by actions, events and choices.
use crate::data::Effect;
use crate::rules::Rules;
use crate::state::{PlayerState, StateChanges};
use crate::stats::{ClampPolicy, Stat};

/// Clamp `value` according to `stat`'s policy.
#[must_use]
pub fn clamp_for(stat: Stat, value: i32, rules: &Rules) -> i32 {
    match stat.clamp_policy() {
        ClampPolicy::Bounded => rules.clamp_stat(value),
        ClampPolicy::NonNegative => value.max(0),
    }
}

/// Layer `effects` onto `changes`, in order.
///
/// Each effect reads the pending value for its stat when an earlier effect
/// (or the caller) already wrote one, otherwise the `base` snapshot value.
pub fn apply_effects_onto(
    changes: &mut StateChanges,
    effects: &[Effect],
    base: &PlayerState,
    rules: &Rules,
) {
    for effect in effects {
        let current = changes.stat_or(effect.stat, base);
        let next = clamp_for(effect.stat, current.saturating_add(effect.value), rules);
        log::trace!(
            "effect {} {current} {:+} -> {next}",
            effect.stat,
            effect.value
        );
        changes.set_stat(effect.stat, next);
    }
}

/// Changeset produced by applying `effects` to a clean copy of `base`.
#[must_use]
pub fn apply_effects(effects: &[Effect], base: &PlayerState, rules: &Rules) -> StateChanges {
    let mut changes = StateChanges::new();
    apply_effects_onto(&mut changes, effects, base, rules);
    changes
}
