//! How a campaign ends, graded by difficulty.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{PASS_PROGRESS_EASY, PASS_PROGRESS_HARD, PASS_PROGRESS_NORMAL};
use crate::rules::Rules;
use crate::state::PlayerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: &'static [Self] = &[Self::Easy, Self::Normal, Self::Hard];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        }
    }

    /// Progress needed at the deadline to keep the job.
    #[must_use]
    pub const fn min_progress(self) -> i32 {
        match self {
            Self::Easy => PASS_PROGRESS_EASY,
            Self::Normal => PASS_PROGRESS_NORMAL,
            Self::Hard => PASS_PROGRESS_HARD,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "normal" => Ok(Self::Normal),
            "hard" => Ok(Self::Hard),
            other => Err(format!("unknown difficulty `{other}`")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Ending {
    /// Caught slacking once too often.
    Fired { suspicion: i32 },
    /// Shipped the whole project on time.
    Delivered,
    /// Missed perfection but cleared the difficulty bar.
    Passed { progress: i32 },
    /// Ran out of days below the difficulty bar.
    DeadlineMissed { progress: i32, required: i32 },
}

impl Ending {
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Fired { .. } => "fired",
            Self::Delivered => "delivered",
            Self::Passed { .. } => "passed",
            Self::DeadlineMissed { .. } => "deadline_missed",
        }
    }

    #[must_use]
    pub const fn is_victory(self) -> bool {
        matches!(self, Self::Delivered | Self::Passed { .. })
    }

    #[must_use]
    pub fn headline(self) -> String {
        match self {
            Self::Fired { suspicion } => format!(
                "Caught slacking with suspicion at {suspicion}. Security walks you out."
            ),
            Self::Delivered => {
                "The project shipped at 100% and nobody noticed how. Legendary.".to_string()
            }
            Self::Passed { progress } => format!(
                "Deadline day: {progress}% done. Good enough to keep the badge."
            ),
            Self::DeadlineMissed { progress, required } => format!(
                "Deadline day: {progress}% done against the {required}% bar. Clear your desk."
            ),
        }
    }
}

impl fmt::Display for Ending {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Ending reached by `state`, or `None` while the campaign is still running.
///
/// The deadline is graded on `state.progress`. Callers that saw the final day
/// close should use [`evaluate_ending_at`] so the last rollover's decay does
/// not count against the player.
#[must_use]
pub fn evaluate_ending(state: &PlayerState, difficulty: Difficulty, rules: &Rules) -> Option<Ending> {
    evaluate_ending_at(state, state.progress, difficulty, rules)
}

/// Like [`evaluate_ending`], grading the deadline on `closing_progress`, the
/// progress the final day closed with before the rollover decayed it.
#[must_use]
pub fn evaluate_ending_at(
    state: &PlayerState,
    closing_progress: i32,
    difficulty: Difficulty,
    rules: &Rules,
) -> Option<Ending> {
    if state.suspicion >= rules.fired_suspicion {
        return Some(Ending::Fired {
            suspicion: state.suspicion,
        });
    }
    if state.day <= rules.max_days {
        return None;
    }
    let required = difficulty.min_progress();
    let ending = if closing_progress >= rules.deadline_progress {
        Ending::Delivered
    } else if closing_progress >= required {
        Ending::Passed {
            progress: closing_progress,
        }
    } else {
        Ending::DeadlineMissed {
            progress: closing_progress,
            required,
        }
    };
    Some(ending)
}
