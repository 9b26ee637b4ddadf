//! Centralized balance and tuning constants for Moyu game logic.
//!
//! These are the defaults behind [`crate::rules::Rules`]. Callers may override
//! any of them through a rules file, but the shipped balance lives here so it
//! is reviewed alongside the code that consumes it.

// Calendar -----------------------------------------------------------------
pub const MAX_TURNS_PER_DAY: u32 = 8;
pub const MAX_DAYS: u32 = 30;
pub const MAX_WEEKS: u32 = 4;
pub const DAYS_PER_WEEK: u32 = 7;

// Stat bounds --------------------------------------------------------------
pub const STAT_MIN: i32 = 0;
pub const STAT_MAX: i32 = 100;

// Day rollover -------------------------------------------------------------
pub const DAY_PROGRESS_DECAY: i32 = 2;
pub const DAY_RESTORE_ENERGY: i32 = 100;

// Event sampling -----------------------------------------------------------
pub const BOSS_PATROL_CHANCE: f64 = 0.2;
pub const COFFEE_SPILL_CHANCE: f64 = 0.05;
pub const EVENT_BOSS_PATROL: &str = "boss_patrol";
pub const EVENT_COFFEE_SPILL: &str = "coffee_spill";

// Termination --------------------------------------------------------------
pub const FIRED_SUSPICION: i32 = 80;
pub const DEADLINE_PROGRESS: i32 = 100;
pub const PASS_PROGRESS_EASY: i32 = 50;
pub const PASS_PROGRESS_NORMAL: i32 = 70;
pub const PASS_PROGRESS_HARD: i32 = 100;

// Affordances --------------------------------------------------------------
pub const WORK_ENERGY_FLOOR: i32 = 10;
pub const SLACK_SUSPICION_CEILING: i32 = 70;

// Promotion reputation thresholds for Junior, Senior, Lead and CTO.
pub const PROMOTION_REPUTATION: [i32; 4] = [25, 50, 75, 100];

// Initial player ------------------------------------------------------------
pub const INITIAL_CHILL: i32 = 50;
pub const INITIAL_ENERGY: i32 = 100;
pub const INITIAL_SALARY: i32 = 5_000;
pub const INITIAL_SKILL: &str = "alt_tab_master";

// Feedback -----------------------------------------------------------------
pub(crate) const FLAVOR_LINES_PER_RESULT: usize = 2;
pub(crate) const FLAVOR_LINES: &[&str] = &[
    "Life is more than the bug in front of you; there is also the slacking yet to come.",
    "As long as I slack fast enough, the KPIs will never catch me.",
    "This is the survival wisdom of the programmer.",
    "The boss cannot see me. The boss cannot see me...",
    "Writing good code is nothing next to slacking well.",
];

// Stream tags --------------------------------------------------------------
pub const EVENT_STREAM_TAG: &[u8] = b"moyu.events";
pub const POLICY_STREAM_TAG: &[u8] = b"moyu.policy";
