use serde::Serialize;
use std::collections::BTreeMap;

use crate::logic::simulation::RunRecord;

/// Per-strategy aggregate over a batch of runs.
#[derive(Debug, Clone, Serialize)]
pub struct PolicySummary {
    pub strategy: String,
    pub runs: usize,
    pub endings: BTreeMap<String, usize>,
    pub victory_rate: f64,
    pub mean_final_day: f64,
    pub mean_progress: f64,
    pub mean_suspicion: f64,
    pub mean_events: f64,
    pub violations: usize,
}

impl PolicySummary {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.violations == 0
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}

/// Group records by strategy, keeping first-seen order.
#[must_use]
pub fn summarize(records: &[RunRecord]) -> Vec<PolicySummary> {
    let mut order: Vec<&str> = Vec::new();
    let mut grouped: BTreeMap<&str, Vec<&RunRecord>> = BTreeMap::new();
    for record in records {
        let entry = grouped.entry(record.strategy.as_str()).or_default();
        if entry.is_empty() {
            order.push(record.strategy.as_str());
        }
        entry.push(record);
    }

    order
        .into_iter()
        .filter_map(|strategy| grouped.get(strategy).map(|runs| (strategy, runs)))
        .map(|(strategy, runs)| {
            let count = runs.len();
            let mut endings = BTreeMap::new();
            for run in runs {
                *endings.entry(run.ending.clone()).or_insert(0) += 1;
            }
            let victories = runs.iter().filter(|run| run.victory).count();
            PolicySummary {
                strategy: strategy.to_string(),
                runs: count,
                endings,
                victory_rate: mean(std::iter::once(victories as f64), count),
                mean_final_day: mean(runs.iter().map(|r| f64::from(r.final_day)), count),
                mean_progress: mean(runs.iter().map(|r| f64::from(r.final_progress)), count),
                mean_suspicion: mean(runs.iter().map(|r| f64::from(r.final_suspicion)), count),
                mean_events: mean(runs.iter().map(|r| f64::from(r.events_resolved)), count),
                violations: runs.iter().map(|run| run.violations.len()).sum(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use moyu_game::PlayerLevel;

    fn record(strategy: &str, ending: &str, victory: bool, progress: i32) -> RunRecord {
        RunRecord {
            strategy: strategy.to_string(),
            seed: 1,
            ending: ending.to_string(),
            victory,
            final_day: 31,
            final_progress: progress,
            final_suspicion: 10,
            final_reputation: 0,
            final_level: PlayerLevel::Intern,
            turns_taken: 240,
            events_resolved: 4,
            violations: Vec::new(),
            decisions: Vec::new(),
        }
    }

    #[test]
    fn groups_by_strategy_in_first_seen_order() {
        let records = vec![
            record("Workaholic", "passed", true, 98),
            record("Slacker", "deadline_missed", false, 20),
            record("Workaholic", "fired", false, 50),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].strategy, "Workaholic");
        assert_eq!(summary[0].runs, 2);
        assert_eq!(summary[0].endings["passed"], 1);
        assert!((summary[0].victory_rate - 0.5).abs() < f64::EPSILON);
        assert!((summary[0].mean_progress - 74.0).abs() < f64::EPSILON);
        assert!(summary[1].passed());
    }

    #[test]
    fn violations_fail_the_summary() {
        let mut broken = record("Random", "fired", false, 0);
        broken.violations.push("energy out of range".to_string());
        let summary = summarize(&[broken]);
        assert!(!summary[0].passed());
        assert!(summarize(&[]).is_empty());
    }
}
