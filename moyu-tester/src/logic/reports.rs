use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use crate::logic::simulation::RunRecord;
use crate::logic::summary::PolicySummary;

pub fn generate_console_report(
    out: &mut dyn Write,
    summaries: &[PolicySummary],
    records: &[RunRecord],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Playtest Results Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "===========================".cyan())?;

    let total_runs = records.len();
    let victories = records.iter().filter(|r| r.victory).count();
    let flagged = records.iter().filter(|r| !r.violations.is_empty()).count();

    writeln!(out, "Total runs: {total_runs}")?;
    writeln!(out, "Victories: {}", victories.to_string().green())?;
    writeln!(out, "Invariant violations: {}", flagged.to_string().red())?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for summary in summaries {
        let status = if summary.passed() {
            "✅ PASS".green()
        } else {
            "❌ FAIL".red()
        };
        writeln!(out, "{} {}", status, summary.strategy.bold())?;
        writeln!(
            out,
            "   Runs: {} | victory rate {:.1}%",
            summary.runs,
            summary.victory_rate * 100.0
        )?;
        writeln!(
            out,
            "   Mean final day {:.1} | progress {:.1} | suspicion {:.1} | events {:.1}",
            summary.mean_final_day,
            summary.mean_progress,
            summary.mean_suspicion,
            summary.mean_events
        )?;
        let endings: Vec<String> = summary
            .endings
            .iter()
            .map(|(ending, count)| format!("{ending} ×{count}"))
            .collect();
        writeln!(out, "   Endings: {}", endings.join(", "))?;
        writeln!(out)?;
    }

    let failures: Vec<&RunRecord> = records
        .iter()
        .filter(|r| !r.violations.is_empty())
        .collect();
    if !failures.is_empty() {
        writeln!(out, "{}", "⚠️  Violations".bright_yellow().bold())?;
        writeln!(out, "{}", "=============".yellow())?;
        for record in failures {
            for violation in &record.violations {
                writeln!(
                    out,
                    "   • {} seed {}: {}",
                    record.strategy,
                    record.seed,
                    violation.red()
                )?;
            }
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct JsonReport<'a> {
    summaries: &'a [PolicySummary],
    runs: &'a [RunRecord],
}

pub fn generate_json_report(
    out: &mut dyn Write,
    summaries: &[PolicySummary],
    records: &[RunRecord],
) -> Result<()> {
    let report = JsonReport {
        summaries,
        runs: records,
    };
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)?;
    Ok(())
}

pub fn generate_markdown_report(
    out: &mut dyn Write,
    summaries: &[PolicySummary],
    records: &[RunRecord],
) -> Result<()> {
    writeln!(out, "# Moyu Playtest Results\n")?;

    writeln!(out, "## Summary\n")?;
    writeln!(out, "- **Total runs**: {}", records.len())?;
    writeln!(
        out,
        "- **Victories**: {}",
        records.iter().filter(|r| r.victory).count()
    )?;
    writeln!(
        out,
        "- **Runs with violations**: {}\n",
        records.iter().filter(|r| !r.violations.is_empty()).count()
    )?;

    writeln!(out, "## Strategies\n")?;
    writeln!(
        out,
        "| Strategy | Runs | Victory % | Mean day | Mean progress | Mean suspicion | Violations |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|")?;
    for summary in summaries {
        writeln!(
            out,
            "| {} | {} | {:.1} | {:.1} | {:.1} | {:.1} | {} |",
            summary.strategy,
            summary.runs,
            summary.victory_rate * 100.0,
            summary.mean_final_day,
            summary.mean_progress,
            summary.mean_suspicion,
            summary.violations
        )?;
    }
    writeln!(out)?;

    for summary in summaries {
        let status = if summary.passed() { "✅" } else { "❌" };
        writeln!(out, "### {} {}\n", status, summary.strategy)?;
        for (ending, count) in &summary.endings {
            writeln!(out, "- `{ending}`: {count}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
