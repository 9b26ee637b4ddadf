mod logic;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use moyu_game::{BundledData, DataLoader, Difficulty, GameEngine, Rules};

use logic::{GameplayStrategy, RunRecord, resolve_seed_inputs, run_batch, split_csv, summarize};

#[derive(Debug, Parser)]
#[command(name = "moyu-tester", version)]
#[command(about = "Automated playtests for Moyu - scripted policies through full seeded campaigns")]
struct Args {
    /// Policies to run (comma-separated, or `all`)
    #[arg(long, default_value = "balanced")]
    policies: String,

    /// List all available policies and exit
    #[arg(long)]
    list_policies: bool,

    /// Seeds to run (comma-separated, decimal or 0x hex, or `all`)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Consecutive seeds played per listed seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Difficulty grading the deadline
    #[arg(long, default_value = "normal")]
    #[arg(value_parser = ["easy", "normal", "hard"])]
    difficulty: String,

    /// Optional JSON file overriding the default balance rules
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_policies(&args)? {
        return Ok(());
    }

    announce_banner();

    let start_time = Instant::now();
    let strategies = expand_policies(&args.policies)?;
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;
    let difficulty: Difficulty = args
        .difficulty
        .parse()
        .map_err(|err: String| anyhow::anyhow!(err))?;
    let engine = build_engine(args.rules.as_deref())?;

    if args.verbose {
        println!(
            "▶️  {} policies × {} seeds × {} iterations on {}",
            strategies.len(),
            seeds.len(),
            args.iterations,
            difficulty
        );
    }

    let records = run_batch(&engine, &strategies, &seeds, args.iterations, difficulty)?;
    write_reports(&args, &records, start_time)?;

    if records.iter().any(|record| !record.violations.is_empty()) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_policies(args: &Args) -> Result<bool> {
    if !args.list_policies {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available policies:")?;
    for strategy in GameplayStrategy::ALL {
        writeln!(
            output_target.writer(),
            "  {:12} - {}",
            strategy.key(),
            strategy.description()
        )?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🐟 Moyu Automated Tester".bright_cyan().bold());
    println!("{}", "========================".cyan());
}

fn expand_policies(policies_arg: &str) -> Result<Vec<GameplayStrategy>> {
    let mut strategies = Vec::new();
    for token in split_csv(policies_arg) {
        if token.eq_ignore_ascii_case("all") {
            for strategy in GameplayStrategy::ALL {
                if !strategies.contains(strategy) {
                    strategies.push(*strategy);
                }
            }
            continue;
        }
        let Some(strategy) = GameplayStrategy::from_key(&token) else {
            bail!("Unknown policy: {token}");
        };
        if !strategies.contains(&strategy) {
            strategies.push(strategy);
        }
    }
    if strategies.is_empty() {
        strategies.push(GameplayStrategy::Balanced);
    }
    Ok(strategies)
}

fn build_engine(rules_path: Option<&Path>) -> Result<GameEngine> {
    let Some(path) = rules_path else {
        return GameEngine::from_loader(&BundledData);
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let rules =
        Rules::from_json(&json).with_context(|| format!("invalid rules in {}", path.display()))?;
    let data = BundledData.load_game_data()?;
    GameEngine::new(data, rules).context("rules failed validation")
}

fn write_reports(args: &Args, records: &[RunRecord], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let summaries = summarize(records);

    match args.report.as_str() {
        "json" => {
            logic::reports::generate_json_report(&mut output_target, &summaries, records)?;
        }
        "markdown" => {
            logic::reports::generate_markdown_report(&mut output_target, &summaries, records)?;
        }
        _ => {
            let duration = start_time.elapsed();
            if records.is_empty() {
                writeln!(&mut output_target, "No campaigns played.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    &summaries,
                    records,
                    duration,
                )?;
            }
            writeln!(&mut output_target, "🏁 Total time: {duration:?}")?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
