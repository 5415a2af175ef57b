use std::path::PathBuf;

use clap::{Parser, Subcommand};

use schnapsen_lab::config::LabConfig;
use schnapsen_lab::logging::init_logging;
use schnapsen_lab::matchup::run_matchup;
use schnapsen_lab::replay::ReplayRunner;
use schnapsen_lab::training::TrainingRunner;
use schnapsen_ml::dataset::StrategyIdentity;

/// Replay-generation and strategy-identification harness for Schnapsen bots.
#[derive(Debug, Parser)]
#[command(
    name = "schnapsen-lab",
    author,
    version,
    about = "Deterministic Schnapsen replay and classification harness"
)]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "lab/lab.yaml")]
    config: PathBuf,

    /// Override the run identifier (substitutes {run_id} templates).
    #[arg(long, value_name = "RUN_ID")]
    run_id: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Simulate games and append one observation log per target.
    Generate {
        /// Override the number of games per target.
        #[arg(long, value_name = "GAMES")]
        games: Option<usize>,

        /// Override the base RNG seed for game simulation.
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,

        /// Delete pre-existing logs before simulating.
        #[arg(long)]
        overwrite: bool,
    },
    /// Assemble the logs, fit the classifier, evaluate, and persist it.
    Train {
        /// Override the neighbor count.
        #[arg(long, value_name = "K")]
        k: Option<usize>,

        /// Override the holdout fraction.
        #[arg(long, value_name = "FRACTION")]
        holdout: Option<f64>,

        /// Override the split shuffle seed.
        #[arg(long, value_name = "SEED")]
        shuffle_seed: Option<u64>,
    },
    /// Play two strategies head to head and test the win-rate difference.
    Matchup {
        /// Strategy taking the first seat (random, bully, rdeep, chaser).
        first: StrategyIdentity,

        /// Strategy taking the second seat.
        second: StrategyIdentity,

        /// Number of games to play.
        #[arg(long, value_name = "GAMES", default_value_t = 200)]
        games: usize,

        /// Base RNG seed.
        #[arg(long, value_name = "SEED", default_value_t = 1)]
        seed: u64,
    },
    /// Exit after validating the configuration (nothing is run).
    Validate,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Matchups are self-contained experiments and need no configuration.
    if let Command::Matchup {
        first,
        second,
        games,
        seed,
    } = &cli.command
    {
        let (first, second) = (*first, *second);
        let report = run_matchup(first, second, *games, *seed)?;
        println!(
            "{first} vs {second}: {w1}-{w2} over {games} games ({rate:.1}% for {first})",
            games = report.games,
            w1 = report.first_wins,
            w2 = report.second_wins,
            rate = report.first_win_rate() * 100.0
        );
        println!(
            "Two-sided z-test against a fair coin: z = {:.3}, p = {:.4}",
            report.z_score, report.p_value
        );
        return Ok(());
    }

    let mut config = LabConfig::from_path(&cli.config)?;

    if let Some(run_id) = cli.run_id {
        config.run_id = run_id;
    }

    match &cli.command {
        Command::Generate {
            games,
            seed,
            overwrite,
        } => {
            if let Some(games) = games {
                config.replay.games = *games;
            }
            if let Some(seed) = seed {
                config.replay.seed = Some(*seed);
            }
            if *overwrite {
                config.replay.overwrite = true;
            }
        }
        Command::Train {
            k,
            holdout,
            shuffle_seed,
        } => {
            if let Some(k) = k {
                config.training.k = *k;
            }
            if let Some(holdout) = holdout {
                config.training.holdout_fraction = *holdout;
            }
            if let Some(shuffle_seed) = shuffle_seed {
                config.training.shuffle_seed = *shuffle_seed;
            }
        }
        Command::Matchup { .. } | Command::Validate => {}
    }

    config.validate()?;

    let outputs = config.resolved_outputs();
    let run_id = config.run_id.clone();
    let target_count = config.replay.targets.len();
    let games = config.replay.games;

    println!(
        "Loaded configuration '{run_id}' with {target_count} target{} ({games} games each)",
        if target_count == 1 { "" } else { "s" }
    );

    let _logging_guard = init_logging(&config.logging, &outputs)?;

    match cli.command {
        Command::Generate { .. } => {
            let runner = ReplayRunner::new(config);
            let summary = runner.run()?;
            println!(
                "Replay generation complete for '{run_id}': {} target{} × {} games → {} records",
                summary.targets,
                if summary.targets == 1 { "" } else { "s" },
                summary.games_per_target,
                summary.records_written
            );
            for path in &summary.log_paths {
                println!("Observation log: {}", path.display());
            }
        }
        Command::Train { .. } => {
            let runner = TrainingRunner::new(config);
            let summary = runner.run()?;
            println!(
                "Training complete for '{run_id}': {} train / {} holdout records (dimension {})",
                summary.train_records, summary.holdout_records, summary.dim
            );
            println!(
                "Holdout accuracy: {:.3}",
                summary.evaluation.accuracy()
            );
            println!("Model artifact: {}", summary.model_path.display());
            println!("Summary table: {}", summary.summary_path.display());
            println!("Summary (JSON): {}", summary.summary_json_path.display());
        }
        Command::Validate => {
            println!("Validation-only mode: nothing was run.");
        }
        Command::Matchup { .. } => unreachable!("handled before configuration load"),
    }

    Ok(())
}
