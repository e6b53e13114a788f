use battle_advisor::advisor::{MoveAdvisor, MoveRanking};
use battle_advisor::classifier::LogisticClassifier;
use battle_advisor::config::AdvisorConfig;
use battle_advisor::dataset::recorder::DatasetRecorder;
use battle_advisor::dataset::{generate_dataset, Roster, Scenario};
use battle_advisor::error::Result;
use battle_advisor::feature_builder::FeatureVectorBuilder;
use battle_advisor::inspect::describe_pipeline;
use battle_advisor::sources::JsonDataSource;
use battle_advisor::state::{ProfileId, Side};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "battle-advisor")]
#[command(about = "Simulate matchups, build training data and rank attack moves", long_about = None)]
struct Cli {
    /// Debug level logging unless RUST_LOG is set
    #[arg(long, short, global = true)]
    verbose: bool,

    /// JSON config file; flags override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a labeled dataset and fit the feature pipeline on it
    Generate {
        /// Directory with profiles.json, moves.json and optionally type_chart.json
        #[arg(long)]
        data_dir: PathBuf,

        #[arg(long)]
        out_dir: PathBuf,

        /// best_move, random_move, all_combinations or all
        #[arg(long)]
        scenario: Option<Scenario>,

        #[arg(long)]
        seed: Option<u64>,

        /// Process pairs on a single thread
        #[arg(long)]
        sequential: bool,
    },

    /// Rank candidate moves of one profile against another
    Rank {
        #[arg(long)]
        data_dir: PathBuf,

        /// Fitted pipeline.json
        #[arg(long)]
        pipeline: PathBuf,

        /// Logistic model JSON
        #[arg(long)]
        model: PathBuf,

        #[arg(long)]
        attacker: ProfileId,

        #[arg(long)]
        defender: ProfileId,

        /// Comma separated; defaults to every valid move of the attacker
        #[arg(long, value_delimiter = ',')]
        moves: Vec<String>,

        /// Comma separated; defaults to the defender's best move
        #[arg(long, value_delimiter = ',')]
        opponent_moves: Vec<String>,
    },

    /// Print the column schema of a fitted pipeline
    Inspect {
        #[arg(long)]
        pipeline: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AdvisorConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate {
            data_dir,
            out_dir,
            scenario,
            seed,
            sequential,
        } => {
            if let Some(scenario) = scenario {
                config.generation.scenario = scenario;
            }
            if let Some(seed) = seed {
                config.generation.seed = seed;
            }
            if sequential {
                config.generation.parallel = false;
            }

            let source = JsonDataSource::from_dir(&data_dir)?;
            let roster =
                Roster::load(&source, &source, &source, &config.move_filter, config.level)?;
            let dataset = generate_dataset(&roster, &config.generation, None)?;
            let builder = dataset.fit_builder()?;

            let recorder = DatasetRecorder::new(&out_dir)?;
            let manifest = recorder.record(&dataset, &config.generation, &builder)?;

            println!("{}", "Dataset written".green().bold());
            println!("   Output:   {}", out_dir.display());
            println!("   Scenario: {}", manifest.scenario);
            println!(
                "   Samples:  {} ({} train / {} test)",
                manifest.report.samples, manifest.report.train, manifest.report.test
            );
            println!("   Columns:  {}", manifest.feature_columns.len());
            if manifest.report.pairs_skipped_no_moves > 0 {
                println!(
                    "   {} {} pairs skipped, a side had no valid move",
                    "warning:".yellow(),
                    manifest.report.pairs_skipped_no_moves
                );
            }
        }

        Commands::Rank {
            data_dir,
            pipeline,
            model,
            attacker,
            defender,
            moves,
            opponent_moves,
        } => {
            let source = Arc::new(JsonDataSource::from_dir(&data_dir)?);
            let builder = FeatureVectorBuilder::load(&pipeline)?;
            let classifier = Arc::new(LogisticClassifier::load(&model)?);
            let advisor = MoveAdvisor::new(
                source.clone(),
                source.clone(),
                &*source,
                builder,
                classifier,
                &config,
            )?;

            let candidates = if moves.is_empty() {
                default_candidates(&source, attacker, &config)?
            } else {
                moves
            };
            let opponents = if opponent_moves.is_empty() {
                None
            } else {
                Some(opponent_moves.as_slice())
            };

            let ranking = advisor.rank_moves(attacker, defender, &candidates, opponents)?;
            print_ranking(&ranking);
        }

        Commands::Inspect { pipeline } => {
            let builder = FeatureVectorBuilder::load(&pipeline)?;
            print!("{}", describe_pipeline(builder.pipeline()?));
        }
    }

    Ok(())
}

fn default_candidates(
    source: &JsonDataSource,
    attacker: ProfileId,
    config: &AdvisorConfig,
) -> Result<Vec<String>> {
    use battle_advisor::move_selector::get_all_valid_moves;
    use battle_advisor::sources::MoveCatalogue;

    let moves = source.get_moves_for_profile(attacker)?;
    Ok(get_all_valid_moves(&moves, &config.move_filter)
        .into_iter()
        .map(|m| m.name)
        .collect())
}

fn print_ranking(ranking: &MoveRanking) {
    println!(
        "{} {} vs {}",
        "Ranking".bold(),
        ranking.attacker,
        ranking.defender
    );
    println!(
        "{:<4}{:<24}{:>8}{:>8}{:>6}{:>10}{:>8}  {}",
        "#", "move", "power", "mult", "stab", "score", "p(win)", "winner"
    );
    for (idx, ranked) in ranking.moves.iter().enumerate() {
        let winner = match ranked.predicted_winner {
            Side::A => "attacker".green(),
            Side::B => "defender".red(),
        };
        let line = format!(
            "{:<4}{:<24}{:>8.1}{:>8.2}{:>6.1}{:>10.1}{:>8.3}",
            idx + 1,
            ranked.move_name,
            ranked.effective_power,
            ranked.type_multiplier,
            ranked.stab,
            ranked.score,
            ranked.win_probability
        );
        if idx == 0 {
            println!("{}  {}", line.bold(), winner);
        } else {
            println!("{}  {}", line, winner);
        }
    }
    println!(
        "\n{} {} (p(win) = {:.3})",
        "Recommended:".cyan().bold(),
        ranking.recommended_move,
        ranking.win_probability
    );
}
