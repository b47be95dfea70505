use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use marquee::config::Config;
use marquee::engine::{Recommender, ScorerChoice};
use marquee::error::RecommendError;
use marquee::evaluation::{histogram::DEFAULT_BINS, EvaluationParams, Histogram};
use marquee::posters::tmdb::TmdbPosterClient;
use marquee::posters::traits::{NoopPosterSource, PosterSource};

/// Marquee: "because you liked X" movie recommendations.
///
/// Ranks every movie in a precomputed catalog by similarity to one you
/// name, using embeddings, a similarity matrix, or a weighted blend.
#[derive(Parser)]
#[command(name = "marquee", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend movies similar to a title
    Recommend {
        /// Movie title as it appears in the catalog (case-insensitive)
        title: String,

        /// Number of recommendations (default: MARQUEE_TOP_K or 5)
        #[arg(long)]
        k: Option<usize>,

        /// Scoring strategy (default: MARQUEE_SCORER or embedding)
        #[arg(long, value_enum)]
        scorer: Option<ScorerChoice>,

        /// Look up poster URLs on TMDB (requires TMDB_API_KEY)
        #[arg(long)]
        posters: bool,
    },

    /// Measure genre precision@K over a random sample of the catalog
    Evaluate {
        /// Number of catalog items to sample (default: 500)
        #[arg(long, default_value = "500")]
        sample_size: usize,

        /// Neighbors considered per item (default: 10)
        #[arg(long, default_value = "10")]
        k: usize,

        /// Seed for a reproducible sample
        #[arg(long)]
        seed: Option<u64>,

        /// Scoring strategy (default: MARQUEE_SCORER or embedding)
        #[arg(long, value_enum)]
        scorer: Option<ScorerChoice>,

        /// Print the full report as JSON instead of the summary
        #[arg(long)]
        json: bool,
    },

    /// List catalog titles
    Titles {
        /// Only show titles containing this text (case-insensitive)
        #[arg(long)]
        filter: Option<String>,
    },

    /// Show system status (artifacts, engine state, available scorers)
    Status,

    /// Start the web API server
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "3000")]
        port: u16,

        /// Address to bind to
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("marquee=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Recommend {
            title,
            k,
            scorer,
            posters,
        } => {
            let config = Config::load()?;
            let engine = load_engine(&config)?;
            let k = k.unwrap_or(config.default_top_k);
            let scorer = scorer.unwrap_or(config.default_scorer);

            let movies = match engine.recommend(&title, k, scorer) {
                Ok(movies) => movies,
                Err(RecommendError::TitleNotFound { query }) => {
                    println!("{}", format!("Movie '{query}' not found in database!").red());
                    suggest_titles(&engine, &query);
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            let movies = if posters {
                config.require_tmdb()?;
                let source = poster_source(&config)?;
                marquee::posters::attach_posters(
                    source.as_ref(),
                    movies,
                    marquee::posters::DEFAULT_CONCURRENCY,
                )
                .await
            } else {
                movies
            };

            marquee::output::terminal::display_recommendations(&title, scorer.as_str(), &movies);
        }
        Commands::Evaluate {
            sample_size,
            k,
            seed,
            scorer,
            json,
        } => {
            let config = Config::load()?;
            let engine = load_engine(&config)?;
            let scorer = scorer.unwrap_or(config.default_scorer);
            let params = EvaluationParams {
                sample_size,
                k,
                seed,
            };

            let total = engine
                .catalog()
                .map(|c| sample_size.min(c.len()))
                .unwrap_or(0);
            let pb = ProgressBar::new(total as u64);
            if let Ok(style) =
                ProgressStyle::default_bar().template("  Evaluating [{bar:30}] {pos}/{len} ({eta})")
            {
                pb.set_style(style);
            }

            info!(sample_size, k, scorer = %scorer, "Running genre precision evaluation");
            let report = engine.evaluate_with_progress(&params, scorer, |_| pb.inc(1))?;
            pb.finish_and_clear();

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let histogram = Histogram::from_scores(&report.per_item_scores, DEFAULT_BINS);
                marquee::output::terminal::display_evaluation(&report, &histogram);
            }
        }
        Commands::Titles { filter } => {
            let config = Config::load()?;
            let engine = load_engine(&config)?;
            let needle = filter.map(|f| f.to_lowercase());
            let titles: Vec<(usize, &str)> = engine
                .titles()
                .into_iter()
                .enumerate()
                .filter(|(_, t)| match &needle {
                    Some(n) => t.to_lowercase().contains(n),
                    None => true,
                })
                .collect();
            marquee::output::terminal::display_titles(&titles);
        }
        Commands::Status => {
            let config = Config::load()?;
            let engine = Recommender::load(&config.artifact_dir, &config.engine_options());
            marquee::status::show(&engine, &config.artifact_dir);
        }
        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            let engine = Recommender::load(&config.artifact_dir, &config.engine_options());
            if !engine.is_available() {
                // The server still starts so /health can report the problem.
                eprintln!(
                    "{}",
                    "Warning: artifacts failed to load. Recommendations will return 503.".yellow()
                );
            }
            let posters = poster_source(&config)?;
            marquee::web::run_server(config, engine, posters, port, &bind).await?;
        }
    }

    Ok(())
}

/// Load the engine for a one-shot CLI command. Unlike the server, the CLI
/// has nothing useful to do without artifacts, so unavailability is an error.
fn load_engine(config: &Config) -> Result<Recommender> {
    let engine = Recommender::load(&config.artifact_dir, &config.engine_options());
    if let Some(reason) = engine.status().reason {
        anyhow::bail!(
            "Recommendation engine unavailable: {reason}\n\
             Check MARQUEE_ARTIFACT_DIR (currently {}) or run `marquee status`.",
            config.artifact_dir.display()
        );
    }
    Ok(engine)
}

fn poster_source(config: &Config) -> Result<std::sync::Arc<dyn PosterSource>> {
    if config.tmdb_api_key.is_empty() {
        return Ok(std::sync::Arc::new(NoopPosterSource));
    }
    let client = TmdbPosterClient::new(config.tmdb_api_key.clone(), config.poster_timeout)?;
    Ok(std::sync::Arc::new(client))
}

/// Print a few catalog titles that contain the query, if any.
fn suggest_titles(engine: &Recommender, query: &str) {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return;
    }
    let matches: Vec<&str> = engine
        .titles()
        .into_iter()
        .filter(|t| t.to_lowercase().contains(&needle))
        .take(5)
        .collect();
    if !matches.is_empty() {
        println!("Did you mean:");
        for title in matches {
            println!("  {title}");
        }
    }
}
