use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use social_sentiment::analyzers::{classifier_for, CapitalizedEntityRecognizer};
use social_sentiment::annotate::{AnnotationSettings, Annotator};
use social_sentiment::config::AppConfig;
use social_sentiment::logging::init_logging;
use social_sentiment::metrics::MetricsCollector;
use social_sentiment::models::EntityColumn;
use social_sentiment::pipeline::Pipeline;
use social_sentiment::text::TextNormalizer;
use social_sentiment::validation::InputValidator;
use tracing::{debug, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum PlatformArg {
    Facebook,
    Tweet,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum EntityArg {
    Post,
    Comment,
}

impl From<EntityArg> for EntityColumn {
    fn from(arg: EntityArg) -> Self {
        match arg {
            EntityArg::Post => Self::Post,
            EntityArg::Comment => Self::Comment,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and join a platform export into a flat table
    Ingest {
        /// Export platform
        #[arg(short, long, value_enum)]
        platform: PlatformArg,

        /// Facebook page export (posts)
        #[arg(long, required_if_eq("platform", "facebook"))]
        posts: Option<PathBuf>,

        /// Facebook comment container export
        #[arg(long, required_if_eq("platform", "facebook"))]
        comments: Option<PathBuf>,

        /// Tweet thread export
        #[arg(long, required_if_eq("platform", "tweet"))]
        threads: Option<PathBuf>,

        /// Output CSV; defaults to <output.directory>/<platform>_joined.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Annotate a joined table with sentiment and entities
    Annotate {
        /// Joined CSV produced by `ingest`
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV; defaults to <output.directory>/annotated.csv
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Per-call timeout in milliseconds, overriding configuration
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
    /// Explode one entity column of annotated tables into one row per mention
    SummarizeEntities {
        /// Which entity column to summarize
        #[arg(short, long, value_enum)]
        entity: EntityArg,

        #[command(flatten)]
        sources: SourceArgs,

        /// Output CSV; defaults to <output.directory>/entities_<entity>.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Concatenate annotated tables into one sentiment table
    SummarizeSentiments {
        #[command(flatten)]
        sources: SourceArgs,

        /// Output CSV; defaults to <output.directory>/sentiments.csv
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Annotated CSV files, comma-separated
    #[arg(long, value_delimiter = ',', required = true)]
    info_files: Vec<PathBuf>,

    /// Company tag per file, comma-separated
    #[arg(long, value_delimiter = ',', required = true)]
    companies: Vec<String>,

    /// Channel tag per file, comma-separated
    #[arg(long, value_delimiter = ',', required = true)]
    channels: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = AppConfig::load()?;

    // Initialize logging; the guard flushes the file layer on exit
    let log_file = config.get_log_file().map(PathBuf::from);
    let _guard = init_logging(
        Some(&config.get_log_level()),
        log_file.as_deref(),
        config.logging.format == "json",
    )?;

    MetricsCollector::init()?;

    info!("Starting social-sentiment");

    // Parse command line arguments
    let cli = Cli::parse();

    let pipeline = Pipeline::new(TextNormalizer::new()?);
    let output_dir = Path::new(&config.output.directory);

    // Process command
    match cli.command {
        Commands::Ingest {
            platform,
            posts,
            comments,
            threads,
            output,
        } => {
            let output = resolve_output(output, output_dir, match platform {
                PlatformArg::Facebook => "facebook_joined.csv",
                PlatformArg::Tweet => "tweet_joined.csv",
            })?;
            let rows = match platform {
                PlatformArg::Facebook => {
                    let posts = posts.context("--posts is required for facebook")?;
                    let comments = comments.context("--comments is required for facebook")?;
                    InputValidator::validate_input_file(&posts)?;
                    InputValidator::validate_input_file(&comments)?;
                    pipeline
                        .ingest_facebook(&posts, &comments, &output)
                        .with_context(|| format!("Failed to ingest {}", posts.display()))?
                }
                PlatformArg::Tweet => {
                    let threads = threads.context("--threads is required for tweet")?;
                    InputValidator::validate_input_file(&threads)?;
                    pipeline
                        .ingest_tweet(&threads, &output)
                        .with_context(|| format!("Failed to ingest {}", threads.display()))?
                }
            };
            info!("Wrote {} joined rows to {}", rows, output.display());
        }
        Commands::Annotate {
            input,
            output,
            timeout_ms,
        } => {
            InputValidator::validate_input_file(&input)?;
            let output = resolve_output(output, output_dir, "annotated.csv")?;

            let mut settings = AnnotationSettings::from(&config.annotation);
            if let Some(timeout_ms) = timeout_ms {
                InputValidator::validate_timeout_ms(timeout_ms)?;
                settings.timeout = std::time::Duration::from_millis(timeout_ms);
            }
            debug!(
                timeout_ms = settings.timeout.as_millis(),
                score_preset = ?config.annotation.score_preset,
                "Annotation settings resolved"
            );

            let annotator = Annotator::new(
                classifier_for(config.annotation.score_preset),
                Box::new(CapitalizedEntityRecognizer),
                TextNormalizer::new()?,
                settings,
            );
            let stats = pipeline
                .annotate_file(&annotator, &input, &output)
                .await
                .with_context(|| format!("Failed to annotate {}", input.display()))?;
            info!("Annotated {} rows into {}", stats.rows, output.display());
        }
        Commands::SummarizeEntities { entity, sources, output } => {
            let column = EntityColumn::from(entity);
            let sources = InputValidator::validate_source_lists(&sources.info_files, &sources.companies, &sources.channels)?;
            let output = resolve_output(output, output_dir, match column {
                EntityColumn::Post => "entities_post.csv",
                EntityColumn::Comment => "entities_comment.csv",
            })?;

            let rows = pipeline
                .summarize_entities_to(&sources, column, &output)
                .context("Failed to summarize entities")?;
            info!("Wrote {} entity rows to {}", rows, output.display());
        }
        Commands::SummarizeSentiments { sources, output } => {
            let sources = InputValidator::validate_source_lists(&sources.info_files, &sources.companies, &sources.channels)?;
            let output = resolve_output(output, output_dir, "sentiments.csv")?;

            let rows = pipeline
                .summarize_sentiments_to(&sources, &output)
                .context("Failed to summarize sentiments")?;
            info!("Wrote {} sentiment rows to {}", rows, output.display());
        }
    }

    Ok(())
}

/// Use the explicit output path, or a default file under the configured directory
fn resolve_output(output: Option<PathBuf>, output_dir: &Path, default_name: &str) -> Result<PathBuf> {
    let path = output.unwrap_or_else(|| output_dir.join(default_name));
    InputValidator::validate_file_path(&path)?;
    Ok(path)
}
