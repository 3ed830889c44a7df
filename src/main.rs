use anyhow::{Context, Result};
use boxoffice_etl::analytics::MovieAnalytics;
use boxoffice_etl::config::{AppConfig, CliConfig, FileConfig};
use boxoffice_etl::ingest::{load_movies, MalformedPolicy};
use boxoffice_etl::movie_store::SqliteMovieStore;
use boxoffice_etl::report::{Report, ReportFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(version, about = "Movie CSV ingestion and box-office reporting over SQLite")]
struct CliArgs {
    /// Path to an optional TOML config file. Its values override CLI flags.
    #[clap(long, global = true, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a movie CSV, normalize it, and rebuild the classified table.
    Ingest {
        /// Path to the source movie CSV.
        #[clap(value_parser = parse_path)]
        csv: PathBuf,

        /// Path to the SQLite database file.
        #[clap(value_parser = parse_path)]
        db: PathBuf,

        /// Name of the canonical movie table.
        #[clap(long, default_value = "movies")]
        table: String,

        /// What to do with records whose date or currency fields fail to
        /// parse: degrade the field to NULL, or abort the run.
        #[clap(long, value_enum, default_value = "coerce")]
        on_malformed: MalformedPolicy,
    },
    /// Run the read-only aggregate suite against an ingested database.
    Report {
        /// Path to the SQLite database file.
        #[clap(value_parser = parse_path)]
        db: PathBuf,

        /// Name of the canonical movie table.
        #[clap(long, default_value = "movies")]
        table: String,

        /// How many genres the revenue-by-genre aggregate keeps.
        #[clap(long, default_value_t = 10)]
        top_genres: usize,

        #[clap(long, value_enum, default_value = "table")]
        format: ReportFormat,
    },
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    let file_config = cli_args
        .config
        .as_deref()
        .map(FileConfig::load)
        .transpose()?;

    match cli_args.command {
        Command::Ingest {
            csv,
            db,
            table,
            on_malformed,
        } => {
            let cli = CliConfig {
                csv_path: Some(csv),
                db_path: db,
                table,
                on_malformed,
                top_genres: 10,
            };
            run_ingest(&AppConfig::resolve(&cli, file_config)?)
        }
        Command::Report {
            db,
            table,
            top_genres,
            format,
        } => {
            let cli = CliConfig {
                csv_path: None,
                db_path: db,
                table,
                on_malformed: MalformedPolicy::Coerce,
                top_genres,
            };
            run_report(&AppConfig::resolve(&cli, file_config)?, format)
        }
    }
}

fn run_ingest(config: &AppConfig) -> Result<()> {
    let csv_path = config
        .csv_path
        .as_ref()
        .context("A CSV path must be given on the CLI or in the config file")?;

    info!("Loading movie records from {:?}...", csv_path);
    let (movies, summary) = load_movies(csv_path, config.on_malformed)?;
    if summary.malformed_fields() > 0 {
        warn!(
            dates = summary.malformed_dates,
            budgets = summary.malformed_budgets,
            revenues = summary.malformed_revenues,
            "some fields failed to parse and were stored as missing"
        );
    }

    info!("Opening movie store at {:?}...", config.db_path);
    let store = SqliteMovieStore::open(&config.db_path)?;
    store.replace_all(&config.table, &movies)?;
    let classified = store.reclassify(&config.table)?;

    info!(
        rows_read = summary.rows_read,
        classified, "ingestion complete"
    );
    Ok(())
}

fn run_report(config: &AppConfig, format: ReportFormat) -> Result<()> {
    let store = SqliteMovieStore::open(&config.db_path)?;
    let analytics = MovieAnalytics::new(&store, &config.table)?;
    let report = Report::gather(&analytics, config.top_genres)?;
    print!("{}", report.render(format)?);
    Ok(())
}
