use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use svs_index::catalog::{search, CatalogRecord, DEFAULT_LANG};
use svs_index::config::{AppConfig, CliConfig, FileConfig};
use svs_index::{
    CatalogReader, Category, HttpShardFetcher, LoadStatus, Manifest, Partition, Singer, Software,
    SqliteCache, SyncEngine,
};
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to a TOML config file, its values override the CLI flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite cache database file.
    #[clap(long, value_parser = parse_path)]
    pub db_path: Option<PathBuf>,

    /// Root URL of the site hosting /data/.
    #[clap(long)]
    pub base_url: Option<String>,

    /// Local manifest file, fetched from the site when omitted.
    #[clap(long, value_parser = parse_path)]
    pub manifest: Option<PathBuf>,

    /// Timeout in seconds for shard requests.
    #[clap(long)]
    pub fetch_timeout_sec: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CategoryArg {
    Singer,
    Software,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Singer => Category::Singer,
            CategoryArg::Software => Category::Software,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Brings the local cache up to date with the manifest.
    Sync,

    /// Lists the records of a category, optionally filtered by a search query.
    List {
        category: CategoryArg,
        #[clap(long)]
        query: Option<String>,
        /// Preferred language for display names.
        #[clap(long, default_value = DEFAULT_LANG)]
        lang: String,
    },

    /// Prints a single record as JSON.
    Show { category: CategoryArg, id: String },

    /// Shows cached record counts and the last synced timestamp of each shard.
    Status,

    /// Removes every cached record and all sync metadata.
    Reset,
}

async fn load_manifest(config: &AppConfig, fetcher: &HttpShardFetcher) -> Manifest {
    match &config.manifest_path {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(content) => Manifest::parse_lenient(&content),
            Err(e) => {
                warn!("Could not read manifest {:?}: {}, nothing will be synced", path, e);
                Manifest::default()
            }
        },
        None => match fetcher.fetch_manifest().await {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!("{}, nothing will be synced", e);
                Manifest::default()
            }
        },
    }
}

fn describe_status(status: &LoadStatus) -> Option<String> {
    match status {
        LoadStatus::Fresh => None,
        LoadStatus::Partial { failed_shards } => Some(format!(
            "partially updated, failed shards: {}",
            failed_shards.join(", ")
        )),
        LoadStatus::Stale { reason } => Some(format!("failed to load: {}", reason)),
    }
}

async fn list_records<R: CatalogRecord>(
    reader: &CatalogReader,
    query: Option<&str>,
    lang: &str,
) -> Result<()> {
    let load = reader.load_category::<R>().await?;
    if let Some(status) = describe_status(&load.status) {
        eprintln!("warning: {} data {}", R::CATEGORY, status);
    }
    for record in search(&load.records, query.unwrap_or("")) {
        println!("{}\t{}", record.id(), record.display_name(lang));
    }
    Ok(())
}

async fn show_record<R: CatalogRecord>(reader: &CatalogReader, id: &str) -> Result<()> {
    let record = reader.get_by_id::<R>(id).await?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

async fn print_status(cache: &SqliteCache) -> Result<()> {
    for category in Category::ALL {
        let written = match cache.last_updated(category).await? {
            Some(secs) => chrono::DateTime::from_timestamp(secs, 0)
                .map(|dt| format!(", last written {}", dt.to_rfc3339()))
                .unwrap_or_default(),
            None => String::new(),
        };
        println!(
            "{}: {} cached records{}",
            category,
            cache.count(category).await?,
            written
        );
        for (file, ts) in cache.shard_timestamps(category).await? {
            let synced = chrono::DateTime::from_timestamp_millis(ts)
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_else(|| ts.to_string());
            println!("  {}\t{}", file, synced);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => Some(FileConfig::load(path)?),
        None => None,
    };
    let cli_config = CliConfig {
        db_path: cli_args.db_path.clone(),
        base_url: cli_args.base_url.clone(),
        manifest_path: cli_args.manifest.clone(),
        fetch_timeout_sec: cli_args.fetch_timeout_sec,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    let cache = Arc::new(SqliteCache::new(&config.db_path));

    match cli_args.command {
        Command::Status => return print_status(&cache).await,
        Command::Reset => {
            for partition in Partition::ALL {
                cache.clear(partition).await?;
            }
            info!("Cache at {:?} cleared", config.db_path);
            return Ok(());
        }
        _ => {}
    }

    let fetcher = Arc::new(
        HttpShardFetcher::new(config.require_base_url()?, config.fetch_timeout_sec)
            .context("Failed to create HTTP client")?,
    );
    let manifest = load_manifest(&config, &fetcher).await;
    let reader = CatalogReader::new(SyncEngine::new(manifest, cache, fetcher));

    match cli_args.command {
        Command::Sync => {
            let engine = reader.engine();
            let (singers, softwares) = tokio::join!(
                engine.ensure_category_updated(Category::Singer),
                engine.ensure_category_updated(Category::Software)
            );
            for report in [singers?, softwares?] {
                println!("{}", report);
                for failure in &report.failed {
                    println!("  {} failed: {}", failure.file, failure.reason);
                }
            }
        }
        Command::List {
            category,
            query,
            lang,
        } => match Category::from(category) {
            Category::Singer => list_records::<Singer>(&reader, query.as_deref(), &lang).await?,
            Category::Software => {
                list_records::<Software>(&reader, query.as_deref(), &lang).await?
            }
        },
        Command::Show { category, id } => match Category::from(category) {
            Category::Singer => show_record::<Singer>(&reader, &id).await?,
            Category::Software => show_record::<Software>(&reader, &id).await?,
        },
        Command::Status | Command::Reset => {}
    }

    Ok(())
}
