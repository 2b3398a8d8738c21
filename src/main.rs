//! es-impact CLI
//!
//! Command-line interface for index impact analysis:
//! - Analyze a live cluster or a captured snapshot
//! - Generate a default config file

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use es_impact::{
    analyze_with, generate_default_config, render, Config, ConfigSearch, ElasticsearchClient,
    FileSource, LoggingConfig, OutputFormat, PatternClassifier, ScoreMode, StatsSource,
};

#[derive(Parser)]
#[command(name = "es-impact")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Analyze Elasticsearch index impact for billing")]
#[command(long_about = "Groups rolled-over indices into log groups and scores each group's share of\ncluster storage and heap, to apportion shared cluster cost.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score log groups and print the billing report
    Analyze(AnalyzeArgs),

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Elasticsearch host
    #[arg(long)]
    pub host: Option<String>,

    /// Elasticsearch port
    #[arg(long)]
    pub port: Option<u16>,

    /// Username for basic auth
    #[arg(long)]
    pub user: Option<String>,

    /// Password for basic auth
    #[arg(long)]
    pub password: Option<String>,

    /// Use HTTPS
    #[arg(long)]
    pub ssl: bool,

    /// Skip TLS certificate verification (HTTPS only)
    #[arg(long)]
    pub insecure: bool,

    /// Read stats.json, settings.json and nodes.json from a directory instead of a cluster
    #[arg(long)]
    pub input_dir: Option<PathBuf>,

    /// Output JSON
    #[arg(long)]
    pub json: bool,

    /// Write output to a file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Show only top consumers
    #[arg(long)]
    pub top: Option<usize>,

    /// Regex for grouping indices; must contain a (?P<log_name>...) capture group
    #[arg(long)]
    pub index_pattern: Option<String>,

    /// Scoring mode: normalized (cluster capacity) or weighted
    #[arg(long)]
    pub score_mode: Option<ScoreMode>,

    /// Monthly cluster cost to apportion across groups
    #[arg(long)]
    pub total_cost: Option<f64>,

    /// Weight for storage in GB (weighted mode only)
    #[arg(long)]
    pub weight_storage: Option<f64>,

    /// Weight for shard count (weighted mode only)
    #[arg(long)]
    pub weight_shards: Option<f64>,

    /// Weight for segment count (weighted mode only)
    #[arg(long)]
    pub weight_segments: Option<f64>,

    /// Weight for fielddata in MB (weighted mode only)
    #[arg(long)]
    pub weight_fielddata: Option<f64>,

    /// Weight for query cache in MB (weighted mode only)
    #[arg(long)]
    pub weight_query_cache: Option<f64>,
}

impl AnalyzeArgs {
    /// Layer command line flags over the loaded configuration
    fn apply(&self, config: &mut Config) {
        let cluster = &mut config.cluster;
        if let Some(host) = &self.host {
            cluster.host = host.clone();
        }
        if let Some(port) = self.port {
            cluster.port = port;
        }
        if self.user.is_some() {
            cluster.user = self.user.clone();
        }
        if self.password.is_some() {
            cluster.password = self.password.clone();
        }
        cluster.ssl |= self.ssl;
        cluster.insecure |= self.insecure;

        let scoring = &mut config.scoring;
        if let Some(mode) = self.score_mode {
            scoring.mode = mode;
        }
        if let Some(pattern) = &self.index_pattern {
            scoring.index_pattern = pattern.clone();
        }
        if self.top.is_some() {
            scoring.top = self.top;
        }
        if self.total_cost.is_some() {
            scoring.total_cost = self.total_cost;
        }

        let weights = &mut scoring.weights;
        if let Some(w) = self.weight_storage {
            weights.storage_gb = w;
        }
        if let Some(w) = self.weight_shards {
            weights.shard_count = w;
        }
        if let Some(w) = self.weight_segments {
            weights.segment_count = w;
        }
        if let Some(w) = self.weight_fielddata {
            weights.fielddata_mb = w;
        }
        if let Some(w) = self.weight_query_cache {
            weights.query_cache_mb = w;
        }

        if self.json {
            config.output.format = OutputFormat::Json;
        }
        if self.output.is_some() {
            config.output.path = self.output.clone();
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The configured subscriber needs the config; warnings raised while
    // loading it go through a plain stderr subscriber.
    let bootstrap = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
        .with_writer(std::io::stderr)
        .finish();
    let loaded = tracing::subscriber::with_default(bootstrap, || match &cli.config {
        Some(path) => Config::load_with_env(path).map(|config| ConfigSearch {
            config,
            source: Some(path.clone()),
            failures: Vec::new(),
        }),
        None => Ok(Config::load_default()),
    });

    let search = match loaded {
        Ok(search) => search,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Analyze(args) => run_analyze(args, search).await,
        Commands::Config { output } => write_config(output),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "Run failed");
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run_analyze(args: AnalyzeArgs, search: ConfigSearch) -> anyhow::Result<()> {
    let mut config = search.config.clone();
    args.apply(&mut config);
    init_logging(&config.logging);

    tracing::info!("es-impact v{}", env!("CARGO_PKG_VERSION"));
    search.log();

    if config.cluster.user.is_some() != config.cluster.password.is_some() {
        eprintln!("Both --user and --password are required for basic auth.");
        std::process::exit(2);
    }

    let options = config.scoring.to_analysis_options();
    let classifier = PatternClassifier::new(&config.scoring.index_pattern)
        .context("Invalid --index-pattern")?;

    let source: Box<dyn StatsSource> = match &args.input_dir {
        Some(dir) => Box::new(FileSource::new(dir)),
        None => Box::new(ElasticsearchClient::new(config.cluster.to_client_config())?),
    };

    let require_nodes = options.scoring.mode == ScoreMode::Normalized;
    let payloads = source
        .fetch_all(require_nodes)
        .await
        .with_context(|| format!("Failed to fetch data from {}", source.describe()))?;

    let analysis = analyze_with(&payloads, &classifier, &options.scoring)?;

    if !analysis.unmatched.is_empty() {
        tracing::info!(
            "Skipped {} indices that do not match pattern {}",
            analysis.unmatched.len(),
            classifier.pattern()
        );
    }

    let rendered = render(&analysis, config.output.format)?;

    match &config.output.path {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write report to {:?}", path))?;
            let label = match config.output.format {
                OutputFormat::Json => "JSON report",
                OutputFormat::Table => "report",
            };
            tracing::info!("Wrote {} to {:?}", label, path);
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn write_config(output: Option<PathBuf>) -> anyhow::Result<()> {
    let config = generate_default_config();

    match output {
        Some(path) => {
            // Create parent directory if needed
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, &config)?;
            println!("Config written to {:?}", path);
        }
        None => {
            print!("{}", config);
        }
    }

    Ok(())
}

/// Install the tracing subscriber; logs go to stderr so stdout carries only the report
fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("es_impact={}", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
