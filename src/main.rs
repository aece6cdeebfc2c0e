use assessmatch_api::RestApi;
use assessmatch_core::{TfidfConfig, DEFAULT_MAX_FEATURES, DEFAULT_TOP_N};
use assessmatch_storage::{IndexManager, StorageConfig, DEFAULT_CATALOG_PATH, DEFAULT_INDEX_PATH};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Recommend assessments for a job description
#[derive(Parser, Debug)]
#[command(name = "assessmatch")]
#[command(about = "Match job descriptions against an assessment catalog", long_about = None)]
struct Args {
    /// Catalog CSV used when the index has to be (re)built
    #[arg(short, long, default_value = DEFAULT_CATALOG_PATH)]
    catalog: PathBuf,

    /// Path of the persisted index artifact
    #[arg(short, long, default_value = DEFAULT_INDEX_PATH)]
    index_path: PathBuf,

    /// HTTP API port
    #[arg(long, default_value_t = 5000)]
    http_port: u16,

    /// Vocabulary size cap
    #[arg(long, default_value_t = DEFAULT_MAX_FEATURES)]
    max_features: usize,

    /// Ignore an existing index and fit from the catalog
    #[arg(long)]
    rebuild: bool,

    /// Print recommendations for this job description and exit
    #[arg(short, long)]
    query: Option<String>,

    /// Number of recommendations
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    top_n: usize,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting AssessMatch v{}", env!("CARGO_PKG_VERSION"));
    info!("Catalog: {:?}", args.catalog);
    info!("Index: {:?}", args.index_path);

    let config = StorageConfig {
        catalog_path: args.catalog.clone(),
        index_path: args.index_path.clone(),
        tfidf: TfidfConfig::default().with_max_features(args.max_features),
        force_rebuild: args.rebuild,
    };

    let manager = Arc::new(tokio::task::spawn_blocking(move || IndexManager::open(config)).await??);
    info!("Index ready");

    if let Some(query) = args.query.as_deref() {
        let recommendations = manager.recommend(query, Some(args.top_n))?;
        for (rank, rec) in recommendations.iter().enumerate() {
            println!("\n{}. {}", rank + 1, rec.title);
            println!("   Similarity Score: {:.4}", rec.similarity_score);
            println!("   Job Level: {}", rec.job_level);
            println!("   Duration: {}", rec.duration);
            println!("   Remote Testing: {}", if rec.remote_testing_available { "Yes" } else { "No" });
        }
        return Ok(());
    }

    let manager_http = manager.clone();
    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(manager_http, http_port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("AssessMatch started successfully");
    info!("HTTP API: http://localhost:{}/api/recommend", args.http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}
