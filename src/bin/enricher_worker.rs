//! Runs one enricher against the production database until interrupted.
//!
//! Usage:
//!
//! ```text
//! enricher-worker --config worker.toml open-tree-of-life
//! enricher-worker --config worker.toml dirty-pipeline
//! ```
//!
//! Log verbosity follows `RUST_LOG` and defaults to `info`.

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use emikg_enrichers::{
    config::WorkerConfig,
    dirty_pipeline::{adapters::process::ProcessStageRunner, services::DirtyPipelineEnricher},
    enricher::{
        adapters::postgres::PostgresEnricherRepository, ports::EnrichmentProvider,
        services::{EnricherService, listen_for_shutdown},
    },
    open_tree::{
        adapters::{http::HttpTaxonomyService, postgres::PostgresOpenTreeEntryRepository},
        services::OpenTreeEnricher,
    },
    payload::adapters::postgres::PostgresDataPayloadRepository,
    postgres::{PgPool, build_pool},
    task::{
        adapters::{filesystem::DirectoryDocumentStore, postgres::PostgresTaskRepository},
        services::TaskLifecycleService,
    },
};
use mockable::DefaultClock;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

type Tasks = TaskLifecycleService<PostgresTaskRepository, DirectoryDocumentStore, DefaultClock>;

#[derive(Debug, Parser)]
#[command(name = "enricher-worker", about = "Polls for subjects and runs one enricher")]
struct Cli {
    /// Path to the worker configuration file.
    #[arg(long, short, env = "ENRICHER_CONFIG", default_value = "enricher-worker.toml")]
    config: Utf8PathBuf,

    #[command(subcommand)]
    enricher: EnricherKind,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum EnricherKind {
    /// Resolve taxa against the Open Tree of Life.
    OpenTreeOfLife,
    /// Run the processing pipeline on uploaded payloads.
    DirtyPipeline,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let shutdown = listen_for_shutdown(shutdown_signal());
    let config = WorkerConfig::load(&cli.config)?;
    info!(config = %cli.config, enricher = ?cli.enricher, "starting enricher worker");

    let pool = build_pool(&config.database.url, config.database.pool_size)?;
    let clock = Arc::new(DefaultClock);
    let tasks = TaskLifecycleService::new(
        Arc::new(PostgresTaskRepository::new(pool.clone())),
        Arc::new(DirectoryDocumentStore::open(&config.documents.root)?),
        Arc::clone(&clock),
    );

    match cli.enricher {
        EnricherKind::OpenTreeOfLife => {
            let settings = &config.open_tree_of_life;
            let taxonomy = HttpTaxonomyService::new(
                settings.base_url.clone(),
                settings.approximate_matching,
                Duration::from_secs(settings.request_timeout_secs),
            )?;
            let provider = OpenTreeEnricher::new(
                Arc::new(taxonomy),
                Arc::new(PostgresOpenTreeEntryRepository::new(pool.clone())),
                Arc::clone(&clock),
            )
            .with_start_interval(Duration::from_secs(settings.start_interval_secs));
            serve(Arc::new(provider), &pool, tasks, clock, &config, shutdown).await
        }
        EnricherKind::DirtyPipeline => {
            let settings = &config.dirty_pipeline;
            let runner = settings
                .working_dir
                .clone()
                .map_or_else(ProcessStageRunner::new, |dir| {
                    ProcessStageRunner::new().with_working_dir(dir)
                });
            let provider = DirtyPipelineEnricher::new(
                Arc::new(PostgresDataPayloadRepository::new(pool.clone())),
                tasks.clone(),
                Arc::new(runner),
                Arc::clone(&clock),
                settings.resolved_stages(),
            )
            .await?
            .with_start_interval(Duration::from_secs(settings.start_interval_secs));
            serve(Arc::new(provider), &pool, tasks, clock, &config, shutdown).await
        }
    }
}

async fn serve<P: EnrichmentProvider>(
    provider: Arc<P>,
    pool: &PgPool,
    tasks: Tasks,
    clock: Arc<DefaultClock>,
    config: &WorkerConfig,
    shutdown: impl Future<Output = ()>,
) -> eyre::Result<()> {
    let mut service = EnricherService::register(
        provider,
        Arc::new(PostgresEnricherRepository::new(pool.clone())),
        tasks,
        clock,
        config.start_gate.policy(),
    )
    .await?;
    service
        .start_service(config.backoff.poll_backoff(), shutdown)
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "cannot listen for Ctrl-C, stopping");
    }
    info!("shutdown requested");
}
