use std::path::Path;
use std::sync::Arc;

use eyre::{eyre, WrapErr};
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::cli::Cli;
use crate::config::Config;
use crate::dispatcher;
use crate::env::DEFAULT_JOBS;
use crate::error::Error;
use crate::error_record::ErrorRecord;
use crate::last_run::LastRunStore;
use crate::metrics::Metrics;
use crate::skip::SkipRecord;
use crate::summary::{SummaryEngine, SummaryFormat, SummaryOptions};
use crate::worker_pool::{ExecutionTimes, WorkerPool, WorkerPoolOptions};

const DEFAULT_MARKER: &str = "TEMPO";

/// Resolved, immutable run configuration, derived from CLI flags layered
/// over config-file defaults (§4.6 step 1).
pub struct SyncOptions {
    pub pool: WorkerPoolOptions,
    pub summary: SummaryOptions,
}

/// Top-level orchestrator, the single entry point for one `sync` invocation
/// (§4.6).
pub struct SyncCoordinator;

impl SyncCoordinator {
    pub async fn run(cli: &Cli) -> eyre::Result<String> {
        let config = Config::load(cli.config.as_deref())
            .await
            .wrap_err("failed to read config")?;

        let options = resolve_options(cli, &config)?;

        validate_dirs(&options.pool.input_dir, &options.pool.output_dir)?;

        let working_dir = std::env::current_dir().wrap_err("failed to resolve working directory")?;
        let last_run_store = LastRunStore::new(&working_dir);
        let last_run = last_run_store.read().await;

        let metrics = Arc::new(Metrics::new());
        let pool_opts = Arc::new(options.pool);

        let job_cap = pool_opts.job_queue_capacity();
        let side_cap = pool_opts.side_channel_capacity();

        let (job_tx, job_rx) = mpsc::channel(job_cap);
        let (skip_tx, skip_rx) = mpsc::channel(side_cap);
        let (error_tx, error_rx) = mpsc::channel(side_cap);
        let job_rx = Arc::new(AsyncMutex::new(job_rx));

        // Workers need their own clones of the side-channel senders before
        // the dispatcher's copies move into the blocking task below.
        let worker_skip_tx = skip_tx.clone();
        let worker_error_tx = error_tx.clone();

        let skip_collector = tokio::spawn(collect(skip_rx));
        let error_collector = tokio::spawn(collect(error_rx));

        // Dispatcher walks synchronously (§4.6 step 6); it does blocking
        // filesystem syscalls, so it runs on the blocking pool rather than
        // stalling the async workers. Its sender clones are moved in and
        // dropped when this task completes.
        let dispatch_opts = pool_opts.clone();
        let dispatch_metrics = metrics.clone();
        let dispatch_handle = tokio::task::spawn_blocking(move || {
            dispatcher::dispatch(
                &dispatch_opts,
                &dispatch_metrics,
                last_run,
                job_tx,
                skip_tx,
                error_tx,
            );
        });
        dispatch_handle.await.wrap_err("dispatcher task panicked")?;

        let pool = WorkerPool::new(pool_opts.clone(), metrics.clone(), last_run);
        let execution_times: ExecutionTimes = Arc::new(AsyncMutex::new(Vec::new()));
        let mut join_set = JoinSet::new();

        // The dispatcher's side-channel senders are gone the moment the
        // blocking task above returns; the only remaining senders are each
        // worker's own clone (made from worker_skip_tx/worker_error_tx),
        // dropped when that worker's loop exits. Once every worker has
        // exited, both side channels close on their own and the collectors
        // above return.
        pool.spawn_workers(&mut join_set, job_rx, worker_skip_tx, worker_error_tx, execution_times);

        while join_set.join_next().await.is_some() {}

        let skips: Vec<SkipRecord> = skip_collector.await.wrap_err("skip collector panicked")?;
        let errors: Vec<ErrorRecord> = error_collector.await.wrap_err("error collector panicked")?;

        info!(
            processed = metrics.snapshot().files_processed,
            skipped = skips.len(),
            errors = errors.len(),
            "sync run complete"
        );

        if let Err(e) = last_run_store.write(now_unix_secs()).await {
            return Err(eyre!("failed to persist last-run timestamp: {e}"));
        }

        let snapshot = metrics.snapshot();
        let rendered = SummaryEngine::render(&snapshot, &errors, &skips, &options.summary)
            .await
            .map_err(|e| eyre!(e))?;

        Ok(rendered)
    }
}

async fn collect<T>(mut rx: mpsc::Receiver<T>) -> Vec<T> {
    let mut items = Vec::new();
    while let Some(item) = rx.recv().await {
        items.push(item);
    }
    items
}

fn resolve_options(cli: &Cli, config: &Config) -> eyre::Result<SyncOptions> {
    let input_dir = cli
        .input
        .clone()
        .or_else(|| config.app.assets_dir.clone())
        .ok_or_else(|| eyre!("no input directory given (pass --input or set app.assets_dir)"))?;

    let output_dir = cli
        .output
        .clone()
        .or_else(|| config.app.go_package.clone())
        .ok_or_else(|| eyre!("no output directory given (pass --output or set app.go_package)"))?;

    let num_workers = cli
        .workers
        .or(config.processor.workers)
        .unwrap_or_else(|| DEFAULT_JOBS.get());

    let marker_name = cli
        .marker
        .clone()
        .or_else(|| config.templates.guard_marker.clone())
        .unwrap_or_else(|| DEFAULT_MARKER.to_string());

    let format_str = cli
        .summary
        .clone()
        .or_else(|| config.processor.summary_format.clone())
        .unwrap_or_else(|| "compact".to_string());
    let format: SummaryFormat = format_str.parse().map_err(|e: String| eyre!(e))?;

    let pool = WorkerPoolOptions {
        input_dir,
        output_dir,
        exclude_dir: cli.exclude.clone(),
        marker_name,
        num_workers,
        is_production: cli.prod,
        is_force: cli.force,
        track_execution_time: cli.track_time,
        dry_run: cli.dry_run,
        cancellation: CancellationToken::new(),
    };

    let summary = SummaryOptions {
        format,
        verbose: cli.verbose,
        report_file: cli.report_file.clone(),
    };

    Ok(SyncOptions { pool, summary })
}

fn validate_dirs(input_dir: &Path, output_dir: &Path) -> Result<(), Error> {
    if !input_dir.is_dir() || !output_dir.is_dir() {
        return Err(Error::MissingDir {
            input_dir: input_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
        });
    }
    Ok(())
}

fn now_unix_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
