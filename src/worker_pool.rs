use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::classifier::{self, Decision};
use crate::error_record::ErrorRecord;
use crate::job::Job;
use crate::metrics::Metrics;
use crate::skip::SkipRecord;
use crate::splicer;
use crate::transformer::Transformer;

/// Immutable configuration for one `sync` run (§3 "WorkerPoolOptions").
#[derive(Debug, Clone)]
pub struct WorkerPoolOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub exclude_dir: Option<PathBuf>,
    pub marker_name: String,
    pub num_workers: usize,
    pub is_production: bool,
    pub is_force: bool,
    pub track_execution_time: bool,
    /// Supplementary flag (SPEC_FULL §11): runs classification/transform
    /// normally but skips the splicer's final write.
    pub dry_run: bool,
    pub cancellation: CancellationToken,
}

impl WorkerPoolOptions {
    /// Job queue capacity: N * 50, the pressure valve named in §5.
    pub fn job_queue_capacity(&self) -> usize {
        self.num_workers.max(1) * 50
    }

    /// Error/skip channel capacity: N, "modest; in realistic runs errors are
    /// rare" (§5).
    pub fn side_channel_capacity(&self) -> usize {
        self.num_workers.max(1)
    }
}

/// `(path, duration)` samples recorded when `track_execution_time` is set,
/// guarded by its own mutex and only read after worker join (§4.4, §5).
pub type ExecutionTimes = Arc<AsyncMutex<Vec<(PathBuf, Duration)>>>;

/// Fixed-size pool of N workers draining the bounded job queue (§4.4).
pub struct WorkerPool {
    opts: Arc<WorkerPoolOptions>,
    metrics: Arc<Metrics>,
    last_run: u64,
}

impl WorkerPool {
    pub fn new(opts: Arc<WorkerPoolOptions>, metrics: Arc<Metrics>, last_run: u64) -> Self {
        Self {
            opts,
            metrics,
            last_run,
        }
    }

    /// Spawns `num_workers` worker tasks onto `join_set`, each draining
    /// `job_rx` (shared behind a mutex: tokio's mpsc receiver has a single
    /// owner, so workers take turns locking it to pull the next job) until
    /// the queue is closed or cancellation fires.
    #[allow(clippy::too_many_arguments)]
    pub fn spawn_workers(
        &self,
        join_set: &mut JoinSet<()>,
        job_rx: Arc<AsyncMutex<mpsc::Receiver<Job>>>,
        skip_tx: mpsc::Sender<SkipRecord>,
        error_tx: mpsc::Sender<ErrorRecord>,
        execution_times: ExecutionTimes,
    ) {
        for worker_id in 0..self.opts.num_workers.max(1) {
            let opts = self.opts.clone();
            let metrics = self.metrics.clone();
            let last_run = self.last_run;
            let job_rx = job_rx.clone();
            let skip_tx = skip_tx.clone();
            let error_tx = error_tx.clone();
            let execution_times = execution_times.clone();

            join_set.spawn(async move {
                worker_loop(
                    worker_id,
                    opts,
                    metrics,
                    last_run,
                    job_rx,
                    skip_tx,
                    error_tx,
                    execution_times,
                )
                .await;
            });
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn worker_loop(
    worker_id: usize,
    opts: Arc<WorkerPoolOptions>,
    metrics: Arc<Metrics>,
    last_run: u64,
    job_rx: Arc<AsyncMutex<mpsc::Receiver<Job>>>,
    skip_tx: mpsc::Sender<SkipRecord>,
    error_tx: mpsc::Sender<ErrorRecord>,
    execution_times: ExecutionTimes,
) {
    loop {
        if opts.cancellation.is_cancelled() {
            debug!(worker_id, "cancellation observed, exiting without draining");
            return;
        }

        let job = {
            let mut rx = job_rx.lock().await;
            rx.recv().await
        };
        let Some(job) = job else {
            // Queue closed and drained: normal shutdown.
            return;
        };

        process_job(&job, &opts, &metrics, last_run, &skip_tx, &error_tx, &execution_times).await;
    }
}

async fn process_job(
    job: &Job,
    opts: &WorkerPoolOptions,
    metrics: &Metrics,
    last_run: u64,
    skip_tx: &mpsc::Sender<SkipRecord>,
    error_tx: &mpsc::Sender<ErrorRecord>,
    execution_times: &ExecutionTimes,
) {
    let started_at = Instant::now();

    let mtime = tokio::fs::metadata(&job.input_path)
        .await
        .ok()
        .and_then(|m| m.modified().ok());

    let decision = classifier::classify(
        job,
        &opts.input_dir,
        &opts.output_dir,
        mtime,
        last_run,
        opts.is_production,
        opts.is_force,
    );

    let category = match decision {
        Decision::Skip(category) => Some(category),
        Decision::Process => None,
    };

    if let Some(category) = category {
        metrics.incr_skipped();
        let record = SkipRecord::new(
            job.input_path.clone(),
            opts.input_dir.clone(),
            opts.output_dir.clone(),
            category,
        )
        .with_dest(job.output_path.clone());
        // Non-blocking: drop on a closed/full channel rather than stall a
        // worker (§4.4 "Concurrency contract").
        let _ = skip_tx.try_send(record);
        return;
    }

    let extension = job
        .input_path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let result = run_transform_and_splice(job, opts, &extension).await;

    match result {
        Ok(()) => {
            metrics.incr_files_processed();
        }
        Err(message) => {
            metrics.incr_errors();
            let _ = error_tx.try_send(ErrorRecord::new(job.input_path.clone(), message));
        }
    }

    if opts.track_execution_time {
        let elapsed = started_at.elapsed();
        trace!(path = %job.input_path.display(), ?elapsed, "processed");
        println!("{} ({:.3}s)", job.input_path.display(), elapsed.as_secs_f64());
        execution_times
            .lock()
            .await
            .push((job.input_path.clone(), elapsed));
    }
}

async fn run_transform_and_splice(
    job: &Job,
    opts: &WorkerPoolOptions,
    extension: &str,
) -> Result<(), String> {
    let raw = tokio::fs::read(&job.input_path)
        .await
        .map_err(|e| format!("failed to read {}: {e}", job.input_path.display()))?;

    let transformer = Transformer::select(opts.is_production, extension);
    let transformed = transformer
        .transform(&raw, extension)
        .await
        .map_err(|e| e.to_string())?;

    if opts.dry_run {
        return Ok(());
    }

    splicer::splice(&job.output_path, &transformed, &opts.marker_name)
        .await
        .map_err(|e| e.to_string())
}
