use std::path::Path;

use ignore::WalkBuilder;
use tokio::sync::mpsc;
use tracing::debug;

use crate::classifier::{self, Decision, OS_NOISE_NAMES};
use crate::error_record::ErrorRecord;
use crate::job::Job;
use crate::metrics::Metrics;
use crate::skip::{SkipCategory, SkipRecord};
use crate::worker_pool::WorkerPoolOptions;

/// Walks `opts.input_dir`, applies exclusion and preflight classification,
/// and enqueues jobs (§4.5). Runs to completion before the worker pool
/// starts draining the queue ("Run Dispatcher synchronously", §4.6 step 6),
/// so it uses `try_send` directly rather than awaiting backpressure.
///
/// `job_tx` is dropped only when this function returns, which is also the
/// point at which the caller may safely close the queue; keeping our own
/// clone alive for the whole walk guarantees a `QUEUE_FULL` push here can
/// never race a collector that already saw every worker's sender drop
/// (SPEC_FULL §12, the §9 "Open Questions" QUEUE_FULL note).
pub fn dispatch(
    opts: &WorkerPoolOptions,
    metrics: &Metrics,
    last_run: u64,
    job_tx: mpsc::Sender<Job>,
    skip_tx: mpsc::Sender<SkipRecord>,
    error_tx: mpsc::Sender<ErrorRecord>,
) {
    let input_dir = opts.input_dir.clone();
    let mut builder = WalkBuilder::new(&input_dir);
    if let Some(exclude_dir) = opts.exclude_dir.clone() {
        // Prune the excluded subtree at the walker level: the excluded
        // directory itself still passes through once (and is reported
        // below), but nothing beneath it is ever yielded, so descendants
        // are never silently dropped from accounting (§4.5 "do not descend
        // further if directory").
        builder.filter_entry(move |entry| {
            let path = entry.path();
            !path.starts_with(&exclude_dir) || path == exclude_dir
        });
    }
    let walker = builder.build();

    for entry in walker {
        if opts.cancellation.is_cancelled() {
            debug!("dispatcher observed cancellation, stopping traversal");
            break;
        }

        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                let _ = error_tx.try_send(ErrorRecord::new(
                    input_dir.clone(),
                    format!("traversal error: {err}"),
                ));
                continue;
            }
        };

        let path = entry.path();

        if let Some(exclude_dir) = &opts.exclude_dir {
            if path == exclude_dir {
                metrics.incr_skipped();
                let _ = skip_tx.try_send(SkipRecord::new(
                    path.to_path_buf(),
                    opts.input_dir.clone(),
                    opts.output_dir.clone(),
                    SkipCategory::Excluded,
                ));
                continue;
            }
        }

        if is_os_noise(path) {
            metrics.incr_skipped();
            let _ = skip_tx.try_send(SkipRecord::new(
                path.to_path_buf(),
                opts.input_dir.clone(),
                opts.output_dir.clone(),
                SkipCategory::Excluded,
            ));
            continue;
        }

        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            if path != input_dir {
                metrics.incr_directories_processed();
            }
            continue;
        }

        let expected_output =
            classifier::rebase_output_path(path, &opts.input_dir, &opts.output_dir);
        let job = Job::new(path.to_path_buf(), expected_output);

        let mtime = std::fs::metadata(&job.input_path)
            .ok()
            .and_then(|m| m.modified().ok());

        // Preflight: short-circuit the categories that are cheap to decide
        // here, before the job ever reaches a worker (§4.5).
        let preflight = classifier::classify(
            &job,
            &opts.input_dir,
            &opts.output_dir,
            mtime,
            last_run,
            opts.is_production,
            opts.is_force,
        );
        if let Decision::Skip(category @ (SkipCategory::UnsupportedFile | SkipCategory::UnchangedFile)) =
            preflight
        {
            metrics.incr_skipped();
            let _ = skip_tx.try_send(
                SkipRecord::new(
                    job.input_path.clone(),
                    opts.input_dir.clone(),
                    opts.output_dir.clone(),
                    category,
                )
                .with_dest(job.output_path.clone()),
            );
            continue;
        }

        match job_tx.try_send(job) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(job)) => {
                metrics.incr_skipped();
                let _ = skip_tx.try_send(SkipRecord::new(
                    job.input_path,
                    opts.input_dir.clone(),
                    opts.output_dir.clone(),
                    SkipCategory::QueueFull,
                ));
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("job queue closed mid-walk, stopping traversal");
                break;
            }
        }
    }
}

fn is_os_noise(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| OS_NOISE_NAMES.contains(&name))
        .unwrap_or(false)
}
