use std::path::{Path, PathBuf};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use tempo_sync::dispatcher;
use tempo_sync::error_record::ErrorRecord;
use tempo_sync::metrics::{Metrics, MetricsSnapshot};
use tempo_sync::skip::{SkipCategory, SkipRecord};
use tempo_sync::splicer::{begin_marker, end_marker};
use tempo_sync::worker_pool::{WorkerPool, WorkerPoolOptions};

const MARKER: &str = "APP";

struct RunOutcome {
    metrics: MetricsSnapshot,
    skips: Vec<SkipRecord>,
    errors: Vec<ErrorRecord>,
}

/// Drives dispatcher + worker pool end to end exactly the way
/// `SyncCoordinator` does, minus the config/CLI/last-run-file plumbing, so
/// scenarios can be built against plain temp directories.
#[allow(clippy::too_many_arguments)]
async fn run_sync(
    input_dir: &Path,
    output_dir: &Path,
    exclude_dir: Option<PathBuf>,
    last_run: u64,
    is_production: bool,
    is_force: bool,
    num_workers: usize,
) -> RunOutcome {
    let opts = Arc::new(WorkerPoolOptions {
        input_dir: input_dir.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        exclude_dir,
        marker_name: MARKER.to_string(),
        num_workers,
        is_production,
        is_force,
        track_execution_time: false,
        dry_run: false,
        cancellation: CancellationToken::new(),
    });
    let metrics = Arc::new(Metrics::new());

    let job_cap = opts.job_queue_capacity();
    let side_cap = opts.side_channel_capacity().max(8);
    let (job_tx, job_rx) = mpsc::channel(job_cap);
    let (skip_tx, skip_rx) = mpsc::channel(side_cap);
    let (error_tx, error_rx) = mpsc::channel(side_cap);
    let job_rx = Arc::new(AsyncMutex::new(job_rx));

    let worker_skip_tx = skip_tx.clone();
    let worker_error_tx = error_tx.clone();

    let skip_collector = tokio::spawn(collect(skip_rx));
    let error_collector = tokio::spawn(collect(error_rx));

    let dispatch_opts = opts.clone();
    let dispatch_metrics = metrics.clone();
    tokio::task::spawn_blocking(move || {
        dispatcher::dispatch(&dispatch_opts, &dispatch_metrics, last_run, job_tx, skip_tx, error_tx);
    })
    .await
    .unwrap();

    let pool = WorkerPool::new(opts, metrics.clone(), last_run);
    let mut join_set = JoinSet::new();
    pool.spawn_workers(
        &mut join_set,
        job_rx,
        worker_skip_tx,
        worker_error_tx,
        Arc::new(AsyncMutex::new(Vec::new())),
    );
    while join_set.join_next().await.is_some() {}

    let skips = skip_collector.await.unwrap();
    let errors = error_collector.await.unwrap();

    RunOutcome {
        metrics: metrics.snapshot(),
        skips,
        errors,
    }
}

async fn collect<T>(mut rx: mpsc::Receiver<T>) -> Vec<T> {
    let mut items = Vec::new();
    while let Some(item) = rx.recv().await {
        items.push(item);
    }
    items
}

fn marked_template(body: &str) -> String {
    format!("{}\n{}\n{}\n", begin_marker(MARKER), body, end_marker(MARKER))
}

async fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.unwrap();
    }
    tokio::fs::write(path, contents).await.unwrap();
}

#[tokio::test]
async fn basic_sync_splices_the_single_asset() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    write_file(&input.path().join("a.css"), "body{color:red}").await;
    write_file(&output.path().join("a.templ"), &marked_template("old")).await;

    let outcome = run_sync(input.path(), output.path(), None, 0, false, false, 2).await;

    assert_eq!(outcome.metrics.files_processed, 1);
    assert_eq!(outcome.metrics.skipped_files, 0);
    assert_eq!(outcome.metrics.errors_encountered, 0);

    let result = tokio::fs::read_to_string(output.path().join("a.templ")).await.unwrap();
    assert!(result.contains("body{color:red}"));
}

#[tokio::test]
async fn unchanged_gate_skips_when_last_run_is_in_the_future() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    write_file(&input.path().join("a.css"), "body{color:red}").await;
    let templ_path = output.path().join("a.templ");
    write_file(&templ_path, &marked_template("old")).await;

    let far_future = u64::MAX / 2;
    let outcome = run_sync(input.path(), output.path(), None, far_future, false, false, 2).await;

    assert_eq!(outcome.metrics.files_processed, 0);
    assert_eq!(outcome.metrics.skipped_files, 1);
    assert_eq!(outcome.skips[0].category, SkipCategory::UnchangedFile);

    let result = tokio::fs::read_to_string(&templ_path).await.unwrap();
    assert!(result.contains("old"));
}

#[tokio::test]
async fn unsupported_extension_is_skipped_without_touching_templates() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    write_file(&input.path().join("notes.md"), "hi").await;

    let outcome = run_sync(input.path(), output.path(), None, 0, false, false, 2).await;

    assert_eq!(outcome.metrics.skipped_files, 1);
    assert_eq!(outcome.skips[0].category, SkipCategory::UnsupportedFile);
    assert!(!output.path().join("notes.templ").exists());
}

#[tokio::test]
async fn missing_template_target_is_skipped() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    write_file(&input.path().join("a.css"), "x").await;

    let outcome = run_sync(input.path(), output.path(), None, 0, false, false, 2).await;

    assert_eq!(outcome.metrics.skipped_files, 1);
    assert_eq!(outcome.skips[0].category, SkipCategory::MissingTempl);
}

#[tokio::test]
async fn invalid_markers_are_reported_as_an_error() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    write_file(&input.path().join("a.css"), "x").await;
    write_file(
        &output.path().join("a.templ"),
        &format!("{}\nno end here\n", begin_marker(MARKER)),
    )
    .await;

    let outcome = run_sync(input.path(), output.path(), None, 0, false, false, 2).await;

    assert_eq!(outcome.metrics.files_processed, 0);
    assert_eq!(outcome.metrics.errors_encountered, 1);
    assert!(outcome.errors[0].message.contains("invalid or missing guard markers"));
}

#[tokio::test]
async fn production_minification_compresses_whitespace() {
    // Requires an `esbuild` binary on PATH; skip gracefully in environments
    // that don't have one rather than failing the whole suite.
    if tokio::process::Command::new("esbuild")
        .arg("--version")
        .output()
        .await
        .is_err()
    {
        eprintln!("skipping: esbuild not found on PATH");
        return;
    }

    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    write_file(
        &input.path().join("a.js"),
        "function t ( ) { console.log('x'); }",
    )
    .await;
    write_file(&output.path().join("a.templ"), &marked_template("")).await;

    let outcome = run_sync(input.path(), output.path(), None, 0, true, false, 2).await;

    assert_eq!(outcome.metrics.files_processed, 1);
    let result = tokio::fs::read_to_string(output.path().join("a.templ")).await.unwrap();
    assert!(!result.contains("  "));
}

#[tokio::test]
async fn queue_overflow_emits_queue_full_skips_with_a_single_worker() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    // capacity is num_workers * 50 = 50 with one worker; 200 files guarantees
    // overflow during the dispatcher's synchronous walk, which completes
    // before any worker starts draining the queue.
    for i in 0..200 {
        let name = format!("f{i}.css");
        write_file(&input.path().join(&name), "body{}").await;
        write_file(
            &output.path().join(name.replace(".css", ".templ")),
            &marked_template("old"),
        )
        .await;
    }

    let outcome = run_sync(input.path(), output.path(), None, 0, false, false, 1).await;

    let queue_full_hits = outcome
        .skips
        .iter()
        .filter(|s| s.category == SkipCategory::QueueFull)
        .count();
    assert!(queue_full_hits > 0, "expected at least one QUEUE_FULL skip");
    assert!(outcome.skips.iter().any(|s| s.category == SkipCategory::QueueFull
        && s.reason_text.contains("increase workers")));
}

#[tokio::test]
async fn excluded_dir_and_os_noise_files_are_counted_as_skipped() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let vendor_dir = input.path().join("vendor");
    write_file(&vendor_dir.join("a.css"), "body{color:red}").await;
    write_file(&vendor_dir.join("nested").join("b.js"), "console.log(1)").await;
    write_file(&input.path().join(".DS_Store"), "").await;
    write_file(&input.path().join("keep.css"), "body{color:blue}").await;
    write_file(&output.path().join("keep.templ"), &marked_template("old")).await;

    let outcome = run_sync(
        input.path(),
        output.path(),
        Some(vendor_dir.clone()),
        0,
        false,
        false,
        2,
    )
    .await;

    assert_eq!(outcome.metrics.files_processed, 1);
    assert_eq!(outcome.metrics.skipped_files, 2);

    let excluded: Vec<&SkipRecord> = outcome
        .skips
        .iter()
        .filter(|s| s.category == SkipCategory::Excluded)
        .collect();
    assert_eq!(excluded.len(), 2);
    assert!(excluded.iter().any(|s| s.source == vendor_dir));
    assert!(excluded
        .iter()
        .any(|s| s.source == input.path().join(".DS_Store")));

    // Nothing under the excluded directory was processed, errored, or
    // individually reported: the subtree is pruned, not visited-then-dropped.
    assert!(!excluded.iter().any(|s| s.source.starts_with(vendor_dir.join("nested"))));
    assert!(outcome.errors.is_empty());
}
