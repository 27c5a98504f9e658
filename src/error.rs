use std::path::PathBuf;

use thiserror::Error;

/// Typed, matchable leaf errors for the categories that are structurally
/// distinct enough that callers need to branch on them.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to read config: {0}")]
    ConfigRead(#[from] serde_yaml::Error),

    #[error("{input_dir} and/or {output_dir} do not exist")]
    MissingDir {
        input_dir: PathBuf,
        output_dir: PathBuf,
    },

    #[error("failed to read template target {path}: {source}")]
    ReadTarget {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid or missing guard markers in {path}")]
    InvalidMarkers { path: PathBuf },

    #[error("esbuild minification error: {diagnostic}")]
    MinifyFailed { diagnostic: String },

    #[error("failed to write spliced template {path}: {source}")]
    SpliceWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render JSON summary: {0}")]
    SummarySerialize(#[from] serde_json::Error),
}

/// Ambient `Result` for orchestration-level functions, using `eyre`'s
/// `.wrap_err()` context chains. Per-file failures never surface through
/// this type; they are captured as `ErrorRecord`s instead (see
/// `error_record.rs`).
pub type Result<T> = eyre::Result<T>;
