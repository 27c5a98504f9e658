use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::job::Job;
use crate::skip::SkipCategory;

/// OS-noise file names excluded everywhere a directory entry is considered
/// (§4.1 rule 5, §4.5).
pub const OS_NOISE_NAMES: [&str; 2] = [".DS_Store", "Thumbs.db"];

pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["css", "js"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Process,
    Skip(SkipCategory),
}

/// Rebases `source` (a path under `input_root`) to where its template would
/// live under `output_root`: strip `input_root`, join the remainder under
/// `output_root`, replace the final extension with `.templ`. Paths are
/// normalized POSIX-style: `./` segments collapse, separators de-duplicate
/// (§4.1 rule 2, GLOSSARY "Rebase").
pub fn rebase_output_path(source: &Path, input_root: &Path, output_root: &Path) -> PathBuf {
    let relative = source.strip_prefix(input_root).unwrap_or(source);
    let cleaned = clean_path(relative);
    let mut out = output_root.join(cleaned);
    out.set_extension("templ");
    clean_path(&out)
}

fn clean_path(p: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in p.components() {
        use std::path::Component;
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.push("..");
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Pure decision function (§4.1). `last_run` is a Unix-seconds timestamp;
/// `source_mtime` is the candidate file's modification time.
#[allow(clippy::too_many_arguments)]
pub fn classify(
    job: &Job,
    input_root: &Path,
    output_root: &Path,
    source_mtime: Option<SystemTime>,
    last_run: u64,
    is_production: bool,
    is_force: bool,
) -> Decision {
    let ext = job
        .input_path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    // Rule 1: unsupported extension.
    let Some(ext) = ext else {
        return Decision::Skip(SkipCategory::UnsupportedFile);
    };
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Decision::Skip(SkipCategory::UnsupportedFile);
    }

    // Rule 2/3: expected output must exist.
    let expected_output = rebase_output_path(&job.input_path, input_root, output_root);
    if !expected_output.exists() {
        return Decision::Skip(SkipCategory::MissingTempl);
    }

    // Rule 4: job's own output path must match the rebase, byte-for-byte.
    let cleaned_job_output = clean_path(&job.output_path);
    if cleaned_job_output != expected_output {
        return Decision::Skip(SkipCategory::MismatchedOutput);
    }

    // Rule 5: OS noise files.
    if let Some(name) = job.input_path.file_name().and_then(|n| n.to_str()) {
        if OS_NOISE_NAMES.contains(&name) {
            return Decision::Skip(SkipCategory::Excluded);
        }
    }

    // Rule 6: incremental gate.
    if !is_production && !is_force {
        if let Some(mtime) = source_mtime {
            let mtime_secs = mtime
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0);
            if mtime_secs <= last_run {
                return Decision::Skip(SkipCategory::UnchangedFile);
            }
        }
    }

    Decision::Process
}
