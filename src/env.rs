//! Process-wide defaults sourced from the environment: a small grab-bag of
//! `LazyLock` statics layered over `std::env`.
pub use std::env::*;

use std::num::NonZeroUsize;
use std::sync::LazyLock;

/// Default worker count: 2x the host's available parallelism, overridable
/// with `TEMPO_SYNC_JOBS`. Falls back to 1 if the host can't report
/// parallelism.
pub static DEFAULT_JOBS: LazyLock<NonZeroUsize> = LazyLock::new(|| {
    if let Ok(v) = var("TEMPO_SYNC_JOBS") {
        if let Ok(n) = v.parse::<usize>() {
            if let Some(n) = NonZeroUsize::new(n) {
                return n;
            }
        }
    }
    let cpus = std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1);
    NonZeroUsize::new(cpus * 2).unwrap_or(NonZeroUsize::new(1).unwrap())
});

/// Path to the esbuild binary used by `Transformer::Minify`.
pub static ESBUILD_BIN: LazyLock<String> =
    LazyLock::new(|| var("TEMPO_SYNC_ESBUILD").unwrap_or_else(|_| "esbuild".to_string()));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_jobs_is_at_least_one() {
        assert!(DEFAULT_JOBS.get() >= 1);
    }
}
