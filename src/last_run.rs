use std::path::{Path, PathBuf};

use tracing::warn;

pub const LAST_RUN_FILE_NAME: &str = ".tempo-lastrun";

/// Reads/writes the single-integer last-run timestamp file (§3 "LastRunStamp",
/// §6). Corruption and absence both read as 0; corruption additionally logs a
/// warning so an operator can see why a full resync happened (SPEC_FULL §11).
pub struct LastRunStore {
    path: PathBuf,
}

impl LastRunStore {
    pub fn new(working_dir: &Path) -> Self {
        Self {
            path: working_dir.join(LAST_RUN_FILE_NAME),
        }
    }

    pub async fn read(&self) -> u64 {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => match contents.trim().parse::<u64>() {
                Ok(v) => v,
                Err(_) => {
                    warn!(path = %self.path.display(), "corrupt last-run stamp, treating as 0");
                    0
                }
            },
            Err(_) => 0,
        }
    }

    pub async fn write(&self, timestamp: u64) -> std::io::Result<()> {
        tokio::fs::write(&self.path, timestamp.to_string()).await
    }
}
