use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Error;

/// The YAML-on-disk settings bag (§6). Parsing itself is `serde_yaml`'s job;
/// this struct only names the keys the core's defaults read from. Only YAML
/// is recognized; no pkl/toml/json multi-format dispatch.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub tempo_root: Option<PathBuf>,
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    pub assets_dir: Option<PathBuf>,
    pub go_package: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProcessorConfig {
    pub workers: Option<usize>,
    pub summary_format: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplatesConfig {
    pub guard_marker: Option<String>,
}

impl Config {
    /// Looks for `tempo.yaml`/`tempo.yml` in the current directory when
    /// `path` is `None`. Config absence is not a setup error: it just means
    /// CLI flags must supply `input_dir`/`output_dir` directly
    /// (SPEC_FULL §10.3).
    pub async fn load(path: Option<&Path>) -> Result<Config, Error> {
        let resolved = match path {
            Some(p) => Some(p.to_path_buf()),
            None => find_default_config().await,
        };

        let Some(resolved) = resolved else {
            return Ok(Config::default());
        };

        let contents = tokio::fs::read_to_string(&resolved).await.map_err(Error::Io)?;
        serde_yaml::from_str(&contents).map_err(Error::ConfigRead)
    }
}

async fn find_default_config() -> Option<PathBuf> {
    for name in ["tempo.yaml", "tempo.yml"] {
        let candidate = PathBuf::from(name);
        if tokio::fs::try_exists(&candidate).await.unwrap_or(false) {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_config_path_yields_defaults() {
        let cfg = Config::load(Some(Path::new("/nonexistent/tempo.yaml"))).await;
        assert!(cfg.is_err());
    }

    #[test]
    fn parses_recognized_keys() {
        let yaml = r#"
tempo_root: /srv/app
app:
  assets_dir: /srv/app/assets
  go_package: /srv/app/templates
processor:
  workers: 8
  summary_format: long
templates:
  guard_marker: TEMPO
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.app.assets_dir, Some(PathBuf::from("/srv/app/assets")));
        assert_eq!(cfg.processor.workers, Some(8));
        assert_eq!(cfg.templates.guard_marker, Some("TEMPO".to_string()));
    }
}
