use super::schema::LociConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const LOCAL_CONFIG: &str = "loci.yaml";
const HOME_CONFIG_DIR: &str = ".loci";
const HOME_CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Config locations in lookup order: the working directory, then the
    /// user's home.
    pub fn search_paths(cwd: &Path, home: Option<&Path>) -> Vec<PathBuf> {
        std::iter::once(cwd.join(LOCAL_CONFIG))
            .chain(home.map(|h| h.join(HOME_CONFIG_DIR).join(HOME_CONFIG_FILE)))
            .collect()
    }

    /// First existing file among `paths`, or built-in defaults when none exists.
    pub async fn load_first(paths: &[PathBuf]) -> Result<LociConfig, ConfigError> {
        for path in paths {
            if tokio::fs::try_exists(path).await? {
                info!("Loading config from {}", path.display());
                return Self::load_from(path).await;
            }
            debug!("No config at {}", path.display());
        }
        Ok(LociConfig::default())
    }

    /// `./loci.yaml`, then `~/.loci/config.yaml`, then defaults.
    pub async fn load_default() -> Result<LociConfig, ConfigError> {
        let home = dirs::home_dir();
        let paths = Self::search_paths(Path::new("."), home.as_deref());
        Self::load_first(&paths).await
    }

    pub async fn load_from(path: &Path) -> Result<LociConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::parse(&content)
    }

    /// Parse YAML text. An empty document yields the defaults.
    pub fn parse(content: &str) -> Result<LociConfig, ConfigError> {
        if content.trim().is_empty() {
            return Ok(LociConfig::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}
