use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Config file not found: {0}")]
  NotFound(PathBuf),
  #[error("{0}")]
  Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Number of records per list page.
  pub page_size: usize,
  /// Seconds a cached query result is served without revalidation.
  pub stale_after_secs: u64,
  pub latency: LatencyConfig,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      page_size: 10,
      stale_after_secs: 300,
      latency: LatencyConfig::default(),
    }
  }
}

/// Simulated network latency per operation class, in milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
  pub list_ms: u64,
  pub detail_ms: u64,
  pub mutate_ms: u64,
}

impl Default for LatencyConfig {
  fn default() -> Self {
    Self {
      list_ms: 3000,
      detail_ms: 1000,
      mutate_ms: 1000,
    }
  }
}

impl LatencyConfig {
  /// No artificial latency. Handy for consumers that don't want the
  /// simulated round-trip, and for tests running on a real clock.
  pub fn none() -> Self {
    Self {
      list_ms: 0,
      detail_ms: 0,
      mutate_ms: 0,
    }
  }

  pub fn list(&self) -> Duration {
    Duration::from_millis(self.list_ms)
  }

  pub fn detail(&self) -> Duration {
    Duration::from_millis(self.detail_ms)
  }

  pub fn mutate(&self) -> Duration {
    Duration::from_millis(self.mutate_ms)
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./projstore.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/projstore/config.yaml
  ///
  /// Without a config file anywhere, defaults apply.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(ConfigError::NotFound(p.to_path_buf()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("projstore.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("projstore").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
      ConfigError::Invalid(format!("Failed to read config file {}: {}", path.display(), e))
    })?;

    let config: Config = serde_yaml::from_str(&contents).map_err(|e| {
      ConfigError::Invalid(format!("Failed to parse config file {}: {}", path.display(), e))
    })?;

    Ok(config)
  }

  pub fn stale_time(&self) -> Duration {
    Duration::from_secs(self.stale_after_secs)
  }
}
