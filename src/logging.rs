use color_eyre::{eyre::eyre, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LogConfig;

const LOG_FILE_PREFIX: &str = "pokedex.log";

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `log.level` when set. With `log.file` the output
/// goes to a daily rolling file under `$XDG_DATA_HOME/pokedex`, otherwise
/// to stderr. Keep the returned guard alive for as long as logs should be
/// flushed.
pub fn init(config: &LogConfig) -> Result<WorkerGuard> {
  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(default_directive(config)));

  let (writer, guard) = if config.file {
    let appender = tracing_appender::rolling::daily(log_dir()?, LOG_FILE_PREFIX);
    tracing_appender::non_blocking(appender)
  } else {
    tracing_appender::non_blocking(std::io::stderr())
  };

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(!config.file)
    .try_init()
    .map_err(|e| eyre!("Failed to install log subscriber: {}", e))?;

  Ok(guard)
}

fn default_directive(config: &LogConfig) -> String {
  let level = config.level.trim();
  if level.is_empty() {
    "pokedex=info".to_string()
  } else {
    format!("pokedex={}", level)
  }
}

fn log_dir() -> Result<PathBuf> {
  let dir = dirs::data_dir()
    .ok_or_else(|| eyre!("Could not determine data directory"))?
    .join("pokedex");
  std::fs::create_dir_all(&dir)
    .map_err(|e| eyre!("Failed to create log directory {}: {}", dir.display(), e))?;
  Ok(dir)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_directive() {
    assert_eq!(default_directive(&LogConfig::default()), "pokedex=info");

    let config = LogConfig {
      level: "debug".to_string(),
      file: false,
    };
    assert_eq!(default_directive(&config), "pokedex=debug");

    let config = LogConfig {
      level: "  ".to_string(),
      file: false,
    };
    assert_eq!(default_directive(&config), "pokedex=info");
  }
}
