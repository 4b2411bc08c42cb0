use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Overrides the platform data directory, e.g. for tests or portable installs.
pub const DATA_DIR_ENV: &str = "MACROLOG_DATA_DIR";

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let data_dir = match std::env::var_os(DATA_DIR_ENV) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => ProjectDirs::from("", "", "macrolog")
                .context("Could not determine home directory")?
                .data_dir()
                .to_path_buf(),
        };
        Self::in_dir(data_dir)
    }

    fn in_dir(data_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("macrolog.db");

        Ok(Config { db_path, data_dir })
    }
}
