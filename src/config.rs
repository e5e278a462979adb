//! Where settings and logs live.
//!
//! Priority for both directories:
//! 1. `--config-dir` CLI argument
//! 2. `NNFI_CONFIG_DIR` environment variable
//! 3. The working directory, if it already holds one of our files
//! 4. Platform directories from `dirs-next`
//!
//! Platform paths:
//! - Linux: ~/.config/nnfi (config), ~/.local/share/nnfi (data)
//! - macOS: ~/Library/Application Support/nnfi
//! - Windows: %APPDATA%\nnfi

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub const APP_DIR: &str = "nnfi";
pub const CONFIG_ENV: &str = "NNFI_CONFIG_DIR";
pub const SETTINGS_FILE: &str = "nnfi.json";
pub const LOG_FILE: &str = "nnfi.log";

const LOCAL_MARKERS: &[&str] = &[SETTINGS_FILE, LOG_FILE];

/// Override for the default application paths.
#[derive(Debug, Clone, Default)]
pub struct PathConfig {
    pub config_dir: Option<PathBuf>,
}

impl PathConfig {
    /// CLI argument first, then the environment.
    pub fn from_env_and_cli(cli_dir: Option<PathBuf>) -> Self {
        let config_dir =
            cli_dir.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        Self { config_dir }
    }
}

pub fn config_file(name: &str, config: &PathConfig) -> PathBuf {
    config_dir(config).join(name)
}

pub fn data_file(name: &str, config: &PathConfig) -> PathBuf {
    data_dir(config).join(name)
}

/// Create the config and data directories if missing.
pub fn ensure_dirs(config: &PathConfig) -> Result<()> {
    let cfg = config_dir(config);
    let data = data_dir(config);
    std::fs::create_dir_all(&cfg)
        .with_context(|| format!("Failed to create config directory: {}", cfg.display()))?;
    if data != cfg {
        std::fs::create_dir_all(&data)
            .with_context(|| format!("Failed to create data directory: {}", data.display()))?;
    }
    Ok(())
}

fn has_local_files(dir: &Path) -> bool {
    LOCAL_MARKERS.iter().any(|f| dir.join(f).exists())
}

fn local_dir() -> Option<PathBuf> {
    std::env::current_dir().ok().filter(|d| has_local_files(d))
}

fn resolve(config: &PathConfig, platform: Option<PathBuf>) -> PathBuf {
    if let Some(dir) = &config.config_dir {
        return dir.clone();
    }
    if let Some(dir) = local_dir() {
        return dir;
    }
    platform
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn config_dir(config: &PathConfig) -> PathBuf {
    resolve(config, dirs_next::config_dir())
}

fn data_dir(config: &PathConfig) -> PathBuf {
    resolve(config, dirs_next::data_dir())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_dir_wins_for_both_kinds() {
        let config = PathConfig {
            config_dir: Some(PathBuf::from("/custom")),
        };
        assert_eq!(config_file("a.json", &config), PathBuf::from("/custom/a.json"));
        assert_eq!(data_file(LOG_FILE, &config), PathBuf::from("/custom/nnfi.log"));
    }

    #[test]
    fn cli_dir_beats_environment() {
        let config = PathConfig::from_env_and_cli(Some(PathBuf::from("/from/cli")));
        assert_eq!(config.config_dir, Some(PathBuf::from("/from/cli")));
    }

    #[test]
    fn local_markers_are_detected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!has_local_files(dir.path()));
        std::fs::write(dir.path().join(SETTINGS_FILE), "{}").unwrap();
        assert!(has_local_files(dir.path()));
    }

    #[test]
    fn ensure_dirs_creates_custom_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("cfg");
        let config = PathConfig {
            config_dir: Some(target.clone()),
        };
        ensure_dirs(&config).unwrap();
        assert!(target.is_dir());
    }
}
