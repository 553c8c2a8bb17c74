//! Application configuration management utilities.

use crate::errors::CliError;
use camino::{Utf8Path, Utf8PathBuf};
use onb_mod_index::indexer::DEFAULT_CACHE_FILE;
use onb_mod_index::source::{
    ATTACHMENT_PLACEHOLDER, DEFAULT_CATALOG_URL, DEFAULT_DOWNLOAD_TEMPLATE,
};
use onb_mod_index::IndexOptions;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::time::Duration;

/// Name of the configuration file looked up when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "onb-mod-index.toml";

/// Application-wide configuration stored in onb-mod-index.toml.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub catalog_url: String,
    pub download_template: String,
    pub cache_file: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
    pub work_dir: Option<Utf8PathBuf>,
    pub timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            download_template: DEFAULT_DOWNLOAD_TEMPLATE.to_string(),
            cache_file: Utf8PathBuf::from(DEFAULT_CACHE_FILE),
            output_dir: Utf8PathBuf::from("."),
            work_dir: None,
            timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// Reject settings the indexer cannot work with.
    pub fn validate(&self) -> Result<(), CliError> {
        if !self.download_template.contains(ATTACHMENT_PLACEHOLDER) {
            return Err(CliError::invalid_download_template(
                self.download_template.clone(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            cache_file: self.cache_file.clone(),
            output_dir: self.output_dir.clone(),
            work_dir: self.work_dir.clone(),
        }
    }
}

/// Returns the directory where the current executable resides.
pub fn install_dir() -> Option<Utf8PathBuf> {
    let exe = env::current_exe().ok()?;
    let parent = exe.parent()?;
    Utf8PathBuf::from_path_buf(parent.to_path_buf()).ok()
}

/// Returns a config file path located next to the executable.
pub fn config_path(file_name: &str) -> Option<Utf8PathBuf> {
    install_dir().map(|dir| dir.join(file_name))
}

/// Default config locations, in lookup order: working directory, then next to the executable.
pub fn default_config_paths() -> Vec<Utf8PathBuf> {
    let mut paths = vec![Utf8PathBuf::from(CONFIG_FILE_NAME)];
    paths.extend(config_path(CONFIG_FILE_NAME));
    paths
}

/// Reads and parses a configuration file.
pub fn read_config(path: &Utf8Path) -> Result<AppConfig, CliError> {
    let content = fs::read_to_string(path.as_std_path())?;
    toml::from_str(&content).map_err(|e| CliError::config_parse_error(path.to_path_buf(), e))
}

/// Loads the application configuration.
///
/// An explicit path must exist. Otherwise the first existing default location
/// is used, falling back to built-in defaults. Returns the file the
/// configuration came from, if any.
pub fn load_config(
    explicit: Option<&Utf8Path>,
) -> Result<(AppConfig, Option<Utf8PathBuf>), CliError> {
    match explicit {
        Some(path) => load_config_from(&[path.to_path_buf()], true),
        None => load_config_from(&default_config_paths(), false),
    }
}

fn load_config_from(
    candidates: &[Utf8PathBuf],
    required: bool,
) -> Result<(AppConfig, Option<Utf8PathBuf>), CliError> {
    for path in candidates {
        if path.as_std_path().is_file() {
            let cfg = read_config(path)?;
            return Ok((cfg, Some(path.clone())));
        }
    }

    match (required, candidates.first()) {
        (true, Some(path)) => Err(CliError::config_not_found(path.clone())),
        _ => Ok((AppConfig::default(), None)),
    }
}
