//! Persistent driver settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use es_browser::WebDriverOptions;
use es_core::Configuration;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::retrieve::CollectOptions;
use crate::run_service::{RunOptions, UploadMode};

/// Everything a run needs besides credentials.
///
/// Missing keys in the YAML file fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub target_url: String,
    pub webdriver_url: String,
    pub download_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub headless: bool,
    pub download_timeout_s: f64,
    pub poll_interval_ms: u64,
    pub max_unlock_cycles: usize,
    pub upload_mode: UploadMode,
    pub use_cache: bool,
    pub delete_download: bool,
    pub selection: Configuration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_url: "http://espet.spectral.com/espet/qsolver/".to_string(),
            webdriver_url: "http://localhost:4444".to_string(),
            download_dir: PathBuf::from("output_data"),
            cache_dir: PathBuf::from("input_field_files"),
            headless: false,
            download_timeout_s: 10.0,
            poll_interval_ms: 250,
            max_unlock_cycles: 6,
            upload_mode: UploadMode::Individual,
            use_cache: true,
            delete_download: true,
            selection: Configuration::default(),
        }
    }
}

/// Longest accepted download wait.
pub const MAX_DOWNLOAD_TIMEOUT_S: f64 = 3600.0;

/// Convert a download timeout in seconds, rejecting values that are
/// negative, NaN or above [`MAX_DOWNLOAD_TIMEOUT_S`].
pub fn download_timeout(seconds: f64) -> AppResult<Duration> {
    if !(0.0..=MAX_DOWNLOAD_TIMEOUT_S).contains(&seconds) {
        return Err(AppError::Settings(format!(
            "download_timeout_s must be between 0 and {} seconds, got {}",
            MAX_DOWNLOAD_TIMEOUT_S, seconds
        )));
    }
    Duration::try_from_secs_f64(seconds)
        .map_err(|e| AppError::Settings(format!("invalid download_timeout_s {}: {}", seconds, e)))
}

impl Settings {
    /// Check the values serde cannot constrain.
    pub fn validate(&self) -> AppResult<()> {
        download_timeout(self.download_timeout_s)?;
        Ok(())
    }

    pub fn collect_options(&self) -> AppResult<CollectOptions> {
        Ok(CollectOptions {
            timeout: download_timeout(self.download_timeout_s)?,
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            delete_after: self.delete_download,
        })
    }

    pub fn run_options(&self) -> AppResult<RunOptions> {
        Ok(RunOptions {
            upload_mode: self.upload_mode,
            use_cache: self.use_cache,
            collect: self.collect_options()?,
            max_unlock_cycles: self.max_unlock_cycles,
        })
    }

    pub fn webdriver_options(&self) -> WebDriverOptions {
        WebDriverOptions {
            webdriver_url: self.webdriver_url.clone(),
            headless: self.headless,
        }
    }
}

/// Load settings from a YAML file.
pub fn load_settings(path: &Path) -> AppResult<Settings> {
    let content = std::fs::read_to_string(path).map_err(|e| AppError::SettingsFileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    let settings: Settings = serde_yaml::from_str(&content)
        .map_err(|e| AppError::Settings(format!("Failed to parse settings YAML: {}", e)))?;

    settings.validate()?;
    Ok(settings)
}

/// Save settings to a YAML file.
pub fn save_settings(path: &Path, settings: &Settings) -> AppResult<()> {
    let content = serde_yaml::to_string(settings)
        .map_err(|e| AppError::Settings(format!("Failed to serialize settings: {}", e)))?;

    std::fs::write(path, content).map_err(|e| AppError::SettingsFileWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
