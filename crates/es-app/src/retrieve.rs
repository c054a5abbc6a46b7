//! Running the remote solver and collecting its download.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use es_browser::{Browser, Locator, Session};
use es_core::Configuration;
use es_results::{SimulationTable, result_file_name};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};

const RUN_BUTTON_ID: &str = "runButton";
const SAVE_DATA_BUTTON: &str = "Save Data";

#[derive(Debug, Clone)]
pub struct CollectOptions {
    /// Upper bound on the wait for the download to appear.
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Remove the downloaded file once parsed.
    pub delete_after: bool,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            poll_interval: Duration::from_millis(250),
            delete_after: true,
        }
    }
}

/// Start the simulation on the filled form.
pub fn run<B: Browser>(session: &mut Session<B>) -> AppResult<()> {
    info!("starting simulation");
    session.click(&Locator::id(RUN_BUTTON_ID))?;
    Ok(())
}

/// Save the results and read the downloaded CSV back.
pub fn collect<B: Browser>(
    session: &mut Session<B>,
    config: &Configuration,
    options: &CollectOptions,
) -> AppResult<SimulationTable> {
    let download_dir = session
        .download_dir()
        .map(Path::to_path_buf)
        .ok_or_else(|| AppError::Session("session not opened".to_string()))?;
    let path = download_dir.join(result_file_name(config.emitter(), config.feed()));

    // A file left by an earlier run would be mistaken for this download.
    if path.exists() {
        debug!(path = %path.display(), "removing stale download");
        fs::remove_file(&path)?;
    }

    session.click(&Locator::name(SAVE_DATA_BUTTON))?;
    wait_for_file(&path, options.timeout, options.poll_interval)?;
    info!(path = %path.display(), "download found");

    let table = SimulationTable::from_path(&path)?;
    if options.delete_after {
        fs::remove_file(&path)?;
    }
    Ok(table)
}

/// Poll for `path` until it exists or `timeout` elapses.
pub fn wait_for_file(path: &Path, timeout: Duration, poll_interval: Duration) -> AppResult<PathBuf> {
    let started = Instant::now();
    loop {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        let waited = started.elapsed();
        if waited >= timeout {
            return Err(AppError::DownloadNotFound {
                path: path.to_path_buf(),
                waited,
            });
        }
        thread::sleep(poll_interval.min(timeout - waited));
    }
}
