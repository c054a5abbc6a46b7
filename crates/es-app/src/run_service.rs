//! Session orchestration: login, field selection, upload, run, collect.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use es_browser::{Browser, Session};
use es_cache::{CacheKey, FieldMap, FieldStore, merge_selections, overlay_config};
use es_core::{AvailableOptions, Configuration};
use es_results::SimulationTable;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::form_driver::{DEFAULT_MAX_UNLOCK_CYCLES, FormDriver};
use crate::progress::{RunProgressEvent, RunStage};
use crate::retrieve::{self, CollectOptions};

/// How field values reach the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    /// One element at a time.
    #[default]
    Individual,
    /// Through the page's JSON config loader.
    Bulk,
}

impl UploadMode {
    pub fn key(&self) -> &'static str {
        match self {
            UploadMode::Individual => "individual",
            UploadMode::Bulk => "bulk",
        }
    }
}

impl fmt::Display for UploadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for UploadMode {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "individual" | "individually" => Ok(UploadMode::Individual),
            "bulk" => Ok(UploadMode::Bulk),
            other => Err(AppError::InvalidInput(format!(
                "unknown upload mode '{}', expected individual or bulk",
                other
            ))),
        }
    }
}

/// Options for running simulations.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub upload_mode: UploadMode,
    pub use_cache: bool,
    pub collect: CollectOptions,
    pub max_unlock_cycles: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            upload_mode: UploadMode::Individual,
            use_cache: true,
            collect: CollectOptions::default(),
            max_unlock_cycles: DEFAULT_MAX_UNLOCK_CYCLES,
        }
    }
}

/// Login for one session. Borrowed and never written anywhere.
#[derive(Clone, Copy)]
pub struct Credentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

impl fmt::Debug for Credentials<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Request to execute one simulation.
#[derive(Debug)]
pub struct SimulationRequest<'a> {
    pub target_url: &'a str,
    pub download_dir: &'a Path,
    pub config: Configuration,
    pub credentials: Credentials<'a>,
    pub options: RunOptions,
}

/// Field values chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSelection {
    pub fields: FieldMap,
    pub from_cache: bool,
    /// Narrowed dropdown options, only known after a scrape.
    pub available: Option<AvailableOptions>,
}

/// Wall-clock seconds spent in each part of a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub open_time_s: f64,
    pub login_time_s: f64,
    pub select_time_s: f64,
    pub upload_time_s: f64,
    pub run_time_s: f64,
    pub collect_time_s: f64,
    pub total_time_s: f64,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub table: SimulationTable,
    pub fields_from_cache: bool,
    pub field_count: usize,
    pub timing: RunTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent::stage(
            stage,
            started.elapsed().as_secs_f64(),
            message,
        ));
    }
}

/// Decide the field values for `config`.
///
/// Selects the primary fields, then replays the cached snapshot for the
/// key or scrapes the live form and caches what it found.
pub fn select_props<B: Browser, S: FieldStore + ?Sized>(
    session: &mut Session<B>,
    store: &mut S,
    config: &Configuration,
    use_cache: bool,
) -> AppResult<FieldSelection> {
    select_props_with_progress(session, store, config, use_cache, &mut None, Instant::now())
}

fn select_props_with_progress<B: Browser, S: FieldStore + ?Sized>(
    session: &mut Session<B>,
    store: &mut S,
    config: &Configuration,
    use_cache: bool,
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    started: Instant,
) -> AppResult<FieldSelection> {
    let key = CacheKey::for_config(config);

    emit_progress(
        progress_cb,
        RunStage::SelectingPrimaryFields,
        started,
        Some(format!("Selecting {}", key)),
    );
    let mut driver = FormDriver::new(session, DEFAULT_MAX_UNLOCK_CYCLES);
    driver.select_primary_fields(config)?;

    if use_cache {
        emit_progress(
            progress_cb,
            RunStage::CheckingCache,
            started,
            Some("Checking field cache".to_string()),
        );
        if let Some(mut fields) = store.load(&key)? {
            info!(key = %key, "field cache hit");
            overlay_config(&mut fields, config);
            return Ok(FieldSelection {
                fields,
                from_cache: true,
                available: None,
            });
        }
        info!(key = %key, "field cache miss");
    }

    emit_progress(
        progress_cb,
        RunStage::ScrapingForm,
        started,
        Some("Scraping form fields".to_string()),
    );
    let scraped = driver.scrape_available_fields()?;
    config.check_available(&scraped.available)?;

    emit_progress(
        progress_cb,
        RunStage::SavingFields,
        started,
        Some(format!("Caching {} fields", scraped.fields.len())),
    );
    let mut fields = save_fields(store, config, scraped.fields)?;

    overlay_config(&mut fields, config);
    Ok(FieldSelection {
        fields,
        from_cache: false,
        available: Some(scraped.available),
    })
}

/// Cache a scraped snapshot under the key of `config`.
///
/// The six dropdown selections of `config` replace whatever the scrape
/// read from the page. Returns the map as stored.
pub fn save_fields<S: FieldStore + ?Sized>(
    store: &mut S,
    config: &Configuration,
    mut fields: FieldMap,
) -> AppResult<FieldMap> {
    merge_selections(&mut fields, config);
    store.save(&CacheKey::for_config(config), &fields)?;
    Ok(fields)
}

/// Push `fields` into the form with the configured upload mode.
pub fn upload_data<B: Browser>(
    session: &mut Session<B>,
    fields: &FieldMap,
    config: &Configuration,
    options: &RunOptions,
) -> AppResult<()> {
    info!(mode = %options.upload_mode, fields = fields.len(), "uploading fields");
    let mut driver = FormDriver::new(session, options.max_unlock_cycles);
    match options.upload_mode {
        UploadMode::Individual => {
            let report = driver.fill_individual(fields, config)?;
            if !report.unlocked.is_empty() {
                warn!(unlocked = ?report.unlocked, "fields needed the unlock cycle");
            }
        }
        UploadMode::Bulk => driver.fill_bulk(fields)?,
    }
    Ok(())
}

/// Execute a full simulation.
pub fn execute<B: Browser, S: FieldStore + ?Sized>(
    session: &mut Session<B>,
    store: &mut S,
    request: &SimulationRequest,
) -> AppResult<RunResponse> {
    execute_with_progress(session, store, request, None)
}

/// Execute a full simulation and stream progress events.
///
/// The session is closed before returning, whether or not the run
/// succeeded. A failure to close is logged and never replaces the run's
/// own outcome.
pub fn execute_with_progress<B: Browser, S: FieldStore + ?Sized>(
    session: &mut Session<B>,
    store: &mut S,
    request: &SimulationRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let outcome = drive(session, store, request, &mut progress_cb);
    if let Err(err) = session.close() {
        warn!(error = %err, "failed to close browser session");
    }
    outcome
}

fn drive<B: Browser, S: FieldStore + ?Sized>(
    session: &mut Session<B>,
    store: &mut S,
    request: &SimulationRequest,
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    emit_progress(
        progress_cb,
        RunStage::Opening,
        started,
        Some(format!("Opening {}", request.target_url)),
    );
    let t = Instant::now();
    session.open(request.target_url, request.download_dir)?;
    timing.open_time_s = t.elapsed().as_secs_f64();

    emit_progress(
        progress_cb,
        RunStage::Authenticating,
        started,
        Some("Logging in".to_string()),
    );
    let t = Instant::now();
    session.authenticate(request.credentials.username, request.credentials.password)?;
    timing.login_time_s = t.elapsed().as_secs_f64();

    let t = Instant::now();
    let selection = select_props_with_progress(
        session,
        store,
        &request.config,
        request.options.use_cache,
        progress_cb,
        started,
    )?;
    timing.select_time_s = t.elapsed().as_secs_f64();

    emit_progress(
        progress_cb,
        RunStage::UploadingFields,
        started,
        Some(format!(
            "Uploading {} fields ({})",
            selection.fields.len(),
            request.options.upload_mode
        )),
    );
    let t = Instant::now();
    upload_data(session, &selection.fields, &request.config, &request.options)?;
    timing.upload_time_s = t.elapsed().as_secs_f64();

    emit_progress(
        progress_cb,
        RunStage::Running,
        started,
        Some("Running simulation".to_string()),
    );
    let t = Instant::now();
    retrieve::run(session)?;
    timing.run_time_s = t.elapsed().as_secs_f64();

    emit_progress(
        progress_cb,
        RunStage::Collecting,
        started,
        Some("Waiting for download".to_string()),
    );
    let t = Instant::now();
    let table = retrieve::collect(session, &request.config, &request.options.collect)?;
    timing.collect_time_s = t.elapsed().as_secs_f64();

    timing.total_time_s = started.elapsed().as_secs_f64();
    emit_progress(
        progress_cb,
        RunStage::Completed,
        started,
        Some(format!("{} rows", table.row_count())),
    );

    Ok(RunResponse {
        table,
        fields_from_cache: selection.from_cache,
        field_count: selection.fields.len(),
        timing,
    })
}
