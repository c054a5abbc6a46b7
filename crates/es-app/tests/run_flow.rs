//! End-to-end runs against the in-memory quicksolver page.

mod common;

use std::fs;
use std::path::Path;
use std::time::Duration;

use es_app::{
    AppError, CollectOptions, Credentials, RunOptions, RunProgressEvent, RunStage,
    SimulationRequest, UploadMode, collect, execute, execute_with_progress,
};
use es_browser::fake::{Command, FakeBrowser};
use es_browser::{
    Browser, BrowserError, BrowserResult, ElementState, Locator, SelectOption, Session,
};
use es_cache::{CacheKey, FieldStore, FileFieldStore};
use es_core::{Configuration, FieldKind};

use common::{PASSWORD, RESULT_CSV, TARGET_URL, USERNAME, logged_in, quicksolver_page, unique_temp_dir};

fn request<'a>(
    download_dir: &'a std::path::Path,
    config: Configuration,
    options: RunOptions,
) -> SimulationRequest<'a> {
    SimulationRequest {
        target_url: TARGET_URL,
        download_dir,
        config,
        credentials: Credentials {
            username: USERNAME,
            password: PASSWORD,
        },
        options,
    }
}

fn fast_options(upload_mode: UploadMode) -> RunOptions {
    RunOptions {
        upload_mode,
        collect: CollectOptions {
            timeout: Duration::from_millis(200),
            poll_interval: Duration::from_millis(10),
            delete_after: true,
        },
        ..RunOptions::default()
    }
}

fn config() -> Configuration {
    Configuration::default()
        .with(FieldKind::Emitter, "Capillary_IL")
        .and_then(|c| c.with(FieldKind::Feed, "Cylindrical_Channel"))
        .and_then(|c| c.with(FieldKind::IndependentVariable, "V"))
        .expect("valid configuration")
}

#[test]
fn second_run_reuses_cached_fields_without_scraping() {
    let download_dir = unique_temp_dir("es_app_e2e_downloads");
    let mut store = FileFieldStore::new(unique_temp_dir("es_app_e2e_cache")).unwrap();
    let key = CacheKey::for_config(&config());
    let req = request(&download_dir, config(), fast_options(UploadMode::Individual));

    let mut first = Session::new(quicksolver_page());
    let response = execute(&mut first, &mut store, &req).expect("first run should succeed");
    assert!(!response.fields_from_cache);
    assert_eq!(first.browser().count(|c| *c == Command::TextInputs), 1);

    let cached = store.load(&key).unwrap().expect("fields should be cached");
    for kind in FieldKind::CACHED_SELECTIONS {
        assert_eq!(cached[kind.form_name()], config().get(kind));
    }
    assert!(cached.contains_key("Radius"));
    assert!(!cached.contains_key("Work Function"));
    assert!(store.entry_path(&key).ends_with("Capillary_IL_and_Cylindrical_Channel_with_V.json"));

    let mut second = Session::new(quicksolver_page());
    let response = execute(&mut second, &mut store, &req).expect("second run should succeed");
    assert!(response.fields_from_cache);
    assert_eq!(second.browser().count(|c| *c == Command::TextInputs), 0);

    assert_eq!(response.table.row_count(), 3);
    assert_eq!(response.table.headers().len(), 8);
    assert!(!second.is_open());
}

#[test]
fn no_cache_always_scrapes_and_overwrites() {
    let download_dir = unique_temp_dir("es_app_nocache_downloads");
    let mut store = FileFieldStore::new(unique_temp_dir("es_app_nocache_cache")).unwrap();
    let key = CacheKey::for_config(&config());

    let mut stale = es_cache::FieldMap::new();
    stale.insert("Obsolete".to_string(), "1".to_string());
    store.save(&key, &stale).unwrap();

    let options = RunOptions {
        use_cache: false,
        ..fast_options(UploadMode::Bulk)
    };
    let req = request(&download_dir, config(), options);
    let mut session = Session::new(quicksolver_page());
    let response = execute(&mut session, &mut store, &req).unwrap();

    assert!(!response.fields_from_cache);
    let cached = store.load(&key).unwrap().unwrap();
    assert!(!cached.contains_key("Obsolete"));
    assert!(cached.contains_key("Temperature"));
}

#[test]
fn progress_covers_every_stage_in_order() {
    let download_dir = unique_temp_dir("es_app_progress_downloads");
    let mut store = es_cache::MemoryFieldStore::new();
    let req = request(&download_dir, config(), fast_options(UploadMode::Individual));

    let mut events: Vec<RunProgressEvent> = Vec::new();
    let mut session = Session::new(quicksolver_page());
    let response = execute_with_progress(
        &mut session,
        &mut store,
        &req,
        Some(&mut |event| events.push(event)),
    )
    .expect("run with progress should succeed");

    let stages: Vec<RunStage> = events.iter().map(|e| e.stage).collect();
    assert_eq!(
        stages,
        [
            RunStage::Opening,
            RunStage::Authenticating,
            RunStage::SelectingPrimaryFields,
            RunStage::CheckingCache,
            RunStage::ScrapingForm,
            RunStage::SavingFields,
            RunStage::UploadingFields,
            RunStage::Running,
            RunStage::Collecting,
            RunStage::Completed,
        ]
    );
    assert!(
        events
            .windows(2)
            .all(|w| w[0].elapsed_wall_s <= w[1].elapsed_wall_s)
    );
    assert!(response.timing.total_time_s >= response.timing.collect_time_s);
}

#[test]
fn wrong_password_stops_before_the_form() {
    let download_dir = unique_temp_dir("es_app_badlogin");
    let mut store = es_cache::MemoryFieldStore::new();
    let mut req = request(&download_dir, config(), fast_options(UploadMode::Individual));
    req.credentials.password = "wrong";

    let mut session = Session::new(quicksolver_page());
    let err = execute(&mut session, &mut store, &req).unwrap_err();

    assert!(matches!(err, AppError::AuthenticationFailed(_)));
    assert!(store.is_empty());
    assert!(!session.is_open());
}

#[test]
fn missing_download_is_retriable_not_a_parse_error() {
    let mut session = logged_in(
        FakeBrowser::new()
            .with_login(USERNAME, PASSWORD)
            .with_button(Locator::name("Save Data")),
        "es_app_no_download",
    );
    let download_dir = session.download_dir().unwrap().to_path_buf();
    // Left over from an earlier run; must not be picked up.
    fs::write(download_dir.join("Capillary_IL and Cylindrical_Channel.csv"), "garbage").unwrap();

    let options = CollectOptions {
        timeout: Duration::from_millis(50),
        poll_interval: Duration::from_millis(10),
        delete_after: true,
    };
    let err = collect(&mut session, &config(), &options).unwrap_err();

    assert!(matches!(err, AppError::DownloadNotFound { .. }));
    assert!(err.is_retriable());
}

#[test]
fn collected_download_is_parsed_then_removed() {
    let mut session = logged_in(quicksolver_page(), "es_app_collect");
    let download_dir = session.download_dir().unwrap().to_path_buf();

    let options = CollectOptions {
        timeout: Duration::from_secs(1),
        poll_interval: Duration::from_millis(10),
        delete_after: true,
    };
    let table = collect(&mut session, &config(), &options).unwrap();

    assert_eq!(table.row_count(), 3);
    assert_eq!(table.cell(2, "Isp"), Some("560.9"));
    assert_eq!(table.numeric_column("Voltage").unwrap(), vec![1000.0, 1100.0, 1200.0]);
    assert!(!download_dir
        .join("Capillary_IL and Cylindrical_Channel.csv")
        .exists());
    assert!(RESULT_CSV.starts_with("Voltage,"));
}

#[test]
fn settings_file_overrides_defaults() {
    let dir = unique_temp_dir("es_app_settings");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("espet.yaml");
    fs::write(
        &path,
        "download_timeout_s: 2.5\nupload_mode: bulk\nuse_cache: false\nselection:\n  feed: Low_Z\n  independent_variable: T\n",
    )
    .unwrap();

    let settings = es_app::load_settings(&path).unwrap();
    let options = settings.run_options().unwrap();
    assert_eq!(options.upload_mode, UploadMode::Bulk);
    assert!(!options.use_cache);
    assert_eq!(options.collect.timeout, Duration::from_millis(2500));
    assert_eq!(settings.selection.get(FieldKind::Feed), "Low_Z");
    assert_eq!(settings.selection.get(FieldKind::IndependentVariable), "T");

    es_app::save_settings(&path, &settings).unwrap();
    assert_eq!(es_app::load_settings(&path).unwrap(), settings);

    let missing = es_app::load_settings(&dir.join("absent.yaml")).unwrap_err();
    assert!(matches!(missing, AppError::SettingsFileRead { .. }));
}

/// Quicksolver page whose WebDriver connection drops on shutdown.
struct DroppedOnClose(FakeBrowser);

impl Browser for DroppedOnClose {
    fn open(&mut self, url: &str, download_dir: &Path) -> BrowserResult<()> {
        self.0.open(url, download_dir)
    }

    fn find(&mut self, locator: &Locator) -> BrowserResult<ElementState> {
        self.0.find(locator)
    }

    fn click(&mut self, locator: &Locator) -> BrowserResult<()> {
        self.0.click(locator)
    }

    fn clear(&mut self, locator: &Locator) -> BrowserResult<()> {
        self.0.clear(locator)
    }

    fn send_keys(&mut self, locator: &Locator, text: &str) -> BrowserResult<()> {
        self.0.send_keys(locator, text)
    }

    fn select_by_value(&mut self, locator: &Locator, value: &str) -> BrowserResult<()> {
        self.0.select_by_value(locator, value)
    }

    fn select_by_index(&mut self, locator: &Locator, index: usize) -> BrowserResult<()> {
        self.0.select_by_index(locator, index)
    }

    fn options(&mut self, locator: &Locator) -> BrowserResult<Vec<SelectOption>> {
        self.0.options(locator)
    }

    fn text_inputs(&mut self) -> BrowserResult<Vec<ElementState>> {
        self.0.text_inputs()
    }

    fn close(&mut self) -> BrowserResult<()> {
        Err(BrowserError::Transport {
            message: "chromedriver went away".to_string(),
        })
    }
}

#[test]
fn failed_close_keeps_the_collected_table() {
    let download_dir = unique_temp_dir("es_app_close_fails");
    let mut store = es_cache::MemoryFieldStore::new();
    let req = request(&download_dir, config(), fast_options(UploadMode::Individual));

    let mut session = Session::new(DroppedOnClose(quicksolver_page()));
    let response = execute(&mut session, &mut store, &req)
        .expect("a close failure must not discard a finished run");

    assert_eq!(response.table.row_count(), 3);
    assert!(!download_dir
        .join("Capillary_IL and Cylindrical_Channel.csv")
        .exists());
}

#[test]
fn failed_close_does_not_mask_the_run_error() {
    let download_dir = unique_temp_dir("es_app_close_fails_badlogin");
    let mut store = es_cache::MemoryFieldStore::new();
    let mut req = request(&download_dir, config(), fast_options(UploadMode::Individual));
    req.credentials.password = "wrong";

    let mut session = Session::new(DroppedOnClose(quicksolver_page()));
    let err = execute(&mut session, &mut store, &req).unwrap_err();
    assert!(matches!(err, AppError::AuthenticationFailed(_)));
}

#[test]
fn huge_timeout_in_settings_file_is_rejected() {
    let dir = unique_temp_dir("es_app_settings_timeout");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("espet.yaml");
    fs::write(&path, "download_timeout_s: 1e300\n").unwrap();

    let err = es_app::load_settings(&path).unwrap_err();
    assert!(matches!(err, AppError::Settings(_)));
}
