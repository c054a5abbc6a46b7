//! Shared fixtures: an in-memory quicksolver page and temp directories.

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use es_app::form_driver::UPLOAD_CONFIG_XPATH;
use es_browser::fake::{FakeBrowser, FakeInput, FakeSelect};
use es_browser::{Locator, Session};
use es_core::FieldKind;

pub const USERNAME: &str = "ada";
pub const PASSWORD: &str = "hunter2";
pub const TARGET_URL: &str = "http://quicksolver.test/espet/qsolver/";

pub const RESULT_CSV: &str = "\
Voltage,Temperature,Pressure,Electric Current,Mass Flow,Thrust,Isp,Efficiency
1000,300,101325,1.2e-7,3.1e-11,1.5e-7,502.1,0.71
1100,300,101325,1.6e-7,3.9e-11,2.0e-7,531.4,0.73
1200,300,101325,2.1e-7,4.8e-11,2.6e-7,560.9,0.74
";

pub fn unique_temp_dir(prefix: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("{}_{}", prefix, nanos));
    dir
}

fn select_for(kind: FieldKind) -> FakeSelect {
    FakeSelect::new(&kind.domain())
}

/// Login-gated quicksolver form with a handful of free-text inputs.
///
/// `Voltage` is read-only while voltage is the independent variable and
/// `Work Function` is always read-only.
pub fn quicksolver_page() -> FakeBrowser {
    let mut browser = FakeBrowser::new().with_login(USERNAME, PASSWORD);
    for kind in FieldKind::ALL {
        let select = match kind {
            FieldKind::Propellant => select_for(kind).disable("Gallium,Liquid Metal"),
            _ => select_for(kind),
        };
        browser = browser.with_select(kind.form_name(), select);
    }
    browser
        .with_input(FakeInput::text("Voltage", "1000").editable_when(&["T", "P"]))
        .with_input(FakeInput::text("Temperature", "300"))
        .with_input(FakeInput::text("Radius", "2e-5"))
        .with_input(FakeInput::text("Work Function", "4.5").read_only())
        .with_input(FakeInput::text("Debug", "0").hidden())
        .with_button(Locator::id("runButton"))
        .with_button(Locator::name("Save Data"))
        .with_config_loader(Locator::xpath(UPLOAD_CONFIG_XPATH))
        .with_result_csv(RESULT_CSV)
}

/// An opened, logged-in session on [`quicksolver_page`].
pub fn logged_in(browser: FakeBrowser, prefix: &str) -> Session<FakeBrowser> {
    let mut session = Session::new(browser);
    session
        .open(TARGET_URL, &unique_temp_dir(prefix))
        .expect("open should succeed");
    session
        .authenticate(USERNAME, PASSWORD)
        .expect("login should succeed");
    session
}
