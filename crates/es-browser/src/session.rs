//! Session controller: page lifecycle and login on top of a [`Browser`].

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{BrowserError, BrowserResult};
use crate::locator::Locator;
use crate::traits::{Browser, ElementState};

/// Submit control of the quicksolver login form.
pub const LOGIN_SUBMIT_XPATH: &str = "/html/body/form/input[2]";

const USERNAME_FIELD: &str = "username";
const PASSWORD_FIELD: &str = "password";

/// One automated browser pointed at the quicksolver.
pub struct Session<B: Browser> {
    browser: B,
    download_dir: Option<PathBuf>,
}

impl<B: Browser> Session<B> {
    pub fn new(browser: B) -> Self {
        Self {
            browser,
            download_dir: None,
        }
    }

    /// Create the download directory, start the browser with it as the
    /// default download location, and load `target_url`.
    pub fn open(&mut self, target_url: &str, download_dir: &Path) -> BrowserResult<()> {
        fs::create_dir_all(download_dir)?;
        let download_dir = std::path::absolute(download_dir)?;

        info!(url = target_url, download_dir = %download_dir.display(), "opening quicksolver");
        self.browser.open(target_url, &download_dir)?;
        self.download_dir = Some(download_dir);
        Ok(())
    }

    /// Fill and submit the login form.
    ///
    /// A login form that is missing, or still showing after submit, is an
    /// authentication failure rather than a lookup failure.
    pub fn authenticate(&mut self, username: &str, password: &str) -> BrowserResult<()> {
        self.ensure_open()?;

        let user = Locator::name(USERNAME_FIELD);
        let pass = Locator::name(PASSWORD_FIELD);
        let submit = Locator::xpath(LOGIN_SUBMIT_XPATH);

        let filled = self
            .browser
            .send_keys(&user, username)
            .and_then(|_| self.browser.send_keys(&pass, password))
            .and_then(|_| self.browser.click(&submit));
        match filled {
            Ok(()) => {}
            Err(BrowserError::NotFound { locator }) => {
                return Err(BrowserError::AuthenticationFailed {
                    reason: format!("login form element missing: {}", locator),
                });
            }
            Err(e) => return Err(e),
        }

        if self.browser.is_present(&user)? {
            return Err(BrowserError::AuthenticationFailed {
                reason: "login form still shown after submit".to_string(),
            });
        }

        info!("logged in");
        Ok(())
    }

    pub fn find(&mut self, locator: &Locator) -> BrowserResult<ElementState> {
        self.ensure_open()?;
        self.browser.find(locator)
    }

    /// Select a dropdown option by value.
    pub fn select(&mut self, locator: &Locator, value: &str) -> BrowserResult<()> {
        self.ensure_open()?;
        self.browser.select_by_value(locator, value)
    }

    pub fn click(&mut self, locator: &Locator) -> BrowserResult<()> {
        self.ensure_open()?;
        self.browser.click(locator)
    }

    /// Direct access to the underlying browser for the form driver.
    pub fn browser(&mut self) -> &mut B {
        &mut self.browser
    }

    pub fn is_open(&self) -> bool {
        self.download_dir.is_some()
    }

    /// Absolute download directory, once opened.
    pub fn download_dir(&self) -> Option<&Path> {
        self.download_dir.as_deref()
    }

    pub fn close(&mut self) -> BrowserResult<()> {
        if self.download_dir.take().is_some() {
            self.browser.close()?;
        }
        Ok(())
    }

    pub fn into_inner(self) -> B {
        self.browser
    }

    fn ensure_open(&self) -> BrowserResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(BrowserError::Session {
                message: "session not opened".to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeBrowser, FakeSelect};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        dir.push(format!("{}_{}", prefix, nanos));
        dir
    }

    fn login_page() -> FakeBrowser {
        FakeBrowser::new()
            .with_login("ada", "hunter2")
            .with_select("emitter", FakeSelect::new(&["Capillary_IL", "Capillary_LM"]))
    }

    #[test]
    fn open_creates_absolute_download_dir() {
        let dir = unique_temp_dir("es_browser_open");
        let mut session = Session::new(login_page());
        session.open("http://quicksolver.test/", &dir).unwrap();

        assert!(dir.is_dir());
        assert!(session.download_dir().unwrap().is_absolute());
        assert!(session.is_open());
    }

    #[test]
    fn commands_before_open_fail_as_session_errors() {
        let mut session = Session::new(login_page());
        let err = session.find(&Locator::name("emitter")).unwrap_err();
        assert!(matches!(err, BrowserError::Session { .. }));
    }

    #[test]
    fn correct_credentials_log_in() {
        let mut session = Session::new(login_page());
        session
            .open("http://quicksolver.test/", &unique_temp_dir("es_browser_login"))
            .unwrap();
        session.authenticate("ada", "hunter2").unwrap();

        session
            .select(&Locator::name("emitter"), "Capillary_LM")
            .unwrap();
        assert_eq!(session.browser().selected("emitter"), Some("Capillary_LM"));
    }

    #[test]
    fn wrong_credentials_are_an_authentication_failure() {
        let mut session = Session::new(login_page());
        session
            .open("http://quicksolver.test/", &unique_temp_dir("es_browser_badlogin"))
            .unwrap();
        let err = session.authenticate("ada", "wrong").unwrap_err();
        assert!(matches!(err, BrowserError::AuthenticationFailed { .. }));
    }

    #[test]
    fn missing_login_form_is_an_authentication_failure() {
        let mut session = Session::new(FakeBrowser::new());
        session
            .open("http://quicksolver.test/", &unique_temp_dir("es_browser_nologin"))
            .unwrap();
        let err = session.authenticate("ada", "hunter2").unwrap_err();
        match err {
            BrowserError::AuthenticationFailed { reason } => {
                assert!(reason.contains("name=username"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn absent_element_is_not_found() {
        let mut session = Session::new(FakeBrowser::new());
        session
            .open("http://quicksolver.test/", &unique_temp_dir("es_browser_absent"))
            .unwrap();
        let err = session.find(&Locator::id("runButton")).unwrap_err();
        assert!(err.is_not_found());
    }
}
