//! The browser capability.

use std::path::Path;

use crate::error::{BrowserError, BrowserResult};
use crate::locator::Locator;

/// Snapshot of one element's state at lookup time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementState {
    pub name: Option<String>,
    /// Current value, not the initial `value` attribute.
    pub value: String,
    pub read_only: bool,
    pub disabled: bool,
    pub displayed: bool,
}

/// One `<option>` of a `<select>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub disabled: bool,
}

/// Primitives the form driver needs from an automated browser.
///
/// Every lookup fails with [`BrowserError::NotFound`] when the element is
/// absent, so callers can tell "page changed" from transport failures.
pub trait Browser {
    /// Start the browser with `download_dir` as its default download
    /// directory, then navigate to `url`.
    fn open(&mut self, url: &str, download_dir: &Path) -> BrowserResult<()>;

    fn find(&mut self, locator: &Locator) -> BrowserResult<ElementState>;

    fn click(&mut self, locator: &Locator) -> BrowserResult<()>;

    fn clear(&mut self, locator: &Locator) -> BrowserResult<()>;

    fn send_keys(&mut self, locator: &Locator, text: &str) -> BrowserResult<()>;

    fn select_by_value(&mut self, locator: &Locator, value: &str) -> BrowserResult<()>;

    fn select_by_index(&mut self, locator: &Locator, index: usize) -> BrowserResult<()>;

    /// All options of a `<select>`, disabled ones included.
    fn options(&mut self, locator: &Locator) -> BrowserResult<Vec<SelectOption>>;

    /// Every displayed `<input type="text">` on the page.
    fn text_inputs(&mut self) -> BrowserResult<Vec<ElementState>>;

    fn close(&mut self) -> BrowserResult<()>;

    /// Like [`Browser::find`], but absence is `Ok(false)`.
    fn is_present(&mut self, locator: &Locator) -> BrowserResult<bool> {
        match self.find(locator) {
            Ok(_) => Ok(true),
            Err(BrowserError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl<B: Browser + ?Sized> Browser for &mut B {
    fn open(&mut self, url: &str, download_dir: &Path) -> BrowserResult<()> {
        (**self).open(url, download_dir)
    }

    fn find(&mut self, locator: &Locator) -> BrowserResult<ElementState> {
        (**self).find(locator)
    }

    fn click(&mut self, locator: &Locator) -> BrowserResult<()> {
        (**self).click(locator)
    }

    fn clear(&mut self, locator: &Locator) -> BrowserResult<()> {
        (**self).clear(locator)
    }

    fn send_keys(&mut self, locator: &Locator, text: &str) -> BrowserResult<()> {
        (**self).send_keys(locator, text)
    }

    fn select_by_value(&mut self, locator: &Locator, value: &str) -> BrowserResult<()> {
        (**self).select_by_value(locator, value)
    }

    fn select_by_index(&mut self, locator: &Locator, index: usize) -> BrowserResult<()> {
        (**self).select_by_index(locator, index)
    }

    fn options(&mut self, locator: &Locator) -> BrowserResult<Vec<SelectOption>> {
        (**self).options(locator)
    }

    fn text_inputs(&mut self) -> BrowserResult<Vec<ElementState>> {
        (**self).text_inputs()
    }

    fn close(&mut self) -> BrowserResult<()> {
        (**self).close()
    }
}
