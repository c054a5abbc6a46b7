//! es-browser: the browser capability the quicksolver driver is written against.
//!
//! Contains:
//! - traits (the `Browser` capability and element snapshots)
//! - locator (how elements are addressed)
//! - session (open/authenticate on top of any `Browser`)
//! - webdriver (fantoccini-backed implementation)
//! - fake (in-memory form, behind the `fake` feature)

pub mod error;
pub mod locator;
pub mod session;
pub mod traits;
pub mod webdriver;

#[cfg(any(test, feature = "fake"))]
pub mod fake;

pub use error::{BrowserError, BrowserResult};
pub use locator::Locator;
pub use session::{LOGIN_SUBMIT_XPATH, Session};
pub use traits::{Browser, ElementState, SelectOption};
pub use webdriver::{WebDriverBrowser, WebDriverOptions};
