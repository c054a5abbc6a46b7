//! fantoccini-backed [`Browser`].
//!
//! fantoccini is async; the quicksolver driver is strictly sequential, so the
//! browser owns a current-thread tokio runtime and blocks on every command.

use std::path::Path;

use fantoccini::elements::Element;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Map, Value, json};
use tokio::runtime::Runtime;
use tracing::debug;

use crate::error::{BrowserError, BrowserResult};
use crate::locator::Locator;
use crate::traits::{Browser, ElementState, SelectOption};

/// How to reach and launch the WebDriver-controlled browser.
#[derive(Debug, Clone)]
pub struct WebDriverOptions {
    /// chromedriver-compatible endpoint.
    pub webdriver_url: String,
    pub headless: bool,
}

impl Default for WebDriverOptions {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:4444".to_string(),
            headless: false,
        }
    }
}

pub struct WebDriverBrowser {
    options: WebDriverOptions,
    runtime: Runtime,
    client: Option<Client>,
}

impl WebDriverBrowser {
    pub fn new(options: WebDriverOptions) -> BrowserResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        Ok(Self {
            options,
            runtime,
            client: None,
        })
    }

    fn capabilities(&self, download_dir: &Path) -> Map<String, Value> {
        let mut args = vec!["--window-size=1400,1000".to_string()];
        if self.options.headless {
            args.push("--headless=new".to_string());
        }

        let mut caps = Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({
                "args": args,
                "prefs": {
                    "download.default_directory": download_dir.to_string_lossy(),
                    "download.prompt_for_download": false,
                    "download.directory_upgrade": true,
                },
            }),
        );
        caps
    }

    fn client(&self) -> BrowserResult<&Client> {
        self.client.as_ref().ok_or_else(|| BrowserError::Session {
            message: "browser not started".to_string(),
        })
    }

    /// First element matching `locator`.
    ///
    /// Uses `find_all` so absence is an empty result rather than an error
    /// that has to be told apart from transport failures.
    async fn locate(client: &Client, locator: &Locator) -> BrowserResult<Element> {
        let found = match locator {
            Locator::XPath(path) => client.find_all(fantoccini::Locator::XPath(path)).await,
            other => {
                let css = other.to_css().unwrap_or_default();
                client.find_all(fantoccini::Locator::Css(&css)).await
            }
        }
        .map_err(BrowserError::transport)?;

        found
            .into_iter()
            .next()
            .ok_or_else(|| BrowserError::NotFound {
                locator: locator.clone(),
            })
    }

    async fn snapshot(element: &Element) -> BrowserResult<ElementState> {
        let name = element.attr("name").await.map_err(BrowserError::transport)?;
        let value = element
            .prop("value")
            .await
            .map_err(BrowserError::transport)?
            .unwrap_or_default();
        let read_only = element
            .attr("readonly")
            .await
            .map_err(BrowserError::transport)?
            .is_some();
        let disabled = element
            .attr("disabled")
            .await
            .map_err(BrowserError::transport)?
            .is_some();
        let displayed = element
            .is_displayed()
            .await
            .map_err(BrowserError::transport)?;
        Ok(ElementState {
            name,
            value,
            read_only,
            disabled,
            displayed,
        })
    }
}

impl Browser for WebDriverBrowser {
    fn open(&mut self, url: &str, download_dir: &Path) -> BrowserResult<()> {
        if self.client.is_some() {
            self.close()?;
        }

        let caps = self.capabilities(download_dir);
        let webdriver_url = self.options.webdriver_url.clone();
        let client = self.runtime.block_on(async {
            let mut builder = ClientBuilder::native();
            builder.capabilities(caps);
            builder
                .connect(&webdriver_url)
                .await
                .map_err(|e| BrowserError::Session {
                    message: format!("cannot start browser via {}: {}", webdriver_url, e),
                })
        })?;

        self.runtime
            .block_on(client.goto(url))
            .map_err(BrowserError::transport)?;
        self.client = Some(client);
        Ok(())
    }

    fn find(&mut self, locator: &Locator) -> BrowserResult<ElementState> {
        let client = self.client()?;
        self.runtime.block_on(async {
            let element = Self::locate(client, locator).await?;
            Self::snapshot(&element).await
        })
    }

    fn click(&mut self, locator: &Locator) -> BrowserResult<()> {
        debug!(%locator, "click");
        let client = self.client()?;
        self.runtime.block_on(async {
            let element = Self::locate(client, locator).await?;
            element.click().await.map_err(BrowserError::transport)?;
            Ok(())
        })
    }

    fn clear(&mut self, locator: &Locator) -> BrowserResult<()> {
        let client = self.client()?;
        self.runtime.block_on(async {
            let element = Self::locate(client, locator).await?;
            element.clear().await.map_err(BrowserError::transport)
        })
    }

    fn send_keys(&mut self, locator: &Locator, text: &str) -> BrowserResult<()> {
        let client = self.client()?;
        self.runtime.block_on(async {
            let element = Self::locate(client, locator).await?;
            element.send_keys(text).await.map_err(BrowserError::transport)
        })
    }

    fn select_by_value(&mut self, locator: &Locator, value: &str) -> BrowserResult<()> {
        debug!(%locator, value, "select");
        let client = self.client()?;
        self.runtime.block_on(async {
            let element = Self::locate(client, locator).await?;
            element
                .select_by_value(value)
                .await
                .map_err(|e| BrowserError::Transport {
                    message: format!("select {} on {}: {}", value, locator, e),
                })
        })
    }

    fn select_by_index(&mut self, locator: &Locator, index: usize) -> BrowserResult<()> {
        let client = self.client()?;
        self.runtime.block_on(async {
            let element = Self::locate(client, locator).await?;
            element
                .select_by_index(index)
                .await
                .map_err(BrowserError::transport)
        })
    }

    fn options(&mut self, locator: &Locator) -> BrowserResult<Vec<SelectOption>> {
        let client = self.client()?;
        self.runtime.block_on(async {
            let select = Self::locate(client, locator).await?;
            let options = select
                .find_all(fantoccini::Locator::Css("option"))
                .await
                .map_err(BrowserError::transport)?;

            let mut out = Vec::with_capacity(options.len());
            for option in options {
                let value = option
                    .attr("value")
                    .await
                    .map_err(BrowserError::transport)?
                    .unwrap_or_default();
                let disabled = option
                    .attr("disabled")
                    .await
                    .map_err(BrowserError::transport)?
                    .is_some();
                out.push(SelectOption { value, disabled });
            }
            Ok(out)
        })
    }

    fn text_inputs(&mut self) -> BrowserResult<Vec<ElementState>> {
        let client = self.client()?;
        self.runtime.block_on(async {
            let inputs = client
                .find_all(fantoccini::Locator::Css("input[type='text']"))
                .await
                .map_err(BrowserError::transport)?;

            let mut out = Vec::with_capacity(inputs.len());
            for input in inputs {
                let state = Self::snapshot(&input).await?;
                if state.displayed {
                    out.push(state);
                }
            }
            Ok(out)
        })
    }

    fn close(&mut self) -> BrowserResult<()> {
        if let Some(client) = self.client.take() {
            self.runtime
                .block_on(client.close())
                .map_err(BrowserError::transport)?;
        }
        Ok(())
    }
}

impl Drop for WebDriverBrowser {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capabilities_carry_download_directory() {
        let browser = WebDriverBrowser::new(WebDriverOptions {
            webdriver_url: "http://localhost:4444".to_string(),
            headless: true,
        })
        .unwrap();
        let caps = browser.capabilities(Path::new("/tmp/output_data"));
        let chrome = &caps["goog:chromeOptions"];

        assert_eq!(
            chrome["prefs"]["download.default_directory"],
            "/tmp/output_data"
        );
        assert_eq!(chrome["prefs"]["download.prompt_for_download"], false);
        assert!(
            chrome["args"]
                .as_array()
                .unwrap()
                .iter()
                .any(|a| a == "--headless=new")
        );
    }

    #[test]
    fn commands_before_open_are_session_errors() {
        let mut browser = WebDriverBrowser::new(WebDriverOptions::default()).unwrap();
        let err = browser.find(&Locator::name("emitter")).unwrap_err();
        assert!(matches!(err, BrowserError::Session { .. }));
    }
}
