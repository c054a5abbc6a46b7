//! In-memory quicksolver form.
//!
//! Models just enough of the remote page to exercise the form driver:
//! a login form, dropdowns with disabled options, text inputs whose
//! editability depends on the selected independent variable, the bulk
//! config loader, and a "Save Data" button that drops a CSV into the
//! download directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{BrowserError, BrowserResult};
use crate::locator::Locator;
use crate::session::LOGIN_SUBMIT_XPATH;
use crate::traits::{Browser, ElementState, SelectOption};

/// Every call made against the fake, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(String),
    Find(Locator),
    Click(Locator),
    Clear(Locator),
    SendKeys(Locator, String),
    SelectValue(Locator, String),
    SelectIndex(Locator, usize),
    Options(Locator),
    TextInputs,
    Close,
}

#[derive(Debug, Clone)]
pub struct FakeSelect {
    pub options: Vec<SelectOption>,
    pub selected: usize,
}

impl FakeSelect {
    pub fn new<S: AsRef<str>>(values: &[S]) -> Self {
        Self {
            options: values
                .iter()
                .map(|v| SelectOption {
                    value: v.as_ref().to_string(),
                    disabled: false,
                })
                .collect(),
            selected: 0,
        }
    }

    pub fn disable(mut self, value: &str) -> Self {
        for option in &mut self.options {
            if option.value == value {
                option.disabled = true;
            }
        }
        self
    }

    pub fn value(&self) -> &str {
        self.options
            .get(self.selected)
            .map(|o| o.value.as_str())
            .unwrap_or("")
    }
}

#[derive(Debug, Clone)]
pub struct FakeInput {
    pub name: String,
    pub value: String,
    pub displayed: bool,
    /// Always read-only.
    pub read_only: bool,
    /// Editable only while `independentVariable` holds one of these values.
    pub editable_when: Option<Vec<String>>,
}

impl FakeInput {
    pub fn text(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            displayed: true,
            read_only: false,
            editable_when: None,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    pub fn editable_when(mut self, values: &[&str]) -> Self {
        self.editable_when = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }
}

#[derive(Debug, Clone)]
struct FakeLogin {
    username: String,
    password: String,
    typed_username: String,
    typed_password: String,
}

const INDEPENDENT_VARIABLE: &str = "independentVariable";

/// Scriptable stand-in for the quicksolver page.
#[derive(Debug, Clone, Default)]
pub struct FakeBrowser {
    download_dir: Option<PathBuf>,
    login: Option<FakeLogin>,
    selects: BTreeMap<String, FakeSelect>,
    inputs: Vec<FakeInput>,
    buttons: Vec<Locator>,
    config_area: Option<String>,
    result_csv: Option<String>,
    log: Vec<Command>,
}

impl FakeBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require these credentials before the form is usable.
    pub fn with_login(mut self, username: &str, password: &str) -> Self {
        self.login = Some(FakeLogin {
            username: username.to_string(),
            password: password.to_string(),
            typed_username: String::new(),
            typed_password: String::new(),
        });
        self
    }

    pub fn with_select(mut self, name: &str, select: FakeSelect) -> Self {
        self.selects.insert(name.to_string(), select);
        self
    }

    pub fn with_input(mut self, input: FakeInput) -> Self {
        self.inputs.push(input);
        self
    }

    pub fn with_button(mut self, locator: Locator) -> Self {
        self.buttons.push(locator);
        self
    }

    /// Text written as `{emitter} and {feed}.csv` when "Save Data" is clicked.
    pub fn with_result_csv(mut self, csv: &str) -> Self {
        self.result_csv = Some(csv.to_string());
        self
    }

    /// Enable the bulk config loader (`Config` area and `Load Config` button).
    pub fn with_config_loader(mut self, upload_button: Locator) -> Self {
        self.config_area = Some(String::new());
        self.buttons.push(upload_button);
        self.buttons.push(Locator::name("Load Config"));
        self
    }

    pub fn log(&self) -> &[Command] {
        &self.log
    }

    pub fn count(&self, pred: impl Fn(&Command) -> bool) -> usize {
        self.log.iter().filter(|c| pred(c)).count()
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }

    pub fn selected(&self, name: &str) -> Option<&str> {
        self.selects.get(name).map(|s| s.value())
    }

    pub fn input_value(&self, name: &str) -> Option<&str> {
        self.inputs
            .iter()
            .find(|i| i.name == name)
            .map(|i| i.value.as_str())
    }

    pub fn is_logged_in(&self) -> bool {
        self.login.is_none()
    }

    fn opened(&self) -> BrowserResult<&Path> {
        self.download_dir.as_deref().ok_or_else(|| BrowserError::Session {
            message: "browser not started".to_string(),
        })
    }

    fn not_found(locator: &Locator) -> BrowserError {
        BrowserError::NotFound {
            locator: locator.clone(),
        }
    }

    fn input_is_read_only(&self, input: &FakeInput) -> bool {
        if input.read_only {
            return true;
        }
        match &input.editable_when {
            Some(values) => {
                let current = self.selected(INDEPENDENT_VARIABLE).unwrap_or("");
                !values.iter().any(|v| v == current)
            }
            None => false,
        }
    }

    fn input_state(&self, input: &FakeInput) -> ElementState {
        ElementState {
            name: Some(input.name.clone()),
            value: input.value.clone(),
            read_only: self.input_is_read_only(input),
            disabled: false,
            displayed: input.displayed,
        }
    }

    fn input_index(&self, locator: &Locator) -> Option<usize> {
        match locator {
            Locator::Name(name) => self.inputs.iter().position(|i| &i.name == name),
            _ => None,
        }
    }

    fn select_mut(&mut self, locator: &Locator) -> BrowserResult<&mut FakeSelect> {
        let name = match locator {
            Locator::Name(name) => name.clone(),
            _ => return Err(Self::not_found(locator)),
        };
        self.selects
            .get_mut(&name)
            .ok_or_else(|| Self::not_found(locator))
    }

    fn on_login_page(&self) -> bool {
        self.login.is_some()
    }

    fn submit_login(&mut self) {
        let accepted = self
            .login
            .as_ref()
            .map(|l| l.typed_username == l.username && l.typed_password == l.password)
            .unwrap_or(true);
        if accepted {
            self.login = None;
        } else if let Some(login) = self.login.as_mut() {
            login.typed_username.clear();
            login.typed_password.clear();
        }
    }

    fn load_config(&mut self) -> BrowserResult<()> {
        let text = self.config_area.clone().unwrap_or_default();
        let parsed: BTreeMap<String, String> =
            serde_json::from_str(&text).map_err(|e| BrowserError::Transport {
                message: format!("page rejected config: {}", e),
            })?;

        for (name, value) in parsed {
            if let Some(select) = self.selects.get_mut(&name) {
                if let Some(pos) = select.options.iter().position(|o| o.value == value) {
                    select.selected = pos;
                }
            } else if let Some(input) = self.inputs.iter_mut().find(|i| i.name == name) {
                input.value = value;
            }
        }
        Ok(())
    }

    fn save_data(&self) -> BrowserResult<()> {
        let Some(csv) = &self.result_csv else {
            return Ok(());
        };
        let dir = self.opened()?;
        let file_name = format!(
            "{} and {}.csv",
            self.selected("emitter").unwrap_or(""),
            self.selected("feed").unwrap_or("")
        );
        fs::write(dir.join(file_name), csv)?;
        Ok(())
    }
}

impl Browser for FakeBrowser {
    fn open(&mut self, url: &str, download_dir: &Path) -> BrowserResult<()> {
        self.log.push(Command::Open(url.to_string()));
        self.download_dir = Some(download_dir.to_path_buf());
        Ok(())
    }

    fn find(&mut self, locator: &Locator) -> BrowserResult<ElementState> {
        self.log.push(Command::Find(locator.clone()));
        self.opened()?;

        if self.on_login_page() {
            return match locator {
                Locator::Name(n) if n == "username" || n == "password" => Ok(ElementState {
                    name: Some(n.clone()),
                    displayed: true,
                    ..ElementState::default()
                }),
                _ => Err(Self::not_found(locator)),
            };
        }

        if let Some(index) = self.input_index(locator) {
            return Ok(self.input_state(&self.inputs[index]));
        }
        if let Locator::Name(name) = locator {
            if let Some(select) = self.selects.get(name) {
                return Ok(ElementState {
                    name: Some(name.clone()),
                    value: select.value().to_string(),
                    displayed: true,
                    ..ElementState::default()
                });
            }
            if name == "Config" && self.config_area.is_some() {
                return Ok(ElementState {
                    name: Some(name.clone()),
                    value: self.config_area.clone().unwrap_or_default(),
                    displayed: true,
                    ..ElementState::default()
                });
            }
        }
        if self.buttons.contains(locator) {
            return Ok(ElementState {
                displayed: true,
                ..ElementState::default()
            });
        }
        Err(Self::not_found(locator))
    }

    fn click(&mut self, locator: &Locator) -> BrowserResult<()> {
        self.log.push(Command::Click(locator.clone()));
        self.opened()?;

        if self.on_login_page() {
            return match locator {
                Locator::XPath(path) if path == LOGIN_SUBMIT_XPATH => {
                    self.submit_login();
                    Ok(())
                }
                _ => Err(Self::not_found(locator)),
            };
        }

        if matches!(locator, Locator::Name(n) if n == "Config") && self.config_area.is_some() {
            return Ok(());
        }
        if !self.buttons.contains(locator) {
            return Err(Self::not_found(locator));
        }
        match locator {
            Locator::Name(n) if n == "Load Config" => self.load_config(),
            Locator::Name(n) if n == "Save Data" => self.save_data(),
            _ => Ok(()),
        }
    }

    fn clear(&mut self, locator: &Locator) -> BrowserResult<()> {
        self.log.push(Command::Clear(locator.clone()));
        self.opened()?;

        if matches!(locator, Locator::Name(n) if n == "Config") {
            return match self.config_area.as_mut() {
                Some(area) => {
                    area.clear();
                    Ok(())
                }
                None => Err(Self::not_found(locator)),
            };
        }

        let index = self
            .input_index(locator)
            .ok_or_else(|| Self::not_found(locator))?;
        if self.input_is_read_only(&self.inputs[index]) {
            // Browsers silently ignore edits to read-only inputs.
            return Ok(());
        }
        self.inputs[index].value.clear();
        Ok(())
    }

    fn send_keys(&mut self, locator: &Locator, text: &str) -> BrowserResult<()> {
        self.log
            .push(Command::SendKeys(locator.clone(), text.to_string()));
        self.opened()?;

        if let Some(login) = self.login.as_mut() {
            return match locator {
                Locator::Name(n) if n == "username" => {
                    login.typed_username.push_str(text);
                    Ok(())
                }
                Locator::Name(n) if n == "password" => {
                    login.typed_password.push_str(text);
                    Ok(())
                }
                _ => Err(Self::not_found(locator)),
            };
        }

        if matches!(locator, Locator::Name(n) if n == "Config") {
            return match self.config_area.as_mut() {
                Some(area) => {
                    area.push_str(text);
                    Ok(())
                }
                None => Err(Self::not_found(locator)),
            };
        }

        let index = self
            .input_index(locator)
            .ok_or_else(|| Self::not_found(locator))?;
        if !self.input_is_read_only(&self.inputs[index]) {
            self.inputs[index].value.push_str(text);
        }
        Ok(())
    }

    fn select_by_value(&mut self, locator: &Locator, value: &str) -> BrowserResult<()> {
        self.log
            .push(Command::SelectValue(locator.clone(), value.to_string()));
        self.opened()?;

        let select = self.select_mut(locator)?;
        let pos = select
            .options
            .iter()
            .position(|o| o.value == value)
            .ok_or_else(|| BrowserError::InvalidElement {
                locator: locator.clone(),
                what: "no option with that value",
            })?;
        if select.options[pos].disabled {
            return Err(BrowserError::InvalidElement {
                locator: locator.clone(),
                what: "option is disabled",
            });
        }
        select.selected = pos;
        Ok(())
    }

    fn select_by_index(&mut self, locator: &Locator, index: usize) -> BrowserResult<()> {
        self.log.push(Command::SelectIndex(locator.clone(), index));
        self.opened()?;

        let select = self.select_mut(locator)?;
        if index >= select.options.len() {
            return Err(BrowserError::InvalidElement {
                locator: locator.clone(),
                what: "option index out of range",
            });
        }
        select.selected = index;
        Ok(())
    }

    fn options(&mut self, locator: &Locator) -> BrowserResult<Vec<SelectOption>> {
        self.log.push(Command::Options(locator.clone()));
        self.opened()?;
        Ok(self.select_mut(locator)?.options.clone())
    }

    fn text_inputs(&mut self) -> BrowserResult<Vec<ElementState>> {
        self.log.push(Command::TextInputs);
        self.opened()?;
        if self.on_login_page() {
            return Ok(Vec::new());
        }
        Ok(self
            .inputs
            .iter()
            .filter(|i| i.displayed)
            .map(|i| self.input_state(i))
            .collect())
    }

    fn close(&mut self) -> BrowserResult<()> {
        self.log.push(Command::Close);
        self.download_dir = None;
        Ok(())
    }
}
