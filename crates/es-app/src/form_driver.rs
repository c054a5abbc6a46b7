//! Filling the quicksolver form.

use es_browser::{Browser, Locator, Session};
use es_cache::FieldMap;
use es_core::{AvailableOptions, Configuration, FieldKind};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

/// Button that reveals the bulk `Config` text area.
pub const UPLOAD_CONFIG_XPATH: &str =
    "//*[@id=\"mainForm\"]/table/tbody/tr/td[2]/table/tbody/tr/td[2]/table/tbody/tr[3]/td/input";

const CONFIG_AREA: &str = "Config";
const LOAD_CONFIG_BUTTON: &str = "Load Config";

/// Two full passes over the independent-variable options.
pub const DEFAULT_MAX_UNLOCK_CYCLES: usize = 6;

/// Number of options of the `independentVariable` dropdown.
const INDEPENDENT_VARIABLE_OPTIONS: usize = 3;

/// Dropdowns applied before any free-text field, in this order.
const SELECTION_ORDER: [FieldKind; 6] = FieldKind::CACHED_SELECTIONS;

/// What a scrape of the live form found.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedForm {
    /// Enabled options of the three narrowing dropdowns.
    pub available: AvailableOptions,
    /// Current dropdown selections plus editable, visible text inputs.
    pub fields: FieldMap,
}

/// Outcome of [`FormDriver::fill_individual`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FillReport {
    pub selected: usize,
    pub typed: usize,
    /// Fields that needed the unlock cycle, with the number of attempts.
    pub unlocked: Vec<(String, usize)>,
}

pub struct FormDriver<'s, B: Browser> {
    session: &'s mut Session<B>,
    max_unlock_cycles: usize,
}

impl<'s, B: Browser> FormDriver<'s, B> {
    pub fn new(session: &'s mut Session<B>, max_unlock_cycles: usize) -> Self {
        Self {
            session,
            max_unlock_cycles,
        }
    }

    /// Select emitter, feed and independent variable.
    ///
    /// These three decide which free-text fields the form shows, so they
    /// go first.
    pub fn select_primary_fields(&mut self, config: &Configuration) -> AppResult<()> {
        for kind in [
            FieldKind::Emitter,
            FieldKind::Feed,
            FieldKind::IndependentVariable,
        ] {
            let value = config.get(kind);
            debug!(field = kind.form_name(), value, "select");
            self.session.select(&Locator::name(kind.form_name()), value)?;
        }
        Ok(())
    }

    pub fn scrape_available_fields(&mut self) -> AppResult<ScrapedForm> {
        let available = AvailableOptions {
            propellants: self.enabled_options(FieldKind::Propellant)?,
            emitter_substrates: self.enabled_options(FieldKind::EmitterSubstrate)?,
            feed_substrates: self.enabled_options(FieldKind::FeedSubstrate)?,
        };

        let mut fields = FieldMap::new();
        for kind in SELECTION_ORDER {
            let state = self.session.find(&Locator::name(kind.form_name()))?;
            fields.insert(kind.form_name().to_string(), state.value);
        }
        for input in self.session.browser().text_inputs()? {
            if input.read_only || !input.displayed {
                continue;
            }
            let Some(name) = input.name.filter(|n| !n.is_empty()) else {
                continue;
            };
            fields.insert(name, input.value);
        }

        info!(fields = fields.len(), "scraped form");
        Ok(ScrapedForm { available, fields })
    }

    /// Type `fields` into the form one element at a time.
    pub fn fill_individual(
        &mut self,
        fields: &FieldMap,
        config: &Configuration,
    ) -> AppResult<FillReport> {
        let mut report = FillReport::default();

        for kind in SELECTION_ORDER {
            if let Some(value) = fields.get(kind.form_name()) {
                debug!(field = kind.form_name(), value = %value, "select");
                self.session.select(&Locator::name(kind.form_name()), value)?;
                report.selected += 1;
            }
        }

        for (name, value) in fields {
            if FieldKind::is_selection(name) {
                continue;
            }
            let locator = Locator::name(name.as_str());
            if self.session.find(&locator)?.read_only {
                let attempts = self.unlock_read_only_field(name)?;
                report.unlocked.push((name.clone(), attempts));
            }

            debug!(field = %name, value = %value, "type");
            let browser = self.session.browser();
            browser.clear(&locator)?;
            browser.send_keys(&locator, value)?;
            report.typed += 1;
        }

        self.session.select(
            &Locator::name(FieldKind::IndependentVariable.form_name()),
            config.independent_variable().key(),
        )?;
        Ok(report)
    }

    /// Cycle `independentVariable` until `field` becomes editable.
    ///
    /// Returns the number of selections made. Gives up after
    /// `max_unlock_cycles` attempts.
    pub fn unlock_read_only_field(&mut self, field: &str) -> AppResult<usize> {
        warn!(field, "field is read-only, cycling independent variable");
        let iv = Locator::name(FieldKind::IndependentVariable.form_name());
        let target = Locator::name(field);

        for attempt in 1..=self.max_unlock_cycles {
            let index = (attempt - 1) % INDEPENDENT_VARIABLE_OPTIONS;
            self.session.browser().select_by_index(&iv, index)?;
            debug!(field, attempt, index, "unlock cycle");
            if !self.session.find(&target)?.read_only {
                return Ok(attempt);
            }
        }

        Err(AppError::FieldLocked {
            field: field.to_string(),
            attempts: self.max_unlock_cycles,
        })
    }

    /// Load every field at once through the page's config loader.
    pub fn fill_bulk(&mut self, fields: &FieldMap) -> AppResult<()> {
        let json = serde_json::to_string(fields)
            .map_err(|e| AppError::InvalidInput(format!("cannot serialize fields: {}", e)))?;
        let area = Locator::name(CONFIG_AREA);

        self.session.click(&Locator::xpath(UPLOAD_CONFIG_XPATH))?;
        self.session.click(&area)?;
        let browser = self.session.browser();
        browser.clear(&area)?;
        browser.send_keys(&area, &json)?;
        self.session.click(&Locator::name(LOAD_CONFIG_BUTTON))?;

        debug!(fields = fields.len(), "bulk config loaded");
        Ok(())
    }

    fn enabled_options(&mut self, kind: FieldKind) -> AppResult<Vec<String>> {
        let options = self
            .session
            .browser()
            .options(&Locator::name(kind.form_name()))?;
        Ok(options
            .into_iter()
            .filter(|o| !o.disabled)
            .map(|o| o.value)
            .collect())
    }
}
