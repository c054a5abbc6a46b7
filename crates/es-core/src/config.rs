//! The validated seven-field selection driving one simulation.

use core::str::FromStr;

use crate::domain::{
    Categorical, Emitter, Feed, FieldKind, IndependentVariable, OutputField, Propellant, Substrate,
};
use crate::error::{CoreError, CoreResult};

/// Untyped input accepted at the configuration boundary.
///
/// Either an exact option value or a 0-based index into the field's domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceInput {
    Name(String),
    Index(usize),
}

impl From<&str> for ChoiceInput {
    fn from(value: &str) -> Self {
        ChoiceInput::Name(value.to_string())
    }
}

impl From<String> for ChoiceInput {
    fn from(value: String) -> Self {
        ChoiceInput::Name(value)
    }
}

impl From<usize> for ChoiceInput {
    fn from(value: usize) -> Self {
        ChoiceInput::Index(value)
    }
}

impl FromStr for ChoiceInput {
    type Err = core::convert::Infallible;

    /// Digits become an index, anything else is taken as an option value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<usize>() {
            Ok(index) => ChoiceInput::Index(index),
            Err(_) => ChoiceInput::Name(s.to_string()),
        })
    }
}

/// Options left enabled on the live form after the primary selections.
///
/// The static domains are supersets; the form disables combinations it
/// cannot simulate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailableOptions {
    pub propellants: Vec<String>,
    pub emitter_substrates: Vec<String>,
    pub feed_substrates: Vec<String>,
}

/// Seven categorical selections, each always inside its domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Configuration {
    emitter: Emitter,
    feed: Feed,
    propellant: Propellant,
    emitter_substrate: Substrate,
    feed_substrate: Substrate,
    field: OutputField,
    independent_variable: IndependentVariable,
}

fn resolve<T: Categorical>(kind: FieldKind, input: &ChoiceInput) -> CoreResult<T> {
    T::resolve(input).map_err(|err| match err {
        CoreError::InvalidConfig { value, .. } => CoreError::InvalidConfig { field: kind, value },
        other => other,
    })
}

impl Configuration {
    pub fn emitter(&self) -> Emitter {
        self.emitter
    }

    pub fn feed(&self) -> Feed {
        self.feed
    }

    pub fn propellant(&self) -> Propellant {
        self.propellant
    }

    pub fn emitter_substrate(&self) -> Substrate {
        self.emitter_substrate
    }

    pub fn feed_substrate(&self) -> Substrate {
        self.feed_substrate
    }

    pub fn field(&self) -> OutputField {
        self.field
    }

    pub fn independent_variable(&self) -> IndependentVariable {
        self.independent_variable
    }

    pub fn set_emitter(&mut self, value: Emitter) {
        self.emitter = value;
    }

    pub fn set_feed(&mut self, value: Feed) {
        self.feed = value;
    }

    pub fn set_propellant(&mut self, value: Propellant) {
        self.propellant = value;
    }

    pub fn set_emitter_substrate(&mut self, value: Substrate) {
        self.emitter_substrate = value;
    }

    pub fn set_feed_substrate(&mut self, value: Substrate) {
        self.feed_substrate = value;
    }

    pub fn set_field(&mut self, value: OutputField) {
        self.field = value;
    }

    pub fn set_independent_variable(&mut self, value: IndependentVariable) {
        self.independent_variable = value;
    }

    /// Set a field from a name or positional index.
    ///
    /// On error the configuration is left untouched.
    pub fn set(&mut self, kind: FieldKind, input: impl Into<ChoiceInput>) -> CoreResult<()> {
        let input = input.into();
        match kind {
            FieldKind::Emitter => self.emitter = resolve(kind, &input)?,
            FieldKind::Feed => self.feed = resolve(kind, &input)?,
            FieldKind::Propellant => self.propellant = resolve(kind, &input)?,
            FieldKind::EmitterSubstrate => self.emitter_substrate = resolve(kind, &input)?,
            FieldKind::FeedSubstrate => self.feed_substrate = resolve(kind, &input)?,
            FieldKind::Field => self.field = resolve(kind, &input)?,
            FieldKind::IndependentVariable => {
                self.independent_variable = resolve(kind, &input)?
            }
        }
        Ok(())
    }

    /// Builder-style [`Configuration::set`].
    pub fn with(mut self, kind: FieldKind, input: impl Into<ChoiceInput>) -> CoreResult<Self> {
        self.set(kind, input)?;
        Ok(self)
    }

    /// Current option value of a field.
    pub fn get(&self, kind: FieldKind) -> &'static str {
        match kind {
            FieldKind::Emitter => self.emitter.key(),
            FieldKind::Feed => self.feed.key(),
            FieldKind::Propellant => self.propellant.key(),
            FieldKind::EmitterSubstrate => self.emitter_substrate.key(),
            FieldKind::FeedSubstrate => self.feed_substrate.key(),
            FieldKind::Field => self.field.key(),
            FieldKind::IndependentVariable => self.independent_variable.key(),
        }
    }

    /// `(form name, option value)` for every field, in form order.
    pub fn selections(&self) -> Vec<(&'static str, &'static str)> {
        FieldKind::ALL
            .iter()
            .map(|kind| (kind.form_name(), self.get(*kind)))
            .collect()
    }

    /// Check the narrowed dropdowns reported by a live scrape.
    ///
    /// An empty list means the scrape saw no options for that selector and
    /// is not treated as a restriction.
    pub fn check_available(&self, available: &AvailableOptions) -> CoreResult<()> {
        let checks = [
            (FieldKind::Propellant, &available.propellants),
            (FieldKind::EmitterSubstrate, &available.emitter_substrates),
            (FieldKind::FeedSubstrate, &available.feed_substrates),
        ];
        for (kind, options) in checks {
            let value = self.get(kind);
            if !options.is_empty() && !options.iter().any(|option| option == value) {
                return Err(CoreError::Unavailable {
                    field: kind,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }
}
