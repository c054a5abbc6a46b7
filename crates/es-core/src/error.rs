use thiserror::Error;

use crate::domain::FieldKind;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid configuration value for {field}: {value}")]
    InvalidConfig { field: FieldKind, value: String },

    #[error("Selection not available on the live form for {field}: {value}")]
    Unavailable { field: FieldKind, value: String },
}

impl CoreError {
    /// The configuration field this error refers to.
    pub fn field(&self) -> FieldKind {
        match self {
            CoreError::InvalidConfig { field, .. } => *field,
            CoreError::Unavailable { field, .. } => *field,
        }
    }
}
