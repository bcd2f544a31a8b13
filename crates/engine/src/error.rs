//! The module contains the errors the engine can throw.
//!
//! The list/report compilers reject bad client input with:
//!
//! - [`InvalidField`] when a filter references an unknown field.
//! - [`InvalidOperator`] when an operator is not valid for the field's type.
//! - [`InvalidSortField`] when a sort column is outside the whitelist.
//!
//!  [`InvalidField`]: EngineError::InvalidField
//!  [`InvalidOperator`]: EngineError::InvalidOperator
//!  [`InvalidSortField`]: EngineError::InvalidSortField
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("invalid filter field: \"{0}\"")]
    InvalidField(String),
    #[error("invalid filter operation: {0}")]
    InvalidOperator(String),
    #[error("invalid sort field: \"{0}\"")]
    InvalidSortField(String),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid filter value: {0}")]
    InvalidValue(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("internal error: {0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidField(a), Self::InvalidField(b)) => a == b,
            (Self::InvalidOperator(a), Self::InvalidOperator(b)) => a == b,
            (Self::InvalidSortField(a), Self::InvalidSortField(b)) => a == b,
            (Self::InvalidDate(a), Self::InvalidDate(b)) => a == b,
            (Self::InvalidValue(a), Self::InvalidValue(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::Internal(a), Self::Internal(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
