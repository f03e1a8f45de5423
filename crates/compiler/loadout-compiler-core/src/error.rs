//! Compiler error taxonomy.
//!
//! The first four variants are pre-flight failures and must be raised before
//! anything is written to the output store; the last three can occur
//! mid-transaction and oblige the caller (the pipeline in `compile`) to roll
//! back before surfacing them.

use std::fmt;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("clip '{clip}' animates an incompatible property ({owner} / {property})")]
    IncompatibleAnimation {
        clip: String,
        owner: String,
        property: String,
    },

    #[error("parameter '{name}' already exists with an incompatible type")]
    WrongParameterType { name: String },

    #[error("{resource} budget exceeded (required {required}, available {available})")]
    BudgetExceeded {
        resource: BudgetResource,
        required: u32,
        available: u32,
    },

    #[error("asset conflict at '{path}': {reason}")]
    AssetConflict { path: String, reason: String },

    #[error("cancelled by user")]
    UserCancelled,

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl CompileError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        CompileError::InvalidInput {
            reason: reason.into(),
        }
    }

    pub fn asset_conflict(path: impl Into<String>, reason: impl Into<String>) -> Self {
        CompileError::AssetConflict {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Pre-flight errors must never be preceded by a store write.
    pub fn is_preflight(&self) -> bool {
        matches!(
            self,
            CompileError::InvalidInput { .. }
                | CompileError::IncompatibleAnimation { .. }
                | CompileError::WrongParameterType { .. }
                | CompileError::BudgetExceeded { .. }
        )
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BudgetResource {
    /// Distinct nonzero values on the shared selector channel.
    SelectorValues,
    /// Persisted-parameter memory cost.
    ParameterMemory,
}

impl fmt::Display for BudgetResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetResource::SelectorValues => write!(f, "selector value"),
            BudgetResource::ParameterMemory => write!(f, "parameter memory"),
        }
    }
}
