//! Error handling for the SysY type engine
//!
//! Two kinds of failure exist. Contract violations (asking an Array handle
//! for its Int payload, computing a common type of a pointer) are bugs in
//! the caller and panic with a `TypeError::ContractViolation` message.
//! Everything else is malformed caller input and is returned as a `Result`.

use thiserror::Error;

/// Errors produced by the type engine
#[derive(Error, Debug)]
pub enum TypeError {
    #[error("internal type error: {operation} expects {expected}, found {found}")]
    ContractViolation {
        operation: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("array declarator needs at least one dimension")]
    EmptyDimensions,

    #[error("array dimension must be positive, found {value}")]
    InvalidDimension { value: i64 },

    #[error("array element must be int or an array, found {found}")]
    InvalidElement { found: String },

    #[error("unknown type name '{name}'")]
    UnknownType { name: String },

    #[error("type '{name}' is already declared")]
    DuplicateType { name: String },

    #[error("type {found} is too large to lay out")]
    TypeTooLarge { found: String },

    #[error("argument index {index} out of range for a function with {count} arguments")]
    ArgumentIndex { index: usize, count: usize },

    #[error("invalid type description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TypeError {
    /// Build the message for a broken caller contract
    pub fn contract(
        operation: &'static str,
        expected: &'static str,
        found: impl Into<String>,
    ) -> Self {
        TypeError::ContractViolation {
            operation,
            expected,
            found: found.into(),
        }
    }
}

/// Abort on a broken caller contract.
///
/// Never returns; the type engine does not coerce or default its way out of
/// an internal invariant failure.
#[track_caller]
pub(crate) fn contract_violation(
    operation: &'static str,
    expected: &'static str,
    found: impl Into<String>,
) -> ! {
    panic!("{}", TypeError::contract(operation, expected, found))
}
