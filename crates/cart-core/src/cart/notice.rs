//! User-facing notifications for failed cart operations.

use serde::Serialize;
use std::fmt;

use crate::error::CartError;

/// The cart operation a notice reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Add,
    Remove,
    UpdateAmount,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Remove => "remove",
            Operation::UpdateAmount => "update_amount",
        }
    }

    fn failure_message(&self) -> &'static str {
        match self {
            Operation::Add => "Error adding product",
            Operation::Remove => "Error removing product",
            Operation::UpdateAmount => "Error changing product amount",
        }
    }
}

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Error,
}

/// A short message for the person using the cart.
///
/// Stock shortages get a dedicated message; every other failure collapses
/// into one message per operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub operation: Operation,
    pub message: String,
}

impl Notice {
    pub const OUT_OF_STOCK: &'static str = "Requested quantity is out of stock";

    /// Render the notice for a failed operation.
    pub fn for_failure(operation: Operation, error: &CartError) -> Self {
        let message = match error {
            CartError::OutOfStock { .. } => Self::OUT_OF_STOCK,
            _ => operation.failure_message(),
        };
        Self {
            level: NoticeLevel::Error,
            operation,
            message: message.to_string(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
