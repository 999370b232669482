//! # Status Line
//!
//! Every action reports into an inline status line: pending hash while the
//! transaction mines, the outcome afterwards. Failure text is whatever the
//! wallet or contract said, verbatim - no translation of revert reasons.

use std::fmt;

use alloy_primitives::B256;

/// Outcome of the most recent user action on a view.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StatusLine {
    /// Nothing in flight, nothing to report.
    #[default]
    Idle,
    /// A transaction was submitted and is waiting to mine.
    Pending {
        /// The pending transaction hash.
        tx_hash: B256,
    },
    /// The action completed.
    Success(String),
    /// The action failed; the message is surfaced as-is.
    Error(String),
}

impl StatusLine {
    /// True while a transaction is waiting to mine.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending { .. })
    }

    /// True when the last action failed.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Builds an error line from any displayable failure.
    pub fn from_error(error: impl fmt::Display) -> Self {
        Self::Error(error.to_string())
    }
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => Ok(()),
            Self::Pending { tx_hash } => write!(f, "transaction pending: {tx_hash}"),
            Self::Success(message) | Self::Error(message) => f.write_str(message),
        }
    }
}
