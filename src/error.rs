// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error kinds for the repertoire core
//!
//! Only failures that cannot be absorbed by a safe default surface here.
//! Label-key conflicts and transposition collisions are reported through
//! [`crate::tree::InsertOutcome`] and the log instead; they never abort
//! the caller.

use thiserror::Error;

/// Failures surfaced by tree mutation and snapshot reconstruction
#[derive(Debug, Error)]
pub enum BookError {
    /// Insertion referenced a position key that is not in the index.
    /// No missing ancestors are auto-created.
    #[error("unknown parent position: {0}")]
    UnknownParent(String),

    /// The snapshot's root record is absent or keyed to a different
    /// position than the caller expected.
    #[error("root mismatch: expected {expected}, snapshot has {found}")]
    RootMismatch {
        /// Root key the caller asked for
        expected: String,
        /// Root key found in the snapshot, or a placeholder when absent
        found: String,
    },

    /// The snapshot body could not be converted to or from the record
    /// shape; carried for decode failures on load and, in principle,
    /// encode failures on save.
    #[error("malformed snapshot: {0}")]
    MalformedInput(#[from] serde_json::Error),
}
