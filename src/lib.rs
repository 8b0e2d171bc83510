// SPDX-License-Identifier: MIT OR Apache-2.0
//
//! Openbook library - chess opening repertoire trees
//!
//! This crate provides the core data model for maintaining a user-authored
//! tree of chess opening lines: move insertion, lookup by position key or
//! by move path, and a flat snapshot form that round-trips the whole tree,
//! including positions reachable by more than one move order
//! (transpositions).

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod commands;
pub mod config;
pub mod error;
pub mod store;
pub mod tree;

/// Core record types for the flat snapshot form
pub mod types {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};

    /// Reserved move label carried by the root node instead of a real move.
    pub const ROOT_MOVE: &str = "root";

    /// Position key of the standard chess starting position.
    pub const START_POS: &str =
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

    // =========================================================================
    // Snapshot Records
    // =========================================================================

    /// Identity of a record's parent: the parent's own (key, move) pair.
    ///
    /// Position keys alone are not unique across transpositions, so the
    /// pair is the only stable reference a flat record can carry.
    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    pub struct ParentRef {
        /// Parent's position key
        pub position_key: String,
        /// Parent's own move label
        pub move_label: String,
    }

    /// One node of the repertoire tree in flat, serializable form
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct NodeRecord {
        /// Canonical position encoding (caller-trusted, opaque)
        pub position_key: String,
        /// Move that produced this position; [`ROOT_MOVE`] for the root
        pub move_label: String,
        /// Free-text commentary
        #[serde(default)]
        pub comment: String,
        /// User labels; ordered set for deterministic output
        #[serde(default)]
        pub labels: std::collections::BTreeSet<String>,
        /// Parent identity, `None` for the root record
        #[serde(default)]
        pub parent: Option<ParentRef>,
    }

    /// The complete flat snapshot of a repertoire tree
    ///
    /// Records appear in breadth-first order starting at the root, which
    /// preserves sibling order (the first-inserted child is the main line).
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct BookSnapshot {
        /// When the snapshot was taken
        #[serde(default = "Utc::now")]
        pub saved_at: DateTime<Utc>,
        /// All nodes, one record each
        #[serde(default)]
        pub nodes: Vec<NodeRecord>,
    }

    // =========================================================================
    // Policies
    // =========================================================================

    /// Resolution for a label-key conflict: the same move text under the
    /// same parent claimed to lead to two different positions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(rename_all = "kebab-case")]
    pub enum ConflictPolicy {
        /// Keep the existing node and its key; warn the caller
        #[default]
        KeepExisting,
        /// Rebind the existing node to the newly supplied key; still warned
        PreferNew,
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::error::BookError;
    pub use crate::store::{DirStore, MemoryStore, SnapshotStore};
    pub use crate::tree::{InsertOutcome, Insertion, Node, NodeId, Repertoire};
    pub use crate::types::*;
    pub use anyhow::{Context, Result};
}
