// SPDX-License-Identifier: MIT OR Apache-2.0
//! Repertoire tree: arena-backed opening tree with a lossy position index

use crate::error::BookError;
use crate::store::SnapshotStore;
use crate::types::{BookSnapshot, ConflictPolicy, NodeRecord, ParentRef, ROOT_MOVE};
use anyhow::Context as _;
use chrono::Utc;
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::{debug, info, warn};

/// Handle to a node in the tree's arena.
pub type NodeId = usize;

/// A single labeled position in the repertoire
///
/// Nodes live in the tree's arena and reference each other by [`NodeId`]
/// handle: children as an ordered, owning list, the parent as a non-owning
/// back-reference used only for path reconstruction and serialization
/// metadata. Sibling move labels are kept unique by the tree layer, not
/// here.
#[derive(Debug, Clone)]
pub struct Node {
    position_key: String,
    move_label: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    comment: String,
    labels: std::collections::BTreeSet<String>,
}

impl Node {
    fn new(position_key: &str, move_label: &str, parent: Option<NodeId>) -> Self {
        Self {
            position_key: position_key.to_string(),
            move_label: move_label.to_string(),
            parent,
            children: Vec::new(),
            comment: String::new(),
            labels: std::collections::BTreeSet::new(),
        }
    }

    /// Canonical position encoding at this node (opaque, caller-trusted)
    #[must_use]
    pub fn position_key(&self) -> &str {
        &self.position_key
    }

    /// Move that produced this position, or [`ROOT_MOVE`] for the root
    #[must_use]
    pub fn move_label(&self) -> &str {
        &self.move_label
    }

    /// Parent handle, `None` for the root
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child handles in insertion order; the first child is the main line
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Free-text commentary
    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// User labels, ordered
    #[must_use]
    pub fn labels(&self) -> &std::collections::BTreeSet<String> {
        &self.labels
    }

    /// Whether this is the root node
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// What an insertion did, so callers learn about anomalies without
/// the operation failing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// A new node was created and indexed
    Created,
    /// A new node was created for a position already indexed elsewhere;
    /// the index now points at the newer node
    CreatedTransposed,
    /// Identical (move, key) already present under this parent
    AlreadyPresent,
    /// Same move text, different key: the existing node was kept
    ConflictKeptExisting,
    /// Same move text, different key: the existing node was rebound to
    /// the new key (only under [`ConflictPolicy::PreferNew`])
    ConflictRebound,
}

/// Result of a successful [`Repertoire::insert_move`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    /// The node the move now resolves to
    pub node: NodeId,
    /// What actually happened
    pub outcome: InsertOutcome,
}

/// A user-authored tree of opening lines
///
/// Owns the node arena and a position-key index. The index is a secondary
/// lookup structure and is **lossy under transpositions**: when the same
/// position key is reachable through more than one move order, the most
/// recently registered node claims the key. Move paths are the stable,
/// transposition-safe identity; prefer [`Repertoire::find_by_path`] when a
/// full path is known.
#[derive(Debug, Clone)]
pub struct Repertoire {
    nodes: Vec<Node>,
    root: NodeId,
    index: HashMap<String, NodeId>,
    conflict_policy: ConflictPolicy,
}

impl Repertoire {
    /// Create a tree holding only a root node for `root_key`
    #[must_use]
    pub fn new(root_key: &str) -> Self {
        let root = Node::new(root_key, ROOT_MOVE, None);
        let mut index = HashMap::new();
        index.insert(root_key.to_string(), 0);
        Self {
            nodes: vec![root],
            root: 0,
            index,
            conflict_policy: ConflictPolicy::default(),
        }
    }

    /// Create a tree with an explicit label-key conflict policy
    #[must_use]
    pub fn with_policy(root_key: &str, policy: ConflictPolicy) -> Self {
        let mut tree = Self::new(root_key);
        tree.conflict_policy = policy;
        tree
    }

    /// Current label-key conflict policy
    #[must_use]
    pub fn conflict_policy(&self) -> ConflictPolicy {
        self.conflict_policy
    }

    /// Override the label-key conflict policy
    pub fn set_conflict_policy(&mut self, policy: ConflictPolicy) {
        self.conflict_policy = policy;
    }

    /// Handle of the root node
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Position key of the root node
    #[must_use]
    pub fn root_key(&self) -> &str {
        &self.nodes[self.root].position_key
    }

    /// Borrow a node by handle
    ///
    /// # Panics
    /// Panics if `id` was not produced by this tree.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    /// Number of nodes in the arena (root included)
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds only its root
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes[self.root].children.is_empty()
    }

    /// First child of `parent` whose move label matches, if any
    ///
    /// Linear scan; under the sibling-uniqueness invariant the first match
    /// is the only one.
    #[must_use]
    pub fn child_by_move(&self, parent: NodeId, move_label: &str) -> Option<NodeId> {
        self.nodes[parent]
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c].move_label == move_label)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Insert a move leading from the position `parent_key` to `new_key`
    ///
    /// Idempotent on exact re-insertion. A label-key conflict (same move
    /// text under the same parent claiming a different key) is resolved by
    /// the tree's [`ConflictPolicy`] and reported through the returned
    /// [`InsertOutcome`], never silently. A transposition (key already
    /// indexed at another tree location) still creates a new node; the tree
    /// intentionally stays a tree, and the index repoints to the newest
    /// claimant of the key.
    ///
    /// # Errors
    /// [`BookError::UnknownParent`] if `parent_key` is not indexed; missing
    /// ancestors are never auto-created.
    pub fn insert_move(
        &mut self,
        parent_key: &str,
        new_key: &str,
        move_label: &str,
    ) -> Result<Insertion, BookError> {
        let Some(&parent) = self.index.get(parent_key) else {
            warn!("insert of {move_label:?} failed: parent position not in book");
            return Err(BookError::UnknownParent(parent_key.to_string()));
        };
        Ok(self.insert_move_at(parent, new_key, move_label))
    }

    /// Insert a move under the parent addressed by handle
    ///
    /// Same semantics as [`Repertoire::insert_move`], but the parent is an
    /// exact tree location rather than a position key, so the lossy index
    /// is never consulted for parent resolution. Use this when the parent
    /// was found through [`Repertoire::find_by_path`]; a transposed parent
    /// key cannot redirect the insertion to another claimant.
    ///
    /// # Panics
    /// Panics if `parent` was not produced by this tree.
    pub fn insert_move_at(
        &mut self,
        parent: NodeId,
        new_key: &str,
        move_label: &str,
    ) -> Insertion {
        if let Some(existing) = self.child_by_move(parent, move_label) {
            if self.nodes[existing].position_key == new_key {
                debug!("move {move_label:?} already present, nothing to do");
                return Insertion {
                    node: existing,
                    outcome: InsertOutcome::AlreadyPresent,
                };
            }
            return self.resolve_conflict(existing, new_key, move_label);
        }

        let transposed = self.index.contains_key(new_key);
        let id = self.nodes.len();
        self.nodes.push(Node::new(new_key, move_label, Some(parent)));
        self.nodes[parent].children.push(id);
        if transposed {
            info!(
                "position {new_key:?} now reachable via more than one move order; \
                 key lookup will resolve to the newest node"
            );
        }
        self.index.insert(new_key.to_string(), id);

        Insertion {
            node: id,
            outcome: if transposed {
                InsertOutcome::CreatedTransposed
            } else {
                InsertOutcome::Created
            },
        }
    }

    fn resolve_conflict(&mut self, existing: NodeId, new_key: &str, move_label: &str) -> Insertion {
        match self.conflict_policy {
            ConflictPolicy::KeepExisting => {
                warn!(
                    "move {move_label:?} already leads to {:?}, keeping it (new key {new_key:?} ignored)",
                    self.nodes[existing].position_key
                );
                Insertion {
                    node: existing,
                    outcome: InsertOutcome::ConflictKeptExisting,
                }
            }
            ConflictPolicy::PreferNew => {
                warn!(
                    "move {move_label:?} already leads to {:?}, rebinding it to {new_key:?}",
                    self.nodes[existing].position_key
                );
                let old_key =
                    std::mem::replace(&mut self.nodes[existing].position_key, new_key.to_string());
                if self.index.get(&old_key) == Some(&existing) {
                    self.index.remove(&old_key);
                }
                self.index.insert(new_key.to_string(), existing);
                Insertion {
                    node: existing,
                    outcome: InsertOutcome::ConflictRebound,
                }
            }
        }
    }

    /// Replace the commentary on a node
    pub fn set_comment(&mut self, id: NodeId, comment: impl Into<String>) {
        self.nodes[id].comment = comment.into();
    }

    /// Attach a label to a node; returns `false` if already present
    pub fn add_label(&mut self, id: NodeId, label: impl Into<String>) -> bool {
        self.nodes[id].labels.insert(label.into())
    }

    /// Detach a label from a node; returns `false` if it was not set
    pub fn remove_label(&mut self, id: NodeId, label: &str) -> bool {
        self.nodes[id].labels.remove(label)
    }

    // =========================================================================
    // Lookup
    // =========================================================================

    /// Look a position up by key
    ///
    /// For a transposed key this returns the most recently registered node;
    /// the result is path-independent and lossy by design.
    #[must_use]
    pub fn find_by_key(&self, key: &str) -> Option<NodeId> {
        self.index.get(key).copied()
    }

    /// Follow a move path from the root; `None` as soon as any step misses
    ///
    /// The empty path resolves to the root. This is the authoritative,
    /// transposition-safe way to address a specific line.
    #[must_use]
    pub fn find_by_path<S: AsRef<str>>(&self, moves: &[S]) -> Option<NodeId> {
        let mut current = self.root;
        for mv in moves {
            current = self.child_by_move(current, mv.as_ref())?;
        }
        Some(current)
    }

    /// Move labels from the root down to `id`, reconstructed through the
    /// parent back-references
    #[must_use]
    pub fn path_to(&self, id: NodeId) -> Vec<String> {
        let mut labels = Vec::new();
        let mut current = id;
        // Bounded by arena size so a malformed parent chain cannot loop.
        for _ in 0..self.nodes.len() {
            match self.nodes[current].parent {
                Some(parent) => {
                    labels.push(self.nodes[current].move_label.clone());
                    current = parent;
                }
                None => break,
            }
        }
        labels.reverse();
        labels
    }

    /// Breadth-first walk over the nodes reachable from the root
    #[must_use]
    pub fn breadth_first(&self) -> BreadthFirst<'_> {
        BreadthFirst::new(self)
    }

    // =========================================================================
    // Snapshots
    // =========================================================================

    /// Flatten the tree into its snapshot record form
    #[must_use]
    pub fn to_snapshot(&self) -> BookSnapshot {
        let mut nodes = Vec::with_capacity(self.nodes.len());
        let mut emitted: HashSet<(&str, &str)> = HashSet::new();
        for id in self.breadth_first() {
            let node = &self.nodes[id];
            // The (key, move) pair is the record identity; keys alone are
            // not unique across transpositions.
            if !emitted.insert((node.position_key.as_str(), node.move_label.as_str())) {
                continue;
            }
            nodes.push(NodeRecord {
                position_key: node.position_key.clone(),
                move_label: node.move_label.clone(),
                comment: node.comment.clone(),
                labels: node.labels.clone(),
                parent: node.parent.map(|p| ParentRef {
                    position_key: self.nodes[p].position_key.clone(),
                    move_label: self.nodes[p].move_label.clone(),
                }),
            });
        }
        BookSnapshot {
            saved_at: Utc::now(),
            nodes,
        }
    }

    /// Serialize the whole tree to its flat JSON snapshot form
    ///
    /// # Errors
    /// [`BookError::MalformedInput`] if JSON encoding fails.
    pub fn serialize(&self) -> Result<String, BookError> {
        Ok(serde_json::to_string_pretty(&self.to_snapshot())?)
    }

    /// Reconstruct a tree from a snapshot, surfacing failures explicitly
    ///
    /// Three passes, in this order because records may reference parents
    /// that are not materialized yet:
    /// 1. parse and check the root record against `expected_root_key`;
    /// 2. materialize every record into the arena, keyed by position key,
    ///    last write winning on key collisions (the same lossy trade-off
    ///    the live index makes under transpositions);
    /// 3. link children to parents (idempotently) and restamp each linked
    ///    child with its record's own move label, since the key lookup may
    ///    have resolved to a differently-labeled node sharing the key.
    ///
    /// The permanent index is then rebuilt from a breadth-first walk of the
    /// linked tree, so it reflects reachability from the root rather than
    /// raw record order.
    ///
    /// # Errors
    /// [`BookError::MalformedInput`] if the input does not parse;
    /// [`BookError::RootMismatch`] if the root record is absent or keyed to
    /// a different position.
    pub fn try_deserialize(input: &str, expected_root_key: &str) -> Result<Self, BookError> {
        let snapshot: BookSnapshot = serde_json::from_str(input)?;

        match snapshot.nodes.iter().find(|r| r.move_label == ROOT_MOVE) {
            None => {
                return Err(BookError::RootMismatch {
                    expected: expected_root_key.to_string(),
                    found: "no root record".to_string(),
                })
            }
            Some(record) if record.position_key != expected_root_key => {
                return Err(BookError::RootMismatch {
                    expected: expected_root_key.to_string(),
                    found: record.position_key.clone(),
                })
            }
            Some(_) => {}
        }

        let mut tree = Self::new(expected_root_key);
        let mut by_key: HashMap<&str, NodeId> = HashMap::new();
        by_key.insert(expected_root_key, tree.root);

        for record in &snapshot.nodes {
            let id = if record.move_label == ROOT_MOVE && record.position_key == expected_root_key
            {
                tree.root
            } else {
                let id = tree.nodes.len();
                tree.nodes
                    .push(Node::new(&record.position_key, &record.move_label, None));
                id
            };
            tree.nodes[id].comment = record.comment.clone();
            tree.nodes[id].labels = record.labels.clone();
            by_key.insert(record.position_key.as_str(), id);
        }

        for record in &snapshot.nodes {
            let Some(parent_ref) = &record.parent else {
                continue;
            };
            let (Some(&parent_id), Some(&child_id)) = (
                by_key.get(parent_ref.position_key.as_str()),
                by_key.get(record.position_key.as_str()),
            ) else {
                warn!(
                    "record {:?} references parent {:?} which did not materialize; skipped",
                    record.position_key, parent_ref.position_key
                );
                continue;
            };
            if child_id == tree.root || child_id == parent_id {
                warn!(
                    "record {:?} would link the root or itself as a child; skipped",
                    record.position_key
                );
                continue;
            }
            if !tree.nodes[parent_id].children.contains(&child_id) {
                tree.nodes[parent_id].children.push(child_id);
            }
            tree.nodes[child_id].parent = Some(parent_id);
            tree.nodes[child_id].move_label = record.move_label.clone();
        }

        tree.rebuild_index();
        Ok(tree)
    }

    /// Reconstruct a tree from a snapshot, degrading to a fresh tree
    ///
    /// Any failure (unparseable input, missing or mismatched root) is
    /// logged and answered with an empty tree rooted at
    /// `expected_root_key`. This never panics or propagates an error.
    #[must_use]
    pub fn deserialize(input: &str, expected_root_key: &str) -> Self {
        match Self::try_deserialize(input, expected_root_key) {
            Ok(tree) => tree,
            Err(err) => {
                warn!("snapshot rejected ({err}); starting a fresh book");
                Self::new(expected_root_key)
            }
        }
    }

    /// Rebuild the position index from reachability, newest claimant last
    fn rebuild_index(&mut self) {
        let mut index = HashMap::with_capacity(self.nodes.len());
        for id in self.breadth_first() {
            index.insert(self.nodes[id].position_key.clone(), id);
        }
        self.index = index;
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Snapshot the tree into `store` under `key`
    ///
    /// A failed write leaves the in-memory tree untouched.
    ///
    /// # Errors
    /// Fails if encoding fails or the store rejects the write.
    pub fn save_to(&self, store: &mut dyn SnapshotStore, key: &str) -> anyhow::Result<()> {
        let body = self.serialize()?;
        store
            .set(key, &body)
            .with_context(|| format!("failed to persist book under {key:?}"))
    }

    /// Load a tree from `store`, always yielding a usable tree
    ///
    /// A missing key or any deserialization failure degrades to a fresh
    /// tree rooted at `expected_root_key`, so first-run and corrupted-data
    /// scenarios need no special casing by the caller.
    #[must_use]
    pub fn load_from(store: &dyn SnapshotStore, key: &str, expected_root_key: &str) -> Self {
        match store.get(key) {
            Some(body) => Self::deserialize(&body, expected_root_key),
            None => {
                debug!("no snapshot under {key:?}; starting a fresh book");
                Self::new(expected_root_key)
            }
        }
    }
}

/// Breadth-first iterator over the handles reachable from the root
///
/// Tracks visited handles so that link structures damaged by key
/// collisions in a snapshot can never loop or double-visit.
pub struct BreadthFirst<'a> {
    tree: &'a Repertoire,
    queue: VecDeque<NodeId>,
    seen: HashSet<NodeId>,
}

impl<'a> BreadthFirst<'a> {
    fn new(tree: &'a Repertoire) -> Self {
        let mut seen = HashSet::new();
        seen.insert(tree.root);
        Self {
            tree,
            queue: VecDeque::from([tree.root]),
            seen,
        }
    }
}

impl Iterator for BreadthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.queue.pop_front()?;
        for &child in &self.tree.nodes[id].children {
            if self.seen.insert(child) {
                self.queue.push_back(child);
            }
        }
        Some(id)
    }
}
