// SPDX-License-Identifier: MIT OR Apache-2.0
//
//! Command implementations

pub mod add;
pub mod annotate;
pub mod completions;
pub mod config;
pub mod export;
pub mod find;
pub mod show;

use crate::config::Config;
use crate::store::DirStore;
use crate::tree::Repertoire;
use std::path::PathBuf;

/// Store key the whole-book snapshot lives under
pub const BOOK_KEY: &str = "book";

/// Resolve the data directory: environment override, then configuration
#[must_use]
pub fn data_dir(config: &Config) -> PathBuf {
    if let Ok(dir) = std::env::var("OPENBOOK_DATA_DIR") {
        return PathBuf::from(dir);
    }
    config.data_dir.clone()
}

/// Open the snapshot store and load the book, which always succeeds:
/// a missing or corrupted snapshot degrades to a fresh book
#[must_use]
pub fn open_book(config: &Config) -> (DirStore, Repertoire) {
    let store = DirStore::new(data_dir(config));
    let mut book = Repertoire::load_from(&store, BOOK_KEY, &config.root_key);
    book.set_conflict_policy(config.conflict_policy);
    (store, book)
}

/// Split a CLI move path like `"e4 c5 Nf3"` into labels
#[must_use]
pub fn parse_path(path: &str) -> Vec<&str> {
    path.split_whitespace().collect()
}
