// SPDX-License-Identifier: MIT OR Apache-2.0
//! Add command - insert a move into the book

use super::{open_book, parse_path, BOOK_KEY};
use crate::config::Config;
use crate::tree::InsertOutcome;
use anyhow::{Context, Result};

/// Run the add command
///
/// The parent position is addressed either by `--at` move path
/// (transposition-safe, preferred) or by `--parent-key`.
///
/// # Errors
/// Fails when the parent cannot be resolved or the snapshot write fails.
pub fn run(
    config: &Config,
    at: Option<String>,
    parent_key: Option<String>,
    key: &str,
    mv: &str,
    comment: Option<String>,
    labels: Vec<String>,
) -> Result<()> {
    let (mut store, mut book) = open_book(config);

    // --at addresses an exact tree location; --parent-key goes through the
    // lossy position index.
    let insertion = match (at, parent_key) {
        (Some(path), _) => {
            let parent = book
                .find_by_path(&parse_path(&path))
                .ok_or_else(|| anyhow::anyhow!("no line {:?} in the book", path))?;
            book.insert_move_at(parent, key, mv)
        }
        (None, Some(parent_key)) => book
            .insert_move(&parent_key, key, mv)
            .context("could not insert move")?,
        (None, None) => {
            let root = book.root();
            book.insert_move_at(root, key, mv)
        }
    };

    if let Some(comment) = comment {
        book.set_comment(insertion.node, comment);
    }
    for label in labels {
        book.add_label(insertion.node, label);
    }

    book.save_to(&mut store, BOOK_KEY)?;

    match insertion.outcome {
        InsertOutcome::Created => println!("Added {mv}"),
        InsertOutcome::CreatedTransposed => {
            println!("Added {mv} (transposition: position already known elsewhere)");
        }
        InsertOutcome::AlreadyPresent => println!("{mv} was already in the book"),
        InsertOutcome::ConflictKeptExisting => {
            println!("{mv} already leads to a different position; kept the existing one");
        }
        InsertOutcome::ConflictRebound => {
            println!("{mv} already existed; rebound it to the new position");
        }
    }
    println!("  line: {}", book.path_to(insertion.node).join(" "));

    Ok(())
}
