// SPDX-License-Identifier: MIT OR Apache-2.0
//! Annotate command - comment and label an existing position

use super::{open_book, parse_path, BOOK_KEY};
use crate::config::Config;
use anyhow::Result;

/// Run the annotate command
///
/// Annotations have no structural effect on the tree.
///
/// # Errors
/// Fails when the line is not in the book or the snapshot write fails.
pub fn run(
    config: &Config,
    at: &str,
    comment: Option<String>,
    add_labels: Vec<String>,
    remove_labels: Vec<String>,
) -> Result<()> {
    let (mut store, mut book) = open_book(config);

    let id = book
        .find_by_path(&parse_path(at))
        .ok_or_else(|| anyhow::anyhow!("no line {:?} in the book", at))?;

    if let Some(comment) = comment {
        book.set_comment(id, comment);
        println!("Set comment.");
    }
    for label in add_labels {
        if book.add_label(id, label.clone()) {
            println!("Added label {label:?}");
        }
    }
    for label in remove_labels {
        if book.remove_label(id, &label) {
            println!("Removed label {label:?}");
        }
    }

    book.save_to(&mut store, BOOK_KEY)
}
