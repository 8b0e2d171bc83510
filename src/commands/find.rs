// SPDX-License-Identifier: MIT OR Apache-2.0
//! Find command - look a position up by key or by move path

use super::{open_book, parse_path};
use crate::config::Config;
use crate::tree::Repertoire;
use anyhow::Result;

/// Run the find command
///
/// Key lookup is lossy for transposed positions (it answers with the most
/// recently inserted claimant); path lookup is exact.
///
/// # Errors
/// Fails when neither `--key` nor `--path` is given.
pub fn run(config: &Config, key: Option<String>, path: Option<String>) -> Result<()> {
    let (_store, book) = open_book(config);

    let found = match (&key, &path) {
        (Some(key), _) => book.find_by_key(key),
        (None, Some(path)) => book.find_by_path(&parse_path(path)),
        (None, None) => anyhow::bail!("give either --key or --path"),
    };

    match found {
        Some(id) => print_node(&book, id),
        None => println!("Not in the book."),
    }
    Ok(())
}

fn print_node(book: &Repertoire, id: crate::tree::NodeId) {
    let node = book.node(id);
    println!("position: {}", node.position_key());
    let path = book.path_to(id);
    if path.is_empty() {
        println!("line: (root)");
    } else {
        println!("line: {}", path.join(" "));
    }
    if !node.comment().is_empty() {
        println!("comment: {}", node.comment());
    }
    if !node.labels().is_empty() {
        let labels: Vec<&str> = node.labels().iter().map(String::as_str).collect();
        println!("labels: {}", labels.join(", "));
    }
    let replies: Vec<&str> = node
        .children()
        .iter()
        .map(|&c| book.node(c).move_label())
        .collect();
    if !replies.is_empty() {
        println!("replies: {}", replies.join(", "));
    }
}
