// SPDX-License-Identifier: MIT OR Apache-2.0
//! Show command - print the book (or one subtree) as indented lines

use super::{open_book, parse_path};
use crate::config::Config;
use crate::tree::{NodeId, Repertoire};
use anyhow::Result;
use owo_colors::OwoColorize;

/// Run the show command
///
/// # Errors
/// Fails when `--at` names a line that is not in the book.
pub fn run(config: &Config, at: Option<String>) -> Result<()> {
    let (_store, book) = open_book(config);

    let start = match at {
        Some(path) => book
            .find_by_path(&parse_path(&path))
            .ok_or_else(|| anyhow::anyhow!("no line {:?} in the book", path))?,
        None => book.root(),
    };

    if book.is_empty() {
        println!("The book is empty. Use 'openbook add' to start a line.");
        return Ok(());
    }

    println!("{}", book.node(start).position_key().dimmed());
    for (i, &child) in book.node(start).children().iter().enumerate() {
        print_subtree(&book, child, "", i == 0);
    }
    Ok(())
}

fn print_subtree(book: &Repertoire, id: NodeId, prefix: &str, main_line: bool) {
    let node = book.node(id);
    let mv = if main_line {
        node.move_label().bold().to_string()
    } else {
        node.move_label().to_string()
    };
    let mut line = format!("{prefix}{mv}");
    if !node.labels().is_empty() {
        let labels: Vec<&str> = node.labels().iter().map(String::as_str).collect();
        line.push_str(&format!(" [{}]", labels.join(", ").cyan()));
    }
    if !node.comment().is_empty() {
        line.push_str(&format!("  ; {}", node.comment().dimmed()));
    }
    println!("{line}");

    let child_prefix = format!("{prefix}  ");
    for (i, &child) in node.children().iter().enumerate() {
        print_subtree(book, child, &child_prefix, main_line && i == 0);
    }
}
