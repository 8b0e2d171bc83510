// SPDX-License-Identifier: MIT OR Apache-2.0
//! Export command - write the flat snapshot to stdout or a file

use super::open_book;
use crate::config::Config;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Run the export command
///
/// # Errors
/// Fails when encoding or the output write fails.
pub fn run(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let (_store, book) = open_book(config);

    if book.is_empty() {
        eprintln!("Warning: the book is empty. Use 'openbook add' first.");
    }

    let content = book.serialize()?;

    match output {
        Some(path) => {
            fs::write(&path, &content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("exported {} nodes", book.node_count());
            println!("Exported to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}
