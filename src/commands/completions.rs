// SPDX-License-Identifier: MIT OR Apache-2.0
//! Completions command - emit shell completion scripts

use anyhow::Result;
use clap_complete::Shell;

/// Generate completions for `shell` onto stdout
///
/// # Errors
/// Infallible in practice; kept fallible for dispatch uniformity.
pub fn run(shell: Shell, cmd: &mut clap::Command) -> Result<()> {
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, cmd, name, &mut std::io::stdout());
    Ok(())
}
