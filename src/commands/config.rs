// SPDX-License-Identifier: MIT OR Apache-2.0
//! Config command - print the effective configuration

use super::data_dir;
use crate::config::Config;
use crate::types::ConflictPolicy;
use anyhow::Result;

fn policy_str(policy: ConflictPolicy) -> &'static str {
    match policy {
        ConflictPolicy::KeepExisting => "keep-existing",
        ConflictPolicy::PreferNew => "prefer-new",
    }
}

/// Run the config command; with a key, print only that value
///
/// # Errors
/// Fails on an unknown key.
pub fn run(config: &Config, key: Option<String>) -> Result<()> {
    match key.as_deref() {
        None => {
            println!("data_dir = {}", data_dir(config).display());
            println!("root_key = {}", config.root_key);
            println!("conflict_policy = {}", policy_str(config.conflict_policy));
            println!("log_level = {}", config.log_level);
        }
        Some("data_dir") => println!("{}", data_dir(config).display()),
        Some("root_key") => println!("{}", config.root_key),
        Some("conflict_policy") => println!("{}", policy_str(config.conflict_policy)),
        Some("log_level") => println!("{}", config.log_level),
        Some(other) => anyhow::bail!(
            "unknown key: {other}. Valid: data_dir, root_key, conflict_policy, log_level"
        ),
    }
    Ok(())
}
