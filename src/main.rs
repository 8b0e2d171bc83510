// SPDX-License-Identifier: MIT OR Apache-2.0
//
//! Openbook CLI - chess opening repertoire trees

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use openbook::commands;

#[derive(Parser)]
#[command(name = "openbook")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,

    /// Configuration file path
    #[arg(short, long, env = "OPENBOOK_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Data directory override
    #[arg(long, env = "OPENBOOK_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Root position key override
    #[arg(long, env = "OPENBOOK_ROOT_KEY")]
    root_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert a move into the book
    Add {
        /// Parent line as a space-separated move path, e.g. "e4 c5"
        #[arg(long)]
        at: Option<String>,

        /// Parent position key (lossy for transposed positions; prefer --at)
        #[arg(long)]
        parent_key: Option<String>,

        /// Position key the move leads to
        #[arg(short, long)]
        key: String,

        /// Move notation, e.g. "Nf3"
        #[arg(short, long = "move")]
        mv: String,

        /// Commentary for the new position
        #[arg(long)]
        comment: Option<String>,

        /// Labels for the new position (repeatable)
        #[arg(long = "label")]
        labels: Vec<String>,
    },

    /// Print the book, or one subtree, as indented lines
    Show {
        /// Start from this line instead of the root
        #[arg(long)]
        at: Option<String>,
    },

    /// Look a position up by key or by move path
    Find {
        /// Position key
        #[arg(short, long)]
        key: Option<String>,

        /// Space-separated move path
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Comment or label an existing position
    Annotate {
        /// Line to annotate, as a space-separated move path
        #[arg(long)]
        at: String,

        /// Replace the commentary
        #[arg(long)]
        comment: Option<String>,

        /// Labels to add (repeatable)
        #[arg(long = "label")]
        add_labels: Vec<String>,

        /// Labels to remove (repeatable)
        #[arg(long = "remove-label")]
        remove_labels: Vec<String>,
    },

    /// Export the flat snapshot
    Export {
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
    },

    /// Print the effective configuration
    Config {
        /// Configuration key (omit to print everything)
        key: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => tracing::Level::ERROR,
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let mut config = openbook::config::load(cli.config.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    if let Some(root_key) = cli.root_key {
        config.root_key = root_key;
    }

    // Execute command
    match cli.command {
        Commands::Add {
            at,
            parent_key,
            key,
            mv,
            comment,
            labels,
        } => commands::add::run(&config, at, parent_key, &key, &mv, comment, labels),
        Commands::Show { at } => commands::show::run(&config, at),
        Commands::Find { key, path } => commands::find::run(&config, key, path),
        Commands::Annotate {
            at,
            comment,
            add_labels,
            remove_labels,
        } => commands::annotate::run(&config, &at, comment, add_labels, remove_labels),
        Commands::Export { output } => commands::export::run(&config, output),
        Commands::Config { key } => commands::config::run(&config, key),
        Commands::Completions { shell } => {
            commands::completions::run(shell, &mut Cli::command())
        }
    }
}
