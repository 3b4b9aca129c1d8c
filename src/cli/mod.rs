mod commands;
mod progress;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use dir_context::{AnalysisMode, ContextView};

pub use commands::{context, init, refresh, InitOptions, RefreshOptions};

#[derive(Parser)]
#[command(name = "dir-context")]
#[command(about = "Generate and query per-directory context documents for a codebase")]
#[command(version)]
#[command(after_long_help = r#"
EXAMPLES:
    # Write configuration and document every directory
    dir-context init --mode quick

    # Re-document directories with uncommitted changes
    dir-context refresh

    # Re-document one directory, or everything
    dir-context refresh --path src/api
    dir-context refresh --all

    # Keep documents up to date while editing
    dir-context refresh --watch

    # Print the context for a directory and its parent
    dir-context context --path src/api

    # Project overview written to a file
    dir-context context --view project --output CONTEXT.md
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project root
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write the configuration file and analyze the whole project
    Init {
        /// Analysis mode: quick, smart or deep
        #[arg(long, default_value = "smart")]
        mode: AnalysisMode,

        /// Do not read history or changes from git
        #[arg(long)]
        no_git: bool,

        /// Enable AI enrichment (needs DIRCONTEXT_AGENT_API_KEY or ANTHROPIC_API_KEY)
        #[arg(long)]
        ai: bool,

        /// Extra ignore pattern, gitignore syntax (repeatable)
        #[arg(long = "ignore", value_name = "PATTERN")]
        ignore: Vec<String>,
    },

    /// Re-analyze changed directories, one directory, or everything
    Refresh {
        /// Analyze exactly this directory
        #[arg(long, conflicts_with = "all")]
        path: Option<PathBuf>,

        /// Analyze every directory in the project
        #[arg(long)]
        all: bool,

        /// Print the directories that would be analyzed and exit
        #[arg(long)]
        dry_run: bool,

        /// Keep running and re-analyze directories as files change
        #[arg(long, conflicts_with = "dry_run")]
        watch: bool,
    },

    /// Print the synthesized context for a directory
    Context {
        /// View: directory, project or standard
        #[arg(long, default_value = "standard")]
        view: ContextView,

        /// Target directory (defaults to the project root)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}
