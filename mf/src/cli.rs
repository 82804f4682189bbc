//! CLI argument parsing for modfix

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::anchors::LinkScope;

#[derive(Parser, Debug)]
#[command(name = "mf")]
#[command(author, version, about = "Customize the module-1 course page into the rest of the series", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Customize copies of the module-1 page by replacing its literal anchors
    Fix {
        /// Only customize this module
        #[arg(short, long)]
        module: Option<u32>,

        /// Skip anchors that do not match instead of failing
        #[arg(long)]
        lenient: bool,

        /// Report what would change without writing
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// How the forward link is rewritten (overrides config)
        #[arg(short, long, value_enum)]
        scope: Option<LinkScope>,
    },

    /// Render module pages from a template with named slots
    Render {
        /// Template file
        #[arg(short, long, required = true)]
        template: PathBuf,

        /// Only render this module
        #[arg(short, long)]
        module: Option<u32>,

        /// Render without writing
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// Validate the catalog and report anchor matches for every page
    Check,

    /// Print the module catalog
    List {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}
