// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::loader::DEFAULT_CONFIG_PATH;

/// Command-line arguments for `grape`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "grape",
    version,
    about = "🍇 grape is a tiny tool for watching files and running commands when they change during development.",
    long_about = None
)]
pub struct CliArgs {
    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `GRAPE_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run grape with a config file and switch between namespaces.
    Run {
        /// Namespace from the config file to supervise.
        namespace: String,

        /// Path to the config file (JSON, or TOML with a `.toml` extension).
        #[arg(short, long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
        config: String,
    },

    /// Configure grape on the go without a config file.
    On {
        /// Command to run (and restart) when a file changes.
        #[arg(short, long, value_name = "CMD")]
        run: String,

        /// Comma separated list of patterns to watch.
        #[arg(short, long, value_delimiter = ',', default_value = "*.go")]
        ext: Vec<String>,

        /// Comma separated list of directories to exclude from watching.
        #[arg(short = 'x', long, value_delimiter = ',', default_value = "vendor")]
        exclude: Vec<String>,
    },

    /// Create a config file in the current directory.
    Init {
        /// Where to write the config file.
        #[arg(short, long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
        config: String,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
