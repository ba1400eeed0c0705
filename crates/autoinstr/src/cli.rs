use std::path::PathBuf;

use autoinstr_core::bootstrap::BootstrapAction;
use clap::{Parser, Subcommand};

/// autoinstr: detects installed libraries and activates or installs the
/// matching instrumentation
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Configuration file (.json, .yaml, .yml or .toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output (or set RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect installed libraries and print or install their instrumentation
    Bootstrap {
        /// `requirements` prints the plan to stdout; `install` installs it
        #[arg(long, short = 'a', default_value_t = BootstrapAction::Requirements)]
        action: BootstrapAction,

        /// Library registry file; overrides the configured one
        #[arg(long)]
        registry: Option<PathBuf>,

        /// Installed-packages snapshot (JSON) instead of running the list command
        #[arg(long)]
        environment: Option<PathBuf>,
    },
    /// Run one activation pass over the registered plugins
    Activate {
        /// Installed-packages snapshot (JSON) instead of running the list command
        #[arg(long)]
        environment: Option<PathBuf>,
    },
    /// Inspect registered plugins
    Plugin {
        #[command(subcommand)]
        command: PluginCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum PluginCommand {
    /// List registered plugins per discovery group
    List {},
}
