//! Root CLI structure for unreal-rs

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "unreal-rs")]
#[command(about = "Command-line tools for legacy Unreal PSK/PSA files", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// PSK skeletal mesh operations
    Psk {
        #[command(subcommand)]
        command: crate::commands::psk::PskCommands,
    },

    /// PSA animation operations
    Psa {
        #[command(subcommand)]
        command: crate::commands::psa::PsaCommands,
    },
}
