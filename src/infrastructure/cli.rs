use clap::{Parser, Subcommand};

use crate::utils::version;

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    #[arg(
        short,
        long,
        value_name = "COUNT",
        help = "Messages per page, overriding the configured page size"
    )]
    pub page_size: Option<usize>,

    #[arg(long, help = "Print each state snapshot on a single line")]
    pub compact: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load the newest page, then older pages until the oldest message
    Walk,
    /// Jump to a message, then load newer pages until the jump is resolved
    Jump {
        #[arg(short, long, value_name = "ID")]
        anchor: String,
    },
    /// Print the initial pagination state
    State,
}
