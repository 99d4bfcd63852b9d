//! CLI argument structures.

use clap::Parser;

use crate::drain::DrainCommand;

/// Drain dead-lettered Gundi events from a Pub/Sub subscription
#[derive(Parser)]
#[command(name = "gundi-dlq")]
#[command(about = "Reprocess or purge dead-lettered events stuck in a Pub/Sub subscription", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(flatten)]
    pub command: DrainCommand,
}
