//! Command-line interface.
//!
//! | Command  | Purpose |
//! |----------|---------|
//! | `init`   | Configure breaks interactively |
//! | `watch`  | Run the break reminder in the foreground |
//! | `status` | Show the saved timers |
//! | `stats`  | Show today's break statistics |
//! | `take`   | Take a break right now |

pub mod init;
pub mod stats;
pub mod status;
pub mod take;
pub mod watch;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Watch activity and remind you to take breaks")]
    Watch,
    #[command(about = "Show the saved timer state")]
    Status,
    #[command(about = "Show break statistics")]
    Stats(stats::StatsArgs),
    #[command(about = "Take a break now")]
    Take(take::TakeArgs),
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parses the command line and runs the selected command.
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Watch => watch::cmd().await,
            Commands::Status => status::cmd(),
            Commands::Stats(args) => stats::cmd(args),
            Commands::Take(args) => take::cmd(args).await,
        }
    }
}
