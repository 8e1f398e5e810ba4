//! Configuration initialization command.
//!
//! Walks the user through the break settings with an interactive wizard and
//! saves the result to `config.json` in the data directory. With `--defaults`
//! the built-in settings are written without any prompts.

use crate::{
    libs::{config::Config, messages::Message},
    msg_success,
};
use anyhow::Result;
use clap::Args;

/// Command-line arguments for the initialization command.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write the built-in defaults without asking
    ///
    /// Useful for scripted installs, or to get back to a known state after
    /// experimenting with the settings.
    #[arg(short, long)]
    defaults: bool,
}

/// Executes the initialization command.
///
/// # Arguments
///
/// * `init_args` - Parsed command-line arguments
///
/// # Returns
///
/// Returns `Ok(())` once the configuration is saved, or an error if the
/// wizard is cancelled or the file cannot be written.
pub fn cmd(init_args: InitArgs) -> Result<()> {
    let config = if init_args.defaults { Config::default() } else { Config::init()? };
    config.save()?;

    msg_success!(Message::ConfigSaved);
    Ok(())
}
