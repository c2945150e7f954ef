//! Command dispatch: bridges CLI args -> device operations -> output formatting.

pub mod checkpoint;
pub mod copy;
pub mod exec;
pub mod facts;
pub mod files;
pub mod profile;

use nxkit_core::Device;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a switch-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, device: &Device, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Show(args) => exec::show(device, args, global).await,
        Command::Config(args) => exec::config(device, args, global).await,
        Command::Bash(args) => exec::bash(device, args, global).await,
        Command::Checkpoint(args) => checkpoint::handle(device, args, global).await,
        Command::Files(args) => files::handle(device, args, global).await,
        Command::Copy(args) => copy::handle(device, args, global).await,
        Command::Facts => facts::facts(device, global).await,
        Command::Hostname(args) => facts::hostname(device, args, global).await,
        Command::Features(args) => facts::features(device, args, global).await,
        Command::Profile(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "handled without a switch connection".into(),
        }),
    }
}
