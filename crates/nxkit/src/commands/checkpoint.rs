//! Checkpoint, diff and rollback handlers.

use nxkit_core::Device;

use crate::cli::{CheckpointArgs, CheckpointCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

pub async fn handle(
    device: &Device,
    args: CheckpointArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CheckpointCommand::Save { file } => {
            device.set_checkpoint(&file).await?;
            if !global.quiet {
                eprintln!("Checkpoint saved to {file}");
            }
            Ok(())
        }

        CheckpointCommand::Running => {
            let text = device.get_checkpoint().await?;
            let out = output::render_single(&global.output, text.as_str(), str::to_owned)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CheckpointCommand::Diff { file } => {
            let patch = device.get_diff(&file).await?;
            if patch.is_empty() && !global.quiet {
                eprintln!("Running configuration matches {file}");
            }
            let out = output::render_single(&global.output, patch.as_str(), str::to_owned)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CheckpointCommand::Rollback { file } => {
            if device.rollback(&file).await? {
                if !global.quiet {
                    eprintln!("Rolled back to {file}");
                }
                Ok(())
            } else {
                Err(CliError::OperationFailed {
                    message: format!("Rollback to {file} did not complete"),
                })
            }
        }
    }
}
