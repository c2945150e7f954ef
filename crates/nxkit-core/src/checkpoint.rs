// Configuration checkpoints, rollback-patch diffs and rollback.

use nxkit_api::Request;
use tracing::{debug, info};

use crate::device::{Device, text_body};
use crate::error::CoreError;

/// Scratch checkpoint used by [`Device::get_checkpoint`]; deleted afterwards.
pub const SCRATCH_CHECKPOINT: &str = "temp_cp_file_from_nxkit";

const PATCH_MARKER: &str = "#Generating Rollback Patch";
const EMPTY_PATCH: &str = "Rollback Patch is Empty";

impl Device {
    /// Snapshot the running configuration into `name` on bootflash.
    pub async fn set_checkpoint(&self, name: &str) -> Result<(), CoreError> {
        self.show_text("terminal dont-ask").await?;
        self.show_text(&format!("checkpoint file {name}")).await?;
        info!(checkpoint = name, "checkpoint saved");
        Ok(())
    }

    /// Save the running configuration to `filename`.
    pub async fn save_config(&self, filename: &str) -> Result<(), CoreError> {
        self.show_text(&format!("checkpoint file {filename}")).await?;
        Ok(())
    }

    /// Running configuration as checkpoint text, without leaving a file
    /// behind on the switch.
    pub async fn get_checkpoint(&self) -> Result<String, CoreError> {
        self.set_checkpoint(SCRATCH_CHECKPOINT).await?;
        let outcome = self
            .show_text(&format!("show file {SCRATCH_CHECKPOINT}"))
            .await?;
        self.show_text(&format!("delete {SCRATCH_CHECKPOINT}")).await?;
        Ok(text_body(&outcome).to_owned())
    }

    /// Commands that would turn the running configuration into `cp_file`.
    ///
    /// An empty string means the two are identical.
    pub async fn get_diff(&self, cp_file: &str) -> Result<String, CoreError> {
        let command = format!("show diff rollback-patch running-config file {cp_file}");
        let outcomes = self.probe(Request::show_ascii(command)).await?;
        let body = outcomes.first().and_then(|o| o.text()).unwrap_or_default();

        let Some((_, patch)) = body.split_once(PATCH_MARKER) else {
            debug!(cp_file, "no rollback patch in reply");
            return Err(CoreError::Diff {
                message: "it's possible the given file doesn't exist".into(),
            });
        };
        Ok(patch.replace(EMPTY_PATCH, "").trim().to_owned())
    }

    /// Roll the running configuration back to `cp_file`.
    ///
    /// Returns `true` only when the switch reports success; any `clierror`,
    /// even an empty one, counts as failure.
    pub async fn rollback(&self, cp_file: &str) -> Result<bool, CoreError> {
        let command = format!("rollback running-config file {cp_file} verbose");
        let outcomes = self.probe(Request::config([command])).await?;
        let Some(outcome) = outcomes.first() else {
            return Ok(false);
        };
        if outcome.clierror.is_some() {
            return Ok(false);
        }
        let ok = text_body(outcome).contains("successfully");
        info!(cp_file, ok, "rollback finished");
        Ok(ok)
    }
}
