//! SCP copy handlers.

use nxkit_core::{Device, FileCopy};
use serde::Serialize;

use crate::cli::{CopyArgs, CopyCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct Verification {
    dst: String,
    local_md5: Option<String>,
    remote_md5: Option<String>,
    matches: bool,
}

pub async fn handle(device: &Device, args: CopyArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        CopyCommand::Verify { src, dst } => {
            let copy = FileCopy::new(device, src, dst.as_deref());
            let local_md5 = copy.local_md5().await?;
            let remote_md5 = copy.remote_md5().await?;
            let matches = copy.file_already_exists().await?;
            let report = Verification {
                dst: copy.dst().to_owned(),
                local_md5,
                remote_md5,
                matches,
            };
            let color = output::should_color(&global.color);
            let out = output::render_single(&global.output, &report, |r| {
                let label = if r.matches { "match" } else { "differ" };
                let status = output::status(label, r.matches, color);
                format!(
                    "{}: {status}\n  local  {}\n  remote {}",
                    r.dst,
                    r.local_md5.as_deref().unwrap_or("-"),
                    r.remote_md5.as_deref().unwrap_or("-"),
                )
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        CopyCommand::Push { src, dst, force } => {
            let copy = FileCopy::new(device, src, dst.as_deref()).with_port(args.scp_port);
            if !force && copy.file_already_exists().await? {
                if !global.quiet {
                    eprintln!("{} already on {} with the same MD5", copy.dst(), device.host());
                }
                return Ok(());
            }
            transfer(device, &copy, nxkit_core::Direction::Push).await?;
            if !global.quiet {
                eprintln!("Copied {} to {}:{}", copy.src().display(), device.host(), copy.dst());
            }
            Ok(())
        }

        CopyCommand::Pull { local, remote } => {
            let copy = FileCopy::new(device, local, Some(remote.as_str())).with_port(args.scp_port);
            transfer(device, &copy, nxkit_core::Direction::Pull).await?;
            if !global.quiet {
                eprintln!("Copied {}:{} to {}", device.host(), copy.dst(), copy.src().display());
            }
            Ok(())
        }
    }
}

#[cfg(feature = "scp")]
async fn transfer(
    device: &Device,
    copy: &FileCopy<'_>,
    direction: nxkit_core::Direction,
) -> Result<(), CliError> {
    let scp = nxkit_core::Ssh2Scp::for_device(device).with_port(copy.port());
    copy.transfer(std::sync::Arc::new(scp), direction).await?;
    Ok(())
}

#[cfg(not(feature = "scp"))]
#[allow(clippy::unused_async)]
async fn transfer(
    _device: &Device,
    _copy: &FileCopy<'_>,
    direction: nxkit_core::Direction,
) -> Result<(), CliError> {
    let operation = match direction {
        nxkit_core::Direction::Push => "copy push",
        nxkit_core::Direction::Pull => "copy pull",
    };
    Err(CliError::Unsupported {
        operation: operation.into(),
        feature: "scp".into(),
    })
}
