//! Filesystem handlers.

use nxkit_core::{DirCheck, Device};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{FilesArgs, FilesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct Entry {
    name: String,
    directory: bool,
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    kind: &'static str,
}

impl From<&Entry> for EntryRow {
    fn from(e: &Entry) -> Self {
        Self {
            name: e.name.clone(),
            kind: if e.directory { "dir" } else { "file" },
        }
    }
}

fn entries(names: Vec<String>) -> Vec<Entry> {
    names
        .into_iter()
        .map(|name| match name.strip_suffix('/') {
            Some(dir) => Entry {
                name: dir.to_owned(),
                directory: true,
            },
            None => Entry {
                name,
                directory: false,
            },
        })
        .collect()
}

pub async fn handle(device: &Device, args: FilesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        FilesCommand::List { path } => {
            let listing = entries(device.list_files(&path).await?);
            let out = output::render_list(&global.output, &listing, |e| EntryRow::from(e))?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        FilesCommand::Check { path } => {
            let check = device.full_dir_check(&path).await?;
            let out = output::render_single(&global.output, &check, |c| match c {
                DirCheck::Exists => format!("{path}: all directories exist"),
                DirCheck::Missing(dir) => format!("{path}: missing {dir}"),
            })?;
            output::print_output(&out, global.quiet);
            match check {
                DirCheck::Exists => Ok(()),
                DirCheck::Missing(dir) => Err(CliError::NotFound {
                    message: format!("Directory '{dir}' does not exist"),
                }),
            }
        }

        FilesCommand::Mkdir { path } => {
            if device.create_dir(&path).await? {
                if !global.quiet {
                    eprintln!("Created {path}");
                }
                Ok(())
            } else {
                Err(CliError::OperationFailed {
                    message: format!("Could not create {path}; it may already exist"),
                })
            }
        }

        FilesCommand::Delete { path } => {
            if device.delete_dir(&path).await? {
                if !global.quiet {
                    eprintln!("Deleted {path}");
                }
                Ok(())
            } else {
                Err(CliError::NotFound {
                    message: format!("Could not delete {path}"),
                })
            }
        }

        FilesCommand::Free => {
            let free = device.bytes_free().await?;
            let out = output::render_single(&global.output, &free, u64::to_string)?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
