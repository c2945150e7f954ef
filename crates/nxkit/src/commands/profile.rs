//! Profile subcommand handlers. These never contact a switch.

use crate::cli::{GlobalOpts, ProfileArgs, ProfileCommand};
use crate::config::{self, Profile};
use crate::error::CliError;
use crate::output;

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

pub fn handle(args: ProfileArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ProfileCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ProfileCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(&global.output, &cfg, |c| format!("{c:#?}"))?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfileCommand::List => {
            let cfg = config::load_config_or_default();
            let mut names: Vec<&String> = cfg.profiles.keys().collect();
            names.sort_unstable();
            let default = cfg.default_profile.as_deref();
            let out = output::render_single(&global.output, &names, |ns| {
                ns.iter()
                    .map(|n| {
                        if Some(n.as_str()) == default {
                            format!("{n} (default)")
                        } else {
                            (*n).clone()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProfileCommand::Add {
            name,
            host,
            username,
            protocol,
            port,
            default,
        } => {
            let mut cfg = config::load_config_or_default();
            let profile = Profile {
                host,
                protocol: protocol.map(Into::into).unwrap_or_default(),
                port,
                username,
                ..Profile::default()
            };
            cfg.profiles.insert(name.clone(), profile);
            if default || cfg.profiles.len() == 1 {
                cfg.default_profile = Some(name.clone());
            }
            config::save_config(&cfg)?;
            if !global.quiet {
                eprintln!(
                    "Profile '{name}' written to {}",
                    config::config_path().display()
                );
                eprintln!("  Store its password with: nxkit profile set-password {name}");
            }
            Ok(())
        }

        ProfileCommand::SetPassword { name } => {
            let password = rpassword::prompt_password(format!("Password for '{name}': "))
                .map_err(prompt_err)?;
            if password.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "password cannot be empty".into(),
                });
            }
            nxkit_config::store_password(&name, &password)?;
            if !global.quiet {
                eprintln!("Password for '{name}' stored in the system keyring");
            }
            Ok(())
        }
    }
}
