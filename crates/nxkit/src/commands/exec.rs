//! `show`, `config` and `bash` handlers.

use nxkit_api::{CliOutcome, Request, batch};
use nxkit_core::{CoreError, Device};

use crate::cli::{BashArgs, ConfigArgs, GlobalOpts, OutputFormat, ShowArgs};
use crate::error::CliError;
use crate::output;

/// Text for one outcome: the CLI text, or the structured body as JSON.
fn outcome_text(outcome: &CliOutcome) -> String {
    if let Some(text) = outcome.text() {
        return text.trim_end().to_owned();
    }
    outcome
        .structured()
        .and_then(|v| serde_json::to_string_pretty(v).ok())
        .unwrap_or_default()
}

fn outcomes_text(outcomes: &[CliOutcome]) -> String {
    outcomes
        .iter()
        .map(outcome_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn show(device: &Device, args: ShowArgs, global: &GlobalOpts) -> Result<(), CliError> {
    // Text output asks the switch for its own rendering.
    let input = batch::join(args.commands.iter());
    let request = match global.output {
        OutputFormat::Text => Request::show_ascii(input),
        _ => Request::show(input),
    };
    let client = device.client();
    let outcomes = client
        .execute(&client.prepare(request))
        .await
        .map_err(CoreError::from)?
        .into_outcomes();

    let out = output::render_single(&global.output, outcomes.as_slice(), outcomes_text)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn config(device: &Device, args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let outcomes = device.config(&args.commands).await?;
    let out = output::render_single(&global.output, outcomes.as_slice(), outcomes_text)?;
    output::print_output(&out, global.quiet);
    if !global.quiet {
        eprintln!("Applied {} command(s) on {}", outcomes.len(), device.host());
    }
    Ok(())
}

pub async fn bash(device: &Device, args: BashArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let outcome = device.bash(&args.command).await?;
    let out = output::render_single(&global.output, &outcome, outcome_text)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
