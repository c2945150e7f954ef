//! Facts, hostname and feature handlers.

use std::fmt::Write as _;

use nxkit_core::{Device, Facts};
use serde::Serialize;
use tabled::Tabled;

use crate::cli::{FeaturesArgs, GlobalOpts, HostnameArgs};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "VLAN")]
    vlan: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn or_dash(value: Option<&String>) -> String {
    value.cloned().unwrap_or_else(|| "-".into())
}

fn facts_text(facts: &Facts) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Hostname:     {}", or_dash(facts.hostname.as_ref()));
    let _ = writeln!(out, "Platform:     {}", or_dash(facts.platform.as_ref()));
    let _ = writeln!(out, "OS:           {}", or_dash(facts.os.as_ref()));
    let _ = writeln!(out, "Kickstart:    {}", or_dash(facts.kickstart_image.as_ref()));
    let _ = writeln!(out, "Last reboot:  {}", or_dash(facts.last_reboot_reason.as_ref()));
    let _ = writeln!(
        out,
        "Modules: {}  Power supplies: {}  Fans: {}",
        facts.modules.len(),
        facts.power_supply_info.len(),
        facts.fan_info.len()
    );
    if !facts.interfaces_detail.is_empty() {
        let rows: Vec<InterfaceRow> = facts
            .interfaces_detail
            .iter()
            .map(|i| InterfaceRow {
                interface: i.interface.clone(),
                state: or_dash(i.state.as_ref()),
                vlan: or_dash(i.vlan.as_ref()),
                speed: or_dash(i.speed.as_ref()),
                description: or_dash(i.description.as_ref()),
            })
            .collect();
        out.push('\n');
        out.push_str(&output::render_table(&rows));
    }
    out.trim_end().to_owned()
}

pub async fn facts(device: &Device, global: &GlobalOpts) -> Result<(), CliError> {
    let facts = device.facts().await?;
    let out = output::render_single(&global.output, &facts, facts_text)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn hostname(
    device: &Device,
    args: HostnameArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let name = device.hostname(args.domain).await?;
    let out = output::render_single(&global.output, name.as_str(), str::to_owned)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[derive(Serialize)]
struct FeatureState {
    feature: String,
    enabled: bool,
}

#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "Feature")]
    feature: String,
}

pub async fn features(
    device: &Device,
    args: FeaturesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.feature {
        Some(feature) => {
            let enabled = device.feature_enabled(&feature).await?;
            let state = FeatureState { feature, enabled };
            let color = output::should_color(&global.color);
            let out = output::render_single(&global.output, &state, |s| {
                let label = if s.enabled { "enabled" } else { "disabled" };
                format!("{}: {}", s.feature, output::status(label, s.enabled, color))
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
        None => {
            let names = device.feature_list().await?;
            let out = output::render_list(&global.output, &names, |n| FeatureRow {
                feature: n.clone(),
            })?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
