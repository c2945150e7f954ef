// Device facts and feature inventory.

use std::collections::BTreeSet;

use nxkit_api::Request;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::device::Device;
use crate::error::CoreError;
use crate::table::{field, rows};

/// Feature-table names that differ from the CLI keyword, as
/// `(table name, CLI name)`.
const FEATURE_ALIASES: &[(&str, &str)] = &[
    ("vnseg_vlan", "vn-segment-vlan-based"),
    ("telnetServer", "telnet"),
    ("sshServer", "ssh"),
    ("hsrp_engine", "hsrp"),
    ("sftpServer", "sftp-server"),
    ("scpServer", "scp-server"),
];

/// Internal features that cannot be toggled from the CLI.
const HIDDEN_FEATURES: &[&str] = &["bfd_app", "tunnel", "onep"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InterfaceStatus {
    pub interface: String,
    pub description: Option<String>,
    pub state: Option<String>,
    pub vlan: Option<String>,
    pub duplex: Option<String>,
    pub speed: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Module {
    pub ports: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub model: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PowerSupply {
    pub number: Option<String>,
    pub model: Option<String>,
    pub actual_output: Option<String>,
    pub actual_input: Option<String>,
    pub total_capacity: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Fan {
    pub name: Option<String>,
    pub model: Option<String>,
    pub hw_ver: Option<String>,
    pub direction: Option<String>,
    pub status: Option<String>,
}

/// Inventory summary gathered from `show version`, `show interface status`,
/// `show module` and `show environment`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facts {
    pub os: Option<String>,
    pub kickstart_image: Option<String>,
    pub platform: Option<String>,
    pub hostname: Option<String>,
    pub last_reboot_reason: Option<String>,
    pub interfaces: Vec<String>,
    pub interfaces_detail: Vec<InterfaceStatus>,
    pub modules: Vec<Module>,
    pub power_supply_info: Vec<PowerSupply>,
    pub fan_info: Vec<Fan>,
}

/// Map a feature-table name to its CLI keyword, or `None` for hidden ones.
pub fn cli_feature_name(table_name: &str) -> Option<&str> {
    if HIDDEN_FEATURES.contains(&table_name) {
        return None;
    }
    Some(
        FEATURE_ALIASES
            .iter()
            .find(|(table, _)| *table == table_name)
            .map_or(table_name, |(_, cli)| *cli),
    )
}

/// Inverse of [`cli_feature_name`].
pub fn table_feature_name(cli_name: &str) -> &str {
    FEATURE_ALIASES
        .iter()
        .find(|(_, cli)| *cli == cli_name)
        .map_or(cli_name, |(table, _)| *table)
}

/// `(name, status)` pairs from the plain-text feature table some platforms
/// put in `clierror`. The first two lines are headers.
pub fn parse_feature_text(text: &str) -> Vec<(String, String)> {
    text.lines()
        .skip(2)
        .filter_map(|line| {
            let mut words = line.split_whitespace();
            let name = words.next()?;
            let status = words.last().unwrap_or_default();
            Some((name.to_owned(), status.to_owned()))
        })
        .collect()
}

fn interface_status(row: &Value) -> Option<InterfaceStatus> {
    Some(InterfaceStatus {
        interface: field(row, "interface")?,
        description: field(row, "name"),
        state: field(row, "state"),
        vlan: field(row, "vlan"),
        duplex: field(row, "duplex"),
        speed: field(row, "speed"),
        kind: field(row, "type"),
    })
}

fn module(row: &Value) -> Module {
    Module {
        ports: field(row, "ports"),
        kind: field(row, "modtype"),
        model: field(row, "model"),
        status: field(row, "status"),
    }
}

fn power_supply(row: &Value) -> PowerSupply {
    PowerSupply {
        number: field(row, "psnum"),
        model: field(row, "psmodel"),
        actual_output: field(row, "actual_out"),
        actual_input: field(row, "actual_in"),
        total_capacity: field(row, "tot_capa"),
        status: field(row, "ps_status"),
    }
}

fn fan(row: &Value) -> Fan {
    Fan {
        name: field(row, "fanname"),
        model: field(row, "fanmodel"),
        hw_ver: field(row, "fanhwver"),
        direction: field(row, "fandir"),
        status: field(row, "fanstatus"),
    }
}

impl Device {
    /// Configured hostname, cut at the first `.` unless `with_domain`.
    pub async fn hostname(&self, with_domain: bool) -> Result<String, CoreError> {
        let outcome = self.show("show hostname").await?;
        let hostname = outcome
            .structured()
            .and_then(|body| field(body, "hostname"))
            .ok_or_else(|| CoreError::Decode {
                message: "show hostname returned no hostname".into(),
            })?;
        if with_domain {
            return Ok(hostname);
        }
        Ok(hostname
            .split_once('.')
            .map_or(hostname.as_str(), |(short, _)| short)
            .to_owned())
    }

    /// Gather [`Facts`].
    ///
    /// Platforms that reject `show interface status` (NX-OSv) report no
    /// interfaces instead of failing.
    pub async fn facts(&self) -> Result<Facts, CoreError> {
        let version = self.show("show version").await?;
        let version = version.structured().cloned().unwrap_or(Value::Null);

        let mut facts = Facts {
            os: field(&version, "rr_sys_ver"),
            kickstart_image: field(&version, "kickstart_ver_str"),
            platform: field(&version, "chassis_id"),
            hostname: field(&version, "host_name"),
            last_reboot_reason: field(&version, "rr_reason"),
            ..Facts::default()
        };

        match self.show("show interface status").await {
            Ok(outcome) => {
                if let Some(body) = outcome.structured() {
                    facts.interfaces_detail = rows(body, "TABLE_interface", "ROW_interface")
                        .into_iter()
                        .filter_map(interface_status)
                        .collect();
                    facts.interfaces = facts
                        .interfaces_detail
                        .iter()
                        .map(|i| i.interface.clone())
                        .collect();
                }
            }
            Err(CoreError::Cli { code, .. }) => {
                debug!(%code, "show interface status rejected, skipping interfaces");
            }
            Err(e) => return Err(e),
        }

        let modules = self.show("show module").await?;
        if let Some(body) = modules.structured() {
            facts.modules = rows(body, "TABLE_modinfo", "ROW_modinfo")
                .into_iter()
                .map(module)
                .collect();
        }

        let environment = self.show("show environment").await?;
        if let Some(body) = environment.structured() {
            if let Some(psu) = body.get("powersup") {
                facts.power_supply_info = rows(psu, "TABLE_psinfo", "ROW_psinfo")
                    .into_iter()
                    .map(power_supply)
                    .collect();
            }
            if let Some(fans) = body.get("fandetails") {
                facts.fan_info = rows(fans, "TABLE_faninfo", "ROW_faninfo")
                    .into_iter()
                    .map(fan)
                    .collect();
            }
        }

        Ok(facts)
    }

    /// CLI names of the features this switch supports, sorted.
    pub async fn feature_list(&self) -> Result<Vec<String>, CoreError> {
        let outcomes = self.probe(Request::show("show feature")).await?;
        let Some(outcome) = outcomes.first() else {
            return Ok(Vec::new());
        };

        let table_names: Vec<String> = match (outcome.structured(), outcome.failure()) {
            (_, Some(failure)) => parse_feature_text(&failure.code)
                .into_iter()
                .map(|(name, _)| name)
                .collect(),
            (Some(body), None) => rows(body, "TABLE_cfcFeatureCtrlTable", "ROW_cfcFeatureCtrlTable")
                .into_iter()
                .filter_map(|row| field(row, "cfcFeatureCtrlName2"))
                .collect(),
            (None, None) => Vec::new(),
        };

        let features: BTreeSet<String> = table_names
            .iter()
            .filter_map(|name| cli_feature_name(name))
            .map(String::from)
            .collect();
        Ok(features.into_iter().collect())
    }

    /// Whether `feature` (CLI name) is enabled on any of its instances.
    pub async fn feature_enabled(&self, feature: &str) -> Result<bool, CoreError> {
        let wanted = table_feature_name(feature);
        let outcomes = self.probe(Request::show("show feature")).await?;
        let Some(outcome) = outcomes.first() else {
            return Ok(false);
        };

        if let Some(failure) = outcome.failure() {
            return Ok(parse_feature_text(&failure.code)
                .into_iter()
                .any(|(name, status)| name == wanted && status.starts_with("enabled")));
        }

        let Some(body) = outcome.structured() else {
            return Ok(false);
        };
        Ok(
            rows(body, "TABLE_cfcFeatureCtrlTable", "ROW_cfcFeatureCtrlTable")
                .into_iter()
                .filter(|row| field(row, "cfcFeatureCtrlName2").as_deref() == Some(wanted))
                .any(|row| {
                    field(row, "cfcFeatureCtrlOpStatus2")
                        .is_some_and(|status| status.starts_with("enabled"))
                }),
        )
    }
}
