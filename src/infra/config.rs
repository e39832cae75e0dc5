//! Centralized configuration (environment variables + defaults).
//!
//! Per-organization differences (channel, contract, CA name, affiliation) are
//! data: defaults apply to every organization and an optional TOML file named by
//! `ORGS_FILE` overrides them per organization:
//!
//! ```toml
//! [orgs.org1]
//! channel = "material-supply-channel"
//! contract = "material"
//! ca_name = "ca-org1"
//! ```

use crate::domain::error::GatewayError;
use crate::domain::identity::IdentityLabels;
use crate::domain::org::{OrgId, DEFAULT_ORGS};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Channel/contract and CA details of one organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgSettings {
    pub org: OrgId,
    pub channel: String,
    pub contract: String,
    /// `caname` sent to a multi-CA server; `None` uses the profile's value.
    pub ca_name: Option<String>,
    pub affiliation: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: SocketAddr,
    pub wallet_dir: PathBuf,
    /// Root of the `organizations/` tree holding the connection profiles.
    pub profiles_dir: PathBuf,
    pub orgs: Vec<OrgSettings>,
    pub labels: IdentityLabels,
    /// Bootstrap secret of the CA's `admin` registrar.
    pub admin_secret: String,
    /// Enables the advisory per-route organization check.
    pub org_guard: bool,
    pub http_timeout: Duration,
    pub ca_verify_tls: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            wallet_dir: PathBuf::from("wallet"),
            profiles_dir: PathBuf::from("../organizations"),
            orgs: default_orgs("public-channel", "public"),
            labels: IdentityLabels::default(),
            admin_secret: "adminpw".to_string(),
            org_guard: true,
            http_timeout: Duration::from_secs(30),
            ca_verify_tls: false,
        }
    }
}

fn default_orgs(channel: &str, contract: &str) -> Vec<OrgSettings> {
    DEFAULT_ORGS
        .iter()
        .filter_map(|name| name.parse::<OrgId>().ok())
        .map(|org| OrgSettings::with_defaults(org, channel, contract))
        .collect()
}

impl OrgSettings {
    pub fn with_defaults(org: OrgId, channel: &str, contract: &str) -> Self {
        Self {
            affiliation: org.default_affiliation(),
            org,
            channel: channel.to_string(),
            contract: contract.to_string(),
            ca_name: None,
        }
    }
}

/// One `[orgs.<name>]` table of the overrides file.
#[derive(Debug, Default, Deserialize)]
struct OrgOverride {
    channel: Option<String>,
    contract: Option<String>,
    ca_name: Option<String>,
    affiliation: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OrgsFile {
    #[serde(default)]
    orgs: BTreeMap<String, OrgOverride>,
}

impl Settings {
    /// Reads the process environment (after `.env`, if the caller loaded it).
    pub fn from_env() -> Result<Self, GatewayError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup; `from_env` passes the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, GatewayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_addr = match var("BIND_ADDR") {
            Some(v) => v
                .parse()
                .map_err(|e| GatewayError::Config(format!("BIND_ADDR '{}': {}", v, e)))?,
            None => match var("PORT") {
                Some(p) => {
                    let port: u16 = p
                        .parse()
                        .map_err(|e| GatewayError::Config(format!("PORT '{}': {}", p, e)))?;
                    SocketAddr::from(([0, 0, 0, 0], port))
                }
                None => defaults.bind_addr,
            },
        };

        let channel = var("CHANNEL_NAME").unwrap_or_else(|| "public-channel".to_string());
        let contract = var("CONTRACT_NAME").unwrap_or_else(|| "public".to_string());

        let org_ids = match var("ORGS") {
            Some(list) => list
                .split(',')
                .filter(|s| !s.trim().is_empty())
                .map(str::parse::<OrgId>)
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| GatewayError::Config(format!("ORGS: {}", e)))?,
            None => DEFAULT_ORGS
                .iter()
                .filter_map(|name| name.parse().ok())
                .collect(),
        };
        let mut orgs: Vec<OrgSettings> = org_ids
            .into_iter()
            .map(|org| OrgSettings::with_defaults(org, &channel, &contract))
            .collect();

        if let Some(path) = var("ORGS_FILE") {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| GatewayError::Config(format!("ORGS_FILE '{}': {}", path, e)))?;
            apply_overrides(&mut orgs, &content)?;
        }

        if orgs.is_empty() {
            return Err(GatewayError::Config("no organizations configured".into()));
        }

        let http_timeout = match var("HTTP_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.parse::<u64>()
                    .map_err(|e| GatewayError::Config(format!("HTTP_TIMEOUT_SECS '{}': {}", v, e)))?
                    .max(1),
            ),
            None => defaults.http_timeout,
        };

        Ok(Self {
            bind_addr,
            wallet_dir: var("WALLET_DIR").map(PathBuf::from).unwrap_or(defaults.wallet_dir),
            profiles_dir: var("PROFILES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.profiles_dir),
            orgs,
            labels: IdentityLabels {
                admin: var("ADMIN_LABEL").unwrap_or(defaults.labels.admin),
                app_user: var("APP_USER_LABEL").unwrap_or(defaults.labels.app_user),
            },
            admin_secret: var("ADMIN_SECRET").unwrap_or(defaults.admin_secret),
            org_guard: parse_bool("ORG_GUARD", var("ORG_GUARD"), defaults.org_guard)?,
            http_timeout,
            ca_verify_tls: parse_bool("CA_VERIFY_TLS", var("CA_VERIFY_TLS"), defaults.ca_verify_tls)?,
        })
    }

    pub fn org(&self, org: &OrgId) -> Option<&OrgSettings> {
        self.orgs.iter().find(|o| &o.org == org)
    }

    pub fn org_ids(&self) -> impl Iterator<Item = &OrgId> {
        self.orgs.iter().map(|o| &o.org)
    }

    pub fn profile_path(&self, org: &OrgId) -> PathBuf {
        org.profile_path(Path::new(&self.profiles_dir))
    }
}

fn parse_bool(key: &str, value: Option<String>, default: bool) -> Result<bool, GatewayError> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(default),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => Err(GatewayError::Config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

fn apply_overrides(orgs: &mut Vec<OrgSettings>, content: &str) -> Result<(), GatewayError> {
    let file: OrgsFile =
        toml::from_str(content).map_err(|e| GatewayError::Config(format!("ORGS_FILE: {}", e)))?;

    for (name, o) in file.orgs {
        let org: OrgId = name
            .parse()
            .map_err(|e| GatewayError::Config(format!("ORGS_FILE: {}", e)))?;
        let Some(settings) = orgs.iter_mut().find(|s| s.org == org) else {
            return Err(GatewayError::Config(format!(
                "ORGS_FILE configures {} which is not listed in ORGS",
                org
            )));
        };
        if let Some(channel) = o.channel {
            settings.channel = channel;
        }
        if let Some(contract) = o.contract {
            settings.contract = contract;
        }
        if let Some(affiliation) = o.affiliation {
            settings.affiliation = affiliation;
        }
        settings.ca_name = o.ca_name.or(settings.ca_name.take());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_cover_seven_orgs_on_public_channel() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.orgs.len(), 7);
        assert!(settings.orgs.iter().all(|o| o.channel == "public-channel" && o.contract == "public"));
        assert_eq!(settings.labels.app_user, "appUser");
        assert_eq!(settings.bind_addr.port(), 3000);
        assert!(settings.org_guard);
    }

    #[test]
    fn env_values_override_defaults() {
        let settings = Settings::from_lookup(lookup(&[
            ("ORGS", "org1, org2"),
            ("PORT", "8081"),
            ("CHANNEL_NAME", "material-supply-channel"),
            ("APP_USER_LABEL", "APPUSER"),
            ("ORG_GUARD", "off"),
            ("HTTP_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(settings.orgs.len(), 2);
        assert_eq!(settings.orgs[1].channel, "material-supply-channel");
        assert_eq!(settings.bind_addr.port(), 8081);
        assert_eq!(settings.labels.app_user, "APPUSER");
        assert!(!settings.org_guard);
        assert_eq!(settings.http_timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_values_are_config_errors() {
        assert!(Settings::from_lookup(lookup(&[("ORGS", "org1,peer0")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("ORG_GUARD", "maybe")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("BIND_ADDR", "nowhere")])).is_err());
    }

    #[test]
    fn overrides_file_sets_per_org_channel_and_contract() {
        let mut orgs = default_orgs("public-channel", "public");
        apply_overrides(
            &mut orgs,
            r#"
            [orgs.org1]
            channel = "material-supply-channel"
            contract = "material"
            ca_name = "ca-org1"
            "#,
        )
        .unwrap();
        let org1 = &orgs[0];
        assert_eq!(org1.channel, "material-supply-channel");
        assert_eq!(org1.contract, "material");
        assert_eq!(org1.ca_name.as_deref(), Some("ca-org1"));
        assert_eq!(orgs[1].channel, "public-channel");

        let err = apply_overrides(&mut orgs, "[orgs.org9]\nchannel = \"x\"\n").unwrap_err();
        assert!(err.to_string().contains("org9"));
    }
}
