//! Organization identifiers.
//!
//! Every participant in the battery-passport network is named `org<N>`. The
//! name determines the MSP id, the CA entry in the connection profile and the
//! on-disk location of the profile itself.

use crate::domain::error::GatewayError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Organizations enrolled when no explicit list is configured.
pub const DEFAULT_ORGS: &[&str] = &["org1", "org2", "org3", "org4", "org5", "org6", "org7"];

/// A validated organization name (`org1`, `org2`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrgId(String);

impl OrgId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The numeric suffix of the name (`org3` -> 3).
    pub fn number(&self) -> u32 {
        self.0[3..].parse().unwrap_or_default()
    }

    /// MSP id as registered in the channel configuration (`Org3MSP`).
    pub fn msp_id(&self) -> String {
        format!("Org{}MSP", self.number())
    }

    /// Domain used by the test-network layout (`org3.example.com`).
    pub fn domain(&self) -> String {
        format!("{}.example.com", self.0)
    }

    /// Key of this organization's CA inside its connection profile.
    pub fn ca_key(&self) -> String {
        format!("ca.{}", self.domain())
    }

    /// Default affiliation used when registering application users.
    pub fn default_affiliation(&self) -> String {
        format!("{}.department1", self.0)
    }

    /// Location of the connection profile below the `organizations` directory.
    pub fn profile_path(&self, organizations_dir: &Path) -> PathBuf {
        organizations_dir
            .join("peerOrganizations")
            .join(self.domain())
            .join(format!("connection-{}.json", self.0))
    }

    /// MSP directory cryptogen writes for `user` (`users/<user>@org3.example.com/msp`).
    pub fn user_msp_dir(&self, organizations_dir: &Path, user: &str) -> PathBuf {
        organizations_dir
            .join("peerOrganizations")
            .join(self.domain())
            .join("users")
            .join(format!("{}@{}", user, self.domain()))
            .join("msp")
    }
}

impl FromStr for OrgId {
    type Err = GatewayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        let valid = normalized
            .strip_prefix("org")
            .map(|n| {
                n.chars().all(|c| c.is_ascii_digit()) && !n.starts_with('0') && n.parse::<u32>().is_ok()
            })
            .unwrap_or(false);
        if !valid {
            return Err(GatewayError::InvalidRequest(format!(
                "'{}' is not a valid organization (expected org1, org2, ...)",
                s
            )));
        }
        Ok(Self(normalized))
    }
}

impl TryFrom<String> for OrgId {
    type Error = GatewayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrgId> for String {
    fn from(value: OrgId) -> Self {
        value.0
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_names() {
        let org: OrgId = " Org3 ".parse().unwrap();
        assert_eq!(org.as_str(), "org3");
        assert_eq!(org.number(), 3);
        assert_eq!(org.msp_id(), "Org3MSP");
        assert_eq!(org.ca_key(), "ca.org3.example.com");
        assert_eq!(org.default_affiliation(), "org3.department1");
    }

    #[test]
    fn rejects_malformed_names() {
        for bad in ["", "org", "org0", "org01", "orgX", "peer1", "org-1", "org99999999999"] {
            assert!(bad.parse::<OrgId>().is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn profile_path_follows_test_network_layout() {
        let org: OrgId = "org2".parse().unwrap();
        let path = org.profile_path(Path::new("/net/organizations"));
        assert_eq!(
            path,
            PathBuf::from("/net/organizations/peerOrganizations/org2.example.com/connection-org2.json")
        );
    }

    #[test]
    fn user_msp_dir_follows_cryptogen_layout() {
        let org: OrgId = "org4".parse().unwrap();
        let dir = org.user_msp_dir(Path::new("organizations"), "User1");
        assert_eq!(
            dir,
            PathBuf::from("organizations/peerOrganizations/org4.example.com/users/User1@org4.example.com/msp")
        );
    }
}
