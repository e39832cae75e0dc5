// File-system wallet: `<root>/<org>/<label>.id`, one JSON document per identity.

use crate::domain::identity::Identity;
use crate::domain::org::OrgId;
use crate::storage::wallet::store::{validate_label, IdentityStore, WalletEntry, WalletError};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const ENTRY_SUFFIX: &str = ".id";

pub struct FileSystemWallet {
    root: PathBuf,
}

impl FileSystemWallet {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn org_dir(&self, org: &OrgId) -> PathBuf {
        self.root.join(org.as_str())
    }

    fn entry_path(&self, org: &OrgId, label: &str) -> PathBuf {
        self.org_dir(org).join(format!("{}{}", label, ENTRY_SUFFIX))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> WalletError {
    WalletError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[async_trait]
impl IdentityStore for FileSystemWallet {
    async fn get(&self, org: &OrgId, label: &str) -> Result<Option<Identity>, WalletError> {
        validate_label(label)?;
        let path = self.entry_path(org, label);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(&path, e)),
        };
        let entry: WalletEntry =
            serde_json::from_str(&content).map_err(|e| WalletError::Corrupt {
                org: org.to_string(),
                label: label.to_string(),
                reason: e.to_string(),
            })?;
        entry.into_identity(org, label).map(Some)
    }

    async fn put(&self, label: &str, identity: &Identity) -> Result<(), WalletError> {
        validate_label(label)?;
        let dir = self.org_dir(&identity.org);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| io_error(&dir, e))?;

        let path = self.entry_path(&identity.org, label);
        let content = serde_json::to_vec_pretty(&WalletEntry::from_identity(identity)).map_err(
            |e| WalletError::Corrupt {
                org: identity.org.to_string(),
                label: label.to_string(),
                reason: e.to_string(),
            },
        )?;

        // Readers see either the previous entry or the complete new one.
        let tmp = dir.join(format!(".{}{}.tmp", label, ENTRY_SUFFIX));
        tokio::fs::write(&tmp, &content)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;
        Ok(())
    }

    async fn remove(&self, org: &OrgId, label: &str) -> Result<bool, WalletError> {
        validate_label(label)?;
        let path = self.entry_path(org, label);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    async fn list(&self, org: &OrgId) -> Result<Vec<String>, WalletError> {
        let dir = self.org_dir(org);
        let mut read_dir = match tokio::fs::read_dir(&dir).await {
            Ok(r) => r,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&dir, e)),
        };

        let mut labels = Vec::new();
        while let Some(entry) = read_dir.next_entry().await.map_err(|e| io_error(&dir, e))? {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            if let Some(label) = name.strip_suffix(ENTRY_SUFFIX) {
                labels.push(label.to_string());
            }
        }
        labels.sort();
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identity::Role;

    #[tokio::test]
    async fn entries_persist_in_fabric_layout() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = FileSystemWallet::new(dir.path());
        let org: OrgId = "org4".parse().unwrap();
        let identity = Identity::new(org.clone(), Role::ApplicationUser, "CERT".into(), "KEY".into());

        wallet.put("appUser", &identity).await.unwrap();

        let on_disk = std::fs::read_to_string(dir.path().join("org4").join("appUser.id")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&on_disk).unwrap();
        assert_eq!(json["mspId"], "Org4MSP");
        assert_eq!(json["type"], "X.509");
        assert_eq!(json["credentials"]["privateKey"], "KEY");

        let reopened = FileSystemWallet::new(dir.path());
        assert_eq!(reopened.get(&org, "appUser").await.unwrap(), Some(identity));
        assert_eq!(reopened.list(&org).await.unwrap(), vec!["appUser"]);
    }

    #[tokio::test]
    async fn missing_entries_and_dirs_are_not_errors() {
        let dir = tempfile::tempdir().unwrap();
        let wallet = FileSystemWallet::new(dir.path().join("absent"));
        let org: OrgId = "org1".parse().unwrap();
        assert!(wallet.get(&org, "admin").await.unwrap().is_none());
        assert!(wallet.list(&org).await.unwrap().is_empty());
        assert!(!wallet.remove(&org, "admin").await.unwrap());
    }

    #[tokio::test]
    async fn corrupt_entry_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("org1")).unwrap();
        std::fs::write(dir.path().join("org1").join("admin.id"), "{not json").unwrap();
        let wallet = FileSystemWallet::new(dir.path());
        let err = wallet.get(&"org1".parse().unwrap(), "admin").await.unwrap_err();
        assert!(matches!(err, WalletError::Corrupt { .. }));
    }
}
