//! Pre-migration snapshot of the legacy store

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::{TouchlineError, TouchlineResult};
use crate::storage::file_io::{run_blocking, write_atomic};

pub const SNAPSHOT_VERSION: u32 = 1;

/// SHA-256 (hex) of the canonical JSON form of `raw`
///
/// Canonical means parsed and re-serialized with object keys sorted, so
/// formatting differences between backends do not count as changes.
pub fn canonical_checksum(raw: &str) -> Result<String, String> {
    let canonical = canonical_json(raw)?;
    let digest = Sha256::digest(canonical.as_bytes());
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}

/// Re-serialize `raw` with sorted object keys and no whitespace
pub fn canonical_json(raw: &str) -> Result<String, String> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| e.to_string())?;
    serde_json::to_string(&value).map_err(|e| e.to_string())
}

/// Every legacy value at the moment the migration started
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationBackup {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    /// Raw legacy values by storage key
    pub entries: BTreeMap<String, String>,
    /// Canonical checksum of each entry
    pub checksums: BTreeMap<String, String>,
}

impl MigrationBackup {
    /// Snapshot `entries`, failing if any of them is not valid JSON
    pub fn capture(entries: BTreeMap<String, String>) -> TouchlineResult<Self> {
        let mut checksums = BTreeMap::new();
        for (key, raw) in &entries {
            let checksum = canonical_checksum(raw).map_err(|reason| TouchlineError::corrupt(key, reason))?;
            checksums.insert(key.clone(), checksum);
        }

        Ok(Self {
            version: SNAPSHOT_VERSION,
            created_at: Utc::now(),
            entries,
            checksums,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recompute every checksum and compare with the recorded ones
    pub fn verify(&self) -> TouchlineResult<()> {
        if self.version != SNAPSHOT_VERSION {
            return Err(TouchlineError::MigrationFailed(format!(
                "unsupported snapshot version {}",
                self.version
            )));
        }
        for (key, raw) in &self.entries {
            let actual = canonical_checksum(raw).map_err(|reason| TouchlineError::corrupt(key, reason))?;
            if self.checksums.get(key) != Some(&actual) {
                return Err(TouchlineError::corrupt(key, "snapshot checksum mismatch"));
            }
        }
        Ok(())
    }

    pub fn file_name(&self) -> String {
        format!(
            "migration-backup-{}.json",
            self.created_at.format("%Y%m%d-%H%M%S%3f")
        )
    }

    /// Write the snapshot into `dir`, returning the file path
    pub async fn persist(&self, dir: &Path) -> TouchlineResult<PathBuf> {
        let path = dir.join(self.file_name());
        let text = serde_json::to_string_pretty(self)?;
        let target = path.clone();
        run_blocking(move || write_atomic(target, &text)).await?;
        Ok(path)
    }

    pub async fn load(path: &Path) -> TouchlineResult<Self> {
        let target = path.to_path_buf();
        let text = run_blocking(move || {
            std::fs::read_to_string(&target)
                .map_err(|e| TouchlineError::Io(format!("Failed to read {}: {}", target.display(), e)))
        })
        .await?;
        let backup: Self = serde_json::from_str(&text)?;
        backup.verify()?;
        Ok(backup)
    }
}
