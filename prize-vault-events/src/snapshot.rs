//! Per-user event cache snapshots.
//!
//! Each user directory holds one JSON file per cache lineage so that
//! subsequent runs only fetch events after the last cached block:
//!
//! ```text
//! <data_dir>/<chain_id>/<user>/
//!   ├── transfers.json
//!   ├── flashes.json
//!   └── claimed_prizes.json
//! ```

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use alloy::primitives::Address;
use anyhow::{Context, Result};
use prize_vault::{EventCache, EventKind};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Directory holding `user`'s snapshots on `chain_id`.
#[must_use]
pub fn user_dir(data_dir: &Path, chain_id: u64, user: Address) -> PathBuf {
    data_dir.join(chain_id.to_string()).join(format!("{user:#x}"))
}

/// A saved event cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot<T> {
    /// Unix timestamp (seconds) of the sync that produced it.
    pub synced_at: u64,
    /// Cached events, oldest first.
    pub events: EventCache<T>,
}

impl<T> Snapshot<T> {
    /// Wrap `events` with the current timestamp.
    #[must_use]
    pub fn now(events: EventCache<T>) -> Self {
        let synced_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self { synced_at, events }
    }
}

impl<T: Serialize + DeserializeOwned> Snapshot<T> {
    /// Read the `kind` snapshot from `dir`.
    ///
    /// Returns `None` if the file does not exist (first sync) or contains
    /// invalid JSON (logs a warning and triggers a fresh sync).
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read (I/O error).
    pub fn load(dir: &Path, kind: EventKind) -> Result<Option<Self>> {
        let path = dir.join(format!("{kind}.json"));
        if !path.exists() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        match serde_json::from_str::<Self>(&data) {
            Ok(snapshot) => Ok(Some(snapshot)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "corrupted snapshot, starting fresh");
                Ok(None)
            }
        }
    }

    /// Persist the snapshot to `<dir>/<kind>.json` atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be written.
    pub fn save(&self, dir: &Path, kind: EventKind) -> Result<()> {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

        let path = dir.join(format!("{kind}.json"));
        let tmp = dir.join(format!("{kind}.json.tmp"));

        std::fs::write(&tmp, serde_json::to_string_pretty(self)?.as_bytes())
            .with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("renaming {} to {}", tmp.display(), path.display()))?;

        Ok(())
    }
}

/// Load the `kind` cache from `dir`, or an empty one.
///
/// # Errors
///
/// See [`Snapshot::load`].
pub fn load_cache<T: Serialize + DeserializeOwned>(
    dir: &Path,
    kind: EventKind,
) -> Result<EventCache<T>> {
    Ok(Snapshot::load(dir, kind)?.map_or_else(EventCache::default, |s| s.events))
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{B256, U256, address};
    use prize_vault::{BlockStamped, LogPosition, TransferEvent};

    use super::*;

    const USER: Address = address!("0x00000000000000000000000000000000000000b0");

    fn transfer(block_number: u64) -> TransferEvent {
        TransferEvent {
            position: LogPosition {
                block_number,
                transaction_hash: B256::ZERO,
                log_index: 1,
            },
            token: Address::ZERO,
            from: Address::ZERO,
            to: USER,
            value: U256::from(1_000_000_000_000_000_000u128),
        }
    }

    #[test]
    fn save_then_load_restores_the_cache() {
        let data = tempfile::tempdir().unwrap();
        let dir = user_dir(data.path(), 10, USER);
        let cache = EventCache::from(vec![transfer(5), transfer(9)]);

        Snapshot::now(cache.clone())
            .save(&dir, EventKind::Transfers)
            .unwrap();
        let loaded: EventCache<TransferEvent> = load_cache(&dir, EventKind::Transfers).unwrap();

        assert_eq!(loaded, cache, "round trip");
        assert_eq!(loaded.events()[1].block_number(), 9, "order kept");
        assert!(
            !dir.join("transfers.json.tmp").exists(),
            "temp file renamed away"
        );
    }

    #[test]
    fn missing_snapshot_is_empty() {
        let data = tempfile::tempdir().unwrap();
        let loaded: EventCache<TransferEvent> =
            load_cache(data.path(), EventKind::Flashes).unwrap();
        assert!(loaded.is_empty(), "first sync starts empty");
    }

    #[test]
    fn corrupted_snapshot_starts_fresh() {
        let data = tempfile::tempdir().unwrap();
        std::fs::write(data.path().join("claimed_prizes.json"), "{ not json").unwrap();

        let loaded = Snapshot::<TransferEvent>::load(data.path(), EventKind::ClaimedPrizes).unwrap();
        assert!(loaded.is_none(), "corruption is not fatal");
    }

    #[test]
    fn user_dir_is_keyed_by_chain_and_lowercase_address() {
        let dir = user_dir(Path::new("data"), 8453, USER);
        assert_eq!(
            dir,
            Path::new("data/8453/0x00000000000000000000000000000000000000b0"),
            "layout"
        );
    }
}
