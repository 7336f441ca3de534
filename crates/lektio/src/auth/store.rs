//! Durable token storage.
//!
//! The store keeps the access/refresh pair with independent storage
//! horizons (access roughly a day, refresh roughly a week), mirroring the
//! cookie lifetimes of the original deployment. Horizon expiry is enforced
//! here at read time and is independent of the expiry claim embedded in
//! the access token; both are honored.

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StoreError;

use super::tokens::TokenPair;

/// Storage horizon for the access entry.
pub const ACCESS_HORIZON_DAYS: i64 = 1;

/// Storage horizon for the refresh entry.
pub const REFRESH_HORIZON_DAYS: i64 = 7;

/// Durable storage for the current token pair.
///
/// Writes are immediately visible to any subsequent read in the same
/// process. Tokens are only stored as a pair; `read` treats a partial
/// record (one entry past its horizon) as absence.
pub trait TokenStore: Send + Sync {
    /// Write both tokens with their respective storage horizons.
    fn persist(&self, pair: &TokenPair) -> Result<(), StoreError>;

    /// Read the stored pair, or `None` if absent, partial, or past a
    /// horizon.
    fn read(&self) -> Option<TokenPair>;

    /// Remove both entries. A no-op if already absent.
    fn clear(&self) -> Result<(), StoreError>;
}

/// The serialized record: each entry carries its own horizon.
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    access: String,
    access_expires_at: DateTime<Utc>,
    refresh: String,
    refresh_expires_at: DateTime<Utc>,
}

impl StoredRecord {
    fn from_pair(pair: &TokenPair, now: DateTime<Utc>) -> Self {
        Self {
            access: pair.access.as_str().to_string(),
            access_expires_at: now + Duration::days(ACCESS_HORIZON_DAYS),
            refresh: pair.refresh.as_str().to_string(),
            refresh_expires_at: now + Duration::days(REFRESH_HORIZON_DAYS),
        }
    }

    /// Both entries must still be within their horizons to count.
    fn to_pair(&self, now: DateTime<Utc>) -> Option<TokenPair> {
        if self.access_expires_at <= now || self.refresh_expires_at <= now {
            return None;
        }
        Some(TokenPair::new(self.access.clone(), self.refresh.clone()))
    }
}

/// In-memory token store, for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    record: Mutex<Option<StoredRecord>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn persist(&self, pair: &TokenPair) -> Result<(), StoreError> {
        let record = StoredRecord::from_pair(pair, Utc::now());
        *self.record.lock().expect("token store lock poisoned") = Some(record);
        Ok(())
    }

    fn read(&self) -> Option<TokenPair> {
        self.record
            .lock()
            .expect("token store lock poisoned")
            .as_ref()
            .and_then(|r| r.to_pair(Utc::now()))
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.record.lock().expect("token store lock poisoned") = None;
        Ok(())
    }
}

impl std::fmt::Debug for MemoryTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTokenStore")
            .field("record", &"[REDACTED]")
            .finish()
    }
}

/// File-backed token store.
///
/// The record is one JSON file with restrictive permissions. Writes go
/// through a temp file and rename, so a reader never observes a partial
/// pair.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store backed by the given file path. The parent directory
    /// must exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    fn write_record(&self, record: &StoredRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(record)?;

        let tmp = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }

        // Restrictive permissions (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = fs::metadata(&tmp)?.permissions();
            perms.set_mode(0o600);
            fs::set_permissions(&tmp, perms)?;
        }

        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn persist(&self, pair: &TokenPair) -> Result<(), StoreError> {
        let record = StoredRecord::from_pair(pair, Utc::now());
        self.write_record(&record)?;
        debug!(path = %self.path.display(), "persisted token pair");
        Ok(())
    }

    fn read(&self) -> Option<TokenPair> {
        let json = fs::read_to_string(&self.path).ok()?;
        // An unreadable or corrupt record is absence, never an error
        let record: StoredRecord = serde_json::from_str(&json).ok()?;
        record.to_pair(Utc::now())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl std::fmt::Debug for FileTokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTokenStore")
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> TokenPair {
        TokenPair::new("access-token-value", "refresh-token-value")
    }

    #[test]
    fn memory_round_trip() {
        let store = MemoryTokenStore::new();
        store.persist(&pair()).unwrap();

        let read = store.read().unwrap();
        assert_eq!(read.access.as_str(), "access-token-value");
        assert_eq!(read.refresh.as_str(), "refresh-token-value");
    }

    #[test]
    fn memory_clear_is_idempotent() {
        let store = MemoryTokenStore::new();
        store.persist(&pair()).unwrap();

        store.clear().unwrap();
        assert!(store.read().is_none());
        store.clear().unwrap();
        assert!(store.read().is_none());
    }

    #[test]
    fn record_past_access_horizon_reads_as_absent() {
        let now = Utc::now();
        let record = StoredRecord {
            access: "a".into(),
            access_expires_at: now - Duration::hours(1),
            refresh: "r".into(),
            refresh_expires_at: now + Duration::days(6),
        };
        assert!(record.to_pair(now).is_none());
    }

    #[test]
    fn record_past_refresh_horizon_reads_as_absent() {
        let now = Utc::now();
        let record = StoredRecord {
            access: "a".into(),
            access_expires_at: now + Duration::hours(12),
            refresh: "r".into(),
            refresh_expires_at: now - Duration::hours(1),
        };
        assert!(record.to_pair(now).is_none());
    }

    #[test]
    fn file_round_trip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("tokens.json"));

        assert!(store.read().is_none());

        store.persist(&pair()).unwrap();
        let read = store.read().unwrap();
        assert_eq!(read.access.as_str(), "access-token-value");

        store.clear().unwrap();
        assert!(store.read().is_none());
        store.clear().unwrap();
    }

    #[test]
    fn file_corrupt_record_reads_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        fs::write(&path, "{not json").unwrap();

        let store = FileTokenStore::new(path);
        assert!(store.read().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn file_permissions_are_restrictive() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = FileTokenStore::new(dir.path().join("tokens.json"));
        store.persist(&pair()).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
