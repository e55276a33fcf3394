//! Persistent tag cache.
//!
//! Extracted tags are cached per file, keyed by the file's repo-relative
//! path with the modification time stored inside the value. A hit with a
//! matching mtime skips parsing entirely, which dominates warm-run time.
//!
//! Layout: redb database at `<root>/.scopemap-cache/tags.redb`; values
//! are bincode-serialized `(mtime_secs, mtime_nanos, Vec<Tag>)` records.
//! Storing the mtime in the value keeps validation atomic - there is no
//! separate metadata table to drift out of sync.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use anyhow::{Context, Result};
use redb::{Database, TableDefinition};
use serde::{Deserialize, Serialize};

use crate::types::Tag;

const TAGS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("tags");

/// Directory created under the repo root to hold the cache database.
pub const CACHE_DIR_NAME: &str = ".scopemap-cache";

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    mtime_secs: u64,
    mtime_nanos: u32,
    tags: Vec<Tag>,
}

impl CacheEntry {
    fn new(mtime: SystemTime, tags: Vec<Tag>) -> Option<Self> {
        let duration = mtime.duration_since(SystemTime::UNIX_EPOCH).ok()?;
        Some(Self {
            mtime_secs: duration.as_secs(),
            mtime_nanos: duration.subsec_nanos(),
            tags,
        })
    }

    fn matches(&self, mtime: SystemTime) -> bool {
        let Ok(duration) = mtime.duration_since(SystemTime::UNIX_EPOCH) else {
            return false;
        };
        self.mtime_secs == duration.as_secs() && self.mtime_nanos == duration.subsec_nanos()
    }
}

/// Mtime-validated per-file tag cache backed by redb.
pub struct TagCache {
    db: Database,
}

impl TagCache {
    /// Open or create the cache database under `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating cache directory {}", dir.display()))?;
        let db_path = dir.join("tags.redb");
        let db = Database::create(&db_path)
            .with_context(|| format!("opening cache database {}", db_path.display()))?;
        Ok(Self { db })
    }

    /// Cached tags for `path`, or `None` on a miss or stale mtime.
    /// Corrupt or unreadable entries behave as misses.
    pub fn get(&self, path: &str, mtime: SystemTime) -> Option<Vec<Tag>> {
        let txn = self.db.begin_read().ok()?;
        let table = txn.open_table(TAGS_TABLE).ok()?;
        let value = table.get(path).ok()??;
        let entry: CacheEntry = bincode::deserialize(value.value()).ok()?;
        if entry.matches(mtime) {
            Some(entry.tags)
        } else {
            None
        }
    }

    /// Store tags for `path` at the given mtime, replacing any previous
    /// entry.
    pub fn put(&self, path: &str, mtime: SystemTime, tags: Vec<Tag>) -> Result<()> {
        let entry = CacheEntry::new(mtime, tags).context("file mtime before UNIX epoch")?;
        let bytes = bincode::serialize(&entry).context("serializing cache entry")?;

        let txn = self.db.begin_write().context("starting cache write")?;
        {
            let mut table = txn.open_table(TAGS_TABLE).context("opening tags table")?;
            table.insert(path, bytes.as_slice()).context("writing cache entry")?;
        }
        txn.commit().context("committing cache write")?;
        Ok(())
    }
}
