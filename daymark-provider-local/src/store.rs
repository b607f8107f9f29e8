//! File-backed event storage.
//!
//! The whole calendar lives in one JSON file. Every request loads it, applies
//! one change and writes it back. Each provider call is its own process, so
//! changes hold an exclusive lock on a sibling `.lock` file from load to
//! save. Writes go through a uniquely named temp file and a rename, so
//! readers never see a half-written store.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use tempfile::NamedTempFile;
use daymark_core::gateway::CalendarHandle;
use daymark_core::memory::EventStore;

const STORE_ENV: &str = "DAYMARK_LOCAL_STORE";
const STORE_FILE: &str = "local-calendar.json";

pub const CALENDAR_ID: &str = "local";
const CALENDAR_TITLE: &str = "Local";

pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: PathBuf) -> Self {
        LocalStore { path }
    }

    /// `$DAYMARK_LOCAL_STORE`, or the platform data dir.
    pub fn default_location() -> Result<Self> {
        if let Ok(path) = std::env::var(STORE_ENV) {
            let expanded = shellexpand::tilde(&path).into_owned();
            return Ok(LocalStore::new(PathBuf::from(expanded)));
        }

        let data_dir = dirs::data_dir().context("Could not determine data directory")?;
        Ok(LocalStore::new(data_dir.join("daymark").join(STORE_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the store. A missing file is a fresh calendar.
    pub fn load(&self) -> Result<EventStore> {
        if !self.path.exists() {
            return Ok(EventStore::with_calendar(CalendarHandle::new(
                CALENDAR_ID,
                CALENDAR_TITLE,
                true,
            )));
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Could not read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Could not parse {}", self.path.display()))
    }

    pub fn save(&self, store: &EventStore) -> Result<()> {
        let parent = self.parent_dir()?;
        let content = serde_json::to_string_pretty(store)?;

        let mut tmp = NamedTempFile::new_in(&parent)
            .with_context(|| format!("Could not create temp file in {}", parent.display()))?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(&self.path)
            .with_context(|| format!("Could not replace {}", self.path.display()))?;
        Ok(())
    }

    /// Load, apply `f`, and save only if `f` succeeded.
    ///
    /// Holds the store lock throughout, so concurrent changes apply one
    /// after the other instead of overwriting each other.
    pub fn modify<T>(&self, f: impl FnOnce(&mut EventStore) -> Result<T>) -> Result<T> {
        let _lock = self.lock()?;
        let mut store = self.load()?;
        let value = f(&mut store)?;
        self.save(&store)?;
        Ok(value)
    }

    /// Block until this process holds the store lock. Released on drop.
    fn lock(&self) -> Result<File> {
        self.parent_dir()?;
        let lock_path = self.path.with_extension("json.lock");
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("Could not open lock file {}", lock_path.display()))?;

        FileExt::lock_exclusive(&file)
            .with_context(|| format!("Could not lock {}", lock_path.display()))?;
        Ok(file)
    }

    /// The directory holding the store, created if missing.
    fn parent_dir(&self) -> Result<PathBuf> {
        let parent = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&parent)
            .with_context(|| format!("Could not create {}", parent.display()))?;
        Ok(parent)
    }
}
