use crate::models::NoteRecord;
use crate::Result;
use chrono::Local;
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Rolling backups kept after pruning.
pub const MAX_BACKUPS: usize = 50;

const NOTES_FILE: &str = "notes.json";
const BACKUP_DIR: &str = "Backups";
const BACKUP_PREFIX: &str = "notes_";
const BACKUP_EXT: &str = ".json";

/// Durable store for the note collection.
///
/// Owns a data directory holding `notes.json`, a `Backups/` directory of
/// timestamped copies, and a transient `notes.json.tmp` during writes.
/// Saves are atomic with respect to process crash: a reader observes either
/// the previous committed document or the new one, never a partial write.
pub struct NoteStore {
    data_dir: PathBuf,
    save_lock: Mutex<()>,
}

impl NoteStore {
    /// Create a store rooted at the given data directory.
    ///
    /// Nothing is touched on disk until the first `save` or `load`.
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            save_lock: Mutex::new(()),
        }
    }

    /// Path of the primary notes document.
    pub fn notes_path(&self) -> PathBuf {
        self.data_dir.join(NOTES_FILE)
    }

    /// Path of the backups directory.
    pub fn backup_dir(&self) -> PathBuf {
        self.data_dir.join(BACKUP_DIR)
    }

    fn tmp_path(&self) -> PathBuf {
        self.data_dir.join(format!("{NOTES_FILE}.tmp"))
    }

    /// Durably replace the on-disk collection with `notes`.
    ///
    /// Saves are serialized: overlapping callers queue on an internal lock
    /// so two backup-then-replace sequences never interleave. Any failure
    /// leaves the previously committed `notes.json` intact.
    pub fn save(&self, notes: &[NoteRecord]) -> Result<()> {
        let _guard = self
            .save_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        fs::create_dir_all(&self.data_dir)?;
        fs::create_dir_all(self.backup_dir())?;

        let json = serde_json::to_string_pretty(notes)?;

        // Write the full document to the temp file before touching the
        // target, and flush it to stable storage.
        let tmp = self.tmp_path();
        {
            let mut file = File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }

        // Timestamped copy of the current document, taken before replace so
        // it captures the pre-save state. A same-second collision keeps the
        // existing backup and is not an error.
        let target = self.notes_path();
        if target.exists() {
            let stamp = Local::now().format("%Y%m%d_%H%M%S");
            let backup = self
                .backup_dir()
                .join(format!("{BACKUP_PREFIX}{stamp}{BACKUP_EXT}"));
            if backup.exists() {
                debug!("backup {} already exists, skipping", backup.display());
            } else {
                fs::copy(&target, &backup)?;
            }
        }

        // Atomic replace. When no target exists yet the rename simply moves
        // the temp file into place.
        fs::rename(&tmp, &target)?;

        self.prune_backups(MAX_BACKUPS);
        Ok(())
    }

    /// Load the note collection, falling back through backups.
    ///
    /// Never fails: a missing or corrupt primary falls back to the newest
    /// readable backup (which is then restored over the primary), and total
    /// loss yields an empty collection, which is valid startup state.
    pub fn load(&self) -> Vec<NoteRecord> {
        let primary = self.notes_path();
        match read_collection(&primary) {
            Ok(notes) => return notes,
            Err(err) => {
                if primary.exists() {
                    warn!("failed to load {}: {err}", primary.display());
                } else {
                    debug!("no notes file at {}", primary.display());
                }
            }
        }

        for backup in self.backups_newest_first() {
            match read_collection(&backup) {
                Ok(notes) => {
                    info!("recovered {} notes from {}", notes.len(), backup.display());
                    // Restore the backup as the current document so future
                    // saves resume from recovered state.
                    if let Err(err) = fs::copy(&backup, &primary) {
                        warn!("failed to restore {}: {err}", backup.display());
                    }
                    return notes;
                }
                Err(err) => warn!("failed to load backup {}: {err}", backup.display()),
            }
        }

        Vec::new()
    }

    /// Backup files sorted newest first, by the timestamp embedded in the
    /// filename. Creation times are unreliable after copies on some
    /// filesystems, so filename order is authoritative.
    fn backups_newest_first(&self) -> Vec<PathBuf> {
        let entries = match fs::read_dir(self.backup_dir()) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut backups: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| name.starts_with(BACKUP_PREFIX) && name.ends_with(BACKUP_EXT))
                    .unwrap_or(false)
            })
            .collect();

        backups.sort();
        backups.reverse();
        backups
    }

    /// Delete all but the `keep` newest backups. Never fails the save: a
    /// locked or unremovable file is skipped.
    fn prune_backups(&self, keep: usize) {
        for stale in self.backups_newest_first().into_iter().skip(keep) {
            if let Err(err) = fs::remove_file(&stale) {
                debug!("could not prune backup {}: {err}", stale.display());
            }
        }
    }
}

/// Read and deserialize one file as a complete note collection.
///
/// All-or-nothing: a document either parses into a well-formed sequence of
/// records or is rejected entirely.
fn read_collection(path: &Path) -> Result<Vec<NoteRecord>> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
