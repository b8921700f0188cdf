use std::{
    collections::{BTreeSet, HashMap},
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use log::{debug, error, info, trace, warn};
use serde::Serialize;
use tempfile::NamedTempFile;
use walkdir::WalkDir;
use zip::{write::FileOptions, ZipArchive, ZipWriter};

use crate::{
    apply_outcome, days_late, normalize_tags, read_collection_or_default, Config, Note,
    RecallError, Result, Stats, NOTES_FILE, TAGS_FILE,
};

/// Prefix of backup archive file names in the backup directory.
const BACKUP_PREFIX: &str = "recaller_backup_";

/// Manages the storage, retrieval, and scheduling state of notes.
///
/// The store is the single owner of both persisted collections: the note
/// records and the tag registry. Every mutation goes through it and is
/// written back to disk before the call returns; there is no ambient access
/// to the underlying files from anywhere else.
pub struct NoteStore {
    /// Application configuration
    config: Config,

    /// All notes, indexed by note ID
    notes: HashMap<String, Note>,

    /// Every tag ever used, kept independently of current note tags so a tag
    /// remains suggestable after its last note is deleted or edited
    tag_registry: BTreeSet<String>,
}

impl NoteStore {
    /// Opens the store, loading both collections from the data directory.
    ///
    /// A missing or corrupt collection file degrades to an empty collection
    /// rather than failing: losing suggestions or starting fresh beats
    /// refusing to start at all.
    pub fn open(config: Config) -> Result<Self> {
        info!(
            "Opening NoteStore with data_dir={}, backup_dir={}",
            config.data_dir.display(),
            config.backup_dir.display()
        );

        if !config.data_dir.exists() {
            debug!(
                "Data directory does not exist, creating: {}",
                config.data_dir.display()
            );
            fs::create_dir_all(&config.data_dir).map_err(|e| {
                error!("Failed to create data directory: {}", e);
                RecallError::DirectoryError {
                    path: config.data_dir.clone(),
                }
            })?;
        }

        let records: Vec<Note> = read_collection_or_default(&config.notes_path());
        let mut notes = HashMap::with_capacity(records.len());
        for note in records {
            if let Some(previous) = notes.insert(note.id.clone(), note) {
                warn!("Duplicate note id {} in collection, keeping latest", previous.id);
            }
        }

        let saved_tags: Vec<String> = read_collection_or_default(&config.tags_path());
        let tag_registry: BTreeSet<String> = saved_tags.into_iter().collect();

        info!(
            "Loaded {} notes and {} registry tags",
            notes.len(),
            tag_registry.len()
        );

        Ok(Self {
            config,
            notes,
            tag_registry,
        })
    }

    /// Creates a new note and persists the updated collections.
    ///
    /// Refuses a blank title or description without touching any state. The
    /// new note starts at the bottom of the interval ladder with its first
    /// review due one day from creation.
    pub fn create(&mut self, title: &str, description: &str, tags: Vec<String>) -> Result<Note> {
        validate_text(title, "title")?;
        validate_text(description, "description")?;

        let mut note = Note::new(title.to_string(), description.to_string(), tags);
        let id = self.unique_id(&note.id);
        note.id = id;

        debug!("Creating note {}", note.id);
        self.register_tags(&note.tags);
        self.notes.insert(note.id.clone(), note.clone());
        self.persist()?;

        info!("Note created with ID: {}", note.id);
        Ok(note)
    }

    /// Replaces a note's title, description, and tags in place.
    ///
    /// Scheduling fields are never touched by edits. Returns `Ok(None)`
    /// when the id is unknown; the operation is a no-op in that case.
    pub fn update(
        &mut self,
        id: &str,
        title: &str,
        description: &str,
        tags: Vec<String>,
    ) -> Result<Option<Note>> {
        validate_text(title, "title")?;
        validate_text(description, "description")?;

        let updated = match self.notes.get_mut(id) {
            Some(note) => {
                note.title = title.to_string();
                note.description = description.to_string();
                note.tags = normalize_tags(tags);
                note.clone()
            }
            None => {
                debug!("Update skipped, note not found: {}", id);
                return Ok(None);
            }
        };

        self.register_tags(&updated.tags);
        self.persist()?;

        info!("Note {} updated successfully", id);
        Ok(Some(updated))
    }

    /// Deletes a note permanently. Idempotent: deleting an unknown id
    /// returns `Ok(false)` without error.
    pub fn delete(&mut self, id: &str) -> Result<bool> {
        if self.notes.remove(id).is_none() {
            debug!("Delete skipped, note not found: {}", id);
            return Ok(false);
        }

        self.persist()?;
        info!("Note {} deleted", id);
        Ok(true)
    }

    /// Retrieves a note by its ID.
    pub fn get(&self, id: &str) -> Option<Note> {
        trace!("Retrieving note by ID: {}", id);
        self.notes.get(id).cloned()
    }

    /// Returns all notes. No particular order is guaranteed; callers sort.
    pub fn list_all(&self) -> Vec<Note> {
        self.notes.values().cloned().collect()
    }

    /// Returns all notes whose next review has arrived as of `as_of`.
    pub fn due_notes(&self, as_of: DateTime<Utc>) -> Vec<Note> {
        self.notes
            .values()
            .filter(|note| note.is_due(as_of))
            .cloned()
            .collect()
    }

    /// Records a review outcome, advancing the note's scheduling state.
    ///
    /// Returns `Ok(None)` when the id is unknown; nothing is recorded.
    pub fn record_outcome(&mut self, id: &str, success: bool) -> Result<Option<Note>> {
        let reviewed = match self.notes.get_mut(id) {
            Some(note) => {
                apply_outcome(note, success, Utc::now());
                note.clone()
            }
            None => {
                debug!("Outcome skipped, note not found: {}", id);
                return Ok(None);
            }
        };

        self.persist()?;
        debug!(
            "Recorded {} review for note {}, next review {}",
            if success { "successful" } else { "failed" },
            id,
            reviewed.next_review
        );
        Ok(Some(reviewed))
    }

    /// Computes aggregate statistics as of the given instant.
    ///
    /// A note counts as due when its review arrived within the current day
    /// (zero whole days late) and as overdue when it is strictly more than a
    /// day late; future reviews count toward neither bucket.
    pub fn stats(&self, as_of: DateTime<Utc>) -> Stats {
        let mut stats = Stats {
            total: self.notes.len(),
            due: 0,
            overdue: 0,
            reviewed: 0,
            average_success_rate: 0,
        };

        let mut total_reviews: u64 = 0;
        let mut total_successes: u64 = 0;

        for note in self.notes.values() {
            match days_late(note, as_of) {
                Some(0) => stats.due += 1,
                Some(_) => stats.overdue += 1,
                None => {}
            }

            if note.review_count > 0 {
                stats.reviewed += 1;
                total_reviews += u64::from(note.review_count);
                total_successes += u64::from(note.success_count);
            }
        }

        if total_reviews > 0 {
            stats.average_success_rate =
                ((total_successes as f64 / total_reviews as f64) * 100.0).round() as u32;
        }

        stats
    }

    /// Searches notes by case-insensitive substring match against the
    /// title, the description, or any tag.
    pub fn search(&self, query: &str) -> Vec<Note> {
        let term = query.to_lowercase();
        debug!("Searching {} notes for '{}'", self.notes.len(), term);

        self.notes
            .values()
            .filter(|note| {
                note.title.to_lowercase().contains(&term)
                    || note.description.to_lowercase().contains(&term)
                    || note.tags.iter().any(|t| t.to_lowercase().contains(&term))
            })
            .cloned()
            .collect()
    }

    /// Returns the notes carrying ALL of the given tags.
    pub fn filter_by_tags(&self, tags: &[String]) -> Vec<Note> {
        self.notes
            .values()
            .filter(|note| tags.iter().all(|tag| note.tags.contains(tag)))
            .cloned()
            .collect()
    }

    /// Sorted union of the tags currently present on any note.
    pub fn all_tags(&self) -> Vec<String> {
        let tags: BTreeSet<&String> = self.notes.values().flat_map(|n| n.tags.iter()).collect();
        tags.into_iter().cloned().collect()
    }

    /// Sorted union of the in-use tags and the persistent tag registry.
    pub fn all_available_tags(&self) -> Vec<String> {
        let mut tags: BTreeSet<String> = self.tag_registry.clone();
        for note in self.notes.values() {
            tags.extend(note.tags.iter().cloned());
        }
        tags.into_iter().collect()
    }

    /// Adds tags to the registry. The registry only ever grows.
    fn register_tags(&mut self, tags: &[String]) {
        self.tag_registry.extend(tags.iter().cloned());
    }

    /// Picks an id not already present in the collection.
    ///
    /// Ids are never reused; two same-titled notes created within the same
    /// millisecond would otherwise collide.
    fn unique_id(&self, base: &str) -> String {
        if !self.notes.contains_key(base) {
            return base.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}-{}", base, n);
            if !self.notes.contains_key(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Writes both collections to disk.
    fn persist(&self) -> Result<()> {
        // Notes are serialized oldest-first so the file stays stable across
        // saves regardless of map iteration order.
        let mut records = self.list_all();
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        self.write_json_atomic(&self.config.notes_path(), &records)?;

        let tags: Vec<&String> = self.tag_registry.iter().collect();
        self.write_json_atomic(&self.config.tags_path(), &tags)?;

        trace!(
            "Persisted {} notes and {} registry tags",
            records.len(),
            tags.len()
        );

        if self.config.auto_backup {
            debug!("Creating backup snapshot (auto_backup enabled)");
            match self.create_backup() {
                Ok(path) => trace!("Backup snapshot written to {}", path.display()),
                Err(e) => warn!("Failed to create backup snapshot: {}", e),
            }
        }

        Ok(())
    }

    /// Serializes a value to JSON and atomically replaces the target file.
    fn write_json_atomic<T: Serialize>(&self, file_path: &Path, value: &T) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = file_path.parent() {
            if !parent.exists() {
                debug!("Creating parent directory: {}", parent.display());
                fs::create_dir_all(parent).map_err(|e| {
                    error!("Failed to create directory {}: {}", parent.display(), e);
                    RecallError::Io(e)
                })?;
            }
        }

        // Write into a temporary file in the same directory, then move it
        // over the destination so readers never observe a partial file.
        let dir = file_path.parent().unwrap_or_else(|| Path::new("."));
        let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            RecallError::Io(e)
        })?;

        let json = serde_json::to_string_pretty(value).map_err(|e| {
            error!("Failed to serialize collection: {}", e);
            RecallError::Serialization(e)
        })?;

        temp_file.write_all(json.as_bytes()).map_err(|e| {
            error!("Failed to write to temporary file: {}", e);
            RecallError::Io(e)
        })?;

        temp_file.flush().map_err(|e| {
            error!("Failed to flush temporary file: {}", e);
            RecallError::Io(e)
        })?;

        temp_file.persist(file_path).map_err(|e| {
            error!("Failed to persist file {}: {}", file_path.display(), e.error);
            RecallError::Io(e.error)
        })?;

        Ok(())
    }

    /// Creates a timestamped backup archive of both collections.
    ///
    /// # Returns
    ///
    /// The path to the created backup file in case of success or an error
    pub fn create_backup(&self) -> Result<PathBuf> {
        // Ensure backup directory exists
        if !self.config.backup_dir.exists() {
            fs::create_dir_all(&self.config.backup_dir).map_err(|e| {
                RecallError::BackupFailed {
                    message: e.to_string(),
                }
            })?;
        }

        let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
        let backup_filename = format!("{}{}.zip", BACKUP_PREFIX, timestamp);
        let backup_path = self.config.backup_dir.join(backup_filename);

        let file = File::create(&backup_path).map_err(|e| RecallError::BackupFailed {
            message: e.to_string(),
        })?;
        let mut zip = ZipWriter::new(file);

        let mut records = self.list_all();
        records.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        let tags: Vec<&String> = self.tag_registry.iter().collect();

        for (name, json) in [
            (NOTES_FILE, serde_json::to_string_pretty(&records)?),
            (TAGS_FILE, serde_json::to_string_pretty(&tags)?),
        ] {
            let options = FileOptions::<zip::write::ExtendedFileOptions>::default()
                .compression_method(zip::CompressionMethod::Deflated)
                .unix_permissions(0o644);

            zip.start_file(name, options)?;
            zip.write_all(json.as_bytes())
                .map_err(|e| RecallError::BackupFailed {
                    message: format!("Failed to write {} to backup: {}", name, e),
                })?;
        }

        zip.finish()?;

        // Clean up old backups if exceeding max_backups
        self.cleanup_old_backups()?;

        info!(
            "Backup created with {} notes at {}",
            records.len(),
            backup_path.display()
        );

        Ok(backup_path)
    }

    /// Replaces both collections with the contents of a backup archive.
    ///
    /// # Arguments
    ///
    /// * `backup_path` - Path to the backup ZIP file to restore from
    ///
    /// # Returns
    ///
    /// The number of notes and registry tags restored
    pub fn restore_backup(&mut self, backup_path: &Path) -> Result<(usize, usize)> {
        if !backup_path.exists() || !backup_path.is_file() {
            return Err(RecallError::RestoreFailed {
                message: format!("Backup file not found: {}", backup_path.display()),
            });
        }

        if backup_path.extension().map_or(true, |ext| ext != "zip") {
            return Err(RecallError::RestoreFailed {
                message: format!("Not a valid ZIP file: {}", backup_path.display()),
            });
        }

        let backup_file = File::open(backup_path).map_err(|e| RecallError::RestoreFailed {
            message: format!("Failed to open backup file: {}", e),
        })?;
        let mut archive = ZipArchive::new(backup_file)?;

        let records: Vec<Note> = read_archive_entry(&mut archive, NOTES_FILE)?;
        let tags: Vec<String> = read_archive_entry(&mut archive, TAGS_FILE)?;

        self.notes = records
            .into_iter()
            .map(|note| (note.id.clone(), note))
            .collect();
        self.tag_registry = tags.into_iter().collect();
        self.persist()?;

        info!(
            "Restored {} notes and {} registry tags from {}",
            self.notes.len(),
            self.tag_registry.len(),
            backup_path.display()
        );

        Ok((self.notes.len(), self.tag_registry.len()))
    }

    /// Removes old backup archives beyond the configured retention limit.
    fn cleanup_old_backups(&self) -> Result<()> {
        // If max_backups is 0, keep all backups
        if self.config.max_backups == 0 {
            return Ok(());
        }

        let mut backups: Vec<_> = WalkDir::new(&self.config.backup_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                let path = entry.path();
                path.is_file()
                    && path.extension().is_some_and(|ext| ext == "zip")
                    && path
                        .file_name()
                        .is_some_and(|name| name.to_string_lossy().starts_with(BACKUP_PREFIX))
            })
            .collect();

        // Sort by modification time, newest first
        backups.sort_by_key(|entry| {
            fs::metadata(entry.path())
                .and_then(|meta| meta.modified())
                .unwrap_or(std::time::SystemTime::UNIX_EPOCH)
        });
        backups.reverse();

        for entry in backups.iter().skip(self.config.max_backups as usize) {
            match fs::remove_file(entry.path()) {
                Ok(_) => debug!("Removed old backup: {}", entry.path().display()),
                Err(e) => warn!(
                    "Failed to remove old backup {}: {}",
                    entry.path().display(),
                    e
                ),
            }
        }

        Ok(())
    }
}

/// Reads and deserializes a single named entry from a backup archive.
fn read_archive_entry<T: serde::de::DeserializeOwned>(
    archive: &mut ZipArchive<File>,
    name: &str,
) -> Result<T> {
    let mut entry = archive.by_name(name).map_err(|e| RecallError::RestoreFailed {
        message: format!("Failed to find {} in backup: {}", name, e),
    })?;

    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| RecallError::RestoreFailed {
            message: format!("Failed to read {} from backup: {}", name, e),
        })?;

    Ok(serde_json::from_str(&content)?)
}

fn validate_text(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RecallError::Validation { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use tempfile::{tempdir, TempDir};

    use super::*;

    fn test_config(dir: &TempDir) -> Config {
        Config {
            data_dir: dir.path().join("data"),
            backup_dir: dir.path().join("backups"),
            max_backups: 3,
            auto_backup: false,
        }
    }

    fn test_store() -> (NoteStore, TempDir) {
        let dir = tempdir().unwrap();
        let store = NoteStore::open(test_config(&dir)).unwrap();
        (store, dir)
    }

    #[test]
    fn create_rejects_blank_fields() {
        let (mut store, _dir) = test_store();

        assert!(matches!(
            store.create("   ", "answer", vec![]),
            Err(RecallError::Validation { field: "title" })
        ));
        assert!(matches!(
            store.create("question", "", vec![]),
            Err(RecallError::Validation {
                field: "description"
            })
        ));
        assert!(store.list_all().is_empty(), "no partial state on failure");
    }

    #[test]
    fn create_initializes_schedule() {
        let (mut store, _dir) = test_store();

        let note = store
            .create("What is ownership?", "Move semantics", vec![])
            .unwrap();

        assert_eq!(note.interval_index, 0);
        assert_eq!(note.review_count, 0);
        assert_eq!(note.success_count, 0);
        assert!(note.last_reviewed.is_none());
        assert_eq!(note.next_review, note.created_at + Duration::days(1));
    }

    #[test]
    fn same_title_notes_get_distinct_ids() {
        let (mut store, _dir) = test_store();

        let a = store.create("Borrowing", "One", vec![]).unwrap();
        let b = store.create("Borrowing", "Two", vec![]).unwrap();
        let c = store.create("Borrowing", "Three", vec![]).unwrap();

        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert_eq!(store.list_all().len(), 3);
    }

    #[test]
    fn update_replaces_content_but_not_schedule() {
        let (mut store, _dir) = test_store();
        let note = store
            .create("Old title", "Old answer", vec!["rust".to_string()])
            .unwrap();
        store.record_outcome(&note.id, true).unwrap();
        let before = store.get(&note.id).unwrap();

        let updated = store
            .update(&note.id, "New title", "New answer", vec!["cli".to_string()])
            .unwrap()
            .expect("note exists");

        assert_eq!(updated.title, "New title");
        assert_eq!(updated.description, "New answer");
        assert_eq!(updated.tags, vec!["cli".to_string()]);

        let reread = store.get(&note.id).unwrap();
        assert_eq!(reread.id, before.id);
        assert_eq!(reread.created_at, before.created_at);
        assert_eq!(reread.next_review, before.next_review);
        assert_eq!(reread.interval_index, before.interval_index);
        assert_eq!(reread.review_count, before.review_count);
        assert_eq!(reread.last_reviewed, before.last_reviewed);
    }

    #[test]
    fn update_unknown_id_is_a_noop() {
        let (mut store, _dir) = test_store();

        let result = store.update("missing", "T", "D", vec![]).unwrap();

        assert!(result.is_none());
        assert!(store.list_all().is_empty());
    }

    #[test]
    fn delete_is_idempotent() {
        let (mut store, _dir) = test_store();
        let note = store.create("Q", "A", vec![]).unwrap();

        assert!(store.delete(&note.id).unwrap());
        assert!(!store.delete(&note.id).unwrap());
        assert!(store.get(&note.id).is_none());
    }

    #[test]
    fn due_notes_is_the_due_subset_of_list_all() {
        let (mut store, _dir) = test_store();
        let a = store.create("A", "a", vec![]).unwrap();
        store.create("B", "b", vec![]).unwrap();
        store.record_outcome(&a.id, true).unwrap(); // pushed 3 days out

        let as_of = Utc::now() + Duration::days(1) + Duration::seconds(5);

        let due = store.due_notes(as_of);
        let expected: Vec<String> = store
            .list_all()
            .into_iter()
            .filter(|n| n.next_review <= as_of)
            .map(|n| n.id)
            .collect();

        assert_eq!(due.len(), 1, "only the unreviewed note is due");
        assert_eq!(
            due.iter().map(|n| n.id.clone()).collect::<Vec<_>>(),
            expected
        );
        // Idempotent under repeated calls with the same instant
        assert_eq!(store.due_notes(as_of).len(), due.len());
    }

    #[test]
    fn record_outcome_unknown_id_is_a_noop() {
        let (mut store, _dir) = test_store();

        assert!(store.record_outcome("missing", true).unwrap().is_none());
    }

    #[test]
    fn stats_on_empty_store_are_all_zero() {
        let (store, _dir) = test_store();

        let stats = store.stats(Utc::now());

        assert_eq!(
            stats,
            Stats {
                total: 0,
                due: 0,
                overdue: 0,
                reviewed: 0,
                average_success_rate: 0,
            }
        );
    }

    #[test]
    fn stats_buckets_due_overdue_and_future() {
        let (mut store, _dir) = test_store();
        let a = store.create("A", "a", vec![]).unwrap();
        let b = store.create("B", "b", vec![]).unwrap();
        store.create("C", "c", vec![]).unwrap();

        // A climbs to the 3-day interval, B fails back to 1 day.
        store.record_outcome(&a.id, true).unwrap();
        store.record_outcome(&b.id, false).unwrap();

        let soon = Utc::now() + Duration::days(1) + Duration::seconds(5);
        let stats = store.stats(soon);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.due, 2, "B and C arrived today");
        assert_eq!(stats.overdue, 0);
        assert_eq!(stats.reviewed, 2);
        assert_eq!(stats.average_success_rate, 50);

        let late = Utc::now() + Duration::days(10);
        let stats = store.stats(late);
        assert_eq!(stats.due, 0);
        assert_eq!(stats.overdue, 3);
    }

    #[test]
    fn search_is_case_insensitive_and_tag_inclusive() {
        let (mut store, _dir) = test_store();
        store
            .create(
                "Closures",
                "Functions capturing their environment",
                vec!["JavaScript".to_string()],
            )
            .unwrap();
        store.create("Lifetimes", "Borrow durations", vec![]).unwrap();

        assert_eq!(store.search("java").len(), 1);
        assert_eq!(store.search("JAVA").len(), 1);
        assert_eq!(store.search("capturing").len(), 1);
        assert_eq!(store.search("closures").len(), 1);
        assert!(store.search("python").is_empty());
    }

    #[test]
    fn filter_by_tags_requires_every_tag() {
        let (mut store, _dir) = test_store();
        store
            .create("A", "a", vec!["rust".to_string(), "cli".to_string()])
            .unwrap();
        store.create("B", "b", vec!["rust".to_string()]).unwrap();

        let both = store.filter_by_tags(&["rust".to_string(), "cli".to_string()]);
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].title, "A");

        assert_eq!(store.filter_by_tags(&["rust".to_string()]).len(), 2);
    }

    #[test]
    fn tag_registry_outlives_its_notes() {
        let (mut store, _dir) = test_store();
        let note = store.create("Q", "A", vec!["ephemeral".to_string()]).unwrap();

        store.delete(&note.id).unwrap();

        assert!(store.all_tags().is_empty());
        assert_eq!(store.all_available_tags(), vec!["ephemeral".to_string()]);
    }

    #[test]
    fn collections_survive_reopen() {
        let dir = tempdir().unwrap();
        let id = {
            let mut store = NoteStore::open(test_config(&dir)).unwrap();
            let note = store
                .create("Persistent", "Yes", vec!["keep".to_string()])
                .unwrap();
            note.id
        };

        let store = NoteStore::open(test_config(&dir)).unwrap();
        let note = store.get(&id).expect("note loaded from disk");
        assert_eq!(note.title, "Persistent");
        assert_eq!(store.all_available_tags(), vec!["keep".to_string()]);
    }

    #[test]
    fn corrupt_notes_file_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let config = test_config(&dir);
        fs::create_dir_all(&config.data_dir).unwrap();
        fs::write(config.notes_path(), "{definitely not json").unwrap();

        let mut store = NoteStore::open(config).unwrap();

        assert!(store.list_all().is_empty());
        // The store stays usable after the corruption
        assert!(store.create("Q", "A", vec![]).is_ok());
    }

    #[test]
    fn backup_restore_roundtrip_reproduces_both_collections() {
        let (mut store, _dir) = test_store();
        store
            .create("A", "a", vec!["one".to_string()])
            .unwrap();
        store.create("B", "b", vec!["two".to_string()]).unwrap();

        let backup_path = store.create_backup().unwrap();
        assert!(backup_path.exists());

        let other_dir = tempdir().unwrap();
        let mut fresh = NoteStore::open(test_config(&other_dir)).unwrap();
        let (notes, tags) = fresh.restore_backup(&backup_path).unwrap();

        assert_eq!(notes, 2);
        assert_eq!(tags, 2);
        assert_eq!(fresh.search("a").len(), store.search("a").len());
        assert_eq!(fresh.all_available_tags(), store.all_available_tags());
    }

    #[test]
    fn old_backups_are_pruned_to_the_retention_limit() {
        let (store, dir) = test_store();
        let backup_dir = dir.path().join("backups");
        fs::create_dir_all(&backup_dir).unwrap();
        for i in 0..5 {
            fs::write(
                backup_dir.join(format!("{}fake{}.zip", BACKUP_PREFIX, i)),
                b"old",
            )
            .unwrap();
        }

        store.create_backup().unwrap();

        let remaining = fs::read_dir(&backup_dir).unwrap().count();
        assert_eq!(remaining, 3, "retention limit applies");
    }
}
