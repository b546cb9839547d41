//! Durable per-user history of audited days
//!
//! The whole store is one JSON document mapping user ids to their records.
//! Mutations are staged on a copy of the state, written to a temp file in
//! the store's directory, renamed over the store file, and only then swapped
//! into memory. A crash mid-write leaves the previous file in place.
//!
//! Every mutation holds an exclusive advisory lock on `<path>.lock` and
//! re-reads the file under it, so separate processes sharing one store file
//! serialize their read-modify-write cycles.

use chrono::{DateTime, Datelike, Duration, Utc};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::analysis::round_to;
use crate::models::{
  EntryMetadata, HistoryData, HistoryEntry, NewHistoryEntry, UserRecord, UserStats,
};

/// Characters of recommendation text kept in an entry's preview
pub const PREVIEW_CHARS: usize = 200;

/// ---------------------------------------------------------------------------
/// Error Handling
/// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
  #[error("User {0} not found")]
  UserNotFound(String),

  #[error("Entry {entry_id} not found for user {user_id}")]
  EntryNotFound { user_id: String, entry_id: i64 },

  #[error("Failed to persist history to {}: {source}", .path.display())]
  Persistence {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

impl HistoryError {
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::UserNotFound(_) | Self::EntryNotFound { .. })
  }
}

/// ---------------------------------------------------------------------------
/// History Store
/// ---------------------------------------------------------------------------

/// Shared store handle. Writers hold the in-process write lock and the file
/// lock for the whole read-modify-persist cycle. Readers see the state
/// committed by this handle.
#[derive(Debug)]
pub struct HistoryStore {
  path: PathBuf,
  state: RwLock<HistoryData>,
}

impl HistoryStore {
  /// Open the store at `path`, creating its directory if needed.
  ///
  /// A missing file is an empty store. A corrupt file is moved aside to
  /// `<path>.corrupt-<timestamp>` and the store starts empty.
  pub fn open(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
    let path = path.into();

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
      fs::create_dir_all(dir).map_err(|source| HistoryError::Persistence {
        path: path.clone(),
        source,
      })?;
    }

    let data = load(&path);
    debug!(path = %path.display(), users = data.users.len(), "History store opened");

    Ok(Self {
      path,
      state: RwLock::new(data),
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn read(&self) -> RwLockReadGuard<'_, HistoryData> {
    // The guarded value is only ever replaced wholesale
    self.state.read().unwrap_or_else(PoisonError::into_inner)
  }

  /// Apply `change` to the latest on-disk state, persist it, then commit it
  fn mutate<T>(
    &self,
    change: impl FnOnce(&mut HistoryData) -> Result<T, HistoryError>,
  ) -> Result<T, HistoryError> {
    let mut guard = self.state.write().unwrap_or_else(PoisonError::into_inner);
    let _file_lock = self.lock_file().map_err(|e| self.persistence_error(e))?;

    let mut next = read_data(&self.path).map_err(|e| self.persistence_error(e))?;
    let output = change(&mut next)?;
    self.persist(&next)?;
    *guard = next;
    Ok(output)
  }

  /// Exclusive lock on the sidecar file, released when the handle drops
  fn lock_file(&self) -> io::Result<File> {
    let file = OpenOptions::new()
      .read(true)
      .write(true)
      .create(true)
      .truncate(false)
      .open(lock_path(&self.path))?;
    file.lock_exclusive()?;
    Ok(file)
  }

  fn persistence_error(&self, source: io::Error) -> HistoryError {
    HistoryError::Persistence {
      path: self.path.clone(),
      source,
    }
  }

  fn persist(&self, data: &HistoryData) -> Result<(), HistoryError> {
    write_atomic(&self.path, |writer| {
      serde_json::to_writer_pretty(writer, data).map_err(io::Error::from)
    })
    .map_err(|e| self.persistence_error(e))
  }

  /// Append an audited day to a user's history
  pub fn append(&self, new: NewHistoryEntry) -> Result<HistoryEntry, HistoryError> {
    self.append_at(new, Utc::now())
  }

  pub(crate) fn append_at(
    &self,
    new: NewHistoryEntry,
    now: DateTime<Utc>,
  ) -> Result<HistoryEntry, HistoryError> {
    let user_id = new.user_id.clone();

    let entry = self.mutate(|data| {
      let record = data
        .users
        .entry(new.user_id)
        .or_insert_with(|| UserRecord::new(now));

      let entry = HistoryEntry {
        id: record.entries.len() as i64 + 1,
        timestamp: now,
        biometrics: new.biometrics,
        compliance: new.compliance,
        workout_plan: new.workout_plan,
        recommendation_preview: preview(&new.recommendation),
        completed: new.completed,
        completed_at: None,
        metadata: EntryMetadata {
          day_of_week: now.format("%A").to_string(),
          week_number: now.iso_week().week(),
        },
      };

      record.entries.push(entry.clone());
      record.total_workouts += 1;
      if entry.completed {
        record.completed_workouts += 1;
      }

      Ok(entry)
    })?;

    debug!(
      user_id = %user_id,
      entry_id = entry.id,
      status = %entry.compliance.status,
      "History entry appended"
    );
    Ok(entry)
  }

  /// Entries for a user in chronological order.
  ///
  /// `days` keeps entries newer than the trailing window, then `limit` keeps
  /// the most recent ones. Zero for either means no filter. Unknown users
  /// yield an empty list.
  pub fn list(&self, user_id: &str, limit: Option<usize>, days: Option<u32>) -> Vec<HistoryEntry> {
    self.list_at(user_id, limit, days, Utc::now())
  }

  pub(crate) fn list_at(
    &self,
    user_id: &str,
    limit: Option<usize>,
    days: Option<u32>,
    now: DateTime<Utc>,
  ) -> Vec<HistoryEntry> {
    let data = self.read();
    let Some(record) = data.users.get(user_id) else {
      return Vec::new();
    };

    let cutoff = days
      .filter(|d| *d > 0)
      .map(|d| now - Duration::days(i64::from(d)));

    let mut entries: Vec<HistoryEntry> = record
      .entries
      .iter()
      .filter(|e| cutoff.map_or(true, |c| e.timestamp > c))
      .cloned()
      .collect();

    if let Some(limit) = limit.filter(|l| *l > 0) {
      let excess = entries.len().saturating_sub(limit);
      entries.drain(..excess);
    }

    entries
  }

  /// Mark an entry completed or not. Counters only move on a real transition.
  pub fn set_completion(
    &self,
    user_id: &str,
    entry_id: i64,
    completed: bool,
  ) -> Result<HistoryEntry, HistoryError> {
    let now = Utc::now();

    let entry = self.mutate(|data| {
      let record = data
        .users
        .get_mut(user_id)
        .ok_or_else(|| HistoryError::UserNotFound(user_id.to_string()))?;

      let entry = record
        .entries
        .iter_mut()
        .find(|e| e.id == entry_id)
        .ok_or_else(|| HistoryError::EntryNotFound {
          user_id: user_id.to_string(),
          entry_id,
        })?;

      let was_completed = entry.completed;
      entry.completed = completed;
      entry.completed_at = Some(now);
      let updated = entry.clone();

      match (was_completed, completed) {
        (false, true) => record.completed_workouts += 1,
        (true, false) => record.completed_workouts = record.completed_workouts.saturating_sub(1),
        _ => {}
      }

      Ok(updated)
    })?;

    debug!(user_id = %user_id, entry_id, completed, "Workout completion updated");
    Ok(entry)
  }

  /// Completion statistics; unknown users get the zero-state payload
  pub fn stats(&self, user_id: &str) -> UserStats {
    let data = self.read();
    let Some(record) = data.users.get(user_id) else {
      return UserStats::empty(user_id);
    };

    let completion_rate = if record.total_workouts > 0 {
      round_to(
        f64::from(record.completed_workouts) / f64::from(record.total_workouts) * 100.0,
        1,
      )
    } else {
      0.0
    };

    UserStats {
      user_id: user_id.to_string(),
      total_workouts: record.total_workouts,
      completed_workouts: record.completed_workouts,
      completion_rate,
      member_since: Some(record.created_at),
      total_entries: record.entries.len(),
      message: None,
    }
  }

  /// Copy of one user's record, if any
  pub fn user_record(&self, user_id: &str) -> Option<UserRecord> {
    self.read().users.get(user_id).cloned()
  }
}

/// ---------------------------------------------------------------------------
/// Persistence Helpers
/// ---------------------------------------------------------------------------

/// First `PREVIEW_CHARS` characters of the text with an ellipsis suffix
pub fn preview(text: &str) -> String {
  let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
  preview.push_str("...");
  preview
}

fn load(path: &Path) -> HistoryData {
  let bytes = match fs::read(path) {
    Ok(bytes) => bytes,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return HistoryData::default(),
    Err(e) => {
      warn!(path = %path.display(), error = %e, "History file unreadable, starting empty");
      return HistoryData::default();
    }
  };

  match serde_json::from_slice(&bytes) {
    Ok(data) => data,
    Err(e) => {
      let quarantine = quarantine_path(path, Utc::now());
      if let Err(rename_err) = fs::rename(path, &quarantine) {
        warn!(path = %path.display(), error = %rename_err, "Could not move corrupt history file aside");
      }
      warn!(
        path = %path.display(),
        moved_to = %quarantine.display(),
        error = %e,
        "History file corrupt, starting empty"
      );
      HistoryData::default()
    }
  }
}

/// Current store contents for a read-modify-write cycle. Unlike `load`, an
/// unreadable or corrupt file is an error here rather than an empty store.
fn read_data(path: &Path) -> io::Result<HistoryData> {
  match fs::read(path) {
    Ok(bytes) => serde_json::from_slice(&bytes).map_err(io::Error::from),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HistoryData::default()),
    Err(e) => Err(e),
  }
}

fn lock_path(path: &Path) -> PathBuf {
  let mut name = path.as_os_str().to_owned();
  name.push(".lock");
  PathBuf::from(name)
}

/// `<path>.corrupt-<timestamp>`, unique per quarantine
fn quarantine_path(path: &Path, at: DateTime<Utc>) -> PathBuf {
  let mut name = path.as_os_str().to_owned();
  name.push(format!(".corrupt-{}", at.format("%Y%m%dT%H%M%S%.6fZ")));
  PathBuf::from(name)
}

/// Write a file via temp-file-and-rename so readers see old or new content,
/// never a partial write. A failing `write` leaves `path` untouched.
pub(crate) fn write_atomic<F>(path: &Path, write: F) -> io::Result<()>
where
  F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
  let dir = match path.parent() {
    Some(d) if !d.as_os_str().is_empty() => d,
    _ => Path::new("."),
  };

  let mut tmp = NamedTempFile::new_in(dir)?;
  {
    let mut writer = BufWriter::new(tmp.as_file_mut());
    write(&mut writer)?;
    writer.flush()?;
  }
  tmp.as_file().sync_all()?;
  tmp.persist(path).map_err(|e| e.error)?;

  // Make the rename itself durable where the platform allows it
  if let Err(e) = File::open(dir).and_then(|handle| handle.sync_all()) {
    warn!(dir = %dir.display(), error = %e, "Could not fsync history directory");
  }

  Ok(())
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
