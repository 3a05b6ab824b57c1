//! # Snapshot Store
//!
//! Reads and writes the JSON snapshot document (`{teams, students, projects}`).
//!
//! Writes go to a temporary file in the destination directory which is then
//! renamed over the target, so a crash mid-write leaves the previous
//! snapshot intact.

use gradtrack_core::{GradTrackError, Snapshot, Timestamp};
use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;

// =============================================================================
// LOAD
// =============================================================================

/// Load a snapshot, or an empty one if the file does not exist yet.
///
/// Fails if the file exceeds `max_size`, is not a snapshot document, or
/// exceeds the record limits.
pub fn load_snapshot(path: &Path, max_size: u64) -> Result<Snapshot, GradTrackError> {
    if !path.exists() {
        tracing::debug!("Snapshot {:?} not found, starting empty", path);
        return Ok(Snapshot::default());
    }

    let metadata = std::fs::metadata(path)
        .map_err(|e| GradTrackError::IoError(format!("Cannot read file metadata: {}", e)))?;
    if !metadata.is_file() {
        return Err(GradTrackError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }
    if metadata.len() > max_size {
        return Err(GradTrackError::SnapshotTooLarge {
            size: usize::try_from(metadata.len()).unwrap_or(usize::MAX),
            max: usize::try_from(max_size).unwrap_or(usize::MAX),
        });
    }

    let data = std::fs::read(path)
        .map_err(|e| GradTrackError::IoError(format!("Read snapshot: {}", e)))?;
    let snapshot: Snapshot = serde_json::from_slice(&data).map_err(|e| {
        GradTrackError::DeserializationError(format!("{}: {}", path.display(), e))
    })?;
    snapshot.validate_limits()?;

    tracing::debug!(
        teams = snapshot.teams.len(),
        students = snapshot.students.len(),
        projects = snapshot.projects.len(),
        "Loaded snapshot {:?}",
        path
    );
    Ok(snapshot)
}

// =============================================================================
// SAVE
// =============================================================================

/// Atomically replace the snapshot at `path`.
pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<(), GradTrackError> {
    let data = serde_json::to_vec_pretty(snapshot)
        .map_err(|e| GradTrackError::SerializationError(e.to_string()))?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| GradTrackError::IoError(format!("Create temp file: {}", e)))?;
    tmp.write_all(&data)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| GradTrackError::IoError(format!("Write snapshot: {}", e)))?;
    tmp.persist(path)
        .map_err(|e| GradTrackError::IoError(format!("Replace snapshot: {}", e.error)))?;

    tracing::debug!("Saved {} bytes to {:?}", data.len(), path);
    Ok(())
}

// =============================================================================
// CLOCK
// =============================================================================

/// Current wall-clock time, for `assignedDate`.
pub fn now() -> Timestamp {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0);
    Timestamp(millis)
}

// =============================================================================
// TESTS
// =============================================================================
