use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::database::schema::SCHEMA;

/// A persisted note. Identity, location, and capture time are fixed at
/// creation; only `images` changes afterwards, and only by appending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationNote {
    pub id: i64,
    pub location_name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub time: String,
    pub date: String,
    pub images: Vec<String>,
}

/// Insert payload: everything the store does not assign itself.
/// The id comes from the database and `images` always starts empty.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub location_name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    pub time: String,
    pub date: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Note database is not available")]
    Unavailable,
    #[error("No note with id {0}")]
    NotFound(i64),
    #[error("Latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("Longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("Failed to encode image list: {0}")]
    ImageEncoding(#[from] serde_json::Error),
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

/// Exclusive owner of the persisted note table.
///
/// The connection is held as an `Option` so a store that failed to open is an
/// ordinary value in a visible "unavailable" state: reads return empty,
/// mutations return [`StoreError::Unavailable`], nothing panics.
pub struct NoteStore {
    conn: Option<Connection>,
}

impl NoteStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        match Connection::open(path.as_ref()) {
            Ok(conn) => Self::from_connection(conn),
            Err(e) => {
                error!("Failed to open note database at {:?}: {}", path.as_ref(), e);
                Self { conn: None }
            }
        }
    }

    pub fn open_in_memory() -> Self {
        match Connection::open_in_memory() {
            Ok(conn) => Self::from_connection(conn),
            Err(e) => {
                error!("Failed to open in-memory note database: {}", e);
                Self { conn: None }
            }
        }
    }

    fn from_connection(conn: Connection) -> Self {
        // CREATE TABLE IF NOT EXISTS, so reopening an existing file is a no-op.
        if let Err(e) = conn.execute_batch(SCHEMA) {
            error!("Failed to initialize note schema: {}", e);
            return Self { conn: None };
        }
        info!("Database initialized successfully");
        Self { conn: Some(conn) }
    }

    pub fn is_available(&self) -> bool {
        self.conn.is_some()
    }

    fn conn(&self) -> Result<&Connection, StoreError> {
        self.conn.as_ref().ok_or(StoreError::Unavailable)
    }

    /// Every note, in insertion (id-ascending) order. Display ordering is the
    /// presentation layer's business.
    ///
    /// Never fails: an unavailable store or a failed query yields an empty
    /// collection, and a malformed `images` blob empties only that one row.
    pub fn fetch_all(&self) -> Vec<LocationNote> {
        let conn = match self.conn() {
            Ok(conn) => conn,
            Err(_) => {
                warn!("Fetch requested but the note database is not available");
                return Vec::new();
            }
        };

        let result: Result<Vec<LocationNote>, rusqlite::Error> = (|| {
            let mut stmt = conn.prepare(
                "SELECT id, location_name, description, latitude, longitude, time, date, images
                 FROM location_notes ORDER BY id ASC",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(LocationNote {
                    id: row.get(0)?,
                    location_name: row.get(1)?,
                    description: row.get(2)?,
                    latitude: row.get(3)?,
                    longitude: row.get(4)?,
                    time: row.get(5)?,
                    date: row.get(6)?,
                    images: decode_images(row.get::<_, Option<String>>(7)?),
                })
            })?;
            rows.collect()
        })();

        match result {
            Ok(notes) => notes,
            Err(e) => {
                error!("Error fetching notes: {}", e);
                Vec::new()
            }
        }
    }

    /// Inserts a note and returns its freshly assigned id. The `images`
    /// column starts out NULL, which reads back as an empty list.
    ///
    /// Callers validate that the text fields are non-empty before calling;
    /// coordinate ranges are checked here because the store owns the table.
    pub fn insert(&self, note: &NewNote) -> Result<i64, StoreError> {
        let conn = self.conn()?;

        if !(-90.0..=90.0).contains(&note.latitude) {
            return Err(StoreError::LatitudeOutOfRange(note.latitude));
        }
        if !(-180.0..=180.0).contains(&note.longitude) {
            return Err(StoreError::LongitudeOutOfRange(note.longitude));
        }

        conn.execute(
            "INSERT INTO location_notes (location_name, description, latitude, longitude, time, date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                note.location_name,
                note.description,
                note.latitude,
                note.longitude,
                note.time,
                note.date
            ],
        )?;

        let id = conn.last_insert_rowid();
        info!("Location note {} added successfully", id);
        Ok(id)
    }

    /// Appends URIs to a note's image list, preserving existing entries and
    /// their order. Read-modify-write on the serialized blob; the controller
    /// serializes calls, so no two of these overlap.
    pub fn append_images(&self, id: i64, new_images: &[String]) -> Result<(), StoreError> {
        let conn = self.conn()?;

        let blob: Option<Option<String>> = conn
            .query_row(
                "SELECT images FROM location_notes WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        let Some(blob) = blob else {
            return Err(StoreError::NotFound(id));
        };

        let mut images = decode_images(blob);
        images.extend(new_images.iter().cloned());
        let encoded = encode_images(&images)?;

        conn.execute(
            "UPDATE location_notes SET images = ?1 WHERE id = ?2",
            params![encoded, id],
        )?;
        info!("Images added successfully to note {}", id);
        Ok(())
    }

    /// Removes the note with `id`. A missing id is a successful no-op.
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let conn = self.conn()?;
        let removed = conn.execute("DELETE FROM location_notes WHERE id = ?1", params![id])?;
        if removed > 0 {
            info!("Location note {} deleted successfully", id);
        }
        Ok(())
    }
}

fn encode_images(images: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string(images)
}

/// NULL and the empty string both mean "no images yet". A blob that fails to
/// parse is treated the same way so one bad row cannot poison a whole fetch.
fn decode_images(blob: Option<String>) -> Vec<String> {
    let Some(blob) = blob else {
        return Vec::new();
    };
    if blob.is_empty() {
        return Vec::new();
    }
    match serde_json::from_str(&blob) {
        Ok(images) => images,
        Err(e) => {
            warn!("Malformed image list in database, treating as empty: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_note() -> NewNote {
        NewNote {
            location_name: "Trailhead".to_string(),
            description: "Nice view".to_string(),
            latitude: 45.0,
            longitude: -122.0,
            time: "14:03:21".to_string(),
            date: "2026-08-05".to_string(),
        }
    }

    #[test]
    fn insert_then_fetch_returns_matching_note() {
        let store = NoteStore::open_in_memory();
        let id = store.insert(&sample_note()).unwrap();

        let notes = store.fetch_all();
        assert_eq!(notes.len(), 1);
        let note = &notes[0];
        assert_eq!(note.id, id);
        assert_eq!(note.location_name, "Trailhead");
        assert_eq!(note.description, "Nice view");
        assert_eq!(note.latitude, 45.0);
        assert_eq!(note.longitude, -122.0);
        assert_eq!(note.time, "14:03:21");
        assert_eq!(note.date, "2026-08-05");
        assert!(note.images.is_empty());
    }

    #[test]
    fn fetch_all_is_idempotent() {
        let store = NoteStore::open_in_memory();
        store.insert(&sample_note()).unwrap();
        store.insert(&sample_note()).unwrap();

        assert_eq!(store.fetch_all(), store.fetch_all());
    }

    #[test]
    fn fetch_all_returns_insertion_order() {
        let store = NoteStore::open_in_memory();
        for name in ["first", "second", "third"] {
            let mut note = sample_note();
            note.location_name = name.to_string();
            store.insert(&note).unwrap();
        }

        let notes = store.fetch_all();
        let names: Vec<&str> = notes.iter().map(|n| n.location_name.as_str()).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }

    #[test]
    fn ids_are_never_reused_after_delete() {
        let store = NoteStore::open_in_memory();
        let first = store.insert(&sample_note()).unwrap();
        let second = store.insert(&sample_note()).unwrap();
        assert!(second > first);

        store.delete(second).unwrap();
        let third = store.insert(&sample_note()).unwrap();
        assert!(third > second);
    }

    #[test]
    fn delete_removes_only_the_target() {
        let store = NoteStore::open_in_memory();
        let keep = store.insert(&sample_note()).unwrap();
        let gone = store.insert(&sample_note()).unwrap();

        store.delete(gone).unwrap();

        let notes = store.fetch_all();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, keep);
        assert!(!notes.iter().any(|n| n.id == gone));
    }

    #[test]
    fn delete_missing_id_is_a_noop() {
        let store = NoteStore::open_in_memory();
        store.insert(&sample_note()).unwrap();
        let before = store.fetch_all();

        store.delete(9999).unwrap();

        assert_eq!(store.fetch_all(), before);
    }

    #[test]
    fn append_images_preserves_order_across_calls() {
        let store = NoteStore::open_in_memory();
        let id = store.insert(&sample_note()).unwrap();

        store
            .append_images(id, &["file:///a.jpg".to_string(), "file:///b.jpg".to_string()])
            .unwrap();
        store.append_images(id, &["file:///c.jpg".to_string()]).unwrap();

        let notes = store.fetch_all();
        assert_eq!(
            notes[0].images,
            ["file:///a.jpg", "file:///b.jpg", "file:///c.jpg"]
        );
    }

    #[test]
    fn append_images_to_unknown_id_fails() {
        let store = NoteStore::open_in_memory();
        let result = store.append_images(42, &["file:///a.jpg".to_string()]);
        assert!(matches!(result, Err(StoreError::NotFound(42))));
    }

    #[test]
    fn images_codec_round_trips() {
        let cases: Vec<Vec<String>> = vec![
            vec![],
            vec!["file:///photo.jpg".to_string()],
            vec![
                "file:///DCIM/IMG%20001.jpg".to_string(),
                "content://media/external/images/media/42?x=\"y\"".to_string(),
                "file:///tmp/caf\u{e9} photo.png".to_string(),
            ],
        ];
        for images in cases {
            let encoded = encode_images(&images).unwrap();
            assert_eq!(decode_images(Some(encoded)), images);
        }
    }

    #[test]
    fn absent_blob_decodes_to_empty() {
        assert!(decode_images(None).is_empty());
        assert!(decode_images(Some(String::new())).is_empty());
    }

    #[test]
    fn malformed_blob_empties_only_that_row() {
        let store = NoteStore::open_in_memory();
        let bad = store.insert(&sample_note()).unwrap();
        let good = store.insert(&sample_note()).unwrap();
        store.append_images(good, &["file:///ok.jpg".to_string()]).unwrap();

        store
            .conn
            .as_ref()
            .unwrap()
            .execute(
                "UPDATE location_notes SET images = ?1 WHERE id = ?2",
                params!["{not json", bad],
            )
            .unwrap();

        let notes = store.fetch_all();
        assert_eq!(notes.len(), 2);
        assert!(notes.iter().find(|n| n.id == bad).unwrap().images.is_empty());
        assert_eq!(
            notes.iter().find(|n| n.id == good).unwrap().images,
            ["file:///ok.jpg"]
        );
    }

    #[test]
    fn unavailable_store_reads_empty_and_fails_mutations() {
        let store = NoteStore::open("/definitely/not/a/real/dir/notes.db");
        assert!(!store.is_available());

        assert!(store.fetch_all().is_empty());
        assert!(matches!(
            store.insert(&sample_note()),
            Err(StoreError::Unavailable)
        ));
        assert!(matches!(
            store.append_images(1, &[]),
            Err(StoreError::Unavailable)
        ));
        assert!(matches!(store.delete(1), Err(StoreError::Unavailable)));
    }

    #[test]
    fn insert_rejects_out_of_range_coordinates() {
        let store = NoteStore::open_in_memory();

        let mut note = sample_note();
        note.latitude = 90.5;
        assert!(matches!(
            store.insert(&note),
            Err(StoreError::LatitudeOutOfRange(_))
        ));

        let mut note = sample_note();
        note.longitude = -180.5;
        assert!(matches!(
            store.insert(&note),
            Err(StoreError::LongitudeOutOfRange(_))
        ));

        assert!(store.fetch_all().is_empty());
    }

    #[test]
    fn notes_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.db");

        let id = {
            let store = NoteStore::open(&path);
            let id = store.insert(&sample_note()).unwrap();
            store.append_images(id, &["file:///a.jpg".to_string()]).unwrap();
            id
        };

        let reopened = NoteStore::open(&path);
        let notes = reopened.fetch_all();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, id);
        assert_eq!(notes[0].images, ["file:///a.jpg"]);
    }
}
