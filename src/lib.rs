//! Core of a "location notes" application: a SQLite-backed store of
//! geolocated notes and the controller that drives it.
//!
//! The crate owns persistence and flow orchestration only. Rendering,
//! dialogs, and the platform SDKs for geolocation and image picking live
//! outside; they plug in through the traits in [`device`] and the hooks on
//! [`app::AppController`].

pub mod app;
pub mod database;
pub mod device;
pub mod utils;

pub use app::AppController;
pub use database::repo::{LocationNote, NewNote, NoteStore, StoreError};
pub use device::{ImageProvider, LocationFix, LocationProvider, Permission};

/// Default database file name.
pub const DB_FILE_NAME: &str = "location_notes.db";
