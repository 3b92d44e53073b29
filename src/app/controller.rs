//! In-memory application state and the three dialog flows.
//!
//! The controller owns the store and the device collaborators, holds nothing
//! durable itself, and re-reads the full note collection after every mutation
//! rather than patching its mirror in place.

use tracing::{error, warn};

use crate::database::repo::{LocationNote, NewNote, NoteStore};
use crate::device::{ImageProvider, LocationProvider, Permission};
use crate::utils::time::format_fix_timestamp;

const MSG_LOCATION_DENIED: &str = "Permission to access location was denied";
const MSG_LOCATION_FAILED: &str = "An error occurred while fetching the location.";
const MSG_FILL_ALL_FIELDS: &str = "Please fill in all fields";
const MSG_CAMERA_DENIED: &str = "Permission to access the camera is required!";

/// Mediates between the presentation layer, the device collaborators, and
/// the note store.
///
/// Each dialog runs the same Closed → Open → Closed machine: "show" seeds the
/// selection or draft, and either Cancel or a successful primary action
/// closes the dialog and discards the draft. There is no loading state; a
/// slow collaborator simply delays the transition.
pub struct AppController {
    store: NoteStore,
    location: Box<dyn LocationProvider>,
    images: Box<dyn ImageProvider>,

    notes: Vec<LocationNote>,

    add_dialog_visible: bool,
    delete_dialog_visible: bool,
    add_photo_dialog_visible: bool,

    location_name: String,
    description: String,
    staged_images: Vec<String>,

    note_to_delete: Option<i64>,
    note_to_add_photo: Option<i64>,

    /// Location or camera trouble, shown globally.
    device_error: Option<String>,
    /// Validation trouble, shown inside the add dialog.
    form_error: Option<String>,

    /// Serializes the flows. UI layers usually prevent re-triggering a
    /// dialog action mid-flow; this guard does not depend on that.
    in_flight: bool,
}

impl AppController {
    /// Takes ownership of an already-opened store and performs the initial
    /// fetch so the mirror starts in sync.
    pub fn new(
        store: NoteStore,
        location: Box<dyn LocationProvider>,
        images: Box<dyn ImageProvider>,
    ) -> Self {
        let notes = store.fetch_all();
        Self {
            store,
            location,
            images,
            notes,
            add_dialog_visible: false,
            delete_dialog_visible: false,
            add_photo_dialog_visible: false,
            location_name: String::new(),
            description: String::new(),
            staged_images: Vec::new(),
            note_to_delete: None,
            note_to_add_photo: None,
            device_error: None,
            form_error: None,
            in_flight: false,
        }
    }

    // Read side, consumed by the presentation layer. Notes come back in
    // storage order; display sorting is the renderer's decision.

    pub fn notes(&self) -> &[LocationNote] {
        &self.notes
    }

    pub fn add_dialog_visible(&self) -> bool {
        self.add_dialog_visible
    }

    pub fn delete_dialog_visible(&self) -> bool {
        self.delete_dialog_visible
    }

    pub fn add_photo_dialog_visible(&self) -> bool {
        self.add_photo_dialog_visible
    }

    pub fn location_name(&self) -> &str {
        &self.location_name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn staged_images(&self) -> &[String] {
        &self.staged_images
    }

    pub fn note_pending_delete(&self) -> Option<&LocationNote> {
        self.find_note(self.note_to_delete)
    }

    pub fn note_pending_photo(&self) -> Option<&LocationNote> {
        self.find_note(self.note_to_add_photo)
    }

    pub fn device_error(&self) -> Option<&str> {
        self.device_error.as_deref()
    }

    pub fn form_error(&self) -> Option<&str> {
        self.form_error.as_deref()
    }

    // Add-note dialog.

    pub fn show_add_dialog(&mut self) {
        self.add_dialog_visible = true;
        self.form_error = None;
    }

    pub fn set_location_name(&mut self, value: impl Into<String>) {
        self.location_name = value.into();
    }

    pub fn set_description(&mut self, value: impl Into<String>) {
        self.description = value.into();
    }

    pub fn cancel_add_note(&mut self) {
        self.add_dialog_visible = false;
        self.location_name.clear();
        self.description.clear();
        self.form_error = None;
    }

    pub fn submit_add_note(&mut self) {
        if !self.begin_operation("add note") {
            return;
        }
        self.run_add_note();
        self.in_flight = false;
    }

    fn run_add_note(&mut self) {
        if self.location.request_permission() == Permission::Denied {
            self.device_error = Some(MSG_LOCATION_DENIED.to_string());
            return;
        }

        let fix = match self.location.current_fix() {
            Ok(fix) => fix,
            Err(e) => {
                error!("Error getting location: {}", e);
                self.device_error = Some(MSG_LOCATION_FAILED.to_string());
                return;
            }
        };

        if self.location_name.is_empty() || self.description.is_empty() {
            // The fix obtained above is dropped; a retry acquires a fresh one.
            self.form_error = Some(MSG_FILL_ALL_FIELDS.to_string());
            return;
        }

        let (time, date) = format_fix_timestamp(fix.timestamp_millis);
        let note = NewNote {
            location_name: self.location_name.clone(),
            description: self.description.clone(),
            latitude: fix.latitude,
            longitude: fix.longitude,
            time,
            date,
        };

        match self.store.insert(&note) {
            Ok(_) => {
                self.refresh();
                self.add_dialog_visible = false;
                self.location_name.clear();
                self.description.clear();
                self.form_error = None;
                self.device_error = None;
            }
            Err(e) => error!("Error adding location note: {}", e),
        }
    }

    // Delete-note dialog.

    pub fn show_delete_dialog(&mut self, id: i64) {
        self.delete_dialog_visible = true;
        self.note_to_delete = Some(id);
    }

    pub fn cancel_delete_note(&mut self) {
        self.delete_dialog_visible = false;
        self.note_to_delete = None;
    }

    pub fn confirm_delete_note(&mut self) {
        if !self.begin_operation("delete note") {
            return;
        }
        self.run_delete_note();
        self.in_flight = false;
    }

    fn run_delete_note(&mut self) {
        let Some(id) = self.note_to_delete else {
            return;
        };
        match self.store.delete(id) {
            Ok(()) => {
                self.refresh();
                self.delete_dialog_visible = false;
                self.note_to_delete = None;
            }
            Err(e) => error!("Error deleting location note: {}", e),
        }
    }

    // Add-photo dialog.

    pub fn show_add_photo_dialog(&mut self, id: i64) {
        self.add_photo_dialog_visible = true;
        self.note_to_add_photo = Some(id);
        self.staged_images.clear();
    }

    pub fn cancel_add_photo(&mut self) {
        self.add_photo_dialog_visible = false;
        self.note_to_add_photo = None;
        self.staged_images.clear();
    }

    /// Stages one image from the photo library. Canceling stages nothing.
    pub fn pick_image(&mut self) {
        if !self.begin_operation("library pick") {
            return;
        }
        match self.images.pick_from_library() {
            Ok(Some(uri)) => self.staged_images.push(uri),
            Ok(None) => {}
            Err(e) => error!("Error picking image: {}", e),
        }
        self.in_flight = false;
    }

    /// Stages one freshly captured photo. Camera permission is requested on
    /// every call; denial blocks the capture.
    pub fn take_photo(&mut self) {
        if !self.begin_operation("camera capture") {
            return;
        }
        self.run_take_photo();
        self.in_flight = false;
    }

    fn run_take_photo(&mut self) {
        if self.images.request_camera_permission() == Permission::Denied {
            self.device_error = Some(MSG_CAMERA_DENIED.to_string());
            return;
        }
        match self.images.capture_photo() {
            Ok(Some(uri)) => self.staged_images.push(uri),
            Ok(None) => {}
            Err(e) => error!("Error taking photo: {}", e),
        }
    }

    pub fn confirm_add_photo(&mut self) {
        if !self.begin_operation("add photos") {
            return;
        }
        self.run_add_photos();
        self.in_flight = false;
    }

    fn run_add_photos(&mut self) {
        let Some(id) = self.note_to_add_photo else {
            return;
        };
        match self.store.append_images(id, &self.staged_images) {
            Ok(()) => {
                self.refresh();
                self.add_photo_dialog_visible = false;
                self.note_to_add_photo = None;
                self.staged_images.clear();
            }
            Err(e) => error!("Error adding images: {}", e),
        }
    }

    fn begin_operation(&mut self, what: &str) -> bool {
        if self.in_flight {
            warn!("Ignoring re-entrant {} while another operation is in flight", what);
            return false;
        }
        self.in_flight = true;
        true
    }

    fn refresh(&mut self) {
        self.notes = self.store.fetch_all();
    }

    fn find_note(&self, id: Option<i64>) -> Option<&LocationNote> {
        id.and_then(|id| self.notes.iter().find(|n| n.id == id))
    }
}
