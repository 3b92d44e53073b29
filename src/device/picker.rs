use anyhow::Result;

use crate::device::Permission;

/// Device image source: the photo library and the camera.
///
/// `Ok(None)` means the user canceled the picker. Camera capture needs its
/// own permission grant, requested per call via
/// [`ImageProvider::request_camera_permission`]; the library picker does not.
pub trait ImageProvider {
    fn request_camera_permission(&mut self) -> Permission;

    /// Lets the user choose an existing image; returns its URI.
    fn pick_from_library(&mut self) -> Result<Option<String>>;

    /// Captures a new photo with the camera; returns its URI.
    fn capture_photo(&mut self) -> Result<Option<String>>;
}
