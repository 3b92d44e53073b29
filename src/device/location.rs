use anyhow::Result;

use crate::device::Permission;

/// A single position reading from the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Milliseconds since the Unix epoch, as reported by the platform.
    pub timestamp_millis: i64,
}

/// Device geolocation service.
///
/// The controller asks for permission before every fix and never caches a
/// result; a denied grant or a failed read surfaces as an error message, not
/// a retry.
pub trait LocationProvider {
    fn request_permission(&mut self) -> Permission;

    fn current_fix(&mut self) -> Result<LocationFix>;
}
