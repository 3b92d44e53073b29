pub mod location;
pub mod picker;

pub use location::{LocationFix, LocationProvider};
pub use picker::ImageProvider;

/// Outcome of a runtime permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}
