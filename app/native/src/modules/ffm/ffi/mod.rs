//! FFI wrappers for the macOS APIs behind the focus pipeline.
//!
//! - [`accessibility`] - `AXUIElement` ownership, hit-testing and focus changes
//! - [`skylight`] - window server hit-testing and window classification

pub mod accessibility;
pub mod skylight;

pub use accessibility::{AXElement, SystemAccessibility, is_trusted, window_id_of};
pub use skylight::SkyLightWindowServer;
