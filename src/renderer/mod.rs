//! Rendering module
//!
//! Produces backend-agnostic sprite instances and text items; uploading
//! them to a GPU is the platform layer's job.

pub mod frame;
pub mod instance;

pub use frame::{Frame, TextItem, build_frame, hud_text};
pub use instance::{SpriteInstance, as_bytes};
