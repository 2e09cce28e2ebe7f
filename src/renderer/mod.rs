//! CPU rendering module
//!
//! Composes the 64x64 playfield (terrain plus the storm's spiral overlay)
//! into an RGBA framebuffer. The shell blits the result onto a canvas and
//! scales it up; nothing here knows about the platform.

pub mod frame;
pub mod spiral;

pub use frame::Frame;
pub use spiral::{OverlayPx, spiral};
