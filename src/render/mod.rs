//! CPU framebuffer rendering
//!
//! Draws the arena into an RGBA pixel buffer without GPU dependencies, in a
//! fixed z-order: background, then bodies keyed by part kind, then damage
//! popups.

mod frame;
mod scene;

pub use frame::PixelFrame;
pub use scene::ArenaRenderer;
