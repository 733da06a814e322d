//! Marker rendering module
//!
//! This module contains:
//! - The shared drawing surface (tiny-skia pixmap sized to the viewport)
//! - Functions that place marker icons on it

pub mod draw;
pub mod surface;

pub use draw::{draw_marker, draw_markers, icon_rect};
pub use surface::{DrawingSurface, ZoomBehavior};
