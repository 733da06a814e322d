//! Pure domain types with minimal dependencies
//!
//! This module contains core types used throughout the layer.
//! Types here know nothing about the host map or the drawing surface.

pub mod geometry;
pub mod marker;

pub use geometry::*;
pub use marker::*;
