//! Icon fetching, decoding and per-marker caching

pub mod cache;
pub mod source;

pub use cache::{IconLoaded, IconStatus, ImageCache};
pub use source::{FileIconSource, IconSource, MemoryIconSource, decode_icon};
