//! Error types surfaced by the layer

use thiserror::Error;

/// A marker that cannot be drawn or hit tested
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidMarkerError {
    #[error("marker has no icon descriptor")]
    MissingIcon,

    #[error("icon url is empty")]
    EmptyUrl,

    #[error("icon size must be two finite, non-negative numbers, got {0:?}")]
    BadSize([f64; 2]),

    #[error("icon anchor must be two finite numbers, got {0:?}")]
    BadAnchor([f64; 2]),

    #[error("marker is designated for pane `{0}`, expected `markerPane`")]
    WrongPane(String),
}

/// Failure to fetch or decode a marker's icon image
#[derive(Debug, Error)]
pub enum IconLoadError {
    #[error("failed to read icon `{url}`: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no icon registered for `{0}`")]
    NotFound(String),

    #[error("failed to decode icon `{url}`: {source}")]
    Decode {
        url: String,
        #[source]
        source: image::ImageError,
    },

    #[error("icon `{0}` decoded to an empty image")]
    Empty(String),
}

/// Failure to read layer options from disk
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
