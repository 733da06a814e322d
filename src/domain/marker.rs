//! Marker contract and icon descriptors
//!
//! Markers are owned by the caller and shared with the layer through
//! [`MarkerRef`]. The layer never writes to a marker; positions are read
//! through [`MapMarker::lat_lng`] each time they are needed.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::geometry::LatLng;
use crate::error::InvalidMarkerError;

/// Pane designation a marker must carry to be accepted by `add_layer`
pub const MARKER_PANE: &str = "markerPane";

/// Stable identity of a registered marker.
///
/// Keys chosen by the caller and ids handed out by the registry live in
/// separate namespaces, so neither can take over the other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MarkerId {
    /// Supplied by the marker through [`MapMarker::key`]
    Key(u64),
    /// Assigned by the registry on first insertion
    Auto(u64),
}

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkerId::Key(key) => write!(f, "marker:{}", key),
            MarkerId::Auto(n) => write!(f, "marker#{}", n),
        }
    }
}

/// Icon image location and placement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IconDescriptor {
    /// Where the icon image is fetched from
    pub url: String,
    /// Width and height the image is drawn at, in pixels
    pub size: [f64; 2],
    /// Offset from the image's top-left corner to the point placed on the map
    pub anchor: [f64; 2],
}

impl IconDescriptor {
    pub fn new(url: impl Into<String>, size: [f64; 2], anchor: [f64; 2]) -> Self {
        Self {
            url: url.into(),
            size,
            anchor,
        }
    }

    /// Check the descriptor can be drawn and hit tested
    pub fn validate(&self) -> Result<(), InvalidMarkerError> {
        if self.url.trim().is_empty() {
            return Err(InvalidMarkerError::EmptyUrl);
        }
        if self.size.iter().any(|v| !v.is_finite() || *v < 0.0) {
            return Err(InvalidMarkerError::BadSize(self.size));
        }
        if self.anchor.iter().any(|v| !v.is_finite()) {
            return Err(InvalidMarkerError::BadAnchor(self.anchor));
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.size[0]
    }

    pub fn height(&self) -> f64 {
        self.size[1]
    }
}

/// Anything the layer can place on the map
pub trait MapMarker {
    /// Current geographic position; may change between redraws
    fn lat_lng(&self) -> LatLng;

    /// Icon used to draw and hit test this marker
    fn icon(&self) -> Option<&IconDescriptor>;

    /// Pane this marker was created for
    fn pane(&self) -> &str {
        MARKER_PANE
    }

    /// Caller-chosen identity, registered as [`MarkerId::Key`]. Markers
    /// returning `None` get one assigned by the registry.
    fn key(&self) -> Option<u64> {
        None
    }
}

/// Shared handle to a caller-owned marker
pub type MarkerRef = Rc<dyn MapMarker>;

/// Validate the parts of a marker the layer depends on
pub fn validate_marker(marker: &dyn MapMarker) -> Result<&IconDescriptor, InvalidMarkerError> {
    let icon = marker.icon().ok_or(InvalidMarkerError::MissingIcon)?;
    icon.validate()?;
    Ok(icon)
}

/// Plain marker with a movable position
#[derive(Debug)]
pub struct IconMarker {
    position: Cell<LatLng>,
    icon: Option<IconDescriptor>,
    pane: String,
    key: Option<u64>,
}

impl IconMarker {
    pub fn new(position: LatLng, icon: IconDescriptor) -> Self {
        Self {
            position: Cell::new(position),
            icon: Some(icon),
            pane: MARKER_PANE.to_string(),
            key: None,
        }
    }

    /// Marker without an icon, rejected by the layer
    pub fn without_icon(position: LatLng) -> Self {
        Self {
            position: Cell::new(position),
            icon: None,
            pane: MARKER_PANE.to_string(),
            key: None,
        }
    }

    pub fn with_key(mut self, key: u64) -> Self {
        self.key = Some(key);
        self
    }

    pub fn with_pane(mut self, pane: impl Into<String>) -> Self {
        self.pane = pane.into();
        self
    }

    pub fn set_lat_lng(&self, position: LatLng) {
        self.position.set(position);
    }

    pub fn into_ref(self) -> MarkerRef {
        Rc::new(self)
    }
}

impl MapMarker for IconMarker {
    fn lat_lng(&self) -> LatLng {
        self.position.get()
    }

    fn icon(&self) -> Option<&IconDescriptor> {
        self.icon.as_ref()
    }

    fn pane(&self) -> &str {
        &self.pane
    }

    fn key(&self) -> Option<u64> {
        self.key
    }
}
