//! Draw large numbers of map markers onto one shared raster surface.
//!
//! Instead of one element per marker, every icon is painted into a single
//! [`DrawingSurface`] sized to the host map's viewport. Clicks and hover are
//! resolved by geometric hit testing against marker icons.
//!
//! The host map is reached through [`MapView`]; it delivers viewport and
//! pointer events as [`MapEvent`]s to [`CanvasIconLayer::handle_event`].

pub mod config;
pub mod domain;
pub mod error;
pub mod hit;
pub mod host;
pub mod icons;
pub mod layer;
pub mod registry;
pub mod render;
pub mod throttle;

pub use config::{LayerOptions, LayerOptionsPatch};
pub use domain::{IconDescriptor, IconMarker, LatLng, MapMarker, MarkerId, MarkerRef, Point, Size};
pub use error::{ConfigError, IconLoadError, InvalidMarkerError};
pub use host::{Layer, MapEvent, MapEventKind, MapView, PointerEvent, SubscriptionId};
pub use icons::{FileIconSource, IconSource, IconStatus, MemoryIconSource};
pub use layer::{CanvasIconLayer, ClickListener};
pub use registry::MarkerRegistry;
pub use render::{DrawingSurface, ZoomBehavior};
