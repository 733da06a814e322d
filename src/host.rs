//! Interfaces shared with the host map
//!
//! The host owns viewport math, pane attachment and event timing. The layer
//! only consumes them through [`MapView`] and receives events as
//! [`MapEvent`] values.

use std::rc::Rc;
use std::time::Instant;

use crate::domain::{LatLng, Point, Size};

/// Pane used when no pane option is configured
pub const OVERLAY_PANE: &str = "overlayPane";

/// Host event kinds the layer subscribes to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapEventKind {
    MoveEnd,
    ZoomStart,
    Click,
    PointerMove,
}

impl MapEventKind {
    pub const ALL: [MapEventKind; 4] = [
        MapEventKind::MoveEnd,
        MapEventKind::ZoomStart,
        MapEventKind::Click,
        MapEventKind::PointerMove,
    ];
}

/// Pointer position delivered with click and move events
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Position relative to the map container
    pub container_point: Point,
    /// When the host observed the event
    pub at: Instant,
}

impl PointerEvent {
    pub fn new(container_point: Point, at: Instant) -> Self {
        Self {
            container_point,
            at,
        }
    }

    pub fn now(container_point: Point) -> Self {
        Self::new(container_point, Instant::now())
    }
}

/// Event delivered by the host
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MapEvent {
    /// Viewport settled after a pan or zoom
    MoveEnd,
    /// Zoom animation started
    ZoomStart,
    Click(PointerEvent),
    PointerMove(PointerEvent),
}

impl MapEvent {
    pub fn kind(&self) -> MapEventKind {
        match self {
            MapEvent::MoveEnd => MapEventKind::MoveEnd,
            MapEvent::ZoomStart => MapEventKind::ZoomStart,
            MapEvent::Click(_) => MapEventKind::Click,
            MapEvent::PointerMove(_) => MapEventKind::PointerMove,
        }
    }
}

/// Token returned by [`MapView::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Live subscription held by an attached layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subscription {
    pub kind: MapEventKind,
    pub id: SubscriptionId,
}

/// The host map, as seen by the layer
pub trait MapView {
    /// Project a geographic position into container pixels
    fn lat_lng_to_container_point(&self, lat_lng: LatLng) -> Point;

    fn container_point_to_lat_lng(&self, point: Point) -> LatLng;

    /// Map a container point into the coordinate space of the host's panes
    fn container_point_to_layer_point(&self, point: Point) -> Point;

    /// Current viewport size in device pixels
    fn size(&self) -> Size;

    /// Whether the host animates zoom transitions
    fn zoom_animated(&self) -> bool {
        true
    }

    fn subscribe(&self, kind: MapEventKind) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId);

    /// Mount the layer's drawing surface into a pane
    fn mount(&self, pane: &str);

    fn unmount(&self, pane: &str);
}

/// Lifecycle capability of anything the host can add to a map
pub trait Layer {
    /// Called when the layer is added to a live map
    fn attach(&mut self, map: Rc<dyn MapView>);

    /// Called when the layer is removed from its map
    fn detach(&mut self);

    /// Discard everything drawn and draw again
    fn invalidate(&mut self);
}
