use std::cell::{Cell, RefCell};
use std::io::Cursor;
use std::sync::Arc;

use canvas_icon_layer::{
    CanvasIconLayer, IconDescriptor, IconMarker, LatLng, LayerOptions, MapEventKind, MapView,
    MarkerRef, MemoryIconSource, Point, Size, SubscriptionId,
};
use image::{ImageFormat, Rgba, RgbaImage};
use tokio::runtime::Handle;

pub const PIN: &str = "pin.png";

/// Host map with a linear projection: container = (lng, lat) + offset
#[derive(Debug)]
pub struct FakeMap {
    pub size: Cell<Size>,
    pub offset: Cell<Point>,
    pub pane_offset: Cell<Point>,
    pub subscriptions: RefCell<Vec<(SubscriptionId, MapEventKind)>>,
    pub mounted: RefCell<Vec<String>>,
    next_id: Cell<u64>,
}

impl FakeMap {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: Cell::new(Size::new(width, height)),
            offset: Cell::new(Point::ORIGIN),
            pane_offset: Cell::new(Point::ORIGIN),
            subscriptions: RefCell::new(Vec::new()),
            mounted: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    /// Pan so that everything moves by (dx, dy) on screen
    pub fn pan(&self, dx: f64, dy: f64) {
        self.offset.set(self.offset.get().translate(dx, dy));
        self.pane_offset.set(self.pane_offset.get().translate(-dx, -dy));
    }
}

impl MapView for FakeMap {
    fn lat_lng_to_container_point(&self, lat_lng: LatLng) -> Point {
        let offset = self.offset.get();
        Point::new(lat_lng.lng + offset.x, lat_lng.lat + offset.y)
    }

    fn container_point_to_lat_lng(&self, point: Point) -> LatLng {
        let offset = self.offset.get();
        LatLng::new(point.y - offset.y, point.x - offset.x)
    }

    fn container_point_to_layer_point(&self, point: Point) -> Point {
        let pane = self.pane_offset.get();
        point.translate(pane.x, pane.y)
    }

    fn size(&self) -> Size {
        self.size.get()
    }

    fn subscribe(&self, kind: MapEventKind) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.subscriptions.borrow_mut().push((id, kind));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.borrow_mut().retain(|(other, _)| *other != id);
    }

    fn mount(&self, pane: &str) {
        self.mounted.borrow_mut().push(pane.to_string());
    }

    fn unmount(&self, pane: &str) {
        self.mounted.borrow_mut().retain(|other| other != pane);
    }
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([220, 30, 30, 255]));
    let mut bytes = Cursor::new(Vec::new());
    img.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

/// 24x24 pin anchored at its bottom centre
pub fn pin_icon() -> IconDescriptor {
    IconDescriptor::new(PIN, [24.0, 24.0], [12.0, 24.0])
}

/// Marker whose anchor projects to (x, y) on an unpanned `FakeMap`
pub fn marker_at(x: f64, y: f64) -> MarkerRef {
    IconMarker::new(LatLng::new(y, x), pin_icon()).into_ref()
}

pub fn layer() -> CanvasIconLayer {
    layer_with(LayerOptions::default())
}

pub fn layer_with(options: LayerOptions) -> CanvasIconLayer {
    let source = MemoryIconSource::new().with_icon(PIN, png(24, 24));
    CanvasIconLayer::new(options, Arc::new(source), Handle::current())
}

/// Wait until every in-flight icon load has been applied
pub async fn settle(layer: &mut CanvasIconLayer) {
    while layer.pending_icons() > 0 {
        layer.icon_ready().await;
    }
}

/// Is the icon anchored at (x, y) visible on the surface
pub fn drawn_at(layer: &CanvasIconLayer, x: u32, y: u32) -> bool {
    // Centre of a 24x24 icon anchored at its bottom centre
    layer.surface().alpha_at(x, y - 12) > 0
}
