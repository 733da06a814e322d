//! Scene files and the headless map used by the snapshot tool

use std::cell::Cell;
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use canvas_icon_layer::{
    IconDescriptor, LatLng, LayerOptions, MapEventKind, MapView, Point, Size, SubscriptionId,
};

const TILE_SIZE: f64 = 256.0;
const MAX_LATITUDE: f64 = 85.051_128_779_806_6;

/// A marker as written in a scene file
#[derive(Debug, Clone, Deserialize)]
pub struct SceneMarker {
    pub position: LatLng,
    pub icon: IconDescriptor,
}

/// What to render: a fixed viewport and the markers on it
#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    pub center: LatLng,
    pub zoom: f64,
    pub size: Size,
    /// Directory icon urls are resolved against (relative to the scene file)
    #[serde(default)]
    pub icon_dir: Option<PathBuf>,
    #[serde(default)]
    pub options: LayerOptions,
    pub markers: Vec<SceneMarker>,
}

impl Scene {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scene {}", path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse scene {}", path.display()))
    }

    /// Base directory for icon urls
    pub fn icon_base(&self, scene_path: &Path) -> PathBuf {
        let scene_dir = scene_path.parent().unwrap_or(Path::new("."));
        match &self.icon_dir {
            Some(dir) => scene_dir.join(dir),
            None => scene_dir.to_path_buf(),
        }
    }
}

/// A map that never moves, projecting with spherical Web Mercator
#[derive(Debug)]
pub struct SnapshotMap {
    center: LatLng,
    zoom: f64,
    size: Size,
    next_subscription: Cell<u64>,
}

impl SnapshotMap {
    pub fn new(center: LatLng, zoom: f64, size: Size) -> Self {
        Self {
            center,
            zoom,
            size,
            next_subscription: Cell::new(0),
        }
    }

    fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    fn project(&self, lat_lng: LatLng) -> Point {
        let lat = lat_lng.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let world = self.world_size();
        let x = (lat_lng.lng + 180.0) / 360.0 * world;
        let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * world;
        Point::new(x, y)
    }

    fn unproject(&self, point: Point) -> LatLng {
        let world = self.world_size();
        let lng = point.x / world * 360.0 - 180.0;
        let n = PI - 2.0 * PI * point.y / world;
        let lat = n.sinh().atan().to_degrees();
        LatLng::new(lat, lng)
    }

    /// World pixel at the container's top-left corner
    fn top_left(&self) -> Point {
        let center = self.project(self.center);
        center.translate(
            -f64::from(self.size.width) / 2.0,
            -f64::from(self.size.height) / 2.0,
        )
    }
}

impl MapView for SnapshotMap {
    fn lat_lng_to_container_point(&self, lat_lng: LatLng) -> Point {
        let world = self.project(lat_lng);
        let top_left = self.top_left();
        Point::new(world.x - top_left.x, world.y - top_left.y)
    }

    fn container_point_to_lat_lng(&self, point: Point) -> LatLng {
        let top_left = self.top_left();
        self.unproject(point.translate(top_left.x, top_left.y))
    }

    fn container_point_to_layer_point(&self, point: Point) -> Point {
        point
    }

    fn size(&self) -> Size {
        self.size
    }

    fn zoom_animated(&self) -> bool {
        false
    }

    fn subscribe(&self, kind: MapEventKind) -> SubscriptionId {
        let id = self.next_subscription.get() + 1;
        self.next_subscription.set(id);
        log::debug!("Subscribed to {:?} as {}", kind, id);
        SubscriptionId(id)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        log::debug!("Unsubscribed {}", id.0);
    }

    fn mount(&self, pane: &str) {
        log::debug!("Surface mounted in {}", pane);
    }

    fn unmount(&self, pane: &str) {
        log::debug!("Surface unmounted from {}", pane);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_projects_to_middle() {
        let map = SnapshotMap::new(LatLng::new(51.5, -0.12), 12.0, Size::new(800, 600));
        let p = map.lat_lng_to_container_point(LatLng::new(51.5, -0.12));
        assert!((p.x - 400.0).abs() < 1e-6);
        assert!((p.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_unproject_inverts_project() {
        let map = SnapshotMap::new(LatLng::new(40.0, 10.0), 5.0, Size::new(256, 256));
        let target = LatLng::new(42.0, 12.5);
        let back = map.container_point_to_lat_lng(map.lat_lng_to_container_point(target));
        assert!((back.lat - target.lat).abs() < 1e-9);
        assert!((back.lng - target.lng).abs() < 1e-9);
    }

    #[test]
    fn test_north_is_up() {
        let map = SnapshotMap::new(LatLng::new(0.0, 0.0), 3.0, Size::new(256, 256));
        let north = map.lat_lng_to_container_point(LatLng::new(10.0, 0.0));
        let south = map.lat_lng_to_container_point(LatLng::new(-10.0, 0.0));
        assert!(north.y < south.y);
    }

    #[test]
    fn test_scene_parses_with_defaults() {
        let scene: Scene = serde_json::from_str(
            r#"{
                "center": { "lat": 0.0, "lng": 0.0 },
                "zoom": 2,
                "size": { "width": 320, "height": 200 },
                "markers": [
                    {
                        "position": { "lat": 1.0, "lng": 2.0 },
                        "icon": { "url": "pin.png", "size": [25, 41], "anchor": [12, 41] }
                    }
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(scene.markers.len(), 1);
        assert_eq!(scene.options, LayerOptions::default());
        assert_eq!(
            scene.icon_base(Path::new("/data/scene.json")),
            PathBuf::from("/data")
        );
    }
}
