//! Keeping the surface in step with the host viewport

use std::rc::Rc;

use super::CanvasIconLayer;
use crate::domain::{Point, Size};
use crate::host::{Layer, MapEventKind, MapView, Subscription};
use crate::render::ZoomBehavior;

impl CanvasIconLayer {
    /// Viewport settled: move the surface to the viewport's top-left,
    /// resize it, then redraw from scratch. Resizing must come first so the
    /// redraw is clipped to the new bounds.
    pub(super) fn on_move_end(&mut self) {
        let Some(map) = self.map.clone() else {
            return;
        };
        self.zooming = false;
        self.surface
            .set_origin(map.container_point_to_layer_point(Point::ORIGIN));
        self.surface.resize(map.size());
        self.redraw_all(true);
    }

    /// Zoom animation started: blank the surface and hold every draw until
    /// the next move-end so stale positions are never shown
    pub(super) fn on_zoom_start(&mut self) {
        self.zooming = true;
        self.surface.clear();
    }
}

impl Layer for CanvasIconLayer {
    fn attach(&mut self, map: Rc<dyn MapView>) {
        if self.is_attached() {
            self.detach();
        }

        self.surface.resize(map.size());
        self.surface
            .set_origin(map.container_point_to_layer_point(Point::ORIGIN));
        self.surface.set_zoom_behavior(if map.zoom_animated() {
            ZoomBehavior::Animated
        } else {
            ZoomBehavior::Hide
        });
        map.mount(self.options.pane());

        self.subscriptions = MapEventKind::ALL
            .into_iter()
            .map(|kind| Subscription {
                kind,
                id: map.subscribe(kind),
            })
            .collect();
        self.hover.reset();
        self.zooming = false;

        log::debug!(
            "Attached to map ({}x{}) in {}",
            self.surface.size().width,
            self.surface.size().height,
            self.options.pane()
        );
        self.map = Some(map);
        self.redraw_all(false);
    }

    fn detach(&mut self) {
        let Some(map) = self.map.take() else {
            return;
        };
        map.unmount(self.options.pane());
        for subscription in self.subscriptions.drain(..) {
            map.unsubscribe(subscription.id);
        }
        self.click_listeners.clear();
        self.hover.reset();
        self.zooming = false;
        // Release the pixels with the mount; attach reallocates
        self.surface.resize(Size::default());
        self.surface.set_interactive(false);
        log::debug!("Detached from map");
    }

    fn invalidate(&mut self) {
        self.redraw();
    }
}
