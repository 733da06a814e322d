//! Pointer interaction: click dispatch and the hover affordance
//!
//! Clicks and hover each run their own scan over the registry. The hover
//! scan is throttled, so the two may briefly disagree about what is under
//! the pointer.

use std::rc::Rc;
use std::time::Instant;

use super::CanvasIconLayer;
use crate::domain::{MarkerId, MarkerRef, Point};
use crate::hit;
use crate::host::PointerEvent;

impl CanvasIconLayer {
    /// First marker under `point`, in registry order
    pub fn marker_at(&self, point: Point) -> Option<(MarkerId, MarkerRef)> {
        let map = self.map.as_ref()?;
        hit::first_hit(
            self.markers.iter(),
            |marker| map.lat_lng_to_container_point(marker.lat_lng()),
            point,
        )
        .map(|(id, marker)| (id, Rc::clone(marker)))
    }

    /// Run every click listener with the first marker hit, if any
    pub(super) fn on_click(&mut self, event: &PointerEvent) {
        let Some((id, marker)) = self.marker_at(event.container_point) else {
            return;
        };
        log::debug!("Click on {}", id);
        for listener in &mut self.click_listeners {
            listener(event, &marker);
        }
    }

    pub(super) fn on_pointer_move(&mut self, event: &PointerEvent) {
        if let Some(event) = self.hover.offer(event.at, *event) {
            self.update_hover(&event);
        }
    }

    /// Evaluate a pointer move held back by the hover throttle once its
    /// window has passed. Hosts call this from their frame or timer tick.
    pub fn poll_hover(&mut self, now: Instant) {
        if !self.is_attached() {
            return;
        }
        if let Some(event) = self.hover.poll(now) {
            self.update_hover(&event);
        }
    }

    fn update_hover(&mut self, event: &PointerEvent) {
        let over_marker = self.marker_at(event.container_point).is_some();
        self.surface.set_interactive(over_marker);
    }
}
