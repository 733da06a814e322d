//! Placing marker icons on the drawing surface
//!
//! Icons are always drawn axis aligned at their declared size, with the
//! icon anchor on the marker's projected position.

use super::surface::DrawingSurface;
use crate::domain::{IconDescriptor, MarkerId, MarkerRef, Point, Rect};
use crate::icons::ImageCache;
use crate::registry::MarkerRegistry;

/// Destination rectangle of an icon anchored at `anchor_point`
pub fn icon_rect(icon: &IconDescriptor, anchor_point: Point) -> Rect {
    let [ax, ay] = icon.anchor;
    Rect::from_origin_size(
        anchor_point.translate(-ax, -ay),
        icon.width(),
        icon.height(),
    )
}

/// Draw one marker if its icon is ready, otherwise request the icon.
/// Returns whether anything was drawn.
pub fn draw_marker(
    surface: &mut DrawingSurface,
    images: &mut ImageCache,
    id: MarkerId,
    marker: &MarkerRef,
    anchor_point: Point,
) -> bool {
    let Some(icon) = marker.icon() else {
        return false;
    };

    match images.get(id) {
        Some(image) => {
            surface.draw_image(image, icon_rect(icon, anchor_point));
            true
        }
        None => {
            images.resolve(id, icon);
            false
        }
    }
}

/// Draw every registered marker in registry order, optionally clearing first.
/// Returns how many markers were drawn.
pub fn draw_markers(
    surface: &mut DrawingSurface,
    images: &mut ImageCache,
    markers: &MarkerRegistry,
    project: impl Fn(&MarkerRef) -> Point,
    clear: bool,
) -> usize {
    if clear {
        surface.clear();
    }

    let mut drawn = 0;
    for (id, marker) in markers.iter() {
        if draw_marker(surface, images, id, marker, project(marker)) {
            drawn += 1;
        }
    }
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_rect_offsets_by_anchor() {
        let icon = IconDescriptor::new("pin.png", [24.0, 24.0], [12.0, 24.0]);
        let rect = icon_rect(&icon, Point::new(100.0, 100.0));
        assert_eq!(rect.left, 88.0);
        assert_eq!(rect.top, 76.0);
        assert_eq!(rect.right, 112.0);
        assert_eq!(rect.bottom, 100.0);
    }
}
