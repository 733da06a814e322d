//! Pointer hit testing against marker icons
//!
//! The hit box is the icon rectangle placed at its anchor, grown by one
//! pixel on every edge, with inclusive bounds.

use crate::domain::{IconDescriptor, MarkerId, MarkerRef, Point, Rect};

/// Extra pixels accepted around each edge of an icon
pub const EDGE_TOLERANCE: f64 = 1.0;

/// Hit box of an icon whose anchor is projected to `anchor_point`
pub fn hit_box(icon: &IconDescriptor, anchor_point: Point) -> Rect {
    let [w, h] = icon.size;
    let [ax, ay] = icon.anchor;

    let top = ay + EDGE_TOLERANCE;
    let bottom = h - ay + EDGE_TOLERANCE;
    let left = ax + EDGE_TOLERANCE;
    let right = w - ax + EDGE_TOLERANCE;

    Rect {
        left: anchor_point.x - left,
        top: anchor_point.y - top,
        right: anchor_point.x + right,
        bottom: anchor_point.y + bottom,
    }
}

/// Check if `query` falls on the icon anchored at `anchor_point`
#[inline]
pub fn hit(icon: &IconDescriptor, anchor_point: Point, query: Point) -> bool {
    hit_box(icon, anchor_point).contains_point(query)
}

/// First marker, in iteration order, whose icon contains `query`.
/// Later overlapping markers are never tested.
pub fn first_hit<'a, I>(
    markers: I,
    project: impl Fn(&MarkerRef) -> Point,
    query: Point,
) -> Option<(MarkerId, &'a MarkerRef)>
where
    I: IntoIterator<Item = (MarkerId, &'a MarkerRef)>,
{
    markers.into_iter().find(|(_, marker)| {
        marker
            .icon()
            .is_some_and(|icon| hit(icon, project(*marker), query))
    })
}
