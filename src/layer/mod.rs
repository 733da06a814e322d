//! The canvas icon layer
//!
//! [`CanvasIconLayer`] ties the registry, image cache and drawing surface
//! together and reacts to host events. It is single-threaded: the host
//! delivers events one at a time through [`CanvasIconLayer::handle_event`]
//! and pumps icon completions with [`CanvasIconLayer::process_icon_events`]
//! or [`CanvasIconLayer::icon_ready`].

mod interaction;
mod viewport;

use std::rc::Rc;
use std::sync::Arc;

use tokio::runtime::Handle;

use crate::config::{LayerOptions, LayerOptionsPatch};
use crate::domain::{MARKER_PANE, MarkerId, MarkerRef, validate_marker};
use crate::error::InvalidMarkerError;
use crate::host::{MapEvent, MapView, PointerEvent, Subscription};
use crate::icons::{IconLoaded, IconSource, IconStatus, ImageCache};
use crate::registry::MarkerRegistry;
use crate::render::{self, DrawingSurface};
use crate::throttle::Throttle;

/// Callback invoked with the click and the marker that was hit
pub type ClickListener = Box<dyn FnMut(&PointerEvent, &MarkerRef)>;

pub struct CanvasIconLayer {
    options: LayerOptions,
    markers: MarkerRegistry,
    images: ImageCache,
    surface: DrawingSurface,
    map: Option<Rc<dyn MapView>>,
    subscriptions: Vec<Subscription>,
    click_listeners: Vec<ClickListener>,
    hover: Throttle<PointerEvent>,
    /// Between zoom-start and the next move-end nothing is drawn
    zooming: bool,
}

impl CanvasIconLayer {
    /// Create a detached layer. Icon loads are spawned on `runtime`.
    pub fn new(options: LayerOptions, source: Arc<dyn IconSource>, runtime: Handle) -> Self {
        let mut surface = DrawingSurface::default();
        surface.set_z_index(options.z_index);
        Self {
            hover: Throttle::new(options.hover_throttle()),
            options,
            markers: MarkerRegistry::new(),
            images: ImageCache::new(source, runtime),
            surface,
            map: None,
            subscriptions: Vec::new(),
            click_listeners: Vec::new(),
            zooming: false,
        }
    }

    pub fn options(&self) -> &LayerOptions {
        &self.options
    }

    /// Merge options and redraw everything
    pub fn set_options(&mut self, patch: LayerOptionsPatch) {
        let old_pane = self.options.pane().to_string();
        self.options.merge(patch);

        self.surface.set_z_index(self.options.z_index);
        self.hover.set_interval(self.options.hover_throttle());
        if let Some(map) = &self.map
            && old_pane != self.options.pane()
        {
            log::debug!("Moving surface from {} to {}", old_pane, self.options.pane());
            map.unmount(&old_pane);
            map.mount(self.options.pane());
        }

        self.redraw();
    }

    pub fn is_attached(&self) -> bool {
        self.map.is_some()
    }

    pub fn surface(&self) -> &DrawingSurface {
        &self.surface
    }

    pub fn markers(&self) -> &MarkerRegistry {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn icon_status(&self, id: MarkerId) -> IconStatus {
        self.images.status(id)
    }

    /// Icon loads still in flight
    pub fn pending_icons(&self) -> usize {
        self.images.pending()
    }

    /// Register a marker and draw it straight away (once its icon is ready)
    pub fn add_marker(&mut self, marker: MarkerRef) -> Result<MarkerId, InvalidMarkerError> {
        validate_marker(&*marker)?;

        let current = Rc::clone(&marker);
        let (id, previous) = self.markers.add(marker);
        if let Some(previous) = previous
            && !Rc::ptr_eq(&previous, &current)
        {
            self.images.forget(id);
        }

        self.draw_one(id);
        Ok(id)
    }

    /// Generic entry point: accepts only icon markers meant for the marker
    /// pane. Anything else is logged and skipped.
    pub fn add_layer(&mut self, marker: MarkerRef) -> Option<MarkerId> {
        if marker.pane() != MARKER_PANE {
            log::error!(
                "Layer isn't a marker: {}",
                InvalidMarkerError::WrongPane(marker.pane().to_string())
            );
            return None;
        }
        match self.add_marker(marker) {
            Ok(id) => Some(id),
            Err(err) => {
                log::error!("Layer isn't a marker: {}", err);
                None
            }
        }
    }

    /// Remove a marker by object or key. Returns its id if it was registered.
    pub fn remove_marker(&mut self, marker: &MarkerRef, redraw: bool) -> Option<MarkerId> {
        let removed = match self.markers.resolve_id(marker) {
            Some(id) => self.remove_marker_id(id, false).then_some(id),
            None => None,
        };
        if redraw {
            self.redraw();
        }
        removed
    }

    /// Remove a marker by id; unknown ids are ignored
    pub fn remove_marker_id(&mut self, id: MarkerId, redraw: bool) -> bool {
        let removed = self.markers.remove(id).is_some();
        self.images.forget(id);
        if redraw {
            self.redraw();
        }
        removed
    }

    pub fn remove_layer(&mut self, marker: &MarkerRef) -> Option<MarkerId> {
        self.remove_marker(marker, true)
    }

    /// Listeners run in registration order for every click on a marker
    pub fn add_click_listener(&mut self, listener: impl FnMut(&PointerEvent, &MarkerRef) + 'static) {
        self.click_listeners.push(Box::new(listener));
    }

    /// Clear the surface and draw every marker again
    pub fn redraw(&mut self) {
        self.redraw_all(true);
    }

    /// Route one host event
    pub fn handle_event(&mut self, event: &MapEvent) {
        if !self.is_attached() {
            return;
        }
        match event {
            MapEvent::MoveEnd => self.on_move_end(),
            MapEvent::ZoomStart => self.on_zoom_start(),
            MapEvent::Click(pointer) => self.on_click(pointer),
            MapEvent::PointerMove(pointer) => self.on_pointer_move(pointer),
        }
    }

    /// Apply every icon completion that has already arrived. Returns how
    /// many markers became drawable.
    pub fn process_icon_events(&mut self) -> usize {
        let mut ready = 0;
        while let Some(loaded) = self.images.try_next() {
            if self.apply_icon(loaded).is_some() {
                ready += 1;
            }
        }
        ready
    }

    /// Wait for one icon completion and apply it. Returns the marker whose
    /// icon became drawable, or None for failed and stale loads.
    pub async fn icon_ready(&mut self) -> Option<MarkerId> {
        let loaded = self.images.next().await?;
        self.apply_icon(loaded)
    }

    fn apply_icon(&mut self, loaded: IconLoaded) -> Option<MarkerId> {
        let id = self.images.complete(loaded)?;
        self.draw_one(id);
        Some(id)
    }

    /// Draw a single marker at its current position. No-op while detached
    /// or once the marker is gone.
    fn draw_one(&mut self, id: MarkerId) {
        let Some(map) = &self.map else {
            return;
        };
        let Some(marker) = self.markers.get(id) else {
            return;
        };
        if self.zooming {
            // Keep the load going so the icon is ready once the zoom settles
            if let Some(icon) = marker.icon() {
                self.images.resolve(id, icon);
            }
            return;
        }
        let point = map.lat_lng_to_container_point(marker.lat_lng());
        render::draw_marker(&mut self.surface, &mut self.images, id, marker, point);
    }

    fn redraw_all(&mut self, clear: bool) {
        let Some(map) = &self.map else {
            return;
        };
        if self.zooming {
            log::debug!("Skipping redraw while zooming");
            return;
        }
        let drawn = render::draw_markers(
            &mut self.surface,
            &mut self.images,
            &self.markers,
            |marker| map.lat_lng_to_container_point(marker.lat_lng()),
            clear,
        );
        log::debug!("Redrew {} of {} markers", drawn, self.markers.len());
    }
}

impl std::fmt::Debug for CanvasIconLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanvasIconLayer")
            .field("options", &self.options)
            .field("markers", &self.markers)
            .field("images", &self.images)
            .field("attached", &self.is_attached())
            .field("subscriptions", &self.subscriptions)
            .field("click_listeners", &self.click_listeners.len())
            .field("zooming", &self.zooming)
            .finish_non_exhaustive()
    }
}
