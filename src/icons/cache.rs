//! Per-marker icon image cache
//!
//! Each marker moves through `Unloaded -> Loading -> Ready` (or `Failed`)
//! at most once. Loads run as tokio tasks and report back over a channel;
//! the owner pumps completions with [`ImageCache::try_next`] or
//! [`ImageCache::next`] and hands them to [`ImageCache::complete`].

use std::collections::HashMap;
use std::sync::Arc;

use tiny_skia::Pixmap;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use super::source::{IconSource, decode_icon};
use crate::domain::{IconDescriptor, MarkerId};
use crate::error::IconLoadError;

/// Externally visible load state of a marker's icon
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IconStatus {
    Unloaded,
    Loading,
    Ready,
    Failed,
}

enum IconState {
    Loading { ticket: u64, task: JoinHandle<()> },
    Ready(Pixmap),
    Failed,
}

/// Completion of one icon load
#[derive(Debug)]
pub struct IconLoaded {
    pub id: MarkerId,
    ticket: u64,
    result: Result<Pixmap, IconLoadError>,
}

pub struct ImageCache {
    source: Arc<dyn IconSource>,
    runtime: Handle,
    states: HashMap<MarkerId, IconState>,
    next_ticket: u64,
    tx: UnboundedSender<IconLoaded>,
    rx: UnboundedReceiver<IconLoaded>,
}

impl ImageCache {
    pub fn new(source: Arc<dyn IconSource>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            source,
            runtime,
            states: HashMap::new(),
            next_ticket: 0,
            tx,
            rx,
        }
    }

    pub fn status(&self, id: MarkerId) -> IconStatus {
        match self.states.get(&id) {
            None => IconStatus::Unloaded,
            Some(IconState::Loading { .. }) => IconStatus::Loading,
            Some(IconState::Ready(_)) => IconStatus::Ready,
            Some(IconState::Failed) => IconStatus::Failed,
        }
    }

    /// Decoded image, only once the load has finished
    pub fn get(&self, id: MarkerId) -> Option<&Pixmap> {
        match self.states.get(&id) {
            Some(IconState::Ready(pixmap)) => Some(pixmap),
            _ => None,
        }
    }

    /// Start loading the icon if nothing has been requested for this marker yet
    pub fn resolve(&mut self, id: MarkerId, icon: &IconDescriptor) -> IconStatus {
        if self.states.contains_key(&id) {
            return self.status(id);
        }

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let url = icon.url.clone();

        log::debug!("Loading icon {} for {}", url, id);
        let task = self.runtime.spawn(async move {
            let result = match source.fetch(&url).await {
                Ok(bytes) => decode_icon(&url, &bytes),
                Err(err) => Err(err),
            };
            // The cache may be gone already
            let _ = tx.send(IconLoaded { id, ticket, result });
        });

        self.states.insert(id, IconState::Loading { ticket, task });
        IconStatus::Loading
    }

    /// Drop whatever is known about a marker, cancelling a pending load
    pub fn forget(&mut self, id: MarkerId) {
        if let Some(IconState::Loading { task, .. }) = self.states.remove(&id) {
            log::debug!("Cancelling icon load for {}", id);
            task.abort();
        }
    }

    /// Number of loads still in flight
    pub fn pending(&self) -> usize {
        self.states
            .values()
            .filter(|state| matches!(state, IconState::Loading { .. }))
            .count()
    }

    /// Next completion if one has already arrived
    pub fn try_next(&mut self) -> Option<IconLoaded> {
        self.rx.try_recv().ok()
    }

    /// Wait for the next completion. Never resolves while nothing is loading.
    pub async fn next(&mut self) -> Option<IconLoaded> {
        self.rx.recv().await
    }

    /// Record a completion. Returns the marker id when its icon became
    /// ready to draw; stale completions for forgotten or replaced markers
    /// are dropped.
    pub fn complete(&mut self, loaded: IconLoaded) -> Option<MarkerId> {
        let IconLoaded { id, ticket, result } = loaded;
        match self.states.get(&id) {
            Some(IconState::Loading { ticket: current, .. }) if *current == ticket => {}
            _ => {
                log::debug!("Ignoring stale icon load for {}", id);
                return None;
            }
        }

        match result {
            Ok(pixmap) => {
                self.states.insert(id, IconState::Ready(pixmap));
                Some(id)
            }
            Err(err) => {
                log::warn!("Icon for {} will not be drawn: {}", id, err);
                self.states.insert(id, IconState::Failed);
                None
            }
        }
    }
}

impl std::fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageCache")
            .field("entries", &self.states.len())
            .field("pending", &self.pending())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::MemoryIconSource;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png() -> Vec<u8> {
        let img = RgbaImage::from_pixel(4, 4, Rgba([255, 0, 0, 255]));
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    fn cache() -> ImageCache {
        let source = MemoryIconSource::new().with_icon("pin.png", png());
        ImageCache::new(Arc::new(source), Handle::current())
    }

    fn pin() -> IconDescriptor {
        IconDescriptor::new("pin.png", [4.0, 4.0], [2.0, 4.0])
    }

    #[tokio::test]
    async fn test_resolve_then_ready() {
        let mut cache = cache();
        let id = MarkerId::Auto(1);
        assert_eq!(cache.status(id), IconStatus::Unloaded);
        assert_eq!(cache.resolve(id, &pin()), IconStatus::Loading);
        assert!(cache.get(id).is_none());

        let loaded = cache.next().await.unwrap();
        assert_eq!(cache.complete(loaded), Some(id));
        assert_eq!(cache.status(id), IconStatus::Ready);
        assert_eq!(cache.get(id).map(|p| p.width()), Some(4));
        assert_eq!(cache.pending(), 0);
    }

    #[tokio::test]
    async fn test_resolve_is_at_most_once() {
        let mut cache = cache();
        let id = MarkerId::Auto(1);
        cache.resolve(id, &pin());
        cache.resolve(id, &pin());
        assert_eq!(cache.pending(), 1);

        let loaded = cache.next().await.unwrap();
        cache.complete(loaded);
        assert_eq!(cache.resolve(id, &pin()), IconStatus::Ready);
        assert!(cache.try_next().is_none());
    }

    #[tokio::test]
    async fn test_missing_icon_fails_without_retry() {
        let mut cache = cache();
        let id = MarkerId::Auto(3);
        let icon = IconDescriptor::new("missing.png", [4.0, 4.0], [0.0, 0.0]);
        cache.resolve(id, &icon);

        let loaded = cache.next().await.unwrap();
        assert_eq!(cache.complete(loaded), None);
        assert_eq!(cache.status(id), IconStatus::Failed);
        assert_eq!(cache.resolve(id, &icon), IconStatus::Failed);
        assert_eq!(cache.pending(), 0);
    }

    #[tokio::test]
    async fn test_stale_completion_is_ignored() {
        let mut cache = cache();
        let id = MarkerId::Auto(1);
        cache.resolve(id, &pin());
        let stale = cache.next().await.unwrap();

        // Marker replaced before its completion was processed
        cache.forget(id);
        cache.resolve(id, &pin());
        assert_eq!(cache.complete(stale), None);
        assert_eq!(cache.status(id), IconStatus::Loading);

        let fresh = cache.next().await.unwrap();
        assert_eq!(cache.complete(fresh), Some(id));
    }

    #[tokio::test]
    async fn test_forget_cancels_pending_load() {
        let mut cache = cache();
        let id = MarkerId::Auto(1);
        cache.resolve(id, &pin());
        cache.forget(id);
        assert_eq!(cache.status(id), IconStatus::Unloaded);
        assert_eq!(cache.pending(), 0);

        tokio::task::yield_now().await;
        assert!(cache.try_next().is_none());
    }
}
