//! Where icon bytes come from, and how they become pixmaps

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{self, BoxFuture};
use tiny_skia::{ColorU8, Pixmap};

use crate::error::IconLoadError;

/// Fetches the raw encoded bytes behind an icon url
pub trait IconSource: Send + Sync {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, IconLoadError>>;
}

/// Reads icons from disk. Relative urls resolve against `base`.
#[derive(Clone, Debug)]
pub struct FileIconSource {
    base: PathBuf,
}

impl FileIconSource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Path an icon url refers to
    pub fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base.join(path)
        }
    }
}

impl IconSource for FileIconSource {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, IconLoadError>> {
        let path = self.resolve(url);
        let url = url.to_string();
        async move {
            tokio::fs::read(&path)
                .await
                .map_err(|source| IconLoadError::Io { url, source })
        }
        .boxed()
    }
}

/// Icons kept in memory, keyed by url
#[derive(Clone, Debug, Default)]
pub struct MemoryIconSource {
    icons: HashMap<String, Arc<[u8]>>,
}

impl MemoryIconSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_icon(mut self, url: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        self.insert(url, bytes);
        self
    }

    pub fn insert(&mut self, url: impl Into<String>, bytes: impl Into<Arc<[u8]>>) {
        self.icons.insert(url.into(), bytes.into());
    }
}

impl IconSource for MemoryIconSource {
    fn fetch(&self, url: &str) -> BoxFuture<'static, Result<Vec<u8>, IconLoadError>> {
        let result = self
            .icons
            .get(url)
            .map(|bytes| bytes.to_vec())
            .ok_or_else(|| IconLoadError::NotFound(url.to_string()));
        future::ready(result).boxed()
    }
}

/// Decode an encoded image into a premultiplied pixmap
pub fn decode_icon(url: &str, bytes: &[u8]) -> Result<Pixmap, IconLoadError> {
    let rgba = image::load_from_memory(bytes)
        .map_err(|source| IconLoadError::Decode {
            url: url.to_string(),
            source,
        })?
        .to_rgba8();

    let mut pixmap = Pixmap::new(rgba.width(), rgba.height())
        .ok_or_else(|| IconLoadError::Empty(url.to_string()))?;

    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(rgba.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }

    log::debug!(
        "Decoded icon {}: {}x{} pixels",
        url,
        pixmap.width(),
        pixmap.height()
    );
    Ok(pixmap)
}
