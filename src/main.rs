mod scene;

use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::Context;
use tokio::runtime::Handle;

use canvas_icon_layer::{CanvasIconLayer, FileIconSource, IconMarker, Layer, MapEvent};
use scene::{Scene, SnapshotMap};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args = std::env::args_os().skip(1);
    let (Some(scene_path), Some(out_path)) = (args.next(), args.next()) else {
        anyhow::bail!("usage: canvas-icon-layer <scene.json> <out.png>");
    };
    let scene_path = PathBuf::from(scene_path);
    let out_path = PathBuf::from(out_path);

    let scene = Scene::load(&scene_path)?;
    let source = Arc::new(FileIconSource::new(scene.icon_base(&scene_path)));
    let mut layer = CanvasIconLayer::new(scene.options.clone(), source, Handle::current());

    layer.attach(Rc::new(SnapshotMap::new(scene.center, scene.zoom, scene.size)));
    for marker in &scene.markers {
        layer
            .add_marker(IconMarker::new(marker.position, marker.icon.clone()).into_ref())
            .with_context(|| format!("Invalid marker at {:?}", marker.position))?;
    }
    layer.handle_event(&MapEvent::MoveEnd);

    while layer.pending_icons() > 0 {
        layer.icon_ready().await;
    }

    let image = layer
        .surface()
        .to_rgba_image()
        .context("Scene viewport has no area")?;
    image
        .save(&out_path)
        .with_context(|| format!("Failed to write {}", out_path.display()))?;

    log::info!(
        "Rendered {} markers into {}x{} {}",
        layer.len(),
        image.width(),
        image.height(),
        out_path.display()
    );
    Ok(())
}
