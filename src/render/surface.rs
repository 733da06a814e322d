//! The shared raster surface every marker is drawn into

use image::RgbaImage;
use tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint, Transform};

use crate::domain::{Point, Rect, Size};

/// How the host should treat the surface while a zoom animation runs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ZoomBehavior {
    /// Surface is transformed along with the map
    #[default]
    Animated,
    /// Surface is hidden until the zoom settles
    Hide,
}

/// Raster surface sized to the host viewport
///
/// A zero-sized viewport leaves the surface without pixels; every drawing
/// call is then a no-op.
#[derive(Debug, Default)]
pub struct DrawingSurface {
    pixmap: Option<Pixmap>,
    size: Size,
    origin: Point,
    interactive: bool,
    zoom_behavior: ZoomBehavior,
    z_index: Option<i32>,
}

impl DrawingSurface {
    pub fn new(size: Size) -> Self {
        let mut surface = Self::default();
        surface.resize(size);
        surface
    }

    /// Reallocate to `size`. Previous contents are discarded.
    pub fn resize(&mut self, size: Size) {
        self.size = size;
        self.pixmap = Pixmap::new(size.width, size.height);
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Top-left of the surface in the host's pane coordinates
    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Whether the pointer is over a marker
    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn zoom_behavior(&self) -> ZoomBehavior {
        self.zoom_behavior
    }

    pub fn set_zoom_behavior(&mut self, behavior: ZoomBehavior) {
        self.zoom_behavior = behavior;
    }

    pub fn z_index(&self) -> Option<i32> {
        self.z_index
    }

    pub fn set_z_index(&mut self, z_index: Option<i32>) {
        self.z_index = z_index;
    }

    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    /// Erase everything drawn
    pub fn clear(&mut self) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(Color::TRANSPARENT);
        }
    }

    /// Draw `image` stretched into `dest`, axis aligned. Pixels outside the
    /// surface are clipped.
    pub fn draw_image(&mut self, image: &Pixmap, dest: Rect) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        if dest.width() <= 0.0 || dest.height() <= 0.0 {
            return;
        }

        let sx = (dest.width() / f64::from(image.width())) as f32;
        let sy = (dest.height() / f64::from(image.height())) as f32;
        let transform = Transform::from_row(sx, 0.0, 0.0, sy, dest.left as f32, dest.top as f32);
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..Default::default()
        };
        pixmap.draw_pixmap(0, 0, image.as_ref(), &paint, transform, None);
    }

    /// Alpha of one surface pixel, 0 outside the surface
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        self.pixmap
            .as_ref()
            .and_then(|pixmap| pixmap.pixel(x, y))
            .map_or(0, |px| px.alpha())
    }

    /// True when nothing visible has been drawn
    pub fn is_blank(&self) -> bool {
        self.pixmap
            .as_ref()
            .is_none_or(|pixmap| pixmap.pixels().iter().all(|px| px.alpha() == 0))
    }

    /// Copy the surface out as straight-alpha RGBA
    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        let pixmap = self.pixmap.as_ref()?;
        let mut raw = Vec::with_capacity(pixmap.pixels().len() * 4);
        for px in pixmap.pixels() {
            let color = px.demultiply();
            raw.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
        }
        RgbaImage::from_raw(pixmap.width(), pixmap.height(), raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red(width: u32, height: u32) -> Pixmap {
        let mut pixmap = Pixmap::new(width, height).unwrap();
        pixmap.fill(Color::from_rgba8(255, 0, 0, 255));
        pixmap
    }

    #[test]
    fn test_zero_size_surface_ignores_drawing() {
        let mut surface = DrawingSurface::new(Size::new(0, 100));
        assert!(surface.pixmap().is_none());
        surface.draw_image(&red(4, 4), Rect::from_origin_size(Point::ORIGIN, 4.0, 4.0));
        assert!(surface.is_blank());
        assert!(surface.to_rgba_image().is_none());
    }

    #[test]
    fn test_draw_image_lands_in_dest_rect() {
        let mut surface = DrawingSurface::new(Size::new(50, 50));
        surface.draw_image(
            &red(8, 8),
            Rect::from_origin_size(Point::new(10.0, 20.0), 8.0, 8.0),
        );
        assert_eq!(surface.alpha_at(14, 24), 255);
        assert_eq!(surface.alpha_at(5, 5), 0);
        assert_eq!(surface.alpha_at(30, 30), 0);
    }

    #[test]
    fn test_draw_image_scales_to_dest() {
        let mut surface = DrawingSurface::new(Size::new(50, 50));
        surface.draw_image(
            &red(2, 2),
            Rect::from_origin_size(Point::new(0.0, 0.0), 20.0, 10.0),
        );
        assert_eq!(surface.alpha_at(17, 5), 255);
        assert_eq!(surface.alpha_at(5, 15), 0);
    }

    #[test]
    fn test_clear_and_resize_wipe_contents() {
        let mut surface = DrawingSurface::new(Size::new(20, 20));
        let dest = Rect::from_origin_size(Point::ORIGIN, 4.0, 4.0);

        surface.draw_image(&red(4, 4), dest);
        assert!(!surface.is_blank());
        surface.clear();
        assert!(surface.is_blank());

        surface.draw_image(&red(4, 4), dest);
        surface.resize(Size::new(30, 10));
        assert!(surface.is_blank());
        assert_eq!(surface.size(), Size::new(30, 10));
    }

    #[test]
    fn test_export_demultiplies() {
        let mut surface = DrawingSurface::new(Size::new(4, 4));
        surface.draw_image(&red(4, 4), Rect::from_origin_size(Point::ORIGIN, 4.0, 4.0));
        let img = surface.to_rgba_image().unwrap();
        assert_eq!(img.get_pixel(1, 1).0, [255, 0, 0, 255]);
    }
}
