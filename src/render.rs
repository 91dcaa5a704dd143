use image::{DynamicImage, RgbImage, RgbaImage};
use png::{BitDepth, ColorType, Encoder};
use tiny_skia::{Color, Paint, Path, PathBuilder, Pixmap, Stroke, Transform};

use crate::error::BoxError;
use crate::geometry::Rectangle;
use crate::page::PageLayout;

/// Rasterises a clipped region of a page.
pub trait RegionRenderer {
    fn render(
        &self,
        page: &PageLayout,
        clip: &Rectangle,
        scale: f32,
    ) -> Result<RenderedRegion, BoxError>;
}

/// RGB8 pixels produced by a [`RegionRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedRegion {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl RenderedRegion {
    pub fn from_image(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: image.into_raw(),
        }
    }

    pub fn to_png(&self) -> Result<Vec<u8>, BoxError> {
        encode_png(&self.pixels, self.width, self.height, ColorType::Rgb)
    }
}

/// Encode 8-bit raw samples as a PNG file in memory.
pub fn encode_png(
    data: &[u8],
    width: u32,
    height: u32,
    color: ColorType,
) -> Result<Vec<u8>, BoxError> {
    let mut buffer = Vec::new();
    let mut encoder = Encoder::new(&mut buffer, width, height);
    encoder.set_color(color);
    encoder.set_depth(BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(data)?;
    drop(writer);
    Ok(buffer)
}

/// Draws the page's vector path outlines in black on white.
///
/// Text, fills and embedded images are not rasterised.
#[derive(Debug, Clone)]
pub struct OutlineRenderer {
    /// Upper bound on output pixels; larger requests fail instead of allocating.
    pub max_pixels: u64,
    /// Stroke width in page units.
    pub line_width: f32,
}

impl Default for OutlineRenderer {
    fn default() -> Self {
        Self {
            max_pixels: 40_000_000,
            line_width: 1.0,
        }
    }
}

impl OutlineRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegionRenderer for OutlineRenderer {
    fn render(
        &self,
        page: &PageLayout,
        clip: &Rectangle,
        scale: f32,
    ) -> Result<RenderedRegion, BoxError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(BoxError::Render(format!("invalid scale {scale}")));
        }
        if !clip.is_finite() || clip.is_empty() {
            return Err(BoxError::Render(format!("empty clip {clip:?}")));
        }
        let width = (clip.width() * scale).ceil() as u32;
        let height = (clip.height() * scale).ceil() as u32;
        if u64::from(width) * u64::from(height) > self.max_pixels {
            return Err(BoxError::Render(format!(
                "{width}x{height} exceeds the {} pixel limit",
                self.max_pixels
            )));
        }
        let mut pixmap = Pixmap::new(width, height).ok_or_else(|| {
            BoxError::Render(format!("clip {clip:?} gives an unusable {width}x{height} canvas"))
        })?;
        pixmap.fill(Color::WHITE);

        let mut paint = Paint::default();
        paint.set_color(Color::BLACK);
        paint.anti_alias = true;
        let stroke = Stroke {
            width: self.line_width,
            ..Stroke::default()
        };
        let transform = Transform::from_scale(scale, scale).pre_translate(-clip.x0, -clip.y0);

        for shape in page.shapes.iter().filter(|s| s.rect.overlaps(clip)) {
            if let Some(path) = outline_path(&shape.polylines) {
                pixmap.stroke_path(&path, &paint, &stroke, transform, None);
            }
        }

        let rgba = RgbaImage::from_raw(width, height, pixmap.take())
            .ok_or_else(|| BoxError::Render("pixmap size mismatch".into()))?;
        Ok(RenderedRegion::from_image(DynamicImage::ImageRgba8(rgba).to_rgb8()))
    }
}

/// Polylines as one path. Non-finite points break the subpath they sit in.
fn outline_path(polylines: &[Vec<(f32, f32)>]) -> Option<Path> {
    let mut builder = PathBuilder::new();
    for polyline in polylines {
        let mut pen_down = false;
        for &(x, y) in polyline {
            if !(x.is_finite() && y.is_finite()) {
                pen_down = false;
                continue;
            }
            if pen_down {
                builder.line_to(x, y);
            } else {
                builder.move_to(x, y);
                pen_down = true;
            }
        }
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PageBounds;
    use crate::page::DrawingShape;

    fn page_with_box() -> PageLayout {
        PageLayout::from_rects(
            0,
            PageBounds::new(200.0, 200.0),
            &[Rectangle::new(10.0, 10.0, 60.0, 60.0)],
        )
    }

    #[test]
    fn renders_scaled_outline() {
        let clip = Rectangle::new(8.0, 8.0, 62.0, 62.0);
        let region = OutlineRenderer::new().render(&page_with_box(), &clip, 2.0).unwrap();
        assert_eq!((region.width, region.height), (108, 108));
        assert_eq!(region.pixels.len(), 108 * 108 * 3);

        let pixel = |x: usize, y: usize| {
            let at = (y * 108 + x) * 3;
            [region.pixels[at], region.pixels[at + 1], region.pixels[at + 2]]
        };
        // The box edge sits 2 clip units in, i.e. 4 pixels, stroked 2 pixels wide.
        assert!(pixel(4, 4)[0] < 64);
        assert!(pixel(50, 4)[0] < 64);
        assert!(pixel(4, 50)[0] < 64);
        assert_eq!(pixel(50, 50), [255, 255, 255]);
        assert_eq!(pixel(0, 0), [255, 255, 255]);
    }

    fn page_with_polyline(points: Vec<(f32, f32)>) -> PageLayout {
        let shape = DrawingShape {
            rect: Rectangle::new(0.0, 0.0, 60.0, 60.0),
            polylines: vec![points],
        };
        PageLayout::new(0, PageBounds::new(200.0, 200.0), vec![shape])
    }

    #[test]
    fn skips_non_finite_points() {
        let page = page_with_polyline(vec![(f32::NEG_INFINITY, 20.0), (50.0, 20.0), (50.0, 50.0)]);
        let clip = Rectangle::new(0.0, 0.0, 60.0, 60.0);
        let region = OutlineRenderer::new().render(&page, &clip, 2.0).unwrap();
        assert_eq!((region.width, region.height), (120, 120));
        // The finite remainder (50,20) -> (50,50) is still drawn.
        assert!(region.pixels[(70 * 120 + 100) * 3] < 64);
    }

    #[test]
    fn far_off_points_do_not_stall_rendering() {
        let page = page_with_polyline(vec![(-1e11, 20.0), (50.0, 20.0)]);
        let clip = Rectangle::new(0.0, 0.0, 60.0, 60.0);
        let region = OutlineRenderer::new().render(&page, &clip, 2.0).unwrap();
        assert_eq!((region.width, region.height), (120, 120));
    }

    #[test]
    fn rejects_oversized_regions() {
        let renderer = OutlineRenderer {
            max_pixels: 100,
            ..OutlineRenderer::default()
        };
        let clip = Rectangle::new(0.0, 0.0, 100.0, 100.0);
        assert!(matches!(
            renderer.render(&page_with_box(), &clip, 1.0),
            Err(BoxError::Render(_))
        ));
    }

    #[test]
    fn rejects_empty_clip() {
        let clip = Rectangle::new(10.0, 10.0, 10.0, 40.0);
        assert!(OutlineRenderer::new().render(&page_with_box(), &clip, 2.0).is_err());
    }

    #[test]
    fn png_output_has_signature() {
        let clip = Rectangle::new(0.0, 0.0, 20.0, 20.0);
        let png = OutlineRenderer::new()
            .render(&page_with_box(), &clip, 1.0)
            .unwrap()
            .to_png()
            .unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
