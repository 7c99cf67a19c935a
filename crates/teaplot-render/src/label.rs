//! CPU rasterization of text labels into fixed-size RGBA canvases.

use cosmic_text::{Attrs, Buffer, FontSystem, Metrics, Shaping, SwashCache};
use teaplot_core::profiling::profile_function;

pub const LABEL_CANVAS_WIDTH: u32 = 300;
pub const LABEL_CANVAS_HEIGHT: u32 = 150;
/// Inset of the text from the canvas' top-left corner, in pixels.
pub const LABEL_BORDER: f32 = 4.0;

/// An RGBA8 canvas, row-major, unpremultiplied.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelBitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl LabelBitmap {
    fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 0)
    }

    fn blend(&mut self, x: i32, y: i32, rgb: [u8; 3], alpha: u8) {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 || alpha == 0 {
            return;
        }
        let offset = ((y as u32 * self.width + x as u32) * 4) as usize;
        let px = &mut self.pixels[offset..offset + 4];
        if alpha >= px[3] {
            px[..3].copy_from_slice(&rgb);
            px[3] = alpha;
        }
    }
}

/// Renders label text with black glyphs on a transparent canvas.
pub struct LabelRasterizer {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

impl LabelRasterizer {
    pub fn new() -> Self {
        Self::with_font_system(FontSystem::new())
    }

    pub fn with_font_system(font_system: FontSystem) -> Self {
        Self {
            font_system,
            swash_cache: SwashCache::new(),
        }
    }

    pub fn rasterize(&mut self, text: &str, font_size: f32) -> LabelBitmap {
        profile_function!();

        let mut bitmap = LabelBitmap::transparent(LABEL_CANVAS_WIDTH, LABEL_CANVAS_HEIGHT);
        if text.is_empty() {
            return bitmap;
        }

        let metrics = Metrics::new(font_size, font_size * 1.2);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        buffer.set_size(
            &mut self.font_system,
            Some(LABEL_CANVAS_WIDTH as f32 - LABEL_BORDER),
            Some(LABEL_CANVAS_HEIGHT as f32 - LABEL_BORDER),
        );
        buffer.set_text(&mut self.font_system, text, Attrs::new(), Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let origin = LABEL_BORDER as i32;
        buffer.draw(
            &mut self.font_system,
            &mut self.swash_cache,
            cosmic_text::Color::rgb(0, 0, 0),
            |x, y, w, h, color| {
                for dy in 0..h as i32 {
                    for dx in 0..w as i32 {
                        bitmap.blend(
                            origin + x + dx,
                            origin + y + dy,
                            [color.r(), color.g(), color.b()],
                            color.a(),
                        );
                    }
                }
            },
        );

        tracing::trace!("Rasterized label {:?} at {}px", text, font_size);
        bitmap
    }
}

impl Default for LabelRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_label_is_transparent() {
        let mut rasterizer = LabelRasterizer::with_font_system(FontSystem::new_with_locale_and_db(
            "en-US".to_string(),
            cosmic_text::fontdb::Database::new(),
        ));
        let bitmap = rasterizer.rasterize("", 45.0);

        assert_eq!(bitmap.width, LABEL_CANVAS_WIDTH);
        assert_eq!(bitmap.height, LABEL_CANVAS_HEIGHT);
        assert_eq!(bitmap.pixels.len(), (300 * 150 * 4) as usize);
        assert!(bitmap.is_blank());
    }

    #[test]
    fn test_canvas_size_does_not_depend_on_text() {
        let mut rasterizer = LabelRasterizer::new();
        let short = rasterizer.rasterize("0", 45.0);
        let long = rasterizer.rasterize("a much longer label than fits on the canvas", 70.0);

        assert_eq!(short.pixels.len(), long.pixels.len());
    }

    #[test]
    fn test_blend_clips_out_of_bounds() {
        let mut bitmap = LabelBitmap::transparent(2, 2);
        bitmap.blend(-1, 0, [0, 0, 0], 255);
        bitmap.blend(2, 1, [0, 0, 0], 255);
        assert!(bitmap.is_blank());

        bitmap.blend(1, 1, [0, 0, 0], 200);
        bitmap.blend(1, 1, [0, 0, 0], 100);
        assert_eq!(bitmap.pixels[15], 200);
    }
}
