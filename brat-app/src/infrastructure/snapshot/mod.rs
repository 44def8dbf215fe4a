//! Renders a creation (text on a preset background) into a PNG.

mod export;
mod filters;
mod fonts;
mod glyph;
mod layout;

pub use export::{Download, NativeShare, PngImage, ShareMetadata, DEFAULT_FILENAME, PNG_CONTENT_TYPE};
pub use fonts::{FontBook, FONT_FAMILIES};
pub use layout::{
    font_size_for_width, height_for_width, StyleFilter, Surface, MAX_FONT_SIZE, MAX_WIDTH, PADDING,
};

use crate::domain::EditState;
use brat_errors::AppError;
use std::sync::Arc;
use tiny_skia::{Color, FillRule, Paint, Pixmap, PixmapPaint, Transform};

pub const DEFAULT_WIDTH: u32 = 448;

#[derive(Clone)]
pub struct SnapshotExporter {
    fonts: Arc<FontBook>,
}

impl SnapshotExporter {
    pub fn new(fonts: FontBook) -> Self {
        Self {
            fonts: Arc::new(fonts),
        }
    }

    pub fn has_font(&self) -> bool {
        self.fonts.has_face()
    }

    /// Lays out `state` on a `width`-pixel-wide portrait surface.
    pub fn render(&self, state: &EditState, width: u32, filter: StyleFilter) -> Result<Surface, AppError> {
        if width == 0 {
            return Err(AppError::RasterizationFailure(
                "surface has no width (not laid out yet)".to_string(),
            ));
        }
        if width > MAX_WIDTH {
            return Err(AppError::RasterizationFailure(format!(
                "surface width {} exceeds {}",
                width, MAX_WIDTH
            )));
        }

        let font_size = font_size_for_width(width as f32);
        let max_line_width = (width as f32 - 2.0 * PADDING).max(0.0);

        let lines = if state.text.trim().is_empty() {
            state.text.split('\n').map(str::to_string).collect()
        } else {
            self.fonts
                .with_face(|face| {
                    let scale = font_size / face.units_per_em() as f32;
                    layout::wrap_lines(&state.text, max_line_width, |line| {
                        line.chars().map(|c| glyph::advance(face, c)).sum::<f32>() * scale
                    })
                })
                .ok_or_else(|| AppError::RasterizationFailure("no usable font face".to_string()))?
        };

        Ok(Surface {
            width,
            height: height_for_width(width),
            font_size,
            background: state.preset.background_rgb(),
            foreground: state.preset.text_rgb(),
            lines,
            filter,
        })
    }

    /// Rasterizes and encodes `surface`.
    pub fn export(&self, surface: &Surface) -> Result<PngImage, AppError> {
        let mut canvas = Pixmap::new(surface.width, surface.height).ok_or_else(|| {
            AppError::RasterizationFailure(format!(
                "cannot allocate {}x{} surface",
                surface.width, surface.height
            ))
        })?;
        let bg = surface.background;
        canvas.fill(Color::from_rgba8(bg.0, bg.1, bg.2, 255));

        if surface.has_ink() {
            let text_layer = self.paint_text(surface)?;
            canvas.draw_pixmap(
                0,
                0,
                text_layer.as_ref(),
                &PixmapPaint::default(),
                Transform::identity(),
                None,
            );
        }

        let bytes = canvas.encode_png().map_err(|e| {
            tracing::error!("PNG encoding failed: {}", e);
            AppError::RasterizationFailure(e.to_string())
        })?;

        Ok(PngImage {
            bytes,
            width: surface.width,
            height: surface.height,
        })
    }

    /// `render` followed by `export`.
    pub fn snapshot(&self, state: &EditState, width: u32, filter: StyleFilter) -> Result<PngImage, AppError> {
        let result = self
            .render(state, width, filter)
            .and_then(|surface| self.export(&surface));
        if let Err(e) = &result {
            tracing::error!("Snapshot failed: {}", e);
        }
        result
    }

    fn paint_text(&self, surface: &Surface) -> Result<Pixmap, AppError> {
        let mut layer = Pixmap::new(surface.width, surface.height).ok_or_else(|| {
            AppError::RasterizationFailure("cannot allocate text layer".to_string())
        })?;

        let fg = surface.foreground;
        let mut paint = Paint::default();
        paint.set_color_rgba8(fg.0, fg.1, fg.2, 255);
        paint.anti_alias = true;

        self.fonts
            .with_face(|face| {
                let scale = surface.font_size / face.units_per_em() as f32;
                let ascent = face.ascender() as f32 * scale;
                let descent = face.descender() as f32 * scale;
                let half_leading = (surface.line_advance() - (ascent - descent)) / 2.0;

                for (i, line) in surface.lines.iter().enumerate() {
                    let line_width: f32 =
                        line.chars().map(|c| glyph::advance(face, c)).sum::<f32>() * scale;
                    let mut pen_x = (surface.width as f32 - line_width) / 2.0;
                    let baseline =
                        surface.text_top() + i as f32 * surface.line_advance() + half_leading + ascent;

                    for c in line.chars() {
                        if let Some(path) = glyph::glyph_path(face, c) {
                            layer.fill_path(
                                &path,
                                &paint,
                                FillRule::Winding,
                                glyph::glyph_transform(scale, pen_x, baseline),
                                None,
                            );
                        }
                        pen_x += glyph::advance(face, c) * scale;
                    }
                }
            })
            .ok_or_else(|| AppError::RasterizationFailure("no usable font face".to_string()))?;

        filters::gaussian_blur(&mut layer, surface.filter.blur);
        filters::contrast(&mut layer, surface.filter.contrast);
        Ok(layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{preset_or_default, EditState};

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn decode(image: &PngImage) -> Pixmap {
        Pixmap::decode_png(&image.bytes).unwrap()
    }

    fn blank_exporter() -> SnapshotExporter {
        SnapshotExporter::new(FontBook::empty())
    }

    fn system_exporter() -> Option<SnapshotExporter> {
        let exporter = SnapshotExporter::new(FontBook::system());
        if exporter.has_font() {
            Some(exporter)
        } else {
            eprintln!("skipping: no system font available");
            None
        }
    }

    #[test]
    fn test_blank_text_exports_background_only() {
        let state = EditState::new("   ".to_string(), Some("crash"));
        let image = blank_exporter().snapshot(&state, 300, StyleFilter::EXPORT).unwrap();

        assert_eq!(&image.bytes[..8], PNG_MAGIC);
        assert_eq!((image.width, image.height), (300, 400));
        let pixmap = decode(&image);
        let p = pixmap.pixel(150, 200).unwrap();
        assert_eq!((p.red(), p.green(), p.blue()), (0x01, 0x9b, 0xd9));
    }

    #[test]
    fn test_zero_width_is_a_rasterization_failure() {
        let state = EditState::default();
        let result = blank_exporter().render(&state, 0, StyleFilter::EXPORT);
        assert!(matches!(result, Err(AppError::RasterizationFailure(_))));
    }

    #[test]
    fn test_oversize_surface_is_rejected() {
        let state = EditState::new(String::new(), None);
        let result = blank_exporter().render(&state, MAX_WIDTH + 1, StyleFilter::EXPORT);
        assert!(matches!(result, Err(AppError::RasterizationFailure(_))));
    }

    #[test]
    fn test_text_without_font_fails_cleanly() {
        let result = blank_exporter().snapshot(&EditState::default(), 300, StyleFilter::EXPORT);
        assert!(matches!(result, Err(AppError::RasterizationFailure(_))));
    }

    #[test]
    fn test_render_uses_width_based_font_size() {
        let state = EditState::new(String::new(), Some("pop2"));
        let surface = blank_exporter().render(&state, 448, StyleFilter::EXPORT).unwrap();
        assert_eq!(surface.font_size, 44.8);
        let surface = blank_exporter().render(&state, 1200, StyleFilter::EXPORT).unwrap();
        assert_eq!(surface.font_size, MAX_FONT_SIZE);
        assert_eq!(surface.background, preset_or_default(Some("pop2")).background_rgb());
    }

    #[test]
    fn test_text_is_painted_in_foreground_color() {
        let Some(exporter) = system_exporter() else {
            return;
        };
        let state = EditState::new("BRAT".to_string(), Some("bratdeluxe"));
        let image = exporter.snapshot(&state, 300, StyleFilter::NONE).unwrap();
        let pixmap = decode(&image);

        let dark = pixmap.pixels().iter().filter(|p| p.red() < 64).count();
        let white = pixmap.pixels().iter().filter(|p| p.red() == 255).count();
        assert!(dark > 0, "expected text pixels");
        assert!(white > dark, "background should dominate");
        // Corners stay background.
        assert_eq!(pixmap.pixel(0, 0).unwrap().red(), 255);
    }

    #[test]
    fn test_long_text_wraps_within_padding() {
        let Some(exporter) = system_exporter() else {
            return;
        };
        let state = EditState::new(
            "so I hear you're making a brat generator and it is very green".to_string(),
            None,
        );
        let surface = exporter.render(&state, 300, StyleFilter::EXPORT).unwrap();
        assert!(surface.lines.len() > 1);
    }

    #[test]
    fn test_export_reflects_current_state() {
        let Some(exporter) = system_exporter() else {
            return;
        };
        let first = exporter
            .snapshot(&EditState::new("a".into(), None), 200, StyleFilter::EXPORT)
            .unwrap();
        let second = exporter
            .snapshot(&EditState::new("b".into(), None), 200, StyleFilter::EXPORT)
            .unwrap();
        assert_ne!(first.bytes, second.bytes);
    }
}
