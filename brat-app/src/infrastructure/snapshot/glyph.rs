//! Glyph outlines as tiny-skia paths.

use tiny_skia::{Path, PathBuilder, Transform};

/// Collects ttf-parser outline commands into a path in font units (y-up).
pub struct GlyphOutlineBuilder {
    builder: PathBuilder,
}

impl GlyphOutlineBuilder {
    pub fn new() -> Self {
        Self {
            builder: PathBuilder::new(),
        }
    }

    pub fn finish(self) -> Option<Path> {
        self.builder.finish()
    }
}

impl Default for GlyphOutlineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ttf_parser::OutlineBuilder for GlyphOutlineBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// Outline of the glyph for `c`, falling back to `.notdef`. Whitespace has none.
pub fn glyph_path(face: &ttf_parser::Face<'_>, c: char) -> Option<Path> {
    let glyph = face.glyph_index(c).unwrap_or(ttf_parser::GlyphId(0));
    let mut builder = GlyphOutlineBuilder::new();
    face.outline_glyph(glyph, &mut builder)?;
    builder.finish()
}

/// Horizontal advance of `c` in font units.
pub fn advance(face: &ttf_parser::Face<'_>, c: char) -> f32 {
    let glyph = face.glyph_index(c).unwrap_or(ttf_parser::GlyphId(0));
    face.glyph_hor_advance(glyph).unwrap_or(0) as f32
}

/// Maps font units to pixels with the pen at (`x`, `baseline`), flipping y.
#[inline]
pub fn glyph_transform(scale: f32, x: f32, baseline: f32) -> Transform {
    Transform::from_row(scale, 0.0, 0.0, -scale, x, baseline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttf_parser::OutlineBuilder;

    #[test]
    fn test_builder_produces_path() {
        let mut builder = GlyphOutlineBuilder::new();
        builder.move_to(0.0, 0.0);
        builder.line_to(10.0, 0.0);
        builder.quad_to(15.0, 5.0, 10.0, 10.0);
        builder.curve_to(8.0, 12.0, 2.0, 12.0, 0.0, 10.0);
        builder.close();

        let path = builder.finish().unwrap();
        let bounds = path.bounds();
        assert_eq!(bounds.left(), 0.0);
        assert!(bounds.right() > 10.0);
    }

    #[test]
    fn test_empty_builder_has_no_path() {
        assert!(GlyphOutlineBuilder::new().finish().is_none());
    }

    #[test]
    fn test_transform_flips_y() {
        let t = glyph_transform(0.5, 10.0, 40.0);
        assert_eq!(t.sx, 0.5);
        assert_eq!(t.sy, -0.5);
        assert_eq!(t.tx, 10.0);
        assert_eq!(t.ty, 40.0);
    }
}
