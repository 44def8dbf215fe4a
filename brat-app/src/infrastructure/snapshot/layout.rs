use crate::domain::Rgb;

pub const MAX_FONT_SIZE: f32 = 60.0;
pub const PADDING: f32 = 20.0;
pub const LINE_HEIGHT: f32 = 1.2;
pub const MAX_WIDTH: u32 = 2048;

/// `min(width / 10, 60)`.
pub fn font_size_for_width(container_width: f32) -> f32 {
    (container_width.max(0.0) / 10.0).min(MAX_FONT_SIZE)
}

/// Height of a 3:4 portrait surface.
pub fn height_for_width(width: u32) -> u32 {
    ((width as f32) * 4.0 / 3.0).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleFilter {
    /// Gaussian standard deviation in pixels.
    pub blur: f32,
    pub contrast: f32,
}

impl StyleFilter {
    pub const EXPORT: StyleFilter = StyleFilter {
        blur: 1.7,
        contrast: 1.25,
    };
    pub const THUMBNAIL: StyleFilter = StyleFilter {
        blur: 1.0,
        contrast: 1.25,
    };
    pub const NONE: StyleFilter = StyleFilter {
        blur: 0.0,
        contrast: 1.0,
    };
}

/// A laid-out snapshot, ready to rasterize.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    pub font_size: f32,
    pub background: Rgb,
    pub foreground: Rgb,
    pub lines: Vec<String>,
    pub filter: StyleFilter,
}

impl Surface {
    pub fn line_advance(&self) -> f32 {
        self.font_size * LINE_HEIGHT
    }

    /// Top of the first line box, centering the text block vertically.
    pub fn text_top(&self) -> f32 {
        let block = self.lines.len() as f32 * self.line_advance();
        (self.height as f32 - block) / 2.0
    }

    pub fn has_ink(&self) -> bool {
        self.lines.iter().any(|l| !l.trim().is_empty())
    }
}

/// Greedy word wrap that keeps explicit line breaks and runs of spaces.
/// Words wider than `max_width` stay on their own line and overflow.
pub fn wrap_lines(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for (i, word) in paragraph.split(' ').enumerate() {
            if i == 0 {
                line.push_str(word);
                continue;
            }
            let candidate = format!("{} {}", line, word);
            if line.trim().is_empty() || measure(&candidate) <= max_width {
                line = candidate;
            } else {
                lines.push(std::mem::take(&mut line));
                line.push_str(word);
            }
        }
        lines.push(line);
    }

    lines
}
