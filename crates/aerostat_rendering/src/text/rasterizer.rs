//! Text rasterization into an 8-bit alpha surface.

use fontdue::{Font, FontSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_FACTOR: f32 = 1.1;

/// Font loading failures.
#[derive(Debug, Error)]
pub enum FontError {
    /// The font file could not be parsed.
    #[error("font parse failed: {0}")]
    Parse(String),
    /// The font did not become available in time.
    #[error("font not ready after {waited_ms} ms")]
    Timeout {
        /// How long the caller waited.
        waited_ms: u64,
    },
}

/// Family, weight and pixel size of the text font.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontDescriptor {
    /// Font family name.
    pub family: String,
    /// CSS weight (100..=900).
    pub weight: u16,
    /// Size in pixels.
    pub size_px: f32,
}

impl FontDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(family: impl Into<String>, weight: u16, size_px: f32) -> Self {
        Self {
            family: family.into(),
            weight,
            size_px,
        }
    }

    /// CSS shorthand, e.g. `800 80px Poppins`.
    #[must_use]
    pub fn css(&self) -> String {
        format!("{} {}px {}", self.weight, self.size_px, self.family)
    }

    /// Line height in pixels.
    #[inline]
    #[must_use]
    pub fn line_height(&self) -> f32 {
        LINE_HEIGHT_FACTOR * self.size_px
    }
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self::new("Poppins", 800, 80.0)
    }
}

/// Measured size of a multi-line string, in whole pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextBox {
    /// Width of the widest line.
    pub width: u32,
    /// Line count times line height.
    pub height: u32,
}

impl TextBox {
    /// Creates a box.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True if either side is zero.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Row-major 8-bit coverage buffer, reused between sampling passes.
#[derive(Debug, Clone, Default)]
pub struct AlphaSurface {
    width: u32,
    height: u32,
    alpha: Vec<u8>,
}

impl AlphaSurface {
    /// Creates an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Width in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Resizes and zeroes the surface, keeping the allocation.
    pub fn resize_and_clear(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.alpha.clear();
        self.alpha.resize(width as usize * height as usize, 0);
    }

    /// Coverage at a pixel, 0 outside the surface.
    #[inline]
    #[must_use]
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.alpha[y as usize * self.width as usize + x as usize]
    }

    /// Combines coverage with `max`, clipping signed coordinates.
    #[inline]
    pub fn blend_max(&mut self, x: i32, y: i32, alpha: u8) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.alpha[index] = self.alpha[index].max(alpha);
    }

    /// Fills an axis-aligned rectangle with antialiased edges.
    ///
    /// Partially covered pixels receive proportional (never zero) alpha.
    pub fn fill_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32) {
        let (x0, x1) = (x0.min(x1), x0.max(x1));
        let (y0, y1) = (y0.min(y1), y0.max(y1));
        if x1 <= 0.0 || y1 <= 0.0 || x0 >= self.width as f32 || y0 >= self.height as f32 {
            return;
        }
        let px_start = x0.floor().max(0.0) as i32;
        let px_end = x1.ceil().min(self.width as f32) as i32;
        let py_start = y0.floor().max(0.0) as i32;
        let py_end = y1.ceil().min(self.height as f32) as i32;

        for py in py_start..py_end {
            let cover_y = (y1.min(py as f32 + 1.0) - y0.max(py as f32)).max(0.0);
            for px in px_start..px_end {
                let cover_x = (x1.min(px as f32 + 1.0) - x0.max(px as f32)).max(0.0);
                let coverage = cover_x * cover_y;
                if coverage > 0.0 {
                    let alpha = (coverage * 255.0).ceil().clamp(1.0, 255.0) as u8;
                    self.blend_max(px, py, alpha);
                }
            }
        }
    }

    /// Number of pixels with non-zero coverage.
    #[must_use]
    pub fn covered_pixels(&self) -> usize {
        self.alpha.iter().filter(|&&a| a > 0).count()
    }
}

/// Draws text lines into an [`AlphaSurface`].
pub trait TextRasterizer: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Horizontal advance of a whole line, in pixels.
    fn line_advance(&self, line: &str, font: &FontDescriptor) -> f32;

    /// Draws `line` starting at `x` with its baseline at `baseline`.
    fn draw_line(
        &self,
        surface: &mut AlphaSurface,
        line: &str,
        x: f32,
        baseline: f32,
        font: &FontDescriptor,
    );

    /// Measures a multi-line string: widest line by line count times the
    /// line height.
    fn measure(&self, text: &str, font: &FontDescriptor) -> TextBox {
        let mut widest = 0.0_f32;
        let mut lines = 0_u32;
        for line in text.split('\n') {
            widest = widest.max(self.line_advance(line, font));
            lines += 1;
        }
        TextBox::new(
            widest.ceil().max(0.0) as u32,
            (lines as f32 * font.line_height()).ceil() as u32,
        )
    }
}

/// Fallback rasterizer used while the real font is not available.
///
/// Every visible character is a solid block standing on the baseline.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockRasterizer;

impl BlockRasterizer {
    const ADVANCE_EM: f32 = 0.6;
    const BLOCK_WIDTH_EM: f32 = 0.55;
    const BLOCK_HEIGHT_EM: f32 = 0.7;
}

impl TextRasterizer for BlockRasterizer {
    fn name(&self) -> &'static str {
        "blocks"
    }

    fn line_advance(&self, line: &str, font: &FontDescriptor) -> f32 {
        line.chars().count() as f32 * Self::ADVANCE_EM * font.size_px
    }

    fn draw_line(
        &self,
        surface: &mut AlphaSurface,
        line: &str,
        x: f32,
        baseline: f32,
        font: &FontDescriptor,
    ) {
        let em = font.size_px;
        for (i, ch) in line.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = x + i as f32 * Self::ADVANCE_EM * em;
            surface.fill_rect(
                left,
                baseline - Self::BLOCK_HEIGHT_EM * em,
                left + Self::BLOCK_WIDTH_EM * em,
                baseline,
            );
        }
    }
}

/// Glyph rasterizer backed by `fontdue`.
pub struct FontdueRasterizer {
    font: Font,
}

impl std::fmt::Debug for FontdueRasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontdueRasterizer")
            .field("name", &self.font.name())
            .finish()
    }
}

impl FontdueRasterizer {
    /// Parses a TrueType/OpenType font.
    ///
    /// # Errors
    ///
    /// Returns [`FontError::Parse`] if the bytes are not a usable font.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FontError> {
        let font = Font::from_bytes(bytes, FontSettings::default())
            .map_err(|e| FontError::Parse(e.to_string()))?;
        Ok(Self { font })
    }
}

impl TextRasterizer for FontdueRasterizer {
    fn name(&self) -> &'static str {
        "fontdue"
    }

    fn line_advance(&self, line: &str, font: &FontDescriptor) -> f32 {
        line.chars()
            .map(|ch| self.font.metrics(ch, font.size_px).advance_width)
            .sum()
    }

    fn draw_line(
        &self,
        surface: &mut AlphaSurface,
        line: &str,
        x: f32,
        baseline: f32,
        font: &FontDescriptor,
    ) {
        let mut pen = x;
        for ch in line.chars() {
            let (metrics, bitmap) = self.font.rasterize(ch, font.size_px);
            // ymin is the offset of the bitmap bottom from the baseline, up positive.
            let left = (pen + metrics.xmin as f32).round() as i32;
            let top = (baseline - (metrics.height as i32 + metrics.ymin) as f32).round() as i32;
            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let alpha = bitmap[row * metrics.width + col];
                    if alpha > 0 {
                        surface.blend_max(left + col as i32, top + row as i32, alpha);
                    }
                }
            }
            pen += metrics.advance_width;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_measure_uses_line_height() {
        let font = FontDescriptor::default();
        let size = BlockRasterizer.measure("Hi\nBye", &font);
        assert_eq!(size.width, (3.0 * 0.6 * 80.0_f32).ceil() as u32);
        assert_eq!(size.height, (2.0 * 1.1 * 80.0_f32).ceil() as u32);
    }

    #[test]
    fn test_empty_text_measures_zero_width() {
        let size = BlockRasterizer.measure("", &FontDescriptor::default());
        assert_eq!(size.width, 0);
        assert!(size.is_empty());
    }

    #[test]
    fn test_fill_rect_partial_coverage_is_nonzero() {
        let mut surface = AlphaSurface::new();
        surface.resize_and_clear(4, 4);
        surface.fill_rect(0.9, 0.9, 2.1, 2.1);
        assert!(surface.alpha_at(0, 0) > 0);
        assert_eq!(surface.alpha_at(1, 1), 255);
        assert!(surface.alpha_at(2, 2) > 0);
        assert_eq!(surface.alpha_at(3, 3), 0);
    }

    #[test]
    fn test_fill_rect_clips_to_surface() {
        let mut surface = AlphaSurface::new();
        surface.resize_and_clear(2, 2);
        surface.fill_rect(-5.0, -5.0, 50.0, 50.0);
        assert_eq!(surface.covered_pixels(), 4);
    }

    #[test]
    fn test_block_skips_whitespace() {
        let font = FontDescriptor::new("Test", 400, 10.0);
        let mut surface = AlphaSurface::new();
        surface.resize_and_clear(30, 11);
        BlockRasterizer.draw_line(&mut surface, "a b", 0.0, 8.0, &font);
        // The space leaves columns 6..11 empty.
        assert_eq!(surface.alpha_at(7, 5), 0);
        assert!(surface.alpha_at(2, 5) > 0);
        assert!(surface.alpha_at(13, 5) > 0);
    }

    #[test]
    fn test_invalid_font_bytes() {
        let result = FontdueRasterizer::from_bytes(b"not a font");
        assert!(matches!(result, Err(FontError::Parse(_))));
    }

    #[test]
    fn test_font_css() {
        assert_eq!(FontDescriptor::default().css(), "800 80px Poppins");
    }
}
