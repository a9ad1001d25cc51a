//! Glyph mask sampling: text in, per-pixel occupancy out.

use thiserror::Error;

use super::rasterizer::{AlphaSurface, FontDescriptor, TextBox, TextRasterizer};

/// Sampling failures. Callers recover with an empty point set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SampleError {
    /// The measured text box has no area.
    #[error("empty text layout ({width}x{height})")]
    EmptyLayout {
        /// Measured width in pixels.
        width: u32,
        /// Measured height in pixels.
        height: u32,
    },
}

/// One boolean per raster pixel, row-major.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OccupancyGrid {
    width: u32,
    height: u32,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    /// An all-empty grid of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width as usize * height as usize],
        }
    }

    /// A zero-sized grid.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a grid from a predicate over `(x, y)`.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut occupied: impl FnMut(u32, u32) -> bool) -> Self {
        let mut grid = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if occupied(x, y) {
                    grid.set(x as i32, y as i32, true);
                }
            }
        }
        grid
    }

    /// Width in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            None
        } else {
            Some(y as usize * self.width as usize + x as usize)
        }
    }

    /// True if the cell is inside the grid and occupied.
    #[inline]
    #[must_use]
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some_and(|i| self.cells[i])
    }

    /// Sets a cell. Out-of-range writes are ignored.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, occupied: bool) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = occupied;
        }
    }

    /// Number of occupied cells.
    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Occupied cells in row-major order.
    pub fn iter_occupied(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let width = self.width.max(1) as usize;
        self.cells
            .iter()
            .enumerate()
            .filter(|&(_, &c)| c)
            .map(move |(i, _)| ((i % width) as i32, (i / width) as i32))
    }
}

/// Renders text into a reusable surface and thresholds it.
#[derive(Debug, Default)]
pub struct GlyphMaskSampler {
    surface: AlphaSurface,
    passes: u64,
}

impl GlyphMaskSampler {
    /// Creates a sampler with an empty surface.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful passes.
    #[must_use]
    pub const fn passes(&self) -> u64 {
        self.passes
    }

    /// Rasterizes `text` into a `text_box`-sized surface.
    ///
    /// Line `i` of `n` sits on baseline `(i + 0.8) * height / n`. A cell is
    /// occupied when its alpha is non-zero.
    ///
    /// # Errors
    ///
    /// [`SampleError::EmptyLayout`] when the box has zero width or height.
    pub fn sample(
        &mut self,
        rasterizer: &dyn TextRasterizer,
        text: &str,
        text_box: TextBox,
        font: &FontDescriptor,
    ) -> Result<OccupancyGrid, SampleError> {
        if text_box.is_empty() {
            return Err(SampleError::EmptyLayout {
                width: text_box.width,
                height: text_box.height,
            });
        }

        self.surface.resize_and_clear(text_box.width, text_box.height);
        let lines: Vec<&str> = text.split('\n').collect();
        let line_count = lines.len() as f32;
        for (i, line) in lines.iter().enumerate() {
            let baseline = (i as f32 + 0.8) * text_box.height as f32 / line_count;
            rasterizer.draw_line(&mut self.surface, line, 0.0, baseline, font);
        }

        let surface = &self.surface;
        let grid = OccupancyGrid::from_fn(text_box.width, text_box.height, |x, y| {
            surface.alpha_at(x, y) > 0
        });
        self.passes += 1;

        tracing::debug!(
            rasterizer = rasterizer.name(),
            font = %font.css(),
            width = text_box.width,
            height = text_box.height,
            occupied = grid.occupied_count(),
            "Sampled glyph mask"
        );
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::BlockRasterizer;

    fn font() -> FontDescriptor {
        FontDescriptor::new("Test", 800, 20.0)
    }

    #[test]
    fn test_zero_width_is_empty_layout() {
        let mut sampler = GlyphMaskSampler::new();
        let result = sampler.sample(&BlockRasterizer, "", TextBox::new(0, 22), &font());
        assert_eq!(result, Err(SampleError::EmptyLayout { width: 0, height: 22 }));
        assert_eq!(sampler.passes(), 0);
    }

    #[test]
    fn test_sample_hi_is_non_empty() {
        let mut sampler = GlyphMaskSampler::new();
        let font = font();
        let text_box = BlockRasterizer.measure("Hi", &font);
        let grid = sampler.sample(&BlockRasterizer, "Hi", text_box, &font).unwrap();
        assert!(grid.occupied_count() > 0);
        assert_eq!(grid.width(), text_box.width);
    }

    #[test]
    fn test_sample_is_deterministic_with_reused_surface() {
        let mut sampler = GlyphMaskSampler::new();
        let font = font();
        let text_box = BlockRasterizer.measure("We are\nWhoosh!!", &font);
        let a = sampler
            .sample(&BlockRasterizer, "We are\nWhoosh!!", text_box, &font)
            .unwrap();
        let _ = sampler
            .sample(&BlockRasterizer, "x", BlockRasterizer.measure("x", &font), &font)
            .unwrap();
        let b = sampler
            .sample(&BlockRasterizer, "We are\nWhoosh!!", text_box, &font)
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_second_line_sits_lower() {
        let mut sampler = GlyphMaskSampler::new();
        let font = font();
        let text_box = BlockRasterizer.measure("a\nb", &font);
        let grid = sampler.sample(&BlockRasterizer, "a\nb", text_box, &font).unwrap();
        let half = text_box.height as i32 / 2;
        assert!(grid.iter_occupied().any(|(_, y)| y < half));
        assert!(grid.iter_occupied().any(|(_, y)| y >= half));
    }

    #[test]
    fn test_iter_occupied_row_major() {
        let grid = OccupancyGrid::from_fn(3, 2, |x, y| (x + y) % 2 == 0);
        let cells: Vec<_> = grid.iter_occupied().collect();
        assert_eq!(cells, vec![(0, 0), (2, 0), (1, 1)]);
    }
}
