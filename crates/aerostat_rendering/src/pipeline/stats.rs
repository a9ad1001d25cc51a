//! Rendering statistics.

/// Running totals kept by a renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames presented.
    pub frames: u64,
    /// Passes submitted.
    pub passes: u64,
    /// Instances submitted, dirty or not.
    pub instances: u64,
    /// Instance bytes that had to be uploaded.
    pub bytes_uploaded: u64,
    /// Visible scene objects submitted.
    pub visible_objects: u64,
    /// Batches skipped because nothing changed.
    pub clean_batches: u64,
}

impl RenderStats {
    /// Average uploaded bytes per frame.
    #[must_use]
    pub fn bytes_per_frame(&self) -> f64 {
        if self.frames > 0 {
            self.bytes_uploaded as f64 / self.frames as f64
        } else {
            0.0
        }
    }

    /// Average passes per frame.
    #[must_use]
    pub fn passes_per_frame(&self) -> f64 {
        if self.frames > 0 {
            self.passes as f64 / self.frames as f64
        } else {
            0.0
        }
    }
}
