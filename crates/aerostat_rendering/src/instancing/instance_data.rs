//! Instance data structures for GPU upload.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Quat, Vec3};

/// Per-instance placement matrix, column-major.
///
/// Memory layout matches a `mat4x4<f32>` vertex attribute (4 x vec4).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceTransform {
    /// Column-major 4x4 matrix.
    pub matrix: [[f32; 4]; 4],
}

impl InstanceTransform {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Wraps a glam matrix.
    #[inline]
    #[must_use]
    pub fn from_mat4(matrix: Mat4) -> Self {
        Self {
            matrix: matrix.to_cols_array_2d(),
        }
    }

    /// Builds a uniform-scale placement.
    #[inline]
    #[must_use]
    pub fn from_parts(scale: f32, rotation: Quat, translation: Vec3) -> Self {
        Self::from_mat4(Mat4::from_scale_rotation_translation(
            Vec3::splat(scale),
            rotation,
            translation,
        ))
    }

    /// A zero-scale matrix: the slot exists but draws nothing.
    #[inline]
    #[must_use]
    pub fn hidden() -> Self {
        Self::from_parts(0.0, Quat::IDENTITY, Vec3::ZERO)
    }

    /// Back to a glam matrix.
    #[inline]
    #[must_use]
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.matrix)
    }

    /// Uniform scale encoded in the matrix (length of the X basis).
    #[inline]
    #[must_use]
    pub fn uniform_scale(&self) -> f32 {
        Vec3::new(self.matrix[0][0], self.matrix[0][1], self.matrix[0][2]).length()
    }

    /// Translation column.
    #[inline]
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.matrix[3][0], self.matrix[3][1], self.matrix[3][2])
    }
}

impl Default for InstanceTransform {
    fn default() -> Self {
        Self::hidden()
    }
}

/// Per-instance vertex colour (linear RGB).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct InstanceColor {
    /// Red, green, blue in `[0, 1]`.
    pub rgb: [f32; 3],
}

impl InstanceColor {
    /// Size in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Creates a colour.
    #[inline]
    #[must_use]
    pub const fn new(rgb: [f32; 3]) -> Self {
        Self { rgb }
    }
}
