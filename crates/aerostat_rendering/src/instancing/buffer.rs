//! CPU staging buffers for instanced rendering.
//!
//! Fixed length between resizes so particle slot `i` is always instance `i`.

use bytemuck::Pod;

/// Fixed-length staging buffer with a per-frame dirty version.
pub struct InstanceBuffer<T: Pod> {
    /// Staging data, one entry per instance slot.
    data: Vec<T>,
    /// Bumped once per rewrite.
    version: u64,
    /// Version last acknowledged by the renderer.
    uploaded_version: u64,
}

impl<T: Pod> std::fmt::Debug for InstanceBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceBuffer")
            .field("len", &self.data.len())
            .field("version", &self.version)
            .field("uploaded_version", &self.uploaded_version)
            .finish()
    }
}

impl<T: Pod + Default> InstanceBuffer<T> {
    /// Creates a buffer of `len` default instances.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            data: vec![T::default(); len],
            version: 0,
            uploaded_version: 0,
        }
    }

    /// Recreates the buffer at a new length, all slots default.
    ///
    /// Does not bump the version; the writer marks the buffer dirty once
    /// after filling the new slots.
    pub fn resize(&mut self, len: usize) {
        self.data.clear();
        self.data.resize(len, T::default());
    }
}

impl<T: Pod> InstanceBuffer<T> {
    /// Number of instance slots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if there are no slots.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Writes slot `index`. Returns false when out of range.
    #[inline]
    pub fn set(&mut self, index: usize, value: T) -> bool {
        match self.data.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Reads slot `index`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }

    /// All slots.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// All slots as bytes for GPU upload.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Flags the buffer for upload. Call once per frame after writing.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.version += 1;
    }

    /// Number of rewrites so far.
    #[inline]
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// True if written since the renderer last acknowledged an upload.
    #[inline]
    #[must_use]
    pub const fn needs_upload(&self) -> bool {
        self.version != self.uploaded_version
    }

    /// Called after the renderer consumed the bytes.
    #[inline]
    pub fn acknowledge_upload(&mut self) {
        self.uploaded_version = self.version;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instancing::InstanceTransform;

    #[test]
    fn test_new_buffer_is_clean() {
        let buffer: InstanceBuffer<InstanceTransform> = InstanceBuffer::new(4);
        assert_eq!(buffer.len(), 4);
        assert!(!buffer.needs_upload());
        assert_eq!(buffer.as_bytes().len(), 4 * InstanceTransform::SIZE);
    }

    #[test]
    fn test_dirty_cycle() {
        let mut buffer: InstanceBuffer<InstanceTransform> = InstanceBuffer::new(2);
        assert!(buffer.set(1, InstanceTransform::hidden()));
        assert!(!buffer.set(2, InstanceTransform::hidden()));

        buffer.mark_dirty();
        assert!(buffer.needs_upload());
        assert_eq!(buffer.version(), 1);

        buffer.acknowledge_upload();
        assert!(!buffer.needs_upload());
    }

    #[test]
    fn test_resize_recreates_without_bumping() {
        let mut buffer: InstanceBuffer<InstanceTransform> = InstanceBuffer::new(2);
        buffer.resize(10);
        assert_eq!(buffer.len(), 10);
        assert_eq!(buffer.version(), 0);
        assert!(!buffer.needs_upload());

        buffer.mark_dirty();
        assert!(buffer.needs_upload());
    }
}
