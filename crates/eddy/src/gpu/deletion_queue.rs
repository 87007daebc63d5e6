//! Deferred GPU resource reclamation.
//!
//! Resources that may still be referenced by in-flight GPU work are parked
//! here and released later, once the owning frame slot's fence has been
//! waited on. The caller is responsible for that ordering; the queue itself
//! never touches the device timeline.

/// Ordered registry of pending destructions.
///
/// A full [`flush`](Self::flush) destroys tracked textures, then tracked
/// buffers, then runs the deletor closures in reverse registration order, so
/// a resource always outlives every later-registered closure that might
/// reference it. All three lists are emptied afterwards.
#[derive(Default)]
pub struct DeletionQueue {
    textures: Vec<wgpu::Texture>,
    buffers: Vec<wgpu::Buffer>,
    deletors: Vec<Box<dyn FnOnce()>>,
}

impl DeletionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue_texture(&mut self, texture: wgpu::Texture) {
        self.textures.push(texture);
    }

    pub fn enqueue_buffer(&mut self, buffer: wgpu::Buffer) {
        self.buffers.push(buffer);
    }

    pub fn enqueue_deletor(&mut self, deletor: Box<dyn FnOnce()>) {
        self.deletors.push(deletor);
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty() && self.buffers.is_empty() && self.deletors.is_empty()
    }

    /// Destroys textures, then buffers, then runs deletors last-in-first-out.
    ///
    /// Must only be called once no in-flight submission references the
    /// enqueued resources.
    pub fn flush(&mut self) {
        for texture in self.textures.drain(..) {
            texture.destroy();
        }
        for buffer in self.buffers.drain(..) {
            buffer.destroy();
        }
        for deletor in self.deletors.drain(..).rev() {
            deletor();
        }
    }

    /// Runs only the deletor closures (still last-in-first-out), leaving any
    /// tracked textures and buffers in place.
    pub fn flush_deletors(&mut self) {
        for deletor in self.deletors.drain(..).rev() {
            deletor();
        }
    }
}
