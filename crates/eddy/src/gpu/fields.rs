//! Solver state textures.
//!
//! Three identically allocated `Rgba32Float` images at window extent. Indices
//! 0 and 1 hold the alternating solver state (velocity.xy, dye, pressure per
//! texel); index 2 receives the frame's final composite.

use super::deletion_queue::DeletionQueue;

pub const FIELD_COUNT: usize = 3;
pub const COMPOSITE_FIELD: usize = 2;

pub const FIELD_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

pub struct SimulationFields {
    textures: [wgpu::Texture; FIELD_COUNT],
    views: [wgpu::TextureView; FIELD_COUNT],
    width: u32,
    height: u32,
}

impl SimulationFields {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let textures = std::array::from_fn(|index| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(FIELD_LABELS[index]),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: FIELD_FORMAT,
                usage: wgpu::TextureUsages::STORAGE_BINDING
                    | wgpu::TextureUsages::TEXTURE_BINDING
                    | wgpu::TextureUsages::COPY_SRC
                    | wgpu::TextureUsages::COPY_DST
                    | wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
        });
        let views = std::array::from_fn(|index: usize| {
            textures[index].create_view(&wgpu::TextureViewDescriptor::default())
        });

        Self {
            textures,
            views,
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn texture(&self, index: usize) -> &wgpu::Texture {
        &self.textures[index]
    }

    pub fn view(&self, index: usize) -> &wgpu::TextureView {
        &self.views[index]
    }

    /// Field indices whose contents are discarded at the start of a step.
    ///
    /// The very first step initializes all three fields from their undefined
    /// creation state; every later step only discards the composite, which is
    /// rebuilt from scratch each frame.
    pub fn clear_plan(first_step: bool) -> &'static [usize] {
        if first_step {
            &[0, 1, 2]
        } else {
            &[COMPOSITE_FIELD]
        }
    }

    /// Records the per-step field preparation into `encoder`.
    pub fn prepare(&self, encoder: &mut wgpu::CommandEncoder, first_step: bool) {
        for &index in Self::clear_plan(first_step) {
            encoder.clear_texture(
                &self.textures[index],
                &wgpu::ImageSubresourceRange::default(),
            );
        }
    }

    /// Hands the field textures to `queue` for deferred destruction.
    pub fn register_teardown(&self, queue: &mut DeletionQueue) {
        for texture in &self.textures {
            queue.enqueue_texture(texture.clone());
        }
    }
}

const FIELD_LABELS: [&str; FIELD_COUNT] = ["field_state_0", "field_state_1", "field_composite"];
