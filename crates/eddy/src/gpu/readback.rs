//! CPU readback of field textures.
//!
//! Copies a field into a mapped staging buffer and returns its texels.
//! Synchronous and slow; intended for tests and diagnostics, never the frame
//! loop.

use std::sync::mpsc;
use std::time::Duration;

const MAP_TIMEOUT: Duration = Duration::from_secs(1);

/// Row stride in bytes, padded to the copy alignment wgpu requires.
fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * 16;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Reads a `width` by `height` float4 texture back into texel rows.
///
/// Panics on device loss or timeout; callers are tests and debug paths where
/// that is the right outcome.
pub fn read_field(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    width: u32,
    height: u32,
) -> Vec<[f32; 4]> {
    let bytes_per_row = padded_bytes_per_row(width);
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("field_readback_staging"),
        size: bytes_per_row as u64 * height as u64,
        usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("field_readback_encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    let submission = queue.submit(Some(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device
        .poll(wgpu::PollType::Wait {
            submission_index: Some(submission),
            timeout: Some(MAP_TIMEOUT),
        })
        .expect("field readback wait failed");
    rx.recv_timeout(MAP_TIMEOUT)
        .expect("buffer map signal never arrived")
        .expect("buffer map failed");

    let data = slice.get_mapped_range();
    let mut texels = Vec::with_capacity(width as usize * height as usize);
    for row in 0..height {
        let start = (row * bytes_per_row) as usize;
        let end = start + (width * 16) as usize;
        texels.extend_from_slice(bytemuck::cast_slice::<u8, [f32; 4]>(&data[start..end]));
    }
    drop(data);
    staging.unmap();

    texels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_padding_rounds_to_copy_alignment() {
        assert_eq!(padded_bytes_per_row(16), 256);
        assert_eq!(padded_bytes_per_row(64), 1024);
        // 17 texels -> 272 bytes -> padded to the next 256 multiple.
        assert_eq!(padded_bytes_per_row(17), 512);
    }
}
