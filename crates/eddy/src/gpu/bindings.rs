//! Ping-pong binding table.
//!
//! One shared bind group layout covers every solver stage: three read-write
//! storage images at fixed slots 0, 1 and 2. Two bind groups are prebuilt
//! over it, one per direction the ping-pong can face, and are never rewritten
//! afterwards; steady-state recording only picks which prebuilt group to
//! bind.

use super::fields::{SimulationFields, FIELD_FORMAT};

/// The two role orientations of the state fields.
///
/// `A` binds (field0, field1, composite); `B` binds (field1, field0,
/// composite). Jacobi relaxation alternates between them each iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindSet {
    A,
    B,
}

pub struct BindingTable {
    layout: wgpu::BindGroupLayout,
    group_a: wgpu::BindGroup,
    group_b: wgpu::BindGroup,
}

impl BindingTable {
    pub fn new(device: &wgpu::Device, fields: &SimulationFields) -> Self {
        // Read-write access on a float4 format leans on adapter-reported
        // format capabilities, enabled through
        // Features::TEXTURE_ADAPTER_SPECIFIC_FORMAT_FEATURES.
        let entries: Vec<wgpu::BindGroupLayoutEntry> = (0..3)
            .map(|binding| wgpu::BindGroupLayoutEntry {
                binding,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: wgpu::BindingType::StorageTexture {
                    access: wgpu::StorageTextureAccess::ReadWrite,
                    format: FIELD_FORMAT,
                    view_dimension: wgpu::TextureViewDimension::D2,
                },
                count: None,
            })
            .collect();

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("solver_field_layout"),
            entries: &entries,
        });

        let group_a = Self::build_group(device, &layout, "solver_fields_forward", fields, [0, 1, 2]);
        let group_b = Self::build_group(device, &layout, "solver_fields_reverse", fields, [1, 0, 2]);

        Self {
            layout,
            group_a,
            group_b,
        }
    }

    fn build_group(
        device: &wgpu::Device,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        fields: &SimulationFields,
        field_order: [usize; 3],
    ) -> wgpu::BindGroup {
        let entries: Vec<wgpu::BindGroupEntry> = field_order
            .iter()
            .enumerate()
            .map(|(binding, &field)| wgpu::BindGroupEntry {
                binding: binding as u32,
                resource: wgpu::BindingResource::TextureView(fields.view(field)),
            })
            .collect();

        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &entries,
        })
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn group(&self, set: BindSet) -> &wgpu::BindGroup {
        match set {
            BindSet::A => &self.group_a,
            BindSet::B => &self.group_b,
        }
    }
}
