//! Compute stage pipelines.
//!
//! Five kernels share one pipeline layout: the field binding table plus a
//! single push-constant range carrying the per-step parameters. Pipelines are
//! created once at init; a stage whose kernel source cannot be resolved logs
//! the failure and is left without a pipeline rather than aborting startup.

use bytemuck::{Pod, Zeroable};

use crate::shader::KernelCatalog;

use super::bindings::BindingTable;

/// The five solver kernels, in no particular order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageKind {
    Diffusion,
    Pressure,
    DivergenceRemoval,
    Advection,
    Swap,
}

impl StageKind {
    pub const ALL: [StageKind; 5] = [
        StageKind::Diffusion,
        StageKind::Pressure,
        StageKind::DivergenceRemoval,
        StageKind::Advection,
        StageKind::Swap,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StageKind::Diffusion => "jacobi_diffusion",
            StageKind::Pressure => "jacobi_pressure",
            StageKind::DivergenceRemoval => "remove_divergence",
            StageKind::Advection => "advect",
            StageKind::Swap => "swap_state",
        }
    }

    /// File name the kernel catalog resolves for this stage.
    pub fn kernel_file(self) -> &'static str {
        match self {
            StageKind::Diffusion => "jacobi_diffusion.wgsl",
            StageKind::Pressure => "jacobi_pressure.wgsl",
            StageKind::DivergenceRemoval => "remove_divergence.wgsl",
            StageKind::Advection => "advect.wgsl",
            StageKind::Swap => "swap_state.wgsl",
        }
    }

    fn index(self) -> usize {
        match self {
            StageKind::Diffusion => 0,
            StageKind::Pressure => 1,
            StageKind::DivergenceRemoval => 2,
            StageKind::Advection => 3,
            StageKind::Swap => 4,
        }
    }
}

/// Per-step kernel parameters, pushed verbatim by every dispatch of a step.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PushConstants {
    pub pointer_down: u32,
    pub elapsed_ms: u32,
    pub pointer_x: i32,
    pub pointer_y: i32,
}

pub struct ComputeStages {
    pipelines: [Option<wgpu::ComputePipeline>; 5],
}

impl ComputeStages {
    pub fn new(
        device: &wgpu::Device,
        bindings: &BindingTable,
        catalog: &KernelCatalog,
    ) -> Self {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("solver_stage_layout"),
            bind_group_layouts: &[bindings.layout()],
            push_constant_ranges: &[wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::COMPUTE,
                range: 0..std::mem::size_of::<PushConstants>() as u32,
            }],
        });

        let mut pipelines: [Option<wgpu::ComputePipeline>; 5] = Default::default();
        for kind in StageKind::ALL {
            pipelines[kind.index()] = Self::build_stage(device, &layout, catalog, kind);
        }

        Self { pipelines }
    }

    fn build_stage(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        catalog: &KernelCatalog,
        kind: StageKind,
    ) -> Option<wgpu::ComputePipeline> {
        let Some(source) = catalog.source(kind) else {
            log::error!("no kernel source for stage {}", kind.label());
            return None;
        };

        // The shader module is transient: it only lives long enough to build
        // the pipeline.
        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(kind.label()),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        Some(
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(kind.label()),
                layout: Some(layout),
                module: &module,
                entry_point: Some("main"),
                compilation_options: Default::default(),
                cache: None,
            }),
        )
    }

    pub fn pipeline(&self, kind: StageKind) -> Option<&wgpu::ComputePipeline> {
        self.pipelines[kind.index()].as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_constants_are_sixteen_bytes() {
        assert_eq!(std::mem::size_of::<PushConstants>(), 16);
    }

    #[test]
    fn push_constant_bytes_match_field_order() {
        let pc = PushConstants {
            pointer_down: 1,
            elapsed_ms: 16,
            pointer_x: -3,
            pointer_y: 7,
        };
        let bytes = bytemuck::bytes_of(&pc);
        assert_eq!(&bytes[0..4], 1u32.to_ne_bytes());
        assert_eq!(&bytes[4..8], 16u32.to_ne_bytes());
        assert_eq!(&bytes[8..12], (-3i32).to_ne_bytes());
        assert_eq!(&bytes[12..16], 7i32.to_ne_bytes());
    }

    #[test]
    fn stage_indices_are_dense_and_unique() {
        let mut seen = [false; 5];
        for kind in StageKind::ALL {
            assert!(!seen[kind.index()]);
            seen[kind.index()] = true;
        }
    }
}
