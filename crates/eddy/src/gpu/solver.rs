//! Solver orchestration.
//!
//! A simulation step is a statically ordered sequence of dispatches, not a
//! data-driven one. [`step_plan`] produces that sequence as data and
//! [`record`] plays it into a command encoder, one compute pass per dispatch.
//! The pass boundary is the synchronization point: every pair of consecutive
//! dispatches touches the same field images, so each boundary establishes the
//! shader-write to shader-read visibility the next dispatch depends on, and
//! no boundary exists that does not separate such a pair.

use super::bindings::{BindSet, BindingTable};
use super::pipelines::{ComputeStages, PushConstants, StageKind};

pub const WORKGROUP_SIZE: u32 = 16;

/// One dispatch: which kernel runs and which prebuilt bind group it sees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassOp {
    pub stage: StageKind,
    pub set: BindSet,
}

/// The fixed dispatch sequence of one simulation step.
///
/// Diffusion relaxation, pressure relaxation, divergence removal, advection,
/// state swap, then a second pressure projection (relaxation plus divergence
/// removal). Jacobi runs alternate the bound set every iteration, starting
/// from the reverse orientation; single dispatches always bind the forward
/// one.
pub fn step_plan(jacobi_iterations: u32) -> Vec<PassOp> {
    let mut plan = Vec::with_capacity(3 * jacobi_iterations as usize + 4);

    push_jacobi(&mut plan, StageKind::Diffusion, jacobi_iterations);
    push_jacobi(&mut plan, StageKind::Pressure, jacobi_iterations);
    plan.push(PassOp {
        stage: StageKind::DivergenceRemoval,
        set: BindSet::A,
    });
    plan.push(PassOp {
        stage: StageKind::Advection,
        set: BindSet::A,
    });
    plan.push(PassOp {
        stage: StageKind::Swap,
        set: BindSet::A,
    });
    push_jacobi(&mut plan, StageKind::Pressure, jacobi_iterations);
    plan.push(PassOp {
        stage: StageKind::DivergenceRemoval,
        set: BindSet::A,
    });

    plan
}

fn push_jacobi(plan: &mut Vec<PassOp>, stage: StageKind, iterations: u32) {
    for iteration in 0..iterations {
        let set = if iteration % 2 == 0 {
            BindSet::B
        } else {
            BindSet::A
        };
        plan.push(PassOp { stage, set });
    }
}

/// Workgroup grid covering a `width` by `height` field.
pub fn dispatch_extent(width: u32, height: u32) -> (u32, u32) {
    (
        (width + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE,
        (height + WORKGROUP_SIZE - 1) / WORKGROUP_SIZE,
    )
}

/// Records `plan` into `encoder`.
///
/// Every dispatch gets its own compute pass and pushes the same constant
/// block. A stage whose pipeline is missing is skipped with an error log; the
/// rest of the sequence still runs.
pub fn record(
    encoder: &mut wgpu::CommandEncoder,
    stages: &ComputeStages,
    bindings: &BindingTable,
    constants: &PushConstants,
    width: u32,
    height: u32,
    plan: &[PassOp],
) {
    let (groups_x, groups_y) = dispatch_extent(width, height);

    for op in plan {
        let Some(pipeline) = stages.pipeline(op.stage) else {
            log::error!("stage {} has no pipeline, skipping dispatch", op.stage.label());
            continue;
        };

        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(op.stage.label()),
            timestamp_writes: None,
        });
        pass.set_pipeline(pipeline);
        pass.set_bind_group(0, bindings.group(op.set), &[]);
        pass.set_push_constants(0, bytemuck::bytes_of(constants));
        pass.dispatch_workgroups(groups_x, groups_y, 1);
    }
}
