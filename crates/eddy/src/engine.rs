//! Frame scheduling and engine lifetime.
//!
//! [`Engine::step`] drives one frame: wait on the slot's fence, reclaim the
//! slot's retired resources, acquire a presentable image, record the solver
//! step and the composite blit, submit and present. Two slots alternate so
//! CPU-side preparation of one step overlaps GPU execution of the previous
//! one.

use std::fmt;
use std::time::Duration;

use crate::app::context::GpuContext;
use crate::app::input::PointerSample;
use crate::config::VisualizerConfig;
use crate::gpu::bindings::BindingTable;
use crate::gpu::deletion_queue::DeletionQueue;
use crate::gpu::fields::SimulationFields;
use crate::gpu::frame::{slot_index, FrameContext, FRAME_OVERLAP};
use crate::gpu::pipelines::{ComputeStages, PushConstants};
use crate::gpu::present::PresentPass;
use crate::gpu::solver;
use crate::shader::KernelCatalog;
use crate::stopwatch::Stopwatch;

/// Bound on every blocking wait in the frame loop.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(1);

/// Unrecoverable frame-loop failures. Every variant is fatal to the process;
/// there is no retry path.
#[derive(Debug)]
pub enum FrameError {
    /// The slot's previous submission did not complete within the bound.
    FenceWait(wgpu::PollError),
    /// The surface did not yield a presentable image.
    Acquire(wgpu::SurfaceError),
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::FenceWait(error) => write!(f, "frame fence wait failed: {error}"),
            FrameError::Acquire(error) => write!(f, "surface acquire failed: {error}"),
        }
    }
}

impl std::error::Error for FrameError {}

pub struct Engine {
    ctx: GpuContext,
    fields: SimulationFields,
    bindings: BindingTable,
    stages: ComputeStages,
    present: PresentPass,
    frames: [FrameContext; FRAME_OVERLAP],
    deletion_queue: DeletionQueue,
    frame_counter: u64,
    jacobi_iterations: u32,
    stopwatch: Stopwatch,
}

impl Engine {
    pub fn new(ctx: GpuContext, catalog: &KernelCatalog, config: &VisualizerConfig) -> Self {
        let fields = SimulationFields::new(&ctx.device, config.width, config.height);
        let bindings = BindingTable::new(&ctx.device, &fields);
        let stages = ComputeStages::new(&ctx.device, &bindings, catalog);
        let present = PresentPass::new(&ctx.device, ctx.surface_format(), &fields);

        let mut deletion_queue = DeletionQueue::new();
        fields.register_teardown(&mut deletion_queue);

        let mut stopwatch = Stopwatch::new();
        stopwatch.start();

        log::info!(
            "engine initialized: {}x{} fields, {} relaxation iterations",
            config.width,
            config.height,
            config.jacobi_iterations
        );

        Self {
            ctx,
            fields,
            bindings,
            stages,
            present,
            frames: Default::default(),
            deletion_queue,
            frame_counter: 0,
            jacobi_iterations: config.jacobi_iterations,
            stopwatch,
        }
    }

    /// Runs one simulation step and presents the result.
    pub fn step(&mut self, sample: PointerSample) -> Result<(), FrameError> {
        let slot = slot_index(self.frame_counter);

        // Fence: the slot's previous submission must have fully retired
        // before any of its resources are reused.
        if let Some(submission) = self.frames[slot].submission.take() {
            self.ctx
                .device
                .poll(wgpu::PollType::Wait {
                    submission_index: Some(submission),
                    timeout: Some(WAIT_TIMEOUT),
                })
                .map_err(FrameError::FenceWait)?;
        }
        self.frames[slot].reclaim.flush();

        let frame = self
            .ctx
            .surface
            .get_current_texture()
            .map_err(FrameError::Acquire)?;
        if frame.suboptimal {
            log::warn!("surface reported a suboptimal presentable image");
        }
        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });

        self.fields.prepare(&mut encoder, self.frame_counter == 0);

        let constants = PushConstants {
            pointer_down: sample.down as u32,
            elapsed_ms: self.stopwatch.elapsed_ms(),
            pointer_x: sample.position.x as i32,
            pointer_y: sample.position.y as i32,
        };
        let plan = solver::step_plan(self.jacobi_iterations);
        solver::record(
            &mut encoder,
            &self.stages,
            &self.bindings,
            &constants,
            self.fields.width(),
            self.fields.height(),
            &plan,
        );
        // Elapsed time runs from the end of one step's recording to the
        // start of the next one's.
        self.stopwatch.start();

        self.present.blit(&mut encoder, &target);

        let submission = self.ctx.queue.submit(Some(encoder.finish()));
        self.frames[slot].submission = Some(submission);
        frame.present();

        self.frame_counter += 1;
        Ok(())
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        // Drain both slots before tearing anything down.
        for frame in &mut self.frames {
            if let Some(submission) = frame.submission.take() {
                let wait = self.ctx.device.poll(wgpu::PollType::Wait {
                    submission_index: Some(submission),
                    timeout: Some(WAIT_TIMEOUT),
                });
                if let Err(error) = wait {
                    log::error!("teardown wait failed: {error}");
                }
            }
        }

        self.deletion_queue.flush();
        for frame in &mut self.frames {
            frame.reclaim.flush();
        }
        self.deletion_queue.flush_deletors();

        log::info!("engine destroyed after {} frames", self.frame_counter);
    }
}
