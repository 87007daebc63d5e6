//! Control loop.
//!
//! Owns the window, polls input, and drives one engine step per loop
//! iteration. While the window is occluded no steps run; the loop is
//! throttled instead so it does not spin.

use std::process;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

use crate::app::context::GpuContext;
use crate::app::input::InputState;
use crate::config::VisualizerConfig;
use crate::engine::Engine;
use crate::shader::KernelCatalog;

const IDLE_THROTTLE: Duration = Duration::from_millis(100);

pub fn run(
    config: VisualizerConfig,
    catalog: KernelCatalog,
) -> Result<(), winit::error::EventLoopError> {
    let event_loop = EventLoop::new()?;
    let mut runner = Runner::new(config, catalog);
    event_loop.run_app(&mut runner)
}

struct Runner {
    config: VisualizerConfig,
    catalog: KernelCatalog,
    window: Option<Arc<Window>>,
    engine: Option<Engine>,
    input: InputState,
    stop_rendering: bool,
}

impl Runner {
    fn new(config: VisualizerConfig, catalog: KernelCatalog) -> Self {
        Self {
            config,
            catalog,
            window: None,
            engine: None,
            input: InputState::new(),
            stop_rendering: false,
        }
    }
}

impl ApplicationHandler for Runner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = Arc::new(
            event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title("eddy")
                        .with_inner_size(PhysicalSize::new(self.config.width, self.config.height))
                        .with_resizable(false),
                )
                .expect("failed to create window"),
        );

        let ctx = pollster::block_on(GpuContext::new(window.clone()));

        // The window manager may not honor the requested extent; the fields
        // must match the surface the composite is blitted onto.
        let mut config = self.config.clone();
        config.width = ctx.config.width;
        config.height = ctx.config.height;

        self.engine = Some(Engine::new(ctx, &self.catalog, &config));
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::Occluded(occluded) = event {
            self.stop_rendering = occluded;
        }

        self.input.handle(&event);
        if self.input.quit_requested() {
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if self.stop_rendering {
            thread::sleep(IDLE_THROTTLE);
            return;
        }

        if let Some(engine) = &mut self.engine {
            if let Err(error) = engine.step(self.input.sample()) {
                log::error!("fatal frame error: {error}");
                process::exit(1);
            }
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}
