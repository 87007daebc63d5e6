//! Pointer input.
//!
//! The control loop polls one sample per iteration; only the latest state is
//! visible to a simulation step. Event routing is a fixed mapping from event
//! kind to handler: the first matching arm wins and unhandled kinds are
//! no-ops.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};

/// Latest pointer state, captured once per step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerSample {
    pub position: Vec2,
    pub down: bool,
}

#[derive(Debug, Default)]
pub struct InputState {
    position: Vec2,
    down: bool,
    quit: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routes a window event to its handler.
    pub fn handle(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.pointer_moved(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.button_changed(*state == ElementState::Pressed);
            }
            WindowEvent::CloseRequested => {
                self.close_requested();
            }
            _ => {}
        }
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.position = Vec2::new(x, y);
    }

    pub fn button_changed(&mut self, down: bool) {
        self.down = down;
    }

    pub fn close_requested(&mut self) {
        self.quit = true;
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    pub fn sample(&self) -> PointerSample {
        PointerSample {
            position: self.position,
            down: self.down,
        }
    }
}
