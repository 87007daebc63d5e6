//! GPU-side building blocks of the visualizer.
//!
//! * [`deletion_queue`]: deferred resource reclamation
//! * [`fields`]: the three solver-state textures
//! * [`bindings`]: the shared layout and the two ping-pong bind groups
//! * [`pipelines`]: the five compute stages and their push-constant block
//! * [`solver`]: the fixed per-step dispatch sequence
//! * [`present`]: composite-to-surface blit pass
//! * [`frame`]: per-frame synchronization slots
//! * [`readback`]: field readback for tests and diagnostics

pub mod bindings;
pub mod deletion_queue;
pub mod fields;
pub mod frame;
pub mod pipelines;
pub mod present;
pub mod readback;
pub mod solver;
