//! eddy - real-time GPU compute fluid visualizer.
//!
//! Five compute kernels iterate a simplified Navier-Stokes system over three
//! float4 images: Jacobi diffusion, Jacobi pressure relaxation, divergence
//! removal, semi-Lagrangian advection, and a state swap. Two prebuilt bind
//! groups express the two directions the ping-pong state can face, so the
//! solver never rewrites descriptors while running. A two-slot frame
//! scheduler overlaps CPU recording with GPU execution.

pub mod app;
pub mod config;
pub mod engine;
pub mod gpu;
pub mod shader;
pub mod stopwatch;

pub use config::VisualizerConfig;
pub use engine::Engine;
pub use shader::KernelCatalog;
