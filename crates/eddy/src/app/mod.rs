pub mod context;
pub mod input;
pub mod runner;

pub use context::GpuContext;
pub use input::{InputState, PointerSample};
pub use runner::run;
