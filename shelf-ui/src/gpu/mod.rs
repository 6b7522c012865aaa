//! GPU rendering for the launcher window.

mod pipeline;

pub use pipeline::{GpuTexture, QuadPipeline};
