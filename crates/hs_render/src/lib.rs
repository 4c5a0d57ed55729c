pub mod blit_pipeline;
pub mod gpu_context;

pub use blit_pipeline::BlitPipeline;
pub use gpu_context::GpuContext;
