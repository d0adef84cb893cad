pub mod stage0_normalize;
pub mod stage1_filter;
pub mod stage2_summarize;
pub mod stage3_render;

pub use stage0_normalize::*;
pub use stage1_filter::*;
pub use stage2_summarize::*;
pub use stage3_render::*;
