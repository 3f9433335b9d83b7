#![forbid(unsafe_code)]

mod rendering;
mod synthetic;

pub use rendering::{init_tracing, render_view_to_png, ColorScale, RenderConfig};
pub use synthetic::{synthetic_shards, SyntheticRun};
