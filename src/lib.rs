pub mod align;
pub mod compose;
pub mod config;
pub mod error;
pub mod fetch;
pub mod interactive;
pub mod pipeline;
pub mod select;
pub mod subtitle;
pub mod transcribe;
pub mod translate;

pub use config::Config;
pub use error::{PolysubError, Result};
pub use pipeline::{DubSource, PipelineOptions, PipelineResult};
