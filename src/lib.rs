// Library exports for reuse by the binary and integration tests
pub mod cli;
pub mod config_file;
pub mod image_processing;
pub mod json_output;
pub mod utils;

// Re-export commonly used types
pub use cli::Args;
pub use image_processing::{
    Manifest, ProcessingConfig, ProcessingEngine, Split, SplitReport, DEFAULT_JOBS,
};
pub use json_output::JsonMessage;
