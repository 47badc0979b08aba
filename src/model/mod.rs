mod loader;
mod registry;
mod types;

pub use loader::Predictor;
pub use registry::ModelRegistry;
pub use types::TabularInput;
