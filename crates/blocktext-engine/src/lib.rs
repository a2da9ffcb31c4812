pub mod config;
pub mod delta;
pub mod events;
pub mod model;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use config::{ConfigError, DocumentConfig};
pub use delta::*;
pub use events::*;
pub use model::*;
