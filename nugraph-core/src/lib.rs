pub mod config;
pub mod console;
pub mod error;
pub mod manifest;
pub mod registry;
pub mod render;
pub mod resolve;

pub use config::NugraphConfig;
pub use error::NugraphError;

pub type Result<T> = std::result::Result<T, NugraphError>;
