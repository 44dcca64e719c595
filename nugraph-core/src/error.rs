use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NugraphError {
    #[error("Failed to fetch {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Not a valid zip archive: {reason}")]
    InvalidArchive { reason: String },

    #[error("No .nuspec manifest found in archive")]
    NoManifest,

    #[error("Malformed .nuspec manifest: {source}")]
    MalformedManifest { source: roxmltree::Error },

    #[error("Failed to read file {path:?}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },

    #[error("Failed to write file {path:?}: {source}")]
    WriteFile { path: PathBuf, source: std::io::Error },

    #[error("PlantUML renderer failed: {reason}")]
    Renderer { reason: String },
}
