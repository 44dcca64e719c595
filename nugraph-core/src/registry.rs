use crate::console;
use crate::resolve::PackageRef;
use crate::{NugraphConfig, NugraphError, Result};
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

/// Source of package archives for the resolution engine. The production
/// implementation is [`RegistryClient`]; tests substitute in-memory sources.
#[allow(async_fn_in_trait)]
pub trait ArchiveSource {
    async fn fetch(&self, package: &PackageRef) -> Result<Vec<u8>>;
}

pub struct RegistryClient {
    client: reqwest::Client,
    registry: String,
    packages_dir: PathBuf,
}

impl RegistryClient {
    pub fn new(config: &NugraphConfig) -> Self {
        RegistryClient {
            client: reqwest::Client::new(),
            registry: config.registry.clone(),
            packages_dir: config.packages_dir(),
        }
    }

    fn archive_url(&self, package: &PackageRef) -> String {
        format!(
            "{}/api/v2/package/{}/{}",
            self.registry, package.id, package.version
        )
    }

    fn archive_path(&self, package: &PackageRef) -> PathBuf {
        self.packages_dir
            .join(format!("{}.{}.nupkg", package.id, package.version))
    }
}

impl ArchiveSource for RegistryClient {
    async fn fetch(&self, package: &PackageRef) -> Result<Vec<u8>> {
        let path = self.archive_path(package);

        if path.is_file() {
            let bytes = fs::read(&path).map_err(|source| NugraphError::ReadFile {
                path: path.clone(),
                source,
            })?;
            validate_archive(&bytes)?;
            if console::is_logging_enabled() {
                console::verbose(&format!(
                    "cache hit: {} ({})",
                    package,
                    path.display()
                ));
            }
            return Ok(bytes);
        }

        let url = self.archive_url(package);
        let started = Instant::now();
        let bytes = download_archive(&self.client, &url).await?;
        debug!(
            package = %package,
            bytes = bytes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "downloaded archive"
        );

        validate_archive(&bytes)?;
        save_archive(&self.packages_dir, &path, &bytes);

        Ok(bytes)
    }
}

/// Checks the bytes open as a zip container before anything parses them.
pub fn validate_archive(bytes: &[u8]) -> Result<()> {
    zip::ZipArchive::new(Cursor::new(bytes)).map_err(|source| NugraphError::InvalidArchive {
        reason: source.to_string(),
    })?;

    Ok(())
}

async fn download_archive(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| NugraphError::Http {
            url: url.to_string(),
            source,
        })?;

    let bytes = response
        .error_for_status()
        .map_err(|source| NugraphError::Http {
            url: url.to_string(),
            source,
        })?
        .bytes()
        .await
        .map_err(|source| NugraphError::Http {
            url: url.to_string(),
            source,
        })?;

    Ok(bytes.to_vec())
}

// Cache writes are best-effort; a package that cannot be cached is still a
// package that resolved.
fn save_archive(packages_dir: &Path, path: &Path, bytes: &[u8]) {
    if let Err(error) = fs::create_dir_all(packages_dir) {
        if console::is_logging_enabled() {
            console::verbose(&format!(
                "failed to create cache dir {}: {}",
                packages_dir.display(),
                error
            ));
        }
        return;
    }

    if let Err(error) = fs::write(path, bytes) {
        if console::is_logging_enabled() {
            console::verbose(&format!(
                "failed to cache archive at {}: {}",
                path.display(),
                error
            ));
        }
    } else if console::is_logging_enabled() {
        console::verbose(&format!("cached archive at {}", path.display()));
    }
}
