use directories::ProjectDirs;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_REGISTRY: &str = "https://www.nuget.org";

#[derive(Debug, Clone)]
pub struct NugraphConfig {
    pub cache_dir: PathBuf,
    pub registry: String,
    pub plantuml_jar: Option<PathBuf>,
    pub verbose: bool,
}

impl NugraphConfig {
    pub fn from_env() -> Self {
        let cache_dir = if let Ok(home) = env::var("NUGRAPH_HOME") {
            PathBuf::from(home).join("cache")
        } else {
            match ProjectDirs::from("io", "nugraph", "nugraph") {
                Some(dirs) => dirs.cache_dir().to_path_buf(),
                None => PathBuf::from(".nugraph").join("cache"),
            }
        };

        let registry = env::var("NUGRAPH_REGISTRY")
            .ok()
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_REGISTRY.to_string());

        let plantuml_jar = env::var("NUGRAPH_PLANTUML_JAR").ok().map(PathBuf::from);

        NugraphConfig {
            cache_dir,
            registry,
            plantuml_jar,
            verbose: false,
        }
    }

    /// Directory where downloaded .nupkg files are kept between runs.
    pub fn packages_dir(&self) -> PathBuf {
        self.cache_dir.join("packages")
    }
}
