use crate::manifest::{self, ManifestInfo};
use crate::registry::ArchiveSource;
use crate::{NugraphError, console};
use async_recursion::async_recursion;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Identifies one package release. Equality is structural; no semver
/// comparison is performed anywhere in the engine.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct PackageRef {
    pub id: String,
    pub version: String,
}

impl PackageRef {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        PackageRef {
            id: id.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for PackageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.version)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackageRecord {
    pub dependencies: BTreeSet<PackageRef>,
    pub authors: BTreeSet<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    Transport,
    InvalidArchive,
    MalformedManifest,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FailureKind::Transport => "transport error",
            FailureKind::InvalidArchive => "invalid archive",
            FailureKind::MalformedManifest => "malformed manifest",
        };
        f.write_str(text)
    }
}

/// The accumulated result of one resolution run.
///
/// `packages` holds a record for every PackageRef whose archive was fetched
/// and read; `failures` names the refs whose fetch or manifest parse failed.
/// A ref cut off by the depth bound appears in neither map, only as an edge
/// target in its parents' dependency sets (a dangling edge). A ref whose
/// manifest was malformed keeps an empty record and is also listed in
/// `failures`.
#[derive(Clone, Debug)]
pub struct DependencyGraph {
    pub root: PackageRef,
    pub packages: BTreeMap<PackageRef, PackageRecord>,
    pub failures: BTreeMap<PackageRef, FailureKind>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VisitState {
    Pending,
    Recorded,
    Failed,
}

/// Resolves the transitive dependency closure of `root`, fetching each
/// reachable package at most once and recursing depth-first up to
/// `max_depth` levels below the root.
///
/// Per-package failures never abort the run; the returned graph is complete
/// for everything that could be resolved.
pub async fn resolve<S: ArchiveSource>(
    source: &S,
    root: PackageRef,
    max_depth: u32,
) -> DependencyGraph {
    let mut graph = DependencyGraph {
        root: root.clone(),
        packages: BTreeMap::new(),
        failures: BTreeMap::new(),
    };
    let mut visited = BTreeMap::new();

    resolve_package(source, &root, 0, max_depth, &mut graph, &mut visited).await;

    graph
}

#[async_recursion(?Send)]
async fn resolve_package<S: ArchiveSource>(
    source: &S,
    package: &PackageRef,
    depth: u32,
    max_depth: u32,
    graph: &mut DependencyGraph,
    visited: &mut BTreeMap<PackageRef, VisitState>,
) {
    if depth > max_depth {
        return;
    }

    // A ref that is pending, recorded, or failed is never fetched again.
    if visited.contains_key(package) {
        return;
    }

    visited.insert(package.clone(), VisitState::Pending);

    // Placeholder so that fan-in from other parents dedups against an entry
    // before this package's authoritative record lands.
    graph.packages.entry(package.clone()).or_default();

    if console::is_logging_enabled() {
        console::verbose(&format!("resolving {} (depth {})", package, depth));
    }

    let archive = match source.fetch(package).await {
        Ok(bytes) => bytes,
        Err(error) => {
            console::warn(&format!("failed to fetch {}: {}", package, error));
            graph.packages.remove(package);
            graph.failures.insert(package.clone(), failure_kind(&error));
            visited.insert(package.clone(), VisitState::Failed);
            return;
        }
    };

    let info = match manifest::extract(&archive) {
        Ok(info) => info,
        // An archive without a manifest declares nothing; not a failure.
        Err(NugraphError::NoManifest) => ManifestInfo::default(),
        Err(error) => {
            console::warn(&format!("failed to read manifest for {}: {}", package, error));
            graph.failures.insert(package.clone(), failure_kind(&error));
            ManifestInfo::default()
        }
    };

    let mut dependencies = BTreeSet::new();
    for (dep_id, dep_version) in &info.dependencies {
        let dep = PackageRef::new(dep_id.clone(), dep_version.clone());
        dependencies.insert(dep.clone());
        resolve_package(source, &dep, depth + 1, max_depth, graph, visited).await;
    }

    graph.packages.insert(
        package.clone(),
        PackageRecord {
            dependencies,
            authors: info.authors,
        },
    );
    visited.insert(package.clone(), VisitState::Recorded);
}

fn failure_kind(error: &NugraphError) -> FailureKind {
    match error {
        NugraphError::InvalidArchive { .. } => FailureKind::InvalidArchive,
        NugraphError::MalformedManifest { .. } => FailureKind::MalformedManifest,
        _ => FailureKind::Transport,
    }
}
