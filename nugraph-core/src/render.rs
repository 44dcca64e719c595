use crate::console;
use crate::resolve::DependencyGraph;
use crate::{NugraphError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::process::Command;

/// Renders the graph as a PlantUML component diagram: one `package` block
/// per record with version and author notes, and one edge per dependency.
///
/// Edges reference dependency ids without version qualifiers, so two
/// versions of one id collapse to a single target node; [`to_plantuml`]
/// warns when the graph contains such a collision.
pub fn to_plantuml(graph: &DependencyGraph) -> String {
    warn_on_collapsed_edges(graph);

    let mut out = String::from("@startuml\n");

    for (package, record) in &graph.packages {
        let alias = alias(&package.id);
        let authors = if record.authors.is_empty() {
            "unknown".to_string()
        } else {
            record
                .authors
                .iter()
                .cloned()
                .collect::<Vec<_>>()
                .join(", ")
        };

        let _ = writeln!(
            out,
            "package \"{} {}\" as {} {{",
            package.id, package.version, alias
        );
        let _ = writeln!(out, "    note right of {} : Version: {}", alias, package.version);
        let _ = writeln!(out, "    note right of {} : Authors: {}", alias, authors);

        for dep in &record.dependencies {
            let _ = writeln!(out, "    {} --> {}", alias, self::alias(&dep.id));
        }

        out.push_str("}\n");
    }

    out.push_str("@enduml\n");
    out
}

pub fn write_plantuml(graph: &DependencyGraph, path: &Path) -> Result<()> {
    let text = to_plantuml(graph);
    fs::write(path, text).map_err(|source| NugraphError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Rasterizes a PlantUML file to PNG by invoking the PlantUML jar. One
/// attempt, no retry; the caller decides what a failure means.
pub fn rasterize(plantuml_jar: &Path, puml_path: &Path, output_dir: &Path) -> Result<()> {
    let status = Command::new("java")
        .arg("-jar")
        .arg(plantuml_jar)
        .arg(puml_path)
        .arg("-o")
        .arg(output_dir)
        .status()
        .map_err(|error| NugraphError::Renderer {
            reason: format!("failed to launch java: {}", error),
        })?;

    if !status.success() {
        return Err(NugraphError::Renderer {
            reason: format!("plantuml exited with {}", status),
        });
    }

    Ok(())
}

// PlantUML identifiers cannot carry dots or dashes, so aliases flatten every
// non-alphanumeric character to '_'. Distinct versions of one id share an
// alias on purpose; see to_plantuml.
fn alias(id: &str) -> String {
    id.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn warn_on_collapsed_edges(graph: &DependencyGraph) {
    let mut versions_by_id: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();

    for (package, record) in &graph.packages {
        versions_by_id
            .entry(package.id.as_str())
            .or_default()
            .insert(package.version.as_str());
        for dep in &record.dependencies {
            versions_by_id
                .entry(dep.id.as_str())
                .or_default()
                .insert(dep.version.as_str());
        }
    }

    for (id, versions) in versions_by_id {
        if versions.len() > 1 {
            console::warn(&format!(
                "package {} appears with {} versions; diagram edges collapse them into one node",
                id,
                versions.len()
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{PackageRecord, PackageRef};
    use std::collections::BTreeMap;

    fn record(deps: &[PackageRef], authors: &[&str]) -> PackageRecord {
        PackageRecord {
            dependencies: deps.iter().cloned().collect(),
            authors: authors.iter().map(|a| a.to_string()).collect(),
        }
    }

    fn graph(packages: Vec<(PackageRef, PackageRecord)>) -> DependencyGraph {
        let root = packages[0].0.clone();
        DependencyGraph {
            root,
            packages: packages.into_iter().collect(),
            failures: BTreeMap::new(),
        }
    }

    #[test]
    fn test_plantuml_output() {
        let a = PackageRef::new("Newtonsoft.Json.Bson", "1.0.3");
        let b = PackageRef::new("Newtonsoft.Json", "12.0.1");

        let g = graph(vec![
            (a.clone(), record(&[b.clone()], &[])),
            (b.clone(), record(&[], &["James Newton-King"])),
        ]);

        let text = to_plantuml(&g);

        assert!(text.starts_with("@startuml\n"));
        assert!(text.ends_with("@enduml\n"));
        assert!(text.contains("package \"Newtonsoft.Json 12.0.1\" as Newtonsoft_Json {"));
        assert!(text.contains("package \"Newtonsoft.Json.Bson 1.0.3\" as Newtonsoft_Json_Bson {"));
        assert!(text.contains("note right of Newtonsoft_Json : Version: 12.0.1"));
        assert!(text.contains("note right of Newtonsoft_Json : Authors: James Newton-King"));
        assert!(text.contains("note right of Newtonsoft_Json_Bson : Authors: unknown"));
        assert!(text.contains("    Newtonsoft_Json_Bson --> Newtonsoft_Json\n"));
    }

    #[test]
    fn test_edges_drop_version_qualifiers() {
        let a = PackageRef::new("A", "1.0");
        let b1 = PackageRef::new("B", "1.0");
        let b2 = PackageRef::new("B", "2.0");

        let g = graph(vec![
            (a.clone(), record(&[b1.clone(), b2.clone()], &[])),
            (b1, record(&[], &[])),
            (b2, record(&[], &[])),
        ]);

        let text = to_plantuml(&g);

        // Both versions of B collapse to one edge target.
        assert_eq!(text.matches("    A --> B\n").count(), 2);
    }

    #[test]
    fn test_alias_sanitization() {
        assert_eq!(alias("Newtonsoft.Json"), "Newtonsoft_Json");
        assert_eq!(alias("System.Runtime-preview"), "System_Runtime_preview");
        assert_eq!(alias("plain"), "plain");
    }
}
