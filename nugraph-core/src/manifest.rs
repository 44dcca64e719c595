use crate::{NugraphError, Result};
use std::collections::BTreeSet;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// Namespace the nuspec schema pins its elements to. Manifests under a
/// different namespace contribute no dependencies and no authors.
pub const NUSPEC_NAMESPACE: &str = "http://schemas.microsoft.com/packaging/2013/05/nuspec.xsd";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ManifestInfo {
    /// Declared (id, version) pairs, in document order.
    pub dependencies: Vec<(String, String)>,
    pub authors: BTreeSet<String>,
}

/// Locates the `.nuspec` entry inside a `.nupkg` archive and parses it.
///
/// Returns `NoManifest` when the archive holds no `.nuspec` entry and
/// `MalformedManifest` when the entry is not well-formed XML. Dependency
/// elements missing an `id` or `version` attribute are skipped.
pub fn extract(archive: &[u8]) -> Result<ManifestInfo> {
    let xml = read_nuspec(archive)?;
    parse_nuspec(&xml)
}

fn read_nuspec(archive: &[u8]) -> Result<String> {
    let cursor = Cursor::new(archive);
    let mut zip = ZipArchive::new(cursor).map_err(|source| NugraphError::InvalidArchive {
        reason: source.to_string(),
    })?;

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(|source| NugraphError::InvalidArchive {
            reason: source.to_string(),
        })?;

        if !entry.name().ends_with(".nuspec") {
            continue;
        }

        let mut xml = String::new();
        entry
            .read_to_string(&mut xml)
            .map_err(|source| NugraphError::InvalidArchive {
                reason: source.to_string(),
            })?;

        return Ok(xml);
    }

    Err(NugraphError::NoManifest)
}

fn parse_nuspec(xml: &str) -> Result<ManifestInfo> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|source| NugraphError::MalformedManifest { source })?;

    let mut dependencies = Vec::new();
    for node in doc
        .descendants()
        .filter(|node| node.has_tag_name((NUSPEC_NAMESPACE, "dependency")))
    {
        match (node.attribute("id"), node.attribute("version")) {
            (Some(id), Some(version)) if !id.is_empty() && !version.is_empty() => {
                dependencies.push((id.to_string(), version.to_string()));
            }
            // Pairs missing either attribute are dropped, not errors.
            _ => {}
        }
    }

    let mut authors = BTreeSet::new();
    if let Some(node) = doc
        .descendants()
        .find(|node| node.has_tag_name((NUSPEC_NAMESPACE, "authors")))
        && let Some(text) = node.text()
    {
        for name in text.split(',') {
            let name = name.trim();
            if !name.is_empty() {
                authors.insert(name.to_string());
            }
        }
    }

    Ok(ManifestInfo {
        dependencies,
        authors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn nupkg(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);

        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }

        writer.finish().unwrap().into_inner()
    }

    fn nuspec(body: &str) -> String {
        format!(
            r#"<?xml version="1.0"?>
<package xmlns="{}">
  <metadata>
{}
  </metadata>
</package>"#,
            NUSPEC_NAMESPACE, body
        )
    }

    #[test]
    fn test_extract_dependencies_and_authors() {
        let xml = nuspec(
            r#"    <id>A</id>
    <version>1.0</version>
    <authors>Alice, Bob</authors>
    <dependencies>
      <dependency id="B" version="2.0" />
      <dependency id="C" version="3.1.4" />
    </dependencies>"#,
        );
        let archive = nupkg(&[("A.nuspec", xml.as_str())]);

        let info = extract(&archive).unwrap();

        assert_eq!(
            info.dependencies,
            vec![
                ("B".to_string(), "2.0".to_string()),
                ("C".to_string(), "3.1.4".to_string()),
            ]
        );
        assert_eq!(
            info.authors,
            BTreeSet::from(["Alice".to_string(), "Bob".to_string()])
        );
    }

    #[test]
    fn test_missing_manifest() {
        let archive = nupkg(&[("readme.txt", "no manifest here")]);

        match extract(&archive) {
            Err(NugraphError::NoManifest) => {}
            other => panic!("expected NoManifest, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_xml() {
        let archive = nupkg(&[("A.nuspec", "<package><unclosed")]);

        match extract(&archive) {
            Err(NugraphError::MalformedManifest { .. }) => {}
            other => panic!("expected MalformedManifest, got {:?}", other),
        }
    }

    #[test]
    fn test_not_an_archive() {
        match extract(b"plainly not a zip file") {
            Err(NugraphError::InvalidArchive { .. }) => {}
            other => panic!("expected InvalidArchive, got {:?}", other),
        }
    }

    #[test]
    fn test_dependency_missing_version_is_skipped() {
        let xml = nuspec(
            r#"    <dependencies>
      <dependency id="B" />
      <dependency id="C" version="" />
      <dependency version="2.0" />
      <dependency id="D" version="4.0" />
    </dependencies>"#,
        );
        let archive = nupkg(&[("A.nuspec", xml.as_str())]);

        let info = extract(&archive).unwrap();

        assert_eq!(info.dependencies, vec![("D".to_string(), "4.0".to_string())]);
    }

    #[test]
    fn test_foreign_namespace_is_ignored() {
        let xml = r#"<?xml version="1.0"?>
<package xmlns="http://example.com/not-nuspec">
  <metadata>
    <authors>Mallory</authors>
    <dependencies>
      <dependency id="B" version="2.0" />
    </dependencies>
  </metadata>
</package>"#;
        let archive = nupkg(&[("A.nuspec", xml)]);

        let info = extract(&archive).unwrap();

        assert!(info.dependencies.is_empty());
        assert!(info.authors.is_empty());
    }

    #[test]
    fn test_author_names_are_trimmed() {
        let xml = nuspec("    <authors> Alice ,, Bob , </authors>");
        let archive = nupkg(&[("A.nuspec", xml.as_str())]);

        let info = extract(&archive).unwrap();

        assert_eq!(
            info.authors,
            BTreeSet::from(["Alice".to_string(), "Bob".to_string()])
        );
    }
}
