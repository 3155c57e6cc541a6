//! Class identities harvested from an extracted javadoc archive.

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::coords::{ArtifactCoordinates, JAVADOC_CLASSIFIER, SOURCES_CLASSIFIER};
use crate::links::find_class_links;
use crate::record::ClassRecord;

/// Class index pages across javadoc generator versions.
pub const CLASS_INDEX_FILES: [&str; 3] = [
    "allclasses-frame.html",
    "allclasses-noframe.html",
    "package-tree.html",
];

pub fn discover_class_index_files(javadoc_root: &Path) -> Result<Vec<PathBuf>> {
    let walker = WalkBuilder::new(javadoc_root)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .parents(false)
        .sort_by_file_path(|a, b| a.cmp(b))
        .build();

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry
            .with_context(|| format!("Failed to walk javadoc tree: {}", javadoc_root.display()))?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let is_index = entry
            .file_name()
            .to_str()
            .is_some_and(|n| CLASS_INDEX_FILES.contains(&n));
        if is_index {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// Maps a javadoc page path to where the matching `.java` file should sit in
/// the extracted sources archive: the leading `javadoc` directory becomes
/// `sources` and `.html` becomes `.java`.
///
/// Best effort: nothing checks that the file exists until it is viewed.
pub fn javadoc_to_source_path(javadoc_path: &str) -> String {
    let swapped = match javadoc_path.strip_prefix(JAVADOC_CLASSIFIER) {
        Some(rest) if rest.starts_with('/') => format!("{SOURCES_CLASSIFIER}{rest}"),
        _ => javadoc_path.to_string(),
    };
    match swapped.strip_suffix(".html") {
        Some(stem) => format!("{stem}.java"),
        None => swapped,
    }
}

/// `com/example/Widget.html` -> `com.example.Widget`.
pub fn class_name_from_relative(relative: &Path) -> String {
    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect();
    parts.join(".").trim_end_matches(".html").to_string()
}

/// Lexically resolves `.` and `..` without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy().to_string()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Parses one class index page of the artifact extracted at `artifact_root`.
///
/// Links resolving outside the artifact root are dropped.
pub fn parse_class_index_html(
    output_root: &Path,
    artifact_root: &Path,
    coords: &ArtifactCoordinates,
    index_path: &Path,
) -> Result<Vec<ClassRecord>> {
    let html = std::fs::read_to_string(index_path)
        .with_context(|| format!("Failed to read class index: {}", index_path.display()))?;
    let links = find_class_links(&html)?;
    let index_dir = index_path.parent().unwrap_or(artifact_root);
    let artifact_root = normalize_path(artifact_root);
    let output_root = normalize_path(output_root);

    let mut records = Vec::with_capacity(links.len());
    for link in links {
        let page = normalize_path(&index_dir.join(&link.href));
        let Ok(relative) = page.strip_prefix(&artifact_root) else {
            debug!(href = %link.href, "Link leaves the artifact tree");
            continue;
        };
        let name = class_name_from_relative(relative);
        let javadoc_path = match page.strip_prefix(&output_root) {
            Ok(rel) => to_slash(rel),
            Err(_) => page.to_string_lossy().to_string(),
        };
        let source_path = javadoc_to_source_path(&javadoc_path);
        records.push(ClassRecord::from_artifact(coords, name, javadoc_path, source_path));
    }
    Ok(records)
}

/// All class records for one extracted javadoc artifact.
pub fn harvest_artifact_classes(
    output_root: &Path,
    coords: &ArtifactCoordinates,
) -> Result<Vec<ClassRecord>> {
    let artifact_root = output_root.join(coords.output_dir());
    let mut records = Vec::new();
    for index_path in discover_class_index_files(&artifact_root)? {
        debug!(index = %index_path.display(), "Parsing class index file");
        records.extend(parse_class_index_html(
            output_root,
            &artifact_root,
            coords,
            &index_path,
        )?);
    }
    Ok(records)
}
