//! Maven coordinates derived from where an archive sits in a local repository.

use anyhow::Result;
use ignore::WalkBuilder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::FinderError;

pub const JAVADOC_CLASSIFIER: &str = "javadoc";
pub const SOURCES_CLASSIFIER: &str = "sources";

const REPOSITORY_ANCHOR: &str = "repository";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactCoordinates {
    pub path: PathBuf,
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
    pub classifier: String,
}

impl ArtifactCoordinates {
    /// Path of the extracted archive relative to the output root:
    /// `classifier/group/path/artifactId/version`.
    pub fn output_dir(&self) -> PathBuf {
        let mut dir = PathBuf::from(&self.classifier);
        for part in self.group_id.split('.') {
            dir.push(part);
        }
        dir.push(&self.artifact_id);
        dir.push(&self.version);
        dir
    }

    pub fn is_javadoc(&self) -> bool {
        self.classifier == JAVADOC_CLASSIFIER
    }

    pub fn gav(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

pub fn default_m2_repository() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Failed to resolve home directory"))?;
    Ok(home.join(".m2").join("repository"))
}

/// Only documentation and source archives are worth unpacking.
pub fn is_eligible_archive(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with("-javadoc.jar") || n.ends_with("-sources.jar"))
}

pub fn parse_classifier(path: &Path, artifact_id: &str, version: &str) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let prefix = format!("{artifact_id}-{version}-");
    stem.strip_prefix(&prefix).unwrap_or_default().to_string()
}

pub fn parse_path(path: &Path) -> Result<ArtifactCoordinates, FinderError> {
    let normalized = path.to_string_lossy().replace('\\', "/");
    let parts: Vec<&str> = normalized.split('/').collect();

    for i in (0..parts.len()).rev() {
        if parts[i] != REPOSITORY_ANCHOR || i + 3 >= parts.len() {
            continue;
        }

        let n = parts.len();
        let group_id = parts[i + 1..n - 3].join(".");
        let artifact_id = parts[n - 3].to_string();
        let version = parts[n - 2].to_string();
        let classifier = parse_classifier(path, &artifact_id, &version);
        return Ok(ArtifactCoordinates {
            path: path.to_path_buf(),
            group_id,
            artifact_id,
            version,
            classifier,
        });
    }

    Err(FinderError::MalformedCoordinates {
        path: path.display().to_string(),
    })
}

#[derive(Debug, Default)]
pub struct Discovery {
    pub artifacts: Vec<ArtifactCoordinates>,
    pub malformed: usize,
}

/// Walks `repository_root` and resolves every eligible archive.
///
/// Archives whose path does not decompose into coordinates are logged and
/// counted, never fatal.
pub fn discover_artifacts(repository_root: &Path) -> Result<Discovery> {
    let walker = WalkBuilder::new(repository_root)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .parents(false)
        .sort_by_file_path(|a, b| a.cmp(b))
        .build();

    let mut discovery = Discovery::default();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable repository entry");
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        let path = entry.path();
        if !is_eligible_archive(path) {
            continue;
        }
        match parse_path(path) {
            Ok(coords) => discovery.artifacts.push(coords),
            Err(e) => {
                warn!(error = %e, "Skipping archive");
                discovery.malformed += 1;
            }
        }
    }

    Ok(discovery)
}
