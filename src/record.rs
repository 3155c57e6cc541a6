use serde::{Deserialize, Serialize};

use crate::coords::ArtifactCoordinates;

/// Module every JDK class is filed under in its canonical key.
pub const JDK_MODULE: &str = "java.base";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassOrigin {
    Artifact(ArtifactCoordinates),
    Jdk { major_version: String },
}

/// One indexed class.
///
/// `javadoc_path` and `source_path` are either relative to the output root
/// (artifact classes) or absolute URLs (JDK classes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassRecord {
    pub key: String,
    pub name: String,
    pub javadoc_path: String,
    pub source_path: String,
    pub origin: ClassOrigin,
}

impl ClassRecord {
    pub fn from_artifact(
        coords: &ArtifactCoordinates,
        name: String,
        javadoc_path: String,
        source_path: String,
    ) -> Self {
        let origin = ClassOrigin::Artifact(coords.clone());
        Self {
            key: canonical_key(&origin, &name),
            name,
            javadoc_path,
            source_path,
            origin,
        }
    }

    pub fn from_jdk(
        major_version: &str,
        name: String,
        javadoc_path: String,
        source_path: String,
    ) -> Self {
        let origin = ClassOrigin::Jdk {
            major_version: major_version.to_string(),
        };
        Self {
            key: canonical_key(&origin, &name),
            name,
            javadoc_path,
            source_path,
            origin,
        }
    }

    pub fn artifact(&self) -> Option<&ArtifactCoordinates> {
        match &self.origin {
            ClassOrigin::Artifact(coords) => Some(coords),
            ClassOrigin::Jdk { .. } => None,
        }
    }

    pub fn jdk_version(&self) -> Option<&str> {
        match &self.origin {
            ClassOrigin::Jdk { major_version } => Some(major_version.as_str()),
            ClassOrigin::Artifact(_) => None,
        }
    }

    pub fn is_jdk(&self) -> bool {
        matches!(self.origin, ClassOrigin::Jdk { .. })
    }

    /// Whether the record passes optional exact group/artifact/version filters.
    /// JDK classes carry no coordinates, so any non-empty filter excludes them.
    pub fn matches_filters(&self, filters: &CoordinateFilters) -> bool {
        let (group, artifact, version) = match self.artifact() {
            Some(c) => (c.group_id.as_str(), c.artifact_id.as_str(), c.version.as_str()),
            None => ("", "", ""),
        };
        field_matches(filters.group.as_deref(), group)
            && field_matches(filters.artifact.as_deref(), artifact)
            && field_matches(filters.version.as_deref(), version)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoordinateFilters {
    pub group: Option<String>,
    pub artifact: Option<String>,
    pub version: Option<String>,
}

fn field_matches(filter: Option<&str>, value: &str) -> bool {
    match filter {
        None | Some("") => true,
        Some(f) => f == value,
    }
}

pub fn canonical_key(origin: &ClassOrigin, name: &str) -> String {
    match origin {
        ClassOrigin::Artifact(c) => {
            format!("{}:{}:{}:{name}", c.group_id, c.artifact_id, c.version)
        }
        ClassOrigin::Jdk { major_version } => format!("jdk:{JDK_MODULE}:{major_version}:{name}"),
    }
}

pub fn is_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn coords() -> ArtifactCoordinates {
        ArtifactCoordinates {
            path: PathBuf::from("/m2/repository/com/example/lib/1.0/lib-1.0-javadoc.jar"),
            group_id: "com.example".to_string(),
            artifact_id: "lib".to_string(),
            version: "1.0".to_string(),
            classifier: "javadoc".to_string(),
        }
    }

    #[test]
    fn canonical_keys_differ_by_origin() {
        let artifact = ClassRecord::from_artifact(
            &coords(),
            "com.example.Widget".to_string(),
            String::new(),
            String::new(),
        );
        assert_eq!(artifact.key, "com.example:lib:1.0:com.example.Widget");

        let jdk = ClassRecord::from_jdk("21", "java.io.File".to_string(), String::new(), String::new());
        assert_eq!(jdk.key, "jdk:java.base:21:java.io.File");
        assert!(jdk.is_jdk());
        assert_eq!(jdk.jdk_version(), Some("21"));
        assert!(jdk.artifact().is_none());
    }

    #[test]
    fn filters_exclude_jdk_classes_when_set() {
        let jdk = ClassRecord::from_jdk("21", "java.io.File".to_string(), String::new(), String::new());
        assert!(jdk.matches_filters(&CoordinateFilters::default()));
        assert!(!jdk.matches_filters(&CoordinateFilters {
            group: Some("com.example".to_string()),
            ..Default::default()
        }));

        let artifact = ClassRecord::from_artifact(
            &coords(),
            "com.example.Widget".to_string(),
            String::new(),
            String::new(),
        );
        assert!(artifact.matches_filters(&CoordinateFilters {
            group: Some("com.example".to_string()),
            artifact: Some("lib".to_string()),
            version: Some("1.0".to_string()),
        }));
        assert!(!artifact.matches_filters(&CoordinateFilters {
            version: Some("2.0".to_string()),
            ..Default::default()
        }));
    }
}
