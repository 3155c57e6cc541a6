use anyhow::Result;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::coords::discover_artifacts;
use crate::extract::{ExtractOutcome, extract_artifact};
use crate::index::ClassIndex;
use crate::javadoc::harvest_artifact_classes;
use crate::jdk::harvest_jdk_classes;

#[derive(Debug, Clone, Copy)]
pub struct IndexOptions {
    pub include_jdk: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self { include_jdk: true }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct IndexSummary {
    pub repository_root: String,
    pub artifacts: usize,
    pub extracted: usize,
    pub already_extracted: usize,
    pub failed_artifacts: usize,
    pub malformed_paths: usize,
    pub jdk_classes: usize,
    pub jdk_error: Option<String>,
    pub artifact_classes: usize,
    pub inserted: usize,
    pub duration_ms: u64,
}

/// One full pass over the repository: discover, extract, harvest, store.
///
/// Per-artifact failures are logged and counted; only index I/O aborts the run.
pub fn run_index(config: &Config, index: &ClassIndex, options: IndexOptions) -> Result<IndexSummary> {
    let start = Instant::now();
    let mut summary = IndexSummary {
        repository_root: config.repository_root.to_string_lossy().to_string(),
        ..Default::default()
    };

    info!(repo = %config.repository_root.display(), "Indexing repository");
    let discovery = discover_artifacts(&config.repository_root)?;
    summary.artifacts = discovery.artifacts.len();
    summary.malformed_paths = discovery.malformed;

    let mut javadoc_artifacts = Vec::new();
    for coords in discovery.artifacts.iter() {
        match extract_artifact(coords, &config.output_root) {
            Ok(outcome) => {
                match &outcome {
                    ExtractOutcome::Extracted { dest, files } => {
                        debug!(dest = %dest.display(), files, "Extracted artifact");
                        summary.extracted += 1;
                    }
                    ExtractOutcome::AlreadyPresent { .. } => summary.already_extracted += 1,
                }
                if coords.is_javadoc() {
                    javadoc_artifacts.push(coords);
                }
            }
            Err(e) => {
                warn!(artifact = %coords.path.display(), error = %format!("{e:#}"), "Error extracting artifact");
                summary.failed_artifacts += 1;
            }
        }
    }

    if options.include_jdk {
        match harvest_jdk_classes(config) {
            Ok(records) => {
                summary.jdk_classes = records.len();
                summary.inserted += index.insert_classes(&records)?;
            }
            Err(e) => {
                warn!(error = %format!("{e:#}"), "Skipping JDK classes");
                summary.jdk_error = Some(format!("{e:#}"));
            }
        }
    }

    for coords in javadoc_artifacts {
        match harvest_artifact_classes(&config.output_root, coords) {
            Ok(records) => {
                summary.artifact_classes += records.len();
                summary.inserted += index.insert_classes(&records)?;
            }
            Err(e) => {
                warn!(artifact = %coords.gav(), error = %format!("{e:#}"), "Error parsing class index");
                summary.failed_artifacts += 1;
            }
        }
    }

    summary.duration_ms = start.elapsed().as_millis() as u64;
    info!(
        artifacts = summary.artifacts,
        inserted = summary.inserted,
        "Indexing complete"
    );
    Ok(summary)
}
