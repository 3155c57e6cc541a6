use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;
use crate::coords::{JAVADOC_CLASSIFIER, SOURCES_CLASSIFIER};
use crate::index::ClassIndex;
use crate::jdk::{fetch_text, http_client};
use crate::markdown::render_markdown;
use crate::record::{ClassRecord, is_url};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Markdown,
    Source,
}

/// Looks `key` up and renders it. A missing key surfaces as
/// `FinderError::NotFound` somewhere in the error chain.
pub fn view_class(config: &Config, index: &ClassIndex, key: &str, mode: ViewMode) -> Result<String> {
    let record = index.fetch(key)?;
    view_record(config, &record, mode)
}

pub fn view_record(config: &Config, record: &ClassRecord, mode: ViewMode) -> Result<String> {
    match mode {
        ViewMode::Markdown => {
            let html = load_document(config, record, &record.javadoc_path, JAVADOC_CLASSIFIER, "html")?;
            render_markdown(&html)
        }
        ViewMode::Source => {
            load_document(config, record, &record.source_path, SOURCES_CLASSIFIER, "java")
        }
    }
}

/// Reads a local document relative to the output root, or fetches a remote
/// one once and serves it from the on-disk cache afterwards.
fn load_document(
    config: &Config,
    record: &ClassRecord,
    path: &str,
    classifier: &str,
    extension: &str,
) -> Result<String> {
    if !is_url(path) {
        let local = config.output_root.join(path);
        return std::fs::read_to_string(&local)
            .with_context(|| format!("Failed to read {}", local.display()));
    }

    let version = record.jdk_version().unwrap_or("remote");
    let cached = config.jdk_cache_path(classifier, version, &record.name, extension);
    if cached.exists() {
        debug!(path = %cached.display(), "Using cached JDK document");
        return std::fs::read_to_string(&cached)
            .with_context(|| format!("Failed to read {}", cached.display()));
    }

    info!(url = %path, "Fetching JDK document");
    let body = fetch_text(&http_client()?, path)?;
    write_cache(&cached, &body)?;
    Ok(body)
}

fn write_cache(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, body)
        .with_context(|| format!("Failed to write cache file: {}", path.display()))
}
