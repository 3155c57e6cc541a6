use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::coords::{JAVADOC_CLASSIFIER, SOURCES_CLASSIFIER, default_m2_repository};

pub const HOME_ENV: &str = "DOC_FINDER_HOME";
pub const JAVA_ENV: &str = "DOC_FINDER_JAVA";

const INDEX_FILE: &str = "java.lmdb";

/// Locations every component works against, passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub repository_root: PathBuf,
    pub output_root: PathBuf,
    pub java_bin: String,
}

impl Config {
    pub fn new(repository_root: PathBuf, output_root: PathBuf) -> Self {
        Self {
            repository_root,
            output_root,
            java_bin: "java".to_string(),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.output_root.join(INDEX_FILE)
    }

    /// Cache location for a JDK page or source fetched over HTTP, kept
    /// apart per major version.
    pub fn jdk_cache_path(
        &self,
        classifier: &str,
        major_version: &str,
        name: &str,
        extension: &str,
    ) -> PathBuf {
        self.output_root
            .join(classifier)
            .join("_jdk")
            .join(major_version)
            .join(format!("{name}.{extension}"))
    }
}

pub fn resolve_config(cli: &Cli) -> Result<Config> {
    let repository_root = match cli.m2.clone() {
        Some(p) => p,
        None => default_m2_repository()?,
    };

    let output_root = match cli.home.clone() {
        Some(p) => p,
        None => match env::var(HOME_ENV) {
            Ok(p) if !p.is_empty() => PathBuf::from(p),
            _ => doc_finder_home()?,
        },
    };

    let java_bin = env::var(JAVA_ENV)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "java".to_string());

    Ok(Config {
        repository_root,
        output_root,
        java_bin,
    })
}

/// Removes the index. With `extracted`, also drops unpacked archives so the
/// next run extracts everything again.
pub fn clear_index(config: &Config, extracted: bool) -> Result<()> {
    let db_path = config.db_path();
    remove_file_if_exists(&db_path, "index")?;
    remove_file_if_exists(&lmdb_lock_path(&db_path), "index lock")?;

    if extracted {
        for classifier in [JAVADOC_CLASSIFIER, SOURCES_CLASSIFIER] {
            let dir = config.output_root.join(classifier);
            if dir.exists() {
                std::fs::remove_dir_all(&dir)
                    .with_context(|| format!("Failed to remove directory: {}", dir.display()))?;
            }
        }
    }
    Ok(())
}

fn doc_finder_home() -> Result<PathBuf> {
    let base = dirs::data_local_dir()
        .or_else(dirs::cache_dir)
        .or_else(dirs::home_dir)
        .ok_or_else(|| anyhow::anyhow!("Failed to resolve data directory"))?;
    Ok(base.join("doc-finder"))
}

fn lmdb_lock_path(db_path: &Path) -> PathBuf {
    let mut os = db_path.as_os_str().to_os_string();
    os.push("-lock");
    PathBuf::from(os)
}

fn remove_file_if_exists(path: &Path, kind: &str) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)
            .with_context(|| format!("Failed to remove {kind} file: {}", path.display()))?;
    }
    Ok(())
}
