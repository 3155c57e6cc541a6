//! Persistent class index.
//!
//! Uses LMDB (via heed) with a single `classes` database mapping canonical key
//! to a JSON-encoded [`ClassRecord`]. Writes are insert-or-ignore: the first
//! record stored under a key wins until the index is removed.

use anyhow::{Context, Result};
use heed::types::Str;
use heed::{Database, Env, EnvFlags, EnvOpenOptions};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::error::{FinderError, is_not_found};
use crate::record::{ClassRecord, CoordinateFilters};

pub const CLASSES_DB: &str = "classes";

const DEFAULT_MAP_SIZE: usize = 1024 * 1024 * 1024;
const DEFAULT_MAX_DBS: u32 = 4;

type StrDb = Database<Str, Str>;

#[derive(Debug)]
pub struct ClassIndex {
    env: Env,
    db_path: PathBuf,
    classes: StrDb,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub pattern: String,
    pub exact: bool,
    pub filters: CoordinateFilters,
}

impl SearchQuery {
    pub fn fuzzy(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            exact: false,
            filters: CoordinateFilters::default(),
        }
    }

    pub fn exact(pattern: &str) -> Self {
        Self {
            exact: true,
            ..Self::fuzzy(pattern)
        }
    }

    /// The LIKE pattern the name is matched against.
    pub fn like_pattern(&self) -> String {
        if self.exact {
            self.pattern.clone()
        } else {
            make_fuzzy(&self.pattern)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct IndexStats {
    pub db_path: String,
    pub records: u64,
    pub jdk_records: u64,
    pub artifact_records: u64,
    pub artifacts: u64,
}

impl ClassIndex {
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create index directory: {}", parent.display())
            })?;
        }

        let env = open_env(db_path)?;
        let mut wtxn = env.write_txn()?;
        let classes = env.create_database::<Str, Str>(&mut wtxn, Some(CLASSES_DB))?;
        wtxn.commit()?;

        Ok(Self {
            env,
            db_path: db_path.to_path_buf(),
            classes,
        })
    }

    /// Stores every record whose key is not present yet, in one transaction.
    /// Returns how many were new.
    pub fn insert_classes(&self, records: &[ClassRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut wtxn = self.env.write_txn()?;
        let mut inserted = 0usize;
        for record in records {
            if self.classes.get(&wtxn, record.key.as_str())?.is_some() {
                continue;
            }
            let payload = serde_json::to_string(record)?;
            self.classes.put(&mut wtxn, record.key.as_str(), payload.as_str())?;
            inserted += 1;
        }
        wtxn.commit()?;
        Ok(inserted)
    }

    pub fn fetch(&self, key: &str) -> Result<ClassRecord> {
        let rtxn = self.env.read_txn()?;
        match self.classes.get(&rtxn, key)? {
            Some(raw) => decode(key, raw),
            None => Err(FinderError::NotFound {
                key: key.to_string(),
            }
            .into()),
        }
    }

    /// Records whose name matches the query, ordered by name. An exact query
    /// holding a canonical key (class names never contain `:`) is a key lookup.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<ClassRecord>> {
        if query.exact && query.pattern.contains(':') {
            return match self.fetch(query.pattern.trim()) {
                Ok(record) if record.matches_filters(&query.filters) => Ok(vec![record]),
                Ok(_) => Ok(Vec::new()),
                Err(e) if is_not_found(&e) => Ok(Vec::new()),
                Err(e) => Err(e),
            };
        }

        let matcher = like_regex(&query.like_pattern())?;
        let rtxn = self.env.read_txn()?;

        let mut hits = Vec::new();
        for item in self.classes.iter(&rtxn)? {
            let (key, raw) = item?;
            let record = decode(key, raw)?;
            if matcher.is_match(&record.name) && record.matches_filters(&query.filters) {
                hits.push(record);
            }
        }
        hits.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.key.cmp(&b.key)));
        Ok(hits)
    }

    pub fn count(&self) -> Result<u64> {
        let rtxn = self.env.read_txn()?;
        Ok(self.classes.len(&rtxn)?)
    }

    pub fn stats(&self) -> Result<IndexStats> {
        let rtxn = self.env.read_txn()?;
        let mut records = 0u64;
        let mut jdk_records = 0u64;
        let mut artifacts = BTreeSet::new();
        for item in self.classes.iter(&rtxn)? {
            let (key, raw) = item?;
            let record = decode(key, raw)?;
            records += 1;
            match record.artifact() {
                Some(coords) => {
                    artifacts.insert(coords.gav());
                }
                None => jdk_records += 1,
            }
        }

        Ok(IndexStats {
            db_path: self.db_path.to_string_lossy().to_string(),
            records,
            jdk_records,
            artifact_records: records - jdk_records,
            artifacts: artifacts.len() as u64,
        })
    }
}

fn open_env(db_path: &Path) -> Result<Env> {
    let mut options = EnvOpenOptions::new();
    options.map_size(DEFAULT_MAP_SIZE);
    options.max_dbs(DEFAULT_MAX_DBS);
    // SAFETY: Default LMDB locking is kept. NO_SUB_DIR stores the index as a
    // single file next to its lock file.
    unsafe {
        options.flags(EnvFlags::NO_SUB_DIR);
        options
            .open(db_path)
            .with_context(|| format!("Failed to create/open index: {}", db_path.display()))
    }
}

fn decode(key: &str, raw: &str) -> Result<ClassRecord> {
    serde_json::from_str(raw).with_context(|| format!("Corrupt index record: {key}"))
}

/// Turns every whitespace run into a wildcard and wraps the whole query in
/// wildcards: `java io file` -> `%java%io%file%`.
pub fn make_fuzzy(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('%');
    let mut in_space = false;
    for ch in pattern.chars() {
        if ch.is_whitespace() {
            if !in_space {
                out.push('%');
            }
            in_space = true;
        } else {
            out.push(ch);
            in_space = false;
        }
    }
    out.push('%');
    out
}

/// Compiles a SQL LIKE pattern (`%` any run, `_` any single char) into a
/// case-insensitive, fully anchored regex.
pub fn like_regex(pattern: &str) -> Result<Regex> {
    let mut re = String::from("(?is)^");
    let mut literal = String::new();
    for ch in pattern.chars() {
        match ch {
            '%' | '_' => {
                re.push_str(&regex::escape(&literal));
                literal.clear();
                re.push_str(if ch == '%' { ".*" } else { "." });
            }
            _ => literal.push(ch),
        }
    }
    re.push_str(&regex::escape(&literal));
    re.push('$');
    Regex::new(&re).with_context(|| format!("Invalid search pattern: {pattern}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::ArtifactCoordinates;

    fn coords(group: &str, artifact: &str, version: &str) -> ArtifactCoordinates {
        ArtifactCoordinates {
            path: PathBuf::from(format!(
                "/m2/repository/{}/{artifact}/{version}/{artifact}-{version}-javadoc.jar",
                group.replace('.', "/")
            )),
            group_id: group.to_string(),
            artifact_id: artifact.to_string(),
            version: version.to_string(),
            classifier: "javadoc".to_string(),
        }
    }

    fn artifact_record(c: &ArtifactCoordinates, name: &str, javadoc: &str) -> ClassRecord {
        ClassRecord::from_artifact(c, name.to_string(), javadoc.to_string(), String::new())
    }

    fn jdk_record(name: &str) -> ClassRecord {
        ClassRecord::from_jdk("21", name.to_string(), String::new(), String::new())
    }

    #[test]
    fn make_fuzzy_wraps_and_joins_words() {
        assert_eq!(make_fuzzy("java io  file"), "%java%io%file%");
        assert_eq!(make_fuzzy("Widget"), "%Widget%");
    }

    #[test]
    fn like_regex_is_case_insensitive_and_anchored() -> Result<()> {
        let re = like_regex("%java%io%file%")?;
        assert!(re.is_match("java.io.File"));
        assert!(!like_regex("java io file")?.is_match("java.io.File"));
        assert!(like_regex("java.io.file")?.is_match("java.io.File"));
        assert!(!like_regex("java.io.file")?.is_match("java.io.FileReader"));
        assert!(like_regex("java.io.Fil_")?.is_match("java.io.File"));
        Ok(())
    }

    #[test]
    fn insert_is_idempotent_and_first_write_wins() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let index = ClassIndex::open(&tmp.path().join("java.lmdb"))?;
        let c = coords("com.example", "lib", "1.0");

        let first = vec![
            artifact_record(&c, "com.example.Widget", "first.html"),
            artifact_record(&c, "com.example.Gadget", "g.html"),
            jdk_record("java.io.File"),
        ];
        assert_eq!(index.insert_classes(&first)?, 3);
        assert_eq!(index.insert_classes(&first)?, 0);

        let conflicting = vec![artifact_record(&c, "com.example.Widget", "second.html")];
        assert_eq!(index.insert_classes(&conflicting)?, 0);
        assert_eq!(index.count()?, 3);
        assert_eq!(
            index.fetch("com.example:lib:1.0:com.example.Widget")?.javadoc_path,
            "first.html"
        );
        Ok(())
    }

    #[test]
    fn search_fuzzy_exact_and_filters() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let index = ClassIndex::open(&tmp.path().join("java.lmdb"))?;
        let v1 = coords("com.example", "lib", "1.0");
        let v2 = coords("com.example", "lib", "2.0");
        index.insert_classes(&[
            jdk_record("java.io.File"),
            jdk_record("java.io.FileReader"),
            artifact_record(&v1, "com.example.Widget", ""),
            artifact_record(&v2, "com.example.Widget", ""),
            artifact_record(&v1, "com.example.Alpha", ""),
        ])?;

        let fuzzy = index.search(&SearchQuery::fuzzy("java io file"))?;
        let names: Vec<&str> = fuzzy.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["java.io.File", "java.io.FileReader"]);

        assert!(index.search(&SearchQuery::exact("java io file"))?.is_empty());
        assert_eq!(index.search(&SearchQuery::exact("JAVA.IO.FILE"))?.len(), 1);

        let mut filtered = SearchQuery::fuzzy("widget");
        filtered.filters.version = Some("2.0".to_string());
        let hits = index.search(&filtered)?;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "com.example:lib:2.0:com.example.Widget");

        let all = index.search(&SearchQuery::fuzzy(""))?;
        let names: Vec<&str> = all.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "com.example.Alpha",
                "com.example.Widget",
                "com.example.Widget",
                "java.io.File",
                "java.io.FileReader"
            ]
        );
        Ok(())
    }

    #[test]
    fn exact_search_accepts_canonical_keys() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let index = ClassIndex::open(&tmp.path().join("java.lmdb"))?;
        let c = coords("com.example", "lib", "1.0");
        index.insert_classes(&[
            jdk_record("java.io.File"),
            artifact_record(&c, "com.example.Widget", ""),
        ])?;

        let jdk = index.search(&SearchQuery::exact("jdk:java.base:21:java.io.File"))?;
        assert_eq!(jdk.len(), 1);
        assert!(jdk[0].is_jdk());
        let artifact = index.search(&SearchQuery::exact("com.example:lib:1.0:com.example.Widget"))?;
        assert_eq!(artifact[0].name, "com.example.Widget");
        assert!(index.search(&SearchQuery::exact("com.example:lib:9.9:com.example.Widget"))?.is_empty());
        Ok(())
    }

    #[test]
    fn fetch_unknown_key_is_not_found() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let index = ClassIndex::open(&tmp.path().join("java.lmdb"))?;
        index.insert_classes(&[jdk_record("java.io.File")])?;

        assert!(index.fetch("jdk:java.base:21:java.io.File")?.is_jdk());
        let err = index.fetch("jdk:java.base:21:java.io.Nope").unwrap_err();
        assert!(is_not_found(&err));
        Ok(())
    }

    #[test]
    fn stats_split_jdk_and_artifact_records() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let index = ClassIndex::open(&tmp.path().join("java.lmdb"))?;
        let c = coords("com.example", "lib", "1.0");
        index.insert_classes(&[
            jdk_record("java.io.File"),
            artifact_record(&c, "com.example.Widget", ""),
            artifact_record(&c, "com.example.Gadget", ""),
        ])?;

        let stats = index.stats()?;
        assert_eq!(stats.records, 3);
        assert_eq!(stats.jdk_records, 1);
        assert_eq!(stats.artifact_records, 2);
        assert_eq!(stats.artifacts, 1);
        Ok(())
    }
}
