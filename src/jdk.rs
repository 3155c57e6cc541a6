//! Class identities for the installed JDK.
//!
//! The JDK ships no javadoc jar in the local repository, so its class list is
//! scraped from the published API docs for the detected major version.

use anyhow::{Context, Result, bail};
use regex::Regex;
use std::process::Command;
use std::time::Duration;
use tracing::info;

use crate::config::Config;
use crate::error::FinderError;
use crate::links::{Link, find_class_links};
use crate::record::ClassRecord;

const JDK_DOCS_ROOT: &str = "https://docs.oracle.com/en/java/javase";
const JDK_SOURCE_ROOT: &str = "https://raw.githubusercontent.com/openjdk/jdk/master/src";
const ALL_CLASSES_PAGE: &str = "allclasses-index.html";

fn java_command(java_bin: &str, args: &[&str]) -> Result<std::process::Output> {
    #[cfg(windows)]
    {
        let lower = java_bin.to_ascii_lowercase();
        if lower.ends_with(".cmd") || lower.ends_with(".bat") {
            return Command::new("cmd")
                .arg("/C")
                .arg(java_bin)
                .args(args)
                .output()
                .context("Failed to execute java (ensure JRE/JDK is installed)");
        }
    }

    Command::new(java_bin)
        .args(args)
        .output()
        .context("Failed to execute java (ensure JRE/JDK is installed)")
}

/// Pulls the major version out of `java -version` output. Legacy `1.x`
/// versions map to `x`.
pub fn parse_java_major_version(output: &str) -> Result<String, FinderError> {
    let re = Regex::new(r#"version "(?:1\.)?(\d+)"#).map_err(|_| FinderError::VersionDetection {
        output: output.to_string(),
    })?;
    re.captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| FinderError::VersionDetection {
            output: output.trim().to_string(),
        })
}

pub fn detect_java_major_version(java_bin: &str) -> Result<String> {
    let output = java_command(java_bin, &["-version"])?;
    if !output.status.success() {
        bail!(
            "java -version failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    // The version banner goes to stderr on most JDKs.
    let mut text = String::from_utf8_lossy(&output.stderr).to_string();
    text.push_str(&String::from_utf8_lossy(&output.stdout));
    let version = parse_java_major_version(&text)?;
    info!(version = %version, "Java version found");
    Ok(version)
}

pub fn docs_base_url(major_version: &str) -> String {
    format!("{JDK_DOCS_ROOT}/{major_version}/docs/api/")
}

/// `java.base/java/io/File.html` -> `java.io.File`. The leading module
/// directory is dropped when present.
pub fn jdk_class_name(href: &str) -> String {
    let trimmed = href.trim_end_matches(".html");
    let mut tokens: Vec<&str> = trimmed.split('/').filter(|t| !t.is_empty()).collect();
    if tokens.len() > 1 && tokens[0].contains('.') {
        tokens.remove(0);
    }
    tokens.join(".")
}

/// Best-effort location of the class source in the OpenJDK tree. Not checked,
/// and wrong for classes that live outside `share/classes`.
pub fn jdk_source_url(href: &str) -> String {
    let mut tokens = href.split('/');
    let module = tokens.next().unwrap_or_default();
    let rest: Vec<&str> = tokens.collect();
    let path = format!("{module}/share/classes/{}", rest.join("/"));
    format!("{JDK_SOURCE_ROOT}/{}", path.replace(".html", ".java"))
}

pub fn records_from_links(major_version: &str, base_url: &str, links: &[Link]) -> Vec<ClassRecord> {
    links
        .iter()
        .map(|link| {
            ClassRecord::from_jdk(
                major_version,
                jdk_class_name(&link.href),
                format!("{base_url}{}", link.href),
                jdk_source_url(&link.href),
            )
        })
        .collect()
}

pub fn http_client() -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(None::<Duration>)
        .user_agent(concat!("doc-finder/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

pub fn fetch_text(client: &reqwest::blocking::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .send()
        .with_context(|| format!("Failed to fetch {url}"))?
        .error_for_status()
        .with_context(|| format!("Bad response from {url}"))?;
    response
        .text()
        .with_context(|| format!("Failed to read body of {url}"))
}

/// Detects the runtime version, downloads the all-classes page and turns
/// every class/interface link into a JDK record.
pub fn harvest_jdk_classes(config: &Config) -> Result<Vec<ClassRecord>> {
    let version = detect_java_major_version(&config.java_bin)?;
    let base_url = docs_base_url(&version);
    let url = format!("{base_url}{ALL_CLASSES_PAGE}");

    info!(url = %url, "Fetching JDK classes");
    let html = fetch_text(&http_client()?, &url)?;
    let links = find_class_links(&html)?;
    Ok(records_from_links(&version, &base_url, &links))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_java_major_version_handles_modern_and_legacy_banners() {
        let modern = "openjdk version \"17.0.2\" 2022-01-18\nOpenJDK Runtime Environment";
        assert_eq!(parse_java_major_version(modern).unwrap(), "17");

        let ga = "openjdk version \"21\" 2023-09-19";
        assert_eq!(parse_java_major_version(ga).unwrap(), "21");

        let legacy = "java version \"1.8.0_392\"";
        assert_eq!(parse_java_major_version(legacy).unwrap(), "8");
    }

    #[test]
    fn parse_java_major_version_rejects_garbage() {
        assert!(matches!(
            parse_java_major_version("command not found"),
            Err(FinderError::VersionDetection { .. })
        ));
    }

    #[test]
    fn jdk_names_and_source_urls_follow_module_layout() {
        let href = "java.base/java/io/File.html";
        assert_eq!(jdk_class_name(href), "java.io.File");
        assert_eq!(
            jdk_source_url(href),
            "https://raw.githubusercontent.com/openjdk/jdk/master/src/java.base/share/classes/java/io/File.java"
        );
        assert_eq!(jdk_class_name("java/util/Map.Entry.html"), "java.util.Map.Entry");
    }

    #[test]
    fn records_from_all_classes_page() -> Result<()> {
        let html = r#"<table>
<tr><td><a href="java.base/java/io/File.html" title="class in java.io">File</a></td></tr>
<tr><td><a href="java.base/java/lang/Runnable.html" title="interface in java.lang">Runnable</a></td></tr>
<tr><td><a href="java.base/java/time/DayOfWeek.html" title="enum class in java.time">DayOfWeek</a></td></tr>
</table>"#;
        let base = docs_base_url("21");
        let records = records_from_links("21", &base, &find_class_links(html)?);

        let keys: Vec<&str> = records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "jdk:java.base:21:java.io.File",
                "jdk:java.base:21:java.lang.Runnable",
                "jdk:java.base:21:java.time.DayOfWeek"
            ]
        );
        assert_eq!(
            records[0].javadoc_path,
            "https://docs.oracle.com/en/java/javase/21/docs/api/java.base/java/io/File.html"
        );
        assert!(records.iter().all(|r| r.artifact().is_none()));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn detect_java_major_version_reads_stderr_banner() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir()?;
        let fake_java = tmp.path().join("java");
        std::fs::write(
            &fake_java,
            "#!/bin/sh\necho 'openjdk version \"11.0.20\" 2023-07-18' >&2\n",
        )?;
        std::fs::set_permissions(&fake_java, std::fs::Permissions::from_mode(0o755))?;

        let version = detect_java_major_version(fake_java.to_str().context("utf-8 path")?)?;
        assert_eq!(version, "11");
        Ok(())
    }
}
