//! Class/interface anchors as they appear in javadoc index pages.

use anyhow::{Result, anyhow};
use scraper::{Html, Selector};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub text: String,
    pub title: String,
    pub href: String,
}

pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector {css:?}: {e}"))
}

/// Substring match, so newer `enum class in` titles count while older
/// `enum in` titles do not.
pub fn is_code_link(title: &str) -> bool {
    title.contains("class in") || title.contains("interface in")
}

pub fn is_local_link(href: &str) -> bool {
    !href.contains("http://") && !href.contains("https://") && !href.contains("is-external=true")
}

/// Collects every anchor whose title marks it as a class or interface and
/// whose href stays inside the documentation tree.
pub fn find_class_links(html: &str) -> Result<Vec<Link>> {
    let doc = Html::parse_document(html);
    let anchors = selector("a[href][title]")?;

    let mut links = Vec::new();
    for a in doc.select(&anchors) {
        let (Some(href), Some(title)) = (a.value().attr("href"), a.value().attr("title")) else {
            continue;
        };
        if !is_code_link(title) || !is_local_link(href) {
            continue;
        }
        links.push(Link {
            text: a.text().collect::<String>(),
            title: title.to_string(),
            href: strip_fragment(href).to_string(),
        });
    }
    Ok(links)
}

fn strip_fragment(href: &str) -> &str {
    let end = href.find(['#', '?']).unwrap_or(href.len());
    &href[..end]
}
