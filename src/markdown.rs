//! Javadoc class page to Markdown.
//!
//! Targets the classic javadoc templates (`.header`, `ul.inheritance`,
//! `.description`, summary tables with `colFirst`/`colSecond`/`colLast`
//! cells). Anything missing from the page just leaves its section out.

use anyhow::Result;
use scraper::{ElementRef, Html};

use crate::links::selector;

pub const WRAP_WIDTH: usize = 80;
const INDENT: &str = "    ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub title: String,
    pub subtitles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constructor {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub modifier: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkdownDocument {
    pub title: String,
    pub header: Header,
    pub inheritance: Vec<String>,
    pub description: String,
    pub constructors: Vec<Constructor>,
    pub methods: Vec<Method>,
}

/// Drops zero-width spaces and collapses every whitespace run, NBSP
/// included, to one space.
pub fn normalize_whitespace(text: &str) -> String {
    text.replace('\u{200b}', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn element_text(el: &ElementRef<'_>) -> String {
    el.text().collect()
}

fn first_text(scope: &ElementRef<'_>, css: &str) -> Result<String> {
    let sel = selector(css)?;
    Ok(scope
        .select(&sel)
        .next()
        .map(|e| element_text(&e))
        .unwrap_or_default())
}

fn parse_title(doc: &Html) -> Result<String> {
    let sel = selector("title")?;
    Ok(doc
        .select(&sel)
        .next()
        .map(|e| normalize_whitespace(&element_text(&e)))
        .unwrap_or_default())
}

fn parse_header(doc: &Html) -> Result<Header> {
    let header_sel = selector(".header")?;
    let Some(header) = doc.select(&header_sel).next() else {
        return Ok(Header::default());
    };

    let subtitle_sel = selector(".subTitle")?;
    let subtitles = header
        .select(&subtitle_sel)
        .map(|s| normalize_whitespace(&element_text(&s)))
        .filter(|s| !s.is_empty())
        .collect();
    let title = normalize_whitespace(&first_text(&header, ".title")?);
    Ok(Header { title, subtitles })
}

fn parse_inheritance(doc: &Html) -> Result<Vec<String>> {
    let sel = selector("ul.inheritance > li:first-child")?;
    Ok(doc
        .select(&sel)
        .map(|li| normalize_whitespace(&element_text(&li)))
        .filter(|s| !s.is_empty())
        .collect())
}

fn parse_description(doc: &Html) -> Result<String> {
    let sel = selector(".description")?;
    let Some(block) = doc.select(&sel).next() else {
        return Ok(String::new());
    };
    let text = element_text(&block);
    let lines: Vec<String> = text
        .lines()
        .map(normalize_whitespace)
        .filter(|l| !l.is_empty())
        .collect();
    Ok(lines.join("\n"))
}

/// The table that follows the heading reading exactly `heading`. Newer
/// templates wrap the table in a `div`, so a wrapper is searched too.
fn summary_table<'a>(doc: &'a Html, heading: &str) -> Result<Option<ElementRef<'a>>> {
    let headings = selector("h2, h3, h4")?;
    let table_sel = selector("table")?;

    let Some(h) = doc
        .select(&headings)
        .find(|h| normalize_whitespace(&element_text(h)) == heading)
    else {
        return Ok(None);
    };

    let Some(next) = h.next_siblings().find_map(ElementRef::wrap) else {
        return Ok(None);
    };
    if next.value().name() == "table" {
        return Ok(Some(next));
    }
    Ok(next.select(&table_sel).next())
}

fn parse_constructor_summary(doc: &Html) -> Result<Vec<Constructor>> {
    let Some(table) = summary_table(doc, "Constructor Summary")? else {
        return Ok(Vec::new());
    };
    let rows = selector("tr")?;

    let mut out = Vec::new();
    for row in table.select(&rows) {
        let name = normalize_whitespace(&first_text(&row, ".colConstructorName")?);
        if name.is_empty() || name == "Constructor" {
            continue;
        }
        out.push(Constructor {
            name,
            description: normalize_whitespace(&first_text(&row, ".colLast")?),
        });
    }
    Ok(out)
}

fn parse_method_summary(doc: &Html) -> Result<Vec<Method>> {
    let Some(table) = summary_table(doc, "Method Summary")? else {
        return Ok(Vec::new());
    };
    let rows = selector("tr")?;

    let mut out = Vec::new();
    for row in table.select(&rows) {
        let name = normalize_whitespace(&first_text(&row, ".colSecond")?);
        if name.is_empty() || name == "Method" {
            continue;
        }
        out.push(Method {
            modifier: normalize_whitespace(&first_text(&row, ".colFirst")?),
            name,
            description: normalize_whitespace(&first_text(&row, ".colLast")?),
        });
    }
    Ok(out)
}

pub fn parse_document(html: &str) -> Result<MarkdownDocument> {
    let doc = Html::parse_document(html);
    Ok(MarkdownDocument {
        title: parse_title(&doc)?,
        header: parse_header(&doc)?,
        inheritance: parse_inheritance(&doc)?,
        description: parse_description(&doc)?,
        constructors: parse_constructor_summary(&doc)?,
        methods: parse_method_summary(&doc)?,
    })
}

fn push_heading(lines: &mut Vec<String>, text: &str) {
    lines.push(text.to_string());
    lines.push("=".repeat(text.chars().count()));
    lines.push(String::new());
}

fn push_wrapped(lines: &mut Vec<String>, text: &str, indent: &str) {
    for line in textwrap::wrap(text, WRAP_WIDTH) {
        lines.push(format!("{indent}{line}"));
    }
}

impl MarkdownDocument {
    pub fn to_markdown(&self) -> String {
        let mut lines = Vec::new();
        push_heading(&mut lines, &self.title);
        lines.extend(self.header.subtitles.iter().cloned());
        if !self.header.title.is_empty() {
            lines.push(self.header.title.clone());
        }
        lines.push(String::new());

        if !self.inheritance.is_empty() {
            push_heading(&mut lines, "Inheritance");
            for (depth, class) in self.inheritance.iter().enumerate() {
                lines.push(format!("{}{class}", INDENT.repeat(depth)));
            }
            lines.push(String::new());
        }

        if !self.description.is_empty() {
            push_heading(&mut lines, "Description");
            push_wrapped(&mut lines, &self.description, "");
            lines.push(String::new());
        }

        if !self.constructors.is_empty() {
            push_heading(&mut lines, "Constructors");
            for c in &self.constructors {
                lines.push(c.name.clone());
                if !c.description.is_empty() {
                    push_wrapped(&mut lines, &c.description, INDENT);
                }
                lines.push(String::new());
            }
        }

        if !self.methods.is_empty() {
            push_heading(&mut lines, "Methods");
            for m in &self.methods {
                lines.push(format!("{} {}", m.modifier, m.name).trim().to_string());
                if !m.description.is_empty() {
                    push_wrapped(&mut lines, &m.description, INDENT);
                }
                lines.push(String::new());
            }
        }

        lines.join("\n")
    }
}

pub fn render_markdown(html: &str) -> Result<String> {
    Ok(parse_document(html)?.to_markdown())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Widget (lib 1.0 API)</title></head>
<body>
<div class="header">
<div class="subTitle">com.example</div>
<h2 title="Class Widget" class="title">Class&nbsp;Widget</h2>
</div>
<div class="contentContainer">
<ul class="inheritance">
<li>java.lang.Object</li>
<li>
<ul class="inheritance">
<li>com.example.Widget</li>
</ul>
</li>
</ul>
<div class="description">
<ul class="blockList"><li class="blockList">
<pre>public class Widget
extends java.lang.Object</pre>
<div class="block">A   widget&#8203; that does things.</div>
</li></ul>
</div>
<h3>Constructor Summary</h3>
<table class="memberSummary">
<tr><th class="colConstructorName" scope="col">Constructor</th><th class="colLast" scope="col">Description</th></tr>
<tr><th class="colConstructorName"><code>Widget()</code></th><td class="colLast">&nbsp;</td></tr>
<tr><th class="colConstructorName"><code>Widget(String&nbsp;name)</code></th><td class="colLast"><div class="block">Named widget.</div></td></tr>
</table>
<h3>Method Summary</h3>
<table class="memberSummary">
<tr><th class="colFirst" scope="col">Modifier and Type</th><th class="colSecond" scope="col">Method</th><th class="colLast" scope="col">Description</th></tr>
<tr><td class="colFirst"><code>public</code></td><th class="colSecond"><code>doThing()</code></th><td class="colLast"><div class="block">Does a thing.</div></td></tr>
</table>
</div>
</body></html>"#;

    #[test]
    fn parse_document_extracts_every_section() -> Result<()> {
        let doc = parse_document(PAGE)?;
        assert_eq!(doc.title, "Widget (lib 1.0 API)");
        assert_eq!(doc.header.title, "Class Widget");
        assert_eq!(doc.header.subtitles, vec!["com.example".to_string()]);
        assert_eq!(
            doc.inheritance,
            vec!["java.lang.Object".to_string(), "com.example.Widget".to_string()]
        );
        assert!(doc.description.starts_with("public class Widget\nextends java.lang.Object"));
        assert_eq!(
            doc.constructors,
            vec![
                Constructor {
                    name: "Widget()".to_string(),
                    description: String::new(),
                },
                Constructor {
                    name: "Widget(String name)".to_string(),
                    description: "Named widget.".to_string(),
                },
            ]
        );
        assert_eq!(
            doc.methods,
            vec![Method {
                modifier: "public".to_string(),
                name: "doThing()".to_string(),
                description: "Does a thing.".to_string(),
            }]
        );
        Ok(())
    }

    #[test]
    fn methods_section_holds_single_row() -> Result<()> {
        let md = render_markdown(PAGE)?;
        let methods = md
            .split("Methods\n=======\n\n")
            .nth(1)
            .expect("methods section");
        assert_eq!(methods, "public doThing()\n    Does a thing.\n");
        Ok(())
    }

    #[test]
    fn sections_without_entries_are_omitted() -> Result<()> {
        let md = render_markdown("<html><head><title>Empty</title></head><body></body></html>")?;
        assert_eq!(md, "Empty\n=====\n\n");
        assert!(!md.contains("Methods"));
        assert!(!md.contains("Inheritance"));
        Ok(())
    }

    #[test]
    fn long_descriptions_wrap_at_eighty_columns() {
        let doc = MarkdownDocument {
            title: "T".to_string(),
            methods: vec![Method {
                modifier: "static int".to_string(),
                name: "count()".to_string(),
                description: "word ".repeat(40).trim().to_string(),
            }],
            ..Default::default()
        };
        let md = doc.to_markdown();
        assert!(md.lines().all(|l| l.chars().count() <= WRAP_WIDTH + INDENT.len()));
        assert!(md.lines().filter(|l| l.starts_with("    word")).count() >= 3);
    }

    #[test]
    fn header_inheritance_and_description_are_normalized() -> Result<()> {
        let page = "<html><head><title>W</title></head><body>
<div class=\"header\"><div class=\"subTitle\">com.\u{200b}example\t\tpkg</div>
<h2 class=\"title\">Class\u{200b}   Widget</h2></div>
<ul class=\"inheritance\"><li>java.lang.\u{200b}Object</li></ul>
<div class=\"description\">
<pre>public   class\u{a0}Widget</pre>
<div class=\"block\">A   widget&#8203; that\tdoes things.</div>
</div>
</body></html>";
        let doc = parse_document(page)?;
        assert_eq!(doc.header.title, "Class Widget");
        assert_eq!(doc.header.subtitles, vec!["com.example pkg".to_string()]);
        assert_eq!(doc.inheritance, vec!["java.lang.Object".to_string()]);
        assert_eq!(doc.description, "public class Widget\nA widget that does things.");
        Ok(())
    }

    #[test]
    fn normalize_whitespace_collapses_special_spaces() {
        assert_eq!(
            normalize_whitespace("  a\u{a0}\u{a0}b\u{200b}c \n\t d "),
            "a bc d"
        );
    }
}
