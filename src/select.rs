//! Interactive pick-and-view loop on top of an external fuzzy selector.

use anyhow::{Context, Result, anyhow, bail};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{FinderError, is_cancelled};
use crate::index::{ClassIndex, SearchQuery};
use crate::record::ClassRecord;
use crate::view::{ViewMode, view_record};

/// Label in the first column of every selector line.
pub const SOURCE_LABEL: &str = "java";

/// Exit status fzf reports when the user aborts with Esc or Ctrl-C.
const CANCELLED_STATUS: i32 = 130;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// What the user had typed, to restore on the next round.
    pub query: String,
    pub line: String,
}

pub trait Selector {
    /// Returns the chosen line, or `FinderError::SelectionCancelled`.
    fn select(&mut self, query: &str, lines: &[String]) -> Result<Selection>;
}

pub trait Pager {
    fn show(&mut self, text: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FzfSelector {
    program: String,
}

impl Default for FzfSelector {
    fn default() -> Self {
        Self::with_program("fzf")
    }
}

impl FzfSelector {
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Selector for FzfSelector {
    fn select(&mut self, query: &str, lines: &[String]) -> Result<Selection> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--print-query");
        if !query.is_empty() {
            cmd.args(["--query", query]);
        }
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("Failed to run {} (is it installed and on PATH?)", self.program))?;

        if let Some(mut stdin) = child.stdin.take() {
            let input = lines.join("\n");
            // The selector may exit before reading everything.
            if let Err(e) = stdin.write_all(input.as_bytes()) {
                debug!(error = %e, "Selector closed its input early");
            }
        }

        let output = child
            .wait_with_output()
            .with_context(|| format!("Failed to wait for {}", self.program))?;
        if output.status.code() == Some(CANCELLED_STATUS) {
            return Err(FinderError::SelectionCancelled.into());
        }
        if !output.status.success() {
            bail!("{} exited with {}", self.program, output.status);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_selector_output(&stdout)
            .ok_or_else(|| anyhow!("{} returned no selection", self.program))
    }
}

/// Feeds text to `less`, or to `$PAGER` when set. `$PAGER` may carry
/// arguments (`less -R`); it is split on whitespace, without shell quoting.
#[derive(Debug, Clone)]
pub struct LessPager {
    program: String,
    args: Vec<String>,
}

impl Default for LessPager {
    fn default() -> Self {
        std::env::var("PAGER")
            .ok()
            .and_then(|p| Self::from_command(&p))
            .unwrap_or_else(|| Self {
                program: "less".to_string(),
                args: Vec::new(),
            })
    }
}

impl LessPager {
    pub fn from_command(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl Pager for LessPager {
    fn show(&mut self, text: &str) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .spawn()
            .with_context(|| format!("Failed to run pager {}", self.program))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .with_context(|| format!("Failed to write to pager {}", self.program))?;
        }
        let status = child.wait().context("Failed to wait for pager")?;
        if !status.success() {
            bail!("pager {} exited with {status}", self.program);
        }
        Ok(())
    }
}

/// `--print-query` output: either `selection` or `query\nselection`.
pub fn parse_selector_output(stdout: &str) -> Option<Selection> {
    let lines: Vec<&str> = stdout.trim().lines().collect();
    match lines.as_slice() {
        [line] if !line.is_empty() => Some(Selection {
            query: String::new(),
            line: line.to_string(),
        }),
        [query, line, ..] => Some(Selection {
            query: query.to_string(),
            line: line.to_string(),
        }),
        _ => None,
    }
}

/// Sorted, deduplicated `label<TAB>key` lines.
pub fn selector_lines(records: &[ClassRecord]) -> Vec<String> {
    let mut lines: Vec<String> = records
        .iter()
        .map(|r| format!("{SOURCE_LABEL}\t{}", r.key))
        .collect();
    lines.sort();
    lines.dedup();
    lines
}

pub fn identity_from_line(line: &str) -> Option<&str> {
    line.split('\t').nth(1).map(str::trim).filter(|k| !k.is_empty())
}

/// Select, view, page; repeat with the last typed query until the user
/// cancels. Returns how many classes were shown.
pub fn run_interactive(
    config: &Config,
    index: &ClassIndex,
    query: &SearchQuery,
    mode: ViewMode,
    selector: &mut dyn Selector,
    pager: &mut dyn Pager,
) -> Result<usize> {
    let records = index.search(query)?;
    if records.is_empty() {
        info!(pattern = %query.pattern, "No classes matched");
        return Ok(0);
    }
    let lines = selector_lines(&records);

    let mut typed = String::new();
    let mut shown = 0usize;
    loop {
        let selection = match selector.select(&typed, &lines) {
            Ok(s) => s,
            Err(e) if is_cancelled(&e) => return Ok(shown),
            Err(e) => return Err(e),
        };
        typed = selection.query;

        let key = identity_from_line(&selection.line)
            .ok_or_else(|| anyhow!("Unexpected selector line: {}", selection.line))?;
        let record = records
            .iter()
            .find(|r| r.key == key)
            .ok_or_else(|| FinderError::NotFound {
                key: key.to_string(),
            })?;

        let text = match view_record(config, record, mode) {
            Ok(text) => text,
            Err(e) => {
                warn!(key = %record.key, error = %format!("{e:#}"), "Error viewing class");
                continue;
            }
        };
        if let Err(e) = pager.show(&text) {
            warn!(error = %format!("{e:#}"), "Error displaying with pager");
        }
        shown += 1;
    }
}
