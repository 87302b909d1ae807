use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use colored::Colorize;
use regex::Regex;
use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::types::{DiffKind, DiffRecord, DiffStats};
use crate::utils::display_value;

const COLUMN_WIDTHS: [usize; 4] = [12, 40, 25, 25];
const NO_DIFFERENCES: &str = "No differences found.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Yaml,
    Tree,
}

#[derive(Clone, Copy, Debug)]
enum Tone {
    Header,
    Path,
    Info,
    Stats,
    Kind(DiffKind),
}

impl From<DiffKind> for Tone {
    fn from(kind: DiffKind) -> Self {
        Tone::Kind(kind)
    }
}

#[derive(Serialize)]
struct Report<'a> {
    files: &'a [String],
    timestamp: String,
    differences: &'a [DiffRecord],
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<DiffStats>,
}

/// Renders record lists for people (table, tree) and for tools (JSON, YAML).
#[derive(Clone, Debug)]
pub struct Formatter {
    color: bool,
}

impl Formatter {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn format(
        &self,
        records: &[DiffRecord],
        format: OutputFormat,
        files: &[String],
        show_stats: bool,
    ) -> Result<String> {
        match format {
            OutputFormat::Table => Ok(self.table(records, show_stats)),
            OutputFormat::Json => self.json(records, files, show_stats),
            OutputFormat::Yaml => self.yaml(records, files, show_stats),
            OutputFormat::Tree => Ok(self.tree(records, show_stats)),
        }
    }

    pub fn table(&self, records: &[DiffRecord], show_stats: bool) -> String {
        if records.is_empty() {
            return self.paint(NO_DIFFERENCES, Tone::Info);
        }

        let mut out = String::new();
        let border = table_border();
        out.push_str(&border);
        self.push_row(
            &mut out,
            [
                ("Type".to_string(), Tone::Header),
                ("Path".to_string(), Tone::Header),
                ("Old Value".to_string(), Tone::Header),
                ("New Value".to_string(), Tone::Header),
            ],
        );
        out.push_str(&border);

        for record in records {
            let old = record.old_value.as_ref().map(display_value).unwrap_or_default();
            let new = record.new_value.as_ref().map(display_value).unwrap_or_default();
            let old_tone = if record.kind == DiffKind::Removed {
                Tone::Kind(DiffKind::Modified)
            } else {
                Tone::Info
            };
            let new_tone = if record.kind == DiffKind::Added {
                Tone::Kind(DiffKind::Modified)
            } else {
                Tone::Info
            };
            self.push_row(
                &mut out,
                [
                    (record.kind.as_str().to_uppercase(), record.kind.into()),
                    (record.path.clone(), Tone::Path),
                    (old, old_tone),
                    (new, new_tone),
                ],
            );
        }
        out.push_str(&border);

        if show_stats {
            out.push_str(&self.statistics(records));
        }
        out
    }

    pub fn json(&self, records: &[DiffRecord], files: &[String], show_stats: bool) -> Result<String> {
        serde_json::to_string_pretty(&report(records, files, show_stats))
            .context("failed to encode report as JSON")
    }

    pub fn yaml(&self, records: &[DiffRecord], files: &[String], show_stats: bool) -> Result<String> {
        serde_yaml::to_string(&report(records, files, show_stats))
            .context("failed to encode report as YAML")
    }

    pub fn tree(&self, records: &[DiffRecord], show_stats: bool) -> String {
        if records.is_empty() {
            return self.paint(NO_DIFFERENCES, Tone::Info);
        }

        let mut out = self.paint("Differences Tree:", Tone::Header);
        out.push('\n');

        let root = build_tree(records);
        let count = root.children.len();
        for (i, child) in root.children.iter().enumerate() {
            self.render_node(&mut out, child, "", i + 1 == count);
        }

        if show_stats {
            out.push_str(&self.statistics(records));
        }
        out
    }

    pub fn statistics(&self, records: &[DiffRecord]) -> String {
        let stats = DiffStats::from_records(records);
        let mut out = format!("\n{}\n", self.paint("Summary:", Tone::Stats));
        out.push_str(&format!(
            "  Total differences: {}\n",
            self.paint(&stats.total.to_string(), Tone::Info)
        ));
        out.push_str(&format!("  {} {}\n", self.paint("Added:", DiffKind::Added.into()), stats.added));
        out.push_str(&format!("  {} {}\n", self.paint("Removed:", DiffKind::Removed.into()), stats.removed));
        out.push_str(&format!("  {} {}", self.paint("Modified:", DiffKind::Modified.into()), stats.modified));
        if stats.unchanged > 0 {
            out.push_str(&format!("\n  {} {}", self.paint("Unchanged:", Tone::Info), stats.unchanged));
        }
        out
    }

    fn push_row(&self, out: &mut String, cells: [(String, Tone); 4]) {
        let wrapped: Vec<Vec<String>> = cells
            .iter()
            .zip(COLUMN_WIDTHS)
            .map(|((text, _), width)| wrap(text, width - 2))
            .collect();
        let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);

        for line in 0..height {
            out.push('|');
            for (column, lines) in wrapped.iter().enumerate() {
                let inner = COLUMN_WIDTHS[column] - 2;
                let text = lines.get(line).map(String::as_str).unwrap_or("");
                let pad = inner.saturating_sub(text.width());
                out.push(' ');
                out.push_str(&self.paint(text, cells[column].1));
                out.push_str(&" ".repeat(pad));
                out.push_str(" |");
            }
            out.push('\n');
        }
    }

    fn render_node(&self, out: &mut String, node: &TreeNode<'_>, prefix: &str, is_last: bool) {
        let connector = if is_last { "└── " } else { "├── " };
        let name = if node.name.is_empty() { "(root)" } else { node.name };

        match node.records.first() {
            Some(first) => {
                out.push_str(&format!(
                    "{prefix}{connector}{} {}\n",
                    self.paint(&first.kind.symbol().to_string(), first.kind.into()),
                    self.paint(name, Tone::Path)
                ));
                let value_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
                for record in &node.records {
                    if let Some(old) = &record.old_value {
                        out.push_str(&format!(
                            "{value_prefix}{}{}\n",
                            self.paint("- ", DiffKind::Removed.into()),
                            display_value(old)
                        ));
                    }
                    if let Some(new) = &record.new_value {
                        out.push_str(&format!(
                            "{value_prefix}{}{}\n",
                            self.paint("+ ", DiffKind::Added.into()),
                            display_value(new)
                        ));
                    }
                }
            }
            None => {
                out.push_str(&format!("{prefix}{connector}{}\n", self.paint(name, Tone::Path)));
            }
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let count = node.children.len();
        for (i, child) in node.children.iter().enumerate() {
            self.render_node(out, child, &child_prefix, i + 1 == count);
        }
    }

    fn paint(&self, text: &str, tone: Tone) -> String {
        if !self.color || text.is_empty() {
            return text.to_string();
        }
        match tone {
            Tone::Header => text.bold().cyan().to_string(),
            Tone::Path => text.blue().to_string(),
            Tone::Info => text.cyan().to_string(),
            Tone::Stats => text.bold().to_string(),
            Tone::Kind(DiffKind::Added) => text.green().to_string(),
            Tone::Kind(DiffKind::Removed) => text.red().to_string(),
            Tone::Kind(DiffKind::Modified) => text.yellow().to_string(),
            Tone::Kind(DiffKind::Unchanged) => text.dimmed().to_string(),
        }
    }
}

fn report<'a>(records: &'a [DiffRecord], files: &'a [String], show_stats: bool) -> Report<'a> {
    Report {
        files,
        timestamp: chrono::Utc::now().to_rfc3339(),
        differences: records,
        summary: show_stats.then(|| DiffStats::from_records(records)),
    }
}

fn table_border() -> String {
    let mut border = String::from("+");
    for width in COLUMN_WIDTHS {
        border.push_str(&"-".repeat(width));
        border.push('+');
    }
    border.push('\n');
    border
}

// Splits on display columns, so wide characters take two cells.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
            used = 0;
        }
        line.push(c);
        used += w;
    }
    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

struct TreeNode<'a> {
    name: &'a str,
    children: Vec<TreeNode<'a>>,
    records: Vec<&'a DiffRecord>,
}

impl<'a> TreeNode<'a> {
    fn new(name: &'a str) -> Self {
        Self {
            name,
            children: Vec::new(),
            records: Vec::new(),
        }
    }

    fn child(&mut self, name: &'a str) -> &mut TreeNode<'a> {
        let index = match self.children.iter().position(|c| c.name == name) {
            Some(index) => index,
            None => {
                self.children.push(TreeNode::new(name));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }
}

// Groups records by dotted path segment, keeping first-seen order.
fn build_tree(records: &[DiffRecord]) -> TreeNode<'_> {
    let mut root = TreeNode::new("");
    for record in records {
        let mut node = &mut root;
        for part in record.path.split('.') {
            node = node.child(part);
        }
        node.records.push(record);
    }
    root
}

fn ansi_pattern() -> &'static Regex {
    static ANSI: OnceLock<Regex> = OnceLock::new();
    ANSI.get_or_init(|| Regex::new("\u{1b}\\[[0-9;]*m").expect("valid ANSI escape pattern"))
}

pub fn strip_colors(text: &str) -> String {
    ansi_pattern().replace_all(text, "").into_owned()
}

/// Write rendered output to `path` without color codes, creating parent
/// directories as needed.
pub fn write_output(content: &str, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }
    fs::write(path, strip_colors(content))
        .with_context(|| format!("failed to write output to {}", path.display()))
}
