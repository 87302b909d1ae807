use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use regex::Regex;
use tracing::warn;

use crate::parser::{is_supported_format, supported_extensions};
use crate::render::OutputFormat;
use crate::types::CompareConfig;

#[derive(Parser, Debug)]
#[command(
    name = "jsondiff",
    author,
    version,
    about = "Compare JSON, JSONC and JSON5 files and show differences",
    long_about = None
)]
pub struct Args {
    /// Files to compare (at least two; the first is the baseline)
    #[arg(required = true, num_args = 1..)]
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Include unchanged values
    #[arg(short = 'u', long)]
    pub show_unchanged: bool,

    /// Ignore array order when comparing
    #[arg(short = 'i', long)]
    pub ignore_order: bool,

    /// Maximum depth for comparison: number of container levels opened
    /// below the root before remaining differences are reported whole
    #[arg(short, long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub depth: u32,

    /// Only show paths matching this regular expression
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Compare strings case-insensitively
    #[arg(long)]
    pub ignore_case: bool,

    /// Trim leading/trailing whitespace before comparing strings
    #[arg(long)]
    pub ignore_whitespace: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Do not print summary statistics
    #[arg(long)]
    pub no_stats: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug)]
pub struct Options {
    pub files: Vec<PathBuf>,
    pub output: OutputFormat,
    pub output_file: Option<PathBuf>,
    pub show_unchanged: bool,
    pub filter: Option<Regex>,
    pub compare: CompareConfig,
    pub color: bool,
    pub show_stats: bool,
}

pub fn build_options(args: &Args) -> Result<Options> {
    if args.files.len() < 2 {
        bail!("at least 2 files are required for comparison");
    }

    for file in &args.files {
        if !is_supported_format(file) {
            warn!(
                file = %file.display(),
                "file may not be a supported format (supported extensions: {})",
                supported_extensions().join(", ")
            );
        }
    }

    let filter = args
        .filter
        .as_deref()
        .map(|s| Regex::new(s).with_context(|| format!("Invalid filter pattern: {s}")))
        .transpose()?;

    let compare = CompareConfig::default()
        .with_ignore_array_order(args.ignore_order)
        .with_max_depth(args.depth as usize)
        .with_case_sensitive(!args.ignore_case)
        .with_ignore_whitespace(args.ignore_whitespace)
        .with_include_unchanged(args.show_unchanged);

    Ok(Options {
        files: args.files.clone(),
        output: args.output,
        output_file: args.output_file.clone(),
        show_unchanged: args.show_unchanged,
        filter,
        compare,
        color: !args.no_color,
        show_stats: !args.no_stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("jsondiff").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let opts = build_options(&parse(&["a.json", "b.json"])).unwrap();
        assert_eq!(opts.output, OutputFormat::Table);
        assert_eq!(opts.compare.max_depth, 10);
        assert!(opts.compare.case_sensitive);
        assert!(!opts.compare.ignore_array_order);
        assert!(!opts.show_unchanged);
        assert!(opts.color);
        assert!(opts.show_stats);
        assert!(opts.filter.is_none());
    }

    #[test]
    fn flags_map_onto_compare_config() {
        let opts = build_options(&parse(&[
            "a.json",
            "b.jsonc",
            "c.json5",
            "-o",
            "yaml",
            "-u",
            "-i",
            "-d",
            "3",
            "--ignore-case",
            "--ignore-whitespace",
            "--no-color",
            "--no-stats",
            "-f",
            "^user",
        ]))
        .unwrap();
        assert_eq!(opts.files.len(), 3);
        assert_eq!(opts.output, OutputFormat::Yaml);
        assert!(opts.show_unchanged && opts.compare.include_unchanged);
        assert!(opts.compare.ignore_array_order);
        assert_eq!(opts.compare.max_depth, 3);
        assert!(!opts.compare.case_sensitive);
        assert!(opts.compare.ignore_whitespace);
        assert!(!opts.color);
        assert!(!opts.show_stats);
        assert!(opts.filter.unwrap().is_match("user.name"));
    }

    #[test]
    fn single_file_is_rejected() {
        let err = build_options(&parse(&["a.json"])).unwrap_err();
        assert!(err.to_string().contains("at least 2 files"));
    }

    #[test]
    fn invalid_filter_is_rejected() {
        let err = build_options(&parse(&["a.json", "b.json", "-f", "(unclosed"])).unwrap_err();
        assert!(err.to_string().contains("Invalid filter pattern"));
    }

    #[test]
    fn depth_must_be_positive() {
        let result = Args::try_parse_from(["jsondiff", "a.json", "b.json", "-d", "0"]);
        assert!(result.is_err());
    }
}
