use anyhow::{Context, Result};
use tracing::debug;

use crate::cli::Options;
use crate::diff::Comparator;
use crate::filter::{filter_results, ResultFilter};
use crate::parser::parse_files;
use crate::render::Formatter;
use crate::types::{DiffKind, DiffRecord, DocumentValue};

/// Outcome of a full run: the records that survived filtering and their
/// rendering in the requested format.
#[derive(Debug)]
pub struct Report {
    pub records: Vec<DiffRecord>,
    pub rendered: String,
}

/// Parse every input file, compare them, filter and render the result.
pub fn run_jsondiff(opts: &Options) -> Result<Report> {
    debug!(files = opts.files.len(), "parsing files");
    let documents = parse_files(opts.files.as_slice())?;
    let contents: Vec<DocumentValue> = documents.into_iter().map(|d| d.content).collect();

    debug!("performing comparison");
    let records = Comparator::new(opts.compare.clone())
        .compare(&contents)
        .context("Comparison failed")?;

    let mut filter = ResultFilter::new();
    if !opts.show_unchanged {
        filter = filter.kinds([DiffKind::Added, DiffKind::Removed, DiffKind::Modified]);
    }
    if let Some(pattern) = &opts.filter {
        filter = filter.path_pattern(pattern.clone());
    }
    let records = filter_results(&records, &filter);
    debug!(records = records.len(), "records after filtering");

    let files: Vec<String> = opts.files.iter().map(|p| p.display().to_string()).collect();
    let rendered = Formatter::new(opts.color).format(&records, opts.output, &files, opts.show_stats)?;

    Ok(Report { records, rendered })
}
