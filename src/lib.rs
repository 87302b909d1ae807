//
// lib.rs
// jsondiff
//
// Library entry that re-exports the diff engine, the document parser, the renderers and the CLI plumbing so the binary and external users share one surface.
//
// Public crate interface: re-export modules used by the binary and tests.
pub mod cli;
pub mod diff;
pub mod error;
pub mod filter;
pub mod parser;
pub mod render;
pub mod runner;
pub mod types;
pub mod utils;

pub use cli::{build_options, Args, Options};
pub use diff::{compare, Comparator};
pub use error::{DiffError, DiffResult, ParseError};
pub use filter::{filter_results, ResultFilter};
pub use parser::{parse_file, parse_files, ParsedDocument, SourceFormat};
pub use render::{Formatter, OutputFormat};
pub use runner::{run_jsondiff, Report};
pub use types::{CompareConfig, DiffKind, DiffRecord, DiffStats, DocumentValue};
