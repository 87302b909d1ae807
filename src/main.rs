use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};

use jsondiff::render::write_output;
use jsondiff::{build_options, run_jsondiff, Args};

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let opts = build_options(&args)?;

    if args.verbose {
        eprintln!("Comparing {} files:", opts.files.len());
        for (i, file) in opts.files.iter().enumerate() {
            eprintln!("  {}. {}", i + 1, file.display());
        }
    }

    let report = run_jsondiff(&opts)?;

    match &opts.output_file {
        Some(path) => {
            write_output(&report.rendered, path)?;
            info!(path = %path.display(), "output written");
        }
        None => println!("{}", report.rendered),
    }

    Ok(())
}
