//! Create command implementation.

use crate::cli::CreateArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use filearc_core::CompressOptions;
use filearc_core::compress_archive;

pub fn execute(args: &CreateArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let options = build_options(args);

    let report = add_archive_context(
        compress_archive(&args.output, &args.source, &options),
        &args.output,
    )?;

    formatter.format_creation_result(&args.output, &report)
}

fn build_options(args: &CreateArgs) -> CompressOptions {
    CompressOptions {
        append: args.append,
        compression: args.compression.map(Into::into),
        format: args.format.map(Into::into),
        include_source_dir: args.include_source_dir,
        filters: args.filters.clone(),
        compression_level: args.compression_level,
    }
}
