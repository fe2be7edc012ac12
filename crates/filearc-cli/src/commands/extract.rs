//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Context;
use anyhow::Result;
use filearc_core::ExtractOptions;
use filearc_core::extract_archive;
use std::env;

pub fn execute(args: &ExtractArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("failed to get current directory")?,
    };

    let options = ExtractOptions {
        flat_dir: args.flat,
        filters: args.filters.clone(),
        no_override: args.no_override,
        match_prefix: args.prefix.clone(),
    };

    let report = add_archive_context(
        extract_archive(&args.archive, &output_dir, &options),
        &args.archive,
    )?;

    formatter.format_extraction_result(&report)?;

    Ok(())
}
