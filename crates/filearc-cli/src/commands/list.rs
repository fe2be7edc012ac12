//! List command implementation

use crate::cli::ListArgs;
use crate::error::add_archive_context;
use crate::output::OutputFormatter;
use anyhow::Result;
use filearc_core::list_archive;

pub fn execute(args: &ListArgs, formatter: &dyn OutputFormatter) -> Result<()> {
    let entries = add_archive_context(list_archive(&args.archive), &args.archive)?;

    if args.long {
        formatter.format_listing_long(&entries, args.human_readable)?;
    } else {
        formatter.format_listing_short(&entries)?;
    }

    Ok(())
}
