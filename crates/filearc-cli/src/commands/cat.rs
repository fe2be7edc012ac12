//! Cat command implementation.
//!
//! Streams the raw content of one regular file entry to stdout, bypassing
//! the output formatter.

use crate::cli::CatArgs;
use crate::error::add_archive_context;
use anyhow::Result;
use anyhow::bail;
use filearc_core::ArchiveError;
use filearc_core::ArchiveReader;
use std::io;
use std::io::Write;

pub fn execute(args: &CatArgs) -> Result<()> {
    let mut reader = add_archive_context(ArchiveReader::open(&args.archive), &args.archive)?;

    {
        let (entry, stream) = add_archive_context(reader.read_entry(&args.entry), &args.archive)?;

        let Some(mut stream) = stream else {
            bail!(
                "'{}' in '{}' is a {}, not a regular file",
                entry.name,
                args.archive.display(),
                entry.entry_type.kind_name()
            );
        };

        let mut stdout = io::stdout().lock();
        let copied = io::copy(&mut stream, &mut stdout).map_err(ArchiveError::from);
        add_archive_context(copied, &args.archive)?;
        stdout.flush()?;
    }

    add_archive_context(reader.close(), &args.archive)
}
