//! Extraction engine: decoded entries in, files on disk out.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use log::debug;
use log::warn;

use super::materialize;
use crate::ArchiveError;
use crate::Result;
use crate::config::ExtractOptions;
use crate::copy::CopyBuffer;
use crate::report::ExtractionReport;
use crate::session::Entries;
use crate::types::ArchiveEntry;
use crate::types::EntryType;
use crate::types::contained_path;

/// Extracts every entry from `entries` that passes the filter and lies
/// under `match_prefix`.
///
/// For each entry, in archive order:
///
/// 1. Names rejected by `options.filters` are ignored.
/// 2. Names that climb above the archive root are skipped with a warning.
///    Absolute names are re-rooted under `target`.
/// 3. Entries outside `match_prefix` are ignored; the prefix is stripped
///    from the rest. An entry named exactly by the prefix lands under its
///    own base name.
/// 4. With `flat_dir`, directories are ignored and everything else lands
///    directly in `target` by base name.
/// 5. Entries whose path crosses an existing symlink inside `target` are
///    skipped with a warning.
/// 6. An existing non-directory at the destination is kept when
///    `no_override` is set, otherwise replaced. An existing directory where
///    a file or symlink belongs is never removed: it is kept under
///    `no_override` and is an error otherwise.
///
/// # Errors
///
/// - [`ArchiveError::NotFound`] if `match_prefix` is non-empty and no entry
///   lies under it.
/// - [`ArchiveError::UnsupportedType`] for hard links, devices, FIFOs and
///   other kinds that cannot be recreated.
/// - [`ArchiveError::Io`] if a directory occupies the destination of a
///   file or symlink and `no_override` is off.
/// - I/O and decoding errors. Files already written stay on disk.
pub fn extract_entries(
    entries: &mut Entries<'_>,
    match_prefix: &str,
    target: &Path,
    options: &ExtractOptions,
) -> Result<ExtractionReport> {
    let start = Instant::now();
    let prefix = contained_path(match_prefix).ok_or_else(|| ArchiveError::NotFound {
        name: match_prefix.to_string(),
    })?;
    let filter = options.filter_spec();

    fs::create_dir_all(target)?;

    let mut report = ExtractionReport::new();
    let mut buffer = CopyBuffer::new();
    let mut matched_prefix = prefix.as_os_str().is_empty();

    while let Some((entry, mut stream)) = entries.next_entry()? {
        if !filter.matches(&entry.name) {
            continue;
        }

        let Some(contained) = contained_path(&entry.name) else {
            skip(&mut report, &entry.name, "path escapes the extraction root");
            continue;
        };
        let Ok(relative) = contained.strip_prefix(&prefix) else {
            continue;
        };
        matched_prefix = true;

        if let EntryType::Unsupported { kind } = &entry.entry_type {
            return Err(ArchiveError::UnsupportedType {
                name: entry.name.clone(),
                kind: (*kind).to_string(),
            });
        }

        let Some(relative) = output_path(relative, &prefix, &entry, options.flat_dir) else {
            continue;
        };

        if let Some(link) = symlinked_ancestor(target, &relative) {
            let reason = format!("{} is a symlink", link.display());
            skip(&mut report, &entry.name, &reason);
            continue;
        }

        let destination = target.join(&relative);

        match fs::symlink_metadata(&destination) {
            Ok(existing) if existing.is_dir() => {
                if !entry.entry_type.is_directory() {
                    if options.no_override {
                        debug!("keeping existing directory {}", destination.display());
                        report.files_skipped += 1;
                        continue;
                    }
                    return Err(ArchiveError::Io(io::Error::new(
                        io::ErrorKind::IsADirectory,
                        format!(
                            "cannot write {}: {} is a directory",
                            entry.name,
                            destination.display()
                        ),
                    )));
                }
            }
            Ok(_) => {
                if options.no_override {
                    debug!("keeping existing {}", destination.display());
                    report.files_skipped += 1;
                    continue;
                }
                fs::remove_file(&destination)?;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        match &entry.entry_type {
            EntryType::Directory => materialize::create_directory(&destination, &mut report)?,
            EntryType::File => materialize::write_file(
                &mut *stream,
                &destination,
                entry.mode,
                &mut buffer,
                &mut report,
            )?,
            EntryType::Symlink { target: link } => {
                materialize::create_symlink(link, &destination, &entry.name, &mut report)?;
            }
            EntryType::Unsupported { .. } => {}
        }
    }

    if !matched_prefix {
        return Err(ArchiveError::NotFound {
            name: match_prefix.to_string(),
        });
    }

    report.duration = start.elapsed();
    Ok(report)
}

/// Path of the entry relative to the extraction target, or `None` when the
/// entry produces nothing on disk.
fn output_path(
    relative: &Path,
    prefix: &Path,
    entry: &ArchiveEntry,
    flat: bool,
) -> Option<PathBuf> {
    if flat && entry.entry_type.is_directory() {
        return None;
    }

    if relative.as_os_str().is_empty() {
        // The entry is the prefix itself.
        if entry.entry_type.is_directory() {
            return None;
        }
        return prefix.file_name().map(PathBuf::from);
    }

    if flat {
        return relative.file_name().map(PathBuf::from);
    }

    Some(relative.to_path_buf())
}

/// First existing symlink among the directories between `target` and the
/// entry's destination.
fn symlinked_ancestor(target: &Path, relative: &Path) -> Option<PathBuf> {
    let mut current = target.to_path_buf();

    for component in relative.parent()?.components() {
        current.push(component);
        match fs::symlink_metadata(&current) {
            Ok(metadata) if metadata.file_type().is_symlink() => return Some(current),
            Ok(_) => {}
            Err(_) => return None,
        }
    }

    None
}

fn skip(report: &mut ExtractionReport, name: &str, reason: &str) {
    warn!("skipping {name}: {reason}");
    report.add_warning(format!("skipped {name}: {reason}"));
    report.files_skipped += 1;
}
