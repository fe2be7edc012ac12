//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use filearc_core::ArchiveEntry;
use filearc_core::CreationReport;
use filearc_core::ExtractionReport;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;
use std::time::UNIX_EPOCH;

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }

    fn listing(entries: &[ArchiveEntry]) -> Result<()> {
        let data = ListingOutput {
            total_entries: entries.len(),
            total_size: entries.iter().map(|e| e.size).sum(),
            entries: entries.iter().map(EntryOutput::from).collect(),
        };

        Self::output(&JsonOutput::success("list", data))
    }
}

#[derive(Serialize)]
struct ListingOutput {
    total_entries: usize,
    total_size: u64,
    entries: Vec<EntryOutput>,
}

#[derive(Serialize)]
struct EntryOutput {
    name: String,
    #[serde(rename = "type")]
    entry_type: &'static str,
    size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    mode: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    modified: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    link_target: Option<String>,
}

impl From<&ArchiveEntry> for EntryOutput {
    fn from(entry: &ArchiveEntry) -> Self {
        Self {
            name: entry.name.clone(),
            entry_type: entry.entry_type.kind_name(),
            size: entry.size,
            mode: entry.mode,
            modified: entry
                .modified
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_secs()),
            link_target: entry
                .entry_type
                .link_target()
                .map(|target| target.display().to_string()),
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_creation_result(&self, output_path: &Path, report: &CreationReport) -> Result<()> {
        #[derive(Serialize)]
        struct CreationOutput {
            output_path: String,
            files_added: usize,
            directories_added: usize,
            symlinks_added: usize,
            bytes_written: u64,
            bytes_compressed: u64,
            compression_ratio: f64,
            entries_skipped: usize,
            duration_ms: u128,
        }

        let data = CreationOutput {
            output_path: output_path.display().to_string(),
            files_added: report.files_added,
            directories_added: report.directories_added,
            symlinks_added: report.symlinks_added,
            bytes_written: report.bytes_written,
            bytes_compressed: report.bytes_compressed,
            compression_ratio: report.compression_ratio(),
            entries_skipped: report.entries_skipped,
            duration_ms: report.duration.as_millis(),
        };

        let output = JsonOutput::success("create", data);
        Self::output(&output)
    }

    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        #[derive(Serialize)]
        struct ExtractionOutput {
            files_extracted: usize,
            directories_created: usize,
            symlinks_created: usize,
            files_skipped: usize,
            bytes_written: u64,
            duration_ms: u128,
            warnings: Vec<String>,
        }

        let data = ExtractionOutput {
            files_extracted: report.files_extracted,
            directories_created: report.directories_created,
            symlinks_created: report.symlinks_created,
            files_skipped: report.files_skipped,
            bytes_written: report.bytes_written,
            duration_ms: report.duration.as_millis(),
            warnings: report.warnings.clone(),
        };

        let output = JsonOutput::success("extract", data);
        Self::output(&output)
    }

    fn format_listing_short(&self, entries: &[ArchiveEntry]) -> Result<()> {
        Self::listing(entries)
    }

    fn format_listing_long(&self, entries: &[ArchiveEntry], _human_readable: bool) -> Result<()> {
        Self::listing(entries)
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error(operation, format!("{error:?}"));
        let _ = Self::output(&output);
    }
}
