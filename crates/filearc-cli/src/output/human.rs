//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use anyhow::Result;
use console::Term;
use console::style;
use filearc_core::ArchiveEntry;
use filearc_core::CreationReport;
use filearc_core::EntryType;
use filearc_core::ExtractionReport;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_size(bytes: u64) -> String {
        const KB: u64 = 1024;
        const MB: u64 = KB * 1024;
        const GB: u64 = MB * 1024;

        if bytes >= GB {
            format!("{:.1} GB", bytes as f64 / GB as f64)
        } else if bytes >= MB {
            format!("{:.1} MB", bytes as f64 / MB as f64)
        } else if bytes >= KB {
            format!("{:.1} KB", bytes as f64 / KB as f64)
        } else {
            format!("{bytes} B")
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    const fn type_char(entry_type: &EntryType) -> char {
        match entry_type {
            EntryType::File => '-',
            EntryType::Directory => 'd',
            EntryType::Symlink { .. } => 'l',
            EntryType::Unsupported { .. } => '?',
        }
    }

    fn write_warnings(&self, warnings: &[String]) {
        let _ = self.term.write_line("");
        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{}", style("Warnings:").yellow().bold()));
        } else {
            let _ = self.term.write_line("Warnings:");
        }
        for warning in warnings {
            let _ = self.term.write_line(&format!("  - {warning}"));
        }
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_creation_result(&self, output_path: &Path, report: &CreationReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            let _ = self.term.write_line(&format!(
                "{} Archive created: {}",
                style("✓").green().bold(),
                output_path.display()
            ));
        } else {
            let _ = self
                .term
                .write_line(&format!("Archive created: {}", output_path.display()));
        }

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "  Files added:      {}",
            Self::format_number(report.files_added)
        ));
        let _ = self.term.write_line(&format!(
            "  Directories:      {}",
            Self::format_number(report.directories_added)
        ));
        let _ = self.term.write_line(&format!(
            "  Total size:       {}",
            Self::format_size(report.bytes_written)
        ));
        let _ = self.term.write_line(&format!(
            "  Archive size:     {}",
            Self::format_size(report.bytes_compressed)
        ));

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Symlinks:         {}", report.symlinks_added));
            let _ = self.term.write_line(&format!(
                "  Ratio:            {:.2}",
                report.compression_ratio()
            ));
            let _ = self
                .term
                .write_line(&format!("  Duration:         {:?}", report.duration));
        }

        if report.entries_skipped > 0 {
            let _ = self
                .term
                .write_line(&format!("  Entries skipped:  {}", report.entries_skipped));
        }

        Ok(())
    }

    fn format_extraction_result(&self, report: &ExtractionReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if self.use_colors {
            let _ = self.term.write_line(&format!(
                "{} Extraction complete",
                style("✓").green().bold()
            ));
        } else {
            let _ = self.term.write_line("Extraction complete");
        }

        let _ = self
            .term
            .write_line(&format!("  Files extracted: {}", report.files_extracted));
        let _ = self
            .term
            .write_line(&format!("  Directories: {}", report.directories_created));
        let _ = self.term.write_line(&format!(
            "  Total size: {}",
            Self::format_size(report.bytes_written)
        ));

        if report.files_skipped > 0 {
            let _ = self
                .term
                .write_line(&format!("  Files skipped: {}", report.files_skipped));
        }

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Symlinks: {}", report.symlinks_created));
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
        }

        if report.has_warnings() {
            self.write_warnings(&report.warnings);
        }

        Ok(())
    }

    fn format_listing_short(&self, entries: &[ArchiveEntry]) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for entry in entries {
            let _ = self.term.write_line(&entry.name);
        }

        Ok(())
    }

    fn format_listing_long(&self, entries: &[ArchiveEntry], human_readable: bool) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for entry in entries {
            let size_str = if human_readable {
                Self::format_size(entry.size)
            } else {
                entry.size.to_string()
            };

            let mode_str = entry
                .mode
                .map_or_else(|| "-".to_string(), |m| format!("{:o}", m & 0o7777));

            let name = match entry.entry_type.link_target() {
                Some(target) => format!("{} -> {}", entry.name, target.display()),
                None => entry.name.clone(),
            };

            let _ = self.term.write_line(&format!(
                "{}{:<6} {:>10}  {}",
                Self::type_char(&entry.entry_type),
                mode_str,
                size_str,
                name
            ));
        }

        let total_size: u64 = entries.iter().map(|e| e.size).sum();
        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "Total: {} entries, {}",
            Self::format_number(entries.len()),
            Self::format_size(total_size)
        ));

        Ok(())
    }

    fn format_error(&self, _operation: &str, error: &anyhow::Error) {
        // Always show errors, even in quiet mode
        let term = Term::stderr();
        if self.use_colors {
            let _ = term.write_line(&format!("{} {error:?}", style("ERROR:").red().bold()));
        } else {
            let _ = term.write_line(&format!("ERROR: {error:?}"));
        }
    }
}
