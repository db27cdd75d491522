//! Output formatting for CLI operations.

use serde_json::json;
use std::path::Path;
use ziprename::resolve::PlannedRename;
use ziprename::{Artifact, Resolution, extract_identifier};

/// Trait for output formatting
pub trait OutputFormatter {
    /// Formats the sorted file listing of an archive
    fn format_list(&self, files: &[String]) -> String;

    /// Formats the planned renames of a dry run
    fn format_plan(&self, planned: &[PlannedRename]) -> String;

    /// Formats the result of a rename run
    fn format_rename_result(&self, artifact: &Artifact, written_to: &Path) -> String;
}

fn resolution_label(resolution: Resolution) -> &'static str {
    match resolution {
        Resolution::Renamed => "renamed",
        Resolution::Unmatched => "unmatched",
        Resolution::NoIdentifier => "no-identifier",
    }
}

/// Human-readable output formatter
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn format_list(&self, files: &[String]) -> String {
        let mut output = String::new();

        output.push_str(&format!("{:>10} {}\n", "Identifier", "Name"));
        output.push_str(&"-".repeat(70));
        output.push('\n');

        let mut numbered = 0;
        for file in files {
            let id = match extract_identifier(file) {
                Some(id) => {
                    numbered += 1;
                    id.to_string()
                }
                None => "-".to_string(),
            };
            output.push_str(&format!("{:>10} {}\n", id, file));
        }

        output.push_str(&"-".repeat(70));
        output.push('\n');
        output.push_str(&format!(
            "{} files, {} with identifier\n",
            files.len(),
            numbered
        ));

        output
    }

    fn format_plan(&self, planned: &[PlannedRename]) -> String {
        let mut output = String::new();
        let mut renamed = 0;

        for entry in planned {
            if entry.resolution.is_renamed() {
                renamed += 1;
                output.push_str(&format!(
                    "  {} -> {}\n",
                    entry.original_path, entry.output_path
                ));
            } else {
                output.push_str(&format!(
                    "  {} (unchanged, {})\n",
                    entry.original_path,
                    resolution_label(entry.resolution)
                ));
            }
        }

        output.push_str(&format!(
            "{} of {} files would be renamed\n",
            renamed,
            planned.len()
        ));
        output
    }

    fn format_rename_result(&self, artifact: &Artifact, written_to: &Path) -> String {
        let report = &artifact.report;
        let mut output = String::new();

        output.push_str("Rename Summary:\n");
        output.push_str(&"-".repeat(40));
        output.push('\n');
        output.push_str(&format!("  Output:         {}\n", written_to.display()));
        output.push_str(&format!(
            "  Size:           {}\n",
            humanize_bytes(artifact.bytes.len() as u64)
        ));
        output.push_str(&format!(
            "  Ratio:          {:.1}%\n",
            artifact.compression_ratio * 100.0
        ));
        output.push_str(&format!("  Renamed:        {}\n", report.renamed));
        output.push_str(&format!(
            "  Unchanged:      {} ({} unmatched, {} without identifier)\n",
            report.unchanged(),
            report.unmatched_identifier,
            report.no_identifier
        ));
        if report.overwritten > 0 {
            output.push_str(&format!(
                "  Overwritten:    {} (duplicate output paths)\n",
                report.overwritten
            ));
        }
        output.push_str(&format!("  Entries:        {}\n", report.written()));

        output
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn format_list(&self, files: &[String]) -> String {
        let items: Vec<_> = files
            .iter()
            .map(|f| {
                json!({
                    "path": f,
                    "identifier": extract_identifier(f).map(|id| id.to_string()),
                })
            })
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_plan(&self, planned: &[PlannedRename]) -> String {
        let items: Vec<_> = planned
            .iter()
            .map(|p| {
                json!({
                    "original_path": p.original_path,
                    "output_path": p.output_path,
                    "resolution": resolution_label(p.resolution),
                })
            })
            .collect();

        serde_json::to_string_pretty(&items).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_rename_result(&self, artifact: &Artifact, written_to: &Path) -> String {
        let report = &artifact.report;
        let obj = json!({
            "output": written_to.display().to_string(),
            "size": artifact.bytes.len(),
            "crc32": crc32fast::hash(&artifact.bytes),
            "compression_ratio": artifact.compression_ratio,
            "renamed": report.renamed,
            "unmatched_identifier": report.unmatched_identifier,
            "no_identifier": report.no_identifier,
            "overwritten": report.overwritten,
            "entries": report.written(),
        });

        serde_json::to_string_pretty(&obj).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Creates the appropriate formatter based on output format
pub fn create_formatter(format: super::OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        super::OutputFormat::Human => Box::new(HumanFormatter),
        super::OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Converts bytes to a human-readable string
pub fn humanize_bytes(bytes: u64) -> String {
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
        format!("{} B", bytes)
    }
}
