use std::collections::BTreeMap;
use std::path::PathBuf;

use indexmap::IndexMap;
use itertools::Itertools;
use serde::Serialize;

use crate::error::Error;
use crate::error_record::ErrorRecord;
use crate::metrics::MetricsSnapshot;
use crate::skip::{SkipCategory, SkipRecord};
use crate::style::{ebold, edim, ered};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryFormat {
    Compact,
    Long,
    Json,
    None,
}

impl std::str::FromStr for SummaryFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compact" => Ok(SummaryFormat::Compact),
            "long" => Ok(SummaryFormat::Long),
            "json" => Ok(SummaryFormat::Json),
            "none" => Ok(SummaryFormat::None),
            other => Err(format!("invalid summary format: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SummaryOptions {
    pub format: SummaryFormat,
    pub verbose: bool,
    pub report_file: Option<PathBuf>,
}

#[derive(Serialize)]
struct JsonMetrics {
    files_processed: u64,
    directories_processed: u64,
    errors_encountered: u64,
    skipped_files: u64,
    start_time: String,
    elapsed_time: String,
}

#[derive(Serialize)]
struct JsonErrorRecord {
    source: String,
    message: String,
}

#[derive(Serialize)]
struct JsonSummary {
    metrics: JsonMetrics,
    errors: Vec<JsonErrorRecord>,
    skipped_files: IndexMap<String, Option<Vec<String>>>,
}

/// Joins Metrics + accumulated errors + accumulated skip records into one of
/// three renderings (§4.7).
pub struct SummaryEngine;

impl SummaryEngine {
    /// Renders the summary and, for JSON with a report file configured, also
    /// writes the JSON body to disk. Returns the rendered text (empty string
    /// for `SummaryFormat::None`).
    pub async fn render(
        metrics: &MetricsSnapshot,
        errors: &[ErrorRecord],
        skips: &[SkipRecord],
        opts: &SummaryOptions,
    ) -> Result<String, Error> {
        let rendered = match opts.format {
            SummaryFormat::None => String::new(),
            SummaryFormat::Compact => render_compact(metrics, opts.verbose),
            SummaryFormat::Long => render_long(metrics, errors, skips, opts.verbose),
            SummaryFormat::Json => render_json(metrics, errors, skips)?,
        };

        if opts.format == SummaryFormat::Json {
            if let Some(path) = &opts.report_file {
                if let Some(parent) = path.parent() {
                    tokio::fs::create_dir_all(parent).await.map_err(Error::Io)?;
                }
                tokio::fs::write(path, &rendered).await.map_err(Error::Io)?;
            }
        }

        Ok(rendered)
    }
}

fn render_compact(metrics: &MetricsSnapshot, verbose: bool) -> String {
    let mut out = format!(
        "Files: {} | Dirs: {} | Skipped: {} | Errors: {} | Time: {}",
        metrics.files_processed,
        metrics.directories_processed,
        metrics.skipped_files,
        metrics.errors_encountered,
        metrics.elapsed_time,
    );
    if !verbose {
        out.push('\n');
        out.push_str(&edim("For more details, use the verbose flag").to_string());
    }
    if metrics.errors_encountered > 0 {
        out.push('\n');
        out.push_str(&ered("✘ Some errors occurred.").to_string());
    }
    out
}

fn render_long(
    metrics: &MetricsSnapshot,
    errors: &[ErrorRecord],
    skips: &[SkipRecord],
    verbose: bool,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", ebold("Sync Summary")));
    out.push_str(&format!("  Files processed:      {}\n", metrics.files_processed));
    out.push_str(&format!("  Directories processed: {}\n", metrics.directories_processed));
    out.push_str(&format!("  Skipped files:        {}\n", metrics.skipped_files));
    out.push_str(&format!("  Errors:               {}\n", metrics.errors_encountered));
    out.push_str(&format!("  Elapsed time:         {}\n", metrics.elapsed_time));

    if verbose && !skips.is_empty() {
        out.push_str(&format!("\n{}\n", ebold("Skipped Files Breakdown")));
        let mut grouped: BTreeMap<SkipCategory, Vec<&SkipRecord>> = BTreeMap::new();
        for record in skips {
            grouped.entry(record.category).or_default().push(record);
        }
        for (category, records) in grouped {
            out.push_str(&format!("\n{}\n", ebold(category.label())));
            out.push_str(&format!("  {}\n", edim(category.hint())));
            // Workers report in no particular cross-worker order (§5); sort
            // sources here so the rendered breakdown is stable run-to-run.
            for record in records.into_iter().sorted_by_key(|r| r.source.clone()) {
                match &record.dest {
                    Some(dest) => out.push_str(&format!(
                        "  - {} → Expected: {}\n",
                        record.source.display(),
                        dest.display()
                    )),
                    None => out.push_str(&format!("  - {}\n", record.source.display())),
                }
            }
        }
    }

    if !errors.is_empty() {
        out.push_str(&format!(
            "\n{}\n",
            ered("✘ Some errors occurred. Check logs for details.")
        ));
    }

    out
}

fn render_json(
    metrics: &MetricsSnapshot,
    errors: &[ErrorRecord],
    skips: &[SkipRecord],
) -> Result<String, Error> {
    let mut grouped: BTreeMap<SkipCategory, Vec<String>> = BTreeMap::new();
    for record in skips {
        grouped
            .entry(record.category)
            .or_default()
            .push(record.source.display().to_string());
    }

    let mut skipped_files = IndexMap::new();
    for category in SkipCategory::json_rendered_categories() {
        let sources = grouped.remove(&category).map(|s| s.into_iter().sorted().collect());
        skipped_files.insert(category.json_key().to_string(), sources);
    }

    let json = JsonSummary {
        metrics: JsonMetrics {
            files_processed: metrics.files_processed,
            directories_processed: metrics.directories_processed,
            errors_encountered: metrics.errors_encountered,
            skipped_files: metrics.skipped_files,
            start_time: metrics.start_time.to_rfc3339(),
            elapsed_time: metrics.elapsed_time.clone(),
        },
        errors: errors
            .iter()
            .map(|e| JsonErrorRecord {
                source: e.source.display().to_string(),
                message: e.message.clone(),
            })
            .collect(),
        skipped_files,
    };

    serde_json::to_string_pretty(&json).map_err(Error::SummarySerialize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_metrics() -> MetricsSnapshot {
        MetricsSnapshot {
            files_processed: 1,
            directories_processed: 2,
            errors_encountered: 0,
            skipped_files: 1,
            start_time: chrono::Utc::now(),
            elapsed_time: "0.001s".to_string(),
        }
    }

    #[test]
    fn compact_has_no_error_trailer_when_zero_errors() {
        let out = render_compact(&sample_metrics(), true);
        assert!(!out.contains("Some errors occurred"));
    }

    #[tokio::test]
    async fn json_renders_missing_categories_as_null() {
        let metrics = sample_metrics();
        let skips = vec![SkipRecord::new(
            PathBuf::from("/in/a.css"),
            PathBuf::from("/in"),
            PathBuf::from("/out"),
            SkipCategory::UnchangedFile,
        )];
        let opts = SummaryOptions {
            format: SummaryFormat::Json,
            verbose: true,
            report_file: None,
        };
        let out = SummaryEngine::render(&metrics, &[], &skips, &opts).await.unwrap();
        assert!(out.contains("\"unsupported_file\": null"));
        assert!(out.contains("\"unchanged_file\""));
    }
}
