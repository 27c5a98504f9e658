use std::path::PathBuf;

use clap::Parser;

/// Sync the asset tree into its mirrored template tree.
///
/// Only the flags that feed the sync engine's defaults are exposed here
/// (§6 "CLI surface of the sync subsystem"); the project-scaffolding
/// subcommands (`init`, `define`, `new`, `register`, `clean`) and the rest of
/// the wider CLI surface are out of scope (§1 Non-goals).
#[derive(Debug, Parser)]
#[command(name = "tempo-sync", version, about)]
pub struct Cli {
    /// Input directory of .css/.js assets. Defaults to `app.assets_dir` from
    /// the config file if omitted.
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output directory of .templ files. Defaults to `app.go_package` from
    /// the config file if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Directory prefix to exclude from traversal.
    #[arg(short = 'e', long = "exclude")]
    pub exclude: Option<PathBuf>,

    /// Worker pool size. Defaults to `processor.workers`, then 2x CPU count.
    #[arg(short = 'w', long = "workers")]
    pub workers: Option<usize>,

    /// Production mode: enables minification and disables the unchanged-file
    /// gate.
    #[arg(short = 'p', long = "prod")]
    pub prod: bool,

    /// Force processing of every file, bypassing the last-run gate.
    #[arg(short = 'f', long = "force")]
    pub force: bool,

    /// Summary format: compact, long, json, or none.
    #[arg(short = 's', long = "summary")]
    pub summary: Option<String>,

    /// Verbose output (breakdown sections, no "use verbose" hint).
    #[arg(long)]
    pub verbose: bool,

    /// Print per-file execution time as each job completes.
    #[arg(long = "track-time")]
    pub track_time: bool,

    /// Write the JSON summary body to this path in addition to stdout.
    #[arg(long = "report-file", visible_alias = "rf")]
    pub report_file: Option<PathBuf>,

    /// Path to the YAML config file. Defaults to ./tempo.yaml or
    /// ./tempo.yml if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Run the full pipeline but skip the final template write
    /// (supplementary flag; not part of the original CLI surface).
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Marker name substituted into guard-marker comments. Defaults to
    /// `templates.guard_marker` from the config file.
    #[arg(short = 'm', long = "marker")]
    pub marker: Option<String>,
}
