use std::path::PathBuf;

/// Reason category for a deliberate, non-error omission of work on a file.
/// Order here doubles as the grouping order in the long-format summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipCategory {
    UnsupportedFile,
    MismatchedOutput,
    MissingTempl,
    UnchangedFile,
    QueueFull,
    Excluded,
}

impl SkipCategory {
    /// The fixed, grayed hint string shown under each category's group
    /// heading in the long-format summary (§4.7).
    pub fn hint(self) -> &'static str {
        match self {
            SkipCategory::UnsupportedFile => "file extension is not .css or .js",
            SkipCategory::MismatchedOutput => "computed output path diverges from the mirrored template path",
            SkipCategory::MissingTempl => "no matching .templ file exists in the output tree",
            SkipCategory::UnchangedFile => "source has not changed since the last run",
            SkipCategory::QueueFull => "job queue was full; increase workers",
            SkipCategory::Excluded => "matches an exclusion rule or is an OS noise file",
        }
    }

    /// The bolded reason label used as the group heading.
    pub fn label(self) -> &'static str {
        match self {
            SkipCategory::UnsupportedFile => "Unsupported File",
            SkipCategory::MismatchedOutput => "Mismatched Output",
            SkipCategory::MissingTempl => "Missing Template",
            SkipCategory::UnchangedFile => "Unchanged File",
            SkipCategory::QueueFull => "Queue Full",
            SkipCategory::Excluded => "Excluded",
        }
    }

    /// The lower_snake_case key used in the JSON summary's `skipped_files` map.
    pub fn json_key(self) -> &'static str {
        match self {
            SkipCategory::UnsupportedFile => "unsupported_file",
            SkipCategory::MismatchedOutput => "mismatched_output",
            SkipCategory::MissingTempl => "missing_templ",
            SkipCategory::UnchangedFile => "unchanged_file",
            SkipCategory::QueueFull => "queue_full",
            SkipCategory::Excluded => "excluded",
        }
    }

    /// The categories rendered as keys in the JSON `skipped_files` object
    /// (§4.7 lists `excluded` out of that shape; it's still tracked and
    /// rendered in the long-format breakdown).
    pub fn json_rendered_categories() -> [SkipCategory; 5] {
        [
            SkipCategory::UnsupportedFile,
            SkipCategory::MismatchedOutput,
            SkipCategory::MissingTempl,
            SkipCategory::UnchangedFile,
            SkipCategory::QueueFull,
        ]
    }
}

/// A deliberate, reasoned omission of work on a file (§3).
#[derive(Debug, Clone)]
pub struct SkipRecord {
    pub source: PathBuf,
    pub dest: Option<PathBuf>,
    pub input_root: PathBuf,
    pub output_root: PathBuf,
    pub reason_text: String,
    pub category: SkipCategory,
}

impl SkipRecord {
    pub fn new(
        source: PathBuf,
        input_root: PathBuf,
        output_root: PathBuf,
        category: SkipCategory,
    ) -> Self {
        let reason_text = category.hint().to_string();
        Self {
            source,
            dest: None,
            input_root,
            output_root,
            reason_text,
            category,
        }
    }

    pub fn with_dest(mut self, dest: PathBuf) -> Self {
        self.dest = Some(dest);
        self
    }
}
