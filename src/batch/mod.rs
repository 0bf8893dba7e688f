//! Multi-document conversion with per-document failure isolation.
//!
//! Each document gets its own image sink and output file. A failing document
//! is recorded and the batch moves on; nothing here aborts the run.

use std::collections::{BTreeSet, HashSet};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, anyhow, bail};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::ConverterConfig;
use crate::image_sink::sanitize_base_name;
use crate::markdown_converter::{
    ConversionResult, convert_docx_file_with_image_base, document_stem,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    Succeeded,
    SucceededWithWarnings,
    Failed,
    /// Not started because the batch was cancelled
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutcome {
    pub source: PathBuf,
    /// Written Markdown file, for converted documents
    pub output: Option<PathBuf>,
    pub status: DocumentStatus,
    pub image_count: usize,
    pub warnings: Vec<String>,
    /// Failure description, for failed documents
    pub error: Option<String>,
}

impl DocumentOutcome {
    fn converted(source: &Path, output: PathBuf, result: ConversionResult) -> Self {
        let status = if result.has_warnings() {
            DocumentStatus::SucceededWithWarnings
        } else {
            DocumentStatus::Succeeded
        };
        Self {
            source: source.to_path_buf(),
            output: Some(output),
            status,
            image_count: result.image_count,
            warnings: result.warnings,
            error: None,
        }
    }

    fn failed(source: &Path, error: &anyhow::Error) -> Self {
        Self {
            source: source.to_path_buf(),
            output: None,
            status: DocumentStatus::Failed,
            image_count: 0,
            warnings: Vec::new(),
            error: Some(format!("{error:#}")),
        }
    }

    fn skipped(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            output: None,
            status: DocumentStatus::Skipped,
            image_count: 0,
            warnings: Vec::new(),
            error: None,
        }
    }
}

/// Outcomes of a batch grouped by status, each group in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: Vec<DocumentOutcome>,
    pub with_warnings: Vec<DocumentOutcome>,
    pub failed: Vec<DocumentOutcome>,
    pub skipped: Vec<DocumentOutcome>,
}

impl BatchSummary {
    fn from_outcomes(outcomes: Vec<DocumentOutcome>) -> Self {
        let mut summary = Self::default();
        for outcome in outcomes {
            match outcome.status {
                DocumentStatus::Succeeded => summary.succeeded.push(outcome),
                DocumentStatus::SucceededWithWarnings => summary.with_warnings.push(outcome),
                DocumentStatus::Failed => summary.failed.push(outcome),
                DocumentStatus::Skipped => summary.skipped.push(outcome),
            }
        }
        summary
    }

    /// Total number of documents in the batch
    #[must_use]
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.with_warnings.len() + self.failed.len() + self.skipped.len()
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }

    /// Human-readable report
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} converted, {} with warnings, {} failed, {} skipped",
            self.succeeded.len(),
            self.with_warnings.len(),
            self.failed.len(),
            self.skipped.len()
        );

        let converted = |out: &mut String, outcome: &DocumentOutcome| {
            let output = outcome
                .output
                .as_deref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  {} -> {} ({} image{})",
                outcome.source.display(),
                output,
                outcome.image_count,
                if outcome.image_count == 1 { "" } else { "s" }
            );
        };

        if !self.succeeded.is_empty() {
            out.push_str("\nConverted:\n");
            for outcome in &self.succeeded {
                converted(&mut out, outcome);
            }
        }
        if !self.with_warnings.is_empty() {
            out.push_str("\nConverted with warnings:\n");
            for outcome in &self.with_warnings {
                converted(&mut out, outcome);
                for warning in &outcome.warnings {
                    let _ = writeln!(out, "    - {warning}");
                }
            }
        }
        if !self.failed.is_empty() {
            out.push_str("\nFailed:\n");
            for outcome in &self.failed {
                let _ = writeln!(
                    out,
                    "  {}: {}",
                    outcome.source.display(),
                    outcome.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        if !self.skipped.is_empty() {
            out.push_str("\nSkipped (cancelled):\n");
            for outcome in &self.skipped {
                let _ = writeln!(out, "  {}", outcome.source.display());
            }
        }
        out
    }
}

/// Output names reserved for one document before any conversion starts
#[derive(Debug, Clone, PartialEq, Eq)]
struct OutputPlan {
    markdown_path: PathBuf,
    image_base: String,
}

/// Case-folded key, so names differing only in case count as taken
fn name_key(path: &Path) -> String {
    path.to_string_lossy().to_lowercase()
}

/// Reserve a distinct Markdown file and image name stem for every document.
///
/// Runs before conversion in input order, so parallel batches get the same
/// assignment as sequential ones. A document whose Markdown file is already
/// claimed by an earlier document fails; a clashing image stem gets a `-2`,
/// `-3`, ... suffix.
fn plan_outputs(paths: &[PathBuf], config: &ConverterConfig) -> Vec<Result<OutputPlan, String>> {
    let mut markdown_paths = HashSet::new();
    let mut image_names = HashSet::new();

    paths
        .iter()
        .map(|path| {
            let markdown_path = config.markdown_path_for(path);
            if !markdown_paths.insert(name_key(&markdown_path)) {
                return Err(format!(
                    "{} is also the output of an earlier document in this batch",
                    markdown_path.display()
                ));
            }

            let image_dir = config.image_dir_for(path);
            let stem = sanitize_base_name(&document_stem(path));
            let mut image_base = stem.clone();
            let mut suffix = 1;
            while !image_names.insert(name_key(&image_dir.join(&image_base))) {
                suffix += 1;
                image_base = format!("{stem}-{suffix}");
            }
            if suffix > 1 {
                debug!(
                    path = %path.display(),
                    image_base = %image_base,
                    "image name stem already taken, using suffix"
                );
            }

            Ok(OutputPlan {
                markdown_path,
                image_base,
            })
        })
        .collect()
}

/// Prepare output locations, convert, and write the planned `.md` file
fn convert_and_write(
    path: &Path,
    plan: &OutputPlan,
    config: &ConverterConfig,
) -> Result<ConversionResult> {
    let markdown_path = &plan.markdown_path;
    if markdown_path.exists() && !config.overwrite() {
        bail!(
            "{} already exists (enable overwrite to replace it)",
            markdown_path.display()
        );
    }

    let image_dir = config.image_dir_for(path);
    std::fs::create_dir_all(&image_dir)
        .with_context(|| format!("Failed to create image directory {}", image_dir.display()))?;

    let result = convert_docx_file_with_image_base(path, config, &plan.image_base)
        .with_context(|| format!("Failed to convert {}", path.display()))?;

    std::fs::write(markdown_path, &result.markdown)
        .with_context(|| format!("Failed to write {}", markdown_path.display()))?;
    Ok(result)
}

fn process_document(
    path: &Path,
    plan: &Result<OutputPlan, String>,
    config: &ConverterConfig,
    cancel: &AtomicBool,
) -> DocumentOutcome {
    if cancel.load(Ordering::Relaxed) {
        info!(path = %path.display(), "batch cancelled, skipping document");
        return DocumentOutcome::skipped(path);
    }
    let converted = plan
        .as_ref()
        .map_err(|reason| anyhow!("{reason}"))
        .and_then(|plan| {
            convert_and_write(path, plan, config).map(|result| (plan.markdown_path.clone(), result))
        });
    match converted {
        Ok((output, result)) => DocumentOutcome::converted(path, output, result),
        Err(e) => {
            warn!(path = %path.display(), "document conversion failed: {e:#}");
            DocumentOutcome::failed(path, &e)
        }
    }
}

/// Convert every document in `paths`
#[must_use]
pub fn convert_batch(paths: &[PathBuf], config: &ConverterConfig) -> BatchSummary {
    convert_batch_with_cancel(paths, config, &AtomicBool::new(false))
}

/// Convert `paths`, checking `cancel` before starting each document.
///
/// Documents not started once `cancel` is set are reported as skipped;
/// documents already in progress run to completion.
#[must_use]
pub fn convert_batch_with_cancel(
    paths: &[PathBuf],
    config: &ConverterConfig,
    cancel: &AtomicBool,
) -> BatchSummary {
    info!(documents = paths.len(), parallel = config.parallel(), "starting batch conversion");

    // Image directories this batch creates; removed again if left empty
    let new_image_dirs: BTreeSet<PathBuf> = paths
        .iter()
        .map(|path| config.image_dir_for(path))
        .filter(|dir| !dir.exists())
        .collect();

    let plans = plan_outputs(paths, config);

    let outcomes: Vec<DocumentOutcome> = if config.parallel() {
        paths
            .par_iter()
            .zip(plans.par_iter())
            .map(|(path, plan)| process_document(path, plan, config, cancel))
            .collect()
    } else {
        paths
            .iter()
            .zip(&plans)
            .map(|(path, plan)| process_document(path, plan, config, cancel))
            .collect()
    };

    for dir in &new_image_dirs {
        // Fails (and keeps the directory) unless it is empty
        if std::fs::remove_dir(dir).is_ok() {
            debug!(dir = %dir.display(), "removed unused image directory");
        }
    }

    let summary = BatchSummary::from_outcomes(outcomes);
    info!(
        succeeded = summary.succeeded.len(),
        with_warnings = summary.with_warnings.len(),
        failed = summary.failed.len(),
        skipped = summary.skipped.len(),
        "batch conversion finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, status: DocumentStatus) -> DocumentOutcome {
        DocumentOutcome {
            source: PathBuf::from(name),
            output: Some(PathBuf::from(name).with_extension("md")),
            status,
            image_count: 1,
            warnings: if status == DocumentStatus::SucceededWithWarnings {
                vec!["Image 1: failed to write".to_string()]
            } else {
                Vec::new()
            },
            error: (status == DocumentStatus::Failed).then(|| "not a zip".to_string()),
        }
    }

    #[test]
    fn test_summary_groups_and_renders() {
        let summary = BatchSummary::from_outcomes(vec![
            outcome("a.docx", DocumentStatus::Succeeded),
            outcome("b.docx", DocumentStatus::SucceededWithWarnings),
            outcome("c.docx", DocumentStatus::Failed),
        ]);
        assert_eq!(summary.total(), 3);
        assert!(summary.has_failures());

        let report = summary.render();
        assert!(report.starts_with("1 converted, 1 with warnings, 1 failed, 0 skipped"), "{report}");
        assert!(report.contains("a.docx -> a.md (1 image)"), "{report}");
        assert!(report.contains("    - Image 1: failed to write"), "{report}");
        assert!(report.contains("c.docx: not a zip"), "{report}");
        assert!(!report.contains("Skipped"), "{report}");
    }

    #[test]
    fn test_plan_outputs_suffixes_clashing_image_names() {
        let config = ConverterConfig::builder()
            .output_dir("/out")
            .build()
            .expect("config");
        let paths = vec![
            PathBuf::from("/a/Q3 Report.docx"),
            PathBuf::from("/a/Q3-Report.docx"),
            PathBuf::from("/b/q3 report.docx"),
            PathBuf::from("/a/notes.docx"),
        ];
        let plans = plan_outputs(&paths, &config);

        let first = plans[0].as_ref().expect("first planned");
        assert_eq!(first.markdown_path, PathBuf::from("/out/Q3 Report.md"));
        assert_eq!(first.image_base, "Q3-Report");
        assert_eq!(plans[1].as_ref().expect("second planned").image_base, "Q3-Report-2");
        assert!(plans[2].as_ref().unwrap_err().contains("earlier document"));
        assert_eq!(plans[3].as_ref().expect("notes planned").image_base, "notes");
    }

    #[test]
    fn test_cancelled_batch_skips_everything() {
        let cancel = AtomicBool::new(true);
        let paths = vec![PathBuf::from("/nope/a.docx"), PathBuf::from("/nope/b.docx")];
        let summary = convert_batch_with_cancel(&paths, &ConverterConfig::default(), &cancel);
        assert_eq!(summary.skipped.len(), 2);
        assert!(!summary.has_failures());
    }
}
