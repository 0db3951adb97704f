use crate::error::Result;
use availstrip_classifier::DeclClassifier;
use availstrip_engine::{
    find_unique_defines_that_cover_all, Eligibility, MetadataOracle, StripMode, Stripper,
};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Settings for one processing run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The define assumed always present in the target convention; its
    /// `#if`/`#if !` blocks are the strip candidates
    pub target_define: String,
    /// Disposition policy for eligible blocks
    pub mode: StripMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_define: "NET".to_string(),
            mode: StripMode::Strip,
        }
    }
}

/// Result of rewriting one file's text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// The file's directive set cannot be reduced deterministically;
    /// nothing was touched
    Skipped(SkipReason),
    /// No candidate block changed
    Unchanged,
    /// The rewritten text
    Rewritten(String),
}

/// Why a file was left alone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Complementary or compound conditions guard the metadata
    IneligibleConditions,
}

/// Per-file outcome for reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileOutcome {
    pub path: String,
    pub status: OutcomeStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Skipped(SkipReason),
    Unchanged,
    Rewritten,
}

/// Processes files one at a time: eligibility analysis first, then the
/// oracle-gated strip. Holds no per-file state, so one processor per
/// worker thread is all parallel callers need.
pub struct FileProcessor<O: MetadataOracle> {
    config: PipelineConfig,
    oracle: O,
}

impl FileProcessor<DeclClassifier> {
    /// Processor backed by the grammar-aware C# classifier
    pub fn with_default_classifier(config: PipelineConfig) -> Result<Self> {
        Ok(Self::new(config, DeclClassifier::new()?))
    }
}

impl<O: MetadataOracle> FileProcessor<O> {
    pub fn new(config: PipelineConfig, oracle: O) -> Self {
        Self { config, oracle }
    }

    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Rewrite whole-file text.
    ///
    /// Malformed nesting is fatal and produces no partial output; an
    /// ineligible directive set is a skip, not an error.
    pub fn process_str(&self, text: &str) -> Result<Rewrite> {
        let eligibility =
            find_unique_defines_that_cover_all(text, Some(&self.config.target_define))?;
        match eligibility {
            Eligibility::Ineligible => {
                log::debug!("directive set is ambiguous; skipping");
                return Ok(Rewrite::Skipped(SkipReason::IneligibleConditions));
            }
            Eligibility::Eligible(defines) => {
                if !defines.is_empty() {
                    log::debug!(
                        "metadata also guarded by: {}",
                        defines
                            .iter()
                            .map(ToString::to_string)
                            .collect::<Vec<_>>()
                            .join(", ")
                    );
                }
            }
        }

        // fresh stripper per run; its state is traversal-scoped
        let mut stripper = Stripper::new(&self.config.target_define, self.config.mode, &self.oracle);
        let output = stripper.strip(text)?;
        if output == text {
            Ok(Rewrite::Unchanged)
        } else {
            Ok(Rewrite::Rewritten(output))
        }
    }

    /// Read, rewrite and write back one file. The file is only written
    /// when its content actually changed.
    pub fn process_file(&self, path: impl AsRef<Path>) -> Result<FileOutcome> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let status = match self.process_str(&text)? {
            Rewrite::Skipped(reason) => {
                log::info!("skipped {} ({reason:?})", path.display());
                OutcomeStatus::Skipped(reason)
            }
            Rewrite::Unchanged => OutcomeStatus::Unchanged,
            Rewrite::Rewritten(output) => {
                fs::write(path, output)?;
                log::info!("rewrote {}", path.display());
                OutcomeStatus::Rewritten
            }
        };
        Ok(FileOutcome {
            path: path.display().to_string(),
            status,
        })
    }
}

/// Render outcomes as a JSON report
pub fn render_report(outcomes: &[FileOutcome]) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcomes)?)
}
