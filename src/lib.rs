use std::path::PathBuf;

use tracing::instrument;

pub mod analysis;
pub mod containment;
pub mod dataset;
mod error;
pub mod layout;
pub mod mask;
pub mod report;
mod result;
pub mod stats;
pub mod util;

pub use analysis::{FrameRecord, ImageCountRow, ObjectReport, PanelReport, TitleCount};
pub use containment::{boxes_inside_frame, containment_ratio};
pub use dataset::{Dataset, ImageInfo, Page};
pub use error::*;
pub use layout::{classify_layout, Layout};
pub use result::*;
pub use stats::Summary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegeneratePolicy {
    /// Count the box as contained when it lies within the closed frame.
    #[default]
    ByPosition,
    /// Fail with [`GeometryError::DegenerateCandidate`].
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainmentOptions {
    pub threshold: f64,
    pub degenerate: DegeneratePolicy,
}

impl Default for ContainmentOptions {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            degenerate: DegeneratePolicy::ByPosition,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelOptions {
    pub containment: ContainmentOptions,
    /// Frames holding at least this many objects are logged.
    pub crowded_frame_threshold: usize,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            containment: ContainmentOptions::default(),
            crowded_frame_threshold: 10,
        }
    }
}

pub struct AnalyzerBuilder {
    threshold: f64,
    degenerate: DegeneratePolicy,
    crowded_frame_threshold: usize,
    output_dir: Option<PathBuf>,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate = policy;
        self
    }

    pub fn crowded_frame_threshold(mut self, objects: usize) -> Self {
        self.crowded_frame_threshold = objects;
        self
    }

    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    #[instrument(skip(self))]
    pub fn build(self) -> Result<Analyzer, GeometryError> {
        if !self.threshold.is_finite() {
            return Err(GeometryError::InvalidThreshold {
                value: self.threshold,
            });
        }
        Ok(Analyzer {
            options: PanelOptions {
                containment: ContainmentOptions {
                    threshold: self.threshold,
                    degenerate: self.degenerate,
                },
                crowded_frame_threshold: self.crowded_frame_threshold,
            },
            output_dir: self.output_dir.unwrap_or_else(|| ".".into()),
        })
    }
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        let defaults = PanelOptions::default();
        Self {
            threshold: defaults.containment.threshold,
            degenerate: defaults.containment.degenerate,
            crowded_frame_threshold: defaults.crowded_frame_threshold,
            output_dir: None,
        }
    }
}

pub struct Analyzer {
    options: PanelOptions,
    output_dir: PathBuf,
}

impl Analyzer {
    #[instrument(skip(self, dataset), fields(pages = dataset.pages.len()))]
    pub fn panels(&self, dataset: &Dataset) -> Result<PanelReport, AnalysisError> {
        analysis::analyze_panels(&dataset.pages, &self.options)
    }

    #[instrument(skip(self, dataset), fields(pages = dataset.pages.len()))]
    pub fn objects(&self, dataset: &Dataset, kind: &ObjectKind) -> ObjectReport {
        analysis::analyze_objects(&dataset.pages, kind)
    }

    pub fn write_panels(&self, report: &PanelReport) -> Result<Vec<PathBuf>, ReportError> {
        self.ensure_output_dir()?;
        report::write_panel_report(&self.output_dir, report)
    }

    pub fn write_objects(&self, report: &ObjectReport) -> Result<Vec<PathBuf>, ReportError> {
        self.ensure_output_dir()?;
        Ok(vec![
            report::write_object_report(&self.output_dir, report)?,
            report::write_object_csv(&self.output_dir, report)?,
        ])
    }

    fn ensure_output_dir(&self) -> Result<(), ReportError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| ReportError::Io {
            path: self.output_dir.clone(),
            source,
        })
    }
}
