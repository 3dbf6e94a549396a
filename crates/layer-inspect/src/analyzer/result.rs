use serde::{Deserialize, Serialize};

use super::AnalyzeError;
use crate::classifier::{ClassifierFit, Classification};
use crate::traversal::{DefectReport, DefectSite};

/// Classification and traversal output of one extruder.
#[derive(Clone, Debug)]
pub struct ExtruderInspection {
    pub classification: Classification,
    pub report: DefectReport,
}

/// What happened to one extruder during a layer inspection.
#[derive(Clone, Debug)]
pub enum ExtruderOutcome {
    Inspected(ExtruderInspection),
    /// Path too short to verify (fewer than two segments).
    Skipped { segments: usize },
    Failed(AnalyzeError),
}

impl ExtruderOutcome {
    /// Skipped extruders pass; failed ones never do.
    pub fn passed(&self) -> bool {
        match self {
            ExtruderOutcome::Inspected(inspection) => inspection.report.passed,
            ExtruderOutcome::Skipped { .. } => true,
            ExtruderOutcome::Failed(_) => false,
        }
    }

    pub fn inspection(&self) -> Option<&ExtruderInspection> {
        match self {
            ExtruderOutcome::Inspected(inspection) => Some(inspection),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AnalyzeError> {
        match self {
            ExtruderOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// One outcome per extruder, in extruder order.
#[derive(Clone, Debug, Default)]
pub struct LayerReport {
    pub outcomes: Vec<ExtruderOutcome>,
}

impl LayerReport {
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(ExtruderOutcome::passed)
    }

    /// Total number of defect sites over all inspected extruders.
    pub fn defect_count(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(ExtruderOutcome::inspection)
            .map(|i| i.report.defects.len())
            .sum()
    }

    /// Image-free view of the report, suitable for JSON output.
    pub fn summary(&self) -> LayerSummary {
        let extruders = self
            .outcomes
            .iter()
            .enumerate()
            .map(|(extruder, outcome)| ExtruderSummary::new(extruder, outcome))
            .collect();
        LayerSummary {
            passed: self.passed(),
            extruders,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtruderStatus {
    Passed,
    Defective,
    Skipped,
    Failed,
}

/// Serializable per-extruder result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtruderSummary {
    pub extruder: usize,
    pub status: ExtruderStatus,
    #[serde(default)]
    pub samples_checked: usize,
    #[serde(default)]
    pub defects: Vec<DefectSite>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit: Option<ClassifierFit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtruderSummary {
    fn new(extruder: usize, outcome: &ExtruderOutcome) -> Self {
        let mut summary = Self {
            extruder,
            status: ExtruderStatus::Skipped,
            samples_checked: 0,
            defects: Vec::new(),
            fit: None,
            error: None,
        };
        match outcome {
            ExtruderOutcome::Inspected(inspection) => {
                let report = &inspection.report;
                summary.status = if report.passed {
                    ExtruderStatus::Passed
                } else {
                    ExtruderStatus::Defective
                };
                summary.samples_checked = report.samples_checked;
                summary.defects = report.defects.clone();
                summary.fit = Some(inspection.classification.fit);
            }
            ExtruderOutcome::Skipped { .. } => {}
            ExtruderOutcome::Failed(err) => {
                summary.status = ExtruderStatus::Failed;
                summary.error = Some(err.to_string());
            }
        }
        summary
    }
}

/// Serializable layer result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerSummary {
    pub passed: bool,
    pub extruders: Vec<ExtruderSummary>,
}
