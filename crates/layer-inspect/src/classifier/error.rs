use std::fmt;

use layer_inspect_core::ConfigError;
use serde::{Deserialize, Serialize};

/// Which sample set ran dry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleStage {
    /// Pixels under the inspected extruder's mask.
    Positive,
    /// Pixels under every other extruder's (narrowed) mask.
    Negative,
    /// Positive samples the first classifier agreed with.
    RefinedPositive,
    /// Negative samples the first classifier agreed with.
    RefinedNegative,
}

impl fmt::Display for SampleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleStage::Positive => "positive",
            SampleStage::Negative => "negative",
            SampleStage::RefinedPositive => "refined positive",
            SampleStage::RefinedNegative => "refined negative",
        };
        f.write_str(name)
    }
}

/// Errors returned by the material classifier.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ClassifyError {
    #[error("extruder {extruder} out of range (layer has {available} extruders)")]
    UnknownExtruder { extruder: usize, available: usize },
    #[error("insufficient discriminative samples for extruder {extruder} ({stage} set is empty)")]
    InsufficientSamples { extruder: usize, stage: SampleStage },
    #[error("linear SVM Newton system is not positive definite")]
    Solver,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClassifyError {
    /// `true` for "this extruder had no visible or distinguishable material".
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, ClassifyError::InsufficientSamples { .. })
    }
}
