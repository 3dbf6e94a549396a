use layer_inspect_core::ConfigError;

use crate::classifier::ClassifyError;

/// Errors returned by the layer analyzer.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AnalyzeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

impl AnalyzeError {
    /// `true` when the extruder had no usable material in the photograph.
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, AnalyzeError::Classify(e) if e.is_insufficient_data())
    }
}
