use layer_inspect_core::{Bgr, ColorSpace};
use serde::{Deserialize, Serialize};

/// Decision-function value a pixel must fall *below* to be marked as target material.
pub const MARGIN_THRESHOLD: f64 = -2.0;
/// Minimum highlighted fraction of a traversal kernel before a sample point is a defect.
pub const MIN_COVERAGE: f64 = 0.3;
/// Per-class cap on first-stage classifier training samples.
pub const SVM_SAMPLE_CAP: usize = 5000;
/// Fraction of the nominal extrusion width used for other extruders' (negative) masks.
pub const NEGATIVE_WIDTH_FACTOR: f64 = 0.3;
/// Default marker colour for classified material (red in BGR).
pub const DEFAULT_HIGHLIGHT: Bgr = [0, 0, 255];
/// Default colour for defect disks (red in BGR).
pub const DEFAULT_DEFECT_COLOR: Bgr = [0, 0, 255];

/// Settings for the primal linear SVM solver.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvmParams {
    /// Inverse regularisation strength.
    pub c: f64,
    /// Stop when `|grad| <= tol * |grad_0|`.
    pub tol: f64,
    pub max_iter: usize,
}

impl Default for SvmParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            tol: 1e-4,
            max_iter: 1000,
        }
    }
}

/// Material classifier configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierParams {
    pub color_space: ColorSpace,
    /// See [`MARGIN_THRESHOLD`].
    pub margin_threshold: f64,
    /// See [`SVM_SAMPLE_CAP`].
    pub sample_cap: usize,
    /// See [`NEGATIVE_WIDTH_FACTOR`].
    pub negative_width_factor: f64,
    /// Seed for the training subsample.
    pub seed: u64,
    pub svm: SvmParams,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            color_space: ColorSpace::Bgr,
            margin_threshold: MARGIN_THRESHOLD,
            sample_cap: SVM_SAMPLE_CAP,
            negative_width_factor: NEGATIVE_WIDTH_FACTOR,
            seed: 0,
            svm: SvmParams::default(),
        }
    }
}

/// Defect traversal configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraversalParams {
    /// See [`MIN_COVERAGE`].
    pub min_coverage: f64,
    pub defect_color: Bgr,
}

impl Default for TraversalParams {
    fn default() -> Self {
        Self {
            min_coverage: MIN_COVERAGE,
            defect_color: DEFAULT_DEFECT_COLOR,
        }
    }
}

/// Full per-layer inspection configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectParams {
    /// Colour written over pixels classified as the target material.
    pub highlight: Bgr,
    pub classifier: ClassifierParams,
    pub traversal: TraversalParams,
}

impl Default for InspectParams {
    fn default() -> Self {
        Self {
            highlight: DEFAULT_HIGHLIGHT,
            classifier: ClassifierParams::default(),
            traversal: TraversalParams::default(),
        }
    }
}
