//! Material coverage inspection for photographed multi-material print layers.
//!
//! For every extruder of a layer:
//! - the toolpath is rasterised into an extrusion mask ([`build_mask`]),
//! - colour samples under that mask and under every other extruder's mask
//!   train a two-stage linear SVM ([`classify_extruder`]),
//! - every pixel the final model is confident about is highlighted,
//! - the path is walked in half-width steps and sample points whose
//!   neighbourhood is not highlighted enough become defects ([`inspect_path`]).
//!
//! [`LayerAnalyzer`] runs all of this for a full layer. Geometry, calibration
//! and pixel buffers live in `layer-inspect-core`.
//!
//! ## Quickstart
//!
//! ```
//! use layer_inspect::{Calibration, InspectParams, LayerAnalyzer};
//! use layer_inspect::core::{ColorImage, ExtruderPath, LayerToolpath, Segment};
//!
//! let layer = LayerToolpath::new(vec![ExtruderPath::new(vec![
//!     Segment::from_xy(0.0, 5.0, 10.0, 5.0),
//!     Segment::from_xy(10.0, 5.0, 20.0, 5.0),
//! ])]);
//! let photo = ColorImage::new(300, 200);
//! let analyzer = LayerAnalyzer::new(layer, photo, &Calibration::uniform(10.0))?;
//! let report = analyzer.inspect_layer(0.4, &InspectParams::default());
//! // a single extruder has no negative samples to train against
//! assert!(!report.passed());
//! # Ok::<(), layer_inspect::AnalyzeError>(())
//! ```
//!
//! ## Features
//! - `image` (default): `image::RgbImage` adapters and PNG load/save.
//! - `cli` (default): the `layer-inspect` binary.
//! - `parallel`: row-parallel labelling and per-extruder parallelism via rayon.
//! - `tracing`: spans around the pipeline stages.

pub mod analyzer;
pub mod classifier;
#[cfg(feature = "image")]
pub mod imaging;
pub mod io;
pub mod mask;
pub mod params;
pub mod sampler;
pub mod traversal;

pub use layer_inspect_core as core;

pub use analyzer::{
    AnalyzeError, Calibration, ExtruderInspection, ExtruderOutcome, ExtruderStatus,
    ExtruderSummary, LayerAnalyzer, LayerReport, LayerSummary,
};
pub use classifier::{
    classify_extruder, collect_training_set, fit_linear_svm, mark_material, train_bootstrap,
    Classification, ClassifierFit, ClassifyError, Label, LinearModel, SampleCounts, SampleStage,
    StageCounts, TrainingSet,
};
#[cfg(feature = "image")]
pub use imaging::{color_image_from_rgb, color_image_to_rgb, load_color_image, save_color_image};
pub use io::{load_toolpath, write_toolpath, ExtruderImages, InspectConfig, InspectIoError, InspectReport};
pub use mask::build_mask;
pub use params::{
    ClassifierParams, InspectParams, SvmParams, TraversalParams, DEFAULT_DEFECT_COLOR,
    DEFAULT_HIGHLIGHT, MARGIN_THRESHOLD, MIN_COVERAGE, NEGATIVE_WIDTH_FACTOR, SVM_SAMPLE_CAP,
};
pub use sampler::{sample_pixels, ColorSample};
pub use traversal::{inspect_path, CircleKernel, Coverage, DefectReport, DefectSite};
