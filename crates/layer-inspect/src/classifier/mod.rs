//! Material classifier: which pixels show extruder K's material.
//!
//! Pipeline:
//! 1. positive samples under extruder K's mask (nominal width),
//! 2. negative samples under every other extruder's mask (narrowed width),
//! 3. seeded subsample of both classes to a fixed cap,
//! 4. first linear SVM on the capped set,
//! 5. keep only raw samples the first model agrees with,
//! 6. balance the classes and fit the final model,
//! 7. mark every pixel confidently on the target side.

mod bootstrap;
mod error;
mod label;
mod svm;

pub use bootstrap::{train_bootstrap, ClassifierFit, SampleCounts, StageCounts, TrainingSet};
pub use error::{ClassifyError, SampleStage};
pub use label::mark_material;
pub use svm::{fit_linear_svm, Label, LinearModel};

use layer_inspect_core::{
    validate_extrusion_width, Bgr, ColorImage, CoordinateMapper, LayerToolpath,
};

use crate::mask::build_mask;
use crate::params::ClassifierParams;
use crate::sampler::sample_pixels;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Labelled image plus the fit that produced it.
#[derive(Clone, Debug)]
pub struct Classification {
    /// Original image with target-material pixels replaced by the highlight colour.
    pub image: ColorImage,
    pub fit: ClassifierFit,
}

/// Gather raw training samples for `extruder` from the photograph.
pub fn collect_training_set(
    image: &ColorImage,
    mapper: &CoordinateMapper,
    layer: &LayerToolpath,
    extruder: usize,
    extrusion_width_mm: f64,
    params: &ClassifierParams,
) -> Result<TrainingSet, ClassifyError> {
    validate_extrusion_width(extrusion_width_mm)?;
    let path = layer.path(extruder).ok_or(ClassifyError::UnknownExtruder {
        extruder,
        available: layer.extruder_count(),
    })?;

    let mask = build_mask(mapper, path, extrusion_width_mm);
    let positive = sample_pixels(image, &mask, params.color_space, 0);

    let narrow_width = extrusion_width_mm * params.negative_width_factor;
    let mut negative = Vec::new();
    for (other, other_path) in layer.extruders.iter().enumerate() {
        if other == extruder {
            continue;
        }
        let mask = build_mask(mapper, other_path, narrow_width);
        negative.extend(sample_pixels(image, &mask, params.color_space, 0));
    }

    log::debug!(
        "extruder {extruder}: {} positive, {} negative raw samples in {:?}",
        positive.len(),
        negative.len(),
        params.color_space.channel_names()
    );
    Ok(TrainingSet::new(positive, negative))
}

/// Classify every pixel of `image` as extruder `extruder`'s material or not.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(image, mapper, layer, params))
)]
pub fn classify_extruder(
    image: &ColorImage,
    mapper: &CoordinateMapper,
    layer: &LayerToolpath,
    extruder: usize,
    extrusion_width_mm: f64,
    highlight: Bgr,
    params: &ClassifierParams,
) -> Result<Classification, ClassifyError> {
    let raw = collect_training_set(image, mapper, layer, extruder, extrusion_width_mm, params)?;
    let fit = train_bootstrap(&raw, extruder, params)?;
    let image = mark_material(
        image,
        &fit.model,
        params.color_space,
        params.margin_threshold,
        highlight,
    );
    log::debug!(
        "extruder {extruder}: {} pixels marked as target material",
        image.count_color(highlight)
    );
    Ok(Classification { image, fit })
}
