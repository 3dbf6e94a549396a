//! Per-layer orchestration.
//!
//! [`LayerAnalyzer`] owns one photograph and the toolpath of the layer it
//! shows, builds the coordinate mapping once, and runs classification plus
//! defect traversal for each extruder. One extruder failing never stops the
//! others.

mod error;
mod result;

pub use error::AnalyzeError;
pub use result::{
    ExtruderInspection, ExtruderOutcome, ExtruderStatus, ExtruderSummary, LayerReport,
    LayerSummary,
};

use layer_inspect_core::{
    validate_extrusion_width, ColorImage, ColorSpace, ConfigError, CoordinateMapper,
    ExtruderPath, LayerBounds, LayerToolpath, Mask, PixelDensity,
};
use serde::{Deserialize, Serialize};

use crate::classifier::{classify_extruder, Classification, ClassifyError};
use crate::mask::build_mask;
use crate::params::InspectParams;
use crate::sampler::{sample_pixels, ColorSample};
use crate::traversal::{inspect_path, DefectReport};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Photograph calibration in the caller's terms.
///
/// Without explicit `bounds` the bounding box of every extruder path is used.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub px_per_mm_x: f64,
    pub px_per_mm_y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<LayerBounds>,
}

impl Calibration {
    pub fn uniform(px_per_mm: f64) -> Self {
        Self {
            px_per_mm_x: px_per_mm,
            px_per_mm_y: px_per_mm,
            bounds: None,
        }
    }

    pub fn with_bounds(mut self, bounds: LayerBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn density(&self) -> Result<PixelDensity, ConfigError> {
        PixelDensity::new(self.px_per_mm_x, self.px_per_mm_y)
    }
}

/// Inspection context for one photographed layer.
#[derive(Clone, Debug)]
pub struct LayerAnalyzer {
    layer: LayerToolpath,
    image: ColorImage,
    bounds: LayerBounds,
    mapper: CoordinateMapper,
}

impl LayerAnalyzer {
    /// Validate the calibration and build the mapping for `image`.
    pub fn new(
        layer: LayerToolpath,
        image: ColorImage,
        calibration: &Calibration,
    ) -> Result<Self, AnalyzeError> {
        let density = calibration.density()?;
        let bounds = match calibration.bounds {
            Some(bounds) => {
                bounds.validate()?;
                bounds
            }
            None => layer.bounds()?,
        };
        let mapper = CoordinateMapper::new(density, &bounds, image.width, image.height)?;
        log::debug!(
            "layer: {} extruders, bounds ({:.2}, {:.2})..({:.2}, {:.2}) mm, image {}x{}",
            layer.extruder_count(),
            bounds.min_x,
            bounds.min_y,
            bounds.max_x,
            bounds.max_y,
            image.width,
            image.height
        );
        Ok(Self {
            layer,
            image,
            bounds,
            mapper,
        })
    }

    #[inline]
    pub fn layer(&self) -> &LayerToolpath {
        &self.layer
    }

    #[inline]
    pub fn image(&self) -> &ColorImage {
        &self.image
    }

    #[inline]
    pub fn bounds(&self) -> LayerBounds {
        self.bounds
    }

    #[inline]
    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    fn path(&self, extruder: usize) -> Result<&ExtruderPath, AnalyzeError> {
        self.layer.path(extruder).ok_or_else(|| {
            ClassifyError::UnknownExtruder {
                extruder,
                available: self.layer.extruder_count(),
            }
            .into()
        })
    }

    /// Nominal-width mask of one extruder's path.
    pub fn extruder_mask(&self, extruder: usize, width_mm: f64) -> Result<Mask, AnalyzeError> {
        validate_extrusion_width(width_mm)?;
        Ok(build_mask(&self.mapper, self.path(extruder)?, width_mm))
    }

    /// Colour samples under one extruder's mask; `limit == 0` keeps all of them.
    pub fn extruder_pixels(
        &self,
        extruder: usize,
        width_mm: f64,
        color_space: ColorSpace,
        limit: usize,
    ) -> Result<Vec<ColorSample>, AnalyzeError> {
        let mask = self.extruder_mask(extruder, width_mm)?;
        Ok(sample_pixels(&self.image, &mask, color_space, limit))
    }

    /// Classified image for one extruder (target material in `params.highlight`).
    pub fn classify(
        &self,
        extruder: usize,
        width_mm: f64,
        params: &InspectParams,
    ) -> Result<Classification, AnalyzeError> {
        Ok(classify_extruder(
            &self.image,
            &self.mapper,
            &self.layer,
            extruder,
            width_mm,
            params.highlight,
            &params.classifier,
        )?)
    }

    /// Walk one extruder's path over an already classified image.
    pub fn traverse(
        &self,
        classified: &ColorImage,
        extruder: usize,
        width_mm: f64,
        params: &InspectParams,
    ) -> Result<DefectReport, AnalyzeError> {
        Ok(inspect_path(
            classified,
            &self.image,
            &self.mapper,
            self.path(extruder)?,
            width_mm,
            params.highlight,
            &params.traversal,
        )?)
    }

    /// Classify and traverse one extruder, folding every error into the outcome.
    pub fn inspect_extruder(
        &self,
        extruder: usize,
        width_mm: f64,
        params: &InspectParams,
    ) -> ExtruderOutcome {
        let _scope = layer_inspect_core::extruder_scope(extruder);
        let path = match self.path(extruder) {
            Ok(path) => path,
            Err(err) => return ExtruderOutcome::Failed(err),
        };
        if !path.is_verifiable() {
            let segments = path.len();
            log::info!("extruder {extruder}: skipped ({segments} segments)");
            return ExtruderOutcome::Skipped { segments };
        }
        log::debug!(
            "extruder {extruder}: {} segments, {:.1} mm of toolpath",
            path.len(),
            path.total_length()
        );

        let inspected = self.classify(extruder, width_mm, params).and_then(|classification| {
            let report = self.traverse(&classification.image, extruder, width_mm, params)?;
            Ok(ExtruderInspection {
                classification,
                report,
            })
        });

        match inspected {
            Ok(inspection) => {
                let report = &inspection.report;
                if report.passed {
                    log::info!(
                        "extruder {extruder}: passed ({} sample points)",
                        report.samples_checked
                    );
                } else {
                    log::info!(
                        "extruder {extruder}: {} defects in {} sample points",
                        report.defects.len(),
                        report.samples_checked
                    );
                }
                ExtruderOutcome::Inspected(inspection)
            }
            Err(err) => {
                if err.is_insufficient_data() {
                    log::warn!("extruder {extruder}: {err}");
                } else {
                    log::error!("extruder {extruder}: {err}");
                }
                ExtruderOutcome::Failed(err)
            }
        }
    }

    /// Inspect every extruder of the layer.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, params), fields(extruders = self.layer.extruder_count()))
    )]
    pub fn inspect_layer(&self, width_mm: f64, params: &InspectParams) -> LayerReport {
        let count = self.layer.extruder_count();

        #[cfg(feature = "parallel")]
        let outcomes = (0..count)
            .into_par_iter()
            .map(|k| self.inspect_extruder(k, width_mm, params))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let outcomes = (0..count)
            .map(|k| self.inspect_extruder(k, width_mm, params))
            .collect();

        let report = LayerReport { outcomes };
        log::info!(
            "layer {}: {} defects over {count} extruders",
            if report.passed() { "passed" } else { "failed" },
            report.defect_count()
        );
        report
    }
}
