//! Extrusion masks: where the toolpath says an extruder deposited material.

use layer_inspect_core::{CoordinateMapper, ExtruderPath, Mask};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Rasterise every segment of `path` as a round-capped line of the scaled
/// extrusion width.
///
/// Paths with fewer than two segments yield an all-zero mask.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(mapper, path), fields(segments = path.len()))
)]
pub fn build_mask(mapper: &CoordinateMapper, path: &ExtruderPath, extrusion_width_mm: f64) -> Mask {
    let (width, height) = mapper.image_size();
    let mut mask = Mask::new(width, height);
    if !path.is_verifiable() {
        return mask;
    }

    let thickness = mapper.scaled_width(extrusion_width_mm);
    for seg in path.segments() {
        mask.draw_thick_line(mapper.translate(seg.a), mapper.translate(seg.b), thickness);
    }
    mask
}
