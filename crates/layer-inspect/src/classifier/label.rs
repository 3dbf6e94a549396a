//! Full-image labelling with a fitted linear model.

use layer_inspect_core::{Bgr, ColorImage, ColorSpace};

use super::svm::LinearModel;
use crate::sampler::ColorSample;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Paint `highlight` over every pixel whose decision value is strictly below
/// `threshold`; all other pixels keep their original colour.
///
/// The model sees pixels in `color_space`, the output is always built from the
/// untouched BGR `image`. Rows are classified as one batch each.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(image, model), fields(width = image.width, height = image.height))
)]
pub fn mark_material(
    image: &ColorImage,
    model: &LinearModel,
    color_space: ColorSpace,
    threshold: f64,
    highlight: Bgr,
) -> ColorImage {
    let mut out = image.clone();
    if image.width == 0 {
        return out;
    }

    let mark_row = |row: &mut [Bgr]| {
        let converted: Vec<ColorSample> = row.iter().map(|&px| color_space.convert(px)).collect();
        let scores = model.decision_batch(&converted);
        for (px, &score) in row.iter_mut().zip(scores.iter()) {
            if score < threshold {
                *px = highlight;
            }
        }
    };

    #[cfg(feature = "parallel")]
    out.data.par_chunks_mut(image.width).for_each(mark_row);
    #[cfg(not(feature = "parallel"))]
    out.data.chunks_mut(image.width).for_each(mark_row);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Bgr = [0, 0, 255];

    #[test]
    fn only_confident_pixels_are_marked() {
        // decision = 0.5 * blue - 4: blue 0 -> -4, 3 -> -2.5, 4 -> -2, 6 -> -1, 10 -> +1
        let model = LinearModel {
            weights: [0.5, 0.0, 0.0],
            bias: -4.0,
        };
        let img = ColorImage::from_raw(
            5,
            1,
            vec![[0, 10, 10], [3, 10, 10], [4, 10, 10], [6, 10, 10], [10, 10, 10]],
        )
        .expect("image");
        let out = mark_material(&img, &model, ColorSpace::Bgr, -2.0, RED);
        assert_eq!(out.pixel(0, 0), RED);
        assert_eq!(out.pixel(1, 0), RED);
        assert_eq!(out.pixel(2, 0), [4, 10, 10], "exactly -2 stays unmarked");
        assert_eq!(out.pixel(3, 0), [6, 10, 10], "(-2, 0) stays unmarked");
        assert_eq!(out.pixel(4, 0), [10, 10, 10]);
    }

    #[test]
    fn hsv_model_marks_original_pixels() {
        // value channel drives the decision: bright pixels are target material
        let model = LinearModel {
            weights: [0.0, 0.0, -0.1],
            bias: 10.0,
        };
        let img = ColorImage::from_raw(2, 1, vec![[0, 0, 250], [0, 0, 40]]).expect("image");
        let out = mark_material(&img, &model, ColorSpace::Hsv, -2.0, [255, 0, 0]);
        assert_eq!(out.pixel(0, 0), [255, 0, 0]);
        assert_eq!(out.pixel(1, 0), [0, 0, 40]);
    }
}
