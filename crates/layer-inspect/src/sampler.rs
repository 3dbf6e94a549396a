//! Colour samples under a mask.

use layer_inspect_core::{ColorImage, ColorSpace, Mask};

/// One colour vector in the classifier's colour space.
pub type ColorSample = [u8; 3];

/// Collect the colours of all masked pixels, row-major.
///
/// The image is converted to `color_space` first; pixels outside the mask and
/// pixels whose converted value is all-zero are skipped (pure black material
/// is therefore indistinguishable from "masked out"). `limit == 0` keeps every
/// match, otherwise the first `limit` matches are returned.
pub fn sample_pixels(
    image: &ColorImage,
    mask: &Mask,
    color_space: ColorSpace,
    limit: usize,
) -> Vec<ColorSample> {
    debug_assert_eq!((image.width, image.height), (mask.width, mask.height));
    let limit = if limit == 0 { usize::MAX } else { limit };
    image
        .data
        .iter()
        .zip(mask.data.iter())
        .filter(|&(_, &m)| m != 0)
        .map(|(&px, _)| color_space.convert(px))
        .filter(|px| *px != [0, 0, 0])
        .take(limit)
        .collect()
}
