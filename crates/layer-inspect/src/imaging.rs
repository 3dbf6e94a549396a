//! Adapters between `image::RgbImage` and the BGR [`ColorImage`].

use std::path::Path;

use ::image::{Rgb, RgbImage};
use layer_inspect_core::ColorImage;

use crate::io::InspectIoError;

/// Convert an `image::RgbImage` into a BGR [`ColorImage`].
pub fn color_image_from_rgb(img: &RgbImage) -> ColorImage {
    let data = img.pixels().map(|Rgb([r, g, b])| [*b, *g, *r]).collect();
    ColorImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data,
    }
}

/// Convert a BGR [`ColorImage`] into an `image::RgbImage`.
pub fn color_image_to_rgb(img: &ColorImage) -> RgbImage {
    RgbImage::from_fn(img.width as u32, img.height as u32, |x, y| {
        let [b, g, r] = img.pixel(x as usize, y as usize);
        Rgb([r, g, b])
    })
}

/// Open any format `image` can decode and convert it to BGR.
pub fn load_color_image(path: impl AsRef<Path>) -> Result<ColorImage, InspectIoError> {
    let img = ::image::open(path)?.to_rgb8();
    Ok(color_image_from_rgb(&img))
}

/// Save a BGR image; the format follows the file extension.
pub fn save_color_image(img: &ColorImage, path: impl AsRef<Path>) -> Result<(), InspectIoError> {
    color_image_to_rgb(img).save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_are_swapped() {
        let mut rgb = RgbImage::new(2, 1);
        rgb.put_pixel(1, 0, Rgb([200, 100, 10]));
        let bgr = color_image_from_rgb(&rgb);
        assert_eq!(bgr.pixel(1, 0), [10, 100, 200]);
        assert_eq!(color_image_to_rgb(&bgr), rgb);
    }

    #[test]
    fn png_survives_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("img.png");
        let img = ColorImage::from_raw(2, 2, vec![[1, 2, 3], [4, 5, 6], [7, 8, 9], [0, 0, 255]])
            .expect("image");
        save_color_image(&img, &path).expect("save");
        assert_eq!(load_color_image(&path).expect("load"), img);
    }
}
