use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, LayerBounds};

/// Photograph resolution in pixels per millimetre, per axis.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PixelDensity {
    pub x: f64,
    pub y: f64,
}

impl PixelDensity {
    pub fn new(x: f64, y: f64) -> Result<Self, ConfigError> {
        let density = Self { x, y };
        density.validate()?;
        Ok(density)
    }

    pub fn uniform(px_per_mm: f64) -> Result<Self, ConfigError> {
        Self::new(px_per_mm, px_per_mm)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.x.is_finite() && self.y.is_finite() && self.x > 0.0 && self.y > 0.0) {
            return Err(ConfigError::InvalidDensity {
                x: self.x,
                y: self.y,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn mean(&self) -> f64 {
        0.5 * (self.x + self.y)
    }

    /// Extrusion width in pixels: `round(width_mm * mean density)`.
    ///
    /// The same scalar drives mask line thickness and the traversal kernel.
    #[inline]
    pub fn scaled_width(&self, width_mm: f64) -> i32 {
        (width_mm * self.mean()).round() as i32
    }
}

/// Reject non-finite or non-positive extrusion widths.
pub fn validate_extrusion_width(width_mm: f64) -> Result<f64, ConfigError> {
    if width_mm.is_finite() && width_mm > 0.0 {
        Ok(width_mm)
    } else {
        Err(ConfigError::InvalidExtrusionWidth(width_mm))
    }
}

/// Millimetre to pixel mapping for one photograph of one layer.
///
/// The offset is fixed at construction so that the centre of the layer
/// bounding box lands on the centre of the image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordinateMapper {
    density: PixelDensity,
    offset: Vector2<f64>,
    image_width: usize,
    image_height: usize,
}

impl CoordinateMapper {
    pub fn new(
        density: PixelDensity,
        bounds: &LayerBounds,
        image_width: usize,
        image_height: usize,
    ) -> Result<Self, ConfigError> {
        density.validate()?;
        bounds.validate()?;
        if image_width == 0 || image_height == 0 {
            return Err(ConfigError::EmptyImage {
                width: image_width,
                height: image_height,
            });
        }

        let offset_x = bounds.min_x * density.x
            - (image_width as f64 - bounds.range_x() * density.x) / 2.0;
        let offset_y = bounds.min_y * density.y
            - (image_height as f64 - bounds.range_y() * density.y) / 2.0;

        Ok(Self {
            density,
            offset: Vector2::new(offset_x, offset_y),
            image_width,
            image_height,
        })
    }

    #[inline]
    pub fn density(&self) -> PixelDensity {
        self.density
    }

    /// Pixel offset subtracted after scaling (`offset_x`, `offset_y`).
    #[inline]
    pub fn offset(&self) -> Vector2<f64> {
        self.offset
    }

    #[inline]
    pub fn image_size(&self) -> (usize, usize) {
        (self.image_width, self.image_height)
    }

    #[inline]
    pub fn scaled_width(&self, width_mm: f64) -> i32 {
        self.density.scaled_width(width_mm)
    }

    /// Map a millimetre point to `(col, row)`; the row axis is flipped.
    ///
    /// Points outside the photograph map to out-of-range pixels, callers clip.
    #[inline]
    pub fn translate(&self, p: Point2<f64>) -> Point2<i32> {
        let col = (p.x * self.density.x - self.offset.x).round();
        let row = self.image_height as f64 - (p.y * self.density.y - self.offset.y).round();
        Point2::new(col as i32, row as i32)
    }

    #[inline]
    pub fn translate_xy(&self, x_mm: f64, y_mm: f64) -> Point2<i32> {
        self.translate(Point2::new(x_mm, y_mm))
    }

    /// Inverse of [`translate`](Self::translate), exact up to pixel rounding.
    pub fn to_mm(&self, px: Point2<i32>) -> Point2<f64> {
        let x = (px.x as f64 + self.offset.x) / self.density.x;
        let y = (self.image_height as f64 - px.y as f64 + self.offset.y) / self.density.y;
        Point2::new(x, y)
    }
}
