use nalgebra::Point2;

use crate::raster::{for_each_capsule_pixel, for_each_disk_pixel};
use crate::ColorSpace;

/// One pixel in blue, green, red byte order.
pub type Bgr = [u8; 3];

/// Mask value for "material present".
pub const MASK_SET: u8 = 255;

/// Row-major 3-channel image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColorImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<Bgr>, // len = w*h
}

impl ColorImage {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, [0, 0, 0])
    }

    pub fn filled(width: usize, height: usize, color: Bgr) -> Self {
        Self {
            width,
            height,
            data: vec![color; width * height],
        }
    }

    pub fn from_raw(width: usize, height: usize, data: Vec<Bgr>) -> Option<Self> {
        (data.len() == width.checked_mul(height)?).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Build from interleaved `b, g, r` bytes.
    pub fn from_bgr_bytes(width: usize, height: usize, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != width.checked_mul(height)?.checked_mul(3)? {
            return None;
        }
        let data = bytes.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        Some(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Option<Bgr> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(self.data[y as usize * self.width + x as usize])
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Bgr {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, color: Bgr) {
        let w = self.width;
        self.data[y * w + x] = color;
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[Bgr] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// Fill the rectangle `[x0, x1) × [y0, y1)`, clipped to the image.
    pub fn fill_rect(&mut self, x0: usize, y0: usize, x1: usize, y1: usize, color: Bgr) {
        let x1 = x1.min(self.width);
        let y1 = y1.min(self.height);
        for y in y0..y1 {
            for x in x0..x1 {
                self.set(x, y, color);
            }
        }
    }

    /// Filled disk, clipped to the image.
    pub fn fill_disk(&mut self, center: Point2<i32>, radius: i32, color: Bgr) {
        let (w, h) = (self.width, self.height);
        for_each_disk_pixel(w, h, center, radius, |x, y| self.data[y * w + x] = color);
    }

    /// Copy with every pixel converted to `space`.
    pub fn to_color_space(&self, space: ColorSpace) -> ColorImage {
        match space {
            ColorSpace::Bgr => self.clone(),
            _ => ColorImage {
                width: self.width,
                height: self.height,
                data: self.data.iter().map(|&px| space.convert(px)).collect(),
            },
        }
    }

    pub fn count_color(&self, color: Bgr) -> usize {
        self.data.iter().filter(|&&px| px == color).count()
    }
}

/// Single-channel binary occupancy grid, `0` or [`MASK_SET`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mask {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl Mask {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    #[inline]
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        self.data[y * self.width + x] != 0
    }

    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }

    pub fn is_clear(&self) -> bool {
        self.data.iter().all(|&v| v == 0)
    }

    /// Draw a round-capped line of `thickness` pixels between two pixel points.
    ///
    /// Thickness below one pixel still draws a single-pixel line.
    pub fn draw_thick_line(&mut self, a: Point2<i32>, b: Point2<i32>, thickness: i32) {
        let radius = thickness.max(1) as f64 / 2.0;
        let (w, h) = (self.width, self.height);
        let data = &mut self.data;
        for_each_capsule_pixel(
            w,
            h,
            Point2::new(a.x as f64, a.y as f64),
            Point2::new(b.x as f64, b.y as f64),
            radius,
            |x, y| data[y * w + x] = MASK_SET,
        );
    }
}
