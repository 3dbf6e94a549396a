#![allow(dead_code)]

use layer_inspect::core::{Bgr, ColorImage, ExtruderPath, LayerBounds, LayerToolpath};
use layer_inspect::Calibration;
use nalgebra::Point2;

/// Extruder 0 material, band core and band edge.
pub const A_FAR: Bgr = [250, 60, 10];
pub const A_NEAR: Bgr = [130, 60, 110];
/// Extruder 1 material.
pub const B_FAR: Bgr = [10, 60, 250];
pub const B_NEAR: Bgr = [110, 60, 130];

pub const HIGHLIGHT: Bgr = [0, 0, 255];
pub const WIDTH_MM: f64 = 0.4;
pub const IMAGE_W: usize = 300;
pub const IMAGE_H: usize = 200;

/// Two segments along `y = y_mm`, from x = 2 mm to x = 18 mm.
pub fn straight_path(y_mm: f64) -> ExtruderPath {
    ExtruderPath::polyline(&[
        Point2::new(2.0, y_mm),
        Point2::new(10.0, y_mm),
        Point2::new(18.0, y_mm),
    ])
}

/// Extruder 0 at y = 3 mm (row 120), extruder 1 at y = 7 mm (row 80).
pub fn two_material_layer() -> LayerToolpath {
    LayerToolpath::new(vec![straight_path(3.0), straight_path(7.0)])
}

/// 10 px/mm over a 20 x 10 mm layer centred in a 300 x 200 photo.
pub fn calibration() -> Calibration {
    let bounds = LayerBounds::new(0.0, 0.0, 20.0, 10.0).expect("bounds");
    Calibration::uniform(10.0).with_bounds(bounds)
}

/// Black photo with one five-row material band per extruder.
///
/// The outer mask rows carry the "near" shade so the classifier margin sits
/// there; the three core rows are well beyond it.
pub fn two_material_photo() -> ColorImage {
    let mut img = ColorImage::new(IMAGE_W, IMAGE_H);
    paint_band(&mut img, 120, A_FAR, A_NEAR);
    paint_band(&mut img, 80, B_FAR, B_NEAR);
    img
}

pub fn paint_band(img: &mut ColorImage, row: usize, core: Bgr, edge: Bgr) {
    img.fill_rect(60, row - 2, 240, row + 3, edge);
    img.fill_rect(60, row - 1, 240, row + 2, core);
}

/// Paint the x range `[x0_mm, x1_mm)` of extruder 0's band black.
pub fn blank_columns(img: &mut ColorImage, x0_mm: f64, x1_mm: f64) {
    let c0 = (x0_mm * 10.0 + 50.0) as usize;
    let c1 = (x1_mm * 10.0 + 50.0) as usize;
    img.fill_rect(c0, 110, c1, 131, [0, 0, 0]);
}
