//! Core types for inspecting a photographed print layer against its toolpath.
//!
//! This crate is purely geometric: millimetre toolpath segments, the
//! calibration that maps them onto a photograph, and the small pixel buffers
//! (colour image, binary mask) the inspection pipeline works on. It does
//! *not* know anything about material classification.
//!
//! ## Coordinate conventions
//! - Toolpath space: millimetres, origin bottom-left, `y` grows upward.
//! - Pixel space: `(col, row)`, origin top-left, `row` grows downward.
//!
//! [`CoordinateMapper`] is the only place where the vertical flip happens.

mod color;
mod coords;
mod error;
mod geometry;
mod image;
mod logger;
mod raster;

pub use color::{bgr_to_hsv, ColorSpace};
pub use coords::{validate_extrusion_width, CoordinateMapper, PixelDensity};
pub use error::ConfigError;
pub use geometry::{ExtruderPath, LayerBounds, LayerToolpath, Segment, MIN_VERIFIABLE_SEGMENTS};
pub use image::{Bgr, ColorImage, Mask, MASK_SET};
pub use raster::{for_each_capsule_pixel, for_each_disk_pixel};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{current_extruder, extruder_scope, init_with_level, ExtruderScope};
