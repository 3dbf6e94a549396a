//! JSON configuration, toolpath and report helpers.

use std::{
    fs,
    path::{Path, PathBuf},
};

use layer_inspect_core::LayerToolpath;
use serde::{Deserialize, Serialize};

use crate::analyzer::{Calibration, LayerReport, LayerSummary};
use crate::params::InspectParams;

#[derive(thiserror::Error, Debug)]
pub enum InspectIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "image")]
    #[error(transparent)]
    Image(#[from] ::image::ImageError),
}

/// Configuration for one layer inspection run.
///
/// Relative `image_path`, `toolpath_path` and `output_dir` are resolved
/// against the directory of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectConfig {
    pub image_path: String,
    pub toolpath_path: String,
    pub calibration: Calibration,
    pub extrusion_width_mm: f64,
    #[serde(default)]
    pub params: InspectParams,
    #[serde(default)]
    pub output_dir: Option<String>,
}

impl InspectConfig {
    /// Load a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, InspectIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), InspectIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn image_path(&self, base: &Path) -> PathBuf {
        resolve(base, &self.image_path)
    }

    pub fn toolpath_path(&self, base: &Path) -> PathBuf {
        resolve(base, &self.toolpath_path)
    }

    /// Output directory, `layer_inspect_out` next to the config by default.
    pub fn output_dir(&self, base: &Path) -> PathBuf {
        resolve(base, self.output_dir.as_deref().unwrap_or("layer_inspect_out"))
    }
}

fn resolve(base: &Path, raw: &str) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

/// Load per-extruder toolpath segments from JSON.
///
/// Format: `{ "extruders": [ [ {"a": [x, y], "b": [x, y]}, ... ], ... ] }`.
pub fn load_toolpath(path: impl AsRef<Path>) -> Result<LayerToolpath, InspectIoError> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub fn write_toolpath(layer: &LayerToolpath, path: impl AsRef<Path>) -> Result<(), InspectIoError> {
    let json = serde_json::to_string_pretty(layer)?;
    fs::write(path, json)?;
    Ok(())
}

/// Output image files written for one extruder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtruderImages {
    pub extruder: usize,
    pub classified: String,
    pub defects: String,
}

/// JSON report of one inspection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InspectReport {
    pub config_path: String,
    pub image_path: String,
    pub extrusion_width_mm: f64,
    pub layer: LayerSummary,
    #[serde(default)]
    pub images: Vec<ExtruderImages>,
}

impl InspectReport {
    pub fn new(config: &InspectConfig, config_path: &Path, report: &LayerReport) -> Self {
        Self {
            config_path: config_path.to_string_lossy().into_owned(),
            image_path: config.image_path.clone(),
            extrusion_width_mm: config.extrusion_width_mm,
            layer: report.summary(),
            images: Vec::new(),
        }
    }

    /// Load a report from JSON on disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, InspectIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Write this report to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), InspectIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_fills_default_params() {
        let json = r#"{
            "image_path": "layer.png",
            "toolpath_path": "layer.json",
            "calibration": { "px_per_mm_x": 10.0, "px_per_mm_y": 12.0 },
            "extrusion_width_mm": 0.4
        }"#;
        let cfg: InspectConfig = serde_json::from_str(json).expect("config");
        assert_eq!(cfg.params, InspectParams::default());
        assert_eq!(cfg.calibration.bounds, None);
        assert_eq!(cfg.calibration.px_per_mm_y, 12.0);
        let base = Path::new("/data/run");
        assert_eq!(cfg.image_path(base), PathBuf::from("/data/run/layer.png"));
        assert_eq!(cfg.output_dir(base), PathBuf::from("/data/run/layer_inspect_out"));
    }

    #[test]
    fn absolute_paths_are_kept() {
        assert_eq!(resolve(Path::new("/a"), "/b/c.png"), PathBuf::from("/b/c.png"));
    }

    #[test]
    fn toolpath_json_shape() {
        let json = r#"{ "extruders": [
            [ {"a": [0.0, 1.0], "b": [2.0, 1.0]}, {"a": [2.0, 1.0], "b": [2.0, 3.0]} ],
            []
        ] }"#;
        let layer: LayerToolpath = serde_json::from_str(json).expect("toolpath");
        assert_eq!(layer.extruder_count(), 2);
        assert_eq!(layer.extruders[0].len(), 2);
        assert!(layer.extruders[1].is_empty());
        assert_eq!(layer.extruders[0].segments()[1].b.y, 3.0);
    }
}
