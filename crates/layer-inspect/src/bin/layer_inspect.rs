use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use layer_inspect::{
    load_color_image, load_toolpath, save_color_image, ExtruderImages, ExtruderOutcome,
    InspectConfig, InspectReport, LayerAnalyzer,
};
use layer_inspect_core::validate_extrusion_width;

#[cfg(not(feature = "tracing"))]
use log::{info, LevelFilter};

#[cfg(feature = "tracing")]
use tracing::info;

/// Check a photographed print layer against its toolpath, extruder by extruder.
#[derive(Debug, Parser)]
#[command(name = "layer-inspect", version)]
struct Cli {
    /// Inspection config (JSON).
    #[arg(long)]
    config: PathBuf,
    /// Output directory; overrides `output_dir` from the config.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// off, error, warn, info, debug or trace.
    #[arg(long, default_value = "info")]
    log_level: String,
    /// Also print the JSON report to stdout.
    #[arg(long)]
    json_report: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_logging(&cli.log_level) {
        eprintln!("layer-inspect: {err}");
        return ExitCode::FAILURE;
    }
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("layer-inspect: {err}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(not(feature = "tracing"))]
fn init_logging(level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let level: LevelFilter = level.parse()?;
    layer_inspect_core::init_with_level(level)?;
    Ok(())
}

/// `RUST_LOG` drives the filter here; `--log-level` only applies to the plain logger.
#[cfg(feature = "tracing")]
fn init_logging(_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_log::LogTracer::init();
    layer_inspect_core::init_tracing(false);
    Ok(())
}

#[cfg_attr(feature = "tracing", tracing::instrument(level = "info", skip_all))]
fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = InspectConfig::load_json(&cli.config)?;
    validate_extrusion_width(cfg.extrusion_width_mm)?;
    let base = cli
        .config
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let image = load_color_image(cfg.image_path(&base))?;
    let layer = load_toolpath(cfg.toolpath_path(&base))?;
    info!(
        "loaded {}x{} photo, {} extruders",
        image.width,
        image.height,
        layer.extruder_count()
    );

    let analyzer = LayerAnalyzer::new(layer, image, &cfg.calibration)?;
    let report = analyzer.inspect_layer(cfg.extrusion_width_mm, &cfg.params);

    let out_dir = cli
        .out_dir
        .clone()
        .unwrap_or_else(|| cfg.output_dir(&base));
    fs::create_dir_all(&out_dir)?;

    let mut json = InspectReport::new(&cfg, &cli.config, &report);
    for (k, outcome) in report.outcomes.iter().enumerate() {
        if let ExtruderOutcome::Inspected(inspection) = outcome {
            let classified = out_dir.join(format!("extruder_{k}_classified.png"));
            let defects = out_dir.join(format!("extruder_{k}_defects.png"));
            save_color_image(&inspection.classification.image, &classified)?;
            save_color_image(&inspection.report.image, &defects)?;
            json.images.push(ExtruderImages {
                extruder: k,
                classified: classified.to_string_lossy().into_owned(),
                defects: defects.to_string_lossy().into_owned(),
            });
        }
    }

    let report_path = out_dir.join("report.json");
    json.write_json(&report_path)?;
    if cli.json_report {
        println!("{}", serde_json::to_string_pretty(&json)?);
    }
    info!(
        "layer {}; wrote {}",
        if json.layer.passed { "passed" } else { "failed" },
        report_path.display()
    );
    Ok(())
}
