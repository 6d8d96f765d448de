use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use lumen_core::load_scene;
use lumen_renderer::{render, PartitionTree, RenderConfig, SplitPolicy};
use serde::Deserialize;

mod cli;

use cli::Args;

/// Settings file passed with `--config`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Preset {
    render: RenderConfig,
    split: SplitPolicy,
}

fn load_preset(path: &Path) -> Result<Preset> {
    let text = fs::read_to_string(path).with_context(|| format!("Failed to read config {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(args.log_level.into())
        .init();

    let preset = match &args.config {
        Some(path) => load_preset(path)?,
        None => Preset::default(),
    };
    let config = args.apply(preset.render);

    let mut scene =
        load_scene(&args.scene).with_context(|| format!("Failed to load scene {}", args.scene.display()))?;
    if let Some(output) = &args.output {
        scene.set_output(output.clone());
    }

    let tree = PartitionTree::from_scene(&scene, preset.split);
    let output = render(&scene, &tree, &config).context("Render failed")?;

    let path = &scene.settings().output;
    output
        .image
        .save(path)
        .with_context(|| format!("Failed to write image {}", path.display()))?;

    let report = &output.report;
    log::info!(
        "Wrote {} ({}x{}, {} shapes, {} lights, max depth {}, {:.2?})",
        path.display(),
        report.width,
        report.height,
        report.shapes,
        report.lights,
        report.max_trace_depth,
        report.elapsed
    );

    Ok(())
}
