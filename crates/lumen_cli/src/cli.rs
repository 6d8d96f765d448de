use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use lumen_renderer::{DebugMode, RenderConfig};

/// Log levels accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Diagnostic images that replace normal shading
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DebugArg {
    DiffuseIntensity,
    SpecularIntensity,
    Normal,
    Shadow,
    PrimaryIntersection,
}

impl From<DebugArg> for DebugMode {
    fn from(arg: DebugArg) -> Self {
        match arg {
            DebugArg::DiffuseIntensity => DebugMode::DiffuseIntensity,
            DebugArg::SpecularIntensity => DebugMode::SpecularIntensity,
            DebugArg::Normal => DebugMode::Normal,
            DebugArg::Shadow => DebugMode::Shadow,
            DebugArg::PrimaryIntersection => DebugMode::PrimaryIntersection,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "lumen")]
#[command(about = "Whitted-style ray tracer for text scene files")]
pub struct Args {
    /// Scene description file
    pub scene: PathBuf,

    /// Output image, overriding the scene's `output` command
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON preset with render and split settings; flags are applied on top
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Disable the diffuse lighting term")]
    pub no_diffuse: bool,

    #[arg(long, help = "Disable the specular lighting term")]
    pub no_specular: bool,

    #[arg(long, help = "Disable shadow rays")]
    pub no_shadows: bool,

    #[arg(long, help = "Disable mirror reflections")]
    pub no_reflections: bool,

    /// Render a diagnostic image instead of the shaded one
    #[arg(long, value_enum)]
    pub debug: Option<DebugArg>,

    /// Jitter camera rays inside each pixel
    #[arg(long)]
    pub jitter: bool,

    /// Jitter seed (implies --jitter)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Only render the first N rows
    #[arg(long)]
    pub scanlines: Option<u32>,

    /// Worker threads (defaults to one per core)
    #[arg(long)]
    pub threads: Option<usize>,

    /// Bucket edge length in pixels
    #[arg(long)]
    pub bucket_size: Option<u32>,

    /// Test every shape for every ray instead of walking the partition tree
    #[arg(long)]
    pub no_partition: bool,

    /// Set the logging level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Apply command line overrides to a render configuration.
    pub fn apply(&self, mut config: RenderConfig) -> RenderConfig {
        let shading = &mut config.shading;
        if self.no_diffuse {
            shading.diffuse_lighting = false;
        }
        if self.no_specular {
            shading.specular_lighting = false;
        }
        if self.no_shadows {
            shading.shadows = false;
        }
        if self.no_reflections {
            shading.reflections = false;
        }
        if let Some(debug) = self.debug {
            shading.debug = Some(debug.into());
        }

        if self.jitter {
            config.jitter = true;
        }
        if let Some(seed) = self.seed {
            config = config.with_jitter(seed);
        }
        if let Some(rows) = self.scanlines {
            config = config.with_scanline_limit(rows);
        }
        if let Some(threads) = self.threads {
            config.threads = Some(threads);
        }
        if let Some(size) = self.bucket_size {
            config.bucket_size = size;
        }
        if self.no_partition {
            config.use_partition = false;
        }
        config
    }
}
