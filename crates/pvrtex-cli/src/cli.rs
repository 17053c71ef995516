use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    Argb1555,
    Rgb565,
    Argb4444,
    Yuv422,
    Bumpmap,
    Pal4Bpp,
    Pal8Bpp,
}

/// pvrtex: PowerVR tile texture encoder
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Source image path(s); repeat for a base level plus explicit mip levels
    #[arg(long = "in", required = true)]
    pub input: Vec<PathBuf>,
    /// Output texture path
    #[arg(long = "out")]
    pub output: PathBuf,
    /// Target pixel format
    #[arg(long, value_enum)]
    pub format: FormatArg,
    /// Generate a full mipmap chain from the base image
    #[arg(long, default_value_t = false)]
    pub mipmap: bool,
    /// Vector-quantize the payload instead of writing it raw
    #[arg(long, default_value_t = false)]
    pub compress: bool,
    /// Force a specific row stride instead of the image's natural width
    #[arg(long)]
    pub stride: Option<u32>,
    /// Use nearest-neighbor resampling for mipmap generation
    #[arg(long, conflicts_with = "bilinear", default_value_t = false)]
    pub nearest: bool,
    /// Use bilinear resampling for mipmap generation (default)
    #[arg(long, conflicts_with = "nearest", default_value_t = false)]
    pub bilinear: bool,
    /// Write a human-inspection preview PNG alongside the texture
    #[arg(long)]
    pub preview: Option<PathBuf>,
    /// Write a codebook-usage colormap PNG alongside the texture
    #[arg(long)]
    pub vqcodeusage: Option<PathBuf>,
    /// Write a plain-text VQ codebook usage report
    #[arg(long)]
    pub vqreport: Option<PathBuf>,
    /// Enable debug-level diagnostics
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}
