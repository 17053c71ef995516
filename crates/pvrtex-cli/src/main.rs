mod cli;

use std::fs::File;
use std::io::BufWriter;

use clap::Parser;
use cli::{Config, FormatArg};
use easyerr::{Error, ResultExt};
use pvrimage::{Filter, ImageContainer};
use pvrtex::{EncodeOptions, PixelFormat};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Image { source: pvrimage::ImageError },
    #[error(transparent)]
    Pvrtex { source: pvrtex::PvrtexError },
    #[error(transparent)]
    Io { source: std::io::Error },
}

fn main() {
    let config = Config::parse();
    install_tracing(config.verbose);

    if let Err(err) = run(&config) {
        tracing::error!(%err, "pvrtex failed");
        std::process::exit(1);
    }
}

fn install_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn run(config: &Config) -> Result<(), CliError> {
    let filter = if config.nearest { Filter::Nearest } else { Filter::Bilinear };
    let format = to_pixel_format(config.format);

    let base_path = config.input.first().expect("clap requires at least one --in");
    let mut container = ImageContainer::load(base_path).context(CliErrorCtx::Image)?;

    if config.mipmap {
        container = container.with_mipmaps(filter).context(CliErrorCtx::Image)?;
    }

    let options = EncodeOptions {
        format,
        mipmaps: config.mipmap,
        compress: config.compress,
        filter,
        stride: config.stride,
    };

    let out_file = File::create(&config.output).context(CliErrorCtx::Io)?;
    let output = pvrtex::encode(BufWriter::new(out_file), &container, options).context(CliErrorCtx::Pvrtex)?;

    if let Some(palette) = output.palette {
        let pal_path = config.output.with_extension("pal");
        let pal_file = File::create(&pal_path).context(CliErrorCtx::Io)?;
        palette.save(pal_file).context(CliErrorCtx::Image)?;
    }

    if let Some(preview_path) = &config.preview {
        let preview = pvrtex::preview::render_mipmap_chain(container.levels());
        save_png(&preview, preview_path)?;
    }

    match &output.code_usage {
        Some(usage) if config.vqcodeusage.is_some() || config.vqreport.is_some() => {
            if let Some(path) = &config.vqcodeusage {
                let image =
                    pvrtex::preview::render_code_usage(usage.block_width, usage.block_height, &usage.indices);
                save_png(&image, path)?;
            }
            if let Some(path) = &config.vqreport {
                let report_file = File::create(path).context(CliErrorCtx::Io)?;
                pvrtex::write_code_usage_report(&usage.usage, report_file).context(CliErrorCtx::Io)?;
            }
        }
        None if config.vqcodeusage.is_some() || config.vqreport.is_some() => {
            tracing::warn!(
                "--vqcodeusage/--vqreport require a non-mipmapped VQ-compressed or paletted encode; skipping"
            );
        }
        _ => {}
    }

    tracing::info!(output = %config.output.display(), "wrote texture");
    Ok(())
}

fn save_png(img: &pvrimage::Image, path: &std::path::Path) -> Result<(), CliError> {
    let mut buf = image::RgbaImage::new(img.width(), img.height());
    for y in 0..img.height() {
        for x in 0..img.width() {
            let p = img.get_pixel(x, y);
            buf.put_pixel(x, y, image::Rgba([p.r, p.g, p.b, p.a]));
        }
    }
    buf.save(path).map_err(|source| CliError::Image { source: pvrimage_decode_error(source) })
}

fn pvrimage_decode_error(source: image::ImageError) -> pvrimage::ImageError {
    pvrimage::ImageError::Decode { source }
}

fn to_pixel_format(format: FormatArg) -> PixelFormat {
    match format {
        FormatArg::Argb1555 => PixelFormat::Argb1555,
        FormatArg::Rgb565 => PixelFormat::Rgb565,
        FormatArg::Argb4444 => PixelFormat::Argb4444,
        FormatArg::Yuv422 => PixelFormat::Yuv422,
        FormatArg::Bumpmap => PixelFormat::Bumpmap,
        FormatArg::Pal4Bpp => PixelFormat::Pal4Bpp,
        FormatArg::Pal8Bpp => PixelFormat::Pal8Bpp,
    }
}
