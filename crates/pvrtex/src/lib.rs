//! PowerVR-style tile texture encoder/decoder: pixel codecs, the Morton
//! twiddler, lossless block dedup, vector-quantized 16bpp and paletted
//! writers, the binary container framer, and a preview decoder.

pub mod codebook16;
pub mod dedup;
mod error;
pub mod format;
pub mod framer;
pub mod palette_writer;
pub mod pixel;
pub mod preview;
pub mod size;

pub use error::PvrtexError;
pub use format::{PixelFormat, TextureType};

use std::io::{Seek, Write};

use bitos::integer::u5;
use color::Rgba8;
use pvrimage::{Filter, ImageContainer};
use pvrtwiddle::twiddle;
use pvrvq::CodeUsage;

use codebook16::Block2x2;
use pixel::Yuv422Encoder;

/// The largest stride the 5-bit `stride_value` header field can encode
/// (`31 * 32`).
const MAX_STRIDE: u32 = 31 * 32;

/// Options controlling how an image is written out as a texture.
#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    pub format: PixelFormat,
    pub mipmaps: bool,
    pub compress: bool,
    pub filter: Filter,
    /// Writes a raster (non-twiddled) texture at this row stride instead of
    /// the twiddled layout. Mutually exclusive with mipmaps, compression,
    /// and paletted formats.
    pub stride: Option<u32>,
}

/// Per-codeword usage stats for a texture's second-stage block codebook,
/// for `--vqcodeusage`/`--vqreport`-style tooling. Only populated for
/// non-mipmapped, codebook-backed encodings (16bpp VQ or paletted).
#[derive(Debug, Clone, Default)]
pub struct CodeUsageInfo {
    pub block_width: u32,
    pub block_height: u32,
    pub indices: Vec<u8>,
    pub usage: Vec<CodeUsage>,
}

/// Everything [`encode`] produces besides the framed texture bytes it
/// writes to its `out` argument.
#[derive(Debug, Clone, Default)]
pub struct EncodeOutput {
    pub palette: Option<pvrimage::Palette>,
    pub code_usage: Option<CodeUsageInfo>,
}

/// Encodes an [`ImageContainer`] (a base image plus, optionally, its
/// mipmap chain) into a framed texture plus whatever sidecar data the
/// chosen options produce.
pub fn encode<W: Write + Seek>(
    out: W,
    container: &ImageContainer,
    options: EncodeOptions,
) -> Result<EncodeOutput, PvrtexError> {
    let base = container.base();
    let (width, height) = (base.width(), base.height());

    validate_dimensions(width, height, &options)?;

    let mut output = EncodeOutput::default();
    let payload = if let Some(stride) = options.stride {
        build_strided_raw_payload(container, options.format, stride)
    } else if options.format.is_paletted() {
        let (tex, usage) = palette_writer::build_with_usage(container, options.format);
        let mut payload = palette_writer::pack_codebook(&tex.block_codebook, options.format);
        payload.extend_from_slice(&mipmap_prefix(options.format, options.mipmaps, true));
        payload.extend_from_slice(&tex.block_indices);
        output.palette = Some(tex.palette);
        if !options.mipmaps {
            output.code_usage = Some(CodeUsageInfo {
                block_width: width.div_ceil(4),
                block_height: height.div_ceil(4),
                indices: tex.block_indices.clone(),
                usage,
            });
        }
        payload
    } else if options.format == PixelFormat::Yuv422 {
        if options.compress {
            return Err(PvrtexError::UnsupportedFormat { format: options.format });
        }
        build_yuv422_payload(container)
    } else if options.compress {
        let (payload, usage, block_grid) =
            build_16bpp_vq_payload(container, options.format, options.mipmaps);
        if !options.mipmaps {
            const CODEBOOK_16BPP_BYTES: usize = 256 * 8;
            output.code_usage = Some(CodeUsageInfo {
                block_width: block_grid.0,
                block_height: block_grid.1,
                indices: payload[CODEBOOK_16BPP_BYTES..].to_vec(),
                usage,
            });
        }
        payload
    } else {
        build_16bpp_raw_payload(container, options.format, options.mipmaps)
    };

    let expected_size =
        size::calculate_size(width, height, options.format, options.mipmaps, options.compress, options.stride);
    let mut payload = payload;
    debug_assert!(
        payload.len() as u64 <= expected_size,
        "payload ({} bytes) exceeds calculated size ({expected_size} bytes)",
        payload.len()
    );
    payload.resize(expected_size as usize, 0);

    let mut texture_type = format::TextureType::new()
        .with_pixel_format(options.format)
        .with_mipmaps(options.mipmaps)
        .with_vq_compressed(options.compress && options.stride.is_none() && !options.format.is_paletted());

    let header_width = if let Some(stride) = options.stride {
        texture_type = texture_type
            .with_strided(true)
            .with_nontwiddled(true)
            .with_stride_value(u5::new((stride / 32) as u8));
        width.next_power_of_two() as u16
    } else {
        width as u16
    };

    let header =
        framer::TextureHeader { width: header_width, height: height as u16, texture_type, size: expected_size as u32 };
    framer::write(out, header, &payload)?;

    Ok(output)
}

fn validate_dimensions(width: u32, height: u32, options: &EncodeOptions) -> Result<(), PvrtexError> {
    if let Some(stride) = options.stride {
        if stride == 0 || stride % 32 != 0 || stride > MAX_STRIDE || stride < width {
            return Err(PvrtexError::InvalidStride { width, stride });
        }
        if options.mipmaps || options.compress || options.format.is_paletted() || options.format == PixelFormat::Yuv422 {
            return Err(PvrtexError::StridedUnsupportedCombination);
        }
        if height == 0 {
            return Err(PvrtexError::InvalidSize { width, height });
        }
        return Ok(());
    }

    if width == 0 || height == 0 || !width.is_power_of_two() || !height.is_power_of_two() {
        return Err(PvrtexError::InvalidSize { width, height });
    }
    Ok(())
}

/// Zero-byte pad reserved ahead of a mipmapped texture's data, sized to the
/// pixel format and compression mode.
fn mipmap_prefix(format: PixelFormat, mipmaps: bool, vq_compressed: bool) -> Vec<u8> {
    if mipmaps {
        vec![0u8; size::mipmap_header_padding(format, vq_compressed) as usize]
    } else {
        Vec::new()
    }
}

fn flatten_levels(container: &ImageContainer) -> Vec<Rgba8> {
    let mut pixels = Vec::new();
    for level in container.levels() {
        for y in 0..level.height() {
            for x in 0..level.width() {
                pixels.push(level.get_pixel(x, y));
            }
        }
    }
    pixels
}

fn twiddled_blocks(level: &pvrimage::Image) -> Vec<Block2x2> {
    let (width, height) = (level.width(), level.height());
    let mut addressed: Vec<(u32, (u32, u32))> = Vec::with_capacity((width * height) as usize);
    for y in (0..height).step_by(2) {
        for x in (0..width).step_by(2) {
            addressed.push((twiddle(x, y, width, height), (x, y)));
        }
    }
    addressed.sort_by_key(|(addr, _)| *addr);

    addressed
        .into_iter()
        .map(|(_, (x, y))| {
            let x1 = (x + 1).min(width - 1);
            let y1 = (y + 1).min(height - 1);
            Block2x2 {
                top_left: level.get_pixel(x, y),
                bottom_left: level.get_pixel(x, y1),
                top_right: level.get_pixel(x1, y),
                bottom_right: level.get_pixel(x1, y1),
            }
        })
        .collect()
}

/// Builds the VQ-compressed 16bpp payload, returning the bytes, per-
/// codeword usage stats, and the base level's block grid dimensions (in
/// 2x2 blocks) for `--vqcodeusage` rendering.
fn build_16bpp_vq_payload(
    container: &ImageContainer,
    format: PixelFormat,
    mipmaps: bool,
) -> (Vec<u8>, Vec<CodeUsage>, (u32, u32)) {
    let base = container.base();
    let block_grid = (base.width().div_ceil(2), base.height().div_ceil(2));

    let mut blocks = Vec::new();
    for level in container.levels() {
        blocks.extend(twiddled_blocks(level));
    }

    let encode_fn = pixel_encoder(format);
    let (codebook, indices, usage) = codebook16::Codebook16::train(&blocks, encode_fn);

    let mut payload = codebook.to_bytes();
    payload.extend_from_slice(&mipmap_prefix(format, mipmaps, true));
    payload.extend_from_slice(&indices);
    (payload, usage, block_grid)
}

fn build_16bpp_raw_payload(container: &ImageContainer, format: PixelFormat, mipmaps: bool) -> Vec<u8> {
    let encode_fn = pixel_encoder(format);
    let mut payload = mipmap_prefix(format, mipmaps, false);
    for level in container.levels() {
        let (width, height) = (level.width(), level.height());
        let mut ordered = vec![0u16; (width * height) as usize];
        for y in 0..height {
            for x in 0..width {
                let addr = twiddle(x, y, width, height);
                ordered[addr as usize] = encode_fn(level.get_pixel(x, y));
            }
        }
        for word in ordered {
            payload.extend_from_slice(&word.to_le_bytes());
        }
    }
    payload
}

/// Builds a raster (non-twiddled) payload at a fixed row `stride`, right-
/// padding each row past the level's true width with zeros.
fn build_strided_raw_payload(container: &ImageContainer, format: PixelFormat, stride: u32) -> Vec<u8> {
    let encode_fn = pixel_encoder(format);
    let mut payload = Vec::new();
    for level in container.levels() {
        let (width, height) = (level.width(), level.height());
        for y in 0..height {
            for x in 0..stride {
                let word = if x < width { encode_fn(level.get_pixel(x, y)) } else { 0 };
                payload.extend_from_slice(&word.to_le_bytes());
            }
        }
    }
    payload
}

/// Builds the YUV422 payload: horizontally adjacent pixel pairs (visited in
/// twiddled order) packed into two 16-bit words each. A mip chain's 1x1
/// level has no partner pixel to pair with, so it falls back to a plain
/// RGB565 sample instead.
fn build_yuv422_payload(container: &ImageContainer) -> Vec<u8> {
    let mut payload = Vec::new();
    for level in container.levels() {
        let (width, height) = (level.width(), level.height());
        if width == 1 && height == 1 {
            let word = pixel::encode_rgb565(level.get_pixel(0, 0));
            payload.extend_from_slice(&word.to_le_bytes());
            continue;
        }

        let mut ordered = vec![Rgba8::default(); (width * height) as usize];
        for y in 0..height {
            for x in 0..width {
                ordered[twiddle(x, y, width, height) as usize] = level.get_pixel(x, y);
            }
        }

        let mut encoder = Yuv422Encoder::new();
        for color in ordered {
            if let Some(pair) = encoder.encode_pixel(color) {
                for word in pair {
                    payload.extend_from_slice(&word.to_le_bytes());
                }
            }
        }
        if let Some(pair) = encoder.flush() {
            for word in pair {
                payload.extend_from_slice(&word.to_le_bytes());
            }
        }
    }
    payload
}

fn pixel_encoder(format: PixelFormat) -> fn(Rgba8) -> u16 {
    match format {
        PixelFormat::Argb1555 => pixel::encode_argb1555,
        PixelFormat::Rgb565 => pixel::encode_rgb565,
        PixelFormat::Argb4444 => pixel::encode_argb4444,
        PixelFormat::Bumpmap => pixel::encode_bumpmap,
        PixelFormat::Yuv422 | PixelFormat::Pal4Bpp | PixelFormat::Pal8Bpp => {
            unreachable!("routed to a dedicated writer before pixel_encoder is called")
        }
    }
}

/// Writes a plain-text usage report: one `index use_count max_error` line
/// per codeword, matching [`pvrvq::VectorQuantizer::write_report`]'s format.
pub fn write_code_usage_report<W: Write>(usage: &[CodeUsage], mut out: W) -> std::io::Result<()> {
    for (idx, usage) in usage.iter().enumerate() {
        writeln!(out, "{idx} {} {}", usage.use_count, usage.max_dist_sq.sqrt())?;
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use pvrimage::Image;
    use std::io::Cursor;

    fn solid_container(size: u32) -> ImageContainer {
        let pixels = vec![Rgba8::new(10, 20, 30, 255); (size * size) as usize];
        ImageContainer::single(Image::new_direct(size, size, pixels).unwrap())
    }

    fn base_options(format: PixelFormat) -> EncodeOptions {
        EncodeOptions { format, mipmaps: false, compress: false, filter: Filter::Bilinear, stride: None }
    }

    #[test]
    fn encode_raw_rgb565_round_trips_header() {
        let container = solid_container(8);
        let options = base_options(PixelFormat::Rgb565);
        let mut buf = Vec::new();
        encode(Cursor::new(&mut buf), &container, options).unwrap();

        let (header, payload) = framer::read(Cursor::new(&buf)).unwrap();
        assert_eq!(header.width, 8);
        assert_eq!(header.height, 8);
        assert_eq!(header.size as usize, payload.len());
        assert_eq!(header.size, size::calculate_size(8, 8, PixelFormat::Rgb565, false, false, None) as u32);
    }

    #[test]
    fn encode_compressed_uses_fixed_codebook_layout() {
        let container = solid_container(8);
        let options = EncodeOptions { compress: true, ..base_options(PixelFormat::Rgb565) };
        let mut buf = Vec::new();
        encode(Cursor::new(&mut buf), &container, options).unwrap();
        let (header, payload) = framer::read(Cursor::new(&buf)).unwrap();
        assert!(header.texture_type.vq_compressed());
        assert_eq!(header.size as usize, payload.len());
        assert_eq!(header.size % 32, 0);
    }

    #[test]
    fn encode_paletted_returns_palette() {
        let container = solid_container(8);
        let options = EncodeOptions { filter: Filter::Nearest, ..base_options(PixelFormat::Pal8Bpp) };
        let mut buf = Vec::new();
        let output = encode(Cursor::new(&mut buf), &container, options).unwrap();
        assert!(output.palette.is_some());
        assert!(output.code_usage.is_some());
    }

    #[test]
    fn rejects_non_power_of_two_dimensions() {
        let pixels = vec![Rgba8::BLACK; 9 * 8];
        let container = ImageContainer::single(Image::new_direct(9, 8, pixels).unwrap());
        let options = EncodeOptions { filter: Filter::Nearest, ..base_options(PixelFormat::Rgb565) };
        let mut buf = Vec::new();
        assert!(encode(Cursor::new(&mut buf), &container, options).is_err());
    }

    #[test]
    fn strided_encode_accepts_non_power_of_two_width() {
        let pixels = vec![Rgba8::new(1, 2, 3, 255); 100 * 64];
        let container = ImageContainer::single(Image::new_direct(100, 64, pixels).unwrap());
        let options = EncodeOptions { stride: Some(128), ..base_options(PixelFormat::Rgb565) };
        let mut buf = Vec::new();
        encode(Cursor::new(&mut buf), &container, options).unwrap();

        let (header, payload) = framer::read(Cursor::new(&buf)).unwrap();
        assert!(header.texture_type.strided());
        assert!(header.texture_type.nontwiddled());
        assert_eq!(header.width, 100u32.next_power_of_two() as u16);
        assert_eq!(payload.len(), size::calculate_size(100, 64, PixelFormat::Rgb565, false, false, Some(128)) as usize);
    }

    #[test]
    fn strided_rejects_mipmaps() {
        let pixels = vec![Rgba8::BLACK; 64 * 64];
        let container = ImageContainer::single(Image::new_direct(64, 64, pixels).unwrap());
        let options =
            EncodeOptions { stride: Some(64), mipmaps: true, ..base_options(PixelFormat::Rgb565) };
        let mut buf = Vec::new();
        assert!(encode(Cursor::new(&mut buf), &container, options).is_err());
    }

    #[test]
    fn yuv422_encodes_without_panicking() {
        let container = solid_container(8);
        let options = base_options(PixelFormat::Yuv422);
        let mut buf = Vec::new();
        encode(Cursor::new(&mut buf), &container, options).unwrap();
        let (header, payload) = framer::read(Cursor::new(&buf)).unwrap();
        assert_eq!(header.size as usize, payload.len());
        assert_eq!(payload.len(), 8 * 8 * 2);
    }

    #[test]
    fn yuv422_rejects_compression() {
        let container = solid_container(8);
        let options = EncodeOptions { compress: true, ..base_options(PixelFormat::Yuv422) };
        let mut buf = Vec::new();
        assert!(encode(Cursor::new(&mut buf), &container, options).is_err());
    }

    #[test]
    fn mipmapped_raw_payload_carries_prefix_pad() {
        let container = solid_container(8).with_mipmaps(Filter::Nearest).unwrap();
        let options = EncodeOptions { mipmaps: true, ..base_options(PixelFormat::Rgb565) };
        let mut buf = Vec::new();
        encode(Cursor::new(&mut buf), &container, options).unwrap();
        let (header, payload) = framer::read(Cursor::new(&buf)).unwrap();
        assert_eq!(header.size as usize, payload.len());
        // 6-byte prefix + 85 texels (8x8+4x4+2x2+1x1) * 2 bytes, rounded to 32.
        let expected = size::calculate_size(8, 8, PixelFormat::Rgb565, true, false, None);
        assert_eq!(header.size as u64, expected);
    }

    #[test]
    fn mipmapped_compressed_payload_uses_one_byte_prefix() {
        let container = solid_container(8).with_mipmaps(Filter::Nearest).unwrap();
        let options =
            EncodeOptions { mipmaps: true, compress: true, ..base_options(PixelFormat::Rgb565) };
        let mut buf = Vec::new();
        encode(Cursor::new(&mut buf), &container, options).unwrap();
        let (header, _) = framer::read(Cursor::new(&buf)).unwrap();
        let expected = size::calculate_size(8, 8, PixelFormat::Rgb565, true, true, None);
        assert_eq!(header.size as u64, expected);
    }
}
