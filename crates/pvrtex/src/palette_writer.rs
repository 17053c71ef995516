//! Paletted (`PAL4BPP`/`PAL8BPP`) texture writing: a first VQ pass reduces
//! the image's colors to a palette, then a second VQ pass clusters twiddled
//! 4x4 super-tiles of palette indices into a 256-entry block codebook.

use std::collections::HashSet;

use bitut::BitUtils;
use color::Rgba8;
use pvrimage::{Image, ImageContainer, Palette};
use pvrtwiddle::twiddle;
use pvrvq::{CodeUsage, Vector, VectorQuantizer};

use crate::dedup::dedup_blocks;
use crate::format::PixelFormat;

/// Indices covering one 4x4 super-tile, the unit the second VQ stage
/// clusters, for both bit depths.
pub const BLOCK_LEN: usize = 16;
const TILE: u32 = 4;
const TARGET_SIZE: usize = 256;

pub struct PalettedTexture {
    pub palette: Palette,
    /// Second-stage codebook entries: each is [`BLOCK_LEN`] palette
    /// indices, raster order within the twiddled 4x4 super-tile.
    pub block_codebook: Vec<[u8; BLOCK_LEN]>,
    /// One codebook index per super-tile, in twiddled tile order.
    pub block_indices: Vec<u8>,
}

/// Builds a paletted texture from a mipmap chain, choosing the palette size
/// from `format` (16 colors for `PAL4BPP`, 256 for `PAL8BPP`).
pub fn build(container: &ImageContainer, format: PixelFormat) -> PalettedTexture {
    build_with_usage(container, format).0
}

/// Same as [`build`], but also returns per-codeword usage stats for the
/// second-stage block codebook (used by `--vqreport`).
pub fn build_with_usage(
    container: &ImageContainer,
    format: PixelFormat,
) -> (PalettedTexture, Vec<CodeUsage>) {
    let palette_limit = match format {
        PixelFormat::Pal4Bpp => 16,
        PixelFormat::Pal8Bpp => 256,
        _ => unreachable!("build called with a non-paletted format"),
    };

    let pixels = flatten_levels(container);
    let palette = quantize_palette(&pixels, palette_limit);

    let mut blocks: Vec<[u8; BLOCK_LEN]> = Vec::new();
    for level in container.levels() {
        blocks.extend(twiddled_tiles(level, &palette));
    }

    let (block_codebook, block_indices, usage) = train_block_codebook(&blocks);
    (PalettedTexture { palette, block_codebook, block_indices }, usage)
}

/// Packs a trained block codebook into its fixed 256-entry on-disk form:
/// each entry is 16 nibble-packed indices (8 bytes) for `PAL4BPP`, or 16 raw
/// one-byte indices (16 bytes) for `PAL8BPP`. Unused codebook slots past
/// the trained entries are zero-filled.
#[must_use]
pub fn pack_codebook(codebook: &[[u8; BLOCK_LEN]], format: PixelFormat) -> Vec<u8> {
    let mut out = Vec::with_capacity(TARGET_SIZE * entry_bytes(format));
    for i in 0..TARGET_SIZE {
        let entry = codebook.get(i).copied().unwrap_or([0u8; BLOCK_LEN]);
        out.extend_from_slice(&pack_entry(&entry, format));
    }
    out
}

fn entry_bytes(format: PixelFormat) -> usize {
    match format {
        PixelFormat::Pal8Bpp => BLOCK_LEN,
        _ => BLOCK_LEN / 2,
    }
}

fn pack_entry(entry: &[u8; BLOCK_LEN], format: PixelFormat) -> Vec<u8> {
    match format {
        PixelFormat::Pal8Bpp => entry.to_vec(),
        PixelFormat::Pal4Bpp => entry
            .chunks(2)
            .map(|pair| 0u8.with_bits(0..4, pair[0]).with_bits(4..8, pair[1]))
            .collect(),
        _ => unreachable!("pack_entry called with a non-paletted format"),
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

/// Gathers one level's pixels into twiddled 4x4 super-tiles of palette
/// indices. Levels smaller than the tile (the bottom of a mip chain) still
/// produce exactly one tile, edge-clamped to the level's own pixels.
fn twiddled_tiles(level: &Image, palette: &Palette) -> Vec<[u8; BLOCK_LEN]> {
    let (width, height) = (level.width(), level.height());
    let mut addressed: Vec<(u32, (u32, u32))> = Vec::new();
    for y in (0..height).step_by(TILE as usize) {
        for x in (0..width).step_by(TILE as usize) {
            addressed.push((twiddle(x, y, width, height), (x, y)));
        }
    }
    addressed.sort_by_key(|(addr, _)| *addr);

    addressed
        .into_iter()
        .map(|(_, (x0, y0))| {
            let mut tile = [0u8; BLOCK_LEN];
            for dy in 0..TILE {
                for dx in 0..TILE {
                    let x = (x0 + dx).min(width - 1);
                    let y = (y0 + dy).min(height - 1);
                    tile[(dy * TILE + dx) as usize] = nearest_palette_index(palette, level.get_pixel(x, y));
                }
            }
            tile
        })
        .collect()
}

fn quantize_palette(pixels: &[Rgba8], limit: usize) -> Palette {
    let mut palette = Palette::new();

    let distinct: HashSet<u32> = pixels.iter().map(|p| p.to_argb_u32()).collect();
    if distinct.len() <= limit {
        for argb in distinct {
            palette.insert(Rgba8::from_argb_u32(argb), limit).expect("within limit by construction");
        }
        return palette;
    }

    let vectors: Vec<Vector<4>> =
        pixels.iter().map(|p| Vector::new(p.channels().map(f32::from))).collect();
    let vq = VectorQuantizer::train(&vectors, limit, 1e-4);
    for v in vq.codebook() {
        let color = Rgba8::from_channels(v.components.map(color::clamp255));
        palette.insert(color, limit).expect("codebook already bounded to limit");
    }
    palette
}

fn nearest_palette_index(palette: &Palette, color: Rgba8) -> u8 {
    palette
        .colors()
        .iter()
        .enumerate()
        .min_by_key(|(_, c)| c.dist_sq(color))
        .map(|(idx, _)| idx as u8)
        .unwrap_or(0)
}

fn train_block_codebook(blocks: &[[u8; BLOCK_LEN]]) -> (Vec<[u8; BLOCK_LEN]>, Vec<u8>, Vec<CodeUsage>) {
    let as_u32_blocks: Vec<[u32; BLOCK_LEN]> =
        blocks.iter().map(|b| b.map(u32::from)).collect();

    if let Some((codebook, indices)) = dedup_blocks(&as_u32_blocks) {
        tracing::debug!(codes = codebook.len(), "paletted: lossless dedup fast path");
        let codebook: Vec<[u8; BLOCK_LEN]> = codebook.into_iter().map(|b| b.map(|v| v as u8)).collect();
        let usage = usage_from_indices(codebook.len(), &indices);
        return (codebook, indices, usage);
    }

    let vectors: Vec<Vector<BLOCK_LEN>> =
        blocks.iter().map(|b| Vector::new(b.map(f32::from))).collect();
    let vq = VectorQuantizer::train(&vectors, TARGET_SIZE, 1e-4);
    let codebook = vq
        .codebook()
        .iter()
        .map(|v| v.components.map(|c| c.round().clamp(0.0, 255.0) as u8))
        .collect();
    let indices = vectors.iter().map(|v| vq.nearest(v) as u8).collect();
    let usage = vq.usage_report(&vectors);
    (codebook, indices, usage)
}

fn usage_from_indices(codebook_len: usize, indices: &[u8]) -> Vec<CodeUsage> {
    let mut usage = vec![CodeUsage::default(); codebook_len];
    for &idx in indices {
        usage[idx as usize].use_count += 1;
    }
    usage
}
