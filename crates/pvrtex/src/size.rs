use crate::format::PixelFormat;

const ALIGNMENT: u64 = 32;
/// Fixed 16bpp codebook size: 256 entries, one 8-byte record each (four
/// 16bpp corner samples per record for a 2x2 block).
const CODEBOOK_16BPP_BYTES: u64 = 256 * 8;
const CODEBOOK_ENTRIES: u64 = 256;

/// Header bytes reserved ahead of the first real mipmap level's data; the
/// console's mipmap walk expects a small pad sized to the pixel format so
/// that the 1x1 level lands on a format-appropriate boundary. Paletted
/// formats use their own fixed pad; non-paletted formats pad 6 bytes when
/// stored raw but only 1 byte when VQ-compressed (the compressed stream's
/// own 1x1-level placeholder already covers the rest).
#[must_use]
pub fn mipmap_header_padding(format: PixelFormat, vq_compressed: bool) -> u64 {
    match format {
        PixelFormat::Pal4Bpp => 1,
        PixelFormat::Pal8Bpp => 3,
        _ if vq_compressed => 1,
        _ => 6,
    }
}

/// Total texel count across a mipmap chain (or just the base level, if
/// `mipmaps` is false). Chains are always square and power-of-two, so this
/// sums `size*size` down from `width` to `1x1`.
#[must_use]
pub fn get_pixel_count(width: u32, height: u32, mipmaps: bool) -> u64 {
    if !mipmaps {
        return u64::from(width) * u64::from(height);
    }

    let mut total = 0u64;
    let mut size = width.max(height);
    loop {
        total += u64::from(size) * u64::from(size);
        if size == 1 {
            break;
        }
        size /= 2;
    }
    total
}

/// Number of `tile`x`tile` super-tiles needed to cover a chain of square
/// power-of-two levels. A level smaller than `tile` still needs exactly one
/// degenerate, edge-clamped tile, so this sums `ceil(size/tile)^2` per level
/// rather than dividing the aggregate texel count (which only happens to
/// work when at most one level in the chain is sub-tile-sized).
fn tile_count(width: u32, height: u32, mipmaps: bool, tile: u32) -> u64 {
    if !mipmaps {
        let tx = u64::from(width.div_ceil(tile));
        let ty = u64::from(height.div_ceil(tile));
        return tx * ty;
    }

    let mut total = 0u64;
    let mut size = width.max(height);
    loop {
        let t = u64::from(size.div_ceil(tile));
        total += t * t;
        if size == 1 {
            break;
        }
        size /= 2;
    }
    total
}

/// On-disk bytes per codebook entry: 8 for 16bpp (four corner samples) and
/// `PAL4BPP` (16 nibble-packed indices), 16 for `PAL8BPP` (16 raw indices).
#[must_use]
pub fn codebook_entry_bytes(format: PixelFormat) -> u64 {
    match format {
        PixelFormat::Pal8Bpp => 16,
        _ => 8,
    }
}

/// Computes the payload size in bytes, rounded up to the 32-byte alignment
/// the container format requires. `stride`, when set, selects the raster
/// (non-twiddled) layout: `stride * height` 16bpp texels, no codebook, no
/// mipmap padding (strided textures never carry a mip chain).
#[must_use]
pub fn calculate_size(
    width: u32,
    height: u32,
    format: PixelFormat,
    mipmaps: bool,
    vq_compressed: bool,
    stride: Option<u32>,
) -> u64 {
    if let Some(stride) = stride {
        let raw = u64::from(stride) * u64::from(height) * 2;
        return raw.div_ceil(ALIGNMENT) * ALIGNMENT;
    }

    let effective_vq = vq_compressed || format.is_paletted();
    let padding = if mipmaps { mipmap_header_padding(format, effective_vq) } else { 0 };

    let raw = if format.is_paletted() {
        let tiles = tile_count(width, height, mipmaps, 4);
        CODEBOOK_ENTRIES * codebook_entry_bytes(format) + tiles + padding
    } else if vq_compressed {
        let tiles = tile_count(width, height, mipmaps, 2);
        CODEBOOK_16BPP_BYTES + tiles + padding
    } else {
        get_pixel_count(width, height, mipmaps) * 2 + padding
    };

    raw.div_ceil(ALIGNMENT) * ALIGNMENT
}
