//! Morton-order ("twiddled") address permutation.
//!
//! Square textures twiddle directly: interleave the bits of `x` and `y` into
//! a single Morton code. Rectangular textures (where the shorter side is
//! still a power of two) are treated as a row or column of twiddled square
//! tiles sized to the shorter side, laid out in order along the longer axis.

/// Computes the twiddled (Morton) address of pixel `(x, y)` in a
/// `width`×`height` texture.
///
/// `width` and `height` must each be a power of two, and `min(width,
/// height)` must be a power of two no greater than either (always true when
/// both are powers of two). Returns an address in `0..width*height`.
#[must_use]
pub fn twiddle(x: u32, y: u32, width: u32, height: u32) -> u32 {
    debug_assert!(width.is_power_of_two() && height.is_power_of_two());
    debug_assert!(x < width && y < height);

    let min_dim = width.min(height);
    let bits = min_dim.trailing_zeros();
    let mask = min_dim - 1;

    let morton = interleave(x & mask, y & mask, bits);
    let tile_area = min_dim * min_dim;

    if width >= height {
        (x >> bits) * tile_area + morton
    } else {
        (y >> bits) * tile_area + morton
    }
}

/// Inverse of [`twiddle`]: recovers `(x, y)` from a twiddled address.
#[must_use]
pub fn untwiddle(addr: u32, width: u32, height: u32) -> (u32, u32) {
    debug_assert!(width.is_power_of_two() && height.is_power_of_two());

    let min_dim = width.min(height);
    let bits = min_dim.trailing_zeros();
    let tile_area = min_dim * min_dim;

    let tile_index = addr / tile_area;
    let morton = addr % tile_area;
    let (x_lo, y_lo) = deinterleave(morton, bits);

    if width >= height {
        (tile_index * min_dim + x_lo, y_lo)
    } else {
        (x_lo, tile_index * min_dim + y_lo)
    }
}

fn interleave(x: u32, y: u32, bits: u32) -> u32 {
    let mut result = 0u32;
    for i in 0..bits {
        result |= ((x >> i) & 1) << (2 * i);
        result |= ((y >> i) & 1) << (2 * i + 1);
    }
    result
}

fn deinterleave(morton: u32, bits: u32) -> (u32, u32) {
    let mut x = 0u32;
    let mut y = 0u32;
    for i in 0..bits {
        x |= ((morton >> (2 * i)) & 1) << i;
        y |= ((morton >> (2 * i + 1)) & 1) << i;
    }
    (x, y)
}
