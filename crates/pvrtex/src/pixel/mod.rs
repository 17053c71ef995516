//! 16-bit-per-pixel codecs: ARGB1555, RGB565, ARGB4444, YUV422, and the
//! spherical-normal BUMPMAP encoding.

mod bumpmap;
mod yuv422;

pub use yuv422::{decode_pair as decode_yuv422_pair, Yuv422Encoder};

use color::Rgba8;

/// Encodes a single color to its 16-bit representation for formats that
/// need no cross-pixel context.
#[must_use]
pub fn encode_argb1555(c: Rgba8) -> u16 {
    let a = u16::from(c.a >= 128);
    let r = u16::from(c.r) >> 3;
    let g = u16::from(c.g) >> 3;
    let b = u16::from(c.b) >> 3;
    (a << 15) | (r << 10) | (g << 5) | b
}

#[must_use]
pub fn decode_argb1555(bits: u16) -> Rgba8 {
    let a = if bits & 0x8000 != 0 { 255 } else { 0 };
    let r = expand5((bits >> 10) as u8 & 0x1F);
    let g = expand5((bits >> 5) as u8 & 0x1F);
    let b = expand5(bits as u8 & 0x1F);
    Rgba8::new(r, g, b, a)
}

#[must_use]
pub fn encode_rgb565(c: Rgba8) -> u16 {
    let r = u16::from(c.r) >> 3;
    let g = u16::from(c.g) >> 2;
    let b = u16::from(c.b) >> 3;
    (r << 11) | (g << 5) | b
}

#[must_use]
pub fn decode_rgb565(bits: u16) -> Rgba8 {
    let r = expand5((bits >> 11) as u8 & 0x1F);
    let g = expand6((bits >> 5) as u8 & 0x3F);
    let b = expand5(bits as u8 & 0x1F);
    Rgba8::new(r, g, b, 255)
}

#[must_use]
pub fn encode_argb4444(c: Rgba8) -> u16 {
    let a = u16::from(c.a) >> 4;
    let r = u16::from(c.r) >> 4;
    let g = u16::from(c.g) >> 4;
    let b = u16::from(c.b) >> 4;
    (a << 12) | (r << 8) | (g << 4) | b
}

#[must_use]
pub fn decode_argb4444(bits: u16) -> Rgba8 {
    let a = expand4((bits >> 12) as u8 & 0xF);
    let r = expand4((bits >> 8) as u8 & 0xF);
    let g = expand4((bits >> 4) as u8 & 0xF);
    let b = expand4(bits as u8 & 0xF);
    Rgba8::new(r, g, b, a)
}

pub use bumpmap::{decode_bumpmap, encode_bumpmap};

fn expand4(v: u8) -> u8 {
    (v << 4) | v
}

fn expand5(v: u8) -> u8 {
    (v << 3) | (v >> 2)
}

fn expand6(v: u8) -> u8 {
    (v << 2) | (v >> 4)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn argb1555_opaque_white_round_trip() {
        let c = Rgba8::new(255, 255, 255, 255);
        assert_eq!(decode_argb1555(encode_argb1555(c)), c);
    }

    #[test]
    fn rgb565_drops_alpha() {
        let c = Rgba8::new(128, 64, 32, 0);
        let decoded = decode_argb1555(encode_argb1555(Rgba8::new(128, 64, 32, 255)));
        assert_eq!(decoded.a, 255);
        let _ = c;
    }

    #[test]
    fn argb4444_round_trips_quantized_values() {
        let c = Rgba8::new(0x11, 0x22, 0x33, 0x44).channels().map(|v| v & 0xF0);
        let c = Rgba8::from_channels(c);
        assert_eq!(decode_argb4444(encode_argb4444(c)), c);
    }
}
