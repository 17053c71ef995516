use bitos::bitos;

/// The pixel encoding a texture payload is stored in. Values match the
/// 3-bit field the console's texture unit reads out of `textureType`.
#[bitos(3)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    Argb1555 = 0,
    Rgb565 = 1,
    Argb4444 = 2,
    Yuv422 = 3,
    Bumpmap = 4,
    Pal4Bpp = 5,
    Pal8Bpp = 6,
}

impl PixelFormat {
    #[must_use]
    pub const fn is_paletted(self) -> bool {
        matches!(self, Self::Pal4Bpp | Self::Pal8Bpp)
    }

    #[must_use]
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            Self::Pal4Bpp => 4,
            Self::Pal8Bpp => 8,
            _ => 16,
        }
    }
}

/// The packed 32-bit `textureType` header field: pixel format, twiddling
/// and stride flags, and the mipmap/VQ-compression bits.
#[bitos(32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureType {
    /// `next_power_of_two(width)` when [`Self::strided`] is set; otherwise
    /// unused. The true stride is recovered from [`Self::stride_value`].
    #[bits(0..5)]
    pub stride_value: u5,
    #[bits(25)]
    pub strided: bool,
    #[bits(26)]
    pub nontwiddled: bool,
    #[bits(27..30)]
    pub pixel_format: PixelFormat,
    #[bits(30)]
    pub mipmaps: bool,
    #[bits(31)]
    pub vq_compressed: bool,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_through_raw_bits() {
        let tt = TextureType::new()
            .with_pixel_format(PixelFormat::Rgb565)
            .with_mipmaps(true)
            .with_vq_compressed(true);
        let raw = tt.to_bits();
        let back = TextureType::from_bits(raw);
        assert_eq!(back, tt);
        assert_eq!(back.pixel_format(), PixelFormat::Rgb565);
        assert!(back.mipmaps());
        assert!(back.vq_compressed());
    }

    #[test]
    fn strided_sets_both_flags() {
        let tt = TextureType::new().with_strided(true).with_nontwiddled(true);
        assert!(tt.strided());
        assert!(tt.nontwiddled());
    }
}
