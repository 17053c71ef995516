use easyerr::Error;

#[derive(Debug, Error)]
pub enum PvrtexError {
    #[error("width and height must be non-zero and satisfy the chosen format's alignment: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("pixel format {format:?} does not support this operation")]
    UnsupportedFormat { format: crate::format::PixelFormat },
    #[error("stride {stride} is invalid for width {width} (must be a nonzero multiple of 32, at most 992, and at least the image width)")]
    InvalidStride { width: u32, stride: u32 },
    #[error("strided textures do not support mipmaps, vector quantization, or paletted formats")]
    StridedUnsupportedCombination,
    #[error(transparent)]
    Image { source: pvrimage::ImageError },
    #[error(transparent)]
    Palette { source: pvrimage::PaletteError },
    #[error("expected texture magic DTEX, found {found:?}")]
    BadMagic { found: [u8; 4] },
    #[error(transparent)]
    Io { source: std::io::Error },
    #[error(transparent)]
    Binrw { source: binrw::Error },
}
