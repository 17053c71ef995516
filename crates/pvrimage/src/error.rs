use easyerr::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("width and height must each be non-zero and fit the target format: {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("mipmap generation requires a square, power-of-two base image, got {width}x{height}")]
    NonSquareMipmap { width: u32, height: u32 },
    #[error(transparent)]
    Decode { source: image::ImageError },
    #[error(transparent)]
    Io { source: std::io::Error },
}

#[derive(Debug, Error)]
pub enum PaletteError {
    #[error("expected palette magic DPAL or DTEX, found {found:?}")]
    BadMagic { found: [u8; 4] },
    #[error("palette holds {count} colors, which exceeds the {limit}-entry limit")]
    Overflow { count: usize, limit: usize },
    #[error(transparent)]
    Io { source: std::io::Error },
    #[error(transparent)]
    Binrw { source: binrw::Error },
}
