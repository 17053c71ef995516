use color::Rgba8;

use crate::error::ImageError;

/// How a resize or mipmap-generation step resamples pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Filter {
    Nearest,
    #[default]
    Bilinear,
}

/// The pixel storage backing an [`Image`]: either fully-resolved color data,
/// or a buffer of palette indices that must be resolved against a
/// [`crate::Palette`] to produce colors.
#[derive(Debug, Clone)]
pub enum Raster {
    Direct(Vec<Rgba8>),
    Indexed(Vec<u8>),
}

/// A single raster image: one mipmap level's worth of pixel data.
#[derive(Debug, Clone)]
pub struct Image {
    width: u32,
    height: u32,
    raster: Raster,
}

impl Image {
    pub fn new_direct(width: u32, height: u32, pixels: Vec<Rgba8>) -> Result<Self, ImageError> {
        if width == 0 || height == 0 || pixels.len() != (width * height) as usize {
            return Err(ImageError::InvalidSize { width, height });
        }
        Ok(Self { width, height, raster: Raster::Direct(pixels) })
    }

    pub fn new_indexed(width: u32, height: u32, indices: Vec<u8>) -> Result<Self, ImageError> {
        if width == 0 || height == 0 || indices.len() != (width * height) as usize {
            return Err(ImageError::InvalidSize { width, height });
        }
        Ok(Self { width, height, raster: Raster::Indexed(indices) })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    #[must_use]
    pub fn is_indexed(&self) -> bool {
        matches!(self.raster, Raster::Indexed(_))
    }

    /// Direct-mode pixel lookup. Panics if this image is indexed; callers
    /// must resolve indexed rasters through a palette first.
    #[must_use]
    pub fn get_pixel(&self, x: u32, y: u32) -> Rgba8 {
        match &self.raster {
            Raster::Direct(pixels) => pixels[(y * self.width + x) as usize],
            Raster::Indexed(_) => panic!("get_pixel on an indexed image, resolve via palette"),
        }
    }

    /// Indexed-mode palette-index lookup.
    #[must_use]
    pub fn get_index(&self, x: u32, y: u32) -> u8 {
        match &self.raster {
            Raster::Indexed(indices) => indices[(y * self.width + x) as usize],
            Raster::Direct(_) => panic!("get_index on a direct image"),
        }
    }

    /// Resamples to `new_width`x`new_height`. Indexed images always use
    /// nearest-neighbor regardless of `filter`, since interpolating palette
    /// indices is meaningless.
    pub fn resize(&self, new_width: u32, new_height: u32, filter: Filter) -> Result<Self, ImageError> {
        if new_width == 0 || new_height == 0 {
            return Err(ImageError::InvalidSize { width: new_width, height: new_height });
        }

        match &self.raster {
            Raster::Indexed(indices) => {
                let mut out = Vec::with_capacity((new_width * new_height) as usize);
                for y in 0..new_height {
                    for x in 0..new_width {
                        let (sx, sy) = nearest_source(x, y, new_width, new_height, self.width, self.height);
                        out.push(indices[(sy * self.width + sx) as usize]);
                    }
                }
                Self::new_indexed(new_width, new_height, out)
            }
            Raster::Direct(pixels) => {
                let mut out = Vec::with_capacity((new_width * new_height) as usize);
                for y in 0..new_height {
                    for x in 0..new_width {
                        out.push(match filter {
                            Filter::Nearest => {
                                let (sx, sy) =
                                    nearest_source(x, y, new_width, new_height, self.width, self.height);
                                pixels[(sy * self.width + sx) as usize]
                            }
                            Filter::Bilinear => {
                                bilinear_sample(pixels, self.width, self.height, x, y, new_width, new_height)
                            }
                        });
                    }
                }
                Self::new_direct(new_width, new_height, out)
            }
        }
    }
}

fn nearest_source(x: u32, y: u32, new_w: u32, new_h: u32, src_w: u32, src_h: u32) -> (u32, u32) {
    let sx = (x * src_w / new_w).min(src_w - 1);
    let sy = (y * src_h / new_h).min(src_h - 1);
    (sx, sy)
}

fn bilinear_sample(
    pixels: &[Rgba8],
    src_w: u32,
    src_h: u32,
    x: u32,
    y: u32,
    new_w: u32,
    new_h: u32,
) -> Rgba8 {
    let fx = (x as f32 + 0.5) * src_w as f32 / new_w as f32 - 0.5;
    let fy = (y as f32 + 0.5) * src_h as f32 / new_h as f32 - 0.5;

    let x0 = fx.floor().clamp(0.0, (src_w - 1) as f32) as u32;
    let y0 = fy.floor().clamp(0.0, (src_h - 1) as f32) as u32;
    let x1 = (x0 + 1).min(src_w - 1);
    let y1 = (y0 + 1).min(src_h - 1);

    let tx = (fx - x0 as f32).clamp(0.0, 1.0);
    let ty = (fy - y0 as f32).clamp(0.0, 1.0);

    let p00 = pixels[(y0 * src_w + x0) as usize];
    let p10 = pixels[(y0 * src_w + x1) as usize];
    let p01 = pixels[(y1 * src_w + x0) as usize];
    let p11 = pixels[(y1 * src_w + x1) as usize];

    let top = p00.lerp(p10, tx);
    let bottom = p01.lerp(p11, tx);
    top.lerp(bottom, ty)
}

#[cfg(test)]
mod test {
    use super::*;

    fn checkerboard(size: u32) -> Image {
        let mut pixels = Vec::new();
        for y in 0..size {
            for x in 0..size {
                pixels.push(if (x + y) % 2 == 0 { Rgba8::WHITE } else { Rgba8::BLACK });
            }
        }
        Image::new_direct(size, size, pixels).unwrap()
    }

    #[test]
    fn nearest_downscale_halves_dimensions() {
        let img = checkerboard(8);
        let half = img.resize(4, 4, Filter::Nearest).unwrap();
        assert_eq!((half.width(), half.height()), (4, 4));
    }

    #[test]
    fn bilinear_interpolates_between_extremes() {
        let img = Image::new_direct(2, 1, vec![Rgba8::BLACK, Rgba8::WHITE]).unwrap();
        let up = img.resize(4, 1, Filter::Bilinear).unwrap();
        // middle samples should land strictly between black and white.
        let mid = up.get_pixel(1, 0);
        assert!(mid.r > 0 && mid.r < 255);
    }

    #[test]
    fn indexed_resize_preserves_indices_only() {
        let img = Image::new_indexed(2, 2, vec![0, 1, 2, 3]).unwrap();
        let resized = img.resize(2, 2, Filter::Bilinear).unwrap();
        assert!(resized.is_indexed());
    }

    #[test]
    fn rejects_mismatched_buffer_length() {
        assert!(Image::new_direct(2, 2, vec![Rgba8::BLACK]).is_err());
    }
}
