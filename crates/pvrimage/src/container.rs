use std::path::Path;

use color::Rgba8;
use easyerr::ResultExt;

use crate::error::{ImageError, ImageErrorCtx};
use crate::image::{Filter, Image};

/// A base image plus its full mipmap chain, largest level first.
#[derive(Debug, Clone)]
pub struct ImageContainer {
    levels: Vec<Image>,
}

impl ImageContainer {
    /// Wraps a single image with no mipmap chain.
    #[must_use]
    pub fn single(image: Image) -> Self {
        Self { levels: vec![image] }
    }

    /// Loads a raster image from disk via the `image` crate and wraps it
    /// with no mipmap chain; call [`ImageContainer::with_mipmaps`]
    /// afterwards if a chain is needed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let decoded = image::open(path).context(ImageErrorCtx::Decode)?.into_rgba8();
        let (width, height) = (decoded.width(), decoded.height());
        tracing::info!(path = %path.display(), width, height, "loaded image");

        let pixels = decoded
            .pixels()
            .map(|p| Rgba8::new(p[0], p[1], p[2], p[3]))
            .collect();
        let base = Image::new_direct(width, height, pixels)?;
        Ok(Self::single(base))
    }

    /// Builds the full mipmap chain for this container's base level, down
    /// to 1x1, replacing any chain already present. The base level must be
    /// square with power-of-two dimensions.
    pub fn with_mipmaps(mut self, filter: Filter) -> Result<Self, ImageError> {
        let base = self.levels.remove(0);
        let (width, height) = (base.width(), base.height());
        if width != height || !width.is_power_of_two() {
            return Err(ImageError::NonSquareMipmap { width, height });
        }

        let mut levels = vec![base];
        let mut size = width;
        while size > 1 {
            size /= 2;
            let next = levels.last().unwrap().resize(size, size, filter)?;
            tracing::debug!(size, "generated mipmap level");
            levels.push(next);
        }

        self.levels = levels;
        Ok(self)
    }

    #[must_use]
    pub fn levels(&self) -> &[Image] {
        &self.levels
    }

    #[must_use]
    pub fn base(&self) -> &Image {
        &self.levels[0]
    }

    #[must_use]
    pub fn has_mipmaps(&self) -> bool {
        self.levels.len() > 1
    }

    /// Mipmap level lookup by index (`0` is the base level), `None` when
    /// `index` is past the end of the chain.
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&Image> {
        self.levels.get(index)
    }
}
