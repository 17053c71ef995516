//! Raster image storage, mipmap chain management, and palette handling for
//! the texture encoder.

mod container;
mod error;
mod image;
mod palette;

pub use container::ImageContainer;
pub use error::{ImageError, PaletteError};
pub use image::{Filter, Image, Raster};
pub use palette::Palette;
