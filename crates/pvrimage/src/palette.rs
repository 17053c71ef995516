use std::collections::HashMap;
use std::io::{Read, Seek, Write};

use binrw::{BinRead, BinWrite};
use color::Rgba8;
use easyerr::ResultExt;

use crate::error::{PaletteError, PaletteErrorCtx};

const PALETTE_MAGIC: [u8; 4] = *b"DPAL";
/// The original tool's palette writer carries this bug: it stamps the
/// texture magic on `.pal` files instead of the palette magic. Readers
/// accept both so files written by either tool round-trip.
const LEGACY_TEXTURE_MAGIC: [u8; 4] = *b"DTEX";

#[derive(Debug, Clone, Copy, BinRead, BinWrite)]
#[brw(little)]
struct PaletteFileHeader {
    magic: [u8; 4],
    count: u16,
}

/// An insertion-ordered ARGB color table with reverse lookup, backing
/// paletted (`PAL4BPP`/`PAL8BPP`) textures.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    colors: Vec<Rgba8>,
    lookup: HashMap<u32, u8>,
}

impl Palette {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[must_use]
    pub fn colors(&self) -> &[Rgba8] {
        &self.colors
    }

    pub fn get(&self, index: u8) -> Option<Rgba8> {
        self.colors.get(index as usize).copied()
    }

    /// Looks up a color's existing index.
    #[must_use]
    pub fn find(&self, color: Rgba8) -> Option<u8> {
        self.lookup.get(&color.to_argb_u32()).copied()
    }

    /// Inserts `color` if not already present, returning its index. Errors
    /// if the palette is already at `limit` entries.
    pub fn insert(&mut self, color: Rgba8, limit: usize) -> Result<u8, PaletteError> {
        if let Some(idx) = self.find(color) {
            return Ok(idx);
        }
        if self.colors.len() >= limit {
            return Err(PaletteError::Overflow { count: self.colors.len() + 1, limit });
        }
        let idx = self.colors.len() as u8;
        self.colors.push(color);
        self.lookup.insert(color.to_argb_u32(), idx);
        Ok(idx)
    }

    pub fn save<W: Write + Seek>(&self, mut out: W) -> Result<(), PaletteError> {
        let header = PaletteFileHeader { magic: PALETTE_MAGIC, count: self.colors.len() as u16 };
        header.write(&mut out).context(PaletteErrorCtx::Binrw)?;
        for color in &self.colors {
            out.write_all(&color.to_argb_u32().to_le_bytes()).context(PaletteErrorCtx::Io)?;
        }
        Ok(())
    }

    pub fn load<R: Read + Seek>(mut input: R) -> Result<Self, PaletteError> {
        let header = PaletteFileHeader::read(&mut input).context(PaletteErrorCtx::Binrw)?;
        if header.magic != PALETTE_MAGIC && header.magic != LEGACY_TEXTURE_MAGIC {
            return Err(PaletteError::BadMagic { found: header.magic });
        }

        let mut palette = Self::new();
        for _ in 0..header.count {
            let mut buf = [0u8; 4];
            input.read_exact(&mut buf).context(PaletteErrorCtx::Io)?;
            let color = Rgba8::from_argb_u32(u32::from_le_bytes(buf));
            palette.colors.push(color);
            palette.lookup.insert(color.to_argb_u32(), (palette.colors.len() - 1) as u8);
        }
        Ok(palette)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn insert_deduplicates() {
        let mut palette = Palette::new();
        let idx_a = palette.insert(Rgba8::WHITE, 16).unwrap();
        let idx_b = palette.insert(Rgba8::WHITE, 16).unwrap();
        assert_eq!(idx_a, idx_b);
        assert_eq!(palette.len(), 1);
    }

    #[test]
    fn overflow_past_limit() {
        let mut palette = Palette::new();
        for i in 0..4u8 {
            palette.insert(Rgba8::new(i, 0, 0, 255), 4).unwrap();
        }
        assert!(palette.insert(Rgba8::new(200, 0, 0, 255), 4).is_err());
    }

    #[test]
    fn save_load_round_trip() {
        let mut palette = Palette::new();
        palette.insert(Rgba8::new(1, 2, 3, 255), 256).unwrap();
        palette.insert(Rgba8::new(4, 5, 6, 255), 256).unwrap();

        let mut buf = Vec::new();
        palette.save(Cursor::new(&mut buf)).unwrap();
        let loaded = Palette::load(Cursor::new(&buf)).unwrap();
        assert_eq!(loaded.colors(), palette.colors());
    }

    #[test]
    fn load_accepts_legacy_texture_magic() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&LEGACY_TEXTURE_MAGIC);
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&Rgba8::BLACK.to_argb_u32().to_le_bytes());
        let loaded = Palette::load(Cursor::new(&buf)).unwrap();
        assert_eq!(loaded.len(), 1);
    }

    #[test]
    fn load_rejects_unknown_magic() {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"XXXX");
        buf.extend_from_slice(&0u16.to_le_bytes());
        assert!(Palette::load(Cursor::new(&buf)).is_err());
    }
}
