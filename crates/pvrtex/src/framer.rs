use std::io::{Read, Seek, Write};

use binrw::{BinRead, BinWrite};
use easyerr::ResultExt;

use crate::error::{PvrtexError, PvrtexErrorCtx};
use crate::format::TextureType;

const TEXTURE_MAGIC: [u8; 4] = *b"DTEX";
const ALIGNMENT: usize = 32;

#[derive(Debug, Clone, Copy, BinRead, BinWrite)]
#[brw(little)]
struct RawHeader {
    magic: [u8; 4],
    width: i16,
    height: i16,
    texture_type: u32,
    size: i32,
}

#[derive(Debug, Clone, Copy)]
pub struct TextureHeader {
    pub width: u16,
    pub height: u16,
    pub texture_type: TextureType,
    pub size: u32,
}

/// Writes a framed texture: header followed by `payload`, zero-padded up to
/// the next 32-byte boundary.
pub fn write<W: Write + Seek>(
    mut out: W,
    header: TextureHeader,
    payload: &[u8],
) -> Result<(), PvrtexError> {
    let raw = RawHeader {
        magic: TEXTURE_MAGIC,
        width: header.width as i16,
        height: header.height as i16,
        texture_type: header.texture_type.to_bits(),
        size: header.size as i32,
    };
    raw.write(&mut out).context(PvrtexErrorCtx::Binrw)?;
    out.write_all(payload).context(PvrtexErrorCtx::Io)?;

    let padded_len = payload.len().div_ceil(ALIGNMENT) * ALIGNMENT;
    if padded_len > payload.len() {
        let zeros = vec![0u8; padded_len - payload.len()];
        out.write_all(&zeros).context(PvrtexErrorCtx::Io)?;
    }
    Ok(())
}

/// Reads a framed texture's header and its (unpadded-reported) payload.
pub fn read<R: Read + Seek>(mut input: R) -> Result<(TextureHeader, Vec<u8>), PvrtexError> {
    let raw = RawHeader::read(&mut input).context(PvrtexErrorCtx::Binrw)?;
    if raw.magic != TEXTURE_MAGIC {
        return Err(PvrtexError::BadMagic { found: raw.magic });
    }

    let header = TextureHeader {
        width: raw.width as u16,
        height: raw.height as u16,
        texture_type: TextureType::from_bits(raw.texture_type),
        size: raw.size as u32,
    };

    let padded_len = (header.size as usize).div_ceil(ALIGNMENT) * ALIGNMENT;
    let mut payload = vec![0u8; padded_len];
    input.read_exact(&mut payload).context(PvrtexErrorCtx::Io)?;
    payload.truncate(header.size as usize);

    Ok((header, payload))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::format::PixelFormat;
    use std::io::Cursor;

    #[test]
    fn header_round_trips() {
        let header = TextureHeader {
            width: 64,
            height: 64,
            texture_type: TextureType::new().with_pixel_format(PixelFormat::Rgb565),
            size: 8192,
        };
        let payload = vec![0xABu8; 8192];

        let mut buf = Vec::new();
        write(Cursor::new(&mut buf), header, &payload).unwrap();
        let (read_header, read_payload) = read(Cursor::new(&buf)).unwrap();

        assert_eq!(read_header.width, header.width);
        assert_eq!(read_header.height, header.height);
        assert_eq!(read_header.texture_type, header.texture_type);
        assert_eq!(read_payload, payload);
    }

    #[test]
    fn payload_is_padded_to_32_bytes() {
        let header = TextureHeader {
            width: 2,
            height: 2,
            texture_type: TextureType::new().with_pixel_format(PixelFormat::Argb1555),
            size: 8,
        };
        let mut buf = Vec::new();
        write(Cursor::new(&mut buf), header, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        // 12-byte header + 32-byte padded payload
        assert_eq!(buf.len(), std::mem::size_of::<RawHeader>() + 32);
    }

    #[test]
    fn rejects_bad_magic() {
        let mut buf = vec![b'X', b'X', b'X', b'X'];
        buf.extend_from_slice(&0i16.to_le_bytes());
        buf.extend_from_slice(&0i16.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0i32.to_le_bytes());
        assert!(read(Cursor::new(&buf)).is_err());
    }
}
