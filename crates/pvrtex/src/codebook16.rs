use color::Rgba8;
use pvrvq::{CodeUsage, Vector, VectorQuantizer};

use crate::dedup::dedup_blocks;

const TARGET_SIZE: usize = 256;

/// A 2x2 pixel block, the unit the 16bpp vector quantizer clusters.
/// Corner order is load-bearing: codebook records are written out in this
/// same `top-left, bottom-left, top-right, bottom-right` order, matching
/// how the texture unit walks a compressed block.
#[derive(Debug, Clone, Copy)]
pub struct Block2x2 {
    pub top_left: Rgba8,
    pub bottom_left: Rgba8,
    pub top_right: Rgba8,
    pub bottom_right: Rgba8,
}

impl Block2x2 {
    fn corners(self) -> [Rgba8; 4] {
        [self.top_left, self.bottom_left, self.top_right, self.bottom_right]
    }

    fn to_vector(self) -> Vector<16> {
        let mut out = [0.0f32; 16];
        for (i, corner) in self.corners().into_iter().enumerate() {
            for (c, channel) in corner.channels().into_iter().enumerate() {
                out[i * 4 + c] = f32::from(channel);
            }
        }
        Vector::new(out)
    }

    fn from_vector(v: &Vector<16>) -> Self {
        let mut corners = [Rgba8::default(); 4];
        for (i, corner) in corners.iter_mut().enumerate() {
            let mut channels = [0u8; 4];
            for (c, channel) in channels.iter_mut().enumerate() {
                *channel = color::clamp255(v.components[i * 4 + c]);
            }
            *corner = Rgba8::from_channels(channels);
        }
        Self {
            top_left: corners[0],
            bottom_left: corners[1],
            top_right: corners[2],
            bottom_right: corners[3],
        }
    }
}

/// A trained 16bpp codebook: up to 256 entries, each a [`Block2x2`] encoded
/// to the target pixel format as four 16-bit values in corner order.
pub struct Codebook16 {
    entries: Vec<[u16; 4]>,
}

impl Codebook16 {
    /// Builds a codebook for `blocks`, encoding each corner with `encode`.
    /// Tries the lossless dedup fast path first; falls back to vector
    /// quantization when more than 256 distinct blocks are present. Returns
    /// the codebook, one index byte per input block, and per-entry usage
    /// stats (exact, zero error, for the dedup path).
    pub fn train(
        blocks: &[Block2x2],
        encode: impl Fn(Rgba8) -> u16 + Copy,
    ) -> (Self, Vec<u8>, Vec<CodeUsage>) {
        let raw_blocks: Vec<[u32; 4]> = blocks
            .iter()
            .map(|b| b.corners().map(Rgba8::to_argb_u32))
            .collect();

        if let Some((unique, indices)) = dedup_blocks(&raw_blocks) {
            tracing::debug!(codes = unique.len(), "16bpp: lossless dedup fast path");
            let entries: Vec<[u16; 4]> = unique
                .into_iter()
                .map(|corners| corners.map(|argb| encode(Rgba8::from_argb_u32(argb))))
                .collect();
            let usage = usage_from_indices(entries.len(), &indices);
            return (Self { entries }, indices, usage);
        }

        let vectors: Vec<Vector<16>> = blocks.iter().map(|b| b.to_vector()).collect();
        let vq = VectorQuantizer::train(&vectors, TARGET_SIZE, 1e-4);
        let entries = vq
            .codebook()
            .iter()
            .map(|v| Block2x2::from_vector(v).corners().map(encode))
            .collect();
        let indices = vectors.iter().map(|v| vq.nearest(v) as u8).collect();
        let usage = vq.usage_report(&vectors);

        (Self { entries }, indices, usage)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serializes the codebook as a fixed 256-entry, 8-byte-per-record
    /// table; slots past the trained entries are zero-filled.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(TARGET_SIZE * 8);
        for i in 0..TARGET_SIZE {
            let entry = self.entries.get(i).copied().unwrap_or([0u16; 4]);
            for value in entry {
                out.extend_from_slice(&value.to_le_bytes());
            }
        }
        out
    }
}

fn usage_from_indices(codebook_len: usize, indices: &[u8]) -> Vec<CodeUsage> {
    let mut usage = vec![CodeUsage::default(); codebook_len];
    for &idx in indices {
        usage[idx as usize].use_count += 1;
    }
    usage
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pixel::{decode_rgb565, encode_rgb565};

    fn flat_block(color: Rgba8) -> Block2x2 {
        Block2x2 { top_left: color, bottom_left: color, top_right: color, bottom_right: color }
    }

    #[test]
    fn dedup_fast_path_for_small_palettes() {
        let blocks = vec![
            flat_block(Rgba8::new(255, 0, 0, 255)),
            flat_block(Rgba8::new(255, 0, 0, 255)),
            flat_block(Rgba8::new(0, 255, 0, 255)),
        ];
        let (codebook, indices, usage) = Codebook16::train(&blocks, encode_rgb565);
        assert_eq!(codebook.len(), 2);
        assert_eq!(indices, vec![0, 0, 1]);
        assert_eq!(usage[0].use_count, 2);
        assert_eq!(usage[1].use_count, 1);
    }

    #[test]
    fn falls_back_to_vq_past_256_distinct_blocks() {
        let blocks: Vec<Block2x2> = (0..300)
            .map(|i| flat_block(Rgba8::new((i % 256) as u8, ((i * 3) % 256) as u8, 0, 255)))
            .collect();
        let (codebook, indices, usage) = Codebook16::train(&blocks, encode_rgb565);
        assert!(codebook.len() <= 256);
        assert_eq!(indices.len(), blocks.len());
        assert_eq!(usage.len(), codebook.len());
    }

    #[test]
    fn record_bytes_are_a_fixed_256_entry_table() {
        let blocks = vec![flat_block(Rgba8::new(10, 20, 30, 255))];
        let (codebook, _, _) = Codebook16::train(&blocks, encode_rgb565);
        let bytes = codebook.to_bytes();
        assert_eq!(bytes.len(), 256 * 8);
        let word = u16::from_le_bytes([bytes[0], bytes[1]]);
        let decoded = decode_rgb565(word);
        assert!(decoded.r.abs_diff(10) <= 8);
        // unused slots are zero-filled.
        assert_eq!(&bytes[8..16], &[0u8; 8]);
    }
}
