use std::collections::HashMap;

/// Deduplicates a sequence of fixed-size pixel blocks, returning an
/// insertion-ordered codebook plus one index per input block. This is the
/// fast path ahead of the vector quantizer: if an image's 2x2 (or 2x4)
/// blocks contain 256 or fewer distinct values, the codebook can be built
/// losslessly without running any clustering at all.
///
/// Returns `None` if more than 256 distinct blocks are present.
pub fn dedup_blocks<const N: usize>(blocks: &[[u32; N]]) -> Option<(Vec<[u32; N]>, Vec<u8>)> {
    let mut codebook = Vec::new();
    let mut seen: HashMap<[u32; N], u8> = HashMap::new();
    let mut indices = Vec::with_capacity(blocks.len());

    for block in blocks {
        let idx = match seen.get(block) {
            Some(&idx) => idx,
            None => {
                if codebook.len() >= 256 {
                    return None;
                }
                let idx = codebook.len() as u8;
                codebook.push(*block);
                seen.insert(*block, idx);
                idx
            }
        };
        indices.push(idx);
    }

    Some((codebook, indices))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn coalesces_repeated_blocks() {
        let blocks = vec![[1, 2, 3, 4], [1, 2, 3, 4], [5, 6, 7, 8]];
        let (codebook, indices) = dedup_blocks(&blocks).unwrap();
        assert_eq!(codebook.len(), 2);
        assert_eq!(indices, vec![0, 0, 1]);
    }

    #[test]
    fn fails_past_256_distinct_blocks() {
        let blocks: Vec<[u32; 1]> = (0..300).map(|i| [i]).collect();
        assert!(dedup_blocks(&blocks).is_none());
    }

    #[test]
    fn indices_reference_valid_codebook_entries() {
        let blocks = vec![[9, 9], [1, 1], [9, 9], [2, 2]];
        let (codebook, indices) = dedup_blocks(&blocks).unwrap();
        for (block, &idx) in blocks.iter().zip(&indices) {
            assert_eq!(&codebook[idx as usize], block);
        }
    }
}
