//! Human-inspection decoding: a single preview image laying out a mipmap
//! chain, and a code-usage colormap showing which codebook entry backs
//! each compressed block.

use color::Rgba8;
use pvrimage::Image;

/// Fixed 256-entry colormap for `--vqcodeusage` renders, one distinct hue
/// per codebook slot so code reuse is visible at a glance.
pub static CODE_USAGE_COLORS: [Rgba8; 256] = build_code_usage_colors();

const fn build_code_usage_colors() -> [Rgba8; 256] {
    let mut colors = [Rgba8 { r: 0, g: 0, b: 0, a: 255 }; 256];
    let mut i = 0;
    while i < 256 {
        // six 42-step hue bands through R->Y->G->C->B->M, const-evaluable.
        let band = i / 43;
        let step = (i % 43) as u32 * 6;
        let (r, g, b) = match band {
            0 => (255, step as u8, 0),
            1 => (255u32.saturating_sub(step) as u8, 255, 0),
            2 => (0, 255, step as u8),
            3 => (0, 255u32.saturating_sub(step) as u8, 255),
            4 => (step as u8, 0, 255),
            _ => (255, 0, 255u32.saturating_sub(step) as u8),
        };
        colors[i] = Rgba8 { r, g, b, a: 255 };
        i += 1;
    }
    colors
}

/// Lays out a mipmap chain into one preview image: the base level at the
/// origin, and every smaller level stacked vertically to its right. The
/// canvas is 1.5x the base width, since the largest remaining mip after the
/// base is half its size and every level after that fits in the same
/// column.
#[must_use]
pub fn render_mipmap_chain(levels: &[Image]) -> Image {
    let base = &levels[0];
    let canvas_width = base.width() + base.width() / 2;
    let canvas_height = base.height();

    let mut pixels = vec![Rgba8::BLACK; (canvas_width * canvas_height) as usize];
    blit(&mut pixels, canvas_width, 0, 0, base);

    let mut y_cursor = 0;
    for level in &levels[1..] {
        blit(&mut pixels, canvas_width, base.width(), y_cursor, level);
        y_cursor += level.height();
    }

    Image::new_direct(canvas_width, canvas_height, pixels).expect("canvas sized from real levels")
}

fn blit(dst: &mut [Rgba8], dst_width: u32, x0: u32, y0: u32, src: &Image) {
    for y in 0..src.height() {
        for x in 0..src.width() {
            let color = if src.is_indexed() {
                // indexed previews render as grayscale index ramps; callers
                // that need true colors should resolve through a palette
                // before calling this.
                let idx = src.get_index(x, y);
                Rgba8::new(idx, idx, idx, 255)
            } else {
                src.get_pixel(x, y)
            };
            dst[((y0 + y) * dst_width + (x0 + x)) as usize] = color;
        }
    }
}

/// Renders a block-granularity image where each block is filled with its
/// codebook index's color from [`CODE_USAGE_COLORS`]. `block_width` and
/// `block_height` give the block grid dimensions in blocks, not pixels.
#[must_use]
pub fn render_code_usage(block_width: u32, block_height: u32, indices: &[u8]) -> Image {
    let pixels = indices
        .iter()
        .map(|&idx| CODE_USAGE_COLORS[idx as usize])
        .collect();
    Image::new_direct(block_width, block_height, pixels).expect("indices sized to block grid")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn mipmap_chain_canvas_is_one_and_half_times_base_width() {
        let levels = vec![
            Image::new_direct(8, 8, vec![Rgba8::WHITE; 64]).unwrap(),
            Image::new_direct(4, 4, vec![Rgba8::BLACK; 16]).unwrap(),
        ];
        let preview = render_mipmap_chain(&levels);
        assert_eq!(preview.width(), 12);
        assert_eq!(preview.height(), 8);
    }

    #[test]
    fn base_level_lands_at_origin() {
        let levels = vec![Image::new_direct(2, 2, vec![Rgba8::WHITE; 4]).unwrap()];
        let preview = render_mipmap_chain(&levels);
        assert_eq!(preview.get_pixel(0, 0), Rgba8::WHITE);
    }

    #[test]
    fn code_usage_colors_are_distinct_for_distinct_indices() {
        assert_ne!(CODE_USAGE_COLORS[0], CODE_USAGE_COLORS[128]);
    }

    #[test]
    fn code_usage_render_matches_block_grid() {
        let indices = vec![0u8, 1, 2, 3];
        let img = render_code_usage(2, 2, &indices);
        assert_eq!((img.width(), img.height()), (2, 2));
    }
}
