//! Stretches the fixed-resolution framebuffer to the window surface.
//! Nearest-neighbor keeps the raycaster's hard texel edges.

use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};

/// Precomputed source coordinate for every destination pixel.
pub struct ScaleMap {
    src_x: Vec<usize>,
    src_row: Vec<usize>,
}

impl ScaleMap {
    pub fn empty() -> Self {
        Self {
            src_x: Vec::new(),
            src_row: Vec::new(),
        }
    }
}

pub fn build_scale_map(dst_w: usize, dst_h: usize, src_w: usize, src_h: usize) -> ScaleMap {
    let src_x = (0..dst_w)
        .map(|x| (x * src_w / dst_w).min(src_w - 1))
        .collect();
    let src_row = (0..dst_h)
        .map(|y| (y * src_h / dst_h).min(src_h - 1) * src_w)
        .collect();
    ScaleMap { src_x, src_row }
}

/// Nearest-neighbor stretch; rows in parallel for cache friendly writes.
pub fn blit_nearest(dst: &mut [u32], dst_w: usize, src: &[u32], map: &ScaleMap) {
    dst.par_chunks_mut(dst_w).enumerate().for_each(|(y, row)| {
        let src_row = &src[map.src_row[y]..];
        for (x, px) in row.iter_mut().enumerate() {
            *px = src_row[map.src_x[x]];
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubling_repeats_each_source_pixel() {
        // 2x2 source, 4x4 destination
        let src = vec![1u32, 2, 3, 4];
        let map = build_scale_map(4, 4, 2, 2);
        let mut dst = vec![0u32; 16];
        blit_nearest(&mut dst, 4, &src, &map);
        assert_eq!(dst, vec![1, 1, 2, 2, 1, 1, 2, 2, 3, 3, 4, 4, 3, 3, 4, 4]);
    }

    #[test]
    fn identity_scale_copies() {
        let src = vec![5u32, 6, 7, 8, 9, 10];
        let map = build_scale_map(3, 2, 3, 2);
        let mut dst = vec![0u32; 6];
        blit_nearest(&mut dst, 3, &src, &map);
        assert_eq!(dst, src);
    }

    #[test]
    fn downscale_stays_in_bounds() {
        let src = vec![0xABu32; 64 * 48];
        let map = build_scale_map(10, 7, 64, 48);
        let mut dst = vec![0u32; 70];
        blit_nearest(&mut dst, 10, &src, &map);
        assert!(dst.iter().all(|&px| px == 0xAB));
    }
}
