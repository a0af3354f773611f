//! # Fine Store Layout
//!
//! 8x8 tiles at 4bpp, 32 bytes each. The tile is stored as four 2-pixel-wide columns in the
//! order `{4,5} {6,7} {0,1} {2,3}`. Each column is 8 bytes, one per row, with the left pixel in
//! the low nibble and the right pixel in the high nibble.

use image::Rgba;

use super::StoreFormat;
use crate::{
    raster::{PIXELS_PER_TILE, TILE_SIZE_PX},
    tile::Store,
};

pub const FINE_BYTES_PER_TILE: usize = 32;

/// Total size of the fine store image
pub const FINE_STORE_SIZE_BYTES: usize = 128 * 1024;

const COLUMN_PAIRS: [(usize, usize); 4] = [(4, 5), (6, 7), (0, 1), (2, 3)];

pub struct Fine;

impl StoreFormat for Fine {
    type Payload = [u8; FINE_BYTES_PER_TILE];

    const STORE: Store = Store::Fine;

    /// Anything short of fully opaque is see-through
    fn is_transparent(pixel: Rgba<u8>) -> bool {
        pixel[3] != 255
    }

    fn pack(indices: &[u8; PIXELS_PER_TILE]) -> Self::Payload {
        let width = TILE_SIZE_PX as usize;
        let mut out = [0u8; FINE_BYTES_PER_TILE];

        let bytes = COLUMN_PAIRS.iter().flat_map(|&(left, right)| {
            (0..width).map(move |y| {
                let lo = indices[y * width + left] & 0x0F;
                let hi = indices[y * width + right] & 0x0F;
                lo | (hi << 4)
            })
        });
        for (dst, byte) in out.iter_mut().zip(bytes) {
            *dst = byte;
        }

        out
    }

    fn blank() -> Self::Payload {
        [0u8; FINE_BYTES_PER_TILE]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        colour::{BLACK16, BLACK24, SENTINEL16, SENTINEL24},
        palette::Palette,
        raster::TileRaster,
        tile::Tile,
    };

    fn palette() -> Palette {
        Palette::canonical([SENTINEL16, BLACK16]).finalize().unwrap()
    }

    #[test]
    fn sentinel_tile_is_all_zero() {
        let tile = Tile::new(TileRaster::solid(SENTINEL24));
        assert_eq!(Fine::encode(0, &tile, Some(&palette())).unwrap(), [0u8; 32]);
    }

    #[test]
    fn black_tile_is_index_one_everywhere() {
        let tile = Tile::new(TileRaster::solid(BLACK24));
        assert_eq!(Fine::encode(0, &tile, Some(&palette())).unwrap(), [0x11u8; 32]);
    }

    #[test]
    fn packs_column_pairs_in_order() {
        // index = column number, so every row packs identically
        let mut indices = [0u8; PIXELS_PER_TILE];
        for (i, v) in indices.iter_mut().enumerate() {
            *v = (i % 8) as u8;
        }

        let packed = Fine::pack(&indices);
        assert!(packed[0..8].iter().all(|&b| b == 0x54));
        assert!(packed[8..16].iter().all(|&b| b == 0x76));
        assert!(packed[16..24].iter().all(|&b| b == 0x10));
        assert!(packed[24..32].iter().all(|&b| b == 0x32));
    }

    #[test]
    fn rows_run_top_to_bottom_within_a_column() {
        let mut indices = [0u8; PIXELS_PER_TILE];
        // pixel (4, y) = y
        for y in 0..8 {
            indices[y * 8 + 4] = y as u8;
        }

        let packed = Fine::pack(&indices);
        assert_eq!(&packed[0..8], &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert!(packed[8..].iter().all(|&b| b == 0));
    }

    #[test]
    fn semi_transparent_pixels_are_index_zero() {
        let tile = Tile::new(TileRaster::solid(Rgba([0, 0, 0, 254])));
        assert_eq!(Fine::encode(0, &tile, Some(&palette())).unwrap(), [0u8; 32]);
    }
}
