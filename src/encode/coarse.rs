//! # Coarse Store Layout
//!
//! Each 8x8 tile becomes two 16 byte bitplane streams. The tile is split into 4x4 corners in the
//! order upper-right, lower-right, upper-left, lower-left. Every 8 pixel run of a corner (row
//! major) yields a pair of plane bytes where bit `p` holds one index bit of pixel `p`:
//!
//! - low stream: index bits 0 and 1
//! - high stream: index bits 2 and 3

use image::Rgba;

use super::StoreFormat;
use crate::{raster::PIXELS_PER_TILE, tile::Store};

pub const COARSE_BYTES_PER_STREAM: usize = 16;

const CORNER_SIZE_PX: usize = 4;
const TILE_WIDTH_PX: usize = 8;

/// Top-left pixel of each corner, in storage order
const CORNERS: [(usize, usize); 4] = [(4, 0), (4, 4), (0, 0), (0, 4)];

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CoarsePayload {
    pub low: [u8; COARSE_BYTES_PER_STREAM],
    pub high: [u8; COARSE_BYTES_PER_STREAM],
}

pub struct Coarse;

impl StoreFormat for Coarse {
    type Payload = CoarsePayload;

    const STORE: Store = Store::Coarse;

    /// Only a fully clear pixel counts, there is no alpha threshold
    fn is_transparent(pixel: Rgba<u8>) -> bool {
        pixel[3] == 0
    }

    fn pack(indices: &[u8; PIXELS_PER_TILE]) -> Self::Payload {
        let corners: Vec<u8> = CORNERS
            .iter()
            .flat_map(|&(cx, cy)| {
                (0..CORNER_SIZE_PX).flat_map(move |y| {
                    (0..CORNER_SIZE_PX).map(move |x| indices[(cy + y) * TILE_WIDTH_PX + cx + x])
                })
            })
            .collect();

        CoarsePayload {
            low: plane_bytes(&corners, 0),
            high: plane_bytes(&corners, 2),
        }
    }

    fn blank() -> Self::Payload {
        CoarsePayload {
            low: [0u8; COARSE_BYTES_PER_STREAM],
            high: [0u8; COARSE_BYTES_PER_STREAM],
        }
    }
}

fn plane_bytes(indices: &[u8], plane_offset: u8) -> [u8; COARSE_BYTES_PER_STREAM] {
    let mut out = [0u8; COARSE_BYTES_PER_STREAM];

    for (run, pair) in indices.chunks_exact(8).zip(out.chunks_exact_mut(2)) {
        for (p, &index) in run.iter().enumerate() {
            pair[0] |= ((index >> plane_offset) & 1) << p;
            pair[1] |= ((index >> (plane_offset + 1)) & 1) << p;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        colour::{Colour16, BLACK16, SENTINEL16, SENTINEL24},
        palette::Palette,
        raster::TileRaster,
        tile::Tile,
    };

    #[test]
    fn sentinel_tile_is_all_zero() {
        let palette = Palette::canonical([SENTINEL16, BLACK16]).finalize().unwrap();
        let tile = Tile::new(TileRaster::solid(SENTINEL24));
        assert_eq!(Coarse::encode(0, &tile, Some(&palette)).unwrap(), Coarse::blank());
    }

    #[test]
    fn index_fifteen_sets_every_bit() {
        let payload = Coarse::pack(&[15u8; PIXELS_PER_TILE]);
        assert_eq!(payload.low, [0xFF; 16]);
        assert_eq!(payload.high, [0xFF; 16]);
    }

    #[test]
    fn each_index_bit_lands_in_its_plane() {
        // index 0b0101: bits 0 and 2 set
        let payload = Coarse::pack(&[5u8; PIXELS_PER_TILE]);
        for pair in payload.low.chunks(2).chain(payload.high.chunks(2)) {
            assert_eq!(pair, &[0xFF, 0x00]);
        }
    }

    #[test]
    fn upper_right_corner_comes_first() {
        let mut indices = [0u8; PIXELS_PER_TILE];
        // first run of the upper-right corner is rows 0 and 1, x 4..8; light up (4, 0) and (7, 1)
        indices[4] = 1;
        indices[8 + 7] = 2;

        let payload = Coarse::pack(&indices);
        assert_eq!(payload.low[0], 0b0000_0001);
        assert_eq!(payload.low[1], 0b1000_0000);
        assert!(payload.low[2..].iter().all(|&b| b == 0));
        assert_eq!(payload.high, [0u8; 16]);
    }

    #[test]
    fn lower_left_corner_comes_last() {
        let mut indices = [0u8; PIXELS_PER_TILE];
        // (3, 7) is the final pixel of the lower-left corner
        indices[7 * 8 + 3] = 8;

        let payload = Coarse::pack(&indices);
        assert_eq!(payload.high[15], 0b1000_0000);
        assert!(payload.high[..15].iter().all(|&b| b == 0));
        assert_eq!(payload.low, [0u8; 16]);
    }

    #[test]
    fn half_clear_pixels_still_need_a_colour() {
        let palette = Palette::canonical([SENTINEL16, Colour16(0x8000)]);
        let tile = Tile::new(TileRaster::solid(Rgba([0, 0, 0, 128])));
        let payload = Coarse::encode(0, &tile, Some(&palette)).unwrap();
        assert_eq!(payload.low.to_vec(), [0xFF, 0x00].repeat(8));
    }
}
