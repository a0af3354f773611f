//! # Tile Rasters
//!
//! Pixel access for 8x8 tiles cut out of source PNGs. The pipeline never mutates a raster, it only
//! reads RGBA pixels from it.

use std::path::Path;

use image::{imageops, Rgba, RgbaImage};

use crate::{
    colour::SENTINEL24,
    error::{CompileError, Result},
};

pub const TILE_SIZE_PX: u32 = 8;
pub const PIXELS_PER_TILE: usize = (TILE_SIZE_PX * TILE_SIZE_PX) as usize;

#[derive(Clone, Debug, PartialEq)]
pub struct TileRaster {
    image: RgbaImage,
}

impl TileRaster {
    pub fn new(image: RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        if width != TILE_SIZE_PX || height != TILE_SIZE_PX {
            return Err(CompileError::BadTileSize {
                expected: TILE_SIZE_PX,
                width,
                height,
            });
        }
        Ok(TileRaster { image })
    }

    /// A tile where every pixel is `colour`
    pub fn solid(colour: Rgba<u8>) -> Self {
        TileRaster {
            image: RgbaImage::from_pixel(TILE_SIZE_PX, TILE_SIZE_PX, colour),
        }
    }

    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnMut(u32, u32) -> Rgba<u8>,
    {
        TileRaster {
            image: RgbaImage::from_fn(TILE_SIZE_PX, TILE_SIZE_PX, f),
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba<u8> {
        *self.image.get_pixel(x, y)
    }

    /// Pixels in row-major order
    pub fn pixels(&self) -> impl Iterator<Item = Rgba<u8>> + '_ {
        self.image.pixels().copied()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Blank means every pixel is either fully transparent or the sentinel colour
    pub fn is_blank(&self) -> bool {
        self.pixels().all(|p| p[3] == 0 || p == SENTINEL24)
    }
}

pub fn load_image(path: &Path) -> Result<RgbaImage> {
    Ok(image::open(path)?.to_rgba8())
}

/// Cut an image into a row-major matrix of 8x8 tiles
pub fn split_into_tiles(image: &RgbaImage, path: &Path) -> Result<Vec<Vec<TileRaster>>> {
    let (width, height) = image.dimensions();
    if width % TILE_SIZE_PX != 0 || height % TILE_SIZE_PX != 0 {
        return Err(CompileError::NotTileAligned {
            path: path.to_path_buf(),
            width,
            height,
            tile: TILE_SIZE_PX,
        });
    }

    (0..height)
        .step_by(TILE_SIZE_PX as usize)
        .map(|y| {
            (0..width)
                .step_by(TILE_SIZE_PX as usize)
                .map(|x| {
                    let crop = imageops::crop_imm(image, x, y, TILE_SIZE_PX, TILE_SIZE_PX);
                    TileRaster::new(crop.to_image())
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn splits_row_major() {
        let image = RgbaImage::from_fn(16, 8, |x, _| {
            if x < 8 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });

        let tiles = split_into_tiles(&image, &PathBuf::from("test.png")).unwrap();
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].len(), 2);
        assert_eq!(tiles[0][0].pixel(7, 7), Rgba([255, 0, 0, 255]));
        assert_eq!(tiles[0][1].pixel(0, 0), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn rejects_unaligned_images() {
        let image = RgbaImage::new(12, 8);
        let err = split_into_tiles(&image, &PathBuf::from("odd.png")).unwrap_err();
        assert!(matches!(err, CompileError::NotTileAligned { width: 12, .. }));
    }

    #[test]
    fn blank_allows_sentinel_and_clear_pixels() {
        assert!(TileRaster::solid(SENTINEL24).is_blank());
        assert!(TileRaster::solid(Rgba([10, 20, 30, 0])).is_blank());

        let speck = TileRaster::from_fn(|x, y| {
            if x == 3 && y == 3 {
                Rgba([0, 0, 0, 255])
            } else {
                SENTINEL24
            }
        });
        assert!(!speck.is_blank());
    }

    #[test]
    fn rejects_wrong_raster_size() {
        assert!(TileRaster::new(RgbaImage::new(8, 8)).is_ok());
        assert!(TileRaster::new(RgbaImage::new(16, 16)).is_err());
    }
}
