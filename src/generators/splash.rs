//! # System Splash Screen
//!
//! The boot splash is drawn by the system firmware from hard-coded slots with a hard-coded
//! palette, so its artwork is encoded against that palette and pinned exactly where the firmware
//! expects it.
//!
//! Coarse store: the 15x4 tile main logo. Its top-right and bottom-right tiles are never drawn
//! and must be blank; the other 58 tiles fill slots 0..=57.
//!
//! Fine store: up to four optional banners, each with its own slot table.

use std::path::Path;

use log::debug;

use super::{load_rasters, push_matrix, Sources};
use crate::{
    colour::{to_colour16_ignore_dark, Colour16, SENTINEL16},
    error::{CompileError, Result},
    job::SplashSpec,
    palette::Palette,
    raster::{TileRaster, TILE_SIZE_PX},
    tile::{Store, Tile, TileSet},
};

/// The firmware palette in its final, post-fade state. Slot 0 is the sentinel rather than the
/// firmware's black so sentinel pixels map to index 0.
const SPLASH_PALETTE: [u16; 16] = [
    SENTINEL16.0,
    0x0fff,
    0x0ddd,
    0x0aaa,
    0x7555,
    0x306e,
    0x0000,
    0x0000,
    0x0000,
    0x0000,
    0x0000,
    0x0000,
    0x0000,
    0x0000,
    0x0000,
    0x0000,
];

const MAIN_LOGO_SIZE_TILES: (u32, u32) = (15, 4);
const MAIN_LOGO_DROPPED_COLUMN: usize = 14;

const MAIN_LOGO_POSITIONS: &[&[u32]] = &[
    &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13],
    &[14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27, 28],
    &[29, 30, 31, 32, 33, 34, 35, 36, 37, 38, 39, 40, 41, 42, 43],
    &[44, 45, 46, 47, 48, 49, 50, 51, 52, 53, 54, 55, 56, 57],
];

/// Fixed layout for one fine-store splash image
struct BannerLayout {
    size_tiles: (u32, u32),
    positions: &'static [&'static [u32]],
    /// (row, column) of a tile that lands on 0xFF, which the hardware also uses to clear the screen
    ff_tile: Option<(usize, usize)>,
}

static MEGA_BANNER: BannerLayout = BannerLayout {
    size_tiles: (15, 2),
    positions: &[
        &[
            0x05, 0x07, 0x09, 0x0b, 0x0d, 0x0f, 0x15, 0x17, 0x19, 0x1b, 0x1d, 0x1f, 0x5e, 0x60,
            0x7d,
        ],
        &[
            0x06, 0x08, 0x0a, 0x0c, 0x0e, 0x14, 0x16, 0x18, 0x1a, 0x1c, 0x1e, 0x40, 0x5f, 0x7c,
            0x7e,
        ],
    ],
    ff_tile: None,
};

static SPEC_BANNER: BannerLayout = BannerLayout {
    size_tiles: (17, 2),
    positions: &[
        &[
            0x7f, 0x9a, 0x9c, 0x9e, 0xff, 0xbb, 0xbd, 0xbf, 0xda, 0xdc, 0xde, 0xfa, 0xfc, 0x100,
            0x102, 0x104, 0x106,
        ],
        &[
            0x99, 0x9b, 0x9d, 0x9f, 0xba, 0xbc, 0xbe, 0xd9, 0xdb, 0xdd, 0xdf, 0xfb, 0xfd, 0x101,
            0x103, 0x105, 0x107,
        ],
    ],
    ff_tile: Some((0, 4)),
};

static COMPANY_LOGO: BannerLayout = BannerLayout {
    size_tiles: (10, 3),
    positions: &[
        &[0x200, 0x201, 0x202, 0x203, 0x204, 0x205, 0x206, 0x207, 0x208, 0x209],
        &[0x20a, 0x20b, 0x20c, 0x20d, 0x20e, 0x20f, 0x214, 0x215, 0x216, 0x217],
        &[0x218, 0x219, 0x21a, 0x21b, 0x21c, 0x21d, 0x21e, 0x21f, 0x240, 0x25e],
    ],
    ff_tile: None,
};

static COPYRIGHT: BannerLayout = BannerLayout {
    size_tiles: (1, 1),
    positions: &[&[0x7b]],
    ff_tile: None,
};

pub fn splash_palette() -> Palette {
    Palette::fixed(SPLASH_PALETTE.iter().copied().map(Colour16).collect())
}

/// The fine-store images present in `spec`, in a fixed order
fn banners(spec: &SplashSpec) -> Vec<(&'static BannerLayout, &str)> {
    [
        (&MEGA_BANNER, &spec.mega_banner_image_file),
        (&SPEC_BANNER, &spec.spec_banner_image_file),
        (&COMPANY_LOGO, &spec.company_logo_image_file),
        (&COPYRIGHT, &spec.copyright_image_file),
    ]
    .into_iter()
    .filter_map(|(layout, file)| file.as_deref().map(|f| (layout, f)))
    .collect()
}

pub fn sources(
    spec: &SplashSpec,
    store: Store,
    root: &Path,
    tiles: &mut TileSet,
) -> Result<Sources> {
    let mut sources = Sources::default();

    match store {
        Store::Coarse => {
            let mut rasters = load_splash(root, &spec.main_logo_image_file, MAIN_LOGO_SIZE_TILES)?;

            let last = rasters.len() - 1;
            for row in [0, last] {
                let dropped = rasters[row].remove(MAIN_LOGO_DROPPED_COLUMN);
                ensure_blank(
                    &dropped,
                    format!(
                        "splash main logo {}: the {} right tile is thrown away and must be blank",
                        spec.main_logo_image_file,
                        if row == 0 { "upper" } else { "lower" }
                    ),
                )?;
            }

            sources.push(vec![push_matrix(rasters, tiles, pin_to_system_palette(0))]);
        }
        Store::Fine => {
            for (layout, file) in banners(spec) {
                let rasters = load_splash(root, file, layout.size_tiles)?;

                if let Some((y, x)) = layout.ff_tile {
                    ensure_blank(
                        &rasters[y][x],
                        format!(
                            "splash banner {}: tile at 0xff ({}px,{}px) must be blank",
                            file,
                            x as u32 * TILE_SIZE_PX,
                            y as u32 * TILE_SIZE_PX
                        ),
                    )?;
                }

                // splash tiles beat anything else wanting the same slot
                sources.push(vec![push_matrix(rasters, tiles, pin_to_system_palette(i64::MAX))]);
            }
        }
    }

    Ok(sources)
}

pub fn set_fixed_positions(
    spec: &SplashSpec,
    store: Store,
    sources: &Sources,
    tiles: &mut TileSet,
) -> Result<()> {
    let layouts: Vec<&[&[u32]]> = match store {
        Store::Coarse => vec![MAIN_LOGO_POSITIONS],
        Store::Fine => banners(spec).into_iter().map(|(layout, _)| layout.positions).collect(),
    };

    for (positions, matrix) in layouts.into_iter().zip(&sources.matrices) {
        for (row, slots) in matrix.iter().zip(positions) {
            for (cell, &slot) in row.iter().zip(slots.iter()) {
                if let Some(id) = *cell {
                    tiles.tile_mut(id).fixed_slot = Some(slot);
                }
            }
        }
    }

    debug!("Pinned splash tiles for the {:?} store", store);
    Ok(())
}

fn pin_to_system_palette(priority: i64) -> impl Fn(&mut Tile) {
    move |tile| {
        tile.preset_palette = Some(splash_palette());
        tile.emit_palette = false;
        tile.ignore_dark_bit = true;
        tile.priority = priority;
    }
}

/// Load a splash image, checking its size and that the firmware palette can draw it
fn load_splash(root: &Path, file: &str, size_tiles: (u32, u32)) -> Result<Vec<Vec<TileRaster>>> {
    let path = root.join(file);
    let rasters = load_rasters(root, file)?;

    let height = rasters.len() as u32 * TILE_SIZE_PX;
    let width = rasters.first().map_or(0, |r| r.len() as u32) * TILE_SIZE_PX;
    let expected_width = size_tiles.0 * TILE_SIZE_PX;
    let expected_height = size_tiles.1 * TILE_SIZE_PX;
    if width != expected_width || height != expected_height {
        return Err(CompileError::SplashSize {
            path,
            expected_width,
            expected_height,
            width,
            height,
        });
    }

    let palette = splash_palette();
    let drawable = rasters
        .iter()
        .flatten()
        .flat_map(|raster| raster.pixels())
        .filter(|p| p[3] != 0)
        .all(|p| palette.contains(to_colour16_ignore_dark(p)));
    if !drawable {
        return Err(CompileError::SplashPalette(path));
    }

    Ok(rasters)
}

fn ensure_blank(raster: &TileRaster, message: String) -> Result<()> {
    if raster.is_blank() {
        Ok(())
    } else {
        Err(CompileError::NotBlank(message))
    }
}
