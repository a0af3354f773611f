//! # Per-tile Palette Extraction
//!
//! Collects the distinct colours a tile actually uses and enforces the 16 colour cap before any
//! merging happens.

use std::{
    fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use image::Rgba;
use log::{debug, warn};

use super::{Palette, COLOURS_PER_PALETTE};
use crate::{
    colour::{to_colour16_with, SENTINEL24},
    error::{CompileError, Result},
    raster::TileRaster,
};

/// Store-specific test for "this pixel is see-through"
pub type Transparency = fn(Rgba<u8>) -> bool;

/// Distinct colours in first-seen order, sentinel always first.
///
/// Transparent pixels and sentinel pixels are skipped while scanning, the sentinel is then
/// prepended unconditionally.
pub fn palette24(raster: &TileRaster, is_transparent: Transparency) -> Vec<Rgba<u8>> {
    let mut colours = vec![SENTINEL24];

    for pixel in raster.pixels() {
        if pixel == SENTINEL24 || is_transparent(pixel) {
            continue;
        }
        if !colours.contains(&pixel) {
            colours.push(pixel);
        }
    }

    colours
}

/// The canonical 16-bit palette for a single tile
pub fn palette16(
    raster: &TileRaster,
    is_transparent: Transparency,
    ignore_dark_bit: bool,
) -> Palette {
    Palette::canonical(
        palette24(raster, is_transparent)
            .into_iter()
            .map(|c| to_colour16_with(c, ignore_dark_bit)),
    )
}

/// Fail if any tile needs more than 16 palette slots (sentinel included).
///
/// Offending tiles are written out as `tile-{n}-{colours}.png` so they can be fixed in the
/// source art. When `dump_dir` is `None` a fresh timestamped directory under the system temp
/// dir is used.
pub fn confirm_colour_limit<'a, I>(
    tiles: I,
    is_transparent: Transparency,
    dump_dir: Option<&Path>,
) -> Result<()>
where
    I: IntoIterator<Item = &'a TileRaster>,
{
    let bad_tiles: Vec<(&TileRaster, usize)> = tiles
        .into_iter()
        .map(|raster| (raster, palette24(raster, is_transparent).len()))
        .filter(|&(_, len)| len > COLOURS_PER_PALETTE)
        .collect();

    if bad_tiles.is_empty() {
        return Ok(());
    }

    let dir = dump_dir.map(Path::to_path_buf).unwrap_or_else(default_dump_dir);
    let written = match dump_bad_tiles(&dir, &bad_tiles) {
        Ok(()) => Some(dir),
        Err(e) => {
            warn!("Could not write bad tiles to {}: {}", dir.display(), e);
            None
        }
    };

    Err(CompileError::TooManyColours {
        count: bad_tiles.len(),
        dump_dir: written,
    })
}

fn default_dump_dir() -> PathBuf {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    std::env::temp_dir().join(format!("tilerom-bad-tiles-{}", millis))
}

fn dump_bad_tiles(dir: &Path, bad_tiles: &[(&TileRaster, usize)]) -> Result<()> {
    fs::create_dir_all(dir)?;

    for (i, (raster, len)) in bad_tiles.iter().enumerate() {
        let path = dir.join(format!("tile-{}-{}.png", i, len));
        raster.image().save(&path)?;
        debug!("Wrote over-cap tile to {}", path.display());
    }

    Ok(())
}
