//! The hardware clears the screen with tile 0xFF, so that slot must always hold a blank tile.

use super::Sources;
use crate::{
    colour::SENTINEL24,
    error::{CompileError, Result},
    raster::TileRaster,
    tile::{matrix_ids, Tile, TileSet},
};

pub const BLANK_SLOT: u32 = 0xff;

pub fn sources(tiles: &mut TileSet) -> Sources {
    let id = tiles.push(Tile::new(TileRaster::solid(SENTINEL24)));

    let mut sources = Sources::default();
    sources.push(vec![vec![vec![Some(id)]]]);
    sources
}

pub fn set_fixed_positions(sources: &Sources, tiles: &mut TileSet) -> Result<()> {
    for id in sources.matrices.iter().flat_map(matrix_ids) {
        let tile = tiles.tile_mut(id);
        if !tile.raster.is_blank() {
            return Err(CompileError::NotBlank(format!(
                "tile {} reserved for slot 0xff is not blank",
                id
            )));
        }
        tile.fixed_slot = Some(BLANK_SLOT);
    }
    Ok(())
}
