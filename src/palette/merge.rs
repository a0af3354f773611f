//! # Palette Merging
//!
//! Groups tiles by their canonical palette, then greedily folds groups together while the union
//! still fits in 16 colours. The pass is a single left-to-right sweep in discovery order: it is
//! deterministic for a given input order but makes no attempt at an optimal packing.

use std::{collections::HashMap, path::Path};

use log::debug;

use super::{
    extract::{confirm_colour_limit, palette16, Transparency},
    Palette, COLOURS_PER_PALETTE,
};
use crate::{
    error::Result,
    tile::{TileId, TileSet},
};

/// Tiles sharing one working palette
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteGroup {
    pub palette: Palette,
    pub tiles: Vec<TileId>,
}

/// The store's palette bank plus what each tile was given
#[derive(Clone, Debug, Default)]
pub struct PaletteAssignment {
    /// Finalized palettes, each exactly 16 entries
    pub bank: Vec<Palette>,
    /// Indexed by [`TileId`]. Non-emitting tiles carry their preset palette, if any.
    pub tile_palettes: Vec<Option<Palette>>,
    /// Indexed by [`TileId`]. Already offset by the store's start index.
    pub palette_indices: Vec<Option<usize>>,
}

/// Bucket tiles by identical canonical palette, keeping first-discovery order
pub fn group_by_palette<I>(palettes: I) -> Vec<PaletteGroup>
where
    I: IntoIterator<Item = (TileId, Palette)>,
{
    let mut groups: Vec<PaletteGroup> = Vec::new();
    let mut lookup: HashMap<Palette, usize> = HashMap::new();

    for (id, palette) in palettes {
        match lookup.get(&palette) {
            Some(&g) => groups[g].tiles.push(id),
            None => {
                lookup.insert(palette.clone(), groups.len());
                groups.push(PaletteGroup { palette, tiles: vec![id] });
            }
        }
    }

    groups
}

/// Greedy merge. Group `i` absorbs every later group whose union with it still fits; an absorbed
/// group is removed and the scan continues at the same position.
pub fn merge_groups(mut groups: Vec<PaletteGroup>) -> Vec<PaletteGroup> {
    let mut i = 0;
    while i < groups.len() {
        let mut k = i + 1;
        while k < groups.len() {
            let union = groups[i].palette.merge(&groups[k].palette);
            if union.len() <= COLOURS_PER_PALETTE {
                let absorbed = groups.remove(k);
                groups[i].palette = union;
                groups[i].tiles.extend(absorbed.tiles);
            } else {
                k += 1;
            }
        }
        i += 1;
    }
    groups
}

/// Build the palette bank for one store and hand every tile its palette.
///
/// `start_index` is where this store's bank begins in the global bank.
pub fn assign_palettes(
    tiles: &TileSet,
    start_index: usize,
    is_transparent: Transparency,
    dump_dir: Option<&Path>,
) -> Result<PaletteAssignment> {
    let emitting: Vec<TileId> = (0..tiles.len())
        .filter(|&id| tiles.tile(id).emit_palette)
        .collect();

    confirm_colour_limit(
        emitting.iter().map(|&id| &tiles.tile(id).raster),
        is_transparent,
        dump_dir,
    )?;

    let groups = group_by_palette(emitting.iter().map(|&id| {
        let tile = tiles.tile(id);
        (id, palette16(&tile.raster, is_transparent, tile.ignore_dark_bit))
    }));
    let group_count = groups.len();
    let merged = merge_groups(groups);
    debug!("Merged {} distinct tile palettes into {}", group_count, merged.len());

    let mut assignment = PaletteAssignment {
        bank: Vec::with_capacity(merged.len()),
        tile_palettes: tiles.iter().map(|t| t.preset_palette.clone()).collect(),
        palette_indices: vec![None; tiles.len()],
    };

    for (position, group) in merged.into_iter().enumerate() {
        let finalized = group.palette.finalize()?;
        for id in group.tiles {
            assignment.tile_palettes[id] = Some(finalized.clone());
            assignment.palette_indices[id] = Some(start_index + position);
        }
        assignment.bank.push(finalized);
    }

    Ok(assignment)
}
