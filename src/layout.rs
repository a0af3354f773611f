//! # Layout Output
//!
//! Structured description of where everything ended up, written as JSON for whatever generates
//! code from it. Built from the denormalized view so duplicates report their canonical slot.

use serde::Serialize;
use serde_json::Value;

use crate::{
    dedupe::PlacedTile,
    palette::Palette,
    tile::{TileId, TileMatrix},
};

#[derive(Debug, Clone, Default, Serialize)]
pub struct Layout {
    /// The global palette bank: default black, then fine, then coarse
    pub palettes: Vec<Palette>,
    pub fine: Vec<GeneratorLayout>,
    pub coarse: Vec<GeneratorLayout>,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratorLayout {
    pub generator: &'static str,
    pub data: Value,
}

/// Where one tile landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileRef {
    pub index: Option<u32>,
    pub palette_index: Option<usize>,
}

impl TileRef {
    pub fn of<P>(placed: &[PlacedTile<P>], id: TileId) -> Self {
        let tile = &placed[id];
        TileRef {
            index: tile.slot,
            palette_index: tile.palette_index,
        }
    }
}

/// Map a tile matrix onto final slots, keeping empty cells empty
pub fn tile_refs<P>(matrix: &TileMatrix, placed: &[PlacedTile<P>]) -> Vec<Vec<Option<TileRef>>> {
    matrix
        .iter()
        .map(|row| row.iter().map(|cell| cell.map(|id| TileRef::of(placed, id))).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refs_follow_duplicates_and_keep_holes() {
        let placed = vec![
            PlacedTile {
                id: 0,
                slot: Some(4),
                duplicate_of: None,
                palette_index: Some(2),
                priority: 0,
                child_of: None,
                child_frames: Vec::new(),
                payload: (),
            },
            PlacedTile {
                id: 1,
                slot: Some(4),
                duplicate_of: Some(0),
                palette_index: Some(2),
                priority: 0,
                child_of: None,
                child_frames: Vec::new(),
                payload: (),
            },
        ];
        let matrix: TileMatrix = vec![vec![Some(0), None, Some(1)]];

        let refs = tile_refs(&matrix, &placed);
        let json = serde_json::to_value(&refs).unwrap();

        assert_eq!(
            json,
            serde_json::json!([[
                { "index": 4, "paletteIndex": 2 },
                null,
                { "index": 4, "paletteIndex": 2 }
            ]])
        );
    }
}
