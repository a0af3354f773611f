//! # Tiles
//!
//! The tile arena for one store. Generators push tiles in and refer to them by [`TileId`]; every
//! back-reference (animation master, duplicate target) is an index into the same arena, so no
//! link can outlive or escape its store.

use std::collections::HashSet;

use serde::Serialize;

use crate::{
    error::{CompileError, Result},
    palette::Palette,
    raster::TileRaster,
};

/// Index of a tile within its store's [`TileSet`]
pub type TileId = usize;

/// Image -> row -> column. `None` marks a column with no tile.
pub type TileMatrix = Vec<Vec<Option<TileId>>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Store {
    Fine,
    Coarse,
}

#[derive(Clone, Debug)]
pub struct Tile {
    pub raster: TileRaster,
    /// Palette supplied up front, for tiles drawn against a fixed system palette
    pub preset_palette: Option<Palette>,
    /// Whether this tile takes part in palette merging and the emitted bank
    pub emit_palette: bool,
    pub ignore_dark_bit: bool,
    /// Slot pinned by a generator before allocation
    pub fixed_slot: Option<u32>,
    /// Fine store only, decides which tile wins a contested slot
    pub priority: i64,
    pub child_of: Option<TileId>,
    pub child_frames: Vec<TileId>,
}

impl Tile {
    pub fn new(raster: TileRaster) -> Self {
        Tile {
            raster,
            preset_palette: None,
            emit_palette: true,
            ignore_dark_bit: false,
            fixed_slot: None,
            priority: 0,
            child_of: None,
            child_frames: Vec::new(),
        }
    }

    /// Part of an animation group, either as master or as child
    pub fn is_animated(&self) -> bool {
        self.child_of.is_some() || !self.child_frames.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct TileSet {
    tiles: Vec<Tile>,
}

impl TileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, tile: Tile) -> TileId {
        self.tiles.push(tile);
        self.tiles.len() - 1
    }

    pub fn tile(&self, id: TileId) -> &Tile {
        &self.tiles[id]
    }

    pub fn tile_mut(&mut self, id: TileId) -> &mut Tile {
        &mut self.tiles[id]
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tile> + '_ {
        self.tiles.iter()
    }

    /// Make `children` the ordered animation frames of `master`.
    ///
    /// Groups are one level deep: a tile already in a group cannot join another.
    pub fn link_animation(&mut self, master: TileId, children: &[TileId]) -> Result<()> {
        for &id in std::iter::once(&master).chain(children) {
            if self.tiles[id].is_animated() {
                return Err(CompileError::InvalidJob(format!(
                    "tile {} is already part of an animation group",
                    id
                )));
            }
        }
        if children.contains(&master) {
            return Err(CompileError::InvalidJob(format!(
                "tile {} cannot be an animation frame of itself",
                master
            )));
        }

        for &child in children {
            self.tiles[child].child_of = Some(master);
        }
        self.tiles[master].child_frames = children.to_vec();
        Ok(())
    }

    /// Every tile must appear in exactly one matrix cell across all generators
    pub fn check_registrations<'a, I>(&self, matrices: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a TileMatrix>,
    {
        let mut seen = HashSet::with_capacity(self.tiles.len());
        for id in matrices.into_iter().flatten().flatten().flatten() {
            if !seen.insert(*id) {
                return Err(CompileError::DuplicateRegistration { tile: *id });
            }
        }
        Ok(())
    }
}

/// All tile ids of a matrix in row-major order, skipping empty cells
pub fn matrix_ids(matrix: &TileMatrix) -> impl Iterator<Item = TileId> + '_ {
    matrix.iter().flatten().flatten().copied()
}
