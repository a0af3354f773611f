//! # Tile Binary Encoding
//!
//! Each store has its own native tile layout. [`StoreFormat`] captures everything the rest of the
//! pipeline needs to know about a layout: how a pixel counts as transparent, how an indexed tile
//! is packed, and what an empty slot looks like.

pub mod coarse;
pub mod fine;

use std::{fmt::Debug, hash::Hash};

use image::Rgba;

pub use coarse::{Coarse, CoarsePayload};
pub use fine::Fine;

use crate::{
    colour::to_colour16_with,
    error::{CompileError, Result},
    palette::{merge::PaletteAssignment, Palette},
    raster::{TileRaster, PIXELS_PER_TILE},
    tile::{Store, Tile, TileId, TileSet},
};

pub trait StoreFormat {
    /// Encoded bytes for one tile
    type Payload: Clone + Debug + PartialEq + Eq + Hash;

    const STORE: Store;

    fn is_transparent(pixel: Rgba<u8>) -> bool;

    /// Pack already-indexed pixels (row-major, one index per pixel) into the native layout
    fn pack(indices: &[u8; PIXELS_PER_TILE]) -> Self::Payload;

    /// Payload used to fill slots nobody claimed
    fn blank() -> Self::Payload;

    fn encode(id: TileId, tile: &Tile, palette: Option<&Palette>) -> Result<Self::Payload> {
        let palette = palette.ok_or(CompileError::MissingPalette { tile: id })?;
        let indices = index_pixels(
            id,
            &tile.raster,
            palette,
            tile.ignore_dark_bit,
            Self::is_transparent,
        )?;
        Ok(Self::pack(&indices))
    }
}

/// A tile reduced to what the later stages need: its bytes and its placement constraints
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedTile<P> {
    pub payload: P,
    pub palette_index: Option<usize>,
    pub fixed_slot: Option<u32>,
    pub priority: i64,
    pub child_of: Option<TileId>,
    pub child_frames: Vec<TileId>,
}

impl<P> EncodedTile<P> {
    pub fn new(payload: P) -> Self {
        EncodedTile {
            payload,
            palette_index: None,
            fixed_slot: None,
            priority: 0,
            child_of: None,
            child_frames: Vec::new(),
        }
    }

    pub fn is_animated(&self) -> bool {
        self.child_of.is_some() || !self.child_frames.is_empty()
    }
}

/// Encode every tile of a store against the palette it was assigned
pub fn encode_tiles<F: StoreFormat>(
    tiles: &TileSet,
    assignment: &PaletteAssignment,
) -> Result<Vec<EncodedTile<F::Payload>>> {
    tiles
        .iter()
        .enumerate()
        .map(|(id, tile)| {
            let payload = F::encode(id, tile, assignment.tile_palettes[id].as_ref())?;
            Ok(EncodedTile {
                palette_index: assignment.palette_indices[id],
                fixed_slot: tile.fixed_slot,
                priority: tile.priority,
                child_of: tile.child_of,
                child_frames: tile.child_frames.clone(),
                ..EncodedTile::new(payload)
            })
        })
        .collect()
}

/// Look every pixel up in `palette`. Transparent pixels are index 0 whatever their colour.
pub fn index_pixels(
    id: TileId,
    raster: &TileRaster,
    palette: &Palette,
    ignore_dark_bit: bool,
    is_transparent: fn(Rgba<u8>) -> bool,
) -> Result<[u8; PIXELS_PER_TILE]> {
    let mut indices = [0u8; PIXELS_PER_TILE];

    for (slot, pixel) in indices.iter_mut().zip(raster.pixels()) {
        if is_transparent(pixel) {
            continue;
        }
        let colour = to_colour16_with(pixel, ignore_dark_bit);
        *slot = palette.index_of(colour).ok_or_else(|| CompileError::ColourNotInPalette {
            tile: id,
            pixel: pixel.0,
            colour,
            palette: palette.colours().to_vec(),
        })?;
    }

    Ok(indices)
}
