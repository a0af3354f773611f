//! # Store Pipeline
//!
//! One store is compiled in strictly ordered stages, each consuming the previous one:
//!
//! ```text
//! TileSet -> PalettedStore -> EncodedStore -> DedupedStore -> PositionedStore
//! ```
//!
//! The format parameter `F` fixes the transparency rule, the payload type and the allocation
//! strategy for the whole chain.

use std::{marker::PhantomData, path::Path};

use log::info;

use crate::{
    dedupe::{denormalize_dupes, mark_dupes, DedupedTile, PlacedTile},
    encode::{encode_tiles, EncodedTile, StoreFormat},
    error::Result,
    palette::{
        merge::{assign_palettes, PaletteAssignment},
        Palette,
    },
    position::{allocate_coarse, allocate_fine, PositionedTile},
    tile::{Store, TileSet},
};

/// Knobs for a single store compile
#[derive(Clone, Copy, Debug, Default)]
pub struct StoreOptions<'a> {
    /// Where this store's palettes start in the global bank
    pub palette_start: usize,
    pub bad_tile_dir: Option<&'a Path>,
    /// Lowest slot free-fill may use, fine store only
    pub first_free_slot: u32,
}

pub struct PalettedStore<'a, F> {
    tiles: &'a TileSet,
    assignment: PaletteAssignment,
    format: PhantomData<F>,
}

impl<'a, F: StoreFormat> PalettedStore<'a, F> {
    pub fn new(
        tiles: &'a TileSet,
        palette_start: usize,
        bad_tile_dir: Option<&Path>,
    ) -> Result<Self> {
        let assignment = assign_palettes(tiles, palette_start, F::is_transparent, bad_tile_dir)?;
        Ok(PalettedStore {
            tiles,
            assignment,
            format: PhantomData,
        })
    }

    pub fn bank(&self) -> &[Palette] {
        &self.assignment.bank
    }

    pub fn encode(self) -> Result<EncodedStore<F>> {
        let tiles = encode_tiles::<F>(self.tiles, &self.assignment)?;
        Ok(EncodedStore {
            bank: self.assignment.bank,
            tiles,
        })
    }
}

pub struct EncodedStore<F: StoreFormat> {
    bank: Vec<Palette>,
    tiles: Vec<EncodedTile<F::Payload>>,
}

impl<F: StoreFormat> EncodedStore<F> {
    pub fn dedupe(self) -> DedupedStore<F> {
        let tiles = mark_dupes(self.tiles);
        DedupedStore { bank: self.bank, tiles }
    }
}

pub struct DedupedStore<F: StoreFormat> {
    bank: Vec<Palette>,
    tiles: Vec<DedupedTile<F::Payload>>,
}

impl<F: StoreFormat> DedupedStore<F> {
    pub fn duplicate_count(&self) -> usize {
        self.tiles.iter().filter(|t| t.duplicate_of.is_some()).count()
    }

    pub fn allocate(self, first_free_slot: u32) -> Result<PositionedStore<F>> {
        let tiles = match F::STORE {
            Store::Fine => allocate_fine(self.tiles, first_free_slot)?,
            Store::Coarse => allocate_coarse(self.tiles)?,
        };
        Ok(PositionedStore { bank: self.bank, tiles })
    }
}

pub struct PositionedStore<F: StoreFormat> {
    bank: Vec<Palette>,
    tiles: Vec<PositionedTile<F::Payload>>,
}

impl<F: StoreFormat> PositionedStore<F> {
    pub fn bank(&self) -> &[Palette] {
        &self.bank
    }

    pub fn tiles(&self) -> &[PositionedTile<F::Payload>] {
        &self.tiles
    }

    /// Duplicate-free view for emission and layout output
    pub fn placed(&self) -> Vec<PlacedTile<F::Payload>> {
        denormalize_dupes(&self.tiles)
    }

    /// One past the highest slot in use
    pub fn slot_count(&self) -> u32 {
        self.tiles.iter().filter_map(|t| t.slot).max().map_or(0, |max| max + 1)
    }
}

/// Run a store through every stage up to allocation
pub fn compile_store<F: StoreFormat>(
    tiles: &TileSet,
    options: &StoreOptions,
) -> Result<PositionedStore<F>> {
    let paletted = PalettedStore::<F>::new(tiles, options.palette_start, options.bad_tile_dir)?;
    info!(
        "{:?} store: {} tiles, {} palettes starting at index {}",
        F::STORE,
        tiles.len(),
        paletted.bank().len(),
        options.palette_start
    );

    let deduped = paletted.encode()?.dedupe();
    info!("{:?} store: {} duplicate tiles removed", F::STORE, deduped.duplicate_count());

    let positioned = deduped.allocate(options.first_free_slot)?;
    info!("{:?} store: {} slots in use", F::STORE, positioned.slot_count());

    Ok(positioned)
}
