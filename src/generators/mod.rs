//! # Tile Generators
//!
//! Each kind of content a job can declare is a [`Generator`]. A generator cuts its images into
//! tiles, may pin some of them to fixed slots, and describes where its tiles ended up once the
//! store is allocated.

pub mod animations;
pub mod blank;
pub mod images;
pub mod splash;

use std::path::Path;

use log::debug;
use serde_json::Value;

use crate::{
    dedupe::PlacedTile,
    error::Result,
    job::{AnimationsSpec, ImagesSpec, JobSpec, SplashSpec},
    raster::{load_image, split_into_tiles, TileRaster},
    tile::{Store, Tile, TileMatrix, TileSet},
};

#[derive(Debug, Clone)]
pub enum Generator {
    /// Plain images, one matrix per image, for either store
    Images { store: Store, spec: ImagesSpec },
    Tilesets(ImagesSpec),
    Animations(AnimationsSpec),
    SystemSplash(SplashSpec),
    BlankFiller,
}

/// What a generator pushed into the tile set
#[derive(Debug, Clone, Default)]
pub struct Sources {
    pub matrices: Vec<TileMatrix>,
    /// How many matrices each declared input produced, in input order
    pub per_input: Vec<usize>,
}

impl Sources {
    pub fn push(&mut self, matrices: Vec<TileMatrix>) {
        self.per_input.push(matrices.len());
        self.matrices.extend(matrices);
    }
}

impl Generator {
    pub fn name(&self) -> &'static str {
        match self {
            Generator::Images { store: Store::Fine, .. } => "fineImages",
            Generator::Images { store: Store::Coarse, .. } => "coarseImages",
            Generator::Tilesets(_) => "tilesets",
            Generator::Animations(_) => "coarseAnimations",
            Generator::SystemSplash(_) => "splash",
            Generator::BlankFiller => "blankFiller",
        }
    }

    /// Cut this generator's images into tiles for `store`
    pub fn sources(&self, store: Store, root: &Path, tiles: &mut TileSet) -> Result<Sources> {
        let sources = match self {
            Generator::Images { spec, .. } | Generator::Tilesets(spec) => {
                images::sources(spec, root, tiles)?
            }
            Generator::Animations(spec) => animations::sources(spec, root, tiles)?,
            Generator::SystemSplash(spec) => splash::sources(spec, store, root, tiles)?,
            Generator::BlankFiller => blank::sources(tiles),
        };
        debug!(
            "{} produced {} tile matrices for the {:?} store",
            self.name(),
            sources.matrices.len(),
            store
        );
        Ok(sources)
    }

    /// Pin tiles to their hardware-mandated slots. Must run before deduplication.
    pub fn set_fixed_positions(
        &self,
        store: Store,
        sources: &Sources,
        tiles: &mut TileSet,
    ) -> Result<()> {
        match self {
            Generator::SystemSplash(spec) => {
                splash::set_fixed_positions(spec, store, sources, tiles)
            }
            Generator::BlankFiller => blank::set_fixed_positions(sources, tiles),
            _ => Ok(()),
        }
    }

    /// Structured description of where this generator's tiles landed
    pub fn code_emit_data<P>(
        &self,
        sources: &Sources,
        placed: &[PlacedTile<P>],
    ) -> Result<Option<Value>> {
        match self {
            Generator::Images { spec, .. } | Generator::Tilesets(spec) => {
                images::code_emit_data(spec, sources, placed).map(Some)
            }
            Generator::Animations(spec) => {
                animations::code_emit_data(spec, sources, placed).map(Some)
            }
            Generator::SystemSplash(_) | Generator::BlankFiller => Ok(None),
        }
    }
}

/// Generators feeding each store, in the order their tiles are registered
pub fn generators_for(job: &JobSpec, store: Store) -> Vec<Generator> {
    let mut generators = Vec::new();

    if let Some(splash) = &job.splash {
        generators.push(Generator::SystemSplash(splash.clone()));
    }

    match store {
        Store::Fine => {
            if let Some(spec) = &job.fine_images {
                generators.push(Generator::Images {
                    store,
                    spec: spec.clone(),
                });
            }
            // the splash banner pinned over 0xFF brings its own blank tile
            let banner_owns_ff = job
                .splash
                .as_ref()
                .is_some_and(|s| s.spec_banner_image_file.is_some());
            if !banner_owns_ff {
                generators.push(Generator::BlankFiller);
            }
        }
        Store::Coarse => {
            if let Some(spec) = &job.tilesets {
                generators.push(Generator::Tilesets(spec.clone()));
            }
            if let Some(spec) = &job.coarse_images {
                generators.push(Generator::Images {
                    store,
                    spec: spec.clone(),
                });
            }
            if let Some(spec) = &job.coarse_animations {
                generators.push(Generator::Animations(spec.clone()));
            }
            if job.reserve_coarse_blank_tile {
                generators.push(Generator::BlankFiller);
            }
        }
    }

    generators
}

/// Load an image relative to `root` and cut it into an 8x8 raster matrix
pub(crate) fn load_rasters(root: &Path, image_file: &str) -> Result<Vec<Vec<TileRaster>>> {
    let path = root.join(image_file);
    let image = load_image(&path)?;
    split_into_tiles(&image, &path)
}

/// Register every raster as a tile, letting `setup` adjust each one first
pub(crate) fn push_matrix<F>(
    rasters: Vec<Vec<TileRaster>>,
    tiles: &mut TileSet,
    setup: F,
) -> TileMatrix
where
    F: Fn(&mut Tile),
{
    rasters
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|raster| {
                    let mut tile = Tile::new(raster);
                    setup(&mut tile);
                    Some(tiles.push(tile))
                })
                .collect()
        })
        .collect()
}
