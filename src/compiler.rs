//! # Compiler
//!
//! Drives a whole job: the fine store first, then the coarse store (its palettes follow the fine
//! bank), then the combined palette bank and layout. Nothing is written until both stores have
//! compiled.

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::info;

use crate::{
    dedupe::PlacedTile,
    emit::{emit_coarse, emit_fine, CoarseImage},
    encode::{Coarse, Fine, StoreFormat},
    error::Result,
    generators::{generators_for, Sources},
    job::JobSpec,
    layout::{GeneratorLayout, Layout},
    palette::{default_black_palette, Palette},
    store::{compile_store, StoreOptions},
    tile::{Store, TileSet},
};

#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// Image paths and outputs are resolved against this directory
    pub root_dir: PathBuf,
    /// Where tiles over the colour cap are dumped; a temp directory when unset
    pub bad_tile_dir: Option<PathBuf>,
    pub fine_first_free_slot: u32,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            bad_tile_dir: None,
            fine_first_free_slot: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub fine_store: Vec<u8>,
    pub coarse_store: CoarseImage,
    pub layout: Layout,
}

impl CompileOutput {
    pub fn palettes(&self) -> &[Palette] {
        &self.layout.palettes
    }
}

/// One store after allocation, with what its generators report about it
struct CompiledStore<P> {
    bank: Vec<Palette>,
    placed: Vec<PlacedTile<P>>,
    layouts: Vec<GeneratorLayout>,
}

pub fn compile(job: &JobSpec, config: &CompilerConfig) -> Result<CompileOutput> {
    job.validate()?;
    info!("Compiling job with output root {}", job.rom_path_root);

    let fine = compile_generators::<Fine>(job, config, 1)?;
    let fine_store = emit_fine(&fine.placed);

    let coarse = compile_generators::<Coarse>(job, config, 1 + fine.bank.len())?;
    let coarse_store = emit_coarse(&coarse.placed, job.pad_coarse_store_to)?;

    let mut palettes = Vec::with_capacity(1 + fine.bank.len() + coarse.bank.len());
    palettes.push(default_black_palette());
    palettes.extend(fine.bank);
    palettes.extend(coarse.bank);

    info!(
        "Compiled {} fine bytes, {} bytes per coarse stream, {} palettes",
        fine_store.len(),
        coarse_store.low.len(),
        palettes.len()
    );

    Ok(CompileOutput {
        fine_store,
        coarse_store,
        layout: Layout {
            palettes,
            fine: fine.layouts,
            coarse: coarse.layouts,
        },
    })
}

fn compile_generators<F: StoreFormat>(
    job: &JobSpec,
    config: &CompilerConfig,
    palette_start: usize,
) -> Result<CompiledStore<F::Payload>> {
    let store = F::STORE;
    let generators = generators_for(job, store);

    let mut tiles = TileSet::new();
    let mut sources: Vec<Sources> = Vec::with_capacity(generators.len());
    for generator in &generators {
        sources.push(generator.sources(store, &config.root_dir, &mut tiles)?);
    }

    // fixed slots must be known before duplicates are linked
    for (generator, sources) in generators.iter().zip(&sources) {
        generator.set_fixed_positions(store, sources, &mut tiles)?;
    }
    tiles.check_registrations(sources.iter().flat_map(|s| &s.matrices))?;

    let options = StoreOptions {
        palette_start,
        bad_tile_dir: config.bad_tile_dir.as_deref(),
        first_free_slot: match store {
            Store::Fine => config.fine_first_free_slot,
            Store::Coarse => 0,
        },
    };
    let positioned = compile_store::<F>(&tiles, &options)?;
    let placed = positioned.placed();

    let mut layouts = Vec::new();
    for (generator, sources) in generators.iter().zip(&sources) {
        if let Some(data) = generator.code_emit_data(sources, &placed)? {
            layouts.push(GeneratorLayout {
                generator: generator.name(),
                data,
            });
        }
    }

    Ok(CompiledStore {
        bank: positioned.bank().to_vec(),
        placed,
        layouts,
    })
}

/// Write every output of a successful compile, returning the paths written
pub fn write_outputs(
    job: &JobSpec,
    config: &CompilerConfig,
    output: &CompileOutput,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    let rom_path =
        |suffix: &str| config.root_dir.join(format!("{}{}", job.rom_path_root, suffix));

    write_file(&rom_path("s1.s1"), &output.fine_store, &mut written)?;

    if !output.coarse_store.low.is_empty() {
        write_file(&rom_path("c1.c1"), &output.coarse_store.low, &mut written)?;
        write_file(&rom_path("c2.c2"), &output.coarse_store.high, &mut written)?;
    }

    if let Some(layout_file) = &job.layout_file {
        let json = serde_json::to_string_pretty(&output.layout)?;
        write_file(&config.root_dir.join(layout_file), json.as_bytes(), &mut written)?;
    }

    Ok(written)
}

fn write_file(path: &Path, contents: &[u8], written: &mut Vec<PathBuf>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    written.push(path.to_path_buf());
    Ok(())
}
