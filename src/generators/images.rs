//! Plain images and tilesets: every 8x8 cell of the image becomes a tile.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::{load_rasters, push_matrix, Sources};
use crate::{
    dedupe::PlacedTile,
    error::Result,
    job::ImagesSpec,
    layout::{tile_refs, TileRef},
    tile::TileSet,
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageLayout<'a> {
    name: &'a str,
    image_file: &'a str,
    tiles: Vec<Vec<Option<TileRef>>>,
}

pub fn sources(spec: &ImagesSpec, root: &Path, tiles: &mut TileSet) -> Result<Sources> {
    let mut sources = Sources::default();
    for input in &spec.inputs {
        let rasters = load_rasters(root, &input.image_file)?;
        sources.push(vec![push_matrix(rasters, tiles, |_| {})]);
    }
    Ok(sources)
}

pub fn code_emit_data<P>(
    spec: &ImagesSpec,
    sources: &Sources,
    placed: &[PlacedTile<P>],
) -> Result<Value> {
    let images: Vec<ImageLayout> = spec
        .inputs
        .iter()
        .zip(&sources.matrices)
        .map(|(input, matrix)| ImageLayout {
            name: &input.name,
            image_file: &input.image_file,
            tiles: tile_refs(matrix, placed),
        })
        .collect();

    Ok(serde_json::to_value(images)?)
}
