//! # Coarse Animations
//!
//! An animation image is a horizontal strip of frames, each `tileWidth` tiles wide. With
//! `autoAnimation` set the hardware cycles the frames itself, so every tile of frames 2..N is
//! linked as a child of the tile at the same position in frame 1.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use super::{load_rasters, push_matrix, Sources};
use crate::{
    dedupe::PlacedTile,
    error::{CompileError, Result},
    job::{AnimationInput, AnimationsSpec},
    layout::{tile_refs, TileRef},
    tile::{matrix_ids, TileId, TileMatrix, TileSet},
};

#[derive(Serialize)]
struct GroupLayout<'a> {
    name: &'a str,
    animations: Vec<AnimationLayout<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnimationLayout<'a> {
    name: &'a str,
    image_file: &'a str,
    auto_animation: Option<usize>,
    frames: Vec<Vec<Vec<Option<TileRef>>>>,
    custom: &'a Map<String, Value>,
}

pub fn sources(spec: &AnimationsSpec, root: &Path, tiles: &mut TileSet) -> Result<Sources> {
    let mut sources = Sources::default();
    for group in &spec.inputs {
        for animation in &group.animations {
            sources.push(animation_frames(animation, root, tiles)?);
        }
    }
    Ok(sources)
}

fn animation_frames(
    animation: &AnimationInput,
    root: &Path,
    tiles: &mut TileSet,
) -> Result<Vec<TileMatrix>> {
    let rasters = load_rasters(root, &animation.image_file)?;
    let width_tiles = rasters.first().map_or(0, Vec::len);
    let frame_width = animation.frame_width() as usize;

    if frame_width == 0 {
        return Err(CompileError::InvalidJob(format!(
            "{} ({}): tileWidth must be at least 1",
            animation.name, animation.image_file
        )));
    }
    if width_tiles % frame_width != 0 {
        return Err(CompileError::InvalidJob(format!(
            "{} ({}) is {} tiles wide, which does not divide into frames {} tiles wide",
            animation.name, animation.image_file, width_tiles, frame_width
        )));
    }

    let strip = push_matrix(rasters, tiles, |_| {});
    let frames: Vec<TileMatrix> = (0..width_tiles / frame_width)
        .map(|f| {
            strip
                .iter()
                .map(|row| row[f * frame_width..(f + 1) * frame_width].to_vec())
                .collect()
        })
        .collect();

    if let Some(expected) = animation.auto_animation {
        if frames.len() != expected {
            return Err(CompileError::FrameCountMismatch {
                name: animation.name.clone(),
                image: animation.image_file.clone(),
                expected,
                actual: frames.len(),
            });
        }

        for (index, frame) in frames.iter().enumerate() {
            if matrix_ids(frame).all(|id| tiles.tile(id).raster.is_blank()) {
                return Err(CompileError::BlankAnimationFrame {
                    name: animation.name.clone(),
                    image: animation.image_file.clone(),
                    frame: index,
                });
            }
        }

        link_frames(&frames, tiles)?;
    }

    Ok(frames)
}

/// Every tile of the first frame becomes the master of the same-position tiles in later frames
fn link_frames(frames: &[TileMatrix], tiles: &mut TileSet) -> Result<()> {
    let Some((master_frame, child_frames)) = frames.split_first() else {
        return Ok(());
    };

    for (y, row) in master_frame.iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            let Some(master) = *cell else {
                continue;
            };
            let children: Vec<TileId> = child_frames
                .iter()
                .filter_map(|frame| frame[y][x])
                .collect();
            tiles.link_animation(master, &children)?;
        }
    }

    Ok(())
}

pub fn code_emit_data<P>(
    spec: &AnimationsSpec,
    sources: &Sources,
    placed: &[PlacedTile<P>],
) -> Result<Value> {
    let mut frames = sources.matrices.iter();
    let mut counts = sources.per_input.iter().copied();

    let groups: Vec<GroupLayout> = spec
        .inputs
        .iter()
        .map(|group| GroupLayout {
            name: &group.name,
            animations: group
                .animations
                .iter()
                .map(|animation| {
                    let count = counts.next().unwrap_or(0);
                    AnimationLayout {
                        name: &animation.name,
                        image_file: &animation.image_file,
                        auto_animation: animation.auto_animation,
                        frames: frames.by_ref().take(count).map(|m| tile_refs(m, placed)).collect(),
                        custom: &animation.custom,
                    }
                })
                .collect(),
        })
        .collect();

    Ok(serde_json::to_value(groups)?)
}
