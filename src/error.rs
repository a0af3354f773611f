use std::{io, path::PathBuf};

use image::ImageError;
use thiserror::Error;

use crate::{colour::Colour16, tile::TileId};

/// Every way a compile run can fail. There is no partial output: any of these
/// aborts the whole job.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid job description: {0}")]
    InvalidJob(String),

    #[error("{path} is {width}x{height}, which is not a multiple of the {tile}px tile size")]
    NotTileAligned {
        path: PathBuf,
        width: u32,
        height: u32,
        tile: u32,
    },

    #[error("tile rasters must be {expected}x{expected}, got {width}x{height}")]
    BadTileSize { expected: u32, width: u32, height: u32 },

    #[error(
        "{count} tile(s) have more than 16 colours, bad tiles written to: {}",
        display_dump_dir(.dump_dir)
    )]
    TooManyColours {
        count: usize,
        dump_dir: Option<PathBuf>,
    },

    #[error("tile {tile} has no palette at encode time")]
    MissingPalette { tile: TileId },

    #[error("tile {tile}: colour {pixel:?} ({colour}) is not in its palette {palette:?}")]
    ColourNotInPalette {
        tile: TileId,
        pixel: [u8; 4],
        colour: Colour16,
        palette: Vec<Colour16>,
    },

    #[error("merged palette has {0} colours, more than 16")]
    PaletteOverflow(usize),

    #[error("{name} ({image}) is an auto animation of {expected} but has {actual} frames")]
    FrameCountMismatch {
        name: String,
        image: String,
        expected: usize,
        actual: usize,
    },

    #[error("{name} ({image}): frame {frame} of an auto animation is blank")]
    BlankAnimationFrame {
        name: String,
        image: String,
        frame: usize,
    },

    #[error("tile {tile} was registered twice in the same store")]
    DuplicateRegistration { tile: TileId },

    #[error("{count} tile(s) have no slot and no duplicate, first is tile {first}")]
    Unpositioned { count: usize, first: TileId },

    #[error("two tiles claim coarse slot {slot}")]
    SlotConflict { slot: u32 },

    #[error("{0}")]
    NotBlank(String),

    #[error(
        "splash image {path} is {width}x{height}, expected {expected_width}x{expected_height}"
    )]
    SplashSize {
        path: PathBuf,
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },

    #[error("splash image {0} cannot be rendered with the system splash palette")]
    SplashPalette(PathBuf),
}

pub type Result<T> = std::result::Result<T, CompileError>;

fn display_dump_dir(dump_dir: &Option<PathBuf>) -> String {
    dump_dir
        .as_ref()
        .map(|d| d.display().to_string())
        .unwrap_or_else(|| "<nowhere>".to_string())
}
