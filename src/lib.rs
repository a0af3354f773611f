//! # tilerom
//!
//! Compiles PNG artwork into the two tile stores of a tile-based graphics ROM: the fine store
//! (4bpp packed, fixed 128 KiB image) and the coarse store (two bitplane streams with an
//! 8/4-tile block allocator for hardware animations).

pub mod colour;
pub mod compiler;
pub mod dedupe;
pub mod emit;
pub mod encode;
pub mod error;
pub mod generators;
pub mod job;
pub mod layout;
pub mod palette;
pub mod position;
pub mod raster;
pub mod store;
pub mod tile;

pub use compiler::{compile, write_outputs, CompileOutput, CompilerConfig};
pub use error::{CompileError, Result};
pub use job::JobSpec;
