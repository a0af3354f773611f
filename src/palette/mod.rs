//! # Palettes
//!
//! A palette is an ordered list of 16-bit colours. Working palettes hold at most 16 entries;
//! finalized palettes hold exactly 16, padded with black. Slot 0 is always the transparency
//! sentinel.

pub mod extract;
pub mod merge;

use serde::Serialize;

use crate::{
    colour::{Colour16, BLACK16, SENTINEL16},
    error::{CompileError, Result},
};

pub const COLOURS_PER_PALETTE: usize = 16;

#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Palette(Vec<Colour16>);

impl Palette {
    /// Build the canonical form: sentinel first, the rest ascending, duplicates removed.
    ///
    /// Two distinct 24-bit colours can collapse onto the same 16-bit word, which is why the
    /// dedupe happens after conversion.
    pub fn canonical<I>(colours: I) -> Self
    where
        I: IntoIterator<Item = Colour16>,
    {
        let mut colours: Vec<Colour16> = colours.into_iter().collect();
        colours.sort_by_key(|&c| (c != SENTINEL16, c));
        colours.dedup();
        Palette(colours)
    }

    /// Wrap colours exactly as given, for fixed system palettes
    pub fn fixed(colours: Vec<Colour16>) -> Self {
        Palette(colours)
    }

    /// Canonical union of both palettes
    pub fn merge(&self, other: &Palette) -> Palette {
        Palette::canonical(self.0.iter().chain(other.0.iter()).copied())
    }

    /// Pad to exactly 16 entries with black
    pub fn finalize(mut self) -> Result<Palette> {
        if self.0.len() > COLOURS_PER_PALETTE {
            return Err(CompileError::PaletteOverflow(self.0.len()));
        }
        self.0.resize(COLOURS_PER_PALETTE, BLACK16);
        Ok(self)
    }

    pub fn index_of(&self, colour: Colour16) -> Option<u8> {
        self.0.iter().position(|&c| c == colour).map(|i| i as u8)
    }

    pub fn contains(&self, colour: Colour16) -> bool {
        self.0.contains(&colour)
    }

    pub fn colours(&self) -> &[Colour16] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Palette 0 of the global bank, the default every unpaletted sprite falls back to
pub fn default_black_palette() -> Palette {
    Palette(vec![BLACK16; COLOURS_PER_PALETTE])
}
