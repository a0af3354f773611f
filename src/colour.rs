//! # Colour Codec
//!
//! Converts 24-bit RGBA colours into the packed 16-bit hardware colour word.
//!
//! Bit layout (MSB first): `D R0 G0 B0 R4 R3 R2 R1 G4 G3 G2 G1 B4 B3 B2 B1`, where `D` is the
//! inverted "dark" bit and the channel values are the 5-bit `channel / 8` values. The conversion is
//! lossy: different 24-bit colours can legitimately land on the same 16-bit word.

use std::fmt;

use image::Rgba;
use serde::Serialize;

/// A packed 16-bit hardware colour. Equality is exact word equality.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Colour16(pub u16);

impl fmt::Display for Colour16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

/// Magenta marks transparent pixels in source art and always sorts into palette slot 0
pub const SENTINEL24: Rgba<u8> = Rgba([255, 0, 255, 255]);
pub const BLACK24: Rgba<u8> = Rgba([0, 0, 0, 255]);

pub const SENTINEL16: Colour16 = Colour16(0x5f0f);
pub const BLACK16: Colour16 = Colour16(0x8000);

/// Convert with the luma-derived dark bit. Alpha is ignored.
pub fn to_colour16(colour: Rgba<u8>) -> Colour16 {
    let [red, green, blue, _] = colour.0;

    // evaluated left to right in f64 so odd/even luma matches the reference tables exactly
    let luma =
        (54.213 * red as f64 + 182.376 * green as f64 + 18.411 * blue as f64).floor() as u32 & 1;

    Colour16(((luma ^ 1) << 15) as u16 | pack_channels(red, green, blue))
}

/// Convert with the dark bit forced off. Only used for system artwork whose palette was authored
/// without the dark-bit scheme.
pub fn to_colour16_ignore_dark(colour: Rgba<u8>) -> Colour16 {
    let [red, green, blue, _] = colour.0;
    Colour16(pack_channels(red, green, blue))
}

pub fn to_colour16_with(colour: Rgba<u8>, ignore_dark_bit: bool) -> Colour16 {
    if ignore_dark_bit {
        to_colour16_ignore_dark(colour)
    } else {
        to_colour16(colour)
    }
}

fn pack_channels(red: u8, green: u8, blue: u8) -> u16 {
    let r = (red / 8) as u16;
    let g = (green / 8) as u16;
    let b = (blue / 8) as u16;

    ((r & 1) << 14)
        | ((g & 1) << 13)
        | ((b & 1) << 12)
        | ((r & 0x1e) << 7)
        | ((g & 0x1e) << 3)
        | (b >> 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_primary_colours() {
        assert_eq!(to_colour16(Rgba([0, 0, 0, 255])), Colour16(0x8000));
        assert_eq!(to_colour16(Rgba([0, 255, 0, 255])), Colour16(0x20f0));
        assert_eq!(to_colour16(Rgba([255, 255, 255, 255])), Colour16(0x7fff));
        assert_eq!(to_colour16(Rgba([128, 0, 0, 255])), Colour16(0x0800));
        assert_eq!(to_colour16(Rgba([255, 0, 0, 255])), Colour16(0xcf00));
    }

    #[test]
    fn ignores_alpha() {
        assert_eq!(to_colour16(Rgba([0, 0, 0, 100])), Colour16(0x8000));
        assert_eq!(to_colour16(Rgba([0, 255, 0, 0])), Colour16(0x20f0));
        assert_eq!(to_colour16(Rgba([255, 255, 255, 0])), Colour16(0x7fff));
    }

    #[test]
    fn constants_match_codec() {
        assert_eq!(to_colour16(SENTINEL24), SENTINEL16);
        assert_eq!(to_colour16(BLACK24), BLACK16);
        // magenta has an even luma, so both codecs agree on the sentinel
        assert_eq!(to_colour16_ignore_dark(SENTINEL24), SENTINEL16);
    }

    #[test]
    fn ignore_dark_clears_top_bit() {
        assert_eq!(to_colour16_ignore_dark(Rgba([0, 0, 0, 255])), Colour16(0x0000));
        assert_eq!(to_colour16_ignore_dark(Rgba([255, 255, 255, 255])), Colour16(0x7fff));
        assert_eq!(to_colour16_with(Rgba([0, 0, 0, 255]), false), Colour16(0x8000));
    }
}
