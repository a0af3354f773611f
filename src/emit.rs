//! # Store Image Emission
//!
//! Serializes positioned tiles into the final byte images. Gaps between claimed slots are filled
//! with blank tiles.

use std::collections::BTreeMap;

use log::debug;

use crate::{
    dedupe::PlacedTile,
    encode::{
        fine::{FINE_BYTES_PER_TILE, FINE_STORE_SIZE_BYTES},
        Coarse, CoarsePayload, Fine, StoreFormat,
    },
    error::{CompileError, Result},
};

/// The two coarse bitplane streams, always the same length
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CoarseImage {
    pub low: Vec<u8>,
    pub high: Vec<u8>,
}

/// Build the fine store image, padded to [`FINE_STORE_SIZE_BYTES`].
///
/// Several tiles may claim one slot, e.g. system artwork pinned over an auto-filled tile. The
/// highest priority wins; on a tie the tile later in input order wins.
pub fn emit_fine(placed: &[PlacedTile<[u8; FINE_BYTES_PER_TILE]>]) -> Vec<u8> {
    let mut by_slot: BTreeMap<u32, &PlacedTile<[u8; FINE_BYTES_PER_TILE]>> = BTreeMap::new();

    for tile in placed {
        if tile.duplicate_of.is_some() || tile.child_of.is_some() {
            continue;
        }
        let Some(slot) = tile.slot else {
            continue;
        };
        let wins = by_slot
            .get(&slot)
            .map_or(true, |existing| tile.priority >= existing.priority);
        if wins {
            by_slot.insert(slot, tile);
        }
    }

    let contested = placed
        .iter()
        .filter(|t| t.duplicate_of.is_none() && t.child_of.is_none() && t.slot.is_some())
        .count()
        - by_slot.len();
    if contested > 0 {
        debug!("{} fine tile(s) lost their slot to a higher priority tile", contested);
    }

    let mut out = Vec::with_capacity(FINE_STORE_SIZE_BYTES);
    let mut cursor = 0u32;
    for (&slot, tile) in &by_slot {
        while cursor < slot {
            out.extend_from_slice(&Fine::blank());
            cursor += 1;
        }
        out.extend_from_slice(&tile.payload);
        cursor = slot + 1;
    }

    if out.len() < FINE_STORE_SIZE_BYTES {
        out.resize(FINE_STORE_SIZE_BYTES, 0);
    }
    out
}

/// Build both coarse streams. Each master is followed directly by its child frames.
///
/// Unlike the fine store there is no conflict resolution: two tiles on one slot is an allocator
/// bug and fails the run. Streams are padded to `pad_to` bytes when given, never truncated.
pub fn emit_coarse(
    placed: &[PlacedTile<CoarsePayload>],
    pad_to: Option<usize>,
) -> Result<CoarseImage> {
    let mut roots: Vec<&PlacedTile<CoarsePayload>> = placed
        .iter()
        .filter(|t| t.duplicate_of.is_none() && t.child_of.is_none() && t.slot.is_some())
        .collect();
    roots.sort_by_key(|t| t.slot);

    let mut image = CoarseImage::default();
    let mut cursor = 0u32;
    let blank = Coarse::blank();

    for tile in roots {
        let Some(slot) = tile.slot else {
            continue;
        };
        if slot < cursor {
            return Err(CompileError::SlotConflict { slot });
        }
        while cursor < slot {
            push_coarse(&mut image, &blank);
            cursor += 1;
        }

        push_coarse(&mut image, &tile.payload);
        for &child in &tile.child_frames {
            push_coarse(&mut image, &placed[child].payload);
        }
        cursor = slot + 1 + tile.child_frames.len() as u32;
    }

    if let Some(size) = pad_to {
        if image.low.len() < size {
            image.low.resize(size, 0);
            image.high.resize(size, 0);
        }
    }

    Ok(image)
}

fn push_coarse(image: &mut CoarseImage, payload: &CoarsePayload) {
    image.low.extend_from_slice(&payload.low);
    image.high.extend_from_slice(&payload.high);
}
