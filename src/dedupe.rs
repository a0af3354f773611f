//! # Tile Deduplication
//!
//! Tiles whose encoded bytes match an earlier tile are linked to it instead of taking a slot of
//! their own. Payloads are bucketed by an XxHash64 of their bytes and each bucket hit is verified
//! byte for byte before linking.
//!
//! Two kinds of tile are kept out of the relation:
//! - animated tiles (masters and children), whose slots are fixed relative to their group,
//!   are neither duplicates nor targets;
//! - tiles pinned to a slot by a generator never become duplicates, though they may be targets.

use std::{
    collections::HashMap,
    hash::{Hash, Hasher},
};

use twox_hash::XxHash64;

use crate::{encode::EncodedTile, position::PositionedTile, tile::TileId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DedupedTile<P> {
    pub tile: EncodedTile<P>,
    /// Always an earlier, canonical tile
    pub duplicate_of: Option<TileId>,
}

/// A tile as seen by emission and layout output, with duplicates already resolved to their
/// canonical tile's slot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacedTile<P> {
    pub id: TileId,
    pub slot: Option<u32>,
    pub duplicate_of: Option<TileId>,
    pub palette_index: Option<usize>,
    pub priority: i64,
    pub child_of: Option<TileId>,
    pub child_frames: Vec<TileId>,
    pub payload: P,
}

pub fn mark_dupes<P: Hash + Eq>(tiles: Vec<EncodedTile<P>>) -> Vec<DedupedTile<P>> {
    let mut deduped: Vec<DedupedTile<P>> = tiles
        .into_iter()
        .map(|tile| DedupedTile { tile, duplicate_of: None })
        .collect();
    link_dupes(&mut deduped);
    deduped
}

/// Link every eligible tile to the first earlier tile with the same payload. Tiles already
/// marked as duplicates are skipped on both sides, so running this twice changes nothing.
///
/// Returns how many tiles were newly linked.
pub fn link_dupes<P: Hash + Eq>(tiles: &mut [DedupedTile<P>]) -> usize {
    let mut buckets: HashMap<u64, Vec<TileId>> = HashMap::new();
    let mut linked = 0;

    for id in 0..tiles.len() {
        if tiles[id].duplicate_of.is_some() || tiles[id].tile.is_animated() {
            continue;
        }

        let bucket = buckets.entry(payload_hash(&tiles[id].tile.payload)).or_default();
        // verify to rule out hash collisions
        let canonical = bucket
            .iter()
            .copied()
            .find(|&c| tiles[c].tile.payload == tiles[id].tile.payload);

        match canonical {
            Some(c) if tiles[id].tile.fixed_slot.is_none() => {
                tiles[id].duplicate_of = Some(c);
                linked += 1;
            }
            _ => bucket.push(id),
        }
    }

    linked
}

fn payload_hash<P: Hash>(payload: &P) -> u64 {
    let mut hasher = XxHash64::default();
    payload.hash(&mut hasher);
    hasher.finish()
}

/// Flatten a positioned store into a view where each duplicate carries its canonical tile's slot.
/// The positioned tiles themselves are not touched.
pub fn denormalize_dupes<P: Clone>(tiles: &[PositionedTile<P>]) -> Vec<PlacedTile<P>> {
    tiles
        .iter()
        .enumerate()
        .map(|(id, positioned)| {
            let slot = match positioned.duplicate_of {
                Some(canonical) => tiles[canonical].slot,
                None => positioned.slot,
            };
            PlacedTile {
                id,
                slot,
                duplicate_of: positioned.duplicate_of,
                palette_index: positioned.tile.palette_index,
                priority: positioned.tile.priority,
                child_of: positioned.tile.child_of,
                child_frames: positioned.tile.child_frames.clone(),
                payload: positioned.tile.payload.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiles(payloads: &[u8]) -> Vec<EncodedTile<[u8; 4]>> {
        payloads.iter().map(|&b| EncodedTile::new([b; 4])).collect()
    }

    fn links<P>(deduped: &[DedupedTile<P>]) -> Vec<Option<TileId>> {
        deduped.iter().map(|t| t.duplicate_of).collect()
    }

    #[test]
    fn identical_tiles_link_to_the_first() {
        let deduped = mark_dupes(tiles(&[1, 2, 1, 1, 2]));
        assert_eq!(links(&deduped), vec![None, None, Some(0), Some(0), Some(1)]);
    }

    #[test]
    fn animated_tiles_are_left_out() {
        let mut input = tiles(&[1, 1, 1, 1]);
        input[0].child_frames = vec![1];
        input[1].child_of = Some(0);

        let deduped = mark_dupes(input);
        // tile 2 cannot point at the master, so it becomes the canonical copy
        assert_eq!(links(&deduped), vec![None, None, None, Some(2)]);
    }

    #[test]
    fn pinned_tiles_are_targets_but_never_duplicates() {
        let mut input = tiles(&[7, 7, 7]);
        input[1].fixed_slot = Some(0xFF);

        let deduped = mark_dupes(input);
        assert_eq!(links(&deduped), vec![None, None, Some(0)]);

        let mut input = tiles(&[7, 7]);
        input[0].fixed_slot = Some(0xFF);
        let deduped = mark_dupes(input);
        assert_eq!(links(&deduped), vec![None, Some(0)]);
    }

    #[test]
    fn marking_twice_is_a_no_op() {
        let mut deduped = mark_dupes(tiles(&[3, 3, 4, 3]));
        let before = links(&deduped);
        assert_eq!(link_dupes(&mut deduped), 0);
        assert_eq!(links(&deduped), before);
    }

    #[test]
    fn duplicates_share_payloads() {
        let deduped = mark_dupes(tiles(&[9, 8, 9, 8, 7]));
        for tile in &deduped {
            if let Some(canonical) = tile.duplicate_of {
                assert_eq!(tile.tile.payload, deduped[canonical].tile.payload);
                assert!(deduped[canonical].duplicate_of.is_none());
            }
        }
    }

    #[test]
    fn denormalize_copies_the_canonical_slot() {
        let deduped = mark_dupes(tiles(&[5, 5]));
        let positioned: Vec<PositionedTile<[u8; 4]>> = deduped
            .into_iter()
            .map(|d| PositionedTile {
                slot: if d.duplicate_of.is_none() { Some(12) } else { None },
                tile: d.tile,
                duplicate_of: d.duplicate_of,
            })
            .collect();

        let placed = denormalize_dupes(&positioned);

        assert_eq!(placed[1].slot, Some(12));
        assert_eq!(placed[1].duplicate_of, Some(0));
        assert_eq!(placed[0].slot, Some(12));
        // the source graph keeps the duplicate unslotted
        assert_eq!(positioned[1].slot, None);
    }
}
