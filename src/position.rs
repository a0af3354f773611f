//! # Slot Allocation
//!
//! Gives every non-duplicate tile its final slot in the store image. Tiles a generator pinned
//! keep their slot; everything else is filled in afterwards.
//!
//! The coarse store also has to keep animation groups aligned: a 4 frame group must start on a
//! multiple of 4 and an 8 frame group on a multiple of 8, with the child frames in the slots
//! directly after the master.

use std::collections::{HashSet, VecDeque};

use log::debug;

use crate::{
    dedupe::DedupedTile,
    encode::EncodedTile,
    error::{CompileError, Result},
    tile::TileId,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionedTile<P> {
    pub tile: EncodedTile<P>,
    pub duplicate_of: Option<TileId>,
    /// `None` for duplicates, which borrow their canonical tile's slot
    pub slot: Option<u32>,
}

const FOUR_FRAME_CHILDREN: usize = 3;
const EIGHT_FRAME_CHILDREN: usize = 7;

/// Allocate the coarse store.
///
/// Starting one past the highest pinned slot, and while free tiles remain, each step places an 8
/// frame group if the cursor is 8-aligned, else a 4 frame group if it is 4-aligned, else a single
/// free tile. Groups are taken in input order. Once free tiles run out the cursor is rounded up to
/// a multiple of 8 and the remaining groups are flushed, eights first, last declared first.
pub fn allocate_coarse<P>(tiles: Vec<DedupedTile<P>>) -> Result<Vec<PositionedTile<P>>> {
    let mut slots: Vec<Option<u32>> = tiles.iter().map(|t| t.tile.fixed_slot).collect();

    // children of a pinned master follow it directly
    for tile in &tiles {
        if let Some(master_slot) = tile.tile.fixed_slot {
            for (k, &child) in tile.tile.child_frames.iter().enumerate() {
                if slots[child].is_none() {
                    slots[child] = Some(master_slot + 1 + k as u32);
                }
            }
        }
    }

    let mut free = VecDeque::new();
    let mut fours = VecDeque::new();
    let mut eights = VecDeque::new();
    for (id, tile) in tiles.iter().enumerate() {
        if slots[id].is_some() || tile.duplicate_of.is_some() || tile.tile.child_of.is_some() {
            continue;
        }
        match tile.tile.child_frames.len() {
            0 => free.push_back(id),
            FOUR_FRAME_CHILDREN => fours.push_back(id),
            EIGHT_FRAME_CHILDREN => eights.push_back(id),
            // left unslotted, the coverage check reports it
            _ => {}
        }
    }

    debug!(
        "Coarse allocation: {} free tiles, {} four-frame groups, {} eight-frame groups",
        free.len(),
        fours.len(),
        eights.len()
    );

    let place = |slots: &mut Vec<Option<u32>>, master: TileId, at: u32| {
        slots[master] = Some(at);
        for (k, &child) in tiles[master].tile.child_frames.iter().enumerate() {
            slots[child] = Some(at + 1 + k as u32);
        }
        1 + tiles[master].tile.child_frames.len() as u32
    };

    let mut cursor = slots.iter().flatten().max().map_or(0, |&max| max + 1);

    while !free.is_empty() {
        if cursor % 8 == 0 {
            if let Some(master) = eights.pop_front() {
                cursor += place(&mut slots, master, cursor);
                continue;
            }
        }
        if cursor % 4 == 0 {
            if let Some(master) = fours.pop_front() {
                cursor += place(&mut slots, master, cursor);
                continue;
            }
        }
        if let Some(id) = free.pop_front() {
            slots[id] = Some(cursor);
            cursor += 1;
        }
    }

    // leftover groups are flushed from the back of each queue
    cursor = round_up(cursor, 8);
    while let Some(master) = eights.pop_back() {
        cursor += place(&mut slots, master, cursor);
    }
    while let Some(master) = fours.pop_back() {
        cursor += place(&mut slots, master, cursor);
    }

    finish(tiles, slots)
}

/// Allocate the fine store: every unslotted tile takes the lowest unclaimed slot at or above
/// `first_free_slot`, in input order.
pub fn allocate_fine<P>(
    tiles: Vec<DedupedTile<P>>,
    first_free_slot: u32,
) -> Result<Vec<PositionedTile<P>>> {
    let mut slots: Vec<Option<u32>> = tiles.iter().map(|t| t.tile.fixed_slot).collect();
    let mut claimed: HashSet<u32> = slots.iter().flatten().copied().collect();

    let mut next = first_free_slot;
    for (id, tile) in tiles.iter().enumerate() {
        if slots[id].is_some() || tile.duplicate_of.is_some() {
            continue;
        }
        while claimed.contains(&next) {
            next += 1;
        }
        slots[id] = Some(next);
        claimed.insert(next);
    }

    finish(tiles, slots)
}

fn round_up(value: u32, multiple: u32) -> u32 {
    value.div_ceil(multiple) * multiple
}

/// Every tile must leave allocation with a slot or a duplicate link
fn finish<P>(
    tiles: Vec<DedupedTile<P>>,
    slots: Vec<Option<u32>>,
) -> Result<Vec<PositionedTile<P>>> {
    let unpositioned: Vec<TileId> = tiles
        .iter()
        .zip(&slots)
        .enumerate()
        .filter(|(_, (tile, slot))| slot.is_none() && tile.duplicate_of.is_none())
        .map(|(id, _)| id)
        .collect();

    if let Some(&first) = unpositioned.first() {
        return Err(CompileError::Unpositioned {
            count: unpositioned.len(),
            first,
        });
    }

    Ok(tiles
        .into_iter()
        .zip(slots)
        .map(|(deduped, slot)| PositionedTile {
            slot: if deduped.duplicate_of.is_some() { None } else { slot },
            tile: deduped.tile,
            duplicate_of: deduped.duplicate_of,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free_tiles(count: usize) -> Vec<DedupedTile<()>> {
        (0..count)
            .map(|_| DedupedTile {
                tile: EncodedTile::new(()),
                duplicate_of: None,
            })
            .collect()
    }

    /// Append a master plus `children` child frames, returning the master's id
    fn add_group(tiles: &mut Vec<DedupedTile<()>>, children: usize) -> TileId {
        let master = tiles.len();
        tiles.extend(free_tiles(children + 1));
        let child_ids: Vec<TileId> = (master + 1..=master + children).collect();
        for &c in &child_ids {
            tiles[c].tile.child_of = Some(master);
        }
        tiles[master].tile.child_frames = child_ids;
        master
    }

    fn slots<P>(positioned: &[PositionedTile<P>]) -> Vec<Option<u32>> {
        positioned.iter().map(|p| p.slot).collect()
    }

    #[test]
    fn coarse_free_tiles_start_after_pinned() {
        let mut tiles = free_tiles(3);
        tiles[1].tile.fixed_slot = Some(0xFF);

        let positioned = allocate_coarse(tiles).unwrap();
        assert_eq!(slots(&positioned), vec![Some(0x100), Some(0xFF), Some(0x101)]);
    }

    #[test]
    fn coarse_groups_are_aligned() {
        let mut tiles = free_tiles(1);
        let four = add_group(&mut tiles, 3);
        let eight = add_group(&mut tiles, 7);
        tiles.extend(free_tiles(2));

        let positioned = allocate_coarse(tiles).unwrap();
        let slots = slots(&positioned);

        // slot 0 is 8-aligned so the eight group goes first, then the four group at 8
        assert_eq!(slots[eight], Some(0));
        assert_eq!(slots[four], Some(8));
        assert_eq!(slots[0], Some(12));
        for (k, child) in (eight + 1..eight + 8).enumerate() {
            assert_eq!(slots[child], Some(1 + k as u32));
        }
        for (k, child) in (four + 1..four + 4).enumerate() {
            assert_eq!(slots[child], Some(9 + k as u32));
        }
        assert_eq!(slots[slots.len() - 2..], [Some(13), Some(14)]);
    }

    #[test]
    fn coarse_leftover_groups_flush_after_rounding() {
        let mut tiles = free_tiles(1);
        tiles[0].tile.fixed_slot = Some(0);
        let first_free = tiles.len();
        tiles.extend(free_tiles(1));
        let four = add_group(&mut tiles, 3);
        let eight = add_group(&mut tiles, 7);

        let positioned = allocate_coarse(tiles).unwrap();
        let slots = slots(&positioned);

        // the free tile takes 1, then free tiles are gone, so the cursor rounds up to 8 and the
        // groups flush eights first
        assert_eq!(slots[first_free], Some(1));
        assert_eq!(slots[eight], Some(8));
        assert_eq!(slots[four], Some(16));
    }

    #[test]
    fn coarse_leftover_groups_flush_last_declared_first() {
        let mut tiles = free_tiles(1);
        tiles[0].tile.fixed_slot = Some(0);
        tiles.extend(free_tiles(1));
        let eight_a = add_group(&mut tiles, 7);
        let eight_b = add_group(&mut tiles, 7);
        let four_a = add_group(&mut tiles, 3);
        let four_b = add_group(&mut tiles, 3);

        let positioned = allocate_coarse(tiles).unwrap();
        let slots = slots(&positioned);

        assert_eq!(slots[eight_b], Some(8));
        assert_eq!(slots[eight_a], Some(16));
        assert_eq!(slots[four_b], Some(24));
        assert_eq!(slots[four_a], Some(28));
        for (k, child) in (eight_a + 1..eight_a + 8).enumerate() {
            assert_eq!(slots[child], Some(17 + k as u32));
        }
    }

    #[test]
    fn coarse_groups_without_free_tiles_go_straight_to_the_flush() {
        let mut tiles = Vec::new();
        let first = add_group(&mut tiles, 7);
        let second = add_group(&mut tiles, 7);

        let positioned = allocate_coarse(tiles).unwrap();
        let slots = slots(&positioned);

        assert_eq!(slots[second], Some(0));
        assert_eq!(slots[first], Some(8));
    }

    #[test]
    fn coarse_alignment_holds_for_every_group() {
        let mut tiles = free_tiles(3);
        let mut fours = Vec::new();
        let mut eights = Vec::new();
        for _ in 0..3 {
            fours.push(add_group(&mut tiles, 3));
            tiles.extend(free_tiles(1));
            eights.push(add_group(&mut tiles, 7));
        }

        let positioned = allocate_coarse(tiles).unwrap();

        for &m in &fours {
            assert_eq!(positioned[m].slot.unwrap() % 4, 0);
        }
        for &m in &eights {
            assert_eq!(positioned[m].slot.unwrap() % 8, 0);
        }

        let mut taken = HashSet::new();
        for p in &positioned {
            assert!(taken.insert(p.slot.unwrap()), "slot {:?} used twice", p.slot);
        }
    }

    #[test]
    fn pinned_master_keeps_children_alongside() {
        let mut tiles = Vec::new();
        let four = add_group(&mut tiles, 3);
        tiles[four].tile.fixed_slot = Some(16);

        let positioned = allocate_coarse(tiles).unwrap();
        assert_eq!(slots(&positioned), vec![Some(16), Some(17), Some(18), Some(19)]);
    }

    #[test]
    fn duplicates_get_no_slot() {
        let mut tiles = free_tiles(3);
        tiles[1].duplicate_of = Some(0);

        let positioned = allocate_coarse(tiles).unwrap();
        assert_eq!(slots(&positioned), vec![Some(0), None, Some(1)]);
    }

    #[test]
    fn odd_sized_groups_are_unpositioned() {
        let mut tiles = free_tiles(1);
        add_group(&mut tiles, 2);

        assert!(matches!(
            allocate_coarse(tiles),
            Err(CompileError::Unpositioned { count: 3, first: 1 })
        ));
    }

    #[test]
    fn fine_is_first_fit() {
        let mut tiles = free_tiles(4);
        tiles[0].tile.fixed_slot = Some(1);
        tiles[2].duplicate_of = Some(1);

        let positioned = allocate_fine(tiles, 0).unwrap();
        assert_eq!(slots(&positioned), vec![Some(1), Some(0), None, Some(2)]);
    }

    #[test]
    fn fine_respects_first_free_slot() {
        let mut tiles = free_tiles(3);
        tiles[2].tile.fixed_slot = Some(0x21);

        let positioned = allocate_fine(tiles, 0x20).unwrap();
        assert_eq!(slots(&positioned), vec![Some(0x20), Some(0x22), Some(0x21)]);
    }
}
