//! SIMD-probed, tag-filtered glyph cache with LRU eviction.
//!
//! Storage: a fixed-capacity table of 16-slot groups. Each slot carries one
//! metadata byte (tag or EMPTY/DEAD sentinel) and one [`GlyphEntry`]. A
//! sentinel entry at the end of the entry array roots a doubly-linked LRU
//! chain addressed by slot index rather than pointer, so the table stays
//! relocatable.
//!
//! Capacity is fixed at construction and never grows — consistent with the
//! zero-heap-allocation-after-construction discipline the rest of this crate
//! follows for its arena-backed per-call buffers.

use crate::fingerprint::Fingerprint;

const EMPTY: u8 = 0x40;
const DEAD: u8 = 0x80;
const GROUP_WIDTH: usize = 16;

/// Atlas-space rectangle, top-left-inclusive / bottom-right-exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Rect {
    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }
}

/// Em-scaled placement data for a shaped glyph.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Layout {
    pub advance: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct GlyphEntry {
    fingerprint: Fingerprint,
    prev_lru: u32,
    next_lru: u32,
    glyph_index: u16,
    source: Rect,
    layout: Layout,
    is_rasterized: bool,
}

/// Outcome of [`GlyphTable::find_or_allocate`]: the slot now holding
/// `fingerprint`, whether it was already rasterized, and its current data.
#[derive(Debug, Clone, Copy)]
pub struct CacheLookup {
    pub id: u32,
    pub fingerprint: Fingerprint,
    pub glyph_index: u16,
    pub layout: Layout,
    pub source: Rect,
    pub is_rasterized: bool,
}

/// A fixed-capacity, LRU-evicting glyph cache.
pub struct GlyphTable {
    metadata: Vec<u8>,
    entries: Vec<GlyphEntry>,
    group_count: usize,
    hash_mask: u64,
    sentinel: u32,
}

impl GlyphTable {
    /// Builds a table with `group_count` groups of 16 slots each
    /// (`group_count` must be a power of two).
    pub fn new(group_count: usize) -> Self {
        debug_assert!(group_count.is_power_of_two());

        let slot_count = group_count * GROUP_WIDTH;
        let sentinel = slot_count as u32;

        let mut entries = vec![GlyphEntry::default(); slot_count + 1];
        entries[sentinel as usize].prev_lru = sentinel;
        entries[sentinel as usize].next_lru = sentinel;

        GlyphTable {
            metadata: vec![EMPTY; slot_count],
            entries,
            group_count,
            hash_mask: (group_count - 1) as u64,
            sentinel,
        }
    }

    /// Number of addressable (non-sentinel) slots.
    pub fn capacity(&self) -> usize {
        self.metadata.len()
    }

    /// Bytes a table with the given group count would occupy, mirroring the
    /// construction-time footprint calculation a caller would use to size a
    /// dedicated allocation.
    pub fn footprint_bytes(group_count: usize) -> usize {
        let slot_count = group_count * GROUP_WIDTH;
        slot_count + (slot_count + 1) * std::mem::size_of::<GlyphEntry>()
    }

    fn unlink(&mut self, slot: u32) {
        let (prev, next) = {
            let e = &self.entries[slot as usize];
            (e.prev_lru, e.next_lru)
        };
        self.entries[prev as usize].next_lru = next;
        self.entries[next as usize].prev_lru = prev;
    }

    fn link_mru(&mut self, slot: u32) {
        let head = self.entries[self.sentinel as usize].next_lru;
        self.entries[slot as usize].next_lru = head;
        self.entries[slot as usize].prev_lru = self.sentinel;
        self.entries[head as usize].prev_lru = slot;
        self.entries[self.sentinel as usize].next_lru = slot;
    }

    fn lru_tail(&self) -> u32 {
        self.entries[self.sentinel as usize].prev_lru
    }

    /// Finds the slot for `fp`, allocating (and evicting the LRU entry if
    /// necessary) on miss. Always succeeds: a fixed-capacity table larger
    /// than zero always has an entry to reclaim.
    pub fn find_or_allocate(&mut self, fp: Fingerprint) -> CacheLookup {
        let tag = fp.tag();
        let mut group = fp.group(self.hash_mask);
        let mut probe: u64 = 0;

        loop {
            let base = (group as usize) * GROUP_WIDTH;

            // portable stand-in for a SIMD compare+movemask over the group
            for lane in 0..GROUP_WIDTH {
                let slot = base + lane;
                let meta = self.metadata[slot];
                if meta == tag && self.entries[slot].fingerprint == fp {
                    let slot = slot as u32;
                    self.unlink(slot);
                    self.link_mru(slot);
                    return self.lookup_of(slot);
                }
            }

            // only EMPTY ends the miss scan; DEAD tombstones keep the group
            // full from this probe's perspective and fall through to the
            // next quadratic step.
            for lane in 0..GROUP_WIDTH {
                let slot = base + lane;
                if self.metadata[slot] == EMPTY {
                    let slot = slot as u32;
                    self.metadata[slot as usize] = tag;
                    self.entries[slot as usize].fingerprint = fp;
                    self.entries[slot as usize].is_rasterized = false;
                    self.link_mru(slot);
                    return self.lookup_of(slot);
                }
            }

            probe += 1;
            group = (group + probe * probe) & self.hash_mask;

            if probe as usize > self.group_count {
                // every group is fully occupied by live tags; reclaim the
                // coldest entry regardless of its probe position.
                let victim = self.lru_tail();
                debug_assert_ne!(victim, self.sentinel, "table has zero capacity");
                self.metadata[victim as usize] = DEAD;
                self.unlink(victim);

                self.metadata[victim as usize] = tag;
                self.entries[victim as usize].fingerprint = fp;
                self.entries[victim as usize].is_rasterized = false;
                self.link_mru(victim);
                return self.lookup_of(victim);
            }
        }
    }

    fn lookup_of(&self, slot: u32) -> CacheLookup {
        let e = &self.entries[slot as usize];
        CacheLookup {
            id: slot,
            fingerprint: e.fingerprint,
            glyph_index: e.glyph_index,
            layout: e.layout,
            source: e.source,
            is_rasterized: e.is_rasterized,
        }
    }

    /// Writes rasterization results into slot `id`. Does not touch LRU
    /// position.
    pub fn update(
        &mut self,
        id: u32,
        glyph_index: u16,
        layout: Layout,
        source: Rect,
        is_rasterized: bool,
    ) {
        let e = &mut self.entries[id as usize];
        e.glyph_index = glyph_index;
        e.layout = layout;
        e.source = source;
        e.is_rasterized = is_rasterized;
    }

    /// Iterates occupied slot indices from most- to least-recently-used.
    #[cfg(test)]
    fn lru_order(&self) -> Vec<u32> {
        let mut out = Vec::new();
        let mut cur = self.entries[self.sentinel as usize].next_lru;
        while cur != self.sentinel {
            out.push(cur);
            cur = self.entries[cur as usize].next_lru;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint;

    #[test]
    fn first_lookup_is_a_miss_and_not_rasterized() {
        let mut table = GlyphTable::new(4);
        let fp = fingerprint(&[65], 0, 16.0);
        let r = table.find_or_allocate(fp);
        assert!(!r.is_rasterized);
    }

    #[test]
    fn repeated_lookup_returns_same_slot() {
        let mut table = GlyphTable::new(4);
        let fp = fingerprint(&[65], 0, 16.0);
        let a = table.find_or_allocate(fp);
        let b = table.find_or_allocate(fp);
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn update_marks_rasterized_and_is_visible_on_next_lookup() {
        let mut table = GlyphTable::new(4);
        let fp = fingerprint(&[65], 0, 16.0);
        let r = table.find_or_allocate(fp);
        table.update(r.id, 7, Layout { advance: 8.0, offset_x: 0.0, offset_y: 0.0 }, Rect {
            left: 0,
            top: 0,
            right: 8,
            bottom: 16,
        }, true);
        let r2 = table.find_or_allocate(fp);
        assert!(r2.is_rasterized);
        assert_eq!(r2.glyph_index, 7);
    }

    #[test]
    fn lru_order_is_most_recent_first() {
        let mut table = GlyphTable::new(4);
        let a = table.find_or_allocate(fingerprint(&['a' as u32], 0, 16.0)).id;
        let b = table.find_or_allocate(fingerprint(&['b' as u32], 0, 16.0)).id;
        let c = table.find_or_allocate(fingerprint(&['c' as u32], 0, 16.0)).id;
        assert_eq!(table.lru_order(), vec![c, b, a]);
    }

    #[test]
    fn reaccessing_an_entry_moves_it_to_mru() {
        let mut table = GlyphTable::new(4);
        let a = table.find_or_allocate(fingerprint(&['a' as u32], 0, 16.0)).id;
        let b = table.find_or_allocate(fingerprint(&['b' as u32], 0, 16.0)).id;
        table.find_or_allocate(fingerprint(&['a' as u32], 0, 16.0));
        assert_eq!(table.lru_order(), vec![a, b]);
    }

    #[test]
    fn eviction_reclaims_the_lru_tail_when_full() {
        // group_count=1 => 16 slots; force more than 16 distinct entries
        let mut table = GlyphTable::new(1);
        let mut ids = Vec::new();
        for cp in 0u32..20 {
            let fp = fingerprint(&[cp], 0, 16.0);
            ids.push(table.find_or_allocate(fp).id);
        }
        // the very first fingerprint should have been evicted by the time
        // we've inserted 20 distinct entries into a 16-slot table
        let first_fp = fingerprint(&[0u32], 0, 16.0);
        let refreshed = table.find_or_allocate(first_fp);
        assert!(!refreshed.is_rasterized);
    }
}
