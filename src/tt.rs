//! Transposition table shared by all search threads.
//!
//! Lockless: every slot is a pair of `AtomicU64` holding `key ^ data` and
//! `data`. A reader recomputes the key from both words and discards the slot
//! if they came from two different writes.

use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};

use log::info;

use crate::board::Move;

/// Which side of the search window a stored score lies on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    /// Score is exact (a PV node)
    Exact,
    /// Score is at least this value (failed high)
    Lower,
    /// Score is at most this value (failed low)
    Upper,
}

impl Bound {
    fn to_bits(self) -> u64 {
        match self {
            Bound::Exact => 0,
            Bound::Lower => 1,
            Bound::Upper => 2,
        }
    }

    fn from_bits(v: u64) -> Self {
        match v & 0x3 {
            0 => Bound::Exact,
            1 => Bound::Lower,
            _ => Bound::Upper,
        }
    }
}

/// Unpacked entry returned by a probe
#[derive(Clone, Copy, Debug)]
pub struct TtEntry {
    pub depth: i32,
    pub score: i32,
    pub eval: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

/// Packed layout:
/// - bits 0-15:  move (0 = none)
/// - bits 16-31: score (i16)
/// - bits 32-47: static eval (i16)
/// - bits 48-55: depth (u8)
/// - bits 56-57: bound
/// - bits 58-63: generation
fn pack(depth: i32, score: i32, eval: i32, bound: Bound, best_move: Option<Move>, generation: u8) -> u64 {
    let mv = best_move.map_or(0, Move::as_u16) as u64;
    let score = score.clamp(i16::MIN as i32, i16::MAX as i32) as i16 as u16 as u64;
    let eval = eval.clamp(i16::MIN as i32, i16::MAX as i32) as i16 as u16 as u64;
    let depth = depth.clamp(0, u8::MAX as i32) as u64;
    mv | (score << 16) | (eval << 32) | (depth << 48) | (bound.to_bits() << 56) | (((generation & 0x3F) as u64) << 58)
}

fn unpack(data: u64) -> TtEntry {
    let mv = (data & 0xFFFF) as u16;
    TtEntry {
        depth: ((data >> 48) & 0xFF) as i32,
        score: ((data >> 16) & 0xFFFF) as u16 as i16 as i32,
        eval: ((data >> 32) & 0xFFFF) as u16 as i16 as i32,
        bound: Bound::from_bits(data >> 56),
        best_move: (mv != 0).then(|| Move::from_u16(mv)),
    }
}

fn generation_of(data: u64) -> u8 {
    ((data >> 58) & 0x3F) as u8
}

fn depth_of(data: u64) -> u8 {
    ((data >> 48) & 0xFF) as u8
}

#[repr(C)]
struct Slot {
    key_xor: AtomicU64,
    data: AtomicU64,
}

impl Slot {
    fn new() -> Self {
        Slot {
            key_xor: AtomicU64::new(0),
            data: AtomicU64::new(0),
        }
    }

    fn store(&self, key: u64, data: u64) {
        self.data.store(data, Ordering::Relaxed);
        self.key_xor.store(key ^ data, Ordering::Relaxed);
    }

    /// Raw data if this slot holds `key`
    fn load(&self, key: u64) -> Option<u64> {
        let key_xor = self.key_xor.load(Ordering::Relaxed);
        let data = self.data.load(Ordering::Relaxed);
        (data != 0 && key_xor ^ data == key).then_some(data)
    }

    fn clear(&self) {
        self.key_xor.store(0, Ordering::Relaxed);
        self.data.store(0, Ordering::Relaxed);
    }
}

const BUCKET_SIZE: usize = 4;

#[repr(C)]
struct Bucket {
    slots: [Slot; BUCKET_SIZE],
}

impl Bucket {
    fn new() -> Self {
        Bucket {
            slots: [Slot::new(), Slot::new(), Slot::new(), Slot::new()],
        }
    }
}

/// Thread-safe transposition table sized in megabytes.
pub struct TranspositionTable {
    buckets: Vec<Bucket>,
    mask: usize,
    size_mb: usize,
}

impl TranspositionTable {
    /// Allocate a table of at most `size_mb` megabytes (rounded down to a
    /// power-of-two bucket count, minimum 1 MB worth of buckets).
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let size_mb = size_mb.max(1);
        let wanted = size_mb * 1024 * 1024 / mem::size_of::<Bucket>();
        let count = if wanted.is_power_of_two() {
            wanted
        } else {
            wanted.next_power_of_two() / 2
        };
        let buckets: Vec<Bucket> = (0..count).map(|_| Bucket::new()).collect();
        info!("transposition table: {size_mb} MB, {count} buckets");
        TranspositionTable {
            buckets,
            mask: count - 1,
            size_mb,
        }
    }

    #[must_use]
    pub fn size_mb(&self) -> usize {
        self.size_mb
    }

    #[inline]
    fn bucket(&self, key: u64) -> &Bucket {
        &self.buckets[(key as usize) & self.mask]
    }

    /// Look up `key`
    #[must_use]
    pub fn probe(&self, key: u64) -> Option<TtEntry> {
        self.bucket(key)
            .slots
            .iter()
            .find_map(|slot| slot.load(key))
            .map(unpack)
    }

    /// Store an entry. Prefers an empty slot or the slot already holding
    /// this key, otherwise evicts the shallowest and oldest entry.
    #[allow(clippy::too_many_arguments)]
    pub fn store(
        &self,
        key: u64,
        depth: i32,
        score: i32,
        eval: i32,
        bound: Bound,
        best_move: Option<Move>,
        generation: u8,
    ) {
        let bucket = self.bucket(key);
        let mut best_move = best_move;
        let mut target = None;
        for slot in &bucket.slots {
            if let Some(old) = slot.load(key) {
                // Keep the old move when the new entry has none
                if best_move.is_none() {
                    best_move = unpack(old).best_move;
                }
                target = Some(slot);
                break;
            }
            if slot.data.load(Ordering::Relaxed) == 0 {
                target = Some(slot);
                break;
            }
        }
        let slot = target.unwrap_or_else(|| {
            let priority = |slot: &Slot| {
                let data = slot.data.load(Ordering::Relaxed);
                let age = generation.wrapping_sub(generation_of(data)) & 0x3F;
                depth_of(data) as i32 - 4 * age as i32
            };
            bucket
                .slots
                .iter()
                .min_by_key(|slot| priority(*slot))
                .unwrap_or(&bucket.slots[0])
        });
        slot.store(key, pack(depth, score, eval, bound, best_move, generation));
    }

    /// Occupancy in per mille, sampled from the first buckets
    #[must_use]
    pub fn hashfull(&self) -> u32 {
        let sample = self.buckets.len().min(1000);
        let used: usize = self.buckets[..sample]
            .iter()
            .map(|b| b.slots.iter().filter(|s| s.data.load(Ordering::Relaxed) != 0).count())
            .sum();
        (used * 1000 / (sample * BUCKET_SIZE)) as u32
    }

    pub fn clear(&self) {
        for bucket in &self.buckets {
            for slot in &bucket.slots {
                slot.clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Square;

    #[test]
    fn test_pack_unpack_preserves_fields() {
        let mv = Move::new(Square::E1, Square::G1);
        let data = pack(12, -31_000, 245, Bound::Lower, Some(mv), 37);
        let entry = unpack(data);
        assert_eq!(entry.depth, 12);
        assert_eq!(entry.score, -31_000);
        assert_eq!(entry.eval, 245);
        assert_eq!(entry.bound, Bound::Lower);
        assert_eq!(entry.best_move, Some(mv));
        assert_eq!(generation_of(data), 37);
    }

    #[test]
    fn test_store_and_probe() {
        let tt = TranspositionTable::new(1);
        let key = 0x1234_5678_9ABC_DEF0;
        tt.store(key, 10, 500, 40, Bound::Exact, None, 1);
        let entry = tt.probe(key).expect("entry stored");
        assert_eq!(entry.depth, 10);
        assert_eq!(entry.score, 500);
        assert_eq!(entry.bound, Bound::Exact);
        assert!(tt.probe(0xFEDC_BA98_7654_3210).is_none());
    }

    #[test]
    fn test_update_keeps_previous_move() {
        let tt = TranspositionTable::new(1);
        let key = 42;
        let mv = Move::new(Square::A1, Square::H1);
        tt.store(key, 3, 10, 0, Bound::Lower, Some(mv), 1);
        tt.store(key, 5, 20, 0, Bound::Upper, None, 1);
        let entry = tt.probe(key).unwrap();
        assert_eq!(entry.depth, 5);
        assert_eq!(entry.best_move, Some(mv));
    }

    #[test]
    fn test_clear_and_hashfull() {
        let tt = TranspositionTable::new(1);
        for key in 0..4000u64 {
            tt.store(key.wrapping_mul(0x9E37_79B9_7F4A_7C15) | 1, 1, 0, 0, Bound::Exact, None, 0);
        }
        assert!(tt.hashfull() > 0);
        tt.clear();
        assert_eq!(tt.hashfull(), 0);
    }
}
