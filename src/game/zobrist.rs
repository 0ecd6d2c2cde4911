use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::game::board::NUM_VERTICES;

/// Base value of the empty-board hash.
const EMPTY_HASH: u64 = 0x1234567887654321;

/// Hash codes must be identical across runs, positions are compared by hash
/// between processes.
const ZOBRIST_SEED: u64 = 0x5aa3_b5d5_d5b3_aa55;

/// Cell rows are indexed black, white, empty. Empty cells contribute to the
/// hash as well, the empty board does not hash to the bare base value.
pub struct ZobristTable {
    pub cells: [[u64; NUM_VERTICES]; 3],
    pub black_to_move: u64,
    pub initial: u64,
}

pub static ZOBRIST: Lazy<ZobristTable> = Lazy::new(|| {
    let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);
    let mut cells = [[0u64; NUM_VERTICES]; 3];
    for row in cells.iter_mut() {
        for code in row.iter_mut() {
            *code = rng.gen::<u64>();
        }
    }
    ZobristTable {
        cells,
        black_to_move: rng.gen::<u64>(),
        initial: EMPTY_HASH,
    }
});
