use ndarray::Array4;

use crate::game::board::{Board, Color, BOARD_SIZE, NUM_INTERSECTIONS};
use crate::game::state::GameState;

pub const HISTORY_PLANES: usize = 8;
pub const INPUT_PLANES: usize = 2 * HISTORY_PLANES + 2;

/// One input plane of the network: a bit per intersection, indexed by
/// `y * BOARD_SIZE + x`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Plane {
    bits: [u64; 4],
}

impl Plane {
    pub fn new() -> Plane {
        Plane { bits: [0; 4] }
    }

    pub fn new_with_all(val: bool) -> Plane {
        if val {
            Plane {
                bits: [
                    u64::MAX,
                    u64::MAX,
                    u64::MAX,
                    (1u64 << (NUM_INTERSECTIONS % 64)) - 1,
                ],
            }
        } else {
            Plane::new()
        }
    }

    pub fn get(&self, idx: usize) -> bool {
        assert!(idx < NUM_INTERSECTIONS);
        (self.bits[idx / 64] & (1u64 << (idx % 64))) != 0
    }

    pub fn set(&mut self, idx: usize, val: bool) {
        assert!(idx < NUM_INTERSECTIONS);
        if val {
            self.bits[idx / 64] |= 1u64 << (idx % 64);
        } else {
            self.bits[idx / 64] &= !(1u64 << (idx % 64));
        }
    }

    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }
}

impl Default for Plane {
    fn default() -> Self {
        Plane::new()
    }
}

fn stones_plane(board: &Board, color: Color) -> Plane {
    let mut plane = Plane::new();
    for idx in 0..NUM_INTERSECTIONS {
        let (x, y) = (idx % BOARD_SIZE, idx / BOARD_SIZE);
        if board.cell(x, y).color() == Some(color) {
            plane.set(idx, true);
        }
    }
    plane
}

/// Encode a position into the network input planes.
pub fn position_to_planes(state: &GameState) -> Vec<Plane> {
    let to_move = state.board().to_move();
    let mut planes = Vec::with_capacity(INPUT_PLANES);

    /* 8 planes of the side to move's stones, current position first. Early in
     * the game the missing history repeats the oldest known position. */
    for t in 0..HISTORY_PLANES {
        let board = state.past_board(t.min(state.move_num()));
        planes.push(stones_plane(board, to_move));
    }
    /* 8 planes of the opponent's stones */
    for t in 0..HISTORY_PLANES {
        let board = state.past_board(t.min(state.move_num()));
        planes.push(stones_plane(board, to_move.opposite()));
    }
    /* two planes encoding the side to move */
    planes.push(Plane::new_with_all(to_move == Color::Black));
    planes.push(Plane::new_with_all(to_move == Color::White));

    planes
}

pub fn planes_to_tensor(samples: &[Vec<Plane>]) -> Array4<f32> {
    let batch_size = samples.len();
    let dims = (batch_size, INPUT_PLANES, BOARD_SIZE, BOARD_SIZE);
    let mut tensor: Array4<f32> = Array4::zeros(dims);

    for (b, sample) in samples.iter().enumerate() {
        for (c, plane) in sample.iter().enumerate() {
            for h in 0..BOARD_SIZE {
                for w in 0..BOARD_SIZE {
                    tensor[(b, c, h, w)] = match plane.get(h * BOARD_SIZE + w) {
                        true => 1.0,
                        false => 0.0,
                    };
                }
            }
        }
    }

    tensor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::board::{Board, Move, BOARD_SIZE, NUM_INTERSECTIONS};

    #[test]
    fn plane_bits() {
        let mut plane = Plane::new();
        assert_eq!(plane.count(), 0);

        for idx in [0, 63, 64, 224] {
            plane.set(idx, true);
            assert!(plane.get(idx));
        }
        assert_eq!(plane.count(), 4);
        plane.set(63, false);
        assert!(!plane.get(63));
        assert_eq!(plane.count(), 3);

        assert_eq!(Plane::new_with_all(true).count(), NUM_INTERSECTIONS);
        assert_eq!(Plane::new_with_all(false).count(), 0);
    }

    #[test]
    fn initial_position_planes() {
        let state = GameState::new();
        let planes = position_to_planes(&state);
        assert_eq!(planes.len(), INPUT_PLANES);

        /* no stones yet */
        for plane in &planes[..2 * HISTORY_PLANES] {
            assert_eq!(plane.count(), 0);
        }
        /* black to move */
        assert_eq!(planes[2 * HISTORY_PLANES].count(), NUM_INTERSECTIONS);
        assert_eq!(planes[2 * HISTORY_PLANES + 1].count(), 0);
    }

    #[test]
    fn history_planes_shift() {
        let mut state = GameState::new();
        let h8 = Move::from_text("h8").unwrap();
        let j9 = Move::from_text("j9").unwrap();
        state.play(h8);
        state.play(j9);

        /* black to move again */
        let planes = position_to_planes(&state);

        let idx_of = |m: Move| match m {
            Move::Place(v) => {
                let (x, y) = Board::xy(v);
                y * BOARD_SIZE + x
            }
            _ => panic!(),
        };

        /* current: planes[0] = black stones, planes[8] = white stones */
        assert!(planes[0].get(idx_of(h8)));
        assert_eq!(planes[0].count(), 1);
        assert!(planes[HISTORY_PLANES].get(idx_of(j9)));
        assert_eq!(planes[HISTORY_PLANES].count(), 1);

        /* one move ago: white had not answered yet */
        assert!(planes[1].get(idx_of(h8)));
        assert_eq!(planes[HISTORY_PLANES + 1].count(), 0);

        /* two moves ago and older: empty board repeated */
        assert_eq!(planes[2].count(), 0);
        assert_eq!(planes[7].count(), 0);

        /* side to move planes */
        assert_eq!(planes[16].count(), NUM_INTERSECTIONS);
        assert_eq!(planes[17].count(), 0);
    }

    #[test]
    fn tensor_layout() {
        let mut state = GameState::new();
        state.play(Move::from_text("a1").unwrap());

        let planes = position_to_planes(&state);
        let tensor = planes_to_tensor(&[planes]);
        assert_eq!(tensor.shape(), &[1, INPUT_PLANES, BOARD_SIZE, BOARD_SIZE]);

        /* white to move now, so black stones are in the opponent planes */
        assert_eq!(tensor[(0, HISTORY_PLANES, 0, 0)], 1.0);
        assert_eq!(tensor[(0, 0, 0, 0)], 0.0);
        /* white-to-move plane is all ones */
        assert_eq!(tensor[(0, 17, 3, 11)], 1.0);
        assert_eq!(tensor[(0, 16, 3, 11)], 0.0);
    }
}
