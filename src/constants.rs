use crate::moves::Move::{self, *};

/// Number of facelets on the cube surface.
pub const N_FACELETS: usize = 54;
/// Number of faces.
pub const N_FACES: usize = 6;
/// Number of move symbols.
pub const N_MOVE: usize = 18;
/// Number of canonical re-orientations searched for the 2x2x3 block.
pub const N_LOCATIONS: usize = 12;

/// Maximum of [crate::eval::entropy], reached by the solved cube.
pub const ENTROPY_MAX: i32 = 48;
/// Maximum of [crate::eval::is_2x2x3], reached when the block is solved.
pub const BLOCK_MAX: i32 = 16;
/// Peak of the combined evaluator once the cube is in the 2-gen group with the block solved.
pub const TWO_GEN_PEAK: i32 = 10 + 10 * BLOCK_MAX;

#[rustfmt::skip]
pub const ALL_MOVES: [Move; N_MOVE] = [
    F, U, R, B, D, L,
    F2, U2, R2, B2, D2, L2,
    F3, U3, R3, B3, D3, L3,
];

/// The moves of the two-generator group <F, U>.
pub const TWO_GEN_MOVES: [Move; 6] = [F, U, F2, U2, F3, U3];
