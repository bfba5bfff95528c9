//! Scalar evaluators scoring how far a cube is from a sub-goal, and the sequence objective used
//! as genetic fitness.

use serde::{Deserialize, Serialize};

use crate::constants::N_FACELETS;
use crate::facelet::FaceCube;
use crate::moves::Move;

/// Counts facelets equal to the reference. A reference facelet holding a mask label (>= 6)
/// scores one more point whenever the cube facelet carries a real label.
pub fn compare(cube: &FaceCube, reference: &FaceCube) -> i32 {
    let mut cmp = 0;
    for i in 0..N_FACELETS {
        if cube.f[i] == reference.f[i] {
            cmp += 1;
        }
        if reference.f[i] > 5 && cube.f[i] < 6 {
            cmp += 1;
        }
    }
    cmp
}

/// Corner/edge pairs: two adjacent facelets on one face together with two adjacent facelets on
/// the neighbouring face. Each pair holds when both facelet couples agree.
#[rustfmt::skip]
const CORNER_EDGE_PAIRS: [[usize; 4]; 24] = [
    [0, 1, 15, 16], [0, 3, 47, 50], [47, 46, 15, 12],
    [2, 5, 18, 21], [2, 1, 17, 16], [17, 14, 18, 19],
    [8, 5, 24, 21], [8, 7, 38, 37], [38, 41, 24, 25],
    [6, 3, 53, 50], [6, 7, 36, 37], [36, 39, 53, 52],
    [29, 32, 45, 48], [29, 28, 9, 10], [9, 12, 45, 46],
    [27, 28, 11, 10], [27, 30, 20, 23], [11, 14, 20, 19],
    [33, 34, 44, 43], [33, 30, 26, 23], [44, 41, 26, 25],
    [35, 34, 42, 43], [35, 32, 51, 48], [42, 39, 51, 52],
];

/// Edge facelets against the centre of their face.
#[rustfmt::skip]
const EDGE_CENTRES: [[usize; 2]; 24] = [
    [4, 1], [4, 3], [4, 5], [4, 7],
    [13, 10], [13, 12], [13, 14], [13, 16],
    [22, 19], [22, 21], [22, 23], [22, 25],
    [31, 28], [31, 30], [31, 32], [31, 34],
    [40, 37], [40, 39], [40, 41], [40, 43],
    [49, 46], [49, 48], [49, 50], [49, 52],
];

/// The corner/edge pairs inside the 2x2x3 block spanning the B, D, L and R faces.
const BLOCK_PAIRS: [[usize; 4]; 6] = [
    [33, 34, 44, 43],
    [33, 30, 26, 23],
    [44, 41, 26, 25],
    [35, 34, 42, 43],
    [35, 32, 51, 48],
    [42, 39, 51, 52],
];

/// The edge/centre couples of the 2x2x3 block.
#[rustfmt::skip]
const BLOCK_CENTRES: [[usize; 2]; 10] = [
    [22, 23], [22, 25],
    [31, 30], [31, 32], [31, 34],
    [40, 39], [40, 41], [40, 43],
    [49, 48], [49, 52],
];

fn pairs_held(cube: &FaceCube, pairs: &[[usize; 4]]) -> i32 {
    pairs
        .iter()
        .filter(|[a, b, c, d]| cube.f[*a] == cube.f[*b] && cube.f[*c] == cube.f[*d])
        .count() as i32
}

fn centres_held(cube: &FaceCube, couples: &[[usize; 2]]) -> i32 {
    couples
        .iter()
        .filter(|[a, b]| cube.f[*a] == cube.f[*b])
        .count() as i32
}

/// Number of locally consistent corner/edge pairs and edge/centre couples, 48 when solved.
pub fn entropy(cube: &FaceCube) -> i32 {
    pairs_held(cube, &CORNER_EDGE_PAIRS) + centres_held(cube, &EDGE_CENTRES)
}

/// Coherence of the 2x2x3 block, 16 when the block is solved.
pub fn is_2x2x3(cube: &FaceCube) -> i32 {
    pairs_held(cube, &BLOCK_PAIRS) + centres_held(cube, &BLOCK_CENTRES)
}

/// Edge orientation checks of the <F, U> group: either the U-side facelet matches the F centre
/// or the other facelet matches the U centre. The sixth check compares the U centre with itself
/// and always holds.
const EDGE_ORIENTATION: [(usize, usize); 7] = [
    (1, 16),
    (3, 50),
    (5, 21),
    (7, 37),
    (28, 10),
    (46, 13),
    (19, 14),
];

/// The six corners moved by F and U: FDL, FDR, FUL, FUR, BUL, BUR.
const CORNERS: [[usize; 3]; 6] = [
    [6, 36, 53],
    [8, 38, 24],
    [0, 15, 47],
    [2, 17, 18],
    [29, 9, 45],
    [27, 11, 20],
];

/// Reference corner colour sets, built from centres, with the digit each corner gets under the
/// first and the second labelling.
const CORNER_CODES: [([usize; 3], u32, u32); 6] = [
    ([4, 40, 49], 0, 0),
    ([4, 40, 22], 1, 1),
    ([4, 13, 49], 2, 0),
    ([4, 13, 22], 2, 2),
    ([31, 13, 49], 0, 1),
    ([31, 13, 22], 1, 2),
];

/// Digit for a corner whose colours match no reference set.
const UNKNOWN_CORNER: u32 = 9;

/// Six-digit corner codes reachable inside the <F, U> group. Literal, order-sensitive lookup
/// shared by both labellings; the two labellings identify equivalent permutation classes.
#[rustfmt::skip]
pub const TWO_GEN_CORNER_CODES: [u32; 30] = [
    12201, 1221, 11022, 12120, 10212, 102210, 110220, 100122, 102021, 101202,
    210021, 221001, 211200, 210102, 212010, 21102, 2112, 22011, 21210, 20121,
    120012, 112002, 122100, 120201, 121020, 201120, 220110, 200211, 201012, 202101,
];

fn corner_code(cube: &FaceCube, second_labelling: bool) -> u32 {
    let colours = |idx: &[usize; 3]| -> u32 { idx.iter().map(|i| 1u32 << cube.f[*i]).sum() };
    CORNERS.iter().fold(0, |code, corner| {
        let set = colours(corner);
        let digit = CORNER_CODES
            .iter()
            .find(|(reference, _, _)| colours(reference) == set)
            .map(|(_, first, second)| if second_labelling { *second } else { *first })
            .unwrap_or(UNKNOWN_CORNER);
        code * 10 + digit
    })
}

/// 1 if the cube lies in the <F, U> two-generator group, 0 otherwise.
///
/// All seven edge orientation checks must hold, then the corner permutation code must be listed
/// under both labellings.
pub fn is_2gen(cube: &FaceCube) -> i32 {
    let oriented = EDGE_ORIENTATION
        .iter()
        .all(|(a, b)| cube.f[*a] == cube.f[4] || cube.f[*b] == cube.f[13]);
    if !oriented {
        return 0;
    }
    let listed = |code: u32| TWO_GEN_CORNER_CODES.contains(&code);
    if listed(corner_code(cube, false)) && listed(corner_code(cube, true)) {
        1
    } else {
        0
    }
}

/// The state evaluators selectable for [sequence_objective].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Evaluator {
    /// [compare] against the reference cube.
    Compare,
    /// [entropy].
    Entropy,
    /// [is_2x2x3].
    Block,
    /// `10 * is_2gen + 10 * is_2x2x3`.
    TwoGenBlock,
}

impl Evaluator {
    pub fn evaluate(&self, cube: &FaceCube, solved: &FaceCube) -> i32 {
        match self {
            Evaluator::Compare => compare(cube, solved),
            Evaluator::Entropy => entropy(cube),
            Evaluator::Block => is_2x2x3(cube),
            Evaluator::TwoGenBlock => 10 * is_2gen(cube) + 10 * is_2x2x3(cube),
        }
    }
}

/// Fitness of a genome: `score = 10 * peak - cut`, where `cut` is the 1-based length of the
/// shortest prefix reaching the peak value, 0 when no prefix scores above 0.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Fitness {
    pub score: i32,
    pub cut: usize,
}

impl Fitness {
    /// The best evaluator value reached along the sequence.
    pub fn peak(&self) -> i32 {
        (self.score + self.cut as i32) / 10
    }
}

/// Applies `moves` one by one to `cube` and keeps the first prefix reaching the highest
/// evaluator value. The start state itself is not evaluated.
pub fn sequence_objective(
    cube: &FaceCube,
    solved: &FaceCube,
    moves: &[Move],
    evaluator: Evaluator,
) -> Fitness {
    let mut peak = 0;
    let mut cut = 0;
    let mut cc = *cube;
    for (i, m) in moves.iter().enumerate() {
        cc.multiply_move(*m);
        let value = evaluator.evaluate(&cc, solved);
        if value > peak {
            peak = value;
            cut = i + 1;
        }
    }
    Fitness {
        score: 10 * peak - cut as i32,
        cut,
    }
}
