use std::fmt;

use crate::constants::{ALL_MOVES, N_FACELETS, N_FACES, N_MOVE};
use crate::error::Error;
use crate::moves::{Face, Move, ALL_FACES};

/** Cube on the facelet level.

The 54 facelets are stored face by face in the order F, U, R, B, D, L, nine per face. A facelet
holds the label of the face whose colour it carries, so the solved cube has every block of nine
equal to the face index. Labels 6 and above are masks: they never match a real label, but
[crate::eval::compare] grants them partial credit.
*/
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct FaceCube {
    pub f: [u8; N_FACELETS],
}

/// Label used for a masked facelet.
pub const MASK: u8 = 6;

/// Clockwise quarter turn of the nine facelets of one face, `(target, source)` relative to the
/// first facelet of the face. The centre stays in place.
const FACE_TURN: [(usize, usize); 8] = [
    (0, 6), (1, 3), (2, 0), (3, 7),
    (5, 1), (6, 8), (7, 5), (8, 2),
];

/// The ring of twelve neighbouring facelets carried along by a clockwise quarter turn,
/// `(target, source)` per face.
#[rustfmt::skip]
const RINGS: [[(usize, usize); 12]; N_FACES] = [
    [(15, 53), (16, 50), (17, 47), (18, 15), (21, 16), (24, 17), (36, 24), (37, 21), (38, 18), (47, 36), (50, 37), (53, 38)],
    [(0, 18), (1, 19), (2, 20), (18, 27), (19, 28), (20, 29), (27, 45), (28, 46), (29, 47), (45, 0), (46, 1), (47, 2)],
    [(2, 38), (5, 41), (8, 44), (11, 2), (14, 5), (17, 8), (27, 17), (30, 14), (33, 11), (38, 33), (41, 30), (44, 27)],
    [(9, 20), (10, 23), (11, 26), (20, 44), (23, 43), (26, 42), (42, 45), (43, 48), (44, 51), (45, 11), (48, 10), (51, 9)],
    [(6, 51), (7, 52), (8, 53), (24, 6), (25, 7), (26, 8), (33, 24), (34, 25), (35, 26), (51, 33), (52, 34), (53, 35)],
    [(0, 9), (3, 12), (6, 15), (9, 35), (12, 32), (15, 29), (29, 42), (32, 39), (35, 36), (36, 0), (39, 3), (42, 6)],
];

/// Whole cube rotation around the FUR corner (xy): F <- R, U <- F, R <- U, B <- L, D <- B, L <- D.
#[rustfmt::skip]
const TWIST: [u8; N_FACELETS] = [
    24, 21, 18, 25, 22, 19, 26, 23, 20,
    6, 3, 0, 7, 4, 1, 8, 5, 2,
    17, 16, 15, 14, 13, 12, 11, 10, 9,
    47, 50, 53, 46, 49, 52, 45, 48, 51,
    33, 30, 27, 34, 31, 28, 35, 32, 29,
    36, 37, 38, 39, 40, 41, 42, 43, 44,
];

/// Whole cube clockwise rotation around the vertical axis (y).
#[rustfmt::skip]
const ROTATE_Y: [u8; N_FACELETS] = [
    18, 19, 20, 21, 22, 23, 24, 25, 26,
    15, 12, 9, 16, 13, 10, 17, 14, 11,
    27, 28, 29, 30, 31, 32, 33, 34, 35,
    45, 46, 47, 48, 49, 50, 51, 52, 53,
    38, 41, 44, 37, 40, 43, 36, 39, 42,
    0, 1, 2, 3, 4, 5, 6, 7, 8,
];

type Permutation = [u8; N_FACELETS];

fn quarter_turn(face: usize) -> Permutation {
    let mut p: Permutation = std::array::from_fn(|i| i as u8);
    let offset = face * 9;
    for (target, source) in FACE_TURN {
        p[offset + target] = (offset + source) as u8;
    }
    for (target, source) in RINGS[face] {
        p[target] = source as u8;
    }
    p
}

/// `(p * q)[i] = p[q[i]]`, apply p first then q.
fn then(p: &Permutation, q: &Permutation) -> Permutation {
    std::array::from_fn(|i| p[q[i] as usize])
}

lazy_static! {
    /// Facelet permutation of each of the 18 moves, indexed by move symbol.
    static ref MOVE_PERMUTATIONS: [Permutation; N_MOVE] = {
        let mut table = [[0u8; N_FACELETS]; N_MOVE];
        for m in ALL_MOVES {
            let quarter = quarter_turn(m.face() as usize);
            let mut p = quarter;
            for _ in 1..m.quarter_turns() {
                p = then(&p, &quarter);
            }
            table[m as usize] = p;
        }
        table
    };
}

impl Default for FaceCube {
    /// The solved cube.
    fn default() -> Self {
        Self {
            f: std::array::from_fn(|i| (i / 9) as u8),
        }
    }
}

impl FaceCube {
    pub fn new(f: [u8; N_FACELETS]) -> Self {
        Self { f }
    }

    /// Every face shows the colour of its centre, in any orientation of the whole cube.
    pub fn is_solved(&self) -> bool {
        self.f
            .chunks(9)
            .all(|face| face.iter().all(|label| *label == face[4]))
    }

    fn permuted(&self, p: &Permutation) -> Self {
        Self {
            f: std::array::from_fn(|i| self.f[p[i] as usize]),
        }
    }

    /// Returns the cube after the move `m`.
    pub fn apply_move(&self, m: Move) -> Self {
        self.permuted(&MOVE_PERMUTATIONS[m as usize])
    }

    /// Applies the move `m` in place.
    pub fn multiply_move(&mut self, m: Move) {
        *self = self.apply_move(m);
    }

    pub fn apply_moves(&self, moves: &[Move]) -> Self {
        let mut cc = *self;
        cc.multiply_moves(moves);
        cc
    }

    pub fn multiply_moves(&mut self, moves: &[Move]) {
        for m in moves {
            self.multiply_move(*m);
        }
    }

    /// Applies a raw move symbol, rejecting anything outside 0..=17.
    pub fn apply_symbol(&self, symbol: u16) -> Result<Self, Error> {
        Ok(self.apply_move(Move::try_from(symbol)?))
    }

    pub fn apply_symbols(&self, symbols: &[u16]) -> Result<Self, Error> {
        symbols
            .iter()
            .try_fold(*self, |cc, symbol| cc.apply_symbol(*symbol))
    }

    /// Whole cube rotation around the vertical axis (y).
    pub fn rotate_y(&self) -> Self {
        self.permuted(&ROTATE_Y)
    }

    /// Whole cube rotation around the FUR corner (xy), of order 3.
    pub fn twist(&self) -> Self {
        self.permuted(&TWIST)
    }

    /// Whole cube rotation around the LR axis (x): a twist followed by three y rotations.
    pub fn rotate_x(&self) -> Self {
        self.twist().rotate_y().rotate_y().rotate_y()
    }

    /// The nine facelets of one face.
    pub fn face(&self, face: Face) -> &[u8] {
        let offset = face as usize * 9;
        &self.f[offset..offset + 9]
    }
}

impl fmt::Display for FaceCube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for label in self.f {
            let c = match ALL_FACES.get(label as usize) {
                Some(face) => face.letter(),
                None => '*',
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl TryFrom<&str> for FaceCube {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let s = s.trim();
        if s.chars().count() != N_FACELETS {
            return Err(Error::InvalidFaceletString);
        }
        let mut f = [0u8; N_FACELETS];
        for (i, c) in s.chars().enumerate() {
            f[i] = match c {
                '*' => MASK,
                _ => Face::from_letter(c).ok_or(Error::InvalidFaceletString)? as u8,
            };
        }
        Ok(Self { f })
    }
}
