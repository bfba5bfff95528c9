use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};

use self::Move::*;
use crate::constants::{ALL_MOVES, TWO_GEN_MOVES};
use crate::error::Error;

/// Cube faces, in the order used by the move symbols.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
pub enum Face {
    F,
    U,
    R,
    B,
    D,
    L,
}

pub const ALL_FACES: [Face; 6] = [Face::F, Face::U, Face::R, Face::B, Face::D, Face::L];

impl Face {
    pub fn letter(self) -> char {
        match self {
            Face::F => 'F',
            Face::U => 'U',
            Face::R => 'R',
            Face::B => 'B',
            Face::D => 'D',
            Face::L => 'L',
        }
    }

    /// Case-insensitive face letter lookup.
    pub fn from_letter(c: char) -> Option<Face> {
        match c.to_ascii_uppercase() {
            'F' => Some(Face::F),
            'U' => Some(Face::U),
            'R' => Some(Face::R),
            'B' => Some(Face::B),
            'D' => Some(Face::D),
            'L' => Some(Face::L),
            _ => None,
        }
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Layer moves, Front, Up, Right, Back, Down, Left.
///
/// $ clockwise, $2 double, $3 counter-clockwise. The discriminant is the move symbol:
/// `symbol % 6` is the face and `symbol / 6` the turn class.
#[rustfmt::skip]
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Move {
    F, U, R, B, D, L,
    F2, U2, R2, B2, D2, L2,
    F3, U3, R3, B3, D3, L3,
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.turn_class() {
            0 => write!(f, "{}", self.face()),
            1 => write!(f, "{}2", self.face()),
            _ => write!(f, "{}'", self.face()),
        }
    }
}

impl FromStr for Move {
    type Err = Error;

    /// Strict parser: a face letter, optionally followed by `2` or `'`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let mut chars = token.chars();
        let face = chars
            .next()
            .and_then(Face::from_letter)
            .ok_or_else(|| Error::MalformedScrambleToken(token.to_string()))?;
        let turns = match (chars.next(), chars.next()) {
            (None, _) => 1,
            (Some('2'), None) => 2,
            (Some('\''), None) => 3,
            _ => return Err(Error::MalformedScrambleToken(token.to_string())),
        };
        Ok(Move::from_face(face, turns))
    }
}

impl TryFrom<u16> for Move {
    type Error = Error;

    fn try_from(symbol: u16) -> Result<Self, Self::Error> {
        ALL_MOVES
            .get(symbol as usize)
            .copied()
            .ok_or(Error::InvalidMoveSymbol(symbol))
    }
}

impl From<Move> for u16 {
    fn from(m: Move) -> u16 {
        m as u16
    }
}

#[rustfmt::skip]
impl Move {
    /// The move turning `face` by `turns` clockwise quarter turns, `turns` in 1..=3.
    pub fn from_face(face: Face, turns: u8) -> Self {
        debug_assert!((1..=3).contains(&turns));
        ALL_MOVES[(turns as usize - 1) * 6 + face as usize]
    }

    /// Tolerant parser for user input: case-insensitive, an unknown face letter means F,
    /// an unknown modifier means a quarter turn.
    pub fn parse_lenient(s: &str) -> Self {
        let token = s.trim();
        let mut chars = token.chars();
        let face = chars.next().and_then(Face::from_letter).unwrap_or(Face::F);
        match chars.next() {
            Some('2') => Move::from_face(face, 2),
            Some('\'') => Move::from_face(face, 3),
            _ => Move::from_face(face, 1),
        }
    }

    pub fn symbol(self) -> u16 {
        self as u16
    }

    pub fn face(self) -> Face {
        ALL_FACES[self as usize % 6]
    }

    /// 0 quarter turn, 1 half turn, 2 inverse quarter turn.
    pub fn turn_class(self) -> u8 {
        self as u8 / 6
    }

    /// Number of clockwise quarter turns, 1..=3.
    pub fn quarter_turns(self) -> u8 {
        self.turn_class() + 1
    }

    pub fn is_same_layer(&self, other: Move) -> bool {
        self.face() == other.face()
    }

    pub fn get_inverse(self) -> Self {
        match self {
            F => F3, F3 => F,
            U => U3, U3 => U,
            R => R3, R3 => R,
            B => B3, B3 => B,
            D => D3, D3 => D,
            L => L3, L3 => L,
            _ => self,
        }
    }

    /// Merges two moves of the same face into one, `None` when they cancel out.
    pub fn compose(self, other: Move) -> Option<Move> {
        debug_assert!(self.is_same_layer(other));
        match (self.quarter_turns() + other.quarter_turns()) % 4 {
            0 => None,
            turns => Some(Move::from_face(self.face(), turns)),
        }
    }

    /// Projection onto the <F, U> group used by the 2-gen stages: the face becomes
    /// `symbol % 2`, the turn class is kept.
    pub fn to_two_gen(self) -> Self {
        let symbol = self as usize;
        ALL_MOVES[symbol % 2 + (symbol / 6) * 6]
    }
}

/// The gene alphabet a population draws its moves from.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum MoveSet {
    /// All 18 moves.
    Full,
    /// The six moves of the <F, U> group.
    TwoGen,
}

impl MoveSet {
    pub fn moves(self) -> &'static [Move] {
        match self {
            MoveSet::Full => &ALL_MOVES,
            MoveSet::TwoGen => &TWO_GEN_MOVES,
        }
    }

    /// Uniform draw from the alphabet.
    pub fn random<R: Rng + ?Sized>(self, rng: &mut R) -> Move {
        let moves = self.moves();
        moves[rng.gen_range(0..moves.len())]
    }

    pub fn contains(self, m: Move) -> bool {
        self.moves().contains(&m)
    }
}
