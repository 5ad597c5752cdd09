// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::{convert::TryFrom, fmt, str::FromStr};

use serde::{Serialize, Serializer};
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("coordinate out of range: ({0}, {1})")]
    OutOfRange(u8, u8),
    #[error("invalid file char: {0}")]
    InvalidFile(char),
    #[error("invalid rank char: {0}")]
    InvalidRank(char),
    #[error("square notation must be two characters: {0:?}")]
    BadLength(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PieceParseError {
    #[error("invalid char: {0}")]
    InvalidChar(char),
}

/// A square on the chessboard, addressed by `(rank, file)`.
///
/// Rank 0 is the far side of the board from White (the eighth rank in algebraic notation) and rank 7 is White's back
/// rank. File 0 is the a-file. So `e2` is `(6, 4)` and `e8` is `(0, 4)`.
///
/// A Position is always on the board. Every constructor either checks the bounds and returns an error or panics.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position(pub(in crate::core) u8);

impl Position {
    /// Creates a position from a rank and file, checking that both are in `0..8`.
    pub fn new(rank: u8, file: u8) -> Result<Position, PositionError> {
        if rank >= 8 || file >= 8 {
            return Err(PositionError::OutOfRange(rank, file));
        }

        Ok(Position(rank * 8 + file))
    }

    /// Creates a position from a rank and file. Panics if either is out of range.
    pub const fn of(rank: u8, file: u8) -> Position {
        assert!(rank < 8 && file < 8, "position out of range");
        Position(rank * 8 + file)
    }

    pub const fn rank(self) -> u8 {
        self.0 >> 3
    }

    pub const fn file(self) -> u8 {
        self.0 & 7
    }

    pub const fn as_index(self) -> usize {
        self.0 as usize
    }

    /// Returns the position `(rank + dr, file + df)`, or None if that falls off of the board.
    pub fn offset(self, dr: i8, df: i8) -> Option<Position> {
        let rank = self.rank() as i8 + dr;
        let file = self.file() as i8 + df;
        if !(0..8).contains(&rank) || !(0..8).contains(&file) {
            return None;
        }

        Some(Position(rank as u8 * 8 + file as u8))
    }

    /// Returns the adjacent position in the given direction, or None at the edge of the board.
    pub fn towards(self, dir: Direction) -> Option<Position> {
        let (dr, df) = dir.as_vector();
        self.offset(dr, df)
    }
}

impl TryFrom<(u8, u8)> for Position {
    type Error = PositionError;

    fn try_from((rank, file): (u8, u8)) -> Result<Self, Self::Error> {
        Position::new(rank, file)
    }
}

impl FromStr for Position {
    type Err = PositionError;

    /// Parses algebraic square notation such as `e2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        let (file_c, rank_c) = match chars.as_slice() {
            [f, r] => (*f, *r),
            _ => return Err(PositionError::BadLength(s.to_owned())),
        };

        let file = match file_c {
            'a'..='h' => file_c as u8 - b'a',
            c => return Err(PositionError::InvalidFile(c)),
        };

        // Algebraic rank 8 is our rank 0.
        let rank = match rank_c {
            '1'..='8' => b'8' - rank_c as u8,
            c => return Err(PositionError::InvalidRank(c)),
        };

        Position::new(rank, file)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.file()) as char;
        let rank = (b'8' - self.rank()) as char;
        write!(f, "{}{}", file, rank)
    }
}

impl Serialize for Position {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn toggle(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// The direction this color's pawns advance in.
    pub fn forward(self) -> Direction {
        match self {
            Color::White => Direction::North,
            Color::Black => Direction::South,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "White"),
            Color::Black => write!(f, "Black"),
        }
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl TryFrom<char> for PieceKind {
    type Error = PieceParseError;

    /// Parses a piece letter, ignoring case.
    fn try_from(value: char) -> Result<Self, Self::Error> {
        let kind = match value.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return Err(PieceParseError::InvalidChar(value)),
        };

        Ok(kind)
    }
}

impl PieceKind {
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One of the eight compass directions, seen from White's side of the board.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// Returns the `(rank, file)` step for this direction. North lowers the rank index, since rank 0 is Black's back
    /// rank.
    pub const fn as_vector(self) -> (i8, i8) {
        match self {
            Direction::North => (-1, 0),
            Direction::NorthEast => (-1, 1),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::South => (1, 0),
            Direction::SouthWest => (1, -1),
            Direction::West => (0, -1),
            Direction::NorthWest => (-1, -1),
        }
    }
}

pub const ORTHOGONALS: [Direction; 4] = [
    Direction::North,
    Direction::East,
    Direction::South,
    Direction::West,
];

pub const DIAGONALS: [Direction; 4] = [
    Direction::NorthEast,
    Direction::SouthEast,
    Direction::SouthWest,
    Direction::NorthWest,
];

pub const ALL_DIRECTIONS: [Direction; 8] = [
    Direction::North,
    Direction::NorthEast,
    Direction::East,
    Direction::SouthEast,
    Direction::South,
    Direction::SouthWest,
    Direction::West,
    Direction::NorthWest,
];

/// Iterates over every position on the board, rank by rank starting from rank 0.
pub struct AllPositions(u8);

impl Iterator for AllPositions {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        if self.0 >= 64 {
            None
        } else {
            let next = self.0;
            self.0 += 1;
            Some(Position(next))
        }
    }
}

pub fn positions() -> AllPositions {
    AllPositions(0)
}

pub fn colors() -> ::std::vec::IntoIter<Color> {
    vec![Color::White, Color::Black].into_iter()
}
