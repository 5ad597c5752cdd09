// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;

use serde::Serialize;

use crate::{
    board::Board,
    core::{Color, PieceKind, Position, SquareSet},
    movegen,
};

/// A piece standing on the board.
///
/// Pieces are plain values: copying a board copies every piece along with it, so a copy never shares anything with
/// the board it came from. `position` is only ever written by [`Board`], which keeps it equal to the cell the piece
/// occupies.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Piece {
    pub kind: PieceKind,
    pub color: Color,
    pub(crate) position: Position,
}

impl Piece {
    pub fn new(kind: PieceKind, color: Color, position: Position) -> Piece {
        Piece {
            kind,
            color,
            position,
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Returns every position this piece may move to on the given board, judged only by its movement rule and the
    /// occupancy of the board. Moves that leave the mover's own king in check are included.
    pub fn legal_moves(&self, board: &Board) -> SquareSet {
        movegen::legal_moves(self, board)
    }

    /// The FEN letter for this piece: uppercase for White, lowercase for Black.
    pub fn as_char(&self) -> char {
        let c = self.kind.as_char();
        match self.color {
            Color::White => c.to_ascii_uppercase(),
            Color::Black => c,
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
