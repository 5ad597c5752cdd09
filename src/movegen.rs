// Copyright 2021 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Move generation for each kind of piece.
//!
//! Every generator here answers the same question: given a piece and a board, which positions can the piece reach by
//! its movement rule? Occupancy is the only thing consulted. Nothing here knows about check; filtering out moves that
//! leave a king attacked is the job of [`crate::game`].

use crate::core::*;
use crate::Board;

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

/// Dispatches to the move generator for the piece's kind.
pub fn legal_moves(piece: &Piece, board: &Board) -> SquareSet {
    match piece.kind {
        PieceKind::Pawn => pawn_moves(piece, board),
        PieceKind::Knight => knight_moves(piece, board),
        PieceKind::Bishop => bishop_moves(piece, board),
        PieceKind::Rook => rook_moves(piece, board),
        PieceKind::Queen => queen_moves(piece, board),
        PieceKind::King => king_moves(piece, board),
    }
}

/// Pawns step one square forward onto an empty square, or one square diagonally forward onto an enemy piece.
pub fn pawn_moves(piece: &Piece, board: &Board) -> SquareSet {
    let mut moves = SquareSet::empty();
    let ahead = match piece.position().towards(piece.color.forward()) {
        Some(ahead) => ahead,
        // A pawn on the far rank would have promoted; with no promotion it simply has nowhere to go.
        None => return moves,
    };

    if board.piece_at(ahead).is_none() {
        moves.insert(ahead);
    }

    for side in [Direction::East, Direction::West] {
        if let Some(target) = ahead.towards(side) {
            if let Some(victim) = board.piece_at(target) {
                if victim.color != piece.color {
                    moves.insert(target);
                }
            }
        }
    }

    moves
}

pub fn knight_moves(piece: &Piece, board: &Board) -> SquareSet {
    let targets = KNIGHT_OFFSETS
        .iter()
        .filter_map(|&(dr, df)| piece.position().offset(dr, df));
    step_moves(piece, board, targets)
}

pub fn king_moves(piece: &Piece, board: &Board) -> SquareSet {
    let targets = ALL_DIRECTIONS
        .iter()
        .filter_map(|&dir| piece.position().towards(dir));
    step_moves(piece, board, targets)
}

pub fn rook_moves(piece: &Piece, board: &Board) -> SquareSet {
    slide_moves(piece, board, &ORTHOGONALS)
}

pub fn bishop_moves(piece: &Piece, board: &Board) -> SquareSet {
    slide_moves(piece, board, &DIAGONALS)
}

pub fn queen_moves(piece: &Piece, board: &Board) -> SquareSet {
    rook_moves(piece, board) | bishop_moves(piece, board)
}

/// Single-step movers (knights and kings) can land on any target that isn't held by a friendly piece.
fn step_moves(piece: &Piece, board: &Board, targets: impl Iterator<Item = Position>) -> SquareSet {
    targets
        .filter(|&target| match board.piece_at(target) {
            Some(occupant) => occupant.color != piece.color,
            None => true,
        })
        .collect()
}

/// Walks each ray outward from the piece. Empty squares are added and the walk continues; an enemy piece is added
/// and ends the ray; a friendly piece ends the ray without being added.
fn slide_moves(piece: &Piece, board: &Board, directions: &[Direction]) -> SquareSet {
    let mut moves = SquareSet::empty();
    for &dir in directions {
        let mut cursor = piece.position().towards(dir);
        while let Some(target) = cursor {
            match board.piece_at(target) {
                None => moves.insert(target),
                Some(occupant) => {
                    if occupant.color != piece.color {
                        moves.insert(target);
                    }

                    break;
                }
            }

            cursor = target.towards(dir);
        }
    }

    moves
}
