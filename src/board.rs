// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::{
    convert::TryFrom,
    fmt::{self, Write},
};

use serde::Serialize;
use thiserror::Error;

use crate::core::{self, *};

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";

/// Errors that indicate a board has been driven into a state the rules never produce. These are programming errors,
/// not bad user input; a caller seeing one should assume the board is corrupt.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("no {0} king on the board")]
    MissingKing(Color),
    #[error("more than one {0} king on the board")]
    DuplicateKing(Color),
}

/// An 8x8 chessboard holding at most one piece per position.
///
/// The board owns its pieces outright. Cloning a board clones every piece, so a clone can be mutated freely (for
/// example, to try out a move) without the original ever observing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    /// Indexed by `Position::as_index`.
    cells: [Option<Piece>; 64],
}

impl Board {
    /// Creates a board with nothing on it.
    pub fn empty() -> Board {
        Board { cells: [None; 64] }
    }

    /// Creates a board set up in the standard chess starting position.
    pub fn starting_position() -> Board {
        Board::from_fen(START_FEN).expect("starting position FEN is valid")
    }

    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        self.cells[pos.as_index()]
    }

    /// Puts a piece on the board at its own position, returning whatever piece was displaced. A second king for a
    /// color is refused.
    pub fn place(&mut self, piece: Piece) -> Result<Option<Piece>, BoardError> {
        if piece.kind == PieceKind::King {
            if let Some(king) = self.king(piece.color) {
                if king.position() != piece.position() {
                    return Err(BoardError::DuplicateKing(piece.color));
                }
            }
        }

        Ok(self.cells[piece.position().as_index()].replace(piece))
    }

    pub fn remove(&mut self, pos: Position) -> Option<Piece> {
        self.cells[pos.as_index()].take()
    }

    /// Moves whatever stands on `start` to `end`, returning the piece that was captured on `end`, if any.
    ///
    /// No legality checking happens here; that is the caller's job. The moving piece's recorded position is updated
    /// along with the grid so the two never disagree. If `start` is empty, or `start == end`, the board is left
    /// untouched.
    pub fn apply_move(&mut self, start: Position, end: Position) -> Option<Piece> {
        if start == end {
            return None;
        }

        let mut moving = match self.remove(start) {
            Some(piece) => piece,
            None => {
                tracing::warn!(%start, %end, "apply_move with no piece at source");
                return None;
            }
        };

        moving.position = end;
        self.cells[end.as_index()].replace(moving)
    }

    /// Returns every piece of the given color, in position order.
    pub fn pieces(&self, color: Color) -> impl Iterator<Item = Piece> + '_ {
        self.cells
            .iter()
            .filter_map(|cell| *cell)
            .filter(move |piece| piece.color == color)
    }

    pub fn count(&self, color: Color) -> usize {
        self.pieces(color).count()
    }

    pub fn king(&self, color: Color) -> Option<Piece> {
        self.pieces(color).find(|piece| piece.kind == PieceKind::King)
    }

    /// Returns the positions of every piece of color `by` whose legal moves include `target`.
    pub fn squares_attacking(&self, by: Color, target: Position) -> SquareSet {
        self.pieces(by)
            .filter(|piece| piece.legal_moves(self).contains(target))
            .map(|piece| piece.position())
            .collect()
    }

    /// Whether the king of `color` stands on a position some opposing piece can move to.
    ///
    /// A board with no king of that color has been corrupted somewhere; that is reported as an error rather than
    /// being read as "not in check".
    pub fn is_in_check(&self, color: Color) -> Result<bool, BoardError> {
        let king = self.king(color).ok_or(BoardError::MissingKing(color))?;
        Ok(!self
            .squares_attacking(color.toggle(), king.position())
            .is_empty())
    }

    /// Checks the one-king-per-color invariant, requiring both kings to be present.
    pub fn validate_kings(&self) -> Result<(), BoardError> {
        for color in core::colors() {
            match self
                .pieces(color)
                .filter(|piece| piece.kind == PieceKind::King)
                .count()
            {
                0 => return Err(BoardError::MissingKing(color)),
                1 => {}
                _ => return Err(BoardError::DuplicateKing(color)),
            }
        }

        Ok(())
    }

    /// A read-only copy of every occupied cell, suitable for rendering or serializing.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            pieces: self.cells.iter().filter_map(|cell| *cell).collect(),
        }
    }
}

/// Every piece on a board, in position order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    pub pieces: Vec<Piece>,
}

//
// FEN piece placement.
//
// Only the first field of a FEN record is read here: the piece placement, ranks separated by '/', from the eighth
// rank down to the first. That ordering lines up with our rank index, so the first FEN rank is rank 0.
//

/// Possible errors that can arise when parsing FEN piece placement into a `Board`.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum FenParseError {
    #[error("unexpected char: {0}")]
    UnexpectedChar(char),
    #[error("unexpected EOF while reading")]
    UnexpectedEnd,
    #[error("invalid digit")]
    InvalidDigit,
    #[error("rank does not sum to 8")]
    RankDoesNotSumToEight,
    #[error("unknown piece: {0}")]
    UnknownPiece(char),
    #[error("invalid side to move")]
    InvalidSideToMove,
    #[error(transparent)]
    Board(#[from] BoardError),
}

impl Board {
    /// Constructs a board from the piece placement field of a FEN record. Anything after the first space is ignored.
    pub fn from_fen(fen: impl AsRef<str>) -> Result<Board, FenParseError> {
        let placement = fen.as_ref().split(' ').next().unwrap_or("");
        let mut board = Board::empty();
        let mut iter = placement.chars().peekable();
        for rank in 0..8u8 {
            let mut file = 0u8;
            while file < 8 {
                let c = *iter.peek().ok_or(FenParseError::UnexpectedEnd)?;
                // digits 1 through 8 indicate empty squares.
                if let Some(value) = c.to_digit(10) {
                    if !(1..=8).contains(&value) {
                        return Err(FenParseError::InvalidDigit);
                    }

                    file += value as u8;
                    if file > 8 {
                        return Err(FenParseError::RankDoesNotSumToEight);
                    }

                    iter.next();
                    continue;
                }

                // if it's not a digit, it represents a piece.
                let kind = PieceKind::try_from(c).map_err(|_| FenParseError::UnknownPiece(c))?;
                let color = if c.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };

                board.place(Piece::new(kind, color, Position::of(rank, file)))?;
                iter.next();
                file += 1;
            }

            if rank != 7 {
                match iter.next() {
                    Some('/') => {}
                    Some(c) => return Err(FenParseError::UnexpectedChar(c)),
                    None => return Err(FenParseError::UnexpectedEnd),
                }
            }
        }

        if let Some(c) = iter.next() {
            return Err(FenParseError::UnexpectedChar(c));
        }

        Ok(board)
    }

    /// Writes the piece placement field of a FEN record for this board.
    pub fn as_fen(&self) -> String {
        let mut buf = String::new();
        for rank in 0..8 {
            let mut empty_squares = 0;
            for file in 0..8 {
                if let Some(piece) = self.piece_at(Position::of(rank, file)) {
                    if empty_squares != 0 {
                        write!(&mut buf, "{}", empty_squares).unwrap();
                    }
                    write!(&mut buf, "{}", piece).unwrap();
                    empty_squares = 0;
                } else {
                    empty_squares += 1;
                }
            }

            if empty_squares != 0 {
                write!(&mut buf, "{}", empty_squares).unwrap();
            }

            if rank != 7 {
                buf.push('/');
            }
        }

        buf
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rank in 0..8 {
            for file in 0..8 {
                if let Some(piece) = self.piece_at(Position::of(rank, file)) {
                    write!(f, " {} ", piece)?;
                } else {
                    write!(f, " . ")?;
                }
            }

            writeln!(f, "| {}", 8 - rank)?;
        }

        writeln!(f, "{}", "---".repeat(8))?;
        for file in "abcdefgh".chars() {
            write!(f, " {} ", file)?;
        }

        writeln!(f)?;
        Ok(())
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::starting_position()
    }
}

#[cfg(test)]
mod tests {
    fn pos(square: &str) -> crate::core::Position {
        square.parse().unwrap()
    }

    mod fen {
        use super::pos;
        use crate::board::{Board, BoardError, FenParseError};
        use crate::core::*;

        #[test]
        fn fen_smoke() {
            let board = Board::from_fen("8/8/8/8/8/8/8/8").unwrap();
            assert_eq!(Board::empty(), board);
            assert_eq!(0, board.count(Color::White));
        }

        #[test]
        fn starting_position() {
            let board = Board::starting_position();

            let check_square = |square: &str, kind: PieceKind, color: Color| {
                let piece = board.piece_at(pos(square)).unwrap();
                assert_eq!(kind, piece.kind, "kind at {}", square);
                assert_eq!(color, piece.color, "color at {}", square);
                assert_eq!(pos(square), piece.position(), "position at {}", square);
            };

            let back_rank = [
                PieceKind::Rook,
                PieceKind::Knight,
                PieceKind::Bishop,
                PieceKind::Queen,
                PieceKind::King,
                PieceKind::Bishop,
                PieceKind::Knight,
                PieceKind::Rook,
            ];

            for (file, &kind) in "abcdefgh".chars().zip(back_rank.iter()) {
                check_square(&format!("{}1", file), kind, Color::White);
                check_square(&format!("{}2", file), PieceKind::Pawn, Color::White);
                check_square(&format!("{}7", file), PieceKind::Pawn, Color::Black);
                check_square(&format!("{}8", file), kind, Color::Black);
            }

            for rank in 2..6 {
                for file in 0..8 {
                    assert!(board.piece_at(Position::of(rank, file)).is_none());
                }
            }

            assert_eq!(16, board.count(Color::White));
            assert_eq!(16, board.count(Color::Black));
            assert_eq!(Position::of(7, 4), board.king(Color::White).unwrap().position());
            assert_eq!(Position::of(0, 4), board.king(Color::Black).unwrap().position());
        }

        #[test]
        fn empty() {
            let err = Board::from_fen("").unwrap_err();
            assert_eq!(FenParseError::UnexpectedEnd, err);
        }

        #[test]
        fn unknown_piece() {
            let err = Board::from_fen("z7/8/8/8/8/8/8/8").unwrap_err();
            assert_eq!(FenParseError::UnknownPiece('z'), err);
        }

        #[test]
        fn invalid_digit() {
            let err = Board::from_fen("9/8/8/8/8/8/8/8").unwrap_err();
            assert_eq!(FenParseError::InvalidDigit, err);
        }

        #[test]
        fn not_sum_to_8() {
            let err = Board::from_fen("pppp5/8/8/8/8/8/8/8").unwrap_err();
            assert_eq!(FenParseError::RankDoesNotSumToEight, err);
        }

        #[test]
        fn too_many_ranks() {
            let err = Board::from_fen("8/8/8/8/8/8/8/8/8").unwrap_err();
            assert_eq!(FenParseError::UnexpectedChar('/'), err);
        }

        #[test]
        fn two_kings_of_one_color() {
            let err = Board::from_fen("K6K/8/8/8/8/8/8/8").unwrap_err();
            assert_eq!(FenParseError::Board(BoardError::DuplicateKing(Color::White)), err);
        }

        #[test]
        fn ignores_trailing_fields() {
            let board = Board::from_fen("8/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
            assert_eq!(1, board.count(Color::White));
        }

        #[test]
        fn start_position_roundtrip() {
            let str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR";
            assert_eq!(str, Board::from_fen(str).unwrap().as_fen());
            let str = "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R";
            assert_eq!(str, Board::from_fen(str).unwrap().as_fen());
        }
    }

    mod apply {
        use super::pos;
        use crate::board::Board;
        use crate::core::*;

        #[test]
        fn smoke_test_opening_pawn() {
            let mut board = Board::starting_position();
            let captured = board.apply_move(pos("e2"), pos("e4"));
            assert!(captured.is_none());

            let pawn = board.piece_at(pos("e4")).unwrap();
            assert_eq!(PieceKind::Pawn, pawn.kind);
            assert_eq!(Color::White, pawn.color);
            assert_eq!(pos("e4"), pawn.position());
            assert!(board.piece_at(pos("e2")).is_none());
        }

        #[test]
        fn basic_capture() {
            let mut board = Board::from_fen("8/8/8/8/5p2/4P3/8/8").unwrap();
            let captured = board.apply_move(pos("e3"), pos("f4")).unwrap();
            assert_eq!(Color::Black, captured.color);

            let piece = board.piece_at(pos("f4")).unwrap();
            assert_eq!(Color::White, piece.color);
            assert_eq!(pos("f4"), piece.position());
            assert!(board.piece_at(pos("e3")).is_none());
            assert_eq!(0, board.count(Color::Black));
        }

        #[test]
        fn captures_own_color_when_told_to() {
            // apply_move does no legality checking at all.
            let mut board = Board::from_fen("8/8/8/8/8/8/8/RN6").unwrap();
            let captured = board.apply_move(pos("a1"), pos("b1")).unwrap();
            assert_eq!(PieceKind::Knight, captured.kind);
            assert_eq!(1, board.count(Color::White));
        }

        #[test]
        fn empty_source_is_a_no_op() {
            let mut board = Board::starting_position();
            let before = board.clone();
            assert!(board.apply_move(pos("e4"), pos("e2")).is_none());
            assert_eq!(before, board);
        }

        #[test]
        fn same_square_is_a_no_op() {
            let mut board = Board::starting_position();
            let before = board.clone();
            board.apply_move(pos("e2"), pos("e2"));
            assert_eq!(before, board);
        }

        #[test]
        fn positions_match_cells_after_moves() {
            let mut board = Board::starting_position();
            board.apply_move(pos("g1"), pos("f3"));
            board.apply_move(pos("f3"), pos("e5"));
            board.apply_move(pos("e5"), pos("d7"));
            for square in positions() {
                if let Some(piece) = board.piece_at(square) {
                    assert_eq!(square, piece.position());
                }
            }
        }

        #[test]
        fn place_refuses_second_king() {
            let mut board = Board::starting_position();
            let err = board
                .place(Piece::new(PieceKind::King, Color::White, pos("d4")))
                .unwrap_err();
            assert_eq!(crate::board::BoardError::DuplicateKing(Color::White), err);
        }
    }

    mod copy {
        use super::pos;
        use crate::board::Board;
        use crate::core::*;

        #[test]
        fn mutating_a_clone_leaves_original_alone() {
            let original = Board::starting_position();
            let mut copy = original.clone();
            copy.apply_move(pos("d1"), pos("d7"));
            copy.remove(pos("a8"));

            assert_eq!(Board::starting_position(), original);
            let queen = original.piece_at(pos("d1")).unwrap();
            assert_eq!(pos("d1"), queen.position());
            assert_eq!(PieceKind::Pawn, original.piece_at(pos("d7")).unwrap().kind);
            assert_ne!(original, copy);
        }

        #[test]
        fn clone_is_structurally_equal() {
            let original = Board::from_fen("4k3/8/8/3q4/8/8/8/4K3").unwrap();
            assert_eq!(original, original.clone());
        }
    }

    mod check {
        use crate::board::{Board, BoardError};
        use crate::core::*;

        #[test]
        fn queen_diagonal_reaches_corner_king() {
            let mut board = Board::empty();
            board
                .place(Piece::new(PieceKind::King, Color::Black, Position::of(0, 0)))
                .unwrap();
            board
                .place(Piece::new(PieceKind::Queen, Color::White, Position::of(1, 1)))
                .unwrap();
            board
                .place(Piece::new(PieceKind::King, Color::White, Position::of(7, 7)))
                .unwrap();

            assert!(board.is_in_check(Color::Black).unwrap());
            assert!(!board.is_in_check(Color::White).unwrap());
            let attackers: Vec<_> = board
                .squares_attacking(Color::White, Position::of(0, 0))
                .into_iter()
                .collect();
            assert_eq!(vec![Position::of(1, 1)], attackers);
        }

        #[test]
        fn blocked_rook_gives_no_check() {
            let board = Board::from_fen("4k3/8/8/4p3/8/8/8/4R1K1").unwrap();
            assert!(!board.is_in_check(Color::Black).unwrap());
        }

        #[test]
        fn knight_check() {
            let board = Board::from_fen("4k3/8/3N4/8/8/8/8/6K1").unwrap();
            assert!(board.is_in_check(Color::Black).unwrap());
        }

        #[test]
        fn pawn_attacks_diagonally_only() {
            let board = Board::from_fen("8/8/8/3k4/4P3/8/8/6K1").unwrap();
            assert!(board.is_in_check(Color::Black).unwrap());
            let board = Board::from_fen("8/8/8/4k3/4P3/8/8/6K1").unwrap();
            assert!(!board.is_in_check(Color::Black).unwrap());
        }

        #[test]
        fn start_position_not_in_check() {
            let board = Board::starting_position();
            assert!(!board.is_in_check(Color::White).unwrap());
            assert!(!board.is_in_check(Color::Black).unwrap());
        }

        #[test]
        fn missing_king_is_an_error() {
            let board = Board::from_fen("8/8/8/8/8/8/8/4K3").unwrap();
            assert_eq!(
                BoardError::MissingKing(Color::Black),
                board.is_in_check(Color::Black).unwrap_err()
            );
        }

        #[test]
        fn validate_kings() {
            assert!(Board::starting_position().validate_kings().is_ok());
            let board = Board::from_fen("8/8/8/8/8/8/8/4K3").unwrap();
            assert_eq!(
                Err(BoardError::MissingKing(Color::Black)),
                board.validate_kings()
            );
        }
    }

    mod snapshot {
        use crate::board::Board;
        use crate::core::*;

        #[test]
        fn lists_every_piece() {
            let snapshot = Board::starting_position().snapshot();
            assert_eq!(32, snapshot.pieces.len());
            let first = snapshot.pieces[0];
            assert_eq!(PieceKind::Rook, first.kind);
            assert_eq!(Color::Black, first.color);
        }

        #[test]
        fn serializes_to_json() {
            let board = Board::from_fen("8/8/8/8/8/8/4P3/8").unwrap();
            let json = serde_json::to_string(&board.snapshot()).unwrap();
            assert_eq!(
                r#"{"pieces":[{"kind":"pawn","color":"white","position":"e2"}]}"#,
                json
            );
        }

        #[test]
        fn display() {
            let board = Board::from_fen("8/8/8/8/8/8/8/4K3").unwrap();
            let rendered = board.to_string();
            let lines: Vec<_> = rendered.lines().collect();
            assert_eq!(" .  .  .  .  K  .  .  . | 1", lines[7]);
            assert_eq!(" a  b  c  d  e  f  g  h ", lines[9]);
        }
    }
}
