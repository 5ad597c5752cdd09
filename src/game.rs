// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A game in progress: one board, whose turn it is, and the rules used to decide when it ends.
//!
//! [`GameSession`] is the whole surface a frontend needs. It accepts or rejects moves, flips the turn, and after
//! every accepted move works out whether the side now to move can still play on. Everything here is synchronous and
//! single-threaded; a session should be owned by whoever is driving the game.

use bitflags::bitflags;
use serde::Serialize;
use thiserror::Error;

use crate::{
    board::{BoardError, FenParseError},
    core::*,
    Board,
};

bitflags! {
    /// Rule toggles for a session.
    ///
    /// The default, `STANDARD`, refuses moves that leave the mover's king attacked and tells stalemate apart from
    /// checkmate. `REFERENCE` turns both off: any geometrically legal move is accepted, and a side with no move that
    /// gets its king out of (or keeps it out of) check is checkmated whether or not it was in check to begin with.
    pub struct Rules: u8 {
        const REFERENCE = 0;
        const FORBID_SELF_CHECK = 0b0000_0001;
        const SEPARATE_STALEMATE = 0b0000_0010;
        const STANDARD = Self::FORBID_SELF_CHECK.bits | Self::SEPARATE_STALEMATE.bits;
    }
}

impl Default for Rules {
    fn default() -> Self {
        Rules::STANDARD
    }
}

/// Where a game stands.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    /// The game is in progress and it is this color's turn.
    ToMove(Color),
    Checkmate { winner: Color },
    Stalemate,
}

impl GameState {
    pub fn is_over(self) -> bool {
        !matches!(self, GameState::ToMove(_))
    }
}

/// One side of the game. A player owns no pieces; its king is looked up on the board on demand, so it can never
/// point at a stale piece.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Player {
    color: Color,
}

impl Player {
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn king(&self, board: &Board) -> Option<Piece> {
        board.king(self.color)
    }
}

/// Reasons a move was refused. A refused move never changes the session.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MoveError {
    #[error("the game is over: {0:?}")]
    GameOver(GameState),
    #[error("no piece at {0}")]
    NoPiece(Position),
    #[error("it is {to_move}'s turn, but the piece at {at} is {color}")]
    WrongColor {
        at: Position,
        color: Color,
        to_move: Color,
    },
    #[error("{piece} at {start} cannot move to {end}")]
    IllegalDestination {
        piece: Piece,
        start: Position,
        end: Position,
    },
    #[error("{start}{end} leaves the {color} king in check")]
    LeavesKingInCheck {
        start: Position,
        end: Position,
        color: Color,
    },
    #[error(transparent)]
    Board(#[from] BoardError),
}

#[derive(Clone, Debug)]
pub struct GameSession {
    board: Board,
    side_to_move: Color,
    players: [Player; 2],
    rules: Rules,
    state: GameState,
}

impl GameSession {
    /// Starts a new game from the standard starting position with standard rules, White to move.
    pub fn new() -> GameSession {
        GameSession::with_rules(Board::starting_position(), Color::White, Rules::STANDARD)
            .expect("starting position has both kings")
    }

    /// Starts a game from an arbitrary board. The board must hold exactly one king of each color.
    pub fn with_rules(
        board: Board,
        side_to_move: Color,
        rules: Rules,
    ) -> Result<GameSession, BoardError> {
        board.validate_kings()?;
        let state = evaluate(&board, side_to_move, rules)?;
        if state.is_over() {
            tracing::info!(?state, "session created in a finished position");
        }

        Ok(GameSession {
            board,
            side_to_move,
            players: [
                Player {
                    color: Color::White,
                },
                Player {
                    color: Color::Black,
                },
            ],
            rules,
            state,
        })
    }

    /// Starts a game from a FEN record. The piece placement and side-to-move fields are read; a record with only
    /// piece placement has White to move. Remaining fields are ignored.
    pub fn from_fen(fen: impl AsRef<str>, rules: Rules) -> Result<GameSession, FenParseError> {
        let fen = fen.as_ref();
        let board = Board::from_fen(fen)?;
        let side_to_move = match fen.split(' ').nth(1) {
            None | Some("w") => Color::White,
            Some("b") => Color::Black,
            Some(_) => return Err(FenParseError::InvalidSideToMove),
        };

        Ok(GameSession::with_rules(board, side_to_move, rules)?)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece_at(&self, pos: Position) -> Option<Piece> {
        self.board.piece_at(pos)
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn player(&self, color: Color) -> &Player {
        &self.players[color as usize]
    }

    pub fn current_player(&self) -> &Player {
        self.player(self.side_to_move)
    }

    /// Whether the side to move is checkmated. Under `Rules::REFERENCE` this also covers stalemate.
    pub fn is_checkmate(&self) -> bool {
        matches!(self.state, GameState::Checkmate { .. })
    }

    /// Whether the side to move has no escaping move but is not in check. Always false without
    /// `Rules::SEPARATE_STALEMATE`.
    pub fn is_stalemate(&self) -> bool {
        self.state == GameState::Stalemate
    }

    pub fn is_in_check(&self) -> Result<bool, BoardError> {
        self.board.is_in_check(self.side_to_move)
    }

    /// Every destination the piece at `pos` could move to under this session's rules, ignoring whose turn it is.
    pub fn legal_moves(&self, pos: Position) -> Result<SquareSet, BoardError> {
        let piece = match self.board.piece_at(pos) {
            Some(piece) => piece,
            None => return Ok(SquareSet::empty()),
        };

        let moves = piece.legal_moves(&self.board);
        if !self.rules.contains(Rules::FORBID_SELF_CHECK) {
            return Ok(moves);
        }

        let mut kept = SquareSet::empty();
        for end in moves {
            let mut next = self.board.clone();
            next.apply_move(pos, end);
            if !next.is_in_check(piece.color)? {
                kept.insert(end);
            }
        }

        Ok(kept)
    }

    /// Attempts to move the piece at `start` to `end`, returning whether the move was accepted. A refused move
    /// leaves the session exactly as it was.
    pub fn attempt_move(&mut self, start: Position, end: Position) -> bool {
        match self.try_move(start, end) {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(%start, %end, %err, "move rejected");
                false
            }
        }
    }

    /// Like [`GameSession::attempt_move`], but says why a move was refused.
    pub fn try_move(&mut self, start: Position, end: Position) -> Result<(), MoveError> {
        if self.state.is_over() {
            return Err(MoveError::GameOver(self.state));
        }

        let mover = self.side_to_move;
        let piece = self
            .board
            .piece_at(start)
            .ok_or(MoveError::NoPiece(start))?;
        if piece.color != mover {
            return Err(MoveError::WrongColor {
                at: start,
                color: piece.color,
                to_move: mover,
            });
        }

        if !piece.legal_moves(&self.board).contains(end) {
            return Err(MoveError::IllegalDestination { piece, start, end });
        }

        // Everything below works on a copy, which only replaces the real board once the move is known to be good.
        let mut next = self.board.clone();
        let captured = next.apply_move(start, end);
        if self.rules.contains(Rules::FORBID_SELF_CHECK) && next.is_in_check(mover)? {
            return Err(MoveError::LeavesKingInCheck {
                start,
                end,
                color: mover,
            });
        }

        let state = evaluate(&next, mover.toggle(), self.rules)?;
        self.board = next;
        self.side_to_move = mover.toggle();
        self.state = state;
        tracing::debug!(%start, %end, captured = ?captured.map(|p| p.kind), "move accepted");
        if state.is_over() {
            tracing::info!(?state, "game over");
        }

        Ok(())
    }
}

impl Default for GameSession {
    fn default() -> Self {
        GameSession::new()
    }
}

/// Whether `side` has any move that ends with its king not in check. Every candidate is tried on its own copy of the
/// board.
pub fn has_escape_move(board: &Board, side: Color) -> Result<bool, BoardError> {
    let _span = tracing::debug_span!("escape_search", ?side).entered();
    for piece in board.pieces(side) {
        for end in piece.legal_moves(board) {
            let mut copy = board.clone();
            copy.apply_move(piece.position(), end);
            if !copy.is_in_check(side)? {
                tracing::trace!(start = %piece.position(), %end, "found escape");
                return Ok(true);
            }
        }
    }

    Ok(false)
}

/// Works out the state of a game where `side` is to move on `board`.
fn evaluate(board: &Board, side: Color, rules: Rules) -> Result<GameState, BoardError> {
    // Kings are never captured in a game played through a session; losing one means the move that did it is bogus.
    board.validate_kings()?;
    if has_escape_move(board, side)? {
        return Ok(GameState::ToMove(side));
    }

    if rules.contains(Rules::SEPARATE_STALEMATE) && !board.is_in_check(side)? {
        return Ok(GameState::Stalemate);
    }

    Ok(GameState::Checkmate {
        winner: side.toggle(),
    })
}
