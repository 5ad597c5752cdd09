// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! `mailbox` is a small two-player chess rules engine.
//!
//! It keeps a board of pieces, knows how each kind of piece moves, applies moves, and decides when a game is over by
//! check and checkmate. There is no castling, en passant, promotion, or draw bookkeeping, and no search: it referees
//! games, it doesn't play them.
//!
//! Drive a game through [`GameSession`]:
//!
//! ```
//! use mailbox::{GameSession, Position};
//!
//! let mut game = GameSession::new();
//! let e2: Position = "e2".parse().unwrap();
//! let e3: Position = "e3".parse().unwrap();
//! assert!(game.attempt_move(e2, e3));
//! assert!(!game.is_checkmate());
//! ```

pub mod board;
pub mod core;
pub mod game;
pub mod movegen;

pub use crate::board::{Board, BoardError, BoardSnapshot, FenParseError};
pub use crate::core::{Color, Piece, PieceKind, Position, SquareSet};
pub use crate::game::{GameSession, GameState, MoveError, Player, Rules};
