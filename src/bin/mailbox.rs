// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail};
use mailbox::{Board, Color, GameSession, GameState, Position, Rules};
use structopt::StructOpt;
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

/// Play a game of chess on the console. Enter moves as two squares, e.g. `e2 e3`.
#[derive(Debug, StructOpt)]
struct Options {
    /// Start from this FEN record instead of the standard starting position.
    #[structopt(long)]
    fen: Option<String>,

    /// Accept moves that leave your own king in check, and report stalemate as checkmate.
    #[structopt(long)]
    reference_rules: bool,

    /// Print the board as JSON instead of as a diagram.
    #[structopt(long)]
    json: bool,
}

enum Command {
    Move(Position, Position),
    Moves(Position),
    Quit,
}

fn parse_command(line: &str) -> anyhow::Result<Command> {
    let components: Vec<_> = line.split_whitespace().collect();
    match components.as_slice() {
        ["quit"] | ["exit"] => Ok(Command::Quit),
        ["moves", square] => Ok(Command::Moves(square.parse()?)),
        [start, end] => Ok(Command::Move(start.parse()?, end.parse()?)),
        [] => Err(anyhow!("expected a move, e.g. `e2 e3`")),
        _ => bail!("unrecognized command: {}", line.trim()),
    }
}

fn print_board(game: &GameSession, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(&game.board().snapshot())?);
    } else {
        print!("{}", game.board());
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(LevelFilter::WARN)
        .with_env_filter(EnvFilter::from_env("MAILBOX_LOG"))
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let args = Options::from_args();
    let rules = if args.reference_rules {
        Rules::REFERENCE
    } else {
        Rules::STANDARD
    };

    let mut game = match args.fen {
        Some(ref fen) => GameSession::from_fen(fen, rules)?,
        None => GameSession::with_rules(Board::starting_position(), Color::White, rules)?,
    };

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    while !game.state().is_over() {
        print_board(&game, args.json)?;
        print!("{} to move: ", game.side_to_move());
        io::stdout().flush()?;

        let line = match lines.next() {
            Some(line) => line?,
            None => return Ok(()),
        };

        match parse_command(&line) {
            Ok(Command::Quit) => return Ok(()),
            Ok(Command::Moves(square)) => {
                let moves: Vec<_> = game
                    .legal_moves(square)?
                    .into_iter()
                    .map(|pos| pos.to_string())
                    .collect();
                println!("{}: {}", square, moves.join(" "));
            }
            Ok(Command::Move(start, end)) => {
                if let Err(err) = game.try_move(start, end) {
                    println!("Invalid move! {}", err);
                }
            }
            Err(err) => println!("{}", err),
        }
    }

    print_board(&game, args.json)?;
    match game.state() {
        GameState::Checkmate { winner } => println!("Checkmate! {} wins.", winner),
        GameState::Stalemate => println!("Stalemate."),
        GameState::ToMove(_) => unreachable!(),
    }

    Ok(())
}
