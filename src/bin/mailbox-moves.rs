use structopt::StructOpt;

use mailbox::{GameSession, Position, Rules};

#[derive(Debug, StructOpt)]
struct Options {
    /// FEN representation of the position to analyze.
    #[structopt(name = "FEN")]
    fen: String,

    /// Only list moves for the piece on this square.
    #[structopt(long)]
    from: Option<Position>,

    /// List every move the piece's movement rule allows, including ones that leave its king in check.
    #[structopt(long)]
    reference_rules: bool,
}

fn main() -> anyhow::Result<()> {
    let ops = Options::from_args();
    let rules = if ops.reference_rules {
        Rules::REFERENCE
    } else {
        Rules::STANDARD
    };

    let game = GameSession::from_fen(&ops.fen, rules)?;
    let pieces: Vec<_> = match ops.from {
        Some(square) => game.piece_at(square).into_iter().collect(),
        None => game.board().pieces(game.side_to_move()).collect(),
    };

    for piece in pieces {
        for end in game.legal_moves(piece.position())? {
            println!("{}{}", piece.position(), end);
        }
    }

    Ok(())
}
