//! Plain-text rendering of a session and parsing of typed commands.

use crate::session::{BoardView, SessionSnapshot};
use strictly_ultimate::{Coord, Move};

/// One line of player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Play a move.
    Play(Move),
    /// Pull the room again.
    Refresh,
    /// Start over (leaves an online room).
    NewGame,
    /// Show the command list.
    Help,
    /// Leave the program.
    Quit,
}

/// Input that could not be understood.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("Could not read '{}': {}", input, reason)]
pub struct InputError {
    /// The offending line.
    pub input: String,
    /// What was wrong with it.
    pub reason: &'static str,
}

impl std::error::Error for InputError {}

/// Command summary shown on `h`.
pub const HELP: &str = "Enter a move as `board cell`, each 1-9 in keypad order (e.g. `5 1`) \
or a position name (e.g. `center top-left`). r = refresh, n = new game, h = help, q = quit";

/// Parses a typed line.
///
/// Moves are two positions separated by a space or comma, each a number
/// 1-9 or a name such as `top-left`. Two digits may be written together as
/// `51`.
pub fn parse_input(line: &str) -> Result<Input, InputError> {
    let trimmed = line.trim();
    let fail = |reason| InputError {
        input: trimmed.to_string(),
        reason,
    };

    match trimmed.to_lowercase().as_str() {
        "q" | "quit" | "exit" => return Ok(Input::Quit),
        "r" | "refresh" => return Ok(Input::Refresh),
        "n" | "new" => return Ok(Input::NewGame),
        "h" | "help" | "?" => return Ok(Input::Help),
        "" => return Err(fail("empty input")),
        _ => {}
    }

    let parts: Vec<&str> = trimmed
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty())
        .collect();
    let (board, cell) = match parts.as_slice() {
        [board, cell] => (*board, *cell),
        [both] if both.len() == 2 && both.is_ascii() => both.split_at(1),
        _ => return Err(fail("expected a board and a cell")),
    };

    let board =
        Coord::from_label_or_number(board).ok_or_else(|| fail("board must be 1-9"))?;
    let cell = Coord::from_label_or_number(cell).ok_or_else(|| fail("cell must be 1-9"))?;
    Ok(Input::Play(Move::new(board, cell)))
}

/// The three characters shown for one row of one small board.
fn board_row(board: &BoardView, row: u8) -> String {
    if let Some(winner) = board.winner {
        return if row == 1 {
            format!(" {} ", winner)
        } else {
            "   ".to_string()
        };
    }
    (0..3)
        .map(|col| board.cells[usize::from(row * 3 + col)].to_string())
        .collect()
}

/// Renders the whole screen for `snapshot`.
///
/// Boards the side to move may play in are wrapped in brackets.
pub fn render(snapshot: &SessionSnapshot) -> String {
    let mut out = String::new();

    out.push_str(snapshot.mode);
    if let (Some(room), Some(seat)) = (&snapshot.room, snapshot.seat) {
        out.push_str(&format!(" | room '{}' as {}", room, seat));
    }
    out.push_str(&format!(
        " | X: {} vs O: {}\n\n",
        snapshot.names.x, snapshot.names.o
    ));

    for big_row in 0..3 {
        for small_row in 0..3 {
            let line: Vec<String> = snapshot.boards[big_row * 3..big_row * 3 + 3]
                .iter()
                .map(|board| {
                    let (open, close) = if board.active { ('[', ']') } else { (' ', ' ') };
                    format!("{}{}{}", open, board_row(board, small_row), close)
                })
                .collect();
            out.push_str(&line.join(" "));
            out.push('\n');
        }
        if big_row < 2 {
            out.push('\n');
        }
    }
    out.push('\n');

    match snapshot.outcome_line() {
        Some(outcome) => out.push_str(&outcome),
        None => {
            out.push_str(&snapshot.status_line());
            out.push_str(&format!(" | {}s left", snapshot.remaining_secs));
            if snapshot.locked {
                out.push_str(" | waiting...");
            }
        }
    }
    out.push('\n');

    if let Some(notice) = &snapshot.notice {
        out.push_str(&format!("! {}\n", notice));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{PlayerNames, Session};
    use chrono::{TimeZone, Utc};
    use strictly_ultimate::TurnDuration;

    #[test]
    fn test_parse_moves() {
        let center = Move::new(Coord::CENTER, Coord::TOP_LEFT);
        assert_eq!(parse_input("5 1"), Ok(Input::Play(center)));
        assert_eq!(parse_input(" 5,1 "), Ok(Input::Play(center)));
        assert_eq!(parse_input("51"), Ok(Input::Play(center)));
        assert_eq!(parse_input("Center top-left"), Ok(Input::Play(center)));
        let corner = Coord::new(2, 2).unwrap();
        assert_eq!(
            parse_input("bottom-right, 9"),
            Ok(Input::Play(Move::new(corner, corner)))
        );
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_input("q"), Ok(Input::Quit));
        assert_eq!(parse_input("R"), Ok(Input::Refresh));
        assert_eq!(parse_input("new"), Ok(Input::NewGame));
        assert_eq!(parse_input("?"), Ok(Input::Help));
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert_eq!(parse_input("0 3").unwrap_err().reason, "board must be 1-9");
        assert_eq!(parse_input("3 10").unwrap_err().reason, "cell must be 1-9");
        assert!(parse_input("").is_err());
        assert!(parse_input("1 2 3").is_err());
    }

    #[tokio::test]
    async fn test_render_marks_active_board() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let names = PlayerNames::new("Ann".into(), "Bo".into());
        let mut session = Session::local(names, TurnDuration::default(), t0);
        session
            .play(Move::new(Coord::CENTER, Coord::CENTER), t0)
            .await
            .unwrap();

        let screen = render(&session.snapshot(t0));
        let lines: Vec<&str> = screen.lines().collect();
        // Middle row of the middle band of boards.
        assert_eq!(lines[7], " ...  [.X.]  ... ");
        assert!(screen.contains("Turn: Bo (O) | play in the highlighted board | 30s left"));
    }
}
