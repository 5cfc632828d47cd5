//! UCI command parsing.

use std::time::Duration;

use karst_core::{Board, Move};
use karst_engine::GoTimes;

use crate::error::UciError;

/// Parameters of a `go` command.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoParams {
    pub times: GoTimes,
    pub depth: Option<i32>,
}

/// An engine option change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionChange {
    /// `setoption name Hash value <MB>`
    HashMb(usize),
    /// `setoption name maxDepth value <plies>`
    MaxDepth(i32),
    /// Recognized syntax, unrecognized option id.
    Unknown(String),
}

/// One parsed line of UCI input.
#[derive(Debug)]
pub enum Command {
    Uci,
    IsReady,
    NewGame,
    SetOption(OptionChange),
    /// Board after applying the position payload and its move list.
    Position(Board),
    Go(GoParams),
    Stop,
    Bench,
    Perft(u32),
    Quit,
    /// Ignored silently, per protocol.
    Unknown(String),
}

/// Parse one input line.
pub fn parse_command(line: &str) -> Result<Command, UciError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some(&head) = tokens.first() else {
        return Ok(Command::Unknown(String::new()));
    };

    match head {
        "uci" => Ok(Command::Uci),
        "isready" => Ok(Command::IsReady),
        "ucinewgame" => Ok(Command::NewGame),
        "setoption" => parse_setoption(&tokens[1..]),
        "position" => parse_position(&tokens[1..]),
        "go" => parse_go(&tokens[1..]),
        "stop" => Ok(Command::Stop),
        "bench" => Ok(Command::Bench),
        "perft" => {
            let depth = parse_value(tokens.get(1), "perft")?;
            Ok(Command::Perft(depth))
        }
        "quit" => Ok(Command::Quit),
        other => Ok(Command::Unknown(other.to_string())),
    }
}

/// `setoption name <id> value <v>`
fn parse_setoption(tokens: &[&str]) -> Result<Command, UciError> {
    if tokens.first() != Some(&"name") {
        return Err(UciError::MalformedSetOption);
    }
    let Some(value_at) = tokens.iter().position(|&t| t == "value") else {
        return Err(UciError::MalformedSetOption);
    };
    let name = tokens[1..value_at].join(" ");
    let value = tokens[value_at + 1..].join(" ");

    let change = match name.as_str() {
        "Hash" => {
            let mb: usize = value.parse().map_err(|_| UciError::InvalidValue {
                param: name,
                value: value.clone(),
            })?;
            OptionChange::HashMb(mb.clamp(1, 1024))
        }
        "maxDepth" => {
            let depth: i32 = value.parse().map_err(|_| UciError::InvalidValue {
                param: name,
                value: value.clone(),
            })?;
            OptionChange::MaxDepth(depth.clamp(1, 128))
        }
        _ => OptionChange::Unknown(name),
    };
    Ok(Command::SetOption(change))
}

/// `position [startpos | fen <fen>] [moves m1 m2 ...]`
fn parse_position(tokens: &[&str]) -> Result<Command, UciError> {
    let (mut board, rest) = match tokens.first() {
        Some(&"startpos") => (Board::starting_position(), &tokens[1..]),
        Some(&"fen") => {
            // FEN is exactly six whitespace-separated fields.
            if tokens.len() < 7 {
                return Err(UciError::InvalidFen {
                    fen: tokens[1..].join(" "),
                });
            }
            let fen = tokens[1..7].join(" ");
            let board: Board = fen
                .parse()
                .map_err(|_| UciError::InvalidFen { fen: fen.clone() })?;
            (board, &tokens[7..])
        }
        _ => return Err(UciError::MalformedPosition),
    };

    if rest.first() == Some(&"moves") {
        for token in &rest[1..] {
            let parsed = Move::from_uci(token, &board);
            match parsed {
                Some(mv) if board.is_legal(mv) => board.make_move(mv),
                _ => {
                    return Err(UciError::InvalidMove {
                        uci_move: token.to_string(),
                    });
                }
            }
        }
    }

    Ok(Command::Position(board))
}

/// `go [wtime N] [btime N] [winc N] [binc N] [movetime N] [depth N] [infinite]`
fn parse_go(tokens: &[&str]) -> Result<Command, UciError> {
    let mut params = GoParams::default();

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "wtime" => {
                params.times.wtime = Some(parse_millis(tokens.get(i + 1), "wtime")?);
                i += 2;
            }
            "btime" => {
                params.times.btime = Some(parse_millis(tokens.get(i + 1), "btime")?);
                i += 2;
            }
            "winc" => {
                params.times.winc = Some(parse_millis(tokens.get(i + 1), "winc")?);
                i += 2;
            }
            "binc" => {
                params.times.binc = Some(parse_millis(tokens.get(i + 1), "binc")?);
                i += 2;
            }
            "movetime" => {
                params.times.movetime = Some(parse_millis(tokens.get(i + 1), "movetime")?);
                i += 2;
            }
            "depth" => {
                params.depth = Some(parse_value(tokens.get(i + 1), "depth")?);
                i += 2;
            }
            "infinite" => {
                params.times.infinite = true;
                i += 1;
            }
            // Unknown go arguments are skipped, per protocol.
            _ => i += 1,
        }
    }

    Ok(Command::Go(params))
}

fn parse_millis(token: Option<&&str>, param: &str) -> Result<Duration, UciError> {
    let ms: u64 = parse_value(token, param)?;
    Ok(Duration::from_millis(ms))
}

fn parse_value<T: std::str::FromStr>(token: Option<&&str>, param: &str) -> Result<T, UciError> {
    let value = token.ok_or_else(|| UciError::MissingValue {
        param: param.to_string(),
    })?;
    value.parse().map_err(|_| UciError::InvalidValue {
        param: param.to_string(),
        value: value.to_string(),
    })
}
