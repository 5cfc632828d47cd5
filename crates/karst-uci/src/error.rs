//! UCI protocol errors. All of them are recoverable: the offending command
//! is dropped and the loop keeps reading.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum UciError {
    #[error("position command needs 'startpos' or 'fen'")]
    MalformedPosition,

    #[error("invalid FEN: {fen}")]
    InvalidFen { fen: String },

    #[error("invalid or illegal move: {uci_move}")]
    InvalidMove { uci_move: String },

    #[error("malformed setoption command")]
    MalformedSetOption,

    #[error("missing value for {param}")]
    MissingValue { param: String },

    #[error("invalid value for {param}: {value}")]
    InvalidValue { param: String, value: String },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}
