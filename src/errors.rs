//! Error taxonomy for the wagering engine.
//!
//! User-input violations are [`Rejection`]s: each renders as the exact
//! message sent back to the offending user, and none of them mutates
//! room state (the penalty conversions live in the room operations,
//! not here). Collaborator and configuration failures have their own
//! types and are never fatal to the process.

use thiserror::Error;

/// A command refused on its own terms; the message is user-facing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("no banker yet: open a session with claim-banker first")]
    NoBanker,

    #[error("a session is already in progress: close it before claiming the bank")]
    SessionInProgress,

    #[error("this session's game is already locked in")]
    GameTypeLocked,

    #[error("choose a game first: select-game push or select-game bull")]
    GameNotSelected,

    #[error("the banker cannot place bets")]
    BankerCannotBet,

    #[error("you already played this round: wait for settlement")]
    AlreadyPlayed,

    #[error("place a bet before playing")]
    NotABettor,

    #[error("no session is open, nothing to close")]
    NothingToClose,
}

/// Failure reported by an external collaborator (ledger, push
/// delivery); logged and absorbed, never propagated to users
#[derive(Debug, Error)]
#[error("collaborator unavailable: {0}")]
pub struct SinkError(pub String);

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level engine construction errors
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}
