//! Typed command grammar for the inbound message boundary.
//!
//! Free text is resolved here, once, into a [`Command`]; the state
//! machine only ever sees typed operations. Text that does not start
//! with a known token is not a command and produces no reply.

use thiserror::Error;

use crate::cards::GameKind;

/// One parsed chat command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Open a new session with the caller as banker
    ClaimBanker,
    /// Lock the table game for this session (first call wins)
    SelectGame(GameKind),
    /// Place or replace a bet; `None` means the configured default
    PlaceBet(Option<u64>),
    /// Deal the caller a hand under the locked game
    Play,
    /// Charge unplayed bettors and reset the round
    ForceCollect,
    /// Settle net balances and close the session
    CloseSession,
    /// Stateless dice roll
    RollDice,
}

/// A recognized command with arguments the grammar rejects
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown game: choose push or bull")]
    UnknownGame,
    #[error("bet amount must be a positive whole number")]
    BadAmount,
}

/// Parse one inbound message body. `Ok(None)` means the text is not a
/// command at all.
pub fn parse(text: &str) -> Result<Option<Command>, ParseError> {
    let mut tokens = text.split_whitespace();
    let Some(head) = tokens.next() else {
        return Ok(None);
    };

    let cmd = match head {
        "claim-banker" => Command::ClaimBanker,
        "select-game" => match tokens.next() {
            Some("push") => Command::SelectGame(GameKind::Push),
            Some("bull") => Command::SelectGame(GameKind::Bull),
            _ => return Err(ParseError::UnknownGame),
        },
        "bet" => match tokens.next() {
            None => Command::PlaceBet(None),
            Some(raw) => match raw.parse::<u64>() {
                Ok(amount) if amount > 0 => Command::PlaceBet(Some(amount)),
                _ => return Err(ParseError::BadAmount),
            },
        },
        "play" => Command::Play,
        "force-collect" => Command::ForceCollect,
        "close-session" => Command::CloseSession,
        "roll-dice" => Command::RollDice,
        _ => return Ok(None),
    };
    Ok(Some(cmd))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_token_parses() {
        assert_eq!(parse("claim-banker"), Ok(Some(Command::ClaimBanker)));
        assert_eq!(
            parse("select-game push"),
            Ok(Some(Command::SelectGame(GameKind::Push)))
        );
        assert_eq!(
            parse("select-game bull"),
            Ok(Some(Command::SelectGame(GameKind::Bull)))
        );
        assert_eq!(parse("bet"), Ok(Some(Command::PlaceBet(None))));
        assert_eq!(parse("bet 250"), Ok(Some(Command::PlaceBet(Some(250)))));
        assert_eq!(parse("play"), Ok(Some(Command::Play)));
        assert_eq!(parse("force-collect"), Ok(Some(Command::ForceCollect)));
        assert_eq!(parse("close-session"), Ok(Some(Command::CloseSession)));
        assert_eq!(parse("roll-dice"), Ok(Some(Command::RollDice)));
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        assert_eq!(parse("  play  "), Ok(Some(Command::Play)));
        assert_eq!(parse("bet   42"), Ok(Some(Command::PlaceBet(Some(42)))));
    }

    #[test]
    fn non_commands_are_silent() {
        assert_eq!(parse(""), Ok(None));
        assert_eq!(parse("hello there"), Ok(None));
        assert_eq!(parse("betting is fun"), Ok(None));
    }

    #[test]
    fn bad_arguments_are_reported() {
        assert_eq!(parse("select-game tarot"), Err(ParseError::UnknownGame));
        assert_eq!(parse("select-game"), Err(ParseError::UnknownGame));
        assert_eq!(parse("bet zero"), Err(ParseError::BadAmount));
        assert_eq!(parse("bet 0"), Err(ParseError::BadAmount));
        assert_eq!(parse("bet -5"), Err(ParseError::BadAmount));
    }
}
