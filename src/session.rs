//! Per-room wagering session state.
//!
//! A session spans one banker claim to one close, accumulating rounds
//! and a session-long log of settled amounts. The state machine is
//! `Closed -> AwaitingGameType -> RoundOpen -> RoundOpen* -> Closed`,
//! encoded by which of `banker` and `game` are set.

use std::collections::{HashMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cards::{Card, GameKind};

pub type PlayerId = String;

/// A named session participant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Participant {
    pub id: PlayerId,
    pub name: String,
}

impl Participant {
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A standing wager. One per player per session until replaced;
/// cleared only by session close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bet {
    pub player_id: PlayerId,
    pub display_name: String,
    pub amount: u64,
}

/// A scored hand dealt to one participant this round. The multiplier
/// is carried here as data; nothing downstream parses the label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayedHand {
    pub player_id: PlayerId,
    pub cards: Vec<Card>,
    pub strength: u32,
    pub label: String,
    pub multiplier: u64,
}

/// Why an amount moved between two parties
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SettleReason {
    WonRound,
    DidNotPlay,
    TimedOut,
    RepeatPlay,
    UnauthorizedClose,
    OutsiderBet,
}

impl fmt::Display for SettleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SettleReason::WonRound => "won the round",
            SettleReason::DidNotPlay => "did not play",
            SettleReason::TimedOut => "timed out",
            SettleReason::RepeatPlay => "repeat play",
            SettleReason::UnauthorizedClose => "unauthorized close attempt",
            SettleReason::OutsiderBet => "betting from outside the table",
        };
        write!(f, "{}", s)
    }
}

/// One settled amount, oriented winner -> loser. Append-only within a
/// session; the full log is reduced to net balances at close.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub winner_id: PlayerId,
    pub winner_name: String,
    pub loser_id: PlayerId,
    pub loser_name: String,
    pub amount: u64,
    pub reason: SettleReason,
    pub at: DateTime<Utc>,
}

impl LedgerEntry {
    pub fn new(
        winner: &Participant,
        loser: &Participant,
        amount: u64,
        reason: SettleReason,
    ) -> Self {
        Self {
            winner_id: winner.id.clone(),
            winner_name: winner.name.clone(),
            loser_id: loser.id.clone(),
            loser_name: loser.name.clone(),
            amount,
            reason,
            at: Utc::now(),
        }
    }
}

/// Observable session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Closed,
    AwaitingGameType,
    RoundOpen,
}

/// The aggregate root for one room's wagering session
#[derive(Debug, Clone)]
pub struct GameSession {
    pub session_id: Uuid,
    pub banker: Option<Participant>,
    /// Locked by the first select-game call, immutable until close
    pub game: Option<GameKind>,
    pub bets: HashMap<PlayerId, Bet>,
    pub played_this_round: HashSet<PlayerId>,
    pub hands_this_round: HashMap<PlayerId, PlayedHand>,
    pub banker_hand: Option<PlayedHand>,
    pub session_log: Vec<LedgerEntry>,
    /// Frozen at the first settlement; afterwards only members may bet
    pub locked_players: Option<HashSet<PlayerId>>,
    /// Increments exactly once per completed or forced round; stale
    /// timers detect themselves by comparing against this
    pub round_epoch: u64,
}

impl GameSession {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            banker: None,
            game: None,
            bets: HashMap::new(),
            played_this_round: HashSet::new(),
            hands_this_round: HashMap::new(),
            banker_hand: None,
            session_log: Vec::new(),
            locked_players: None,
            round_epoch: 0,
        }
    }

    /// Reset every field and open a fresh session under `banker`
    pub fn open_with(&mut self, banker: Participant) {
        *self = GameSession::new();
        tracing::info!(session_id = %self.session_id, banker = %banker.id, "session opened");
        self.banker = Some(banker);
    }

    pub fn phase(&self) -> SessionPhase {
        match (&self.banker, &self.game) {
            (None, _) => SessionPhase::Closed,
            (Some(_), None) => SessionPhase::AwaitingGameType,
            (Some(_), Some(_)) => SessionPhase::RoundOpen,
        }
    }

    pub fn is_open(&self) -> bool {
        self.banker.is_some()
    }

    pub fn is_banker(&self, player_id: &str) -> bool {
        self.banker.as_ref().is_some_and(|b| b.id == player_id)
    }

    /// Bettors who have not produced a hand this round, ordered by id
    /// for stable announcements
    pub fn missing_bettors(&self) -> Vec<&Bet> {
        let mut missing: Vec<&Bet> = self
            .bets
            .values()
            .filter(|b| !self.hands_this_round.contains_key(&b.player_id))
            .collect();
        missing.sort_by(|a, b| a.player_id.cmp(&b.player_id));
        missing
    }

    /// A round settles once the banker has a hand and every bettor has
    /// a hand for this round
    pub fn round_ready(&self) -> bool {
        self.banker_hand.is_some() && self.missing_bettors().is_empty()
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_tracks_banker_and_game() {
        let mut session = GameSession::new();
        assert_eq!(session.phase(), SessionPhase::Closed);
        assert!(!session.is_open());

        session.open_with(Participant::new("u1", "Banker"));
        assert_eq!(session.phase(), SessionPhase::AwaitingGameType);
        assert!(session.is_banker("u1"));
        assert!(!session.is_banker("u2"));

        session.game = Some(GameKind::Push);
        assert_eq!(session.phase(), SessionPhase::RoundOpen);
    }

    #[test]
    fn open_with_resets_prior_state(){
        let mut session = GameSession::new();
        session.open_with(Participant::new("u1", "First"));
        session.bets.insert(
            "u2".to_string(),
            Bet {
                player_id: "u2".to_string(),
                display_name: "P2".to_string(),
                amount: 50,
            },
        );
        session.round_epoch = 7;
        let old_id = session.session_id;

        session.open_with(Participant::new("u3", "Second"));
        assert!(session.bets.is_empty());
        assert_eq!(session.round_epoch, 0);
        assert_ne!(session.session_id, old_id);
        assert!(session.is_banker("u3"));
    }

    #[test]
    fn round_ready_needs_banker_hand_and_all_bettors() {
        let mut session = GameSession::new();
        session.open_with(Participant::new("u1", "Banker"));
        session.game = Some(GameKind::Push);
        assert!(!session.round_ready(), "no banker hand yet");

        session.bets.insert(
            "u2".to_string(),
            Bet {
                player_id: "u2".to_string(),
                display_name: "P2".to_string(),
                amount: 100,
            },
        );
        session.banker_hand = Some(PlayedHand {
            player_id: "u1".to_string(),
            cards: vec![],
            strength: 5,
            label: "5 points".to_string(),
            multiplier: 1,
        });
        assert!(!session.round_ready(), "bettor has not played");
        assert_eq!(session.missing_bettors().len(), 1);

        session.hands_this_round.insert(
            "u2".to_string(),
            PlayedHand {
                player_id: "u2".to_string(),
                cards: vec![],
                strength: 7,
                label: "7 points".to_string(),
                multiplier: 1,
            },
        );
        assert!(session.round_ready());
    }
}
