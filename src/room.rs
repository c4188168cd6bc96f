//! One conversation's table: deck, session, and the operations the
//! command handlers drive.
//!
//! Every method here runs under the room's lock (see the registry) and
//! mutates nothing outside this room. Methods return data describing
//! what happened; rendering replies and talking to collaborators is
//! the engine's job, outside the lock.

use std::collections::HashMap;

use uuid::Uuid;

use crate::cards::GameKind;
use crate::config::TableRules;
use crate::deck::Deck;
use crate::errors::Rejection;
use crate::scoring;
use crate::session::{
    Bet, GameSession, LedgerEntry, Participant, PlayedHand, PlayerId, SettleReason,
};
use crate::settlement::{self, NetBalance, RoundSettlement};

pub struct Room {
    pub id: String,
    /// Cleared on banker claim; rebuilt by game selection
    pub deck: Option<Deck>,
    pub session: GameSession,
    /// Strikes per player for betting outside the locked table
    pub outsider_warnings: HashMap<PlayerId, u32>,
}

/// What happened to a bet attempt
pub enum BetOutcome {
    Placed { amount: u64, replaced: bool },
    /// Outsider warned; strikes used so far out of the allowed limit
    Warned { strikes: u32, limit: u32 },
    /// Outsider past the limit; penalty appended to the session log
    Penalized { entry: LedgerEntry },
}

/// A hand dealt (or refused) by the play operation
pub enum PlayOutcome {
    Dealt {
        hand: PlayedHand,
        is_banker: bool,
        /// Present when this play completed the round
        settlement: Option<RoundSettlement>,
        /// Epoch to arm the watchdog for; set only when the banker's
        /// hand opened the waiting window
        arm_epoch: Option<u64>,
    },
    /// Second play in one round; cards were not dealt. The entry is
    /// absent when the offender is the banker (an amount from the
    /// banker to the banker would be meaningless).
    RepeatPenalty { entry: Option<LedgerEntry> },
}

/// Result of a force-collect round reset
pub struct ForceOutcome {
    pub charged: Vec<LedgerEntry>,
    pub settlement: RoundSettlement,
}

/// Result of a close attempt
pub enum CloseOutcome {
    Settled {
        session_id: Uuid,
        banker: Participant,
        rounds: u64,
        nets: Vec<NetBalance>,
    },
    NothingToSettle {
        banker: Participant,
    },
    /// Non-banker, non-admin close attempt; penalty appended
    Penalized {
        entry: LedgerEntry,
    },
}

impl Room {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            deck: None,
            session: GameSession::new(),
            outsider_warnings: HashMap::new(),
        }
    }

    /// Open a fresh session under `banker`. Refused while another
    /// session is open; the deck is cleared so the game must be
    /// selected again.
    pub fn claim_banker(&mut self, banker: Participant) -> Result<(), Rejection> {
        if self.session.is_open() {
            return Err(Rejection::SessionInProgress);
        }
        self.session.open_with(banker);
        self.deck = None;
        self.outsider_warnings.clear();
        Ok(())
    }

    /// Lock the table game. The first call wins; re-selecting the same
    /// game is an acknowledged no-op (`Ok(true)`), a different game is
    /// refused until the session closes.
    pub fn select_game(&mut self, kind: GameKind) -> Result<bool, Rejection> {
        if !self.session.is_open() {
            return Err(Rejection::NoBanker);
        }
        match self.session.game {
            Some(current) if current == kind => Ok(true),
            Some(_) => Err(Rejection::GameTypeLocked),
            None => {
                self.session.game = Some(kind);
                self.deck = Some(Deck::new(kind));
                tracing::info!(room = %self.id, game = %kind, "game locked in");
                Ok(false)
            }
        }
    }

    /// Place or replace `who`'s bet. Outsiders (players outside the
    /// frozen lock set) are warned, then penalized.
    pub fn place_bet(
        &mut self,
        who: &Participant,
        amount: u64,
        rules: &TableRules,
    ) -> Result<BetOutcome, Rejection> {
        if !self.session.is_open() {
            return Err(Rejection::NoBanker);
        }
        if self.session.is_banker(&who.id) {
            return Err(Rejection::BankerCannotBet);
        }
        if self.session.played_this_round.contains(&who.id) {
            return Err(Rejection::AlreadyPlayed);
        }

        if let Some(locked) = &self.session.locked_players {
            if !locked.contains(&who.id) {
                let strikes = self.outsider_warnings.entry(who.id.clone()).or_insert(0);
                *strikes += 1;
                if *strikes <= rules.outsider_warning_limit {
                    return Ok(BetOutcome::Warned {
                        strikes: *strikes,
                        limit: rules.outsider_warning_limit,
                    });
                }
                let banker = self.session.banker.clone().expect("session is open");
                let entry =
                    LedgerEntry::new(&banker, who, rules.outsider_penalty, SettleReason::OutsiderBet);
                self.session.session_log.push(entry.clone());
                return Ok(BetOutcome::Penalized { entry });
            }
        }

        let replaced = self
            .session
            .bets
            .insert(
                who.id.clone(),
                Bet {
                    player_id: who.id.clone(),
                    display_name: who.name.clone(),
                    amount,
                },
            )
            .is_some();
        Ok(BetOutcome::Placed { amount, replaced })
    }

    /// Deal `who` a hand under the locked game, or convert a repeat
    /// play into a penalty. May complete (and settle) the round.
    pub fn play(&mut self, who: &Participant, rules: &TableRules) -> Result<PlayOutcome, Rejection> {
        if !self.session.is_open() {
            return Err(Rejection::NoBanker);
        }
        let Some(kind) = self.session.game else {
            return Err(Rejection::GameNotSelected);
        };
        let is_banker = self.session.is_banker(&who.id);
        if !is_banker && !self.session.bets.contains_key(&who.id) {
            return Err(Rejection::NotABettor);
        }

        if self.session.played_this_round.contains(&who.id) {
            let entry = if is_banker {
                None
            } else {
                let banker = self.session.banker.clone().expect("session is open");
                let entry =
                    LedgerEntry::new(&banker, who, rules.repeat_play_penalty, SettleReason::RepeatPlay);
                self.session.session_log.push(entry.clone());
                Some(entry)
            };
            tracing::warn!(room = %self.id, player = %who.id, "repeat play in one round");
            return Ok(PlayOutcome::RepeatPenalty { entry });
        }

        let deck = self.deck.get_or_insert_with(|| Deck::new(kind));
        deck.ensure(kind.hand_size());
        let cards = deck.draw(kind.hand_size());
        let score = scoring::score(kind, &cards);
        let hand = PlayedHand {
            player_id: who.id.clone(),
            cards,
            strength: score.strength,
            label: score.label,
            multiplier: score.multiplier,
        };

        if is_banker {
            self.session.banker_hand = Some(hand.clone());
        } else {
            self.session
                .hands_this_round
                .insert(who.id.clone(), hand.clone());
        }
        self.session.played_this_round.insert(who.id.clone());

        let mut arm_epoch = is_banker.then_some(self.session.round_epoch);
        let settlement = if self.session.round_ready() {
            arm_epoch = None;
            Some(settlement::settle_round(&mut self.session))
        } else {
            None
        };

        Ok(PlayOutcome::Dealt {
            hand,
            is_banker,
            settlement,
            arm_epoch,
        })
    }

    /// Charge every unplayed bettor their stake and reset the round,
    /// banker hand or not.
    pub fn force_collect(&mut self) -> Result<ForceOutcome, Rejection> {
        if !self.session.is_open() {
            return Err(Rejection::NoBanker);
        }
        let charged = settlement::charge_missing(&mut self.session, SettleReason::DidNotPlay);
        let settlement = settlement::settle_round(&mut self.session);
        Ok(ForceOutcome {
            charged,
            settlement,
        })
    }

    /// Close the session. The banker (or an admin capability) settles
    /// the log into net balances; anyone else is penalized instead.
    pub fn close(&mut self, who: &Participant, admin: bool, rules: &TableRules) -> Result<CloseOutcome, Rejection> {
        if !self.session.is_open() {
            return Err(Rejection::NothingToClose);
        }
        let banker = self.session.banker.clone().expect("session is open");

        if !admin && banker.id != who.id {
            let entry = LedgerEntry::new(
                &banker,
                who,
                rules.unauthorized_close_penalty,
                SettleReason::UnauthorizedClose,
            );
            self.session.session_log.push(entry.clone());
            tracing::warn!(room = %self.id, player = %who.id, "unauthorized close attempt");
            return Ok(CloseOutcome::Penalized { entry });
        }

        let outcome = if self.session.session_log.is_empty() {
            CloseOutcome::NothingToSettle {
                banker: banker.clone(),
            }
        } else {
            CloseOutcome::Settled {
                session_id: self.session.session_id,
                banker: banker.clone(),
                rounds: self.session.round_epoch,
                nets: settlement::net_balances(&self.session.session_log, &banker.id),
            }
        };

        tracing::info!(room = %self.id, session_id = %self.session.session_id, "session closed");
        self.session = GameSession::new();
        self.deck = None;
        self.outsider_warnings.clear();
        Ok(outcome)
    }
}
