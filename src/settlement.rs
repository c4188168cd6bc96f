//! Round settlement and close-time netting.
//!
//! Settlement compares every played hand against the banker's, applies
//! the winning side's multiplier to the bet, and appends oriented
//! entries to the session log. Close reduces the whole log to one net
//! balance per non-banker participant.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::session::{GameSession, LedgerEntry, Participant, SettleReason};

/// Outcome of settling one round
#[derive(Debug, Clone)]
pub struct RoundSettlement {
    /// Entries appended to the session log by this settlement
    pub entries: Vec<LedgerEntry>,
    /// Bettors whose hand tied the banker's; no money moved
    pub pushes: Vec<Participant>,
    /// The epoch of the round that just settled
    pub settled_epoch: u64,
}

/// Charge every bettor who has not produced a hand this round their
/// full bet as a loss to the banker. Entries are appended to the log
/// and returned for announcement. State is otherwise untouched; the
/// caller follows up with [`settle_round`].
pub fn charge_missing(session: &mut GameSession, reason: SettleReason) -> Vec<LedgerEntry> {
    let Some(banker) = session.banker.clone() else {
        return Vec::new();
    };
    let charged: Vec<LedgerEntry> = session
        .missing_bettors()
        .into_iter()
        .map(|bet| {
            LedgerEntry::new(
                &banker,
                &Participant::new(bet.player_id.clone(), bet.display_name.clone()),
                bet.amount,
                reason,
            )
        })
        .collect();
    for entry in &charged {
        tracing::info!(
            session_id = %session.session_id,
            player = %entry.loser_id,
            amount = entry.amount,
            reason = %entry.reason,
            "bettor charged without a hand"
        );
    }
    session.session_log.extend(charged.iter().cloned());
    charged
}

/// Settle the current round: compare each played hand against the
/// banker's, append win/loss entries, freeze the player lock set on
/// the session's first settlement, advance the epoch, and clear the
/// per-round state. Bets stay in place for the next round.
pub fn settle_round(session: &mut GameSession) -> RoundSettlement {
    let settled_epoch = session.round_epoch;
    let banker = session
        .banker
        .clone()
        .unwrap_or_else(|| Participant::new("", ""));

    let mut entries = Vec::new();
    let mut pushes = Vec::new();

    if let Some(banker_hand) = session.banker_hand.clone() {
        // Stable order keeps announcements and tests deterministic.
        let mut player_ids: Vec<&String> = session.hands_this_round.keys().collect();
        player_ids.sort();

        for player_id in player_ids {
            let hand = &session.hands_this_round[player_id];
            let Some(bet) = session.bets.get(player_id) else {
                continue;
            };
            let player = Participant::new(bet.player_id.clone(), bet.display_name.clone());

            if hand.strength > banker_hand.strength {
                entries.push(LedgerEntry::new(
                    &player,
                    &banker,
                    bet.amount * hand.multiplier,
                    SettleReason::WonRound,
                ));
            } else if hand.strength < banker_hand.strength {
                entries.push(LedgerEntry::new(
                    &banker,
                    &player,
                    bet.amount * banker_hand.multiplier,
                    SettleReason::WonRound,
                ));
            } else {
                pushes.push(player);
            }
        }
    }

    session.session_log.extend(entries.iter().cloned());

    if session.locked_players.is_none() {
        session.locked_players = Some(session.bets.keys().cloned().collect());
    }

    session.round_epoch += 1;
    session.played_this_round.clear();
    session.hands_this_round.clear();
    session.banker_hand = None;

    tracing::info!(
        session_id = %session.session_id,
        epoch = session.round_epoch,
        settled = entries.len(),
        pushed = pushes.len(),
        "round settled"
    );

    RoundSettlement {
        entries,
        pushes,
        settled_epoch,
    }
}

/// One participant's net position against the banker at close
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetBalance {
    pub player_id: String,
    pub name: String,
    /// Positive: the banker owes the player; negative: the player owes
    /// the banker
    pub net: i64,
}

/// Reduce a session log to per-player net balances relative to the
/// banker, dropping zero nets. Ordered by player id.
pub fn net_balances(log: &[LedgerEntry], banker_id: &str) -> Vec<NetBalance> {
    let mut nets: HashMap<&str, (String, i64)> = HashMap::new();
    for entry in log {
        if entry.loser_id == banker_id {
            let slot = nets
                .entry(&entry.winner_id)
                .or_insert_with(|| (entry.winner_name.clone(), 0));
            slot.1 += entry.amount as i64;
        } else if entry.winner_id == banker_id {
            let slot = nets
                .entry(&entry.loser_id)
                .or_insert_with(|| (entry.loser_name.clone(), 0));
            slot.1 -= entry.amount as i64;
        }
    }

    let mut balances: Vec<NetBalance> = nets
        .into_iter()
        .filter(|(_, (_, net))| *net != 0)
        .map(|(player_id, (name, net))| NetBalance {
            player_id: player_id.to_string(),
            name,
            net,
        })
        .collect();
    balances.sort_by(|a, b| a.player_id.cmp(&b.player_id));
    balances
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Card, GameKind, TileRank};
    use crate::scoring;
    use crate::session::{Bet, PlayedHand};

    fn hand_from(player_id: &str, kind: GameKind, cards: Vec<Card>) -> PlayedHand {
        let score = scoring::score(kind, &cards);
        PlayedHand {
            player_id: player_id.to_string(),
            cards,
            strength: score.strength,
            label: score.label,
            multiplier: score.multiplier,
        }
    }

    fn open_push_session() -> GameSession {
        let mut session = GameSession::new();
        session.open_with(Participant::new("banker", "Banker"));
        session.game = Some(GameKind::Push);
        session
    }

    fn bet(session: &mut GameSession, id: &str, name: &str, amount: u64) {
        session.bets.insert(
            id.to_string(),
            Bet {
                player_id: id.to_string(),
                display_name: name.to_string(),
                amount,
            },
        );
    }

    fn tile(p: u8) -> Card {
        Card::tile(TileRank::Pip(p))
    }

    #[test]
    fn winner_takes_bet_times_winning_side_multiplier() {
        let mut session = open_push_session();
        bet(&mut session, "a", "Alice", 100);
        session.banker_hand = Some(hand_from("banker", GameKind::Push, vec![tile(2), tile(3)]));
        session.hands_this_round.insert(
            "a".to_string(),
            hand_from("a", GameKind::Push, vec![tile(4), tile(5)]),
        );

        let result = settle_round(&mut session);
        assert_eq!(result.entries.len(), 1);
        let entry = &result.entries[0];
        assert_eq!(entry.winner_id, "a");
        assert_eq!(entry.loser_id, "banker");
        assert_eq!(entry.amount, 100);
        assert_eq!(entry.reason, SettleReason::WonRound);
        assert_eq!(session.session_log.len(), 1);
    }

    #[test]
    fn two_player_push_round_settles_both_sides() {
        // Banker holds a pair of 5s (105). Player A's 7 points lose,
        // player B's blank pair (1000) wins.
        let mut session = open_push_session();
        bet(&mut session, "a", "Alice", 100);
        bet(&mut session, "b", "Bob", 100);
        session.banker_hand = Some(hand_from("banker", GameKind::Push, vec![tile(5), tile(5)]));
        session.hands_this_round.insert(
            "a".to_string(),
            hand_from("a", GameKind::Push, vec![tile(3), tile(4)]),
        );
        session.hands_this_round.insert(
            "b".to_string(),
            hand_from(
                "b",
                GameKind::Push,
                vec![Card::tile(TileRank::Blank), Card::tile(TileRank::Blank)],
            ),
        );

        let result = settle_round(&mut session);
        assert_eq!(result.entries.len(), 2);
        assert!(result.pushes.is_empty());

        let a = &result.entries[0];
        assert_eq!((a.winner_id.as_str(), a.loser_id.as_str()), ("banker", "a"));
        assert_eq!(a.amount, 100);
        let b = &result.entries[1];
        assert_eq!((b.winner_id.as_str(), b.loser_id.as_str()), ("b", "banker"));
        assert_eq!(b.amount, 100);

        assert_eq!(session.session_log.len(), 2);
        assert_eq!(session.round_epoch, 1);
        assert!(session.hands_this_round.is_empty());
        assert!(session.banker_hand.is_none());
        assert_eq!(session.bets.len(), 2, "bets persist across rounds");
    }

    #[test]
    fn equal_strength_is_a_push() {
        let mut session = open_push_session();
        bet(&mut session, "a", "Alice", 100);
        session.banker_hand = Some(hand_from("banker", GameKind::Push, vec![tile(3), tile(4)]));
        session.hands_this_round.insert(
            "a".to_string(),
            hand_from("a", GameKind::Push, vec![tile(2), tile(5)]),
        );

        let result = settle_round(&mut session);
        assert!(result.entries.is_empty());
        assert_eq!(result.pushes.len(), 1);
        assert!(session.session_log.is_empty());
        assert_eq!(session.round_epoch, 1, "a pushed round still advances");
    }

    #[test]
    fn bull_multipliers_belong_to_the_winning_side() {
        let mut session = GameSession::new();
        session.open_with(Participant::new("banker", "Banker"));
        session.game = Some(GameKind::Bull);
        bet(&mut session, "a", "Alice", 100);
        bet(&mut session, "b", "Bob", 100);

        fn poker(rank: u8) -> Card {
            Card::poker(rank, crate::cards::Suit::Hearts)
        }
        // Banker: bull 9 (multiplier 2).
        session.banker_hand = Some(hand_from(
            "banker",
            GameKind::Bull,
            vec![poker(10), poker(11), poker(13), poker(7), poker(2)],
        ));
        // Alice: bull-bull (multiplier 3) beats the banker -> 300.
        session.hands_this_round.insert(
            "a".to_string(),
            hand_from(
                "a",
                GameKind::Bull,
                vec![poker(12), poker(13), poker(10), poker(4), poker(6)],
            ),
        );
        // Bob: no bull loses to the banker at the banker's x2 -> 200.
        session.hands_this_round.insert(
            "b".to_string(),
            hand_from(
                "b",
                GameKind::Bull,
                vec![poker(1), poker(1), poker(2), poker(4), poker(6)],
            ),
        );

        let result = settle_round(&mut session);
        assert_eq!(result.entries.len(), 2);
        let alice = &result.entries[0];
        assert_eq!(alice.winner_id, "a");
        assert_eq!(alice.amount, 300);
        let bob = &result.entries[1];
        assert_eq!(bob.winner_id, "banker");
        assert_eq!(bob.amount, 200);
    }

    #[test]
    fn first_settlement_freezes_the_player_set() {
        let mut session = open_push_session();
        bet(&mut session, "a", "Alice", 100);
        session.banker_hand = Some(hand_from("banker", GameKind::Push, vec![tile(5), tile(5)]));
        session.hands_this_round.insert(
            "a".to_string(),
            hand_from("a", GameKind::Push, vec![tile(3), tile(4)]),
        );

        assert!(session.locked_players.is_none());
        settle_round(&mut session);
        let locked = session.locked_players.as_ref().expect("frozen");
        assert!(locked.contains("a"));
        assert_eq!(locked.len(), 1);

        // A later settlement does not re-freeze.
        bet(&mut session, "c", "Cara", 50);
        session.banker_hand = Some(hand_from("banker", GameKind::Push, vec![tile(1), tile(2)]));
        settle_round(&mut session);
        assert_eq!(session.locked_players.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn charge_missing_writes_one_loss_per_absent_bettor() {
        let mut session = open_push_session();
        bet(&mut session, "a", "Alice", 100);
        bet(&mut session, "b", "Bob", 250);
        session.hands_this_round.insert(
            "a".to_string(),
            hand_from("a", GameKind::Push, vec![tile(3), tile(4)]),
        );

        let charged = charge_missing(&mut session, SettleReason::DidNotPlay);
        assert_eq!(charged.len(), 1);
        assert_eq!(charged[0].loser_id, "b");
        assert_eq!(charged[0].amount, 250);
        assert_eq!(charged[0].reason, SettleReason::DidNotPlay);
        assert_eq!(session.session_log.len(), 1);
    }

    #[test]
    fn net_balances_reduce_and_drop_zero() {
        let banker = Participant::new("banker", "Banker");
        let alice = Participant::new("a", "Alice");
        let bob = Participant::new("b", "Bob");
        let log = vec![
            LedgerEntry::new(&alice, &banker, 300, SettleReason::WonRound),
            LedgerEntry::new(&banker, &alice, 100, SettleReason::WonRound),
            LedgerEntry::new(&banker, &bob, 200, SettleReason::WonRound),
            LedgerEntry::new(&bob, &banker, 200, SettleReason::WonRound),
        ];

        let nets = net_balances(&log, "banker");
        assert_eq!(nets.len(), 1, "Bob nets to zero and is dropped");
        assert_eq!(nets[0].player_id, "a");
        assert_eq!(nets[0].net, 200);
    }
}
