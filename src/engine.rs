//! Command-handling façade over the room registry.
//!
//! One engine instance serves every conversation. A command is parsed
//! at the boundary, the caller's display name is resolved before the
//! room lock is taken, the state transition runs under the lock, and
//! collaborator I/O (ledger rows, pushes) happens after release.

use std::sync::Arc;

use rand::Rng;

use crate::commands::{self, Command};
use crate::config::ParlorConfig;
use crate::errors::EngineError;
use crate::metrics::EngineMetrics;
use crate::outbound::{self, MentionBuilder, OutboundMessage};
use crate::registry::RoomRegistry;
use crate::room::{BetOutcome, CloseOutcome, PlayOutcome, Room};
use crate::session::Participant;
use crate::settlement::NetBalance;
use crate::timer;
use crate::traits::{LedgerSink, NameResolver, Notifier};

/// Who issued a command. `admin` is the capability that may close any
/// session; the transport layer decides who carries it.
#[derive(Debug, Clone)]
pub struct CallerCtx {
    pub player_id: String,
    pub admin: bool,
}

impl CallerCtx {
    pub fn user(player_id: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            admin: false,
        }
    }

    pub fn admin(player_id: impl Into<String>) -> Self {
        Self {
            player_id: player_id.into(),
            admin: true,
        }
    }
}

/// A pending ledger write produced under the lock, performed after it
struct LedgerRow {
    debtor: String,
    creditor: String,
    amount: u64,
    note: String,
}

/// Everything a command produced under the room lock
struct Applied {
    messages: Vec<OutboundMessage>,
    arm_epoch: Option<u64>,
    ledger_rows: Vec<LedgerRow>,
}

impl Applied {
    fn reply(messages: Vec<OutboundMessage>) -> Self {
        Self {
            messages,
            arm_epoch: None,
            ledger_rows: Vec::new(),
        }
    }
}

pub struct Engine {
    config: ParlorConfig,
    registry: RoomRegistry,
    names: Arc<dyn NameResolver>,
    ledger: Arc<dyn LedgerSink>,
    notifier: Arc<dyn Notifier>,
    metrics: Arc<EngineMetrics>,
}

impl Engine {
    pub fn new(
        config: ParlorConfig,
        names: Arc<dyn NameResolver>,
        ledger: Arc<dyn LedgerSink>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            config,
            registry: RoomRegistry::new(),
            names,
            ledger,
            notifier,
            metrics: Arc::new(EngineMetrics::new()),
        })
    }

    pub fn metrics(&self) -> Arc<EngineMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Handle one inbound message. Non-commands return no messages;
    /// everything else returns the replies for the room.
    pub async fn handle_command(
        &self,
        room_id: &str,
        caller: &CallerCtx,
        text: &str,
    ) -> Vec<OutboundMessage> {
        let command = match commands::parse(text) {
            Ok(Some(command)) => command,
            Ok(None) => return Vec::new(),
            Err(e) => return vec![OutboundMessage::text(e.to_string())],
        };
        self.metrics.record_command();
        tracing::debug!(room = room_id, player = %caller.player_id, ?command, "command received");

        // Collaborator lookup happens before the room lock is taken.
        let who = Participant::new(
            caller.player_id.clone(),
            self.display_name(room_id, &caller.player_id).await,
        );

        if let Command::RollDice = command {
            let roll = rand::thread_rng().gen_range(1..=6);
            return vec![OutboundMessage::text(format!(
                "🎲 {} rolls a {}.",
                who.name, roll
            ))];
        }

        let room = self.registry.get_or_create(room_id);
        let applied = {
            let mut guard = room.lock().await;
            self.apply(&mut guard, &who, caller.admin, command)
        };

        if let Some(epoch) = applied.arm_epoch {
            timer::arm_round_watchdog(
                Arc::clone(&room),
                room_id.to_string(),
                epoch,
                self.config.timer.clone(),
                Arc::clone(&self.notifier),
                Arc::clone(&self.metrics),
            );
        }

        for row in applied.ledger_rows {
            if let Err(e) = self
                .ledger
                .record(&row.debtor, &row.creditor, row.amount, &row.note)
                .await
            {
                tracing::warn!(
                    room = room_id,
                    debtor = %row.debtor,
                    creditor = %row.creditor,
                    amount = row.amount,
                    error = %e,
                    "ledger write failed; row skipped"
                );
            }
        }

        applied.messages
    }

    async fn display_name(&self, room_id: &str, player_id: &str) -> String {
        match self.names.resolve(room_id, player_id).await {
            Some(name) => name,
            None => generic_name(player_id),
        }
    }

    /// Run one typed command against a locked room
    fn apply(&self, room: &mut Room, who: &Participant, admin: bool, command: Command) -> Applied {
        let rules = &self.config.rules;
        match command {
            Command::RollDice => unreachable!("handled before the lock"),

            Command::ClaimBanker => match room.claim_banker(who.clone()) {
                Err(rejection) => Applied::reply(vec![OutboundMessage::text(rejection.to_string())]),
                Ok(()) => Applied::reply(vec![MentionBuilder::new()
                    .mention(&who.name, &who.id)
                    .say(" holds the bank. Choose a game: select-game push or select-game bull.")
                    .build()]),
            },

            Command::SelectGame(kind) => match room.select_game(kind) {
                Err(rejection) => Applied::reply(vec![OutboundMessage::text(rejection.to_string())]),
                Ok(true) => Applied::reply(vec![OutboundMessage::text(format!(
                    "{} is already this session's game.",
                    kind
                ))]),
                Ok(false) => Applied::reply(vec![OutboundMessage::text(format!(
                    "Game locked in: {}. The deck is shuffled, place your bets.",
                    kind
                ))]),
            },

            Command::PlaceBet(amount) => {
                let amount = amount.unwrap_or(rules.default_bet);
                match room.place_bet(who, amount, rules) {
                    Err(rejection) => {
                        Applied::reply(vec![OutboundMessage::text(rejection.to_string())])
                    }
                    Ok(BetOutcome::Placed { amount, replaced }) => {
                        let verb = if replaced { "changes the bet to" } else { "bets" };
                        Applied::reply(vec![MentionBuilder::new()
                            .mention(&who.name, &who.id)
                            .say(&format!(" {} {}.", verb, amount))
                            .build()])
                    }
                    Ok(BetOutcome::Warned { strikes, limit }) => {
                        Applied::reply(vec![MentionBuilder::new()
                            .mention(&who.name, &who.id)
                            .say(&format!(
                                ", this table is locked to its players (warning {}/{}).",
                                strikes, limit
                            ))
                            .build()])
                    }
                    Ok(BetOutcome::Penalized { entry }) => {
                        self.metrics.record_penalty();
                        Applied::reply(vec![MentionBuilder::new()
                            .mention(&who.name, &who.id)
                            .say(&format!(
                                " keeps betting at a locked table: {} to the banker.",
                                entry.amount
                            ))
                            .build()])
                    }
                }
            }

            Command::Play => match room.play(who, rules) {
                Err(rejection) => Applied::reply(vec![OutboundMessage::text(rejection.to_string())]),
                Ok(PlayOutcome::RepeatPenalty { entry }) => {
                    let mut builder = MentionBuilder::new()
                        .mention(&who.name, &who.id)
                        .say(", cards are dealt once per round");
                    if let Some(entry) = &entry {
                        self.metrics.record_penalty();
                        builder = builder.say(&format!(": {} to the banker", entry.amount));
                    }
                    Applied::reply(vec![builder.say(".").build()])
                }
                Ok(PlayOutcome::Dealt {
                    hand,
                    is_banker,
                    settlement,
                    arm_epoch,
                }) => {
                    let cards = hand
                        .cards
                        .iter()
                        .map(|c| c.to_string())
                        .collect::<Vec<_>>()
                        .join(" ");
                    let role = if is_banker { " (banker)" } else { "" };
                    let mut messages = vec![MentionBuilder::new()
                        .mention(&who.name, &who.id)
                        .say(&format!("{} draws {}: {}.", role, cards, hand.label))
                        .build()];

                    if let Some(settlement) = &settlement {
                        self.metrics.record_round_settled();
                        tracing::debug!(
                            room = %room.id,
                            epoch = settlement.settled_epoch,
                            "final hand settled the round"
                        );
                        messages.push(outbound::settlement_message(
                            &settlement.entries,
                            &settlement.pushes,
                        ));
                    } else if is_banker {
                        messages.push(OutboundMessage::text(
                            "The banker has played. Bettors, show your hands.",
                        ));
                    }

                    Applied {
                        messages,
                        arm_epoch,
                        ledger_rows: Vec::new(),
                    }
                }
            },

            Command::ForceCollect => match room.force_collect() {
                Err(rejection) => Applied::reply(vec![OutboundMessage::text(rejection.to_string())]),
                Ok(outcome) => {
                    self.metrics.record_round_settled();
                    let mut entries = outcome.charged;
                    entries.extend(outcome.settlement.entries);
                    if entries.is_empty() && outcome.settlement.pushes.is_empty() {
                        Applied::reply(vec![OutboundMessage::text(
                            "Round reset. Nothing to collect.",
                        )])
                    } else {
                        Applied::reply(vec![outbound::settlement_message(
                            &entries,
                            &outcome.settlement.pushes,
                        )])
                    }
                }
            },

            Command::CloseSession => match room.close(who, admin, rules) {
                Err(rejection) => Applied::reply(vec![OutboundMessage::text(rejection.to_string())]),
                Ok(CloseOutcome::Penalized { entry }) => {
                    self.metrics.record_penalty();
                    Applied::reply(vec![MentionBuilder::new()
                        .say("Only the banker closes the session. ")
                        .mention(&who.name, &who.id)
                        .say(&format!(" is charged {}.", entry.amount))
                        .build()])
                }
                Ok(CloseOutcome::NothingToSettle { .. }) => Applied::reply(vec![
                    OutboundMessage::text("Session closed. Nothing to settle."),
                ]),
                Ok(CloseOutcome::Settled {
                    session_id,
                    banker,
                    rounds,
                    nets,
                }) => {
                    let note = format!("session {} net over {} round(s)", session_id, rounds);
                    let ledger_rows = nets
                        .iter()
                        .map(|net| ledger_row(net, &banker, &note))
                        .collect();

                    let mut builder =
                        MentionBuilder::new().say("Session closed. Net balances vs ");
                    builder = builder.mention(&banker.name, &banker.id).say(":");
                    for net in &nets {
                        builder = builder
                            .line()
                            .mention(&net.name, &net.player_id)
                            .say(&format!(" {}{}", if net.net > 0 { "+" } else { "" }, net.net));
                    }
                    if nets.is_empty() {
                        builder = builder.line().say("all square, nothing owed");
                    }

                    Applied {
                        messages: vec![builder.build()],
                        arm_epoch: None,
                        ledger_rows,
                    }
                }
            },
        }
    }
}

/// Positive net: the banker owes the player; negative: the player owes
/// the banker.
fn ledger_row(net: &NetBalance, banker: &Participant, note: &str) -> LedgerRow {
    if net.net > 0 {
        LedgerRow {
            debtor: banker.id.clone(),
            creditor: net.player_id.clone(),
            amount: net.net as u64,
            note: note.to_string(),
        }
    } else {
        LedgerRow {
            debtor: net.player_id.clone(),
            creditor: banker.id.clone(),
            amount: (-net.net) as u64,
            note: note.to_string(),
        }
    }
}

/// Fallback label when the resolver knows nothing about the player
fn generic_name(player_id: &str) -> String {
    let prefix: String = player_id.chars().take(6).collect();
    format!("player-{}", prefix)
}
