//! Collaborator interfaces consumed by the engine.
//!
//! The surrounding bot supplies real implementations (chat-platform
//! profile lookup, debt ledger, push delivery). Everything here is
//! best-effort from the engine's point of view: a failing collaborator
//! degrades the reply, never the state transition.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::errors::SinkError;
use crate::outbound::OutboundMessage;

/// Display-name lookup. `None` means unknown; the engine falls back
/// to a generic label.
#[async_trait]
pub trait NameResolver: Send + Sync {
    async fn resolve(&self, room_id: &str, player_id: &str) -> Option<String>;
}

/// Append-only debt ledger receiving net balances at session close.
/// Fire-and-forget: the engine logs and swallows errors.
#[async_trait]
pub trait LedgerSink: Send + Sync {
    async fn record(
        &self,
        debtor: &str,
        creditor: &str,
        amount: u64,
        note: &str,
    ) -> Result<(), SinkError>;
}

/// Push delivery for messages that do not answer an inbound command
/// (watchdog warnings and timeout settlements).
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn push(&self, room_id: &str, messages: Vec<OutboundMessage>) -> Result<(), SinkError>;
}

/// Resolver that knows nobody; every player gets the generic label
pub struct GenericNames;

#[async_trait]
impl NameResolver for GenericNames {
    async fn resolve(&self, _room_id: &str, _player_id: &str) -> Option<String> {
        None
    }
}

/// Fixed id-to-name table, for tests and the REPL driver
pub struct StaticNames {
    names: HashMap<String, String>,
}

impl StaticNames {
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            names: pairs.into_iter().collect(),
        }
    }
}

#[async_trait]
impl NameResolver for StaticNames {
    async fn resolve(&self, _room_id: &str, player_id: &str) -> Option<String> {
        self.names.get(player_id).cloned()
    }
}

/// Ledger that only logs what it is asked to record
pub struct DiscardLedger;

#[async_trait]
impl LedgerSink for DiscardLedger {
    async fn record(
        &self,
        debtor: &str,
        creditor: &str,
        amount: u64,
        note: &str,
    ) -> Result<(), SinkError> {
        tracing::info!(debtor, creditor, amount, note, "ledger row discarded");
        Ok(())
    }
}

/// Notifier that forwards pushes over an unbounded channel
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<(String, Vec<OutboundMessage>)>,
}

impl ChannelNotifier {
    pub fn new() -> (
        Self,
        mpsc::UnboundedReceiver<(String, Vec<OutboundMessage>)>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn push(&self, room_id: &str, messages: Vec<OutboundMessage>) -> Result<(), SinkError> {
        self.tx
            .send((room_id.to_string(), messages))
            .map_err(|e| SinkError(e.to_string()))
    }
}

/// Notifier that drops everything
pub struct SilentNotifier;

#[async_trait]
impl Notifier for SilentNotifier {
    async fn push(&self, _room_id: &str, _messages: Vec<OutboundMessage>) -> Result<(), SinkError> {
        Ok(())
    }
}
