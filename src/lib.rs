//! Parlor - room-scoped wagering game engine for chat bots.
//!
//! Each conversation gets its own table: one participant claims the
//! bank, others place bets, hands are dealt for one of two card games,
//! and every settled amount lands in a session log that is reduced to
//! net balances at close. A per-round watchdog chases stalled bettors.
//! All state is process memory; the message transport, name lookup,
//! and debt ledger are collaborators behind traits.

pub mod cards;
pub mod commands;
pub mod config;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod metrics;
pub mod outbound;
pub mod registry;
pub mod room;
pub mod scoring;
pub mod session;
pub mod settlement;
pub mod traits;

mod timer;

pub use cards::{Card, GameKind};
pub use config::ParlorConfig;
pub use engine::{CallerCtx, Engine};
pub use errors::{EngineError, Rejection};
pub use outbound::{MentionSpan, OutboundMessage};
pub use session::{LedgerEntry, Participant, SettleReason};
pub use traits::{LedgerSink, NameResolver, Notifier};
