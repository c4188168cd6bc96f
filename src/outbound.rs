//! Outbound message types handed back to the message transport.
//!
//! A mention message carries byte-offset spans into its text, one per
//! addressed participant, so the transport can render real mentions.

use serde::{Deserialize, Serialize};

use crate::session::{LedgerEntry, Participant, SettleReason};

/// Byte-offset span over a mention target inside a message text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MentionSpan {
    pub start: usize,
    pub len: usize,
    pub player_id: String,
}

/// A message for the room, plain or mention-carrying
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Text { text: String },
    Mention { text: String, spans: Vec<MentionSpan> },
}

impl OutboundMessage {
    pub fn text(text: impl Into<String>) -> Self {
        OutboundMessage::Text { text: text.into() }
    }
}

/// Incremental builder for mention messages; tracks byte offsets as
/// text is appended
#[derive(Debug, Default)]
pub struct MentionBuilder {
    text: String,
    spans: Vec<MentionSpan>,
}

impl MentionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(mut self, s: &str) -> Self {
        self.text.push_str(s);
        self
    }

    pub fn mention(mut self, name: &str, player_id: &str) -> Self {
        self.spans.push(MentionSpan {
            start: self.text.len(),
            len: name.len(),
            player_id: player_id.to_string(),
        });
        self.text.push_str(name);
        self
    }

    pub fn line(mut self) -> Self {
        self.text.push('\n');
        self
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Collapse to a plain text message when nothing was mentioned
    pub fn build(self) -> OutboundMessage {
        if self.spans.is_empty() {
            OutboundMessage::Text { text: self.text }
        } else {
            OutboundMessage::Mention {
                text: self.text,
                spans: self.spans,
            }
        }
    }
}

/// Render a settlement announcement: one line per moved amount, one
/// per push, every participant mentioned
pub fn settlement_message(entries: &[LedgerEntry], pushes: &[Participant]) -> OutboundMessage {
    let mut builder = MentionBuilder::new().say("Round settled.");
    for entry in entries {
        builder = builder
            .line()
            .mention(&entry.winner_name, &entry.winner_id)
            .say(&format!(" takes {} from ", entry.amount))
            .mention(&entry.loser_name, &entry.loser_id);
        if entry.reason != SettleReason::WonRound {
            builder = builder.say(&format!(" ({})", entry.reason));
        }
    }
    for player in pushes {
        builder = builder
            .line()
            .mention(&player.name, &player.id)
            .say(" pushes, stake stays put");
    }
    builder.build()
}
