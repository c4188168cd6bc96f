use serde::{Deserialize, Serialize};
use std::fmt;

/// Selectable table games
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    /// Two-tile comparison game played with a 40-tile set
    Push,
    /// Five-card comparison game played with a 52-card deck
    Bull,
}

impl GameKind {
    /// Cards dealt per hand for this game
    pub fn hand_size(&self) -> usize {
        match self {
            GameKind::Push => 2,
            GameKind::Bull => 5,
        }
    }

    /// Size of a full fresh deck for this game
    pub fn deck_size(&self) -> usize {
        match self {
            GameKind::Push => 40,
            GameKind::Bull => 52,
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameKind::Push => write!(f, "push"),
            GameKind::Bull => write!(f, "bull"),
        }
    }
}

/// Tile face for the push game
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TileRank {
    Blank,
    /// 1..=9
    Pip(u8),
}

/// French suit for the bull game
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ch = match self {
            Suit::Spades => '♠',
            Suit::Hearts => '♥',
            Suit::Diamonds => '♦',
            Suit::Clubs => '♣',
        };
        write!(f, "{}", ch)
    }
}

/// A playable card. Immutable once dealt; a deck never mixes the two kinds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "card", rename_all = "lowercase")]
pub enum Card {
    Tile { rank: TileRank },
    /// rank is 1 (ace) through 13 (king)
    Poker { rank: u8, suit: Suit },
}

impl Card {
    pub const fn tile(rank: TileRank) -> Self {
        Card::Tile { rank }
    }

    pub const fn poker(rank: u8, suit: Suit) -> Self {
        Card::Poker { rank, suit }
    }

    /// Counting value used by the scoring rules: blanks count zero,
    /// ten and all face cards count ten, aces count one.
    pub fn count_value(&self) -> u32 {
        match self {
            Card::Tile { rank: TileRank::Blank } => 0,
            Card::Tile { rank: TileRank::Pip(n) } => *n as u32,
            Card::Poker { rank, .. } => (*rank as u32).min(10),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Tile { rank: TileRank::Blank } => write!(f, "blank"),
            Card::Tile { rank: TileRank::Pip(n) } => write!(f, "{}", n),
            Card::Poker { rank, suit } => {
                let r = match rank {
                    1 => "A".to_string(),
                    11 => "J".to_string(),
                    12 => "Q".to_string(),
                    13 => "K".to_string(),
                    n => n.to_string(),
                };
                write!(f, "{}{}", r, suit)
            }
        }
    }
}
