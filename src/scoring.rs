//! Pure hand scoring for the two table games.
//!
//! Each scorer maps a dealt hand to a comparable strength, a display
//! label, and the payout multiplier that applies when this hand is on
//! the winning side. The multiplier travels with the scored hand from
//! here on; it is never re-derived from the label.

use serde::{Deserialize, Serialize};

use crate::cards::{Card, GameKind, TileRank};

/// Scored value of a dealt hand
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandScore {
    /// Comparable strength; higher wins, equal is a push
    pub strength: u32,
    /// Human-readable outcome ("pair of 5s", "bull-bull", ...)
    pub label: String,
    /// Payout multiplier applied when this hand wins
    pub multiplier: u64,
}

/// Score `cards` under the rules of `kind`
pub fn score(kind: GameKind, cards: &[Card]) -> HandScore {
    match kind {
        GameKind::Push => score_push(cards),
        GameKind::Bull => score_bull(cards),
    }
}

/// Two-tile scoring. A pair outranks every non-pair: a blank pair is
/// 1000, a pip pair is 100 + pip. Non-pairs score the tile sum mod 10,
/// where 0 is a bust (the floor). Multiplier is always 1.
pub fn score_push(cards: &[Card]) -> HandScore {
    debug_assert_eq!(cards.len(), 2);
    let (a, b) = (cards[0], cards[1]);

    if let (Card::Tile { rank: ra }, Card::Tile { rank: rb }) = (a, b) {
        if ra == rb {
            return match ra {
                TileRank::Blank => HandScore {
                    strength: 1000,
                    label: "blank pair".to_string(),
                    multiplier: 1,
                },
                TileRank::Pip(p) => HandScore {
                    strength: 100 + p as u32,
                    label: format!("pair of {}s", p),
                    multiplier: 1,
                },
            };
        }
    }

    let points = (a.count_value() + b.count_value()) % 10;
    let label = if points == 0 {
        "bust".to_string()
    } else {
        format!("{} points", points)
    };
    HandScore {
        strength: points,
        label,
        multiplier: 1,
    }
}

/// Five-card bull scoring. A hand qualifies when some three cards sum
/// to a multiple of 10; the bull point is then the remaining two cards'
/// sum mod 10, with 0 promoted to 10 ("bull-bull"). The best qualifying
/// split counts. Strength is point * 10 so bull-bull is the unique
/// maximum at 100.
pub fn score_bull(cards: &[Card]) -> HandScore {
    debug_assert_eq!(cards.len(), 5);
    let values: Vec<u32> = cards.iter().map(|c| c.count_value()).collect();
    let total: u32 = values.iter().sum();

    let mut best: Option<u32> = None;
    for i in 0..5 {
        for j in (i + 1)..5 {
            let pair = values[i] + values[j];
            if (total - pair) % 10 != 0 {
                continue;
            }
            let point = match pair % 10 {
                0 => 10,
                p => p,
            };
            best = Some(best.map_or(point, |b| b.max(point)));
        }
    }

    match best {
        None => HandScore {
            strength: 0,
            label: "no bull".to_string(),
            multiplier: 1,
        },
        Some(point) => HandScore {
            strength: point * 10,
            label: if point == 10 {
                "bull-bull".to_string()
            } else {
                format!("bull {}", point)
            },
            multiplier: match point {
                10 => 3,
                8 | 9 => 2,
                _ => 1,
            },
        },
    }
}
