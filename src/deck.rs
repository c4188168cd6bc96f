//! Shuffled card supply for one table game at a time.
//!
//! A deck belongs to exactly one room and holds cards of a single game
//! kind. Draw shortfalls are healed by the caller via [`Deck::ensure`],
//! which swaps in a fresh full shuffled set.

use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::cards::{Card, GameKind, Suit, TileRank};

pub struct Deck {
    kind: GameKind,
    cards: Vec<Card>,
}

impl Deck {
    /// Build and shuffle the full set for `kind`: 40 tiles for push
    /// (nine pip ranks x4 plus four blanks), 52 cards for bull.
    pub fn new(kind: GameKind) -> Self {
        let mut cards = Self::full_set(kind);
        cards.shuffle(&mut thread_rng());
        Self { kind, cards }
    }

    fn full_set(kind: GameKind) -> Vec<Card> {
        match kind {
            GameKind::Push => {
                let mut cards = Vec::with_capacity(40);
                for pip in 1..=9u8 {
                    for _ in 0..4 {
                        cards.push(Card::tile(TileRank::Pip(pip)));
                    }
                }
                for _ in 0..4 {
                    cards.push(Card::tile(TileRank::Blank));
                }
                cards
            }
            GameKind::Bull => {
                let mut cards = Vec::with_capacity(52);
                for suit in [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs] {
                    for rank in 1..=13u8 {
                        cards.push(Card::poker(rank, suit));
                    }
                }
                cards
            }
        }
    }

    pub fn kind(&self) -> GameKind {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Replenish with a fresh full shuffled set if fewer than `n` cards
    /// remain. The remainder is discarded, never mixed into the new set.
    pub fn ensure(&mut self, n: usize) {
        if self.cards.len() < n {
            tracing::debug!(kind = %self.kind, remaining = self.cards.len(), needed = n, "deck replenished");
            *self = Deck::new(self.kind);
        }
    }

    /// Remove and return `n` cards from the top. Callers check `len()`
    /// (or call [`Deck::ensure`]) first.
    pub fn draw(&mut self, n: usize) -> Vec<Card> {
        let split = self.cards.len().saturating_sub(n);
        self.cards.split_off(split)
    }
}
