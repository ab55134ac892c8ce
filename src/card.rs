use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Number of cards in a standard deck.
pub const DECK_SIZE: usize = 52;
/// Ranks per suit (Ace through King).
pub const RANKS: u8 = 13;
pub const ACE: u8 = 1;
pub const KING: u8 = 13;

/// The four French suits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Suit {
    Spades,
    Hearts,
    Diamonds,
    Clubs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Red,
    Black,
}

impl Suit {
    /// All four suits, in canonical order (♠♥♦♣).
    pub const ALL: [Suit; 4] = [Suit::Spades, Suit::Hearts, Suit::Diamonds, Suit::Clubs];

    pub fn color(self) -> Color {
        match self {
            Suit::Hearts | Suit::Diamonds => Color::Red,
            Suit::Spades | Suit::Clubs => Color::Black,
        }
    }

    /// Single-character symbol used in CLI rendering.
    pub fn symbol(self) -> &'static str {
        match self {
            Suit::Spades => "♠",
            Suit::Hearts => "♥",
            Suit::Diamonds => "♦",
            Suit::Clubs => "♣",
        }
    }
}

/// An immutable playing card. Identity is rank + suit; there are no duplicates
/// in a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Card {
    /// 1 (Ace) ..= 13 (King).
    pub rank: u8,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: u8, suit: Suit) -> Self {
        Card { rank, suit }
    }

    pub fn color(self) -> Color {
        self.suit.color()
    }

    pub fn is_ace(self) -> bool {
        self.rank == ACE
    }

    pub fn is_king(self) -> bool {
        self.rank == KING
    }

    pub fn label(self) -> String {
        format!("{}{}", rank_label(self.rank), self.suit.symbol())
    }
}

pub fn rank_label(rank: u8) -> &'static str {
    match rank {
        1 => "A",
        2 => "2",
        3 => "3",
        4 => "4",
        5 => "5",
        6 => "6",
        7 => "7",
        8 => "8",
        9 => "9",
        10 => "10",
        11 => "J",
        12 => "Q",
        13 => "K",
        _ => "?",
    }
}

/// The 52-card deck in suit-major, rank-ascending order.
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);

    for &suit in &Suit::ALL {
        for rank in ACE..=KING {
            deck.push(Card::new(rank, suit));
        }
    }

    debug_assert_eq!(deck.len(), DECK_SIZE, "Deck must have exactly 52 cards");
    deck
}

/// Shuffle a fresh deck with a seeded RNG. The same seed always yields the
/// same order.
pub fn shuffled_deck(seed: u64) -> Vec<Card> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut deck = full_deck();
    deck.shuffle(&mut rng);
    deck
}

/// True when `cards` is exactly one standard deck: 52 cards, no duplicates.
pub fn is_complete_deck<'a>(cards: impl IntoIterator<Item = &'a Card>) -> bool {
    let mut seen = [false; DECK_SIZE];
    let mut count = 0;
    for card in cards {
        if !(ACE..=KING).contains(&card.rank) {
            return false;
        }
        let slot = suit_offset(card.suit) + (card.rank - 1) as usize;
        if seen[slot] {
            return false;
        }
        seen[slot] = true;
        count += 1;
    }
    count == DECK_SIZE
}

fn suit_offset(suit: Suit) -> usize {
    let idx = match suit {
        Suit::Spades => 0,
        Suit::Hearts => 1,
        Suit::Diamonds => 2,
        Suit::Clubs => 3,
    };
    idx * RANKS as usize
}
