use serde::{Deserialize, Serialize};

use crate::board::GameState;
use crate::card::{Card, shuffled_deck};
use crate::settings::Settings;

/// Games this core knows how to deal and play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameKind {
    Klondike,
    FreeCell,
}

impl GameKind {
    pub const ALL: [GameKind; 2] = [GameKind::Klondike, GameKind::FreeCell];

    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_ascii_lowercase().as_str() {
            "klondike" | "k" => Some(Self::Klondike),
            "freecell" | "fc" => Some(Self::FreeCell),
            _ => None,
        }
    }

    /// Stable identifier, also used as the save-slot key.
    pub fn id(self) -> &'static str {
        match self {
            Self::Klondike => "klondike",
            Self::FreeCell => "freecell",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Klondike => "Klondike",
            Self::FreeCell => "FreeCell",
        }
    }
}

/// How a card may be placed on another in the tableau. All rules build
/// downwards by one rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StackRule {
    AlternatingColor,
    SameSuit,
    AnySuit,
}

impl StackRule {
    /// Can `card` be placed directly on `onto`?
    pub fn allows(self, card: Card, onto: Card) -> bool {
        if card.rank + 1 != onto.rank {
            return false;
        }
        match self {
            StackRule::AlternatingColor => card.color() != onto.color(),
            StackRule::SameSuit => card.suit == onto.suit,
            StackRule::AnySuit => true,
        }
    }

    /// Whether `cards` (bottom first) form a movable run.
    pub fn is_run(self, cards: &[Card]) -> bool {
        cards.windows(2).all(|pair| self.allows(pair[1], pair[0]))
    }
}

/// What may start an empty tableau column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmptyColumnRule {
    KingOnly,
    AnyCard,
}

/// Limit on how many cards may move between columns at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunLimit {
    Unlimited,
    /// `(empty free cells + 1) * 2^(empty columns other than the destination)`.
    FreeCellCapacity,
}

/// How the deck is laid out at the start of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DealLayout {
    /// Column `i` gets `i + 1` cards with only the top face up; the rest go
    /// to the stock.
    Staircase,
    /// Round-robin across every column, all face up; no stock.
    RoundRobin,
}

/// The config object selecting a variant. The validator and executor in
/// [`crate::engine`] are written once against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rules {
    pub kind: GameKind,
    pub tableau_columns: usize,
    pub free_cells: usize,
    pub stacking: StackRule,
    pub empty_column: EmptyColumnRule,
    pub run_limit: RunLimit,
    pub deal: DealLayout,
    /// Cards turned per draw from the stock.
    pub draw_count: u8,
    /// Waste→stock recycles allowed per deal; `None` for no limit.
    pub recycle_limit: Option<u32>,
    /// Whether a foundation's top card may come back down to the tableau.
    pub foundation_to_tableau: bool,
}

impl Rules {
    pub fn klondike(draw_count: u8) -> Self {
        Rules {
            kind: GameKind::Klondike,
            tableau_columns: 7,
            free_cells: 0,
            stacking: StackRule::AlternatingColor,
            empty_column: EmptyColumnRule::KingOnly,
            run_limit: RunLimit::Unlimited,
            deal: DealLayout::Staircase,
            draw_count: draw_count.max(1),
            recycle_limit: None,
            foundation_to_tableau: true,
        }
    }

    pub fn freecell() -> Self {
        Rules {
            kind: GameKind::FreeCell,
            tableau_columns: 8,
            free_cells: 4,
            stacking: StackRule::AlternatingColor,
            empty_column: EmptyColumnRule::AnyCard,
            run_limit: RunLimit::FreeCellCapacity,
            deal: DealLayout::RoundRobin,
            draw_count: 1,
            recycle_limit: None,
            foundation_to_tableau: false,
        }
    }

    pub fn with_recycle_limit(mut self, limit: Option<u32>) -> Self {
        self.recycle_limit = limit;
        self
    }

    /// Rules for `kind` with the user's settings applied.
    pub fn for_kind(kind: GameKind, settings: &Settings) -> Self {
        match kind {
            GameKind::Klondike => {
                Rules::klondike(settings.klondike_draw).with_recycle_limit(settings.recycle_limit)
            }
            GameKind::FreeCell => Rules::freecell(),
        }
    }

    /// Deal a fresh game. The same seed always produces the same board.
    pub fn deal(&self, seed: u64) -> GameState {
        let deck = shuffled_deck(seed);
        let mut state = GameState::empty(self.tableau_columns, self.free_cells, seed);

        match self.deal {
            DealLayout::Staircase => {
                let mut cards = deck.into_iter();
                for col in 0..self.tableau_columns {
                    state.tableau[col].extend(cards.by_ref().take(col + 1));
                    state.face_up[col] = usize::from(!state.tableau[col].is_empty());
                }
                state.stock.extend(cards);
            }
            DealLayout::RoundRobin => {
                for (i, card) in deck.into_iter().enumerate() {
                    state.tableau[i % self.tableau_columns].push(card);
                }
                for (col, cards) in state.tableau.iter().enumerate() {
                    state.face_up[col] = cards.len();
                }
            }
        }

        state
    }
}
