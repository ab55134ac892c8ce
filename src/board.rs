use serde::{Deserialize, Serialize};

use crate::card::{Card, is_complete_deck};
use crate::location::Location;

/// Number of foundation piles (one per suit).
pub const NUM_FOUNDATIONS: usize = 4;

/// An immutable snapshot of one deal in progress – the single source of truth
/// for the board. Transforms in [`crate::engine`] return new snapshots and
/// never touch their input.
///
/// Piles are ordered bottom to top: `last()` is the exposed card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameState {
    /// Tableau columns; index 0 is leftmost.
    pub tableau: Vec<Vec<Card>>,
    /// Trailing face-up cards per tableau column.
    pub face_up: Vec<usize>,
    pub foundations: Vec<Vec<Card>>,
    /// Empty in variants without free cells.
    pub free_cells: Vec<Option<Card>>,
    /// Face-down; top of stock is `last()`.
    pub stock: Vec<Card>,
    /// Face-up; top of waste is `last()`.
    pub waste: Vec<Card>,
    /// Committed moves since the deal.
    pub moves: u32,
    /// Waste→stock recycles since the deal.
    pub recycles: u32,
    /// Seed the deal was shuffled from.
    pub seed: u64,
}

impl GameState {
    /// An empty board with the given pile counts.
    pub fn empty(tableau_columns: usize, free_cells: usize, seed: u64) -> Self {
        GameState {
            tableau: vec![Vec::new(); tableau_columns],
            face_up: vec![0; tableau_columns],
            foundations: vec![Vec::new(); NUM_FOUNDATIONS],
            free_cells: vec![None; free_cells],
            stock: Vec::new(),
            waste: Vec::new(),
            moves: 0,
            recycles: 0,
            seed,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn foundation_top(&self, idx: usize) -> Option<Card> {
        self.foundations.get(idx).and_then(|f| f.last()).copied()
    }

    pub fn waste_top(&self) -> Option<Card> {
        self.waste.last().copied()
    }

    /// The top `count` cards of the pile at `loc`, bottom first. `None` when
    /// the pile doesn't exist or holds fewer cards.
    pub fn top_cards(&self, loc: Location, count: usize) -> Option<&[Card]> {
        let pile: &[Card] = match loc {
            Location::Tableau { index, .. } => self.tableau.get(index)?,
            Location::Foundation { index, .. } => self.foundations.get(index)?,
            Location::FreeCell { index } => {
                return match self.free_cells.get(index)? {
                    Some(card) if count == 1 => Some(std::slice::from_ref(card)),
                    _ => None,
                };
            }
            Location::Waste { index: 0 } => &self.waste,
            Location::Stock { index: 0 } => &self.stock,
            Location::Waste { .. } | Location::Stock { .. } => return None,
        };
        if count == 0 || count > pile.len() {
            return None;
        }
        Some(&pile[pile.len() - count..])
    }

    /// Face-down cards left in a column.
    pub fn face_down(&self, col: usize) -> usize {
        match (self.tableau.get(col), self.face_up.get(col)) {
            (Some(cards), Some(&up)) => cards.len().saturating_sub(up),
            _ => 0,
        }
    }

    pub fn empty_columns(&self) -> usize {
        self.tableau.iter().filter(|c| c.is_empty()).count()
    }

    pub fn empty_free_cells(&self) -> usize {
        self.free_cells.iter().filter(|c| c.is_none()).count()
    }

    /// Every card on the board, in no particular order.
    pub fn all_cards(&self) -> impl Iterator<Item = &Card> {
        self.tableau
            .iter()
            .flatten()
            .chain(self.foundations.iter().flatten())
            .chain(self.free_cells.iter().flatten())
            .chain(self.stock.iter())
            .chain(self.waste.iter())
    }

    /// Cards are conserved (one full deck) and face-up counts fit their
    /// columns.
    pub fn is_consistent(&self) -> bool {
        self.face_up.len() == self.tableau.len()
            && self.foundations.len() == NUM_FOUNDATIONS
            && self
                .tableau
                .iter()
                .zip(&self.face_up)
                .all(|(col, &up)| up <= col.len() && (col.is_empty() || up >= 1))
            && is_complete_deck(self.all_cards())
    }
}
