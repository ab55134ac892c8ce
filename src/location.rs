use serde::{Deserialize, Serialize};

/// The kind of pile a [`Location`] points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PileKind {
    Tableau,
    Foundation,
    FreeCell,
    Waste,
    Stock,
}

/// Addresses a pile on the board.
///
/// `card_count` on tableau/foundation sources is the number of topmost cards
/// taken as one unit. On destinations it is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Tableau { index: usize, card_count: usize },
    Foundation { index: usize, card_count: usize },
    FreeCell { index: usize },
    Waste { index: usize },
    Stock { index: usize },
}

impl Location {
    pub const WASTE: Location = Location::Waste { index: 0 };
    pub const STOCK: Location = Location::Stock { index: 0 };

    /// The top card of a tableau column.
    pub const fn tableau(index: usize) -> Self {
        Location::Tableau { index, card_count: 1 }
    }

    /// The top `card_count` cards of a tableau column.
    pub const fn run(index: usize, card_count: usize) -> Self {
        Location::Tableau { index, card_count }
    }

    pub const fn foundation(index: usize) -> Self {
        Location::Foundation { index, card_count: 1 }
    }

    pub const fn free_cell(index: usize) -> Self {
        Location::FreeCell { index }
    }

    pub fn kind(self) -> PileKind {
        match self {
            Location::Tableau { .. } => PileKind::Tableau,
            Location::Foundation { .. } => PileKind::Foundation,
            Location::FreeCell { .. } => PileKind::FreeCell,
            Location::Waste { .. } => PileKind::Waste,
            Location::Stock { .. } => PileKind::Stock,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Location::Tableau { index, .. }
            | Location::Foundation { index, .. }
            | Location::FreeCell { index }
            | Location::Waste { index }
            | Location::Stock { index } => index,
        }
    }

    /// Number of cards moved when this location is a source.
    pub fn card_count(self) -> usize {
        match self {
            Location::Tableau { card_count, .. } | Location::Foundation { card_count, .. } => {
                card_count
            }
            _ => 1,
        }
    }

    /// Same pile, whatever the card count.
    pub fn same_pile(self, other: Location) -> bool {
        self.kind() == other.kind() && self.index() == other.index()
    }

    /// Short label used by the CLI (`t3:2`, `f0`, `c1`, `w`, `s`).
    pub fn label(self) -> String {
        match self {
            Location::Tableau { index, card_count } if card_count > 1 => {
                format!("t{}:{}", index, card_count)
            }
            Location::Tableau { index, .. } => format!("t{}", index),
            Location::Foundation { index, .. } => format!("f{}", index),
            Location::FreeCell { index } => format!("c{}", index),
            Location::Waste { .. } => "w".to_string(),
            Location::Stock { .. } => "s".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_pile_ignores_card_count() {
        assert!(Location::run(2, 3).same_pile(Location::tableau(2)));
        assert!(!Location::tableau(2).same_pile(Location::tableau(3)));
        assert!(!Location::tableau(0).same_pile(Location::foundation(0)));
    }

    #[test]
    fn card_count_defaults_to_one_for_single_card_piles() {
        assert_eq!(Location::run(4, 3).card_count(), 3);
        assert_eq!(Location::free_cell(1).card_count(), 1);
        assert_eq!(Location::WASTE.card_count(), 1);
    }

    #[test]
    fn labels() {
        assert_eq!(Location::run(3, 2).label(), "t3:2");
        assert_eq!(Location::tableau(3).label(), "t3");
        assert_eq!(Location::foundation(1).label(), "f1");
        assert_eq!(Location::free_cell(0).label(), "c0");
        assert_eq!(Location::WASTE.label(), "w");
    }
}
