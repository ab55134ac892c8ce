//! Move validation and execution, written once against [`Rules`].
//!
//! Every function here is pure: it reads a [`GameState`] and, on success,
//! returns a new one. Illegal moves are `false` / `None`, never errors.

use tracing::{debug, error};

use crate::board::{GameState, NUM_FOUNDATIONS};
use crate::card::{Card, RANKS, Suit};
use crate::location::Location;
use crate::rules::{EmptyColumnRule, Rules, RunLimit, StackRule};

/// The validator/executor capability pair a variant provides.
pub trait MoveRules {
    /// Is moving `from` → `to` legal in `state`? Safe to call speculatively.
    fn validate_move(&self, state: &GameState, from: Location, to: Location) -> bool;

    /// Re-validates and applies the move, returning the new state. `None`
    /// leaves the caller's state as it was.
    fn execute_move(&self, state: &GameState, from: Location, to: Location) -> Option<GameState>;
}

impl MoveRules for Rules {
    fn validate_move(&self, state: &GameState, from: Location, to: Location) -> bool {
        if from.same_pile(to) {
            return false;
        }
        let Some(cards) = self.movable_cards(state, from) else {
            return false;
        };

        match to {
            Location::Tableau { index, .. } => {
                if matches!(from, Location::Foundation { .. }) && !self.foundation_to_tableau {
                    return false;
                }
                self.can_place_on_tableau(state, cards, index)
            }
            Location::Foundation { index, .. } => {
                !matches!(from, Location::Foundation { .. })
                    && cards.len() == 1
                    && can_place_on_foundation(state, cards[0], index)
            }
            Location::FreeCell { index } => {
                cards.len() == 1
                    && !matches!(from, Location::Foundation { .. })
                    && matches!(state.free_cells.get(index), Some(None))
            }
            Location::Waste { .. } | Location::Stock { .. } => false,
        }
    }

    fn execute_move(&self, state: &GameState, from: Location, to: Location) -> Option<GameState> {
        if !self.validate_move(state, from, to) {
            debug!(from = %from.label(), to = %to.label(), "move rejected");
            return None;
        }

        let mut next = state.clone();
        let moved = take_cards(&mut next, from)?;
        place_cards(&mut next, to, moved);
        next.moves += 1;

        debug!(from = %from.label(), to = %to.label(), moves = next.moves, "move executed");
        checked(next)
    }
}

impl Rules {
    // -------------------------------------------------------------------------
    // Stock
    // -------------------------------------------------------------------------

    /// Turn `draw_count` cards from stock to waste, or recycle the waste when
    /// the stock is empty. Either counts as one move.
    pub fn draw_from_stock(&self, state: &GameState) -> Option<GameState> {
        if !state.stock.is_empty() {
            let mut next = state.clone();
            let n = usize::from(self.draw_count).min(next.stock.len());
            for _ in 0..n {
                let card = next.stock.pop()?;
                next.waste.push(card);
            }
            next.moves += 1;
            debug!(drawn = n, stock = next.stock.len(), "drew from stock");
            return checked(next);
        }

        if !self.can_recycle(state) {
            return None;
        }

        let mut next = state.clone();
        next.stock = std::mem::take(&mut next.waste).into_iter().rev().collect();
        next.recycles += 1;
        next.moves += 1;
        debug!(recycles = next.recycles, "recycled waste into stock");
        checked(next)
    }

    /// Whether an empty stock may be refilled from the waste.
    pub fn can_recycle(&self, state: &GameState) -> bool {
        state.stock.is_empty()
            && !state.waste.is_empty()
            && self.recycle_limit.is_none_or(|limit| state.recycles < limit)
    }

    pub fn can_draw(&self, state: &GameState) -> bool {
        !state.stock.is_empty() || self.can_recycle(state)
    }

    // -------------------------------------------------------------------------
    // Auto-Move
    // -------------------------------------------------------------------------

    /// Move every card that is safe to play to its foundation, in one batch.
    /// Each card counts as one move; `None` if nothing could go up.
    ///
    /// A card is safe when no card still in play could need it as a target:
    /// aces and twos always, otherwise when the opposite-colour foundations
    /// have reached `rank - 1`. Once the board is trivially solvable every
    /// playable card is safe, which makes this the one-click auto-complete.
    pub fn auto_move_to_foundations(&self, state: &GameState) -> Option<GameState> {
        let mut next = state.clone();
        let mut moved = 0;
        let finish = self.is_trivially_solvable(state);

        loop {
            let before = moved;

            for src in auto_sources(&next) {
                let Some(card) = next.top_cards(src, 1).map(|c| c[0]) else {
                    continue;
                };
                if !finish && !self.is_safe_for_foundation(&next, card) {
                    continue;
                }
                let Some(dst) = foundation_for(&next, card) else {
                    continue;
                };
                if let Some(after) = self.execute_move(&next, src, dst) {
                    next = after;
                    moved += 1;
                }
            }

            if moved == before {
                break; // No progress – stop.
            }
        }

        if moved == 0 {
            return None;
        }
        debug!(moved, "auto-moved cards to foundations");
        Some(next)
    }

    fn is_safe_for_foundation(&self, state: &GameState, card: Card) -> bool {
        if card.rank <= 2 {
            return true;
        }
        let needed = card.rank - 1;
        Suit::ALL
            .iter()
            .filter(|&&suit| match self.stacking {
                StackRule::AlternatingColor => suit.color() != card.color(),
                StackRule::SameSuit | StackRule::AnySuit => suit != card.suit,
            })
            .all(|&suit| foundation_rank(state, suit) >= needed)
    }

    /// No hidden information left and every column already in order, so
    /// playing cards up greedily always finishes the deal.
    pub fn is_trivially_solvable(&self, state: &GameState) -> bool {
        state.stock.is_empty()
            && state.waste.is_empty()
            && (0..state.tableau.len()).all(|col| state.face_down(col) == 0)
            && state.tableau.iter().all(|col| self.stacking.is_run(col))
    }

    // -------------------------------------------------------------------------
    // Enumeration
    // -------------------------------------------------------------------------

    /// Every legal destination for `from`, foundations first. Equivalent
    /// empty targets are collapsed: only the first empty foundation, column
    /// and free cell are listed.
    pub fn legal_destinations(&self, state: &GameState, from: Location) -> Vec<Location> {
        let mut out = Vec::new();

        let mut seen_empty = false;
        for idx in 0..state.foundations.len() {
            let to = Location::foundation(idx);
            if !self.validate_move(state, from, to) {
                continue;
            }
            if state.foundations[idx].is_empty() {
                if seen_empty {
                    continue;
                }
                seen_empty = true;
            }
            out.push(to);
        }

        let mut seen_empty = false;
        for col in 0..state.tableau.len() {
            let to = Location::tableau(col);
            if !self.validate_move(state, from, to) {
                continue;
            }
            if state.tableau[col].is_empty() {
                if seen_empty {
                    continue;
                }
                seen_empty = true;
            }
            out.push(to);
        }

        if let Some(cell) = state.free_cells.iter().position(Option::is_none) {
            let to = Location::free_cell(cell);
            if self.validate_move(state, from, to) {
                out.push(to);
            }
        }

        out
    }

    /// Every (source, destination) pair playable right now. Draws are not
    /// included.
    pub fn legal_moves(&self, state: &GameState) -> Vec<(Location, Location)> {
        self.sources(state)
            .into_iter()
            .flat_map(|from| {
                self.legal_destinations(state, from)
                    .into_iter()
                    .map(move |to| (from, to))
            })
            .collect()
    }

    pub fn has_legal_moves(&self, state: &GameState) -> bool {
        self.can_draw(state) || !self.legal_moves(state).is_empty()
    }

    /// Candidate sources: every face-up run length of every column, then the
    /// waste, free cells and foundation tops.
    fn sources(&self, state: &GameState) -> Vec<Location> {
        let mut out = Vec::new();
        for (col, &up) in state.face_up.iter().enumerate() {
            out.extend((1..=up).map(|n| Location::run(col, n)));
        }
        if !state.waste.is_empty() {
            out.push(Location::WASTE);
        }
        for (cell, slot) in state.free_cells.iter().enumerate() {
            if slot.is_some() {
                out.push(Location::free_cell(cell));
            }
        }
        if self.foundation_to_tableau {
            for (idx, pile) in state.foundations.iter().enumerate() {
                if !pile.is_empty() {
                    out.push(Location::foundation(idx));
                }
            }
        }
        out
    }

    // -------------------------------------------------------------------------
    // Internal helpers
    // -------------------------------------------------------------------------

    /// The cards `from` would move, bottom first, if it names a legal source.
    fn movable_cards<'s>(&self, state: &'s GameState, from: Location) -> Option<&'s [Card]> {
        let count = from.card_count();
        match from {
            Location::Tableau { index, card_count } => {
                let up = *state.face_up.get(index)?;
                if card_count == 0 || card_count > up {
                    return None;
                }
                let cards = state.top_cards(from, card_count)?;
                self.stacking.is_run(cards).then_some(cards)
            }
            Location::Foundation { .. } if count != 1 => None,
            Location::Stock { .. } => None,
            _ => state.top_cards(from, 1),
        }
    }

    fn can_place_on_tableau(&self, state: &GameState, cards: &[Card], dst: usize) -> bool {
        let Some(column) = state.tableau.get(dst) else {
            return false;
        };
        let bottom = cards[0];
        let fits = match column.last() {
            None => match self.empty_column {
                EmptyColumnRule::KingOnly => bottom.is_king(),
                EmptyColumnRule::AnyCard => true,
            },
            Some(&top) => self.stacking.allows(bottom, top),
        };
        fits && cards.len() <= self.max_movable_run(state, dst)
    }

    /// Longest run that may move onto column `dst` in one go.
    pub fn max_movable_run(&self, state: &GameState, dst: usize) -> usize {
        match self.run_limit {
            RunLimit::Unlimited => usize::MAX,
            RunLimit::FreeCellCapacity => {
                let free = state.empty_free_cells();
                let mut empty = state.empty_columns();
                if state.tableau.get(dst).is_some_and(Vec::is_empty) {
                    empty = empty.saturating_sub(1);
                }
                (free + 1).saturating_mul(1usize << empty.min(usize::BITS as usize - 1))
            }
        }
    }
}

/// True iff all four foundations hold a complete Ace-to-King run of one suit
/// each.
pub fn is_game_won(state: &GameState) -> bool {
    state.foundations.len() == NUM_FOUNDATIONS
        && state.foundations.iter().all(|pile| {
            pile.len() == RANKS as usize
                && pile
                    .iter()
                    .enumerate()
                    .all(|(i, card)| card.suit == pile[0].suit && usize::from(card.rank) == i + 1)
        })
        && Suit::ALL
            .iter()
            .all(|&suit| state.foundations.iter().any(|p| p[0].suit == suit))
}

fn can_place_on_foundation(state: &GameState, card: Card, idx: usize) -> bool {
    let Some(pile) = state.foundations.get(idx) else {
        return false;
    };
    match pile.last() {
        None => card.is_ace(),
        Some(top) => top.suit == card.suit && top.rank + 1 == card.rank,
    }
}

/// The foundation `card` can go to: the one already building its suit, else
/// the first empty one for an ace.
fn foundation_for(state: &GameState, card: Card) -> Option<Location> {
    (0..state.foundations.len())
        .find(|&idx| {
            state
                .foundation_top(idx)
                .is_some_and(|top| top.suit == card.suit)
                && can_place_on_foundation(state, card, idx)
        })
        .or_else(|| (0..state.foundations.len()).find(|&idx| can_place_on_foundation(state, card, idx)))
        .map(Location::foundation)
}

/// Highest rank played on the foundation building `suit`, 0 if none.
fn foundation_rank(state: &GameState, suit: Suit) -> u8 {
    state
        .foundations
        .iter()
        .filter_map(|pile| pile.last())
        .find(|top| top.suit == suit)
        .map_or(0, |top| top.rank)
}

fn auto_sources(state: &GameState) -> Vec<Location> {
    let mut out = Vec::new();
    if !state.waste.is_empty() {
        out.push(Location::WASTE);
    }
    out.extend(
        (0..state.free_cells.len())
            .filter(|&cell| state.free_cells[cell].is_some())
            .map(Location::free_cell),
    );
    out.extend(
        (0..state.tableau.len())
            .filter(|&col| !state.tableau[col].is_empty())
            .map(Location::tableau),
    );
    out
}

fn take_cards(state: &mut GameState, from: Location) -> Option<Vec<Card>> {
    let count = from.card_count();
    match from {
        Location::Tableau { index, .. } => {
            let column = state.tableau.get_mut(index)?;
            let start = column.len().checked_sub(count)?;
            let moved = column.split_off(start);
            let remaining = column.len();
            let up = &mut state.face_up[index];
            *up = up.saturating_sub(count);
            // Expose the next face-down card.
            if remaining > 0 && *up == 0 {
                *up = 1;
            }
            Some(moved)
        }
        Location::Foundation { index, .. } => state.foundations.get_mut(index)?.pop().map(|c| vec![c]),
        Location::FreeCell { index } => state.free_cells.get_mut(index)?.take().map(|c| vec![c]),
        Location::Waste { .. } => state.waste.pop().map(|c| vec![c]),
        Location::Stock { .. } => None,
    }
}

fn place_cards(state: &mut GameState, to: Location, cards: Vec<Card>) {
    match to {
        Location::Tableau { index, .. } => {
            state.face_up[index] += cards.len();
            state.tableau[index].extend(cards);
        }
        Location::Foundation { index, .. } => state.foundations[index].extend(cards),
        Location::FreeCell { index } => state.free_cells[index] = cards.into_iter().next(),
        Location::Waste { .. } => state.waste.extend(cards),
        Location::Stock { .. } => state.stock.extend(cards),
    }
}

/// Refuse to hand out a state that lost or duplicated a card.
fn checked(state: GameState) -> Option<GameState> {
    if state.is_consistent() {
        Some(state)
    } else {
        error!(seed = state.seed, moves = state.moves, "executor broke card conservation; move refused");
        None
    }
}
