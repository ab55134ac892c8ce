use tracing::{debug, info};

use crate::board::GameState;
use crate::engine::{MoveRules, is_game_won};
use crate::history::HistoryStack;
use crate::location::Location;
use crate::persist::{SaveSlots, Storage};
use crate::resolver::{Selection, TapEffect, TapResolver, select_resolver};
use crate::rules::{GameKind, Rules};
use crate::settings::Settings;

/// What a tap ended up doing, for the controller to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    Moved { from: Location, to: Location },
    Drew,
    Highlighted(Vec<Location>),
    Selected(Location),
    Cleared,
    Rejected,
}

/// One game being played: rules, undo history, tap selection and the save
/// slot. Every committed change goes through here, so the history head is
/// always the board to render and the save always matches it.
pub struct Session<S: Storage> {
    rules: Rules,
    settings: Settings,
    history: HistoryStack,
    selection: Selection,
    resolver: Box<dyn TapResolver>,
    slots: SaveSlots<S>,
}

impl<S: Storage> Session<S> {
    /// Resume the saved game for `kind`, or deal a new one with a random
    /// seed.
    pub fn start(kind: GameKind, settings: Settings, storage: S) -> Self {
        let slots = SaveSlots::new(storage);
        let saved = if settings.persist {
            slots.load(kind)
        } else {
            None
        };

        match saved {
            Some(saved) => Session {
                rules: saved.rules,
                resolver: select_resolver(&settings),
                settings,
                history: saved.history,
                selection: Selection::Idle,
                slots,
            },
            None => Self::fresh(kind, rand::random(), settings, slots),
        }
    }

    /// Deal `seed` for `kind`, ignoring any save.
    pub fn with_seed(kind: GameKind, seed: u64, settings: Settings, storage: S) -> Self {
        Self::fresh(kind, seed, settings, SaveSlots::new(storage))
    }

    fn fresh(kind: GameKind, seed: u64, settings: Settings, slots: SaveSlots<S>) -> Self {
        let rules = Rules::for_kind(kind, &settings);
        let mut session = Session {
            rules,
            history: HistoryStack::new(rules.deal(seed), settings.history_cap),
            selection: Selection::Idle,
            resolver: select_resolver(&settings),
            settings,
            slots,
        };
        info!(kind = kind.id(), seed, "dealt new game");
        session.persist();
        session
    }

    /// Abandon the current deal and start `kind` from `seed`.
    pub fn new_game(&mut self, kind: GameKind, seed: u64) {
        self.rules = Rules::for_kind(kind, &self.settings);
        self.history = HistoryStack::new(self.rules.deal(seed), self.settings.history_cap);
        self.selection = Selection::Idle;
        info!(kind = kind.id(), seed, "dealt new game");
        self.persist();
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn state(&self) -> &GameState {
        self.history.current()
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn kind(&self) -> GameKind {
        self.rules.kind
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn storage(&self) -> &S {
        self.slots.storage()
    }

    pub fn is_won(&self) -> bool {
        is_game_won(self.state())
    }

    pub fn validate(&self, from: Location, to: Location) -> bool {
        self.rules.validate_move(self.state(), from, to)
    }

    pub fn legal_destinations(&self, from: Location) -> Vec<Location> {
        self.rules.legal_destinations(self.state(), from)
    }

    /// Swap the tap resolver after the user flips the setting.
    pub fn set_smart_tap(&mut self, enabled: bool) {
        self.settings.smart_tap = enabled;
        self.resolver = select_resolver(&self.settings);
        self.selection = Selection::Idle;
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    /// Direct move request. `false` when illegal; nothing changes then.
    pub fn apply_move(&mut self, from: Location, to: Location) -> bool {
        match self.rules.execute_move(self.state(), from, to) {
            Some(next) => {
                self.commit(next);
                true
            }
            None => false,
        }
    }

    pub fn draw(&mut self) -> bool {
        match self.rules.draw_from_stock(self.state()) {
            Some(next) => {
                self.commit(next);
                true
            }
            None => false,
        }
    }

    /// Play every safe card up as one undoable step. Returns how many went.
    pub fn auto_move(&mut self) -> usize {
        let before = self.state().moves;
        match self.rules.auto_move_to_foundations(self.state()) {
            Some(next) => {
                let moved = (next.moves - before) as usize;
                self.commit(next);
                moved
            }
            None => 0,
        }
    }

    /// Feed a tap through the selection machine. Candidates come from the
    /// committed board at the moment of the tap.
    pub fn tap(&mut self, tapped: Location) -> TapOutcome {
        let rules = &self.rules;
        let state = self.history.current();
        let resolver = &self.resolver;
        let (next, effect) = self.selection.on_tap(tapped, |from| {
            let candidates = rules.legal_destinations(state, from);
            resolver.resolve(from, &candidates)
        });
        self.selection = next;
        debug!(tapped = %tapped.label(), ?effect, "tap");

        match effect {
            TapEffect::Execute { from, to } => {
                if self.apply_move(from, to) {
                    TapOutcome::Moved { from, to }
                } else {
                    TapOutcome::Rejected
                }
            }
            TapEffect::Draw => {
                if self.draw() {
                    TapOutcome::Drew
                } else {
                    TapOutcome::Rejected
                }
            }
            TapEffect::Highlight { options, .. } => TapOutcome::Highlighted(options),
            TapEffect::Selected { from } => TapOutcome::Selected(from),
            TapEffect::Cleared => TapOutcome::Cleared,
            TapEffect::Rejected => TapOutcome::Rejected,
        }
    }

    pub fn undo(&mut self) -> bool {
        let moved = self.history.undo().is_some();
        if moved {
            self.selection = Selection::Idle;
            self.persist();
        }
        moved
    }

    pub fn redo(&mut self) -> bool {
        let moved = self.history.redo().is_some();
        if moved {
            self.selection = Selection::Idle;
            self.persist();
        }
        moved
    }

    /// Replay this deal from the start.
    pub fn restart(&mut self) {
        self.history.reset();
        self.selection = Selection::Idle;
        self.persist();
    }

    fn commit(&mut self, next: GameState) {
        self.history.push(next);
        self.selection = Selection::Idle;
        self.persist();
    }

    fn persist(&mut self) {
        if self.settings.persist {
            self.slots.save(&self.rules, &self.history);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::MemoryStorage;

    fn session(kind: GameKind, seed: u64) -> Session<MemoryStorage> {
        Session::with_seed(kind, seed, Settings::default(), MemoryStorage::new())
    }

    #[test]
    fn fresh_session_is_saved_immediately() {
        let s = session(GameKind::Klondike, 3);
        assert!(s.storage().get("klondike.dat").is_some());
        assert_eq!(s.state(), &Rules::klondike(1).deal(3));
    }

    #[test]
    fn start_restores_saved_game() {
        let mut s = session(GameKind::Klondike, 11);
        assert!(s.draw());
        assert!(s.draw());
        let snapshot = s.history().clone();
        let storage = s.storage().clone();

        let resumed = Session::start(GameKind::Klondike, Settings::default(), storage);
        assert_eq!(resumed.history(), &snapshot);
    }

    #[test]
    fn start_with_corrupt_save_deals_fresh() {
        let mut storage = MemoryStorage::new();
        storage.insert("freecell.dat", b"not a save at all, definitely not".to_vec());
        let s = Session::start(GameKind::FreeCell, Settings::default(), storage);
        assert_eq!(s.history().len(), 1);
        assert!(s.state().is_consistent());
        assert_eq!(s.kind(), GameKind::FreeCell);
    }

    #[test]
    fn persistence_off_neither_reads_nor_writes() {
        let settings = Settings {
            persist: false,
            ..Settings::default()
        };
        let s = Session::with_seed(GameKind::Klondike, 1, settings, MemoryStorage::new());
        assert!(s.storage().get("klondike.dat").is_none());
    }

    #[test]
    fn write_failures_do_not_stop_play() {
        let mut storage = MemoryStorage::new();
        storage.fail_writes = true;
        let mut s = Session::with_seed(GameKind::Klondike, 5, Settings::default(), storage);
        assert!(s.draw());
        assert_eq!(s.state().moves, 1);
        assert!(s.undo());
        assert_eq!(s.state().moves, 0);
    }

    #[test]
    fn illegal_move_changes_nothing() {
        let mut s = session(GameKind::Klondike, 9);
        let before = s.history().clone();
        assert!(!s.apply_move(Location::tableau(0), Location::tableau(0)));
        assert!(!s.apply_move(Location::WASTE, Location::tableau(1)));
        assert_eq!(s.history(), &before);
    }

    #[test]
    fn stock_tap_draws() {
        let mut s = session(GameKind::Klondike, 21);
        assert_eq!(s.tap(Location::STOCK), TapOutcome::Drew);
        assert_eq!(s.state().waste.len(), 1);
    }

    /// First FreeCell deal with a source whose destination count satisfies
    /// `want`.
    fn freecell_source(want: impl Fn(usize) -> bool) -> (Session<MemoryStorage>, Location) {
        for seed in 0..50 {
            let s = session(GameKind::FreeCell, seed);
            let found = s
                .rules()
                .legal_moves(s.state())
                .into_iter()
                .map(|(from, _)| from)
                .find(|from| want(s.legal_destinations(*from).len()));
            if let Some(from) = found {
                return (s, from);
            }
        }
        panic!("no deal with a matching source");
    }

    #[test]
    fn legacy_tap_needs_two_taps() {
        let settings = Settings {
            smart_tap: false,
            ..Settings::default()
        };
        let mut s = Session::with_seed(GameKind::FreeCell, 2, settings, MemoryStorage::new());
        let (from, to) = s.rules().legal_moves(s.state())[0];
        assert_eq!(s.tap(from), TapOutcome::Selected(from));
        assert_eq!(s.tap(to), TapOutcome::Moved { from, to });
        assert_eq!(s.state().moves, 1);
        assert_eq!(s.selection(), &Selection::Idle);
    }

    #[test]
    fn smart_tap_single_destination_moves_at_once() {
        let (mut s, from) = freecell_source(|n| n == 1);
        let to = s.legal_destinations(from)[0];
        assert_eq!(s.tap(from), TapOutcome::Moved { from, to });
        assert_eq!(s.state().moves, 1);
    }

    #[test]
    fn smart_tap_several_destinations_highlight_then_move() {
        let (mut s, from) = freecell_source(|n| n >= 2);
        let options = s.legal_destinations(from);
        assert_eq!(s.tap(from), TapOutcome::Highlighted(options.clone()));
        assert_eq!(s.selection().highlighted(), options.as_slice());
        assert_eq!(s.state().moves, 0);

        let to = options[options.len() - 1];
        assert_eq!(s.tap(to), TapOutcome::Moved { from, to });
        assert_eq!(s.selection(), &Selection::Idle);
    }

    #[test]
    fn toggling_smart_tap_swaps_resolver() {
        let mut s = session(GameKind::FreeCell, 4);
        s.set_smart_tap(false);
        let from = Location::tableau(0);
        assert_eq!(s.tap(from), TapOutcome::Selected(from));
        assert_eq!(s.tap(from), TapOutcome::Cleared);
    }

    #[test]
    fn restart_and_new_game() {
        let mut s = session(GameKind::Klondike, 8);
        s.draw();
        s.draw();
        s.restart();
        assert_eq!(s.state(), &Rules::klondike(1).deal(8));
        assert!(!s.undo());

        s.new_game(GameKind::FreeCell, 8);
        assert_eq!(s.kind(), GameKind::FreeCell);
        assert_eq!(s.state(), &Rules::freecell().deal(8));
        assert!(s.storage().get("freecell.dat").is_some());
    }
}
