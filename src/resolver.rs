//! Tap handling: deciding what a tap on a pile means, and the selection
//! state machine that strings taps together into moves.

use serde::{Deserialize, Serialize};

use crate::location::{Location, PileKind};
use crate::settings::SettingsStore;

/// What the controller should do with a tapped source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TapAction {
    /// Remember the source and wait for a destination tap.
    Select { from: Location },
    /// Exactly one place to go; the caller executes the move.
    AutoMove { from: Location, to: Location },
    /// Several places to go; show them and wait.
    Highlight { from: Location, options: Vec<Location> },
    /// Nowhere to go.
    Invalid,
}

/// Turns a tapped source plus its legal destinations into an action.
/// Implementations hold no state between calls.
pub trait TapResolver {
    fn resolve(&self, from: Location, candidates: &[Location]) -> TapAction;
}

/// Auto-resolves single-destination taps.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmartTap;

impl TapResolver for SmartTap {
    fn resolve(&self, from: Location, candidates: &[Location]) -> TapAction {
        match candidates {
            [] => TapAction::Invalid,
            [to] => TapAction::AutoMove { from, to: *to },
            _ => TapAction::Highlight {
                from,
                options: candidates.to_vec(),
            },
        }
    }
}

/// Tap a source, then tap a destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyTap;

impl TapResolver for LegacyTap {
    fn resolve(&self, from: Location, _candidates: &[Location]) -> TapAction {
        TapAction::Select { from }
    }
}

/// Pick the resolver once, from the settings store's smart-tap flag.
pub fn select_resolver(settings: &impl SettingsStore) -> Box<dyn TapResolver> {
    if settings.smart_tap_enabled() {
        Box::new(SmartTap)
    } else {
        Box::new(LegacyTap)
    }
}

// ---------------------------------------------------------------------------
// Selection state machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Selection {
    #[default]
    Idle,
    SourceSelected {
        from: Location,
    },
    DestinationsHighlighted {
        from: Location,
        options: Vec<Location>,
    },
}

/// What the owner of the board must do after a tap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapEffect {
    /// Run the executor on this pair.
    Execute { from: Location, to: Location },
    /// Turn the stock.
    Draw,
    /// Show these targets.
    Highlight { from: Location, options: Vec<Location> },
    /// A source is held.
    Selected { from: Location },
    /// The selection was dropped.
    Cleared,
    /// Nothing legal to do with this tap.
    Rejected,
}

impl Selection {
    /// Feed one tap through the machine. Every `Execute` effect leaves the
    /// machine idle, whether or not the executor then accepts the move.
    ///
    /// `resolve` is only consulted when the tap starts a new selection; it
    /// must compute candidates from the board as it is now. A tap on a
    /// highlighted option goes straight to `Execute`.
    pub fn on_tap(
        &self,
        tapped: Location,
        resolve: impl FnOnce(Location) -> TapAction,
    ) -> (Selection, TapEffect) {
        match self {
            Selection::Idle => Self::start(tapped, resolve),
            Selection::SourceSelected { from } => {
                if from.same_pile(tapped) {
                    (Selection::Idle, TapEffect::Cleared)
                } else {
                    (
                        Selection::Idle,
                        TapEffect::Execute {
                            from: *from,
                            to: tapped,
                        },
                    )
                }
            }
            Selection::DestinationsHighlighted { from, options } => {
                if let Some(to) = options.iter().find(|o| o.same_pile(tapped)) {
                    (
                        Selection::Idle,
                        TapEffect::Execute {
                            from: *from,
                            to: *to,
                        },
                    )
                } else if from.same_pile(tapped) {
                    (Selection::Idle, TapEffect::Cleared)
                } else {
                    Self::start(tapped, resolve)
                }
            }
        }
    }

    /// Targets to render as selectable, if any.
    pub fn highlighted(&self) -> &[Location] {
        match self {
            Selection::DestinationsHighlighted { options, .. } => options.as_slice(),
            _ => &[],
        }
    }

    pub fn source(&self) -> Option<Location> {
        match self {
            Selection::Idle => None,
            Selection::SourceSelected { from } | Selection::DestinationsHighlighted { from, .. } => {
                Some(*from)
            }
        }
    }

    fn start(
        tapped: Location,
        resolve: impl FnOnce(Location) -> TapAction,
    ) -> (Selection, TapEffect) {
        if tapped.kind() == PileKind::Stock {
            return (Selection::Idle, TapEffect::Draw);
        }
        match resolve(tapped) {
            TapAction::Invalid => (Selection::Idle, TapEffect::Rejected),
            TapAction::AutoMove { from, to } => (Selection::Idle, TapEffect::Execute { from, to }),
            TapAction::Highlight { from, options } => (
                Selection::DestinationsHighlighted {
                    from,
                    options: options.clone(),
                },
                TapEffect::Highlight { from, options },
            ),
            TapAction::Select { from } => {
                (Selection::SourceSelected { from }, TapEffect::Selected { from })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    const SRC: Location = Location::tableau(0);

    #[test]
    fn smart_tap_counts() {
        let one = [Location::tableau(3)];
        let two = [Location::foundation(0), Location::tableau(3)];
        assert_eq!(SmartTap.resolve(SRC, &[]), TapAction::Invalid);
        assert_eq!(
            SmartTap.resolve(SRC, &one),
            TapAction::AutoMove {
                from: SRC,
                to: one[0]
            }
        );
        match SmartTap.resolve(SRC, &two) {
            TapAction::Highlight { from, options } => {
                assert_eq!(from, SRC);
                assert_eq!(options.len(), 2);
            }
            other => panic!("expected highlight, got {other:?}"),
        }
    }

    #[test]
    fn legacy_tap_always_selects() {
        for candidates in [&[][..], &[Location::tableau(1)][..]] {
            assert_eq!(
                LegacyTap.resolve(SRC, candidates),
                TapAction::Select { from: SRC }
            );
        }
    }

    #[test]
    fn resolver_follows_settings_flag() {
        let one = [Location::tableau(3)];
        let smart = select_resolver(&Settings::default());
        assert!(matches!(smart.resolve(SRC, &one), TapAction::AutoMove { .. }));

        let off = Settings {
            smart_tap: false,
            ..Settings::default()
        };
        let legacy = select_resolver(&off);
        assert!(matches!(legacy.resolve(SRC, &one), TapAction::Select { .. }));
    }

    #[test]
    fn idle_stock_tap_draws_without_resolving() {
        let (next, effect) = Selection::Idle.on_tap(Location::STOCK, |_| {
            panic!("stock taps are not resolved")
        });
        assert_eq!(next, Selection::Idle);
        assert_eq!(effect, TapEffect::Draw);
    }

    #[test]
    fn idle_tap_follows_resolver() {
        let (next, effect) = Selection::Idle.on_tap(SRC, |_| TapAction::Invalid);
        assert_eq!((next, effect), (Selection::Idle, TapEffect::Rejected));

        let to = Location::foundation(1);
        let (next, effect) =
            Selection::Idle.on_tap(SRC, |from| TapAction::AutoMove { from, to });
        assert_eq!(next, Selection::Idle);
        assert_eq!(effect, TapEffect::Execute { from: SRC, to });

        let (next, _) = Selection::Idle.on_tap(SRC, |from| TapAction::Select { from });
        assert_eq!(next, Selection::SourceSelected { from: SRC });
    }

    #[test]
    fn source_selected_then_destination_executes() {
        let selected = Selection::SourceSelected { from: SRC };
        let (next, effect) = selected.on_tap(Location::tableau(4), |_| unreachable!());
        assert_eq!(next, Selection::Idle);
        assert_eq!(
            effect,
            TapEffect::Execute {
                from: SRC,
                to: Location::tableau(4)
            }
        );

        let (next, effect) = selected.on_tap(Location::tableau(0), |_| unreachable!());
        assert_eq!((next, effect), (Selection::Idle, TapEffect::Cleared));
    }

    #[test]
    fn highlighted_option_bypasses_resolver() {
        let options = vec![Location::foundation(0), Location::tableau(5)];
        let highlighted = Selection::DestinationsHighlighted {
            from: Location::run(2, 3),
            options: options.clone(),
        };
        assert_eq!(highlighted.highlighted(), options.as_slice());
        assert_eq!(highlighted.source(), Some(Location::run(2, 3)));

        let (next, effect) = highlighted.on_tap(Location::tableau(5), |_| {
            panic!("second tap must not be resolved")
        });
        assert_eq!(next, Selection::Idle);
        assert_eq!(
            effect,
            TapEffect::Execute {
                from: Location::run(2, 3),
                to: Location::tableau(5)
            }
        );
    }

    #[test]
    fn highlighted_source_tap_clears_and_other_tap_restarts() {
        let highlighted = Selection::DestinationsHighlighted {
            from: SRC,
            options: vec![Location::tableau(1), Location::tableau(2)],
        };
        let (next, effect) = highlighted.on_tap(SRC, |_| unreachable!());
        assert_eq!((next, effect), (Selection::Idle, TapEffect::Cleared));

        let other = Location::tableau(6);
        let (next, effect) = highlighted.on_tap(other, |from| TapAction::Select { from });
        assert_eq!(next, Selection::SourceSelected { from: other });
        assert_eq!(effect, TapEffect::Selected { from: other });
    }
}
