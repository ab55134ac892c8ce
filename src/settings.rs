use std::env;

use serde::{Deserialize, Serialize};

/// Default number of snapshots the undo history retains.
pub const DEFAULT_HISTORY_CAP: usize = 200;

/// Read-only view of the settings the core consults.
pub trait SettingsStore {
    fn smart_tap_enabled(&self) -> bool;
}

/// User settings. Owned by the controller; the core only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Auto-resolve taps with a single legal destination.
    pub smart_tap: bool,
    /// Cards turned per Klondike draw.
    pub klondike_draw: u8,
    /// Maximum waste→stock recycles per deal. `None` is unlimited.
    pub recycle_limit: Option<u32>,
    /// Snapshots retained by the undo history.
    pub history_cap: usize,
    /// Whether sessions write to the save slot.
    pub persist: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            smart_tap: true,
            klondike_draw: 1,
            recycle_limit: None,
            history_cap: DEFAULT_HISTORY_CAP,
            persist: true,
        }
    }
}

impl SettingsStore for Settings {
    fn smart_tap_enabled(&self) -> bool {
        self.smart_tap
    }
}

impl Settings {
    /// Defaults overridden by `PATIENCE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build settings from an arbitrary variable lookup. Values that fail to
    /// parse keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Settings::default();
        let smart_tap = lookup("PATIENCE_SMART_TAP")
            .and_then(|v| parse_bool(&v))
            .unwrap_or(defaults.smart_tap);
        let klondike_draw = lookup("PATIENCE_DRAW")
            .and_then(|v| v.trim().parse::<u8>().ok())
            .filter(|n| (1..=5).contains(n))
            .unwrap_or(defaults.klondike_draw);
        let recycle_limit = match lookup("PATIENCE_RECYCLE_LIMIT") {
            Some(v) if v.trim().eq_ignore_ascii_case("none") => None,
            Some(v) => v.trim().parse::<u32>().ok().or(defaults.recycle_limit),
            None => defaults.recycle_limit,
        };
        let history_cap = lookup("PATIENCE_HISTORY_CAP")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(defaults.history_cap);
        let persist = lookup("PATIENCE_PERSIST")
            .and_then(|v| parse_bool(&v))
            .unwrap_or(defaults.persist);

        Settings {
            smart_tap,
            klondike_draw,
            recycle_limit,
            history_cap,
            persist,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "TRUE" | "yes" | "YES" | "on" => Some(true),
        "0" | "false" | "FALSE" | "no" | "NO" | "off" => Some(false),
        _ => None,
    }
}
