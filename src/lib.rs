//! Rules core for Klondike and FreeCell: the card model, pile addressing,
//! move validation and execution, bounded undo history with signed saves,
//! and tap resolution for touch-style play.

pub mod board;
pub mod card;
pub mod engine;
pub mod error;
pub mod history;
pub mod location;
pub mod persist;
pub mod resolver;
pub mod rules;
pub mod session;
pub mod settings;
