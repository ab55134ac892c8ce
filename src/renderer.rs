use crossterm::style::{StyledContent, Stylize};

use patience::board::GameState;
use patience::card::{Card, Color};
use patience::location::Location;
use patience::rules::Rules;

/// What the board view needs besides the snapshot itself.
pub struct View<'a> {
    pub state: &'a GameState,
    pub rules: &'a Rules,
    /// Targets offered after an ambiguous tap.
    pub highlights: &'a [Location],
    /// The held source, if any.
    pub selected: Option<Location>,
}

/// Trait that abstracts the rendering layer.
///
/// Implement this trait for:
/// - `CliRenderer` – plain terminal output (current implementation)
/// - anything else that wants to draw the board
pub trait Renderer {
    /// Render the full game board.
    fn render(&mut self, view: &View<'_>);
    /// Display an informational message.
    fn info(&mut self, msg: &str);
    /// Display an error message.
    fn error(&mut self, msg: &str);
    /// Display the help text.
    fn help(&mut self);
    /// Display the win screen.
    fn win(&mut self);
}

// ---------------------------------------------------------------------------
// CLI Renderer
// ---------------------------------------------------------------------------

/// A simple colour CLI renderer.
pub struct CliRenderer;

impl CliRenderer {
    pub fn new() -> Self {
        CliRenderer
    }

    fn card_str(&self, card: Card) -> StyledContent<String> {
        let label = format!("{:>3}", card.label());
        match card.color() {
            Color::Red => label.red(),
            Color::Black => label.white(),
        }
    }

    fn slot_str(&self, card: Option<Card>, loc: Location, view: &View<'_>) -> String {
        let body = match card {
            Some(c) => format!("[{}]", self.card_str(c)),
            None => "[   ]".to_string(),
        };
        mark(body, loc, view)
    }
}

/// Highlighted targets get a yellow background, the held source is bold.
fn mark(body: String, loc: Location, view: &View<'_>) -> String {
    if view.highlights.iter().any(|h| h.same_pile(loc)) {
        format!("{}", body.on_dark_yellow())
    } else if view.selected.is_some_and(|s| s.same_pile(loc)) {
        format!("{}", body.bold().underlined())
    } else {
        body
    }
}

impl Renderer for CliRenderer {
    fn render(&mut self, view: &View<'_>) {
        let state = view.state;
        println!();

        // ---- Top row: stock / waste or free cells | foundations ----
        if view.rules.free_cells > 0 {
            print!("  CELLS: ");
            for (i, slot) in state.free_cells.iter().enumerate() {
                print!("c{}{} ", i, self.slot_str(*slot, Location::free_cell(i), view));
            }
        } else {
            let stock = if state.stock.is_empty() {
                "[   ]".to_string()
            } else {
                format!("[{:>3}]", state.stock.len())
            };
            print!("  s{}  ", stock);
            print!("w{}", self.slot_str(state.waste_top(), Location::WASTE, view));
            print!("     ");
        }

        print!("  FOUND: ");
        for i in 0..state.foundations.len() {
            print!(
                "f{}{} ",
                i,
                self.slot_str(state.foundation_top(i), Location::foundation(i), view)
            );
        }
        println!();

        // ---- Column indices header ----
        println!();
        print!("        ");
        for i in 0..state.tableau.len() {
            let header = mark(format!(" t{:<3}", i), Location::tableau(i), view);
            print!("{} ", header);
        }
        println!();

        // ---- Tableau ----
        let max_len = state.tableau.iter().map(Vec::len).max().unwrap_or(0);
        for row in 0..max_len {
            print!("  {:>3}:  ", row);
            for (col, cards) in state.tableau.iter().enumerate() {
                if row < cards.len() {
                    if row < state.face_down(col) {
                        print!("[###] ");
                    } else {
                        print!("[{}] ", self.card_str(cards[row]));
                    }
                } else {
                    print!("      ");
                }
            }
            println!();
        }

        if max_len == 0 {
            println!("  (all columns empty)");
        }

        println!();
        println!(
            "  {} · seed {} · moves {}",
            view.rules.kind.label(),
            state.seed,
            state.moves
        );
        println!();
    }

    fn info(&mut self, msg: &str) {
        println!("{} {}", "[INFO]".cyan(), msg);
    }

    fn error(&mut self, msg: &str) {
        println!("{} {}", "[ERR ]".red(), msg);
    }

    fn help(&mut self) {
        println!(
            r#"
╔══════════════════════════════════════════════════════════════╗
║              Patience – Klondike & FreeCell                  ║
╠══════════════════════════════════════════════════════════════╣
║  LOCATIONS:                                                  ║
║    t3      top card of column 3                              ║
║    t3:2    top two cards of column 3 (a run)                 ║
║    f0      foundation 0       c1   free cell 1 (FreeCell)    ║
║    w       waste (Klondike)   s    stock (Klondike)          ║
║                                                              ║
║  COMMANDS (case-insensitive):                                ║
║    <loc> | tap <loc>   Tap a pile. With smart tap on, a      ║
║                        single legal target moves at once;    ║
║                        several are highlighted – tap one.    ║
║    mv <from> <to>      Move directly                         ║
║    d | draw            Draw from stock / recycle waste       ║
║    a | auto            Play safe cards to the foundations    ║
║    hint                List legal moves                      ║
║    u | undo            Undo          r | redo    Redo        ║
║    restart             Replay this deal                      ║
║    new [game] [seed]   New game (klondike | freecell)        ║
║    smart on|off        Toggle smart tap                      ║
║    quit                Exit          help | ?    This help   ║
╚══════════════════════════════════════════════════════════════╝
"#
        );
    }

    fn win(&mut self) {
        println!(
            "\n{}\n\n  Congratulations! You solved it!  Type 'new' for another game.\n",
            "  ★ ★ ★   Y O U   W I N   ★ ★ ★".yellow().bold()
        );
    }
}
