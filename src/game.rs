use std::io::{self, BufRead, Write};

use tracing::debug;

use patience::location::Location;
use patience::persist::Storage;
use patience::session::{Session, TapOutcome};

use crate::command::{Command, parse_command};
use crate::renderer::{Renderer, View};

/// The main game loop. `renderer` is injected so the session stays
/// renderer-agnostic.
pub struct Game<R: Renderer, S: Storage> {
    session: Session<S>,
    renderer: R,
}

impl<R: Renderer, S: Storage> Game<R, S> {
    pub fn new(session: Session<S>, renderer: R) -> Self {
        Game { session, renderer }
    }

    /// Run the interactive game loop until the player quits or stdin closes.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let mut stdout = io::stdout();

        self.render();

        loop {
            print!("> ");
            stdout.flush()?;

            let mut line = String::new();
            if stdin.lock().read_line(&mut line)? == 0 {
                // EOF
                break;
            }

            match parse_command(&line) {
                Err(e) => self.renderer.error(&e),
                Ok(cmd) => {
                    debug!(?cmd, "command");
                    if self.handle(cmd) {
                        break;
                    }
                    if self.session.is_won() {
                        self.renderer.win();
                    } else if !self.session.rules().has_legal_moves(self.session.state()) {
                        self.renderer
                            .info("No legal moves left. Try undo, restart or new.");
                    }
                    self.render();
                }
            }
        }
        Ok(())
    }

    fn render(&mut self) {
        let selection = self.session.selection();
        let view = View {
            state: self.session.state(),
            rules: self.session.rules(),
            highlights: selection.highlighted(),
            selected: selection.source(),
        };
        self.renderer.render(&view);
    }

    /// Dispatch a command. Returns `true` if the game should exit.
    fn handle(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Quit => {
                self.renderer.info("Thanks for playing. Goodbye!");
                return true;
            }
            Command::Help => self.renderer.help(),
            Command::Draw => {
                if !self.session.draw() {
                    self.renderer.error("The stock and waste are both spent.");
                }
            }
            Command::Move { from, to } => {
                if !self.session.apply_move(from, to) {
                    self.renderer
                        .error(&format!("Cannot move {} to {}.", from.label(), to.label()));
                }
            }
            Command::Tap(loc) => self.tap(loc),
            Command::Auto => match self.session.auto_move() {
                0 => self.renderer.info("No card can safely go up."),
                n => self
                    .renderer
                    .info(&format!("Auto-moved {} card(s) to foundation.", n)),
            },
            Command::Hint => {
                let rules = self.session.rules();
                let state = self.session.state();
                let moves = rules.legal_moves(state);
                if !rules.has_legal_moves(state) {
                    self.renderer.info("No legal moves left.");
                } else if moves.is_empty() {
                    self.renderer.info("No moves on the board; try drawing.");
                } else {
                    let listed: Vec<String> = moves
                        .iter()
                        .map(|(from, to)| format!("{}→{}", from.label(), to.label()))
                        .collect();
                    self.renderer.info(&listed.join("  "));
                }
            }
            Command::Undo => {
                if self.session.undo() {
                    self.renderer.info("Undo successful.");
                } else {
                    self.renderer.error("Nothing to undo.");
                }
            }
            Command::Redo => {
                if self.session.redo() {
                    self.renderer.info("Redo successful.");
                } else {
                    self.renderer.error("Nothing to redo.");
                }
            }
            Command::Restart => {
                self.session.restart();
                self.renderer.info("Back to the opening deal.");
            }
            Command::NewGame { kind, seed } => {
                let kind = kind.unwrap_or(self.session.kind());
                let seed = seed.unwrap_or_else(rand::random);
                self.session.new_game(kind, seed);
                self.renderer
                    .info(&format!("A new {} game has been dealt (seed {}).", kind.label(), seed));
            }
            Command::SmartTap(on) => {
                self.session.set_smart_tap(on);
                self.renderer
                    .info(if on { "Smart tap on." } else { "Smart tap off." });
            }
        }
        false
    }

    fn tap(&mut self, loc: Location) {
        match self.session.tap(loc) {
            TapOutcome::Moved { from, to } => {
                self.renderer
                    .info(&format!("Moved {} to {}.", from.label(), to.label()));
            }
            TapOutcome::Drew => {}
            TapOutcome::Highlighted(options) => {
                let labels: Vec<String> = options.iter().map(|o| o.label()).collect();
                self.renderer
                    .info(&format!("Choose a destination: {}", labels.join(", ")));
            }
            TapOutcome::Selected(from) => {
                self.renderer
                    .info(&format!("Selected {}; tap a destination.", from.label()));
            }
            TapOutcome::Cleared => self.renderer.info("Selection cleared."),
            TapOutcome::Rejected => {
                debug!(tapped = %loc.label(), "tap rejected");
                self.renderer.error("Nothing to do there.");
            }
        }
    }
}
