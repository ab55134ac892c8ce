use patience::location::Location;
use patience::rules::GameKind;

/// All commands a player can issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Turn the stock (or recycle the waste).
    Draw,
    /// Move straight from one pile to another.
    Move { from: Location, to: Location },
    /// Tap a pile; what happens depends on the selection and smart tap.
    Tap(Location),
    /// Play every safe card to the foundations.
    Auto,
    /// List the legal moves.
    Hint,
    Undo,
    Redo,
    /// Replay the current deal from the start.
    Restart,
    /// Deal a new game, optionally switching game and fixing the seed.
    NewGame {
        kind: Option<GameKind>,
        seed: Option<u64>,
    },
    /// Switch smart tap on or off.
    SmartTap(bool),
    Quit,
    Help,
}

/// Parse a single line of text input into a `Command`.
///
/// Syntax reference (case-insensitive):
/// ```text
/// <loc>                             -- Tap a pile
/// tap <loc>                         -- Tap a pile
/// mv <from> <to>                    -- Move directly
/// d | draw                          -- Draw from stock
/// a | auto                          -- Auto-move to foundations
/// hint                              -- List legal moves
/// u | undo,  r | redo,  restart
/// new [klondike|freecell] [seed]    -- New game
/// smart on|off                      -- Toggle smart tap
/// quit | q,  help | h | ?
///
/// <loc>: t<col>[:<count>]  f<n>  c<n>  w  s
/// ```
pub fn parse_command(input: &str) -> Result<Command, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("Empty input".to_string());
    }

    let tokens: Vec<&str> = input.split_whitespace().collect();
    let cmd = tokens[0].to_lowercase();

    match cmd.as_str() {
        "mv" | "m" => {
            if tokens.len() < 3 {
                return Err("Usage: mv <from> <to>".to_string());
            }
            Ok(Command::Move {
                from: parse_location(tokens[1])?,
                to: parse_location(tokens[2])?,
            })
        }
        "tap" => {
            if tokens.len() < 2 {
                return Err("Usage: tap <loc>".to_string());
            }
            Ok(Command::Tap(parse_location(tokens[1])?))
        }
        "d" | "draw" => Ok(Command::Draw),
        "a" | "auto" => Ok(Command::Auto),
        "hint" => Ok(Command::Hint),
        "undo" | "u" => Ok(Command::Undo),
        "redo" | "r" => Ok(Command::Redo),
        "restart" => Ok(Command::Restart),
        "new" | "n" => parse_new_game(&tokens[1..]),
        "smart" => match tokens.get(1).map(|t| t.to_lowercase()).as_deref() {
            Some("on") => Ok(Command::SmartTap(true)),
            Some("off") => Ok(Command::SmartTap(false)),
            _ => Err("Usage: smart on|off".to_string()),
        },
        "quit" | "q" | "exit" => Ok(Command::Quit),
        "help" | "h" | "?" => Ok(Command::Help),
        _ => match parse_location(tokens[0]) {
            Ok(loc) => Ok(Command::Tap(loc)),
            Err(_) => Err(format!("Unknown command '{}'. Type 'help' for help.", tokens[0])),
        },
    }
}

/// `t3`, `t3:2`, `f0`, `c1`, `w`, `s`.
pub fn parse_location(s: &str) -> Result<Location, String> {
    let s = s.to_lowercase();
    match s.as_str() {
        "w" => return Ok(Location::WASTE),
        "s" => return Ok(Location::STOCK),
        _ => {}
    }

    let mut chars = s.chars();
    let kind = chars.next();
    let rest = chars.as_str();
    match kind {
        Some('t') => {
            if let Some((col_part, count_part)) = rest.split_once(':') {
                let count: usize = count_part
                    .parse()
                    .map_err(|_| format!("'{}' is not a valid card count", count_part))?;
                if count == 0 {
                    return Err("Card count must be at least 1".to_string());
                }
                Ok(Location::run(parse_idx(col_part, "column")?, count))
            } else {
                Ok(Location::tableau(parse_idx(rest, "column")?))
            }
        }
        Some('f') => Ok(Location::foundation(parse_idx(rest, "foundation")?)),
        Some('c') => Ok(Location::free_cell(parse_idx(rest, "free-cell")?)),
        _ => Err(format!("'{}' is not a location (t3, t3:2, f0, c1, w, s)", s)),
    }
}

fn parse_idx(s: &str, what: &str) -> Result<usize, String> {
    s.parse()
        .map_err(|_| format!("'{}' is not a valid {} index", s, what))
}

fn parse_new_game(args: &[&str]) -> Result<Command, String> {
    let mut kind = None;
    let mut seed = None;
    for arg in args {
        if let Some(k) = GameKind::from_id(arg) {
            kind = Some(k);
        } else if let Ok(n) = arg.parse::<u64>() {
            seed = Some(n);
        } else {
            return Err("Usage: new [klondike|freecell] [seed]".to_string());
        }
    }
    Ok(Command::NewGame { kind, seed })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locations() {
        assert_eq!(parse_location("t3"), Ok(Location::tableau(3)));
        assert_eq!(parse_location("T3:2"), Ok(Location::run(3, 2)));
        assert_eq!(parse_location("f1"), Ok(Location::foundation(1)));
        assert_eq!(parse_location("c0"), Ok(Location::free_cell(0)));
        assert_eq!(parse_location("w"), Ok(Location::WASTE));
        assert_eq!(parse_location("s"), Ok(Location::STOCK));
        assert!(parse_location("t3:0").is_err());
        assert!(parse_location("tx").is_err());
        assert!(parse_location("z1").is_err());
        assert!(parse_location("é1").is_err());
    }

    #[test]
    fn commands() {
        assert_eq!(
            parse_command("mv w t2"),
            Ok(Command::Move {
                from: Location::WASTE,
                to: Location::tableau(2)
            })
        );
        assert_eq!(parse_command("t4:3"), Ok(Command::Tap(Location::run(4, 3))));
        assert_eq!(parse_command("tap c1"), Ok(Command::Tap(Location::free_cell(1))));
        assert_eq!(parse_command("  D "), Ok(Command::Draw));
        assert_eq!(parse_command("smart off"), Ok(Command::SmartTap(false)));
        assert_eq!(
            parse_command("new freecell 42"),
            Ok(Command::NewGame {
                kind: Some(GameKind::FreeCell),
                seed: Some(42)
            })
        );
        assert_eq!(
            parse_command("new"),
            Ok(Command::NewGame {
                kind: None,
                seed: None
            })
        );
        assert!(parse_command("").is_err());
        assert!(parse_command("mv w").is_err());
        assert!(parse_command("new spider").is_err());
        assert!(parse_command("dance").is_err());
    }
}
