mod command;
mod game;
mod renderer;

use tracing::warn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use patience::persist::FileStorage;
use patience::rules::GameKind;
use patience::session::Session;
use patience::settings::Settings;

use game::Game;
use renderer::CliRenderer;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("PATIENCE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();

    println!(
        r#"
┌─────────────────────────────────────────┐
│   Patience: Klondike & FreeCell (CLI)   │
│   Type 'help' or '?' for commands.      │
└─────────────────────────────────────────┘
"#
    );

    // Optional game and seed: `patience [klondike|freecell] [seed]`.
    let mut kind = GameKind::Klondike;
    let mut seed: Option<u64> = None;
    for arg in std::env::args().skip(1) {
        if let Some(k) = GameKind::from_id(&arg) {
            kind = k;
        } else if let Ok(n) = arg.parse() {
            seed = Some(n);
        } else {
            eprintln!("usage: patience [klondike|freecell] [seed]");
            std::process::exit(2);
        }
    }

    let settings = Settings::from_env();
    let storage = FileStorage::platform().unwrap_or_else(|e| {
        warn!(error = %e, "no platform data directory; saving under the temp dir");
        FileStorage::new(std::env::temp_dir().join("patience"))
    });

    let session = match seed {
        Some(seed) => Session::with_seed(kind, seed, settings, storage),
        None => Session::start(kind, settings, storage),
    };

    let mut game = Game::new(session, CliRenderer::new());
    if let Err(e) = game.run() {
        eprintln!("terminal error: {e}");
        std::process::exit(1);
    }
}
