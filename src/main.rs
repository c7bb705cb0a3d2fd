//! Victor's Descent - Entry Point
//!
//! Initializes logging and the terminal, sets up the session, and runs the
//! main loop.

use std::io;
use std::time::{Duration, Instant};
use std::fs::OpenOptions;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    Terminal,
};

use victors_descent::data::GameConfig;
use victors_descent::game::Session;
use victors_descent::leaderboard::HttpLeaderboard;
use victors_descent::save::ProfileStore;
use victors_descent::ui::App;

/// Target frames per second for the main loop
const TARGET_FPS: u64 = 30;
const FRAME_TIME: Duration = Duration::from_millis(1000 / TARGET_FPS);

fn main() -> Result<()> {
    init_logging();
    log::info!("Starting Victor's Descent v{}", env!("CARGO_PKG_VERSION"));

    let config = GameConfig::load();
    let api = HttpLeaderboard::new(&config.api_base);
    let mut session = Session::new(&config, ProfileStore::default_location(), Box::new(api));
    let mut app = App::new();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_loop(&mut terminal, &mut app, &mut session);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        log::error!("Game exited with error: {}", e);
        eprintln!("Error: {}", e);
    }

    log::info!("Victor's Descent shut down cleanly");
    result
}

/// Log to a file so output does not interfere with the TUI
fn init_logging() {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));

    match OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("victors-descent.log")
    {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            // No log file; keep stderr quiet while the TUI owns the screen
            builder.filter_level(log::LevelFilter::Off);
        }
    }

    builder.init();
}

/// Main loop
fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    session: &mut Session,
) -> Result<()> {
    loop {
        let frame_start = Instant::now();

        // Handle input
        if event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                // Only handle key press events, not releases
                if key.kind == KeyEventKind::Press {
                    match app.handle_input(key, session) {
                        Ok(true) => break,
                        Ok(false) => {}
                        Err(e) => log::warn!("Input handling error: {}", e),
                    }
                }
            }
        }

        app.update(session, Instant::now());

        terminal.draw(|frame| {
            app.render(frame, session);
        })?;

        // Frame rate limiting
        let frame_time = frame_start.elapsed();
        if frame_time < FRAME_TIME {
            std::thread::sleep(FRAME_TIME - frame_time);
        }
    }

    Ok(())
}
