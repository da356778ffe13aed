use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use tagtree_tui::config::{load_config, Config};
use tagtree_tui::{App, EventHandler};

fn main() -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let config = load_config(&PathBuf::from("tagtree.toml"));

    // Create app
    let mut app = App::new("tagtree.db")?;

    // Initialize with sample data if needed
    app.initialize_sample_data()?;

    // Create event handler
    let event_handler = EventHandler::new(250); // 250ms tick rate

    // Main loop
    let result = run_app(&mut terminal, &mut app, &event_handler, &config);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Print result
    if let Err(err) = result {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_handler: &EventHandler,
    config: &Config,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| tagtree_tui::ui::render(f, app))?;

        // Handle events
        let event = event_handler.next()?;
        match event {
            tagtree_tui::Event::Key(key) => {
                tagtree_tui::event::handle_key_event(key, app, config)?;
            }
            tagtree_tui::Event::Tick => {
                // The tick is the projection's idle point
                app.on_tick();
            }
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }
    }

    Ok(())
}
