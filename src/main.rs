mod app;
mod chain;
mod config;
mod drag;
mod geometry;
mod scale;
mod selection;
mod theory;
mod ui;
mod visualizer;

use anyhow::{Context, Result};
use app::App;
use config::Config;
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event, KeyCode, KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{fs, io, path::Path, sync::Mutex, time::Duration};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reported before raw mode so the message stays readable; the app runs unlogged.
    if let Err(e) = init_logging() {
        eprintln!("Logging disabled: {e:#}");
    }

    let config = Config::load_or_default();
    info!("[main] starting with key {:?}, {} view", config.key, config.mode.name());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut app = App::new(&config);
    let result = run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableFocusChange, LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    if let Err(e) = result {
        error!("[main] {e:?}");
        eprintln!("Error: {:?}", e);
    }
    Ok(())
}

fn open_log(dir: &Path) -> Result<fs::File> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let path = dir.join("octave-tui.log");
    fs::File::create(&path).with_context(|| format!("creating {}", path.display()))
}

fn init_logging() -> Result<()> {
    let file = open_log(&config::config_dir())?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("installing tracing subscriber")
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    // Global quit
                    KeyCode::Esc | KeyCode::Char('q') => app.should_quit = true,
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.should_quit = true
                    }

                    // View, key, chord
                    KeyCode::Tab | KeyCode::F(2) => app.toggle_mode(),
                    KeyCode::Right               => app.next_key(),
                    KeyCode::Left                => app.prev_key(),
                    KeyCode::Char('c')           => app.cycle_chord(),

                    // Selection
                    KeyCode::Backspace | KeyCode::Delete => app.clear_selection(),
                    KeyCode::Char(c)                     => app.select_degree(c),

                    _ => {}
                },
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                Event::FocusLost    => app.focus_lost(),
                _ => {}
            }
        }
        if app.should_quit { break; }
    }
    Ok(())
}
