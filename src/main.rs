use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, WriteLogger};

use folio::app::{App, run_app_with_event_source};
use folio::event_source::TerminalEventSource;
use folio::history::ReadingHistory;
use folio::library::Library;
use folio::settings::Settings;

#[derive(Parser)]
#[command(name = "folio", version, about = "Terminal magazine/document viewer")]
struct Cli {
    /// Directory to scan for documents (defaults to the current directory)
    dir: Option<PathBuf>,

    /// Settings file location
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log verbosity written to folio.log
    #[arg(long, default_value = "info")]
    log_level: log::LevelFilter,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    WriteLogger::init(cli.log_level, Config::default(), File::create("folio.log")?)?;
    info!("starting folio");

    let settings = Settings::load(cli.config.as_deref());
    let history = ReadingHistory::load_or_ephemeral(settings.history_path());
    let library = Library::scan(&cli.dir.unwrap_or_else(|| PathBuf::from(".")));

    // Terminal initialization
    enable_raw_mode()?;
    let mut out = stdout();
    execute!(out, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(library, &settings, history);
    let mut events = TerminalEventSource;
    let result = run_app_with_event_source(&mut terminal, &mut app, &mut events);

    // Restore terminal on every exit path
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        error!("application error: {err:?}");
        println!("{err:?}");
    }
    result
}
