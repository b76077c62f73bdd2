use chrono::Local;
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};

use tidyup::{
    config::{Config, ConfigStore, FileConfigStore},
    history::{History, HistoryRecord, HistorySummary, Outcome},
    runtime::{CrosstermEventSource, FixedTicker, Runner, TermEvent, TermEventSource, Ticker},
    scene::Scene,
    session::{GameSession, Phase},
    ui::{self, Hit},
};

const TICK_RATE_MS: u64 = 100;

/// frantic meeting-room cleanup game for your terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Click away the party debris before the client walks in. Items must go in a fixed order, the clock is short, and the bar at the bottom tells you what has to go next."
)]
pub struct Cli {
    /// seconds on the clock before the client arrives
    #[clap(short = 's', long)]
    seconds: Option<u64>,

    /// room to tidy up
    #[clap(short = 'r', long)]
    room: Option<String>,
}

/// Effective settings after the config file and the CLI have had their say
fn resolve_settings(cli: &Cli, config: &Config) -> (u64, String) {
    let time_limit = cli.seconds.unwrap_or(config.time_limit_secs);
    let room = cli.room.clone().unwrap_or_else(|| config.room.clone());
    (time_limit, room)
}

#[derive(Debug)]
pub struct App {
    pub session: GameSession,
    pub history: Option<History>,
    pub summary: Option<HistorySummary>,
    recorded: bool,
}

impl App {
    pub fn new(
        time_limit: u64,
        room: &str,
        seed: u64,
        history: Option<History>,
    ) -> Result<Self, Box<dyn Error>> {
        let scene = Scene::load(room, seed)?;
        let summary = history.as_ref().and_then(|h| h.summary());

        Ok(Self {
            session: GameSession::new(scene, time_limit),
            history,
            summary,
            recorded: false,
        })
    }

    /// Book-keeping after every session mutation: log the round the moment
    /// it ends, clear the marker once the next round is underway.
    pub fn after_event(&mut self) {
        match self.session.phase() {
            Phase::Won | Phase::Lost => self.record_round(),
            Phase::Running => self.recorded = false,
            _ => {}
        }
    }

    fn record_round(&mut self) {
        if self.recorded {
            return;
        }
        self.recorded = true;

        let outcome = if self.session.phase() == Phase::Won {
            Outcome::Won
        } else {
            Outcome::Lost
        };
        let record = HistoryRecord {
            finished_at: Local::now(),
            room: self.session.scene().name().to_string(),
            outcome,
            points: self.session.points(),
            total: self.session.total(),
            time_limit_secs: self.session.time_limit(),
            elapsed_secs: self.session.elapsed_secs(),
        };

        // a missing or unwritable log never interrupts play
        if let Some(history) = &self.history {
            let _ = history.append(&record);
            self.summary = history.summary();
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config = FileConfigStore::new().load();
    let (time_limit, room) = resolve_settings(&cli, &config);

    let mut app = match App::new(time_limit, &room, rand::random(), History::new()) {
        Ok(app) => app,
        Err(e) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, e.to_string()).exit();
        }
    };

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen,
    )?;
    terminal.show_cursor()?;

    result
}

fn run_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let events = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    run_loop(terminal, app, &events)
}

/// The event loop proper, generic over the event source so tests can drive
/// it without a terminal attached.
fn run_loop<B: Backend, E: TermEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &Runner<E, T>,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui::draw(f, &app.session, app.summary.as_ref()))?;

        match events.step() {
            TermEvent::Tick => {
                app.session.advance(Instant::now());
                app.after_event();
            }
            TermEvent::Resize => {}
            TermEvent::Click { x, y } => {
                let size = terminal.size().unwrap_or_default();
                let area = Rect::new(0, 0, size.width, size.height);
                match ui::hit_test(area, &app.session, app.summary.as_ref(), x, y) {
                    Some(Hit::Item(id)) => {
                        app.session.on_item_clicked(&id);
                        app.after_event();
                    }
                    Some(Hit::DialogButton) => {
                        app.session.on_dialog_button(Instant::now());
                        app.after_event();
                    }
                    None => {}
                }
            }
            TermEvent::Key(key) => match key.code {
                KeyCode::Esc => break,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Char('p') => app.session.on_pause_requested(),
                KeyCode::Char('h') => app.session.on_help_requested(),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    if app.session.dialog().is_some() {
                        app.session.on_dialog_button(Instant::now());
                        app.after_event();
                    }
                }
                _ => {}
            },
        }
    }

    Ok(())
}
