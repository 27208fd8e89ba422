//! ad-dashboard binary entry point.
//!
//! Reads settings, starts logging and the tokio runtime, then runs the TUI
//! event loop and restores the terminal state on exit.
//!
use std::sync::Arc;

use ad_dashboard::api::{DirectoryApi, HttpApi};
use ad_dashboard::app::keymap::Keymap;
use ad_dashboard::app::worker::Worker;
use ad_dashboard::app::{self, AppState, Theme};
use ad_dashboard::config::{Cli, Command, Settings};
use ad_dashboard::{Result, logging};
use anyhow::{Context, bail};
use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

/// Initialize a Crossterm-backed `ratatui` terminal in raw mode.
fn init_terminal() -> Result<Terminal<CrosstermBackend<std::io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn register(runtime: &tokio::runtime::Runtime, api: &HttpApi, settings: &Settings, name: &str) -> Result<()> {
    let (Some(email), Some(password)) = (&settings.email, &settings.password) else {
        bail!("register needs --email and --password");
    };
    let reply = runtime.block_on(api.register(name, email, password))?;
    if reply.success {
        println!("{}", reply.message_or("Registration successful"));
        Ok(())
    } else {
        bail!(reply.message_or("Registration failed"))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load_or_init(&cli.config);
    settings.apply_cli(&cli);
    logging::init(&settings.log_file)?;
    tracing::info!(base_url = %settings.base_url, "starting ad-dashboard");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    let api = HttpApi::new(&settings.base_url, settings.request_timeout())?;

    if let Some(Command::Register { name }) = &cli.command {
        return register(&runtime, &api, &settings, name);
    }

    let theme = Theme::load_or_init(&settings.theme_file);
    let keymap = Keymap::load_or_init(&settings.keybinds_file);
    let mut state = AppState::new(theme, keymap, settings.timings());
    state.start(settings.credentials());

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let api: Arc<dyn DirectoryApi> = Arc::new(api);
    let worker = Worker::new(runtime.handle().clone(), api, tx);

    let mut terminal = init_terminal().context("init terminal")?;

    let res = app::run(&mut terminal, &mut state, &worker, &mut rx);

    disable_raw_mode().ok();
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture).ok();
    terminal.show_cursor().ok();

    if let Err(err) = res {
        tracing::error!(%err, "application error");
        eprintln!("application error: {err}");
    }
    Ok(())
}
