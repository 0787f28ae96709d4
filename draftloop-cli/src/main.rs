//! Draftloop CLI - terminal review loop for LLM-drafted proposals

mod client;
mod config;
mod io;
mod ui;

use std::fs::{self, File};
use std::io::stdout;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

use draftloop_core::{finalize, App, Document, Focus, InputTarget, Mode, SectionAction};

use crate::client::ChatClient;
use crate::config::{Config, API_KEY_VAR};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Config file (defaults to ~/.draftloop/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read the initial bid prompt from a file
    #[arg(long)]
    prompt_file: Option<PathBuf>,

    /// Title used for exported files
    #[arg(long, default_value = "Proposal")]
    title: String,

    /// Log verbosity (repeat for more); logs go to ~/.draftloop/draftloop.log
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn setup_logging(verbosity: u8, log_path: &std::path::Path) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbosity {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    let file = File::create(log_path)
        .with_context(|| format!("Failed to create log file {}", log_path.display()))?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let dir = io::draftloop_dir()?;
    setup_logging(cli.verbose, &dir.join("draftloop.log"))?;

    let config_path = cli.config.clone().unwrap_or_else(|| dir.join("config.toml"));
    let config = Config::load(&config_path)?.with_env_key(std::env::var(API_KEY_VAR).ok());
    let client = ChatClient::new(&config).context("Failed to create HTTP client")?;

    // Create app
    let mut app = App::new();
    app.document = Document::new(cli.title.clone()).with_policy(config.annotation_policy);
    if let Some(path) = &cli.prompt_file {
        app.prompt = fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt file: {}", path.display()))?;
    }
    if config.api_key.is_none() {
        app.warn(&format!("No API key: set {API_KEY_VAR} or api_key in {}", config_path.display()));
    } else {
        app.set_status("Press 'g' to generate a draft, '?' for help");
    }
    tracing::info!(config = %config_path.display(), "draftloop v{}", env!("CARGO_PKG_VERSION"));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app, &client, &dir);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = res {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    client: &ChatClient,
    dir: &std::path::Path,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| ui::draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match app.mode {
                Mode::Normal => {
                    // Service calls block, so say so before the next frame
                    if matches!(key.code, KeyCode::Char('g') | KeyCode::Char('R')) {
                        app.set_status("Waiting for the model...");
                        terminal.draw(|f| ui::draw(f, app))?;
                    }
                    handle_normal_mode(app, key.code, client, dir)
                }
                Mode::Input => handle_input_mode(app, key.code),
                Mode::ColorPicker => handle_color_picker(app, key.code),
                Mode::SectionPicker => {
                    if key.code == KeyCode::Enter {
                        app.set_status("Waiting for the model...");
                        terminal.draw(|f| ui::draw(f, app))?;
                    }
                    handle_section_picker(app, key.code, client)
                }
                Mode::Help => {
                    app.mode = Mode::Normal;
                }
            }
        }
    }
    Ok(())
}

fn handle_normal_mode(app: &mut App, code: KeyCode, client: &ChatClient, dir: &std::path::Path) {
    app.clear_status();

    match code {
        KeyCode::Char('q') => app.running = false,
        KeyCode::Char('?') => app.mode = Mode::Help,

        // Drafting
        KeyCode::Char('p') => app.begin_input(InputTarget::Prompt),
        KeyCode::Char('g') => {
            app.generate(client);
        }
        KeyCode::Char('R') => {
            app.revise(client);
        }
        KeyCode::Char('1') => app.toggle_option(0),
        KeyCode::Char('2') => app.toggle_option(1),
        KeyCode::Char('3') => app.toggle_option(2),

        // Review
        KeyCode::Char('h') => {
            app.color_selected = 0;
            app.begin_input(InputTarget::Highlight);
        }
        KeyCode::Char('a') => app.begin_input(InputTarget::Correction),
        KeyCode::Char('x') => app.begin_input(InputTarget::Removal),
        KeyCode::Char('c') => app.begin_input(InputTarget::ReplaceFind),
        KeyCode::Char('s') => app.begin_input(InputTarget::Section),
        KeyCode::Char('d') => {
            app.delete_selected_annotation();
        }

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => {
            if app.focus == Focus::Draft {
                app.scroll_down();
            } else {
                app.next_annotation();
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if app.focus == Focus::Draft {
                app.scroll_up();
            } else {
                app.prev_annotation();
            }
        }
        KeyCode::Char(']') => app.next_annotation(),
        KeyCode::Char('[') => app.prev_annotation(),
        KeyCode::Tab => app.toggle_focus(),

        // Export
        KeyCode::Char('e') => export(app, dir),

        _ => {}
    }
}

fn export(app: &mut App, dir: &std::path::Path) {
    if app.document.is_empty() {
        app.warn("Nothing to export yet.");
        return;
    }
    let result = finalize(&app.document, &io::TextFileSink::new(dir)).and_then(|text_path| {
        io::export_rendered(&app.document, dir)?;
        io::export_session(&app.document, dir)?;
        Ok(text_path)
    });
    match result {
        Ok(path) => app.succeed(&format!("Exported to {}", path.display())),
        Err(e) => {
            tracing::error!(error = %e, "export failed");
            app.warn(&format!("Export failed: {}", e));
        }
    }
}

fn handle_input_mode(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.cancel(),
        KeyCode::Enter => {
            app.clear_status();
            app.submit_input();
        }
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) => {
            app.input_buffer.push(c);
        }
        _ => {}
    }
}

fn handle_color_picker(app: &mut App, code: KeyCode) {
    let total = app.color_choices();

    match code {
        KeyCode::Esc => app.cancel(),
        KeyCode::Char('j') | KeyCode::Down => {
            app.color_selected = (app.color_selected + 1) % total;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.color_selected = if app.color_selected == 0 {
                total - 1
            } else {
                app.color_selected - 1
            };
        }
        KeyCode::Enter => app.pick_color(),
        // Quick select
        KeyCode::Char(c @ '1'..='9') => {
            let slot = c as usize - '1' as usize;
            if slot < total {
                app.color_selected = slot;
                app.pick_color();
            }
        }
        _ => {}
    }
}

fn handle_section_picker(app: &mut App, code: KeyCode, client: &ChatClient) {
    let total = SectionAction::all().len();

    match code {
        KeyCode::Esc => app.cancel(),
        KeyCode::Char('j') | KeyCode::Down => {
            app.section_selected = (app.section_selected + 1) % total;
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.section_selected = if app.section_selected == 0 {
                total - 1
            } else {
                app.section_selected - 1
            };
        }
        KeyCode::Enter => {
            app.clear_status();
            app.pick_section_action(client);
        }
        _ => {}
    }
}
