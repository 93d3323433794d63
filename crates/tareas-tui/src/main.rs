use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;

mod api;
mod app;
mod ui;
mod voice;

use api::{ApiClient, SessionToken};
use app::{App, AppEvent};
use voice::Transcriber;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args: Vec<String> = std::env::args().collect();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--save-token" => {
                if i + 1 < args.len() {
                    let token = SessionToken {
                        token: args[i + 1].clone(),
                    };
                    token.save()?;
                    println!("Session token saved.");
                    return Ok(());
                } else {
                    eprintln!("Error: --save-token requires a token argument");
                    std::process::exit(1);
                }
            }
            "--help" | "-h" => {
                println!("Usage: tareas-tui [OPTIONS]");
                println!();
                println!("Options:");
                println!("  --save-token <TOKEN>  Store a session token for later runs");
                println!("  --help, -h            Show this help message");
                return Ok(());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                std::process::exit(1);
            }
        }
    }

    // Get server URL from environment
    let server_url = std::env::var("TAREAS_SERVER_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());

    let mut api = ApiClient::new(&server_url);
    let has_token = api.load_token().unwrap_or(false);
    if !has_token {
        eprintln!("No session token found.");
        eprintln!("Set TAREAS_SESSION_TOKEN or run: tareas-tui --save-token <TOKEN>");
        std::process::exit(1);
    }

    let transcriber = std::env::var("TRANSCRIBE_WEBHOOK_URL")
        .ok()
        .filter(|url| !url.is_empty())
        .map(|url| Transcriber::new(&url));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let app = App::new(api, transcriber);
    let res = run_app(&mut terminal, app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> Result<()> {
    // Create event channel
    let (tx, mut rx) = mpsc::channel::<AppEvent>(100);

    // Spawn input handler
    let tx_input = tx.clone();
    tokio::spawn(async move {
        loop {
            if event::poll(Duration::from_millis(100)).unwrap_or(false) {
                if let Ok(Event::Key(key)) = event::read() {
                    if key.kind == KeyEventKind::Press {
                        let _ = tx_input.send(AppEvent::Key(key)).await;
                    }
                }
            }
            // Send tick events for UI refresh
            let _ = tx_input.send(AppEvent::Tick).await;
        }
    });

    app.load_tasks().await;

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        if let Some(event) = rx.recv().await {
            match event {
                AppEvent::Key(key) => {
                    if app.handle_key(key).await? {
                        return Ok(());
                    }
                }
                AppEvent::Tick => {
                    // Just refresh UI
                }
            }
        }
    }
}
