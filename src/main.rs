use std::io::stdout;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType};
use crossterm::{cursor, execute};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{error, info};

use shopfloor::api::{ApiClient, ApiError};
use shopfloor::auth;
use shopfloor::config::Config;
use shopfloor::refresh::RefreshTask;
use shopfloor::tracker::JobProgressTracker;
use shopfloor::ui::{self, JobScreen, ScreenCommand};

#[tokio::main]
async fn main() -> Result<()> {
    Config::init();

    std::fs::create_dir_all("logs").context("Failed to create logs directory")?;
    let file_appender = tracing_appender::rolling::daily("logs", "shopfloor.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // The TUI owns stdout, so logs go to a file.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .with_ansi(false)
        .with_writer(non_blocking)
        .init();

    let assignment_id: i64 = std::env::args()
        .nth(1)
        .context("usage: shopfloor <assignment-id>")?
        .parse()
        .context("assignment id must be an integer")?;

    let config = Config::get();
    let user = auth::current_user_from_token(&config.auth_token)
        .context("Stored auth token was rejected")?;
    info!(
        employee_id = user.employee_id,
        username = %user.username,
        "🔑 Authenticated from stored token"
    );

    let client = ApiClient::new(
        &config.api_base_url,
        &config.auth_token,
        config.request_timeout(),
    )
    .context("Failed to build backend client")?;

    match JobProgressTracker::load(client, user, assignment_id).await {
        Ok(tracker) => run_tui(tracker, config.refresh_interval()).await,
        Err(e) => {
            error!(assignment_id, %e, "initial job load failed");
            run_load_failure(assignment_id, &e)?;
            Err(e).context("initial job load failed")
        }
    }
}

async fn run_tui(mut tracker: JobProgressTracker, refresh_period: Duration) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), cursor::Hide)
        .context("Failed to clear terminal and hide cursor")?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut refresh = RefreshTask::spawn(refresh_period);
    let mut screen = JobScreen::new();
    info!("🖥️ Job screen opened");

    loop {
        tracker.clear_expired_banner();
        terminal.draw(|frame| ui::render(frame, &tracker, &screen))?;

        if refresh.try_tick() {
            // Periodic re-fetch; a failure raises its own banner.
            let _ = tracker.refresh().await;
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let actions = tracker.actions();
                match screen.handle_key(key.code, &actions) {
                    ScreenCommand::Quit => break,
                    ScreenCommand::StartWork => {
                        let _ = tracker.start_work().await;
                    }
                    ScreenCommand::FinishWork => {
                        let _ = tracker.finish_work().await;
                    }
                    ScreenCommand::CompleteJob => {
                        let _ = tracker.complete_job().await;
                    }
                    ScreenCommand::AddCost { amount, note } => {
                        let _ = tracker.add_cost(amount, &note).await;
                    }
                    ScreenCommand::AddNote { text } => {
                        let _ = tracker.add_note(&text).await;
                    }
                    ScreenCommand::Refresh => {
                        let _ = tracker.refresh().await;
                    }
                    ScreenCommand::None => {}
                }
            }
        }
    }

    refresh.cancel();
    restore_terminal(&mut terminal)?;
    info!("🖥️ Job screen closed");
    Ok(())
}

/// Blocking full-page error for a failed initial load; exits on the
/// first key press with no partial data rendered.
fn run_load_failure(assignment_id: i64, error: &ApiError) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut out = stdout();
    execute!(out, Clear(ClearType::All), cursor::Hide)
        .context("Failed to clear terminal and hide cursor")?;
    let backend = CrosstermBackend::new(out);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    loop {
        terminal.draw(|frame| ui::render_load_failure(frame, assignment_id, error))?;
        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    break;
                }
            }
        }
    }

    restore_terminal(&mut terminal)
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        Clear(ClearType::All),
        cursor::Show
    )
    .context("Failed to restore terminal")?;
    Ok(())
}
