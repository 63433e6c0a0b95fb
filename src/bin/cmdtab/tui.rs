use std::io;
use std::process::ExitCode;

use crossterm::event::{
    DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use log::{debug, error};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use cmdtab::config_file::ConfigStore;
use cmdtab::tui::app::App;
use cmdtab::tui::log_state::LogBuffer;

/// Launch the interactive TUI.
///
/// # Errors
///
/// Returns an error if terminal setup or the event loop fails.
pub async fn run(
    store: ConfigStore,
    log_file: Option<String>,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    // Initialize the log buffer and custom logger
    let log_buffer = LogBuffer::new();
    let log_file = log_file.as_ref().map(std::fs::File::create).transpose()?;
    cmdtab::logger::init(log_buffer.clone(), log_file)?;

    let loaded = store.load();

    // Install panic hook that restores the terminal before printing the panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic_info);
    }));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(store, loaded, log_buffer);

    // Connect the logger to the app's event channel for redraw notifications
    cmdtab::logger::connect_event_sender(app.event_tx.clone());

    let result = run_event_loop(&mut terminal, &mut app).await;

    // Cleanup terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        error!("Application error: {e}");
        eprintln!("Error: {e}");
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut event_stream = EventStream::new();
    let mut form_area = ratatui::layout::Rect::default();
    let mut needs_render = true;

    loop {
        if needs_render {
            terminal.draw(|frame| form_area = app.render(frame))?;
            needs_render = false;
        }

        if app.should_quit {
            break;
        }

        tokio::select! {
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                        needs_render = true;
                        app.handle_key(key);
                    }
                    Some(Ok(Event::Mouse(mouse))) => {
                        // Only re-render for move events if hover state changed
                        if matches!(mouse.kind, MouseEventKind::Moved) {
                            let old_hover = app.toolbar.hover;
                            app.handle_mouse(mouse, form_area);
                            needs_render = app.toolbar.hover != old_hover;
                        } else {
                            needs_render = true;
                            app.handle_mouse(mouse, form_area);
                        }
                    }
                    Some(Ok(Event::Resize(_w, _h))) => needs_render = true,
                    Some(Err(e)) => {
                        error!("Event error: {e}");
                        break;
                    }
                    None => break,
                    _ => {}
                }
            }
            // Log updates
            maybe_app_event = app.event_rx.recv() => {
                if let Some(app_event) = maybe_app_event {
                    needs_render = app.show_logs;
                    app.handle_app_event(app_event);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Received Ctrl+C signal");
                break;
            }
        }
    }

    Ok(())
}
