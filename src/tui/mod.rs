// TUI module - terminal user interface
//
// Manages the terminal with ratatui: init and cleanup, the event loop
// (keyboard, mouse, timer ticks), rendering, and applying worker events to
// the app state. Pointer gestures arrive as crossterm mouse events in cell
// coordinates and are converted to logical pixels before the interaction
// layer sees them.

pub mod app;
pub mod components;
pub mod input;
pub mod ui;

use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::interaction::Point;
use crate::worker::UiEvent;
use app::{App, Tab};

/// Logical pixels per terminal cell. Gesture thresholds are defined in
/// pixels, so with 8 px per column a full reveal spans 9 columns and the
/// snap threshold sits 4.5 columns in.
pub const CELL_W_PX: f32 = 8.0;
pub const CELL_H_PX: f32 = 16.0;

/// Convert a cell position to a logical-pixel pointer position.
pub fn cell_point(column: u16, row: u16) -> Point {
    Point::new(f32::from(column) * CELL_W_PX, f32::from(row) * CELL_H_PX)
}

/// Set up the terminal, run the event loop, and clean up when done.
pub async fn run_tui(mut app: App, mut event_rx: mpsc::Receiver<UiEvent>) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let result = run_event_loop(&mut terminal, &mut app, &mut event_rx).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_rx: &mut mpsc::Receiver<UiEvent>,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(200));

    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            // Keyboard and mouse input
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key_event)) => handle_key_event(app, key_event),
                        Ok(Event::Mouse(mouse_event)) => handle_mouse_event(app, mouse_event),
                        // Mid-gesture interruptions run full cancel cleanup
                        Ok(Event::FocusLost) => app.cancel_gestures(),
                        _ => {}
                    }
                }
            } => {}

            // Periodic tick: expire toasts, redraw
            _ = tick_interval.tick() => {
                app.tick();
            }

            // Worker events
            Some(ui_event) = event_rx.recv() => {
                app.apply_event(ui_event);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key_event(app: &mut App, key_event: KeyEvent) {
    let key = key_event.code;
    match key_event.kind {
        KeyEventKind::Press => {
            if !app.keys.press(key) {
                return;
            }
            match key {
                KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
                KeyCode::Tab => app.set_tab(app.tab.next()),
                KeyCode::BackTab => app.set_tab(app.tab.prev()),
                KeyCode::Char('1') => app.set_tab(Tab::Missions),
                KeyCode::Char('2') => app.set_tab(Tab::Goals),
                KeyCode::Char('3') => app.set_tab(Tab::Habits),
                KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
                KeyCode::Down | KeyCode::Char('j') => app.select_next(),
                KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected(),
                KeyCode::Char('+') | KeyCode::Char('=') => app.step_selected(1),
                KeyCode::Char('-') => app.step_selected(-1),
                KeyCode::Char('d') => app.delete_or_reveal_selected(),
                KeyCode::Char('r') => app.request_reload(),
                KeyCode::Char('L') => app.show_logs = !app.show_logs,
                KeyCode::Esc => app.escape(),
                _ => {}
            }
        }
        KeyEventKind::Release => app.keys.release(key),
        _ => {}
    }
}

fn handle_mouse_event(app: &mut App, mouse_event: MouseEvent) {
    match mouse_event.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            app.pointer_down(mouse_event.column, mouse_event.row);
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.pointer_drag(mouse_event.column, mouse_event.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.pointer_up();
        }
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_mapping_puts_a_full_reveal_at_nine_columns() {
        let a = cell_point(40, 3);
        let b = cell_point(31, 3);
        assert_eq!(a.x - b.x, crate::interaction::REVEAL_WIDTH);
        assert_eq!(a.y, 48.0);
    }
}
