//! TUI interface using ratatui
//!
//! Interactive terminal host for a report view.
//! - Group selectors drawn as coloured cells; the selected one is highlighted
//! - Case list with expandable detail panels (console output, package)
//! - Keyboard: arrows/hjkl to move, Enter to click, `a` or Shift+Enter to expand all
//! - Mouse: left click, with Shift for expand-all on groups

mod app;
mod draw;
mod state;

use std::io::{self, stdout};
use std::time::Duration;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind, KeyModifiers,
        MouseButton, MouseEventKind,
    },
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;

use crate::view::ReportView;
use app::App;
use draw::draw_ui;
use state::key_action;

/// Runs the TUI interface. Returns `true` when no case in the report failed.
pub fn run(view: ReportView) -> anyhow::Result<bool> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut app = App::new(view);
    let result = run_app(&mut terminal, &mut app);
    let _ = stdout().execute(DisableMouseCapture);
    let _ = disable_raw_mode();
    let _ = stdout().execute(LeaveAlternateScreen);
    result.map(|()| app.summary().failed == 0)
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|frame| draw_ui(frame, app))?;
        if !event::poll(Duration::from_millis(250))? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                if let Some(action) = key_action(key.code, key.modifiers) {
                    tracing::trace!(?action, "key");
                    if !app.apply(action) {
                        return Ok(());
                    }
                }
            }
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let shift = mouse.modifiers.contains(KeyModifiers::SHIFT);
                app.click_at(mouse.column, mouse.row, shift);
            }
            _ => {}
        }
    }
}
