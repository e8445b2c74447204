//! TUI state types - active panel, key actions and colour mapping.

use std::str::FromStr;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::style::Color;

// ─────────────────────────────────────────────────────────────────────────────
// Active Panel
// ─────────────────────────────────────────────────────────────────────────────

/// The panel that receives keyboard navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivePanel {
    /// The group selector grid.
    #[default]
    Groups,
    /// The case list with its detail panels.
    Cases,
}

impl ActivePanel {
    /// Switch to the other panel.
    pub const fn toggle(self) -> Self {
        match self {
            Self::Groups => Self::Cases,
            Self::Cases => Self::Groups,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Key Actions
// ─────────────────────────────────────────────────────────────────────────────

/// What a key press asks the app to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    SwitchPanel,
    Left,
    Right,
    Up,
    Down,
    /// Click the focused element.
    Click,
    /// Shift-click the focused element.
    ShiftClick,
}

/// Maps a key press to an action.
pub fn key_action(code: KeyCode, modifiers: KeyModifiers) -> Option<Action> {
    let action = match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Tab | KeyCode::BackTab => Action::SwitchPanel,
        KeyCode::Left | KeyCode::Char('h') => Action::Left,
        KeyCode::Right | KeyCode::Char('l') => Action::Right,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        KeyCode::Enter if modifiers.contains(KeyModifiers::SHIFT) => Action::ShiftClick,
        KeyCode::Char('a' | 'A') => Action::ShiftClick,
        KeyCode::Enter | KeyCode::Char(' ') => Action::Click,
        _ => return None,
    };
    Some(action)
}

// ─────────────────────────────────────────────────────────────────────────────
// Colours
// ─────────────────────────────────────────────────────────────────────────────

/// Converts a stylesheet colour (`"red"`, `"#33aa33"`) into a terminal colour.
pub fn css_color(value: Option<&str>) -> Color {
    value
        .and_then(|v| Color::from_str(v).ok())
        .unwrap_or(Color::Reset)
}

/// Readable foreground for text drawn on `background`.
pub const fn contrast_fg(background: Color) -> Color {
    match background {
        Color::Black | Color::Red | Color::Blue | Color::Magenta | Color::DarkGray => {
            Color::White
        }
        _ => Color::Black,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_panel_toggles() {
        assert_eq!(ActivePanel::Groups.toggle(), ActivePanel::Cases);
        assert_eq!(ActivePanel::Cases.toggle(), ActivePanel::Groups);
        assert_eq!(ActivePanel::default(), ActivePanel::Groups);
    }

    #[test]
    fn enter_clicks_and_shift_enter_expands_all() {
        assert_eq!(
            key_action(KeyCode::Enter, KeyModifiers::NONE),
            Some(Action::Click)
        );
        assert_eq!(
            key_action(KeyCode::Enter, KeyModifiers::SHIFT),
            Some(Action::ShiftClick)
        );
        assert_eq!(
            key_action(KeyCode::Char('a'), KeyModifiers::NONE),
            Some(Action::ShiftClick)
        );
        assert_eq!(
            key_action(KeyCode::Char(' '), KeyModifiers::NONE),
            Some(Action::Click)
        );
    }

    #[test]
    fn navigation_keys() {
        assert_eq!(key_action(KeyCode::Char('j'), KeyModifiers::NONE), Some(Action::Down));
        assert_eq!(key_action(KeyCode::Up, KeyModifiers::NONE), Some(Action::Up));
        assert_eq!(key_action(KeyCode::Char('h'), KeyModifiers::NONE), Some(Action::Left));
        assert_eq!(key_action(KeyCode::Right, KeyModifiers::NONE), Some(Action::Right));
        assert_eq!(key_action(KeyCode::Tab, KeyModifiers::NONE), Some(Action::SwitchPanel));
        assert_eq!(key_action(KeyCode::Esc, KeyModifiers::NONE), Some(Action::Quit));
        assert_eq!(key_action(KeyCode::Char('z'), KeyModifiers::NONE), None);
    }

    #[test]
    fn css_colors() {
        assert_eq!(css_color(Some("red")), Color::Red);
        assert_eq!(css_color(Some("black")), Color::Black);
        assert_eq!(css_color(Some("#102030")), Color::Rgb(0x10, 0x20, 0x30));
        assert_eq!(css_color(Some("not-a-colour")), Color::Reset);
        assert_eq!(css_color(None), Color::Reset);
    }

    #[test]
    fn contrast_on_dark_backgrounds() {
        assert_eq!(contrast_fg(Color::Black), Color::White);
        assert_eq!(contrast_fg(Color::Green), Color::Black);
    }
}
