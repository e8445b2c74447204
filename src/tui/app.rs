//! TUI application state - App struct and all its methods.

use std::time::{Duration, Instant};

use ratatui::layout::{Position, Rect};

use super::state::{Action, ActivePanel};
use crate::dom::NodeId;
use crate::model::Summary;
use crate::view::{ClickEvent, Expansion, Outcome, ReportView};

/// Duration to show status messages.
const STATUS_MESSAGE_DURATION: Duration = Duration::from_secs(3);

/// A screen area that maps back to a UI-tree node, recorded while drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitRegion {
    pub area: Rect,
    pub node: NodeId,
}

/// Main application state for the TUI.
pub struct App {
    /// The report view driven by this app.
    pub(super) view: ReportView,
    /// Panel receiving keyboard navigation.
    pub(super) active_panel: ActivePanel,
    /// Focused group selector.
    pub(super) group_cursor: usize,
    /// Focused case row.
    pub(super) row_cursor: usize,
    /// First visible line of the case list.
    pub(super) scroll: u16,
    /// Hit regions from the last drawn frame, used for mouse clicks.
    pub(super) hits: Vec<HitRegion>,
    /// Status message to display (with expiration time).
    status_message: Option<(String, Instant)>,
}

impl App {
    /// Creates a new [`App`] over a mounted view.
    pub const fn new(view: ReportView) -> Self {
        Self {
            view,
            active_panel: ActivePanel::Groups,
            group_cursor: 0,
            row_cursor: 0,
            scroll: 0,
            hits: Vec::new(),
            status_message: None,
        }
    }

    pub fn summary(&self) -> Summary {
        self.view.store().summary()
    }

    /// Applies a key action. Returns `false` when the app should exit.
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::SwitchPanel => self.active_panel = self.active_panel.toggle(),
            Action::Left => self.group_cursor = self.group_cursor.saturating_sub(1),
            Action::Right => {
                let max = self.view.group_selectors().len().saturating_sub(1);
                self.group_cursor = (self.group_cursor + 1).min(max);
            }
            Action::Up => self.select_previous(),
            Action::Down => self.select_next(),
            Action::Click => self.click_focused(false),
            Action::ShiftClick => self.click_focused(true),
        }
        true
    }

    fn select_previous(&mut self) {
        match self.active_panel {
            ActivePanel::Groups => self.group_cursor = self.group_cursor.saturating_sub(1),
            ActivePanel::Cases => self.row_cursor = self.row_cursor.saturating_sub(1),
        }
    }

    fn select_next(&mut self) {
        match self.active_panel {
            ActivePanel::Groups => {
                let max = self.view.group_selectors().len().saturating_sub(1);
                self.group_cursor = (self.group_cursor + 1).min(max);
            }
            ActivePanel::Cases => {
                let max = self.view.rows().len().saturating_sub(1);
                self.row_cursor = (self.row_cursor + 1).min(max);
            }
        }
    }

    /// Element that keyboard clicks land on.
    pub fn focused_target(&self) -> Option<NodeId> {
        let focused = match self.active_panel {
            ActivePanel::Groups => self.view.group_selectors().get(self.group_cursor),
            ActivePanel::Cases => self.view.rows().get(self.row_cursor),
        };
        focused.copied()
    }

    pub fn click_focused(&mut self, shift_key: bool) {
        let target = self.focused_target();
        self.click(ClickEvent { target, shift_key });
    }

    /// Hit-tests a mouse click against the last frame and dispatches it.
    pub fn click_at(&mut self, column: u16, row: u16, shift_key: bool) {
        let position = Position::new(column, row);
        let Some(hit) = self.hits.iter().find(|h| h.area.contains(position)) else {
            return;
        };
        let event = if shift_key {
            ClickEvent::shift(hit.node)
        } else {
            ClickEvent::on(hit.node)
        };
        self.click(event);
    }

    fn click(&mut self, event: ClickEvent) {
        match self.view.dispatch(event) {
            Outcome::Ignored => {}
            Outcome::GroupSelected { group, expanded } => {
                self.group_cursor = group;
                self.row_cursor = 0;
                self.scroll = 0;
                let cases = self.view.rows().len();
                self.set_status(format!(
                    "Group {group}: {cases} case(s), {expanded} expanded"
                ));
            }
            Outcome::Toggled {
                group,
                index,
                expansion,
            } => {
                self.row_cursor = index;
                let name = self
                    .view
                    .store()
                    .case(group, index)
                    .map_or_else(String::new, |c| c.name.clone());
                let verb = match expansion {
                    Expansion::Expanded => "expanded",
                    Expansion::Collapsed => "collapsed",
                };
                self.set_status(format!("{name} {verb}"));
            }
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_ref().and_then(|(msg, created)| {
            if created.elapsed() < STATUS_MESSAGE_DURATION {
                Some(msg.as_str())
            } else {
                None
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::store;
    use crate::view::{detail, ViewConfig};

    fn app() -> App {
        App::new(ReportView::mount(store(), ViewConfig::default()))
    }

    fn expanded(app: &App) -> usize {
        app.view
            .rows()
            .iter()
            .filter(|r| detail::is_expanded(app.view.document(), **r))
            .count()
    }

    #[test]
    fn app_new_initializes_correctly() {
        let app = app();
        assert_eq!(app.active_panel, ActivePanel::Groups);
        assert_eq!(app.group_cursor, 0);
        assert!(app.hits.is_empty());
        assert_eq!(app.summary().failed, 1);
    }

    #[test]
    fn app_quit() {
        let mut app = app();
        assert!(app.apply(Action::Right));
        assert!(!app.apply(Action::Quit));
    }

    #[test]
    fn app_group_navigation_is_clamped() {
        let mut app = app();
        app.apply(Action::Left);
        assert_eq!(app.group_cursor, 0);
        for _ in 0..5 {
            app.apply(Action::Right);
        }
        assert_eq!(app.group_cursor, 2);
    }

    #[test]
    fn app_keyboard_click_selects_group() {
        let mut app = app();
        app.apply(Action::Right);
        app.apply(Action::Click);
        assert_eq!(app.view.selected_group(), Some(1));
        assert_eq!(expanded(&app), 1);
        assert_eq!(app.status_message(), Some("Group 1: 1 case(s), 1 expanded"));
    }

    #[test]
    fn app_shift_click_then_toggle_row() {
        let mut app = app();
        app.apply(Action::ShiftClick);
        assert_eq!(expanded(&app), 3);

        app.apply(Action::SwitchPanel);
        app.apply(Action::Down);
        app.apply(Action::Click);
        assert_eq!(expanded(&app), 2);
        assert_eq!(app.row_cursor, 1);
        assert_eq!(app.status_message(), Some("TestBeta collapsed"));
    }

    #[test]
    fn app_row_navigation_is_clamped() {
        let mut app = app();
        app.apply(Action::Click);
        app.apply(Action::SwitchPanel);
        for _ in 0..10 {
            app.apply(Action::Down);
        }
        assert_eq!(app.row_cursor, 2);
        app.apply(Action::Up);
        assert_eq!(app.row_cursor, 1);
    }

    #[test]
    fn app_mouse_click_uses_hit_regions() {
        let mut app = app();
        let selector = app.view.group_selectors()[2];
        app.hits.push(HitRegion {
            area: Rect::new(10, 2, 6, 1),
            node: selector,
        });
        app.click_at(0, 0, false);
        assert_eq!(app.view.selected_group(), None);
        app.click_at(12, 2, true);
        assert_eq!(app.view.selected_group(), Some(2));
        assert_eq!(app.group_cursor, 2);
        assert_eq!(expanded(&app), 2);
    }

    #[test]
    fn app_click_with_empty_case_list_is_ignored() {
        let mut app = app();
        app.apply(Action::SwitchPanel);
        assert_eq!(app.focused_target(), None);
        app.apply(Action::Click);
        assert_eq!(app.view.selected_group(), None);
        assert_eq!(app.status_message(), None);
    }

    #[test]
    fn app_status_message() {
        let mut app = app();
        app.set_status("Test");
        assert_eq!(app.status_message(), Some("Test"));
    }
}
