//! TUI drawing functions - renders the report view's UI tree.

use super::app::{App, HitRegion};
use super::state::{contrast_fg, css_color, ActivePanel};
use crate::dom::{Document, NodeId};
use crate::view::detail;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// Width of one group cell, in columns.
const GROUP_CELL_WIDTH: u16 = 6;

pub fn draw_ui(frame: &mut Frame, app: &mut App) {
    app.hits.clear();
    let area = frame.area();
    let group_rows = group_grid_rows(app.view.group_selectors().len(), area.width);
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(group_rows.min(8) + 2),
            Constraint::Min(5),
            Constraint::Length(3),
        ])
        .split(area);

    draw_title(frame, main_chunks[0]);
    draw_stats(frame, main_chunks[1], app);
    draw_groups(frame, main_chunks[2], app);
    draw_cases(frame, main_chunks[3], app);
    draw_footer(frame, main_chunks[4], app);
}

fn group_grid_rows(groups: usize, width: u16) -> u16 {
    let per_row = usize::from((width.saturating_sub(2) / (GROUP_CELL_WIDTH + 1)).max(1));
    u16::try_from(groups.div_ceil(per_row).max(1)).unwrap_or(u16::MAX)
}

fn panel_block(title: &str, active: bool) -> Block<'_> {
    let border_style = if active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(border_style)
}

fn draw_title(frame: &mut Frame, area: Rect) {
    let title = Paragraph::new("test-report: Test Execution Report")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, area);
}

fn draw_stats(frame: &mut Frame, area: Rect, app: &App) {
    let summary = app.summary();
    let line = Line::from(vec![
        Span::raw(format!("{} tests: ", summary.total())),
        Span::styled(
            format!("{}", summary.passed),
            Style::default().fg(Color::Green),
        ),
        Span::raw(" pass, "),
        Span::styled(format!("{}", summary.failed), Style::default().fg(Color::Red)),
        Span::raw(" fail, "),
        Span::styled(
            format!("{}", summary.skipped),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(" skip"),
    ]);
    let widget = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(Block::default().title(" Stats ").borders(Borders::ALL));
    frame.render_widget(widget, area);
}

fn draw_groups(frame: &mut Frame, area: Rect, app: &mut App) {
    let active = app.active_panel == ActivePanel::Groups;
    let block = panel_block(" Groups ", active);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let per_row = (inner.width / (GROUP_CELL_WIDTH + 1)).max(1);
    let doc = app.view.document();
    for (i, &selector) in app.view.group_selectors().iter().enumerate() {
        let Ok(i) = u16::try_from(i) else { break };
        let cell = Rect {
            x: inner.x + (i % per_row) * (GROUP_CELL_WIDTH + 1),
            y: inner.y + i / per_row,
            width: GROUP_CELL_WIDTH.min(inner.width),
            height: 1,
        };
        if cell.bottom() > inner.bottom() {
            break;
        }
        let bg = css_color(doc.computed_style(selector, "background-color").as_deref());
        let mut style = Style::default().bg(bg).fg(contrast_fg(bg));
        if active && usize::from(i) == app.group_cursor {
            style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
        }
        let label = doc.attr(selector, "id").unwrap_or_default();
        frame.render_widget(
            Paragraph::new(label.to_string())
                .alignment(Alignment::Center)
                .style(style),
            cell,
        );
        app.hits.push(HitRegion {
            area: cell,
            node: selector,
        });
    }
}

/// One display line of the case list and the node it belongs to.
struct CaseLine {
    line: Line<'static>,
    node: NodeId,
}

fn case_lines(
    doc: &Document,
    rows: &[NodeId],
    cursor: Option<usize>,
) -> (Vec<CaseLine>, Vec<usize>) {
    let mut lines = Vec::new();
    let mut headers = Vec::with_capacity(rows.len());
    for (i, &row) in rows.iter().enumerate() {
        headers.push(lines.len());
        let text_of = |class: &str| {
            doc.query(row, class)
                .map(|n| doc.text_content(n))
                .unwrap_or_default()
        };
        let status_color = css_color(
            doc.query(row, "status")
                .and_then(|n| doc.computed_style(n, "color"))
                .as_deref(),
        );
        let marker = if cursor == Some(i) { "▶ " } else { "  " };
        let fold = if detail::is_expanded(doc, row) { "▾ " } else { "▸ " };
        let mut header = Line::from(vec![
            Span::raw(marker),
            Span::styled(fold, Style::default().fg(Color::DarkGray)),
            Span::styled(text_of("status"), Style::default().fg(status_color)),
            Span::raw(" "),
            Span::raw(text_of("title")),
            Span::raw(" "),
            Span::styled(text_of("duration"), Style::default().fg(Color::DarkGray)),
        ]);
        if cursor == Some(i) {
            header = header.style(Style::default().add_modifier(Modifier::BOLD));
        }
        lines.push(CaseLine { line: header, node: row });

        let Some(panel) = detail::panel(doc, row) else {
            continue;
        };
        if let Some(console) = doc.query(panel, "console") {
            let color = css_color(doc.computed_style(console, "color").as_deref());
            for text in doc.text_content(console).lines() {
                lines.push(CaseLine {
                    line: Line::styled(format!("    {text}"), Style::default().fg(color)),
                    node: console,
                });
            }
        }
        for class in ["package", "filename"] {
            if let Some(node) = doc.query(panel, class) {
                lines.push(CaseLine {
                    line: Line::styled(
                        format!("    {}", doc.text_content(node)),
                        Style::default().fg(Color::DarkGray),
                    ),
                    node,
                });
            }
        }
    }
    (lines, headers)
}

fn draw_cases(frame: &mut Frame, area: Rect, app: &mut App) {
    let active = app.active_panel == ActivePanel::Cases;
    let title = app.view.selected_group().map_or_else(
        || " Cases ".to_string(),
        |id| {
            let label = app
                .view
                .store()
                .group(id)
                .map(crate::model::TestGroup::label)
                .unwrap_or_default();
            format!(" Cases: {label} ")
        },
    );
    let block = panel_block(&title, active);
    let inner = block.inner(area);

    let cursor = active.then_some(app.row_cursor);
    let (lines, headers) = case_lines(app.view.document(), app.view.rows(), cursor);

    // Keep the focused row's header in view.
    if let Some(&header) = headers.get(app.row_cursor) {
        let header = u16::try_from(header).unwrap_or(u16::MAX);
        if header < app.scroll {
            app.scroll = header;
        } else if inner.height > 0 && header >= app.scroll + inner.height {
            app.scroll = header - inner.height + 1;
        }
    }

    for (i, case_line) in lines.iter().enumerate().skip(usize::from(app.scroll)) {
        let Ok(offset) = u16::try_from(i) else { break };
        let y = inner.y + offset - app.scroll;
        if y >= inner.bottom() {
            break;
        }
        app.hits.push(HitRegion {
            area: Rect::new(inner.x, y, inner.width, 1),
            node: case_line.node,
        });
    }

    let text: Vec<Line> = if lines.is_empty() {
        vec![Line::styled(
            "Select a group (Enter, or click). Shift+Enter / a expands all cases.",
            Style::default().fg(Color::DarkGray),
        )]
    } else {
        lines.into_iter().map(|l| l.line).collect()
    };
    let widget = Paragraph::new(text).scroll((app.scroll, 0)).block(block);
    frame.render_widget(widget, area);
}

fn draw_footer(frame: &mut Frame, area: Rect, app: &App) {
    if let Some(status) = app.status_message() {
        let footer = Paragraph::new(status)
            .style(
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(footer, area);
        return;
    }
    let hints = "←/→:group │ ↑/↓:case │ Tab:panel │ Enter:open │ a/Shift+Enter:expand all │ q:exit";
    let footer = Paragraph::new(hints)
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::store;
    use crate::view::{ClickEvent, ReportView, ViewConfig};
    use ratatui::backend::TestBackend;

    fn drawn_app(shift: bool) -> (App, Terminal<TestBackend>) {
        let mut view = ReportView::mount(store(), ViewConfig::default());
        let target = view.group_selectors()[0];
        view.dispatch(ClickEvent {
            target: Some(target),
            shift_key: shift,
        });
        let mut app = App::new(view);
        let mut terminal = Terminal::new(TestBackend::new(80, 40)).unwrap();
        terminal.draw(|frame| draw_ui(frame, &mut app)).unwrap();
        (app, terminal)
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer
            .content()
            .chunks(usize::from(buffer.area.width))
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn group_grid_wraps() {
        assert_eq!(group_grid_rows(3, 80), 1);
        assert_eq!(group_grid_rows(0, 80), 1);
        assert_eq!(group_grid_rows(20, 30), 5);
    }

    #[test]
    fn draw_records_hits_for_groups_and_rows() {
        let (app, _) = drawn_app(false);
        let selectors = app.view.group_selectors().to_vec();
        let rows = app.view.rows().to_vec();
        for node in selectors.iter().chain(&rows) {
            assert!(app.hits.iter().any(|h| h.node == *node));
        }
    }

    #[test]
    fn draw_shows_rows_and_open_panels() {
        let (_, terminal) = drawn_app(true);
        let text = screen(&terminal);
        assert!(text.contains("TestAlpha"));
        assert!(text.contains("TestBeta"));
        assert!(text.contains("--- FAIL"));
        assert!(text.contains("Package: example.com/pkg"));
        assert!(text.contains("6 tests"));
        assert_eq!(text.matches("▾ ").count(), 3);
    }

    #[test]
    fn collapsed_rows_show_closed_marker() {
        let (_, terminal) = drawn_app(false);
        let text = screen(&terminal);
        assert!(text.contains("▸ "));
        assert!(!text.contains("▾ "));
    }

    #[test]
    fn clicking_drawn_row_collapses_it() {
        let (mut app, _) = drawn_app(true);
        let row = app.view.rows()[0];
        let hit = *app.hits.iter().find(|h| h.node == row).unwrap();
        app.click_at(hit.area.x, hit.area.y, false);
        assert!(!detail::is_expanded(app.view.document(), row));
    }
}
