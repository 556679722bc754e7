mod tabs;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::App;
use crate::widgets::FilterState;

use tabs::tab_bar;

const HELP: &str =
    "w/p: tabs • j/k: nav • h/l: page • /: filter • enter: open • ctrl+y: copy id • ctrl+d/u: scroll • q: quit";
const FILTER_HELP: &str = "enter: apply filter • esc: cancel";
const APPLIED_HELP: &str = "esc: clear filter • enter: open • ctrl+y: copy id • w/p: tabs • q: quit";

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_body(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let lines = tab_bar(app.tab, area.width, &app.theme);
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_body(frame: &mut Frame, app: &App, area: Rect) {
    let geometry = app.geometry;
    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(geometry.list_width),
            Constraint::Length(4),
            Constraint::Length(geometry.preview_width),
            Constraint::Min(0),
        ])
        .split(area);

    app.list.render(frame, panes[1], &app.theme);
    app.preview.render(frame, panes[3], &app.theme);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let status = if let Some(banner) = &app.banner {
        Line::from(Span::styled(
            format!("Error: {}", banner),
            Style::default().fg(app.theme.error),
        ))
    } else if app.list.is_loading() && !app.list.is_filtering() {
        Line::from(Span::styled(
            format!("Loading {}…", app.tab.label()),
            app.theme.code(),
        ))
    } else {
        let help = match app.list.filter_state() {
            FilterState::Filtering => FILTER_HELP,
            FilterState::FilterApplied => APPLIED_HELP,
            FilterState::Unfiltered => HELP,
        };
        Line::from(Span::styled(help, app.theme.dimmed()))
    };

    frame.render_widget(Paragraph::new(status), area);
}
