use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

use crate::action::Tab;
use crate::theme::Theme;

/// Columns left blank before the first tab.
const LEFT_PAD: usize = 3;
/// Columns kept free after the trailing rule.
const RIGHT_RESERVE: usize = 8;

/// Three rows of boxed tab labels. The active tab's bottom edge is open so it
/// joins the content below; the remaining width carries a bottom rule.
pub fn tab_bar(active: Tab, width: u16, theme: &Theme) -> Vec<Line<'static>> {
    let border = theme.tab_border();
    let pad = " ".repeat(LEFT_PAD);
    let mut top = vec![Span::raw(pad.clone())];
    let mut middle = vec![Span::raw(pad.clone())];
    let mut bottom = vec![Span::raw(pad)];
    let mut tabs_width = 0;

    for tab in Tab::ALL {
        let label = tab.label();
        let inner = label.width() + 2;
        tabs_width += inner + 2;

        top.push(Span::styled(format!("╭{}╮", "─".repeat(inner)), border));
        middle.push(Span::styled("│ ", border));
        middle.push(Span::styled(
            label,
            if tab == active {
                theme.active_tab()
            } else {
                theme.tab()
            },
        ));
        middle.push(Span::styled(" │", border));
        bottom.push(if tab == active {
            Span::styled(format!("┘{}└", " ".repeat(inner)), border)
        } else {
            Span::styled(format!("┴{}┴", "─".repeat(inner)), border)
        });
    }

    let gap = (width as usize).saturating_sub(tabs_width + RIGHT_RESERVE);
    bottom.push(Span::styled("─".repeat(gap), border));

    vec![Line::from(top), Line::from(middle), Line::from(bottom)]
}
