use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme::Theme;
use crate::types::Item;

/// Rows used by one entry: title, summary, spacer.
const ROWS_PER_ITEM: u16 = 3;
/// Status/filter line plus a blank row above the entries.
const HEADER_ROWS: u16 = 2;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterState {
    Unfiltered,
    /// Filter input has focus; keys edit the query.
    Filtering,
    FilterApplied,
}

/// Filterable, paginated list of items with a single selection.
pub struct ItemList {
    items: Vec<Item>,
    /// Indices into `items` that pass the filter, in display order.
    visible: Vec<usize>,
    /// Index into `visible`.
    selected: usize,
    filter_state: FilterState,
    filter: String,
    loading: bool,
    spinner: usize,
    width: u16,
    height: u16,
    matcher: SkimMatcherV2,
}

impl Default for ItemList {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemList {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            visible: Vec::new(),
            selected: 0,
            filter_state: FilterState::Unfiltered,
            filter: String::new(),
            loading: false,
            spinner: 0,
            width: 0,
            height: 0,
            matcher: SkimMatcherV2::default(),
        }
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn start_loading(&mut self) {
        self.loading = true;
    }

    pub fn stop_loading(&mut self) {
        self.loading = false;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn tick(&mut self) {
        if self.loading {
            self.spinner = (self.spinner + 1) % SPINNER.len();
        }
    }

    /// Replace every item. The selection moves to the first visible item.
    pub fn set_items(&mut self, items: Vec<Item>) {
        self.items = items;
        self.refilter();
    }

    pub fn reset_filter(&mut self) {
        self.filter_state = FilterState::Unfiltered;
        self.filter.clear();
        self.refilter();
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn visible_items(&self) -> impl Iterator<Item = &Item> + '_ {
        self.visible.iter().map(move |&i| &self.items[i])
    }

    pub fn selected_index(&self) -> Option<usize> {
        (!self.visible.is_empty()).then_some(self.selected)
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.visible.get(self.selected).map(|&i| &self.items[i])
    }

    pub fn filter_state(&self) -> FilterState {
        self.filter_state
    }

    pub fn is_filtering(&self) -> bool {
        self.filter_state == FilterState::Filtering
    }

    pub fn filter_text(&self) -> &str {
        &self.filter
    }

    fn per_page(&self) -> usize {
        (self.height.saturating_sub(HEADER_ROWS) / ROWS_PER_ITEM).max(1) as usize
    }

    fn refilter(&mut self) {
        if self.filter.is_empty() {
            self.visible = (0..self.items.len()).collect();
        } else {
            let mut scored: Vec<(i64, usize)> = self
                .items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| {
                    self.matcher
                        .fuzzy_match(&item.filter_key(), &self.filter)
                        .map(|score| (score, i))
                })
                .collect();
            scored.sort_by(|a, b| b.0.cmp(&a.0));
            self.visible = scored.into_iter().map(|(_, i)| i).collect();
        }
        self.selected = 0;
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.is_filtering() {
            self.handle_filter_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.select_prev(),
            KeyCode::Char('l') | KeyCode::Right | KeyCode::PageDown => self.next_page(),
            KeyCode::Char('h') | KeyCode::Left | KeyCode::PageUp => self.prev_page(),
            KeyCode::Char('g') | KeyCode::Home => self.selected = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.selected = self.visible.len().saturating_sub(1);
            }
            KeyCode::Char('/') => {
                self.filter_state = FilterState::Filtering;
                self.filter.clear();
                self.refilter();
            }
            KeyCode::Esc if self.filter_state == FilterState::FilterApplied => {
                self.reset_filter();
            }
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.reset_filter(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.reset_filter();
            }
            KeyCode::Enter => {
                self.filter_state = if self.filter.is_empty() {
                    FilterState::Unfiltered
                } else {
                    FilterState::FilterApplied
                };
            }
            KeyCode::Backspace => {
                self.filter.pop();
                self.refilter();
            }
            KeyCode::Down => self.select_next(),
            KeyCode::Up => self.select_prev(),
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.filter.push(c);
                self.refilter();
            }
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::ScrollDown => self.select_next(),
            MouseEventKind::ScrollUp => self.select_prev(),
            _ => {}
        }
    }

    fn select_next(&mut self) {
        if self.selected + 1 < self.visible.len() {
            self.selected += 1;
        }
    }

    fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn next_page(&mut self) {
        let last = self.visible.len().saturating_sub(1);
        self.selected = (self.selected + self.per_page()).min(last);
    }

    fn prev_page(&mut self) {
        self.selected = self.selected.saturating_sub(self.per_page());
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let width = area.width as usize;
        let mut lines = vec![self.status_line(theme), Line::default()];

        if self.visible.is_empty() && !self.loading {
            let message = if self.filter.is_empty() {
                "No items."
            } else {
                "Nothing matched."
            };
            lines.push(Line::from(Span::styled(format!("  {}", message), theme.dimmed())));
        }

        let per_page = self.per_page();
        let start = (self.selected / per_page) * per_page;
        for (offset, &index) in self.visible.iter().skip(start).take(per_page).enumerate() {
            let item = &self.items[index];
            let is_selected = start + offset == self.selected;
            let (marker, title_style, summary_style) = if is_selected {
                (
                    Span::styled("│ ", Style::default().fg(theme.highlight)),
                    theme.selected_title(),
                    Style::default().fg(theme.highlight),
                )
            } else {
                (Span::raw("  "), Style::default().fg(theme.normal), theme.dimmed())
            };

            lines.push(Line::from(vec![
                marker.clone(),
                Span::styled(truncate(&item.title(), width.saturating_sub(2)), title_style),
            ]));
            lines.push(Line::from(vec![
                marker,
                Span::styled(truncate(&item.summary(), width.saturating_sub(2)), summary_style),
            ]));
            lines.push(Line::default());
        }

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn status_line(&self, theme: &Theme) -> Line<'static> {
        match self.filter_state {
            FilterState::Filtering => Line::from(vec![
                Span::styled("Filter: ", Style::default().fg(theme.highlight)),
                Span::raw(self.filter.clone()),
                Span::styled("█", theme.dimmed()),
            ]),
            _ if self.loading => Line::from(Span::styled(
                format!("{} Loading…", SPINNER[self.spinner]),
                Style::default().fg(theme.special),
            )),
            FilterState::FilterApplied => Line::from(Span::styled(
                format!("“{}” {} matched", self.filter, self.visible.len()),
                theme.dimmed(),
            )),
            FilterState::Unfiltered => Line::from(Span::styled(
                format!("{} items", self.items.len()),
                theme.dimmed(),
            )),
        }
    }
}

/// Fit `text` into `width` terminal columns, ending with `…` when cut.
fn truncate(text: &str, width: usize) -> String {
    if text.width() <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }

    let budget = width - 1;
    let mut used = 0;
    let mut kept = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        kept.push(c);
    }
    format!("{}…", kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::{pull_request, work_item};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn list_of(n: u64) -> ItemList {
        let mut list = ItemList::new();
        list.set_size(40, 20);
        list.set_items((1..=n).map(|i| work_item(i, &format!("Item {}", i), None)).collect());
        list
    }

    fn typed(list: &mut ItemList, text: &str) {
        for c in text.chars() {
            list.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn set_items_selects_first() {
        let list = list_of(3);
        assert_eq!(list.selected_index(), Some(0));
        assert_eq!(list.selected_item().map(Item::id), Some(1));
    }

    #[test]
    fn empty_list_has_no_selection() {
        let list = ItemList::new();
        assert_eq!(list.selected_index(), None);
        assert!(list.selected_item().is_none());
    }

    #[test]
    fn navigation_clamps_at_bounds() {
        let mut list = list_of(3);
        list.handle_key(key(KeyCode::Up));
        assert_eq!(list.selected_index(), Some(0));
        list.handle_key(key(KeyCode::Char('j')));
        list.handle_key(key(KeyCode::Down));
        list.handle_key(key(KeyCode::Down));
        assert_eq!(list.selected_index(), Some(2));
        list.handle_key(key(KeyCode::Char('g')));
        assert_eq!(list.selected_index(), Some(0));
        list.handle_key(key(KeyCode::Char('G')));
        assert_eq!(list.selected_index(), Some(2));
    }

    #[test]
    fn paging_moves_by_page_size() {
        // 20 rows: 2 header rows, 6 entries per page
        let mut list = list_of(20);
        list.handle_key(key(KeyCode::PageDown));
        assert_eq!(list.selected_index(), Some(6));
        list.handle_key(key(KeyCode::End));
        list.handle_key(key(KeyCode::PageDown));
        assert_eq!(list.selected_index(), Some(19));
        list.handle_key(key(KeyCode::PageUp));
        assert_eq!(list.selected_index(), Some(13));
    }

    #[test]
    fn filtering_captures_keys() {
        let mut list = list_of(12);
        list.handle_key(key(KeyCode::Char('/')));
        assert!(list.is_filtering());

        typed(&mut list, "Item 12");
        assert_eq!(list.filter_text(), "Item 12");
        assert_eq!(list.selected_item().map(Item::id), Some(12));

        list.handle_key(key(KeyCode::Enter));
        assert_eq!(list.filter_state(), FilterState::FilterApplied);
        assert!(!list.is_filtering());
    }

    #[test]
    fn filter_ranks_matches_and_drops_misses() {
        let mut list = ItemList::new();
        list.set_items(vec![
            work_item(1, "Update readme", None),
            pull_request(2, "Login page redesign"),
            work_item(3, "Fix login crash", None),
        ]);
        list.handle_key(key(KeyCode::Char('/')));
        typed(&mut list, "login");

        let ids: Vec<u64> = list.visible_items().map(Item::id).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&2) && ids.contains(&3));
    }

    #[test]
    fn escape_cancels_and_clears_filter() {
        let mut list = list_of(5);
        list.handle_key(key(KeyCode::Char('/')));
        typed(&mut list, "Item 3");
        list.handle_key(key(KeyCode::Esc));
        assert_eq!(list.filter_state(), FilterState::Unfiltered);
        assert_eq!(list.visible_items().count(), 5);

        list.handle_key(key(KeyCode::Char('/')));
        typed(&mut list, "Item 3");
        list.handle_key(key(KeyCode::Enter));
        list.handle_key(key(KeyCode::Esc));
        assert_eq!(list.filter_state(), FilterState::Unfiltered);
        assert_eq!(list.filter_text(), "");
    }

    #[test]
    fn ctrl_c_cancels_filter_input() {
        let mut list = list_of(2);
        list.handle_key(key(KeyCode::Char('/')));
        list.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(list.filter_state(), FilterState::Unfiltered);
    }

    #[test]
    fn backspace_widens_filter() {
        let mut list = list_of(3);
        list.handle_key(key(KeyCode::Char('/')));
        typed(&mut list, "zzz");
        assert_eq!(list.visible_items().count(), 0);
        for _ in 0..3 {
            list.handle_key(key(KeyCode::Backspace));
        }
        assert_eq!(list.visible_items().count(), 3);
    }

    #[test]
    fn spinner_only_advances_while_loading() {
        let mut list = ItemList::new();
        list.tick();
        assert_eq!(list.spinner, 0);
        list.start_loading();
        list.tick();
        assert_eq!(list.spinner, 1);
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("abcdef", 4), "abc…");
        assert_eq!(truncate("abc", 4), "abc");
    }

    #[test]
    fn truncate_counts_terminal_columns() {
        let cut = truncate("[12] 登录页面崩溃修复", 10);
        assert_eq!(cut, "[12] 登录…");
        assert_eq!(cut.width(), 10);
        // A wide char that would straddle the edge is dropped whole.
        assert_eq!(truncate("ab登录", 4), "ab…");
        assert_eq!(truncate("登录", 0), "");
    }

    #[test]
    fn wide_titles_are_cut_with_ellipsis() {
        use ratatui::backend::TestBackend;
        use ratatui::Terminal;

        let mut list = ItemList::new();
        list.set_size(16, 10);
        list.set_items(vec![work_item(12, "登录页面崩溃修复", None)]);

        let mut terminal = Terminal::new(TestBackend::new(16, 10)).unwrap();
        terminal
            .draw(|frame| list.render(frame, frame.area(), &Theme::default()))
            .unwrap();
        let rows: Vec<String> = terminal
            .backend()
            .buffer()
            .content()
            .chunks(16)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect();
        let title_row = rows
            .iter()
            .find(|row| row.contains("[12]"))
            .expect("title row");
        assert!(title_row.contains('…'), "{:?}", title_row);
    }
}
