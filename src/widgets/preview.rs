use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::Text;
use ratatui::widgets::{Block, BorderType, Borders, Padding, Paragraph};
use ratatui::Frame;

use crate::theme::Theme;

/// Scrollable viewport over pre-rendered text.
#[derive(Debug, Default)]
pub struct Preview {
    content: Text<'static>,
    scroll: u16,
    width: u16,
    height: u16,
}

impl Preview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.scroll = self.scroll.min(self.max_scroll());
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Replace the content and scroll back to the top.
    pub fn set_content(&mut self, content: Text<'static>) {
        self.content = content;
        self.scroll = 0;
    }

    pub fn content(&self) -> &Text<'static> {
        &self.content
    }

    pub fn scroll(&self) -> u16 {
        self.scroll
    }

    fn max_scroll(&self) -> u16 {
        let lines = u16::try_from(self.content.lines.len()).unwrap_or(u16::MAX);
        lines.saturating_sub(self.height)
    }

    pub fn half_page_down(&mut self) {
        let step = (self.height / 2).max(1);
        self.scroll = self.scroll.saturating_add(step).min(self.max_scroll());
    }

    pub fn half_page_up(&mut self) {
        let step = (self.height / 2).max(1);
        self.scroll = self.scroll.saturating_sub(step);
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::LEFT)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.border))
            .padding(Padding::left(1));

        let body = Paragraph::new(self.content.clone())
            .block(block)
            .scroll((self.scroll, 0));

        frame.render_widget(body, area);
    }
}
