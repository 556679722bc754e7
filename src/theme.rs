use ratatui::style::{Color, Modifier, Style};

/// Colors shared by the renderer and the widgets. Built once at startup and
/// handed to whoever draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub normal: Color,
    pub subtle: Color,
    pub highlight: Color,
    pub special: Color,
    pub border: Color,
    pub error: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            normal: Color::Rgb(0xEE, 0xEE, 0xEE),
            subtle: Color::Rgb(0x99, 0xA9, 0xC9),
            highlight: Color::Rgb(0x7D, 0x56, 0xF4),
            special: Color::Rgb(0x73, 0xF5, 0x9F),
            border: Color::Indexed(62),
            error: Color::Red,
        }
    }
}

impl Theme {
    pub fn tab(&self) -> Style {
        Style::default().fg(self.subtle)
    }

    pub fn active_tab(&self) -> Style {
        Style::default()
            .fg(self.normal)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tab_border(&self) -> Style {
        Style::default().fg(self.highlight)
    }

    pub fn selected_title(&self) -> Style {
        Style::default()
            .fg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    pub fn dimmed(&self) -> Style {
        Style::default().fg(self.subtle)
    }

    pub fn heading(&self) -> Style {
        Style::default()
            .fg(self.highlight)
            .add_modifier(Modifier::BOLD)
    }

    pub fn code(&self) -> Style {
        Style::default().fg(self.special)
    }
}
