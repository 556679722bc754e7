//! HTML description bodies to Markdown, and Markdown to styled terminal text.

use std::borrow::Cow;
use std::sync::OnceLock;

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use regex::{Captures, Regex};
use textwrap::Options as WrapOptions;
use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

struct HtmlPatterns {
    line_break: Regex,
    heading: Regex,
    bold: Regex,
    italic: Regex,
    code: Regex,
    link: Regex,
    list_item: Regex,
    block: Regex,
    tag: Regex,
    numeric_entity: Regex,
    blank_lines: Regex,
}

fn patterns() -> &'static HtmlPatterns {
    static PATTERNS: OnceLock<HtmlPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("valid html pattern");
        HtmlPatterns {
            line_break: re(r"(?i)<br\s*/?>"),
            heading: re(r"(?is)<h([1-6])(?:\s[^>]*)?>(.*?)</h[1-6]>"),
            bold: re(r"(?is)<(?:strong|b)(?:\s[^>]*)?>(.*?)</(?:strong|b)>"),
            italic: re(r"(?is)<(?:em|i)(?:\s[^>]*)?>(.*?)</(?:em|i)>"),
            code: re(r"(?is)<code(?:\s[^>]*)?>(.*?)</code>"),
            link: re(r#"(?is)<a\s[^>]*href\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a>"#),
            list_item: re(r"(?i)<li(?:\s[^>]*)?>"),
            block: re(r"(?i)</?(?:p|div|ul|ol|table|tr|blockquote)(?:\s[^>]*)?>"),
            tag: re(r"(?s)<[^>]*>"),
            numeric_entity: re(r"&#(x?[0-9a-fA-F]+);"),
            blank_lines: re(r"\n{3,}"),
        }
    })
}

/// Convert an HTML fragment to Markdown. Unknown tags are dropped, their text kept.
pub fn html_to_markdown(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    let p = patterns();
    let text = html.replace("\r\n", "\n");
    let text = p.line_break.replace_all(&text, "\n");
    let text = p.heading.replace_all(&text, |caps: &Captures| {
        let level = caps[1].parse::<usize>().unwrap_or(1);
        format!("\n\n{} {}\n\n", "#".repeat(level), caps[2].trim())
    });
    let text = p.bold.replace_all(&text, "**$1**");
    let text = p.italic.replace_all(&text, "*$1*");
    let text = p.code.replace_all(&text, "`$1`");
    let text = p.link.replace_all(&text, "[$2]($1)");
    let text = p.list_item.replace_all(&text, "\n- ");
    let text = p.block.replace_all(&text, "\n");
    let text = p.tag.replace_all(&text, "");
    let text = decode_entities(&text);

    let trimmed: Vec<&str> = text.lines().map(str::trim_end).collect();
    let text = trimmed.join("\n");
    p.blank_lines
        .replace_all(&text, "\n\n")
        .trim()
        .to_string()
}

fn decode_entities(text: &str) -> String {
    let text = patterns()
        .numeric_entity
        .replace_all(text, |caps: &Captures| {
            let raw = &caps[1];
            let code = match raw.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => raw.parse::<u32>().ok(),
            };
            code.and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        });

    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Renders Markdown into wrapped, styled lines. Stateless once built.
#[derive(Debug, Clone)]
pub struct Renderer {
    wrap_width: usize,
    theme: Theme,
}

impl Renderer {
    pub fn new(wrap_width: usize, theme: Theme) -> Self {
        Self { wrap_width, theme }
    }

    pub fn render(&self, markdown: &str) -> Text<'static> {
        let mut lines: Vec<Line<'static>> = Vec::new();
        let mut in_code = false;

        for raw in markdown.lines() {
            let trimmed = raw.trim();

            if trimmed.starts_with("```") {
                in_code = !in_code;
                continue;
            }
            if in_code {
                lines.push(Line::from(Span::styled(
                    format!("  {}", raw),
                    self.theme.code(),
                )));
                continue;
            }

            if trimmed.is_empty() {
                lines.push(Line::default());
            } else if is_rule(trimmed) {
                lines.push(Line::from(Span::styled(
                    "─".repeat(self.wrap_width.max(1)),
                    self.theme.dimmed(),
                )));
            } else if let Some(heading) = heading_text(trimmed) {
                let style = self.theme.heading();
                for segment in wrap(heading, self.wrap_width) {
                    lines.push(Line::from(Span::styled(segment, style)));
                }
            } else if let Some(item) = trimmed
                .strip_prefix("- ")
                .or_else(|| trimmed.strip_prefix("* "))
            {
                self.push_block(&mut lines, item, "• ", "  ", Style::default());
            } else if let Some(quote) = trimmed.strip_prefix('>') {
                let style = self.theme.dimmed().add_modifier(Modifier::ITALIC);
                self.push_block(&mut lines, quote.trim_start(), "│ ", "│ ", style);
            } else {
                self.push_block(&mut lines, trimmed, "", "", Style::default());
            }
        }

        // Exactly one trailing blank line.
        while matches!(lines.last(), Some(l) if l.spans.is_empty()) {
            lines.pop();
        }
        lines.push(Line::default());

        Text::from(lines)
    }

    fn push_block(
        &self,
        lines: &mut Vec<Line<'static>>,
        text: &str,
        first_prefix: &str,
        rest_prefix: &str,
        base: Style,
    ) {
        let width = self.wrap_width.saturating_sub(first_prefix.width());
        let mut inline = InlineState::default();
        for (i, segment) in wrap(text, width).into_iter().enumerate() {
            let prefix = if i == 0 { first_prefix } else { rest_prefix };
            let mut spans = Vec::new();
            if !prefix.is_empty() {
                spans.push(Span::styled(prefix.to_string(), self.theme.dimmed()));
            }
            spans.extend(inline.spans(&segment, base, &self.theme));
            lines.push(Line::from(spans));
        }
    }
}

fn is_rule(line: &str) -> bool {
    line.len() >= 3 && ['-', '*', '_'].iter().any(|c| line.chars().all(|ch| ch == *c))
}

fn heading_text(line: &str) -> Option<&str> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &line[level..];
    if rest.is_empty() {
        Some("")
    } else if rest.starts_with(' ') {
        Some(rest.trim())
    } else {
        None
    }
}

/// Bold and code state carried across the wrapped segments of one block.
#[derive(Default)]
struct InlineState {
    bold: bool,
    code: bool,
}

impl InlineState {
    fn spans(&mut self, text: &str, base: Style, theme: &Theme) -> Vec<Span<'static>> {
        let mut spans = Vec::new();
        let mut current = String::new();
        let mut chars = text.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '`' {
                self.flush(&mut spans, &mut current, base, theme);
                self.code = !self.code;
            } else if c == '*' && !self.code && chars.peek() == Some(&'*') {
                chars.next();
                self.flush(&mut spans, &mut current, base, theme);
                self.bold = !self.bold;
            } else {
                current.push(c);
            }
        }
        self.flush(&mut spans, &mut current, base, theme);
        spans
    }

    fn flush(
        &self,
        spans: &mut Vec<Span<'static>>,
        current: &mut String,
        base: Style,
        theme: &Theme,
    ) {
        if current.is_empty() {
            return;
        }
        let mut style = if self.code { theme.code() } else { base };
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        spans.push(Span::styled(std::mem::take(current), style));
    }
}

/// Wrap to `width` terminal columns, splitting words that do not fit.
/// `width == 0` disables wrapping.
fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let lines: Vec<String> = textwrap::wrap(text, WrapOptions::new(width).break_words(true))
        .into_iter()
        .map(Cow::into_owned)
        .collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &Text) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn converts_common_tags() {
        let html = "<div>Steps:<br><ol><li><b>Open</b> the page</li><li>Click <a href=\"https://x.test\">here</a></li></ol></div>";
        let md = html_to_markdown(html);
        assert!(md.contains("Steps:"));
        assert!(md.contains("- **Open** the page"));
        assert!(md.contains("- Click [here](https://x.test)"));
    }

    #[test]
    fn converts_headings_and_entities() {
        let md = html_to_markdown("<h2>Title &amp; more</h2><p>a &lt; b&nbsp;&#65;</p>");
        assert!(md.starts_with("## Title & more"));
        assert!(md.ends_with("a < b A"));
    }

    #[test]
    fn empty_html_is_empty_markdown() {
        assert_eq!(html_to_markdown(""), "");
        assert_eq!(html_to_markdown("   "), "");
    }

    #[test]
    fn collapses_blank_runs() {
        let md = html_to_markdown("<p>one</p><p></p><p></p><p>two</p>");
        assert_eq!(md, "one\n\ntwo");
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap("the quick brown fox jumps over the lazy dog", 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.join(" "), "the quick brown fox jumps over the lazy dog");
    }

    #[test]
    fn wrap_measures_wide_characters_in_columns() {
        let text = "登录页面崩溃修复".repeat(2);
        let lines = wrap(&text, 10);
        assert!(lines.len() >= 4);
        assert!(lines.iter().all(|l| l.width() <= 10), "{:?}", lines);
        assert_eq!(lines.concat(), text);
    }

    #[test]
    fn rendered_cjk_paragraph_fits_wrap_width() {
        let renderer = Renderer::new(12, Theme::default());
        let text = renderer.render("- 修复登录页面在移动设备上崩溃的问题");
        for line in plain(&text) {
            assert!(line.width() <= 12, "{:?} is {} columns", line, line.width());
        }
    }

    #[test]
    fn wrap_splits_long_words() {
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_empty_is_single_empty_line() {
        assert_eq!(wrap("", 10), vec![String::new()]);
    }

    #[test]
    fn renders_heading_rule_and_bullets() {
        let renderer = Renderer::new(20, Theme::default());
        let text = renderer.render("7\n# Fix login\n---\n- one\n");
        let lines = plain(&text);
        assert_eq!(lines[0], "7");
        assert_eq!(lines[1], "Fix login");
        assert_eq!(lines[2], "─".repeat(20));
        assert_eq!(lines[3], "• one");
    }

    #[test]
    fn bold_spans_are_styled_without_markers() {
        let renderer = Renderer::new(40, Theme::default());
        let text = renderer.render("plain **strong** tail");
        let line = &text.lines[0];
        let strong = line
            .spans
            .iter()
            .find(|s| s.content == "strong")
            .expect("bold span");
        assert!(strong.style.add_modifier.contains(Modifier::BOLD));
        assert!(!plain(&text)[0].contains("**"));
    }

    #[test]
    fn code_fence_is_not_wrapped() {
        let renderer = Renderer::new(5, Theme::default());
        let text = renderer.render("```\nlet value = 1;\n```");
        assert_eq!(plain(&text)[0], "  let value = 1;");
    }
}
