//! Markdown to styled terminal text, for showing generated content.
//!
//! Only display changes: the session keeps the raw text for export.

use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};

const RULE_WIDTH: usize = 24;

/// Render `source` as lines of styled spans.
///
/// Headings, emphasis, lists, inline code, code blocks and rules are styled;
/// anything else (HTML, tables, links) shows as its plain text.
pub fn render(source: &str) -> Text<'static> {
    let mut writer = Writer::default();
    for event in Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH) {
        writer.event(event);
    }
    writer.end_line();
    Text::from(writer.lines)
}

#[derive(Default)]
struct Writer {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    /// One entry per open list, holding the next number of ordered lists.
    lists: Vec<Option<u64>>,
    in_code_block: bool,
}

impl Writer {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) if self.in_code_block => {
                for (i, part) in text.split('\n').enumerate() {
                    if i > 0 {
                        self.flush_line();
                    }
                    if !part.is_empty() {
                        self.push(part.to_string(), code_style());
                    }
                }
            }
            Event::Text(text) => self.push(text.into_string(), Style::default()),
            Event::Code(code) => self.push(code.into_string(), code_style()),
            Event::SoftBreak => self.push(" ".to_string(), Style::default()),
            Event::HardBreak => self.flush_line(),
            Event::Rule => {
                self.block_gap();
                self.lines.push(Line::styled(
                    "─".repeat(RULE_WIDTH),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.block_gap(),
            Tag::Heading { level, .. } => {
                self.block_gap();
                self.push_style(heading_style(level));
            }
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::CodeBlock(_) => {
                self.block_gap();
                self.in_code_block = true;
            }
            Tag::List(start) => {
                if self.lists.is_empty() {
                    self.block_gap();
                }
                self.lists.push(start);
            }
            Tag::Item => {
                self.end_line();
                let indent = "  ".repeat(self.lists.len().saturating_sub(1));
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.current.push(Span::styled(
                    format!("{indent}{marker}"),
                    Style::default().fg(Color::Cyan),
                ));
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Item => self.end_line(),
            TagEnd::Heading(_) => {
                self.styles.pop();
                self.end_line();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.styles.pop();
            }
            TagEnd::CodeBlock => {
                self.in_code_block = false;
                self.end_line();
            }
            TagEnd::List(_) => {
                self.lists.pop();
            }
            _ => {}
        }
    }

    fn push(&mut self, content: String, style: Style) {
        let style = self.styles.last().copied().unwrap_or_default().patch(style);
        self.current.push(Span::styled(content, style));
    }

    fn push_style(&mut self, style: Style) {
        let base = self.styles.last().copied().unwrap_or_default();
        self.styles.push(base.patch(style));
    }

    /// Finish the current line, even when it is empty.
    fn flush_line(&mut self) {
        self.lines.push(Line::from(std::mem::take(&mut self.current)));
    }

    /// Finish the current line if anything is on it.
    fn end_line(&mut self) {
        if !self.current.is_empty() {
            self.flush_line();
        }
    }

    /// Separate top-level blocks with one blank line. Blocks inside list
    /// items stay packed under their marker.
    fn block_gap(&mut self) {
        if !self.lists.is_empty() {
            return;
        }
        self.end_line();
        if !self.lines.is_empty() {
            self.lines.push(Line::default());
        }
    }
}

fn heading_style(level: HeadingLevel) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 => bold.fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),
        HeadingLevel::H2 => bold.fg(Color::Cyan),
        _ => bold,
    }
}

fn code_style() -> Style {
    Style::default().fg(Color::Yellow)
}
