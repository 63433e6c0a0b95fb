use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap};

use super::text_input::TextInput;
use crate::theme;

const DIALOG_BG: Color = Color::Rgb(30, 30, 30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    fn color(self) -> Color {
        match self {
            Severity::Info => theme::ACCENT,
            Severity::Warning => theme::WARNING,
            Severity::Error => theme::FAILURE,
        }
    }
}

/// What a confirmed yes/no question does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    RemoveTab(usize),
    ResetTab(usize),
    ResetAll,
}

/// What the text entered in a prompt is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptAction {
    AddTab,
    RenameTab(usize),
}

/// Modal dialog shown over the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    Message {
        title: String,
        body: String,
        severity: Severity,
    },
    Confirm {
        title: String,
        body: String,
        action: ConfirmAction,
    },
    Prompt {
        title: String,
        label: String,
        input: TextInput,
        action: PromptAction,
    },
    /// Scrollable read-only text; `markdown` enables heading styling
    Document {
        title: String,
        body: String,
        markdown: bool,
        scroll: u16,
    },
}

impl Dialog {
    pub fn message(title: impl Into<String>, body: impl Into<String>, severity: Severity) -> Self {
        Dialog::Message {
            title: title.into(),
            body: body.into(),
            severity,
        }
    }

    pub fn error(title: impl Into<String>, body: impl ToString) -> Self {
        Self::message(title, body.to_string(), Severity::Error)
    }

    pub fn confirm(title: impl Into<String>, body: impl Into<String>, action: ConfirmAction) -> Self {
        Dialog::Confirm {
            title: title.into(),
            body: body.into(),
            action,
        }
    }

    pub fn prompt(
        title: impl Into<String>,
        label: impl Into<String>,
        initial: impl Into<String>,
        action: PromptAction,
    ) -> Self {
        Dialog::Prompt {
            title: title.into(),
            label: label.into(),
            input: TextInput::new(initial),
            action,
        }
    }

    pub fn document(title: impl Into<String>, body: impl Into<String>, markdown: bool) -> Self {
        Dialog::Document {
            title: title.into(),
            body: body.into(),
            markdown,
            scroll: 0,
        }
    }

    fn title(&self) -> &str {
        match self {
            Dialog::Message { title, .. }
            | Dialog::Confirm { title, .. }
            | Dialog::Prompt { title, .. }
            | Dialog::Document { title, .. } => title,
        }
    }

    fn border_color(&self) -> Color {
        match self {
            Dialog::Message { severity, .. } => severity.color(),
            Dialog::Confirm { .. } => theme::WARNING,
            Dialog::Prompt { .. } | Dialog::Document { .. } => theme::ACCENT,
        }
    }

    fn footer(&self) -> &'static str {
        match self {
            Dialog::Message { .. } => " ENTER ok ",
            Dialog::Confirm { .. } => " Y yes · N no ",
            Dialog::Prompt { .. } => " ENTER ok · ESC cancel ",
            Dialog::Document { .. } => " ↑↓ scroll · ESC close ",
        }
    }

    fn lines(&self) -> Vec<Line<'_>> {
        match self {
            Dialog::Message { body, .. } | Dialog::Confirm { body, .. } => {
                body.lines().map(Line::raw).collect()
            }
            Dialog::Prompt { label, input, .. } => {
                let (before, after) = input.split_at_cursor();
                vec![
                    Line::raw(label.as_str()),
                    Line::raw(""),
                    Line::from(vec![
                        Span::raw(before),
                        Span::styled("█", Style::default().fg(theme::ACCENT)),
                        Span::raw(after),
                    ]),
                ]
            }
            Dialog::Document { body, markdown, .. } => {
                if *markdown {
                    markdown_lines(body)
                } else {
                    body.lines().map(Line::raw).collect()
                }
            }
        }
    }

    /// Scroll a document dialog by `delta` lines.
    pub fn scroll(&mut self, delta: i32) {
        if let Dialog::Document { scroll, .. } = self {
            *scroll = scroll.saturating_add_signed(i16::try_from(delta).unwrap_or(0));
        }
    }
}

/// Lightweight Markdown styling: headings, fenced code, quotes, bullet and
/// numbered lists, and inline `code`, **bold** and *italic*.
#[must_use]
pub fn markdown_lines(text: &str) -> Vec<Line<'_>> {
    let mut in_code = false;
    text.lines()
        .map(|line| {
            if line.trim_start().starts_with("```") {
                in_code = !in_code;
                return Line::styled(line, Style::default().fg(theme::DIM));
            }
            if in_code {
                return Line::styled(line, Style::default().fg(theme::FIELD));
            }
            if let Some(heading) = line.strip_prefix('#') {
                let heading = heading.trim_start_matches('#').trim();
                return Line::styled(
                    heading,
                    Style::default()
                        .fg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                );
            }

            let trimmed = line.trim_start();
            let indent = " ".repeat(line.len() - trimmed.len());
            let marker = Style::default().fg(theme::ACCENT);
            if let Some(quote) = trimmed.strip_prefix("> ") {
                return Line::styled(
                    quote,
                    Style::default()
                        .fg(theme::DIM)
                        .add_modifier(Modifier::ITALIC),
                );
            }
            if let Some(item) = ["- ", "* ", "+ "]
                .iter()
                .find_map(|bullet| trimmed.strip_prefix(*bullet))
            {
                let mut spans = vec![Span::raw(indent), Span::styled(" • ", marker)];
                spans.extend(inline_spans(item));
                return Line::from(spans);
            }
            let digits = trimmed.bytes().take_while(u8::is_ascii_digit).count();
            if digits > 0 && trimmed[digits..].starts_with(". ") {
                let (number, item) = trimmed.split_at(digits + 2);
                let mut spans = vec![Span::raw(indent), Span::styled(number, marker)];
                spans.extend(inline_spans(item));
                return Line::from(spans);
            }
            Line::from(inline_spans(line))
        })
        .collect()
}

/// Split a line on inline code, bold and italic markers. Unclosed markers are
/// kept as plain text.
fn inline_spans(text: &str) -> Vec<Span<'_>> {
    let mut spans = Vec::new();
    let mut plain_start = 0;
    let mut pos = 0;
    while let Some(offset) = text[pos..].find(['`', '*']) {
        let start = pos + offset;
        let marker = if text[start..].starts_with("**") {
            "**"
        } else {
            &text[start..=start]
        };
        let body_start = start + marker.len();
        let Some(len) = text[body_start..].find(marker).filter(|&len| len > 0) else {
            pos = body_start;
            continue;
        };
        let body_end = body_start + len;
        let style = match marker {
            "`" => Style::default().fg(theme::FIELD),
            "**" => Style::default().add_modifier(Modifier::BOLD),
            _ => Style::default().add_modifier(Modifier::ITALIC),
        };
        if plain_start < start {
            spans.push(Span::raw(&text[plain_start..start]));
        }
        spans.push(Span::styled(&text[body_start..body_end], style));
        pos = body_end + marker.len();
        plain_start = pos;
    }
    if plain_start < text.len() {
        spans.push(Span::raw(&text[plain_start..]));
    }
    spans
}

/// Centered dialog rectangle sized for its kind
#[must_use]
pub fn compute_area(dialog: &Dialog, screen: Rect) -> Rect {
    let (width, height) = match dialog {
        Dialog::Document { .. } => (screen.width.saturating_sub(8), screen.height.saturating_sub(4)),
        Dialog::Prompt { .. } => (50, 7),
        Dialog::Message { body, .. } | Dialog::Confirm { body, .. } => {
            let lines = u16::try_from(body.lines().count()).unwrap_or(u16::MAX);
            (60, lines.saturating_add(4))
        }
    };
    let width = width.min(screen.width);
    let height = height.min(screen.height);
    Rect::new(
        screen.x + (screen.width - width) / 2,
        screen.y + (screen.height - height) / 2,
        width,
        height,
    )
}

impl Widget for &Dialog {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Dim the form behind the dialog
        let dim_style = Style::default()
            .fg(Color::DarkGray)
            .remove_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        for row in area.y..area.bottom() {
            for col in area.x..area.right() {
                buf[(col, row)].set_style(dim_style);
            }
        }

        let rect = compute_area(self, area);
        if rect.width < 4 || rect.height < 3 {
            return;
        }
        Clear.render(rect, buf);

        let border_style = Style::reset().fg(self.border_color()).bg(DIALOG_BG);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .style(Style::reset().fg(Color::White).bg(DIALOG_BG))
            .title(Span::styled(
                format!(" {} ", self.title()),
                border_style.add_modifier(Modifier::BOLD),
            ))
            .title_bottom(Line::styled(self.footer(), Style::reset().fg(theme::DIM).bg(DIALOG_BG)));

        let scroll = match self {
            Dialog::Document { scroll, .. } => *scroll,
            _ => 0,
        };
        Paragraph::new(self.lines())
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .render(rect, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_area_is_centered() {
        let dialog = Dialog::prompt("Add tab", "Name:", "Tab 2", PromptAction::AddTab);
        let area = compute_area(&dialog, Rect::new(0, 0, 80, 24));
        assert_eq!(area, Rect::new(15, 8, 50, 7));
    }

    #[test]
    fn test_compute_area_clamps_to_screen() {
        let dialog = Dialog::error("Error", "x");
        let area = compute_area(&dialog, Rect::new(0, 0, 30, 3));
        assert_eq!(area, Rect::new(0, 0, 30, 3));
    }

    #[test]
    fn test_document_scroll_saturates() {
        let mut dialog = Dialog::document("Help", "a\nb", true);
        dialog.scroll(-3);
        dialog.scroll(2);
        assert!(matches!(dialog, Dialog::Document { scroll: 2, .. }));
    }

    #[test]
    fn test_markdown_headings_and_code() {
        let lines = markdown_lines("# Title\n```\n# not a heading\n```\n- item");
        let text: Vec<String> = lines.iter().map(ToString::to_string).collect();
        assert_eq!(text, vec!["Title", "```", "# not a heading", "```", " • item"]);
    }

    #[test]
    fn test_markdown_lists_and_quotes() {
        let lines = markdown_lines("1. first
  + nested
> note
2.5 is not a list");
        let text: Vec<String> = lines.iter().map(ToString::to_string).collect();
        assert_eq!(
            text,
            vec!["1. first", "   • nested", "note", "2.5 is not a list"]
        );
        assert_eq!(lines[1].spans[0].content, "  ");
    }

    #[test]
    fn test_markdown_inline_styles() {
        let line = &markdown_lines("run `cmdtab run` **now**, *please*")[0];
        let parts: Vec<(&str, Style)> = line
            .spans
            .iter()
            .map(|span| (span.content.as_ref(), span.style))
            .collect();
        assert_eq!(
            parts,
            vec![
                ("run ", Style::default()),
                ("cmdtab run", Style::default().fg(theme::FIELD)),
                (" ", Style::default()),
                ("now", Style::default().add_modifier(Modifier::BOLD)),
                (", ", Style::default()),
                ("please", Style::default().add_modifier(Modifier::ITALIC)),
            ]
        );
    }

    #[test]
    fn test_markdown_unclosed_marker_stays_plain() {
        let line = &markdown_lines("2 * 3 = 6")[0];
        assert_eq!(line.to_string(), "2 * 3 = 6");
        assert!(line.spans.iter().all(|span| span.style == Style::default()));
    }
}
