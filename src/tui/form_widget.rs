use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Widget;

use super::app::{Editing, Field, HEADER_LINES, RowColumn};
use crate::form::row::{ParameterRow, RowKind};
use crate::form::tab::TabPage;
use crate::theme;

/// Width of the cursor gutter
const GUTTER: u16 = 2;
/// Column where the key cell starts
const KEY_X: u16 = GUTTER + 10;
/// Column where the value cell starts
const VALUE_X: u16 = KEY_X + 16;

/// Marker shown in place of line breaks in single-line cells
const NEWLINE_MARK: &str = "⏎";

/// The row column under horizontal offset `x` (relative to the form area).
#[must_use]
pub fn column_at(x: u16) -> RowColumn {
    if x < KEY_X {
        RowColumn::Kind
    } else if x < VALUE_X {
        RowColumn::Key
    } else {
        RowColumn::Value
    }
}

/// The field at form line `line` and horizontal offset `x`.
#[must_use]
pub fn field_at(tab: &TabPage, line: usize, x: u16) -> Option<Field> {
    match line {
        0 => Some(Field::WorkDir),
        1 => Some(Field::MainCommand),
        _ => {
            let index = line - HEADER_LINES;
            (index < tab.rows.len()).then(|| Field::Row {
                index,
                column: column_at(x),
            })
        }
    }
}

fn single_line(text: &str) -> String {
    text.replace('\n', NEWLINE_MARK)
}

/// Ratatui widget that renders the fields of one tab
pub struct FormWidget<'a> {
    tab: &'a TabPage,
    cursor: Field,
    editing: Option<&'a Editing>,
    scroll_offset: usize,
}

impl<'a> FormWidget<'a> {
    #[must_use]
    pub fn new(
        tab: &'a TabPage,
        cursor: Field,
        editing: Option<&'a Editing>,
        scroll_offset: usize,
    ) -> Self {
        Self {
            tab,
            cursor,
            editing,
            scroll_offset,
        }
    }

    fn cell_style(&self, field: Field) -> Style {
        if self.editing.is_some_and(|e| e.field == field) {
            Style::default().fg(Color::White).bg(theme::EDITING_BG)
        } else if self.cursor == field {
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::UNDERLINED)
        } else {
            Style::default().fg(theme::FIELD)
        }
    }

    /// Spans for a text cell: the edit buffer with a cursor, or the stored value.
    fn text_cell(&self, field: Field, value: &str, placeholder: &str) -> Vec<Span<'static>> {
        let style = self.cell_style(field);
        if let Some(editing) = self.editing.filter(|e| e.field == field) {
            let (before, after) = editing.input.split_at_cursor();
            return vec![
                Span::styled(single_line(before), style),
                Span::styled("█", Style::default().fg(theme::ACCENT).bg(theme::EDITING_BG)),
                Span::styled(single_line(after), style),
            ];
        }
        if value.is_empty() {
            let dim = if self.cursor == field {
                style.fg(theme::DIM)
            } else {
                Style::default().fg(theme::DIM)
            };
            return vec![Span::styled(placeholder.to_string(), dim)];
        }
        vec![Span::styled(single_line(value), style)]
    }

    fn header_line(&self, field: Field, label: &str, value: &str) -> (Line<'static>, Line<'static>) {
        let label_style = if self.cursor == field {
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        (
            Line::from(Span::styled(label.to_string(), label_style)),
            Line::from(self.text_cell(field, value, "(not set)")),
        )
    }

    fn option_hint(row: &ParameterRow) -> Option<Span<'static>> {
        if row.options.is_empty() || row.kind == RowKind::Text {
            return None;
        }
        let total = row.options.len();
        let hint = match row.options.iter().position(|o| *o == row.value) {
            Some(i) => format!("  ‹{}/{total}›", i + 1),
            None => format!("  ‹{total} options›"),
        };
        Some(Span::styled(hint, Style::default().fg(theme::DIM)))
    }

    fn row_cells(&self, index: usize, row: &ParameterRow) -> [Line<'static>; 3] {
        let field = |column| Field::Row { index, column };
        let kind = Line::from(Span::styled(
            format!("[{}]", row.kind.label()),
            self.cell_style(field(RowColumn::Kind)),
        ));
        let key = Line::from(self.text_cell(field(RowColumn::Key), &row.key, "·"));
        let placeholder = match row.kind {
            RowKind::Toggle => "·",
            RowKind::File => "(file path)",
            RowKind::Directory => "(directory path)",
            RowKind::Text => "(text)",
        };
        let mut value = self.text_cell(field(RowColumn::Value), &row.value, placeholder);
        if self.editing.is_none()
            && let Some(hint) = Self::option_hint(row)
        {
            value.push(hint);
        }
        [kind, key, Line::from(value)]
    }
}

impl Widget for FormWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let line_count = HEADER_LINES + self.tab.rows.len();
        let visible = (self.scroll_offset..line_count).take(usize::from(area.height));

        for (i, line) in visible.enumerate() {
            let y = area.y + u16::try_from(i).unwrap_or(u16::MAX);
            if y >= area.bottom() {
                break;
            }

            let is_cursor_line = match self.cursor {
                Field::WorkDir => line == 0,
                Field::MainCommand => line == 1,
                Field::Row { index, .. } => line == HEADER_LINES + index,
            };
            if is_cursor_line {
                buf.set_string(area.x, y, "❯", Style::default().fg(theme::ACCENT));
            }

            let cells: Vec<(u16, Line)> = match line {
                0 => {
                    let (label, value) =
                        self.header_line(Field::WorkDir, "Work dir", &self.tab.work_dir);
                    vec![(GUTTER, label), (VALUE_X, value)]
                }
                1 => {
                    let (label, value) =
                        self.header_line(Field::MainCommand, "Command", &self.tab.main_cmd);
                    vec![(GUTTER, label), (VALUE_X, value)]
                }
                _ => {
                    let index = line - HEADER_LINES;
                    let [kind, key, value] = self.row_cells(index, &self.tab.rows[index]);
                    vec![(GUTTER, kind), (KEY_X, key), (VALUE_X, value)]
                }
            };

            for (n, (x, cell)) in cells.iter().enumerate() {
                let start = area.x.saturating_add(*x);
                if start >= area.right() {
                    continue;
                }
                // Leave one blank column before the next cell
                let width = match cells.get(n + 1) {
                    Some((next, _)) => (area.right() - start).min(next - x - 1),
                    None => area.right() - start,
                };
                buf.set_line(start, y, cell, width);
            }
        }

        if self.tab.rows.is_empty() {
            let offset = line_count.saturating_sub(self.scroll_offset);
            let y = area.y.saturating_add(u16::try_from(offset).unwrap_or(u16::MAX));
            if y < area.bottom() {
                buf.set_string(
                    area.x + GUTTER,
                    y,
                    "No parameters. Press A to add one.",
                    Style::default().fg(theme::DIM),
                );
            }
        }
    }
}
