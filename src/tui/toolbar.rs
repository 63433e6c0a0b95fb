use std::borrow::Cow;

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use super::app::{App, Field, RowColumn};
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarAction {
    Edit,
    CycleKind,
    AddRow,
    RemoveRow,
    ClearRow,
    NewTab,
    RenameTab,
    CloseTab,
    CopyTab,
    Save,
    Preview,
    Execute,
    Help,
    Readme,
    ToggleLogs,
    ResetTab,
    ResetAll,
    Quit,
    ApplyEdit,
    CancelEdit,
    Complete,
}

#[derive(Debug)]
pub struct ToolbarRegion {
    pub x_start: u16,
    pub x_end: u16,
    pub action: ToolbarAction,
}

struct Shortcut {
    key: &'static str,
    desc: Cow<'static, str>,
    action: ToolbarAction,
}

impl Shortcut {
    fn new(key: &'static str, desc: impl Into<Cow<'static, str>>, action: ToolbarAction) -> Self {
        Self {
            key,
            desc: desc.into(),
            action,
        }
    }

    /// Width this shortcut occupies: " key " (padded badge) + space + desc
    fn width(&self) -> usize {
        1 + self.key.chars().count() + 1 + 1 + self.desc.chars().count()
    }
}

fn get_shortcuts(app: &App) -> Vec<Shortcut> {
    let mut shortcuts = Vec::new();

    if let Some(editing) = &app.editing {
        shortcuts.push(Shortcut::new("ENTER", "Apply", ToolbarAction::ApplyEdit));
        shortcuts.push(Shortcut::new("ESC", "Cancel", ToolbarAction::CancelEdit));
        if app.completion_mode(editing.field).is_some() {
            shortcuts.push(Shortcut::new("TAB", "Complete path", ToolbarAction::Complete));
        }
        return shortcuts;
    }

    if app.show_logs {
        shortcuts.push(Shortcut::new("L", "Hide logs", ToolbarAction::ToggleLogs));
        shortcuts.push(Shortcut::new("Q", "Quit", ToolbarAction::Quit));
        return shortcuts;
    }

    match app.focused_field() {
        Field::Row {
            column: RowColumn::Kind,
            ..
        } => {
            shortcuts.push(Shortcut::new("ENTER", "Change type", ToolbarAction::CycleKind));
        }
        Field::Row { .. } => {
            shortcuts.push(Shortcut::new("ENTER", "Edit", ToolbarAction::Edit));
            shortcuts.push(Shortcut::new("T", "Type", ToolbarAction::CycleKind));
        }
        Field::WorkDir | Field::MainCommand => {
            shortcuts.push(Shortcut::new("ENTER", "Edit", ToolbarAction::Edit));
        }
    }
    shortcuts.push(Shortcut::new("E", "Execute", ToolbarAction::Execute));
    shortcuts.push(Shortcut::new("P", "Preview", ToolbarAction::Preview));
    shortcuts.push(Shortcut::new("^S", "Save", ToolbarAction::Save));
    shortcuts.push(Shortcut::new("A", "Add row", ToolbarAction::AddRow));
    if app.focused_row().is_some() {
        shortcuts.push(Shortcut::new("D", "Remove row", ToolbarAction::RemoveRow));
        shortcuts.push(Shortcut::new("X", "Clear row", ToolbarAction::ClearRow));
    }
    shortcuts.push(Shortcut::new("N", "New tab", ToolbarAction::NewTab));
    shortcuts.push(Shortcut::new("Y", "Copy tab", ToolbarAction::CopyTab));
    shortcuts.push(Shortcut::new("R", "Rename", ToolbarAction::RenameTab));
    shortcuts.push(Shortcut::new("W", "Close tab", ToolbarAction::CloseTab));
    shortcuts.push(Shortcut::new("?", "Help", ToolbarAction::Help));
    shortcuts.push(Shortcut::new("F1", "README", ToolbarAction::Readme));
    shortcuts.push(Shortcut::new("Z", "Reset tab", ToolbarAction::ResetTab));
    shortcuts.push(Shortcut::new("^X", "Reset all", ToolbarAction::ResetAll));
    shortcuts.push(Shortcut::new("L", "Logs", ToolbarAction::ToggleLogs));
    shortcuts.push(Shortcut::new("Q", "Quit", ToolbarAction::Quit));

    shortcuts
}

/// Separator between shortcuts
const SEP: &str = "  ";

pub fn build_toolbar_line(app: &App, width: u16) -> (Line<'static>, Vec<ToolbarRegion>) {
    let shortcuts = get_shortcuts(app);
    let max_width = usize::from(width);

    let key_style = Style::default()
        .fg(theme::TOOLBAR_KEY_FG)
        .bg(theme::TOOLBAR_KEY_BG)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default()
        .fg(theme::TOOLBAR_DESC)
        .bg(theme::TOOLBAR_BG);
    let bg_style = Style::default().bg(theme::TOOLBAR_BG);
    let hover_desc_style = desc_style.add_modifier(Modifier::UNDERLINED);

    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut regions: Vec<ToolbarRegion> = Vec::new();
    let mut x = 0usize;

    for (i, shortcut) in shortcuts.iter().enumerate() {
        let sep_width = if i > 0 { SEP.len() } else { 0 };
        if x + sep_width + shortcut.width() > max_width {
            break;
        }

        if i > 0 {
            spans.push(Span::styled(SEP, bg_style));
            x += sep_width;
        }

        let x_start = u16::try_from(x).unwrap_or(u16::MAX);
        let is_hovered = app.toolbar.hover == Some(i);

        spans.push(Span::styled(format!(" {} ", shortcut.key), key_style));
        spans.push(Span::styled(" ", bg_style));
        spans.push(Span::styled(
            shortcut.desc.clone(),
            if is_hovered {
                hover_desc_style
            } else {
                desc_style
            },
        ));

        x += shortcut.width();

        regions.push(ToolbarRegion {
            x_start,
            x_end: u16::try_from(x).unwrap_or(u16::MAX),
            action: shortcut.action,
        });
    }

    if x < max_width {
        spans.push(Span::styled(" ".repeat(max_width - x), bg_style));
    }

    (Line::from(spans), regions)
}
