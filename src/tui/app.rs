use log::{debug, error, info, warn};
use tokio::sync::mpsc;

use crate::config_file::{ConfigStore, LoadOutcome, LoadSource};
use crate::form::row::RowKind;
use crate::form::tab::TabPage;
use crate::help::{self, HelpError};
use crate::launch::{self, Output, ShellFamily};
use crate::paths;
use crate::session::Session;

use super::dialog::{ConfirmAction, Dialog, PromptAction, Severity};
use super::log_state::LogBuffer;
use super::text_input::TextInput;
use super::toolbar;

/// Events dispatched to the main application loop
pub enum AppEvent {
    LogUpdated,
}

/// Column of a parameter row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowColumn {
    Kind,
    Key,
    #[default]
    Value,
}

impl RowColumn {
    fn left(self) -> Self {
        match self {
            RowColumn::Kind | RowColumn::Key => RowColumn::Kind,
            RowColumn::Value => RowColumn::Key,
        }
    }

    fn right(self) -> Self {
        match self {
            RowColumn::Kind => RowColumn::Key,
            RowColumn::Key | RowColumn::Value => RowColumn::Value,
        }
    }
}

/// An editable field of the current tab
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    WorkDir,
    MainCommand,
    Row { index: usize, column: RowColumn },
}

/// Lines of the form above the first row
pub const HEADER_LINES: usize = 2;

/// A field being edited in place
#[derive(Debug, Clone)]
pub struct Editing {
    pub field: Field,
    pub input: TextInput,
}

/// Cached toolbar layout from the last render
#[derive(Debug)]
pub struct ToolbarCache {
    /// Toolbar shortcut hit regions
    pub regions: Vec<toolbar::ToolbarRegion>,
    /// Toolbar row (y coordinate)
    pub y: u16,
    /// Currently hovered toolbar shortcut index
    pub hover: Option<usize>,
}

impl Default for ToolbarCache {
    fn default() -> Self {
        Self {
            regions: Vec::new(),
            y: u16::MAX,
            hover: None,
        }
    }
}

/// Clickable tab titles from the last render
#[derive(Debug, Default)]
pub struct TabBarCache {
    /// `(x_start, x_end)` per tab, in tab order
    pub regions: Vec<(u16, u16)>,
    pub y: u16,
}

/// Main application state for the TUI
pub struct App {
    pub session: Session,
    pub store: ConfigStore,
    /// Focused form line: work dir, main command, then one line per row
    pub cursor: usize,
    /// Focused column while on a row line
    pub column: RowColumn,
    pub editing: Option<Editing>,
    pub dialog: Option<Dialog>,
    pub should_quit: bool,
    /// Whether the log panel is shown instead of the form
    pub show_logs: bool,
    /// Ring buffer of log entries
    pub log_buffer: LogBuffer,
    /// Scroll offset for the log panel (0 = bottom / newest)
    pub log_scroll: usize,
    /// First visible form line
    pub form_scroll: usize,
    /// Short feedback shown next to the tab bar
    pub status: Option<String>,
    pub toolbar: ToolbarCache,
    pub tab_bar: TabBarCache,
    pub event_tx: mpsc::Sender<AppEvent>,
    pub event_rx: mpsc::Receiver<AppEvent>,
}

impl App {
    #[must_use]
    pub fn new(store: ConfigStore, loaded: LoadOutcome, log_buffer: LogBuffer) -> Self {
        let (event_tx, event_rx) = mpsc::channel(256);
        let dialog = loaded.error.map(|e| {
            Dialog::error(
                "Load failed",
                format!("Unable to load the configuration:\n{e}\n\nStarted with a default tab."),
            )
        });
        let status = match loaded.source {
            LoadSource::Primary(path) | LoadSource::Example(path) => {
                Some(format!("Loaded {}", path.display()))
            }
            LoadSource::Default => None,
        };
        App {
            session: loaded.session,
            store,
            cursor: 0,
            column: RowColumn::default(),
            editing: None,
            dialog,
            should_quit: false,
            show_logs: false,
            log_buffer,
            log_scroll: 0,
            form_scroll: 0,
            status,
            toolbar: ToolbarCache::default(),
            tab_bar: TabBarCache::default(),
            event_tx,
            event_rx,
        }
    }

    /// Handle app events (called from event loop)
    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::LogUpdated => {
                // Redraw happens automatically on next frame
            }
        }
    }

    #[must_use]
    pub fn tab(&self) -> &TabPage {
        self.session.current()
    }

    /// The field under the cursor.
    #[must_use]
    pub fn focused_field(&self) -> Field {
        match self.cursor {
            0 => Field::WorkDir,
            1 => Field::MainCommand,
            line => Field::Row {
                index: line - HEADER_LINES,
                column: self.column,
            },
        }
    }

    /// Index of the row under the cursor, if the cursor is on a row.
    #[must_use]
    pub fn focused_row(&self) -> Option<usize> {
        match self.focused_field() {
            Field::Row { index, .. } => Some(index),
            Field::WorkDir | Field::MainCommand => None,
        }
    }

    fn line_count(&self) -> usize {
        HEADER_LINES + self.tab().rows.len()
    }

    fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.line_count() - 1);
    }

    /// Place the cursor on `field`.
    pub fn focus(&mut self, field: Field) {
        match field {
            Field::WorkDir => self.cursor = 0,
            Field::MainCommand => self.cursor = 1,
            Field::Row { index, column } => {
                self.cursor = HEADER_LINES + index;
                self.column = column;
            }
        }
        self.clamp_cursor();
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.line_count() {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn column_left(&mut self) {
        self.column = self.column.left();
    }

    pub fn column_right(&mut self) {
        self.column = self.column.right();
    }

    /// Adjust `form_scroll` so the cursor line is visible within the given height
    pub fn ensure_cursor_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.cursor < self.form_scroll {
            self.form_scroll = self.cursor;
        } else if self.cursor >= self.form_scroll + height {
            self.form_scroll = self.cursor - height + 1;
        }
    }

    // Field editing

    fn field_value(tab: &TabPage, field: Field) -> Option<&str> {
        match field {
            Field::WorkDir => Some(&tab.work_dir),
            Field::MainCommand => Some(&tab.main_cmd),
            Field::Row { index, column } => {
                let row = tab.rows.get(index)?;
                match column {
                    RowColumn::Kind => None,
                    RowColumn::Key => Some(&row.key),
                    RowColumn::Value => Some(&row.value),
                }
            }
        }
    }

    fn field_value_mut(tab: &mut TabPage, field: Field) -> Option<&mut String> {
        match field {
            Field::WorkDir => Some(&mut tab.work_dir),
            Field::MainCommand => Some(&mut tab.main_cmd),
            Field::Row { index, column } => {
                let row = tab.rows.get_mut(index)?;
                match column {
                    RowColumn::Kind => None,
                    RowColumn::Key => Some(&mut row.key),
                    RowColumn::Value => Some(&mut row.value),
                }
            }
        }
    }

    /// Start editing the focused field; on a kind column, cycle the kind instead.
    pub fn begin_edit(&mut self) {
        let field = self.focused_field();
        if let Field::Row {
            column: RowColumn::Kind,
            ..
        } = field
        {
            self.cycle_kind();
            return;
        }
        let Some(value) = Self::field_value(self.tab(), field) else {
            return;
        };
        let mut input = TextInput::new(value);
        if self.completion_mode(field).is_none() && self.is_text_value(field) {
            input = input.multiline();
        }
        self.editing = Some(Editing { field, input });
    }

    fn is_text_value(&self, field: Field) -> bool {
        match field {
            Field::Row {
                index,
                column: RowColumn::Value,
            } => self
                .tab()
                .rows
                .get(index)
                .is_some_and(|row| row.kind == RowKind::Text),
            _ => false,
        }
    }

    /// Whether `field` holds a path, and if so whether only directories qualify.
    #[must_use]
    pub fn completion_mode(&self, field: Field) -> Option<bool> {
        match field {
            Field::WorkDir => Some(true),
            Field::Row {
                index,
                column: RowColumn::Value,
            } => {
                let kind = self.tab().rows.get(index)?.kind;
                kind.is_path().then_some(kind == RowKind::Directory)
            }
            _ => None,
        }
    }

    /// Write the edited text back into the tab.
    pub fn commit_edit(&mut self) {
        let Some(editing) = self.editing.take() else {
            return;
        };
        if let Some(target) = Self::field_value_mut(self.session.current_mut(), editing.field) {
            *target = editing.input.into_value();
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Complete the path being edited.
    pub fn complete_edit(&mut self) {
        let Some(field) = self.editing.as_ref().map(|e| e.field) else {
            return;
        };
        let Some(dirs_only) = self.completion_mode(field) else {
            return;
        };
        if let Some(editing) = self.editing.as_mut() {
            match paths::complete(editing.input.value(), dirs_only) {
                Some(completed) => editing.input.set_value(completed),
                None => debug!("No completion for '{}'", editing.input.value()),
            }
        }
    }

    // Row operations

    pub fn cycle_kind(&mut self) {
        if let Some(index) = self.focused_row()
            && let Some(row) = self.session.current_mut().rows.get_mut(index)
        {
            row.set_kind(row.kind.next());
        }
    }

    pub fn cycle_option(&mut self, delta: isize) {
        if let Some(index) = self.focused_row()
            && let Some(row) = self.session.current_mut().rows.get_mut(index)
            && !row.cycle_option(delta)
        {
            self.status = Some("No options for this row".to_string());
        }
    }

    /// Insert a row after the focused one (or append when there are no rows).
    pub fn add_row(&mut self) {
        let focused = self.focused_row();
        let tab = self.session.current_mut();
        let at = match focused {
            Some(index) => tab.insert_row_after(index),
            None if tab.rows.is_empty() => tab.push_row(),
            None => tab.insert_row_after(tab.rows.len() - 1),
        };
        self.focus(Field::Row {
            index: at,
            column: self.column,
        });
    }

    pub fn remove_row(&mut self) {
        if let Some(index) = self.focused_row() {
            self.session.current_mut().remove_row(index);
            self.clamp_cursor();
        }
    }

    pub fn clear_row(&mut self) {
        if let Some(index) = self.focused_row()
            && let Some(row) = self.session.current_mut().rows.get_mut(index)
        {
            row.clear();
        }
    }

    // Tab operations

    /// Switch tabs and keep the cursor on a valid line.
    pub fn select_tab(&mut self, index: usize) {
        if self.session.select(index).is_ok() {
            self.after_tab_change();
        }
    }

    pub fn cycle_tab(&mut self, forward: bool) {
        self.session.select_relative(forward);
        self.after_tab_change();
    }

    fn after_tab_change(&mut self) {
        self.clamp_cursor();
        self.form_scroll = 0;
    }

    fn reset_view(&mut self) {
        self.cursor = 0;
        self.form_scroll = 0;
    }

    pub fn prompt_add_tab(&mut self) {
        let name = self.session.next_default_name();
        self.dialog = Some(Dialog::prompt("Add tab", "Tab name:", name, PromptAction::AddTab));
    }

    pub fn prompt_rename_tab(&mut self) {
        let index = self.session.selected();
        let name = self.tab().name.clone();
        self.dialog = Some(Dialog::prompt(
            "Rename tab",
            "New name:",
            name,
            PromptAction::RenameTab(index),
        ));
    }

    pub fn confirm_remove_tab(&mut self) {
        if self.session.len() <= 1 {
            self.dialog = Some(Dialog::message(
                "Warning",
                "At least one tab must be kept.",
                Severity::Warning,
            ));
            return;
        }
        let index = self.session.selected();
        self.dialog = Some(Dialog::confirm(
            "Confirm",
            format!("Remove '{}'?", self.tab().name),
            ConfirmAction::RemoveTab(index),
        ));
    }

    pub fn confirm_reset_tab(&mut self) {
        let index = self.session.selected();
        self.dialog = Some(Dialog::confirm(
            "Confirm",
            format!("Reset '{}' to the default parameters?", self.tab().name),
            ConfirmAction::ResetTab(index),
        ));
    }

    pub fn confirm_reset_all(&mut self) {
        self.dialog = Some(Dialog::confirm(
            "Confirm",
            format!(
                "Reset all tabs?\nThe configuration will be reloaded from {}.",
                self.store.example_path().display()
            ),
            ConfirmAction::ResetAll,
        ));
    }

    pub fn copy_tab(&mut self) {
        match self.session.copy_tab(self.session.selected()) {
            Ok(_) => self.after_tab_change(),
            Err(e) => self.dialog = Some(Dialog::error("Copy failed", e)),
        }
    }

    pub fn move_tab(&mut self, forward: bool) {
        if !self.session.move_selected(forward) {
            debug!("Tab already at the edge");
        }
    }

    /// Apply the text entered in a prompt dialog.
    pub fn apply_prompt(&mut self, action: PromptAction, value: &str) {
        let result = match action {
            PromptAction::AddTab => {
                if value.trim().is_empty() {
                    Err(crate::session::SessionError::EmptyName)
                } else {
                    self.session.add_tab(Some(value));
                    Ok(())
                }
            }
            PromptAction::RenameTab(index) => self.session.rename_tab(index, value),
        };
        match result {
            Ok(()) => self.after_tab_change(),
            Err(e) => {
                self.dialog = Some(Dialog::message("Warning", e.to_string(), Severity::Warning));
            }
        }
    }

    /// Run the action of a confirmed dialog.
    pub fn apply_confirm(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::RemoveTab(index) => match self.session.remove_tab(index) {
                Ok(_) => self.after_tab_change(),
                Err(e) => {
                    self.dialog = Some(Dialog::message("Warning", e.to_string(), Severity::Warning));
                }
            },
            ConfirmAction::ResetTab(index) => {
                if let Some(tab) = self.session.tab_mut(index) {
                    tab.reset();
                    info!("Reset tab '{}'", tab.name);
                }
                self.clamp_cursor();
            }
            ConfirmAction::ResetAll => self.reset_all(),
        }
    }

    /// Replace the session with the example configuration, or a single default tab.
    pub fn reset_all(&mut self) {
        let example = self.store.example_path().display().to_string();
        match self.store.load_example() {
            Ok(Some(session)) => {
                self.session = session;
                self.reset_view();
                self.dialog = Some(Dialog::message(
                    "Reset",
                    format!("Configuration reset from {example}"),
                    Severity::Info,
                ));
            }
            Ok(None) => {
                self.session = Session::new();
                self.reset_view();
                warn!("{example} not found, created a default tab");
                self.dialog = Some(Dialog::message(
                    "Warning",
                    format!("{example} not found, created a default tab"),
                    Severity::Warning,
                ));
            }
            Err(e) => {
                error!("Reset failed: {e}");
                self.dialog = Some(Dialog::error("Reset failed", e));
            }
        }
    }

    // Global actions

    pub fn save(&mut self) {
        match self.store.save(&self.session) {
            Ok(()) => {
                self.dialog = Some(Dialog::message(
                    "Saved",
                    format!("Configuration saved to {}", self.store.path().display()),
                    Severity::Info,
                ));
            }
            Err(e) => {
                error!("Save failed: {e}");
                self.dialog = Some(Dialog::error("Save failed", e));
            }
        }
    }

    pub fn preview(&mut self) {
        let tab = self.tab();
        self.dialog = Some(match tab.preview_script(ShellFamily::host()) {
            Ok(script) => Dialog::document(format!("Preview - {}", tab.name), script, false),
            Err(e) => Dialog::error("Error", e),
        });
    }

    pub fn execute(&mut self) {
        match launch::execute(self.tab(), Output::Discard) {
            Ok(pid) => self.status = Some(format!("Started in background (pid {pid})")),
            Err(e) => {
                error!("Execution failed: {e}");
                self.dialog = Some(Dialog::error("Execution failed", e));
            }
        }
    }

    pub fn show_help(&mut self) {
        let tab = self.tab();
        self.dialog = Some(match help::tab_help(tab.work_dir()) {
            Ok(doc) => Dialog::document(format!("Help - {}", tab.name), doc.body(), true),
            Err(e @ HelpError::NoWorkDir) => {
                Dialog::message("Warning", e.to_string(), Severity::Warning)
            }
        });
    }

    pub fn show_readme(&mut self) {
        let doc = help::readme(self.store.base_dir());
        self.dialog = Some(Dialog::document("README", doc.body(), true));
    }

    pub fn toggle_logs(&mut self) {
        self.show_logs = !self.show_logs;
        self.log_scroll = 0;
    }

    pub(super) fn execute_toolbar_action(&mut self, action: toolbar::ToolbarAction) {
        use toolbar::ToolbarAction;
        match action {
            ToolbarAction::Edit => self.begin_edit(),
            ToolbarAction::CycleKind => self.cycle_kind(),
            ToolbarAction::AddRow => self.add_row(),
            ToolbarAction::RemoveRow => self.remove_row(),
            ToolbarAction::ClearRow => self.clear_row(),
            ToolbarAction::NewTab => self.prompt_add_tab(),
            ToolbarAction::RenameTab => self.prompt_rename_tab(),
            ToolbarAction::CloseTab => self.confirm_remove_tab(),
            ToolbarAction::CopyTab => self.copy_tab(),
            ToolbarAction::Save => self.save(),
            ToolbarAction::Preview => self.preview(),
            ToolbarAction::Execute => self.execute(),
            ToolbarAction::Help => self.show_help(),
            ToolbarAction::Readme => self.show_readme(),
            ToolbarAction::ToggleLogs => self.toggle_logs(),
            ToolbarAction::ResetTab => self.confirm_reset_tab(),
            ToolbarAction::ResetAll => self.confirm_reset_all(),
            ToolbarAction::Quit => self.should_quit = true,
            ToolbarAction::ApplyEdit => self.commit_edit(),
            ToolbarAction::CancelEdit => self.cancel_edit(),
            ToolbarAction::Complete => self.complete_edit(),
        }
    }
}
