use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, HEADER_LINES};
use super::dialog::Dialog;
use super::text_input::InputOutcome;

impl App {
    /// Handle keyboard input
    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        // Global keys
        if key.code == KeyCode::Char('c') && ctrl {
            self.should_quit = true;
            return;
        }

        if self.dialog.is_some() {
            self.handle_dialog_key(key);
            return;
        }

        if self.editing.is_some() {
            self.handle_edit_key(key);
            return;
        }

        if self.show_logs {
            self.handle_log_key(key);
            return;
        }

        self.status = None;

        match key.code {
            KeyCode::Char('s') if ctrl => self.save(),
            KeyCode::Char('x') if ctrl => self.confirm_reset_all(),
            KeyCode::Char(_) if ctrl => {}
            KeyCode::Char('q') => self.should_quit = true,

            // Form navigation
            KeyCode::Char('j') | KeyCode::Down => self.cursor_down(),
            KeyCode::Char('k') | KeyCode::Up => self.cursor_up(),
            KeyCode::Char('h') | KeyCode::Left => self.column_left(),
            KeyCode::Char('l') | KeyCode::Right => self.column_right(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = HEADER_LINES + self.tab().rows.len() - 1,
            KeyCode::Enter | KeyCode::Char('i') => self.begin_edit(),
            KeyCode::Char(' ' | 't') => self.cycle_kind(),
            KeyCode::Char('[') => self.cycle_option(-1),
            KeyCode::Char(']') => self.cycle_option(1),

            // Rows
            KeyCode::Char('a' | '+') => self.add_row(),
            KeyCode::Char('d' | '-') | KeyCode::Delete => self.remove_row(),
            KeyCode::Char('x' | '0') => self.clear_row(),

            // Tabs
            KeyCode::Tab => self.cycle_tab(true),
            KeyCode::BackTab => self.cycle_tab(false),
            KeyCode::Char(c @ '1'..='9') => {
                if let Some(index) = c.to_digit(10).and_then(|d| usize::try_from(d - 1).ok()) {
                    self.select_tab(index);
                }
            }
            KeyCode::Char('n') => self.prompt_add_tab(),
            KeyCode::Char('r') => self.prompt_rename_tab(),
            KeyCode::Char('w') => self.confirm_remove_tab(),
            KeyCode::Char('y') => self.copy_tab(),
            KeyCode::Char('<') => self.move_tab(false),
            KeyCode::Char('>') => self.move_tab(true),
            KeyCode::Char('z') => self.confirm_reset_tab(),

            // Commands
            KeyCode::Char('p') => self.preview(),
            KeyCode::Char('e') | KeyCode::F(5) => self.execute(),
            KeyCode::Char('?') => self.show_help(),
            KeyCode::F(1) => self.show_readme(),
            KeyCode::Char('L') => self.toggle_logs(),
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, key: KeyEvent) {
        let Some(editing) = self.editing.as_mut() else {
            return;
        };
        match editing.input.handle_key(key) {
            InputOutcome::Submit => self.commit_edit(),
            InputOutcome::Cancel => self.cancel_edit(),
            InputOutcome::Complete => self.complete_edit(),
            InputOutcome::Edited | InputOutcome::Moved | InputOutcome::Ignored => {}
        }
    }

    fn handle_log_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('L') | KeyCode::Esc => self.toggle_logs(),
            KeyCode::Char('k') | KeyCode::Up => {
                self.log_scroll = (self.log_scroll + 1).min(self.log_buffer.len());
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.log_scroll = self.log_scroll.saturating_sub(1);
            }
            KeyCode::PageUp => {
                self.log_scroll = (self.log_scroll + 10).min(self.log_buffer.len());
            }
            KeyCode::PageDown => self.log_scroll = self.log_scroll.saturating_sub(10),
            KeyCode::End => self.log_scroll = 0,
            _ => {}
        }
    }

    fn handle_dialog_key(&mut self, key: KeyEvent) {
        let Some(dialog) = self.dialog.as_mut() else {
            return;
        };
        match dialog {
            Dialog::Message { .. } => {
                if matches!(
                    key.code,
                    KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ' | 'q')
                ) {
                    self.dialog = None;
                }
            }
            Dialog::Confirm { action, .. } => match key.code {
                KeyCode::Char('y' | 'Y') | KeyCode::Enter => {
                    let action = *action;
                    self.dialog = None;
                    self.apply_confirm(action);
                }
                KeyCode::Char('n' | 'N') | KeyCode::Esc => self.dialog = None,
                _ => {}
            },
            Dialog::Prompt { input, action, .. } => match input.handle_key(key) {
                InputOutcome::Submit => {
                    let action = *action;
                    let value = input.value().to_string();
                    self.dialog = None;
                    self.apply_prompt(action, &value);
                }
                InputOutcome::Cancel => self.dialog = None,
                InputOutcome::Edited
                | InputOutcome::Moved
                | InputOutcome::Complete
                | InputOutcome::Ignored => {}
            },
            Dialog::Document { .. } => match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => self.dialog = None,
                KeyCode::Char('k') | KeyCode::Up => dialog.scroll(-1),
                KeyCode::Char('j') | KeyCode::Down => dialog.scroll(1),
                KeyCode::PageUp => dialog.scroll(-10),
                KeyCode::PageDown | KeyCode::Char(' ') => dialog.scroll(10),
                KeyCode::Home => dialog.scroll(i32::from(i16::MIN)),
                _ => {}
            },
        }
    }
}
