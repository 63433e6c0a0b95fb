use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// What a key press did to a text input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    Edited,
    Moved,
    Submit,
    Cancel,
    /// Completion was requested (Tab)
    Complete,
    Ignored,
}

/// Editable text buffer with a character cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextInput {
    value: String,
    /// Cursor position in characters, `0..=value.chars().count()`
    cursor: usize,
    multiline: bool,
}

impl TextInput {
    /// Input holding `value` with the cursor at the end.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.chars().count();
        Self {
            value,
            cursor,
            multiline: false,
        }
    }

    /// Allow Alt+Enter / Shift+Enter to insert line breaks.
    #[must_use]
    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn into_value(self) -> String {
        self.value
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the text, moving the cursor to the end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    /// Text before and after the cursor.
    #[must_use]
    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.value.split_at(self.byte_index())
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_index();
        self.value.insert(at, c);
        self.cursor += 1;
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> InputOutcome {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => InputOutcome::Cancel,
            KeyCode::Enter
                if self.multiline
                    && key
                        .modifiers
                        .intersects(KeyModifiers::ALT | KeyModifiers::SHIFT) =>
            {
                self.insert('\n');
                InputOutcome::Edited
            }
            KeyCode::Enter => InputOutcome::Submit,
            KeyCode::Tab => InputOutcome::Complete,
            KeyCode::Char('u') if ctrl => {
                let at = self.byte_index();
                self.value.replace_range(..at, "");
                self.cursor = 0;
                InputOutcome::Edited
            }
            KeyCode::Char('a') if ctrl => {
                self.cursor = 0;
                InputOutcome::Moved
            }
            KeyCode::Char('e') if ctrl => {
                self.cursor = self.value.chars().count();
                InputOutcome::Moved
            }
            KeyCode::Char(_) if ctrl => InputOutcome::Ignored,
            KeyCode::Char(c) => {
                self.insert(c);
                InputOutcome::Edited
            }
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return InputOutcome::Ignored;
                }
                self.cursor -= 1;
                let at = self.byte_index();
                self.value.remove(at);
                InputOutcome::Edited
            }
            KeyCode::Delete => {
                if self.cursor >= self.value.chars().count() {
                    return InputOutcome::Ignored;
                }
                let at = self.byte_index();
                self.value.remove(at);
                InputOutcome::Edited
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                InputOutcome::Moved
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(self.value.chars().count());
                InputOutcome::Moved
            }
            KeyCode::Home => {
                self.cursor = 0;
                InputOutcome::Moved
            }
            KeyCode::End => {
                self.cursor = self.value.chars().count();
                InputOutcome::Moved
            }
            _ => InputOutcome::Ignored,
        }
    }
}
