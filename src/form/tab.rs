use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use log::debug;

use super::FormError;
use super::row::{DEFAULT_ROW_KINDS, ParameterRow, RowKind};
use crate::launch::ShellFamily;

/// Working directory of a freshly created tab
pub const DEFAULT_WORK_DIR: &str = "a_qwen_cli";
/// Base command of a freshly created tab
pub const DEFAULT_MAIN_COMMAND: &str = "bash qwen";

/// A named command profile: working directory, base command and parameter rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabPage {
    pub name: String,
    pub work_dir: String,
    pub main_cmd: String,
    pub rows: Vec<ParameterRow>,
}

impl TabPage {
    /// A tab with the default working directory, command and rows.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let mut tab = Self::empty(name);
        tab.reset();
        tab
    }

    /// A tab with no rows and blank fields.
    #[must_use]
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            work_dir: String::new(),
            main_cmd: String::new(),
            rows: Vec::new(),
        }
    }

    /// Restore the default working directory, command and rows. The name is kept.
    pub fn reset(&mut self) {
        self.work_dir = DEFAULT_WORK_DIR.to_string();
        self.main_cmd = DEFAULT_MAIN_COMMAND.to_string();
        self.rows = (0..DEFAULT_ROW_KINDS.len())
            .map(ParameterRow::with_index_defaults)
            .collect();
    }

    /// Insert a row right after `index`, taking the kind of the row at `index`.
    ///
    /// The new row gets the defaults of its position first, then the inherited kind.
    /// Returns the index of the inserted row.
    pub fn insert_row_after(&mut self, index: usize) -> usize {
        let at = (index + 1).min(self.rows.len());
        let kind = self.rows.get(index).map(|row| row.kind);
        let mut row = ParameterRow::with_index_defaults(at);
        if let Some(kind) = kind {
            row.set_kind(kind);
        }
        self.rows.insert(at, row);
        at
    }

    /// Append a row with the defaults of its position.
    pub fn push_row(&mut self) -> usize {
        let at = self.rows.len();
        self.rows.push(ParameterRow::with_index_defaults(at));
        at
    }

    pub fn remove_row(&mut self, index: usize) -> Option<ParameterRow> {
        (index < self.rows.len()).then(|| self.rows.remove(index))
    }

    /// Human-readable command line: path and text values single-quoted.
    ///
    /// # Errors
    ///
    /// Returns `FormError::MissingMainCommand` if the main command is blank.
    pub fn build_preview(&self) -> Result<String, FormError> {
        assemble(&self.main_cmd, &self.rows, preview_value)
    }

    /// Command line for the host shell: text values are base64-encoded so that they
    /// cross the shell boundary without quoting issues.
    ///
    /// # Errors
    ///
    /// Returns `FormError::MissingMainCommand` if the main command is blank.
    pub fn build_execution(&self) -> Result<String, FormError> {
        assemble(&self.main_cmd, &self.rows, execution_value)
    }

    /// The preview command, preceded by a directory change line when a working
    /// directory is set.
    ///
    /// # Errors
    ///
    /// Returns `FormError::MissingMainCommand` if the main command is blank.
    pub fn preview_script(&self, shell: ShellFamily) -> Result<String, FormError> {
        let command = self.build_preview()?;
        Ok(match self.work_dir() {
            Some(dir) => format!("{}\n{command}", shell.change_dir(dir)),
            None => command,
        })
    }

    /// The trimmed working directory, if one is set.
    #[must_use]
    pub fn work_dir(&self) -> Option<&str> {
        let dir = self.work_dir.trim();
        (!dir.is_empty()).then_some(dir)
    }
}

fn quoted(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else {
        format!("'{value}'")
    }
}

fn preview_value(row: &ParameterRow) -> String {
    let value = row.value.trim();
    match row.kind {
        RowKind::Toggle => value.to_string(),
        RowKind::Text | RowKind::File | RowKind::Directory => quoted(value),
    }
}

fn execution_value(row: &ParameterRow) -> String {
    let value = row.value.trim();
    match row.kind {
        RowKind::Toggle => value.to_string(),
        RowKind::Text if value.is_empty() => String::new(),
        RowKind::Text => STANDARD.encode(value),
        RowKind::File | RowKind::Directory => quoted(value),
    }
}

/// Join the main command with one token group per row, in row order.
fn assemble(
    main_cmd: &str,
    rows: &[ParameterRow],
    render_value: fn(&ParameterRow) -> String,
) -> Result<String, FormError> {
    let main_cmd = main_cmd.trim();
    if main_cmd.is_empty() {
        return Err(FormError::MissingMainCommand);
    }

    let mut parts = vec![main_cmd.to_string()];
    for row in rows {
        let key = row.key.trim();
        let value = render_value(row);
        match (key.is_empty(), value.is_empty()) {
            (false, false) => parts.push(format!("{key} {value}")),
            (false, true) => parts.push(key.to_string()),
            (true, false) => parts.push(value),
            (true, true) => {}
        }
    }
    let command = parts.join(" ");
    debug!("Built command with {} row(s): {command}", rows.len());
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tab_with(rows: Vec<ParameterRow>) -> TabPage {
        TabPage {
            main_cmd: "bash qwen".to_string(),
            rows,
            ..TabPage::empty("test")
        }
    }

    #[test]
    fn test_single_toggle_row_preview() {
        let tab = tab_with(vec![ParameterRow::new(
            RowKind::Toggle,
            "-m",
            "qwen-max-latest",
        )]);
        assert_eq!(tab.build_preview().unwrap(), "bash qwen -m qwen-max-latest");
        assert_eq!(
            tab.preview_script(ShellFamily::Posix).unwrap(),
            "bash qwen -m qwen-max-latest"
        );
    }

    #[test]
    fn test_emission_rules() {
        let tab = tab_with(vec![
            ParameterRow::new(RowKind::Toggle, "  --verbose ", ""),
            ParameterRow::new(RowKind::Toggle, "", " positional "),
            ParameterRow::new(RowKind::File, "", ""),
            ParameterRow::new(RowKind::Directory, "-d", " /tmp/out "),
            ParameterRow::new(RowKind::File, "", "in.txt"),
        ]);
        assert_eq!(
            tab.build_preview().unwrap(),
            "bash qwen --verbose positional -d '/tmp/out' 'in.txt'"
        );
    }

    #[test]
    fn test_text_rows_diverge_between_variants() {
        let tab = tab_with(vec![ParameterRow::new(
            RowKind::Text,
            "-dq",
            "  it's a\nmulti-line prompt ",
        )]);
        let preview = tab.build_preview().unwrap();
        assert_eq!(preview, "bash qwen -dq 'it's a\nmulti-line prompt'");

        let execution = tab.build_execution().unwrap();
        let token = execution.strip_prefix("bash qwen -dq ").unwrap();
        let decoded = STANDARD.decode(token).unwrap();
        assert_eq!(
            String::from_utf8(decoded).unwrap(),
            "it's a\nmulti-line prompt"
        );
    }

    #[test]
    fn test_empty_text_emits_key_only_in_both_variants() {
        let tab = tab_with(vec![ParameterRow::new(RowKind::Text, "-dq", "   ")]);
        assert_eq!(tab.build_preview().unwrap(), "bash qwen -dq");
        assert_eq!(tab.build_execution().unwrap(), "bash qwen -dq");
    }

    #[test]
    fn test_blank_main_command_is_rejected() {
        let mut tab = TabPage::new("t");
        tab.main_cmd = "   ".to_string();
        assert!(matches!(
            tab.build_preview(),
            Err(FormError::MissingMainCommand)
        ));
        assert!(matches!(
            tab.build_execution(),
            Err(FormError::MissingMainCommand)
        ));
        assert!(tab.preview_script(ShellFamily::Posix).is_err());
    }

    #[test]
    fn test_preview_script_changes_directory() {
        let mut tab = tab_with(vec![]);
        tab.work_dir = " work dir ".to_string();
        assert_eq!(
            tab.preview_script(ShellFamily::Posix).unwrap(),
            "cd \"work dir\"\nbash qwen"
        );
        assert_eq!(
            tab.preview_script(ShellFamily::Windows).unwrap(),
            "cd /d \"work dir\"\nbash qwen"
        );
    }

    #[test]
    fn test_new_tab_defaults_and_reset() {
        let mut tab = TabPage::new("Tab 1");
        assert_eq!(tab.work_dir, DEFAULT_WORK_DIR);
        assert_eq!(tab.main_cmd, DEFAULT_MAIN_COMMAND);
        assert_eq!(tab.rows.len(), 5);

        tab.rows.clear();
        tab.main_cmd.clear();
        tab.name = "renamed".to_string();
        tab.reset();
        assert_eq!(tab.rows.len(), 5);
        assert_eq!(tab.main_cmd, DEFAULT_MAIN_COMMAND);
        assert_eq!(tab.name, "renamed");
    }

    #[test]
    fn test_insert_row_after_inherits_kind() {
        let mut tab = TabPage::new("t");
        let at = tab.insert_row_after(3);
        assert_eq!(at, 4);
        assert_eq!(tab.rows[4].kind, RowKind::Directory);
        // Position 4 defaults to a text row with a sample prompt; the kind override keeps it
        assert_eq!(tab.rows[4].key, "-dq");
        assert_eq!(tab.rows.len(), 6);
        assert_eq!(tab.rows[5].kind, RowKind::Text);
    }

    #[test]
    fn test_push_and_remove_rows() {
        let mut tab = TabPage::empty("t");
        assert_eq!(tab.push_row(), 0);
        assert_eq!(tab.rows[0].key, "-m");
        assert!(tab.remove_row(3).is_none());
        assert!(tab.remove_row(0).is_some());
        assert!(tab.rows.is_empty());
    }
}
