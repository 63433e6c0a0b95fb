//! The in-memory tab collection and its lifecycle operations

use log::{debug, info};
use thiserror::Error;

use crate::form::tab::TabPage;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("At least one tab must be kept")]
    LastTab,
    #[error("No tab at index {0}")]
    NoSuchTab(usize),
    #[error("Tab name cannot be empty")]
    EmptyName,
}

const COPY_SUFFIX: &str = " (copy)";

/// All open tabs plus the selected one. There is always at least one tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    tabs: Vec<TabPage>,
    selected: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A session holding a single default tab.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tabs: vec![TabPage::new(default_tab_name(0))],
            selected: 0,
        }
    }

    /// Build a session from restored tabs.
    ///
    /// An empty list yields one default tab; an out-of-range `selected` is ignored.
    #[must_use]
    pub fn from_tabs(tabs: Vec<TabPage>, selected: Option<usize>) -> Self {
        if tabs.is_empty() {
            return Self::new();
        }
        let selected = selected.filter(|&i| i < tabs.len()).unwrap_or(0);
        Self { tabs, selected }
    }

    #[must_use]
    pub fn tabs(&self) -> &[TabPage] {
        &self.tabs
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    #[must_use]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[must_use]
    pub fn current(&self) -> &TabPage {
        &self.tabs[self.selected]
    }

    pub fn current_mut(&mut self) -> &mut TabPage {
        &mut self.tabs[self.selected]
    }

    #[must_use]
    pub fn tab(&self, index: usize) -> Option<&TabPage> {
        self.tabs.get(index)
    }

    pub fn tab_mut(&mut self, index: usize) -> Option<&mut TabPage> {
        self.tabs.get_mut(index)
    }

    /// Select the tab at `index`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoSuchTab` if `index` is out of range.
    pub fn select(&mut self, index: usize) -> Result<(), SessionError> {
        self.check_index(index)?;
        self.selected = index;
        Ok(())
    }

    /// Select the next or previous tab, wrapping around.
    pub fn select_relative(&mut self, forward: bool) {
        let len = self.tabs.len();
        self.selected = if forward {
            (self.selected + 1) % len
        } else {
            (self.selected + len - 1) % len
        };
    }

    /// The name a newly added tab gets when none is given.
    #[must_use]
    pub fn next_default_name(&self) -> String {
        default_tab_name(self.tabs.len())
    }

    /// Append a default tab and select it. Returns its index.
    pub fn add_tab(&mut self, name: Option<&str>) -> usize {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map_or_else(|| self.next_default_name(), str::to_string);
        info!("Adding tab '{name}'");
        self.tabs.push(TabPage::new(name));
        self.selected = self.tabs.len() - 1;
        self.selected
    }

    /// Remove the tab at `index`, keeping the selection on a valid tab.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::LastTab` when only one tab remains, or
    /// `SessionError::NoSuchTab` if `index` is out of range.
    pub fn remove_tab(&mut self, index: usize) -> Result<TabPage, SessionError> {
        self.check_index(index)?;
        if self.tabs.len() <= 1 {
            return Err(SessionError::LastTab);
        }
        let removed = self.tabs.remove(index);
        if self.selected > index || self.selected >= self.tabs.len() {
            self.selected = self.selected.saturating_sub(1);
        }
        info!("Removed tab '{}'", removed.name);
        Ok(removed)
    }

    /// Rename the tab at `index`. The name is trimmed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyName` for a blank name, or
    /// `SessionError::NoSuchTab` if `index` is out of range.
    pub fn rename_tab(&mut self, index: usize, name: &str) -> Result<(), SessionError> {
        self.check_index(index)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }
        debug!("Renaming tab {index} to '{name}'");
        self.tabs[index].name = name.to_string();
        Ok(())
    }

    /// Append a duplicate of the tab at `index` under a free name and select it.
    /// Returns the index of the copy.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoSuchTab` if `index` is out of range.
    pub fn copy_tab(&mut self, index: usize) -> Result<usize, SessionError> {
        self.check_index(index)?;
        let mut copy = self.tabs[index].clone();
        copy.name = copy_name(&copy.name, self.tabs.iter().map(|t| t.name.as_str()));
        info!("Copied tab '{}' to '{}'", self.tabs[index].name, copy.name);
        self.tabs.push(copy);
        self.selected = self.tabs.len() - 1;
        Ok(self.selected)
    }

    /// Move the selected tab one position left or right. Returns `false` at the edges.
    pub fn move_selected(&mut self, forward: bool) -> bool {
        let from = self.selected;
        let to = if forward {
            from + 1
        } else {
            match from.checked_sub(1) {
                Some(to) => to,
                None => return false,
            }
        };
        if to >= self.tabs.len() {
            return false;
        }
        self.tabs.swap(from, to);
        self.selected = to;
        true
    }

    /// Find a tab by exact name, falling back to a numeric index.
    #[must_use]
    pub fn find(&self, name_or_index: &str) -> Option<usize> {
        self.tabs
            .iter()
            .position(|t| t.name == name_or_index)
            .or_else(|| {
                name_or_index
                    .trim()
                    .parse::<usize>()
                    .ok()
                    .filter(|&i| i < self.tabs.len())
            })
    }

    fn check_index(&self, index: usize) -> Result<(), SessionError> {
        if index < self.tabs.len() {
            Ok(())
        } else {
            Err(SessionError::NoSuchTab(index))
        }
    }
}

fn default_tab_name(existing: usize) -> String {
    format!("Tab {}", existing + 1)
}

/// `"<name> (copy)"`, or `"<name> (copy) (N)"` with the smallest free `N`.
#[must_use]
pub fn copy_name<'a>(name: &str, existing: impl Iterator<Item = &'a str> + Clone) -> String {
    let base = format!("{name}{COPY_SUFFIX}");
    let taken = |candidate: &str| existing.clone().any(|n| n == candidate);
    if !taken(&base) {
        return base;
    }
    (1..)
        .map(|n| format!("{base} ({n})"))
        .find(|candidate| !taken(candidate))
        .unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(session: &Session) -> Vec<&str> {
        session.tabs().iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_new_session_has_one_default_tab() {
        let session = Session::new();
        assert_eq!(names(&session), vec!["Tab 1"]);
        assert_eq!(session.selected(), 0);
        assert_eq!(session.current().rows.len(), 5);
    }

    #[test]
    fn test_add_tab_selects_it() {
        let mut session = Session::new();
        assert_eq!(session.add_tab(None), 1);
        assert_eq!(session.add_tab(Some("  build ")), 2);
        assert_eq!(session.add_tab(Some("   ")), 3);
        assert_eq!(names(&session), vec!["Tab 1", "Tab 2", "build", "Tab 4"]);
        assert_eq!(session.selected(), 3);
    }

    #[test]
    fn test_remove_last_tab_is_refused() {
        let mut session = Session::new();
        assert_eq!(session.remove_tab(0), Err(SessionError::LastTab));
        assert_eq!(session.len(), 1);
        assert_eq!(session.remove_tab(5), Err(SessionError::NoSuchTab(5)));
    }

    #[test]
    fn test_remove_keeps_selection_valid() {
        let mut session = Session::new();
        session.add_tab(Some("b"));
        session.add_tab(Some("c"));
        assert_eq!(session.selected(), 2);

        session.remove_tab(2).unwrap();
        assert_eq!(session.selected(), 1);
        assert_eq!(session.current().name, "b");

        session.remove_tab(0).unwrap();
        assert_eq!(session.selected(), 0);
        assert_eq!(session.current().name, "b");
    }

    #[test]
    fn test_rename() {
        let mut session = Session::new();
        session.rename_tab(0, " deploy ").unwrap();
        assert_eq!(session.current().name, "deploy");
        assert_eq!(session.rename_tab(0, "  "), Err(SessionError::EmptyName));
        assert_eq!(session.current().name, "deploy");
    }

    #[test]
    fn test_copy_generates_free_names() {
        let mut session = Session::from_tabs(vec![TabPage::new("A")], None);
        session.copy_tab(0).unwrap();
        session.copy_tab(0).unwrap();
        session.copy_tab(0).unwrap();
        assert_eq!(
            names(&session),
            vec!["A", "A (copy)", "A (copy) (1)", "A (copy) (2)"]
        );
        assert_eq!(session.selected(), 3);
        assert_eq!(session.tabs()[3].rows, session.tabs()[0].rows);
    }

    #[test]
    fn test_copy_name_skips_taken_suffixes() {
        let existing = ["A", "A (copy)", "A (copy) (1)", "A (copy) (3)"];
        assert_eq!(copy_name("A", existing.iter().copied()), "A (copy) (2)");
        assert_eq!(copy_name("B", existing.iter().copied()), "B (copy)");
    }

    #[test]
    fn test_from_tabs_ignores_invalid_selection() {
        let session = Session::from_tabs(vec![TabPage::new("a"), TabPage::new("b")], Some(7));
        assert_eq!(session.selected(), 0);
        let session = Session::from_tabs(vec![TabPage::new("a"), TabPage::new("b")], Some(1));
        assert_eq!(session.selected(), 1);
        assert_eq!(Session::from_tabs(Vec::new(), Some(3)), Session::new());
    }

    #[test]
    fn test_move_and_cycle_selection() {
        let mut session = Session::from_tabs(
            vec![TabPage::new("a"), TabPage::new("b"), TabPage::new("c")],
            Some(0),
        );
        assert!(!session.move_selected(false));
        assert!(session.move_selected(true));
        assert_eq!(names(&session), vec!["b", "a", "c"]);
        assert_eq!(session.selected(), 1);

        session.select_relative(false);
        session.select_relative(false);
        assert_eq!(session.selected(), 2);
        session.select_relative(true);
        assert_eq!(session.selected(), 0);
    }

    #[test]
    fn test_find_by_name_or_index() {
        let session = Session::from_tabs(vec![TabPage::new("a"), TabPage::new("1")], None);
        assert_eq!(session.find("a"), Some(0));
        assert_eq!(session.find("1"), Some(1));
        assert_eq!(session.find("0"), Some(0));
        assert_eq!(session.find("9"), None);
        assert_eq!(session.find("missing"), None);
    }
}
