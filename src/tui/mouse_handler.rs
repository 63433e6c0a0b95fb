use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use super::app::App;
use super::form_widget;

/// Lines scrolled per wheel step
const WHEEL_STEP: i32 = 3;

impl App {
    /// Handle mouse input. `form_area` is where the form was last rendered.
    pub fn handle_mouse(&mut self, mouse: MouseEvent, form_area: Rect) {
        if let Some(dialog) = self.dialog.as_mut() {
            match mouse.kind {
                MouseEventKind::ScrollUp => dialog.scroll(-WHEEL_STEP),
                MouseEventKind::ScrollDown => dialog.scroll(WHEEL_STEP),
                _ => {}
            }
            return;
        }

        // Handle toolbar interactions
        if mouse.row >= self.toolbar.y {
            match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    if let Some(region) = self
                        .toolbar
                        .regions
                        .iter()
                        .find(|r| mouse.column >= r.x_start && mouse.column < r.x_end)
                    {
                        let action = region.action;
                        self.execute_toolbar_action(action);
                    }
                }
                MouseEventKind::Moved => {
                    self.toolbar.hover = self
                        .toolbar
                        .regions
                        .iter()
                        .position(|r| mouse.column >= r.x_start && mouse.column < r.x_end);
                }
                _ => {}
            }
            return;
        }

        // Mouse is not on toolbar, clear hover
        self.toolbar.hover = None;

        if self.editing.is_some() {
            return;
        }

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) if mouse.row == self.tab_bar.y => {
                if let Some(index) = self
                    .tab_bar
                    .regions
                    .iter()
                    .position(|&(start, end)| mouse.column >= start && mouse.column < end)
                {
                    self.select_tab(index);
                }
            }
            MouseEventKind::Down(MouseButton::Left) if !self.show_logs => {
                if mouse.row < form_area.y || mouse.row >= form_area.bottom() {
                    return;
                }
                let line = usize::from(mouse.row - form_area.y) + self.form_scroll;
                let x = mouse.column.saturating_sub(form_area.x);
                if let Some(field) = form_widget::field_at(self.tab(), line, x) {
                    let already_focused = self.focused_field() == field;
                    self.focus(field);
                    if already_focused {
                        self.begin_edit();
                    }
                }
            }
            MouseEventKind::ScrollUp => {
                if self.show_logs {
                    self.log_scroll = (self.log_scroll + 3).min(self.log_buffer.len());
                } else {
                    self.cursor_up();
                }
            }
            MouseEventKind::ScrollDown => {
                if self.show_logs {
                    self.log_scroll = self.log_scroll.saturating_sub(3);
                } else {
                    self.cursor_down();
                }
            }
            _ => {}
        }
    }
}
