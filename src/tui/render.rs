use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

use super::app::App;
use super::form_widget::FormWidget;
use super::toolbar;
use crate::{logger, theme};

/// Separator between tab titles
const TAB_SEP: &str = "│";

fn render_scrollbar(frame: &mut Frame, area: Rect, total: usize, position: usize) {
    let mut state = ScrollbarState::new(total).position(position);
    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .thumb_style(Style::default().fg(theme::ACCENT)),
        area,
        &mut state,
    );
}

impl App {
    /// Render the app. Returns the area the form was drawn in.
    pub fn render(&mut self, frame: &mut Frame) -> Rect {
        let size = frame.area();

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // tab bar
                Constraint::Length(1), // divider
                Constraint::Min(1),
                Constraint::Length(1), // toolbar
            ])
            .split(size);

        let tab_bar_area = outer[0];
        let divider_area = outer[1];
        let main_area = outer[2];
        let toolbar_area = outer[3];

        self.render_tab_bar(frame, tab_bar_area);

        let divider = "─".repeat(usize::from(divider_area.width));
        frame.render_widget(
            Paragraph::new(Span::styled(divider, Style::default().fg(theme::DIM))),
            divider_area,
        );

        if self.show_logs {
            self.render_log_panel(frame, main_area);
        } else {
            self.ensure_cursor_visible(usize::from(main_area.height));
            let form = FormWidget::new(
                self.session.current(),
                self.focused_field(),
                self.editing.as_ref(),
                self.form_scroll,
            );
            frame.render_widget(form, main_area);
        }

        let (toolbar_line, regions) = toolbar::build_toolbar_line(self, toolbar_area.width);
        self.toolbar.regions = regions;
        self.toolbar.y = toolbar_area.y;
        frame.render_widget(Paragraph::new(toolbar_line), toolbar_area);

        if let Some(dialog) = &self.dialog {
            frame.render_widget(dialog, size);
        }

        main_area
    }

    fn render_tab_bar(&mut self, frame: &mut Frame, area: Rect) {
        let selected_style = Style::default()
            .fg(Color::Black)
            .bg(theme::ACCENT)
            .add_modifier(Modifier::BOLD);
        let idle_style = Style::default().fg(theme::FIELD);
        let sep_style = Style::default().fg(theme::DIM);

        let mut spans = Vec::new();
        let mut regions = Vec::new();
        let mut x = area.x;
        for (i, tab) in self.session.tabs().iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(TAB_SEP, sep_style));
                x = x.saturating_add(1);
            }
            let title = format!(" {} ", tab.name);
            let width = u16::try_from(title.chars().count()).unwrap_or(u16::MAX);
            let style = if i == self.session.selected() {
                selected_style
            } else {
                idle_style
            };
            spans.push(Span::styled(title, style));
            regions.push((x, x.saturating_add(width)));
            x = x.saturating_add(width);
        }

        self.tab_bar.regions = regions;
        self.tab_bar.y = area.y;

        if let Some(status) = &self.status {
            let used = x.saturating_sub(area.x);
            let text = format!(" {status} ");
            let text_width = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
            if used.saturating_add(text_width) < area.width {
                let gap = area.width - used - text_width;
                spans.push(Span::raw(" ".repeat(usize::from(gap))));
                spans.push(Span::styled(text, Style::default().fg(theme::DIM)));
            }
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_log_panel(&self, frame: &mut Frame, area: Rect) {
        let count = self.log_buffer.len();

        // Split into header + content
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(area);

        let header_area = chunks[0];
        let content_area = chunks[1];

        let header = Line::from(vec![Span::styled(
            format!(" Logs ({count}) "),
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )]);
        frame.render_widget(Paragraph::new(header), header_area);

        if count == 0 {
            let empty =
                Paragraph::new("No log messages yet.").style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, content_area);
            return;
        }

        let visible_height = usize::from(content_area.height);
        let max_scroll = count.saturating_sub(visible_height);
        let scroll = self.log_scroll.min(max_scroll);

        let log_start = self.log_buffer.start();
        let lines: Vec<Line> = self
            .log_buffer
            .window(visible_height, scroll)
            .into_iter()
            .map(|entry| {
                let elapsed = entry.timestamp.duration_since(log_start).as_secs_f64();
                Line::from(vec![
                    Span::styled(
                        format!("{elapsed:>6.1}s "),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(
                        format!("{:5}", entry.level),
                        Style::default().fg(logger::level_color(entry.level)),
                    ),
                    Span::raw(" "),
                    Span::styled(
                        format!("{}: ", entry.target),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(entry.message),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines), content_area);

        if count > visible_height {
            render_scrollbar(frame, content_area, max_scroll, max_scroll - scroll);
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use crate::config_file::{ConfigStore, LoadOutcome, LoadSource};
    use crate::session::Session;
    use crate::tui::app::App;
    use crate::tui::log_state::LogBuffer;

    #[test]
    fn test_render_records_tab_regions_and_toolbar() {
        let loaded = LoadOutcome {
            session: Session::new(),
            source: LoadSource::Default,
            error: None,
        };
        let mut app = App::new(ConfigStore::default(), loaded, LogBuffer::new());
        app.session.add_tab(Some("Models"));

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let mut form_area = ratatui::layout::Rect::default();
        terminal
            .draw(|frame| form_area = app.render(frame))
            .unwrap();

        assert_eq!(app.tab_bar.regions, vec![(0, 7), (8, 16)]);
        assert_eq!(app.tab_bar.y, 0);
        assert_eq!(app.toolbar.y, 19);
        assert!(!app.toolbar.regions.is_empty());
        assert_eq!(form_area, ratatui::layout::Rect::new(0, 2, 80, 17));
    }
}
