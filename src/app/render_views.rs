use chrono::Local;
use ratatui::prelude::{Line, Span};
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    widgets::{Block, BorderType, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::countdown::CountdownPhase;

use super::{App, time_format, ui_helpers, view_style};

impl App {
    pub(super) fn draw_frame(&mut self, f: &mut Frame) {
        let size = f.size();
        let rows = self.tracker.rows();

        let session_label = match self.tracker.phase() {
            CountdownPhase::Idle => "idle".to_string(),
            CountdownPhase::Running => {
                format!("▶ {}", self.tracker.active_category().unwrap_or_default())
            }
            CountdownPhase::Paused => {
                format!("⏸ {}", self.tracker.active_category().unwrap_or_default())
            }
        };
        let clock = Local::now().format("%H:%M:%S").to_string();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(
                Line::from(Span::styled(
                    "tagwerk",
                    Style::default().add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Left),
            )
            .title(Line::from(session_label.as_str()).alignment(Alignment::Center))
            .title(Line::from(clock.as_str()).alignment(Alignment::Right))
            .border_style(Style::default().fg(view_style::phase_color(self.tracker.phase())));

        let inner = block.inner(size);
        f.render_widget(block, size);

        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let footer_height = inner.height.min(1);
        let list_area = Rect::new(
            inner.x,
            inner.y,
            inner.width,
            inner.height - footer_height,
        );
        let footer_area = Rect::new(
            inner.x,
            inner.y + list_area.height,
            inner.width,
            footer_height,
        );

        let items: Vec<ListItem> = rows
            .iter()
            .map(|row| {
                let marker = if self.tracker.is_running_category(&row.name) {
                    "▶"
                } else if self.tracker.active_category() == Some(row.name.as_str()) {
                    "⏸"
                } else {
                    " "
                };
                let exhausted = row.remaining_secs <= 0.0;
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{} ", marker)),
                    Span::raw(format!(
                        "{:<17}",
                        ui_helpers::truncate_label(&row.name, 16)
                    )),
                    Span::styled(
                        format!("{:>9}", time_format::format_hms(row.remaining_secs)),
                        view_style::remaining_style(exhausted),
                    ),
                    Span::styled(
                        format!(" / {}", time_format::format_hms(row.budget_secs as f64)),
                        view_style::budget_style(),
                    ),
                ]))
            })
            .collect();

        let mut list_state = ListState::default();
        if !rows.is_empty() {
            list_state.select(Some(self.selected_index.min(rows.len() - 1)));
        }

        let list =
            List::new(items).highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        f.render_stateful_widget(list, list_area, &mut list_state);

        let footer = match &self.notice {
            Some(notice) => Line::from(Span::styled(notice.clone(), view_style::notice_style())),
            None if self.in_category_modal() => Line::from(Span::styled(
                "enter start · r rename · x delete · +/- default budget · esc close",
                view_style::hint_style(),
            )),
            None => Line::from(Span::styled(
                "enter start/pause · +/- adjust · e edit · R reset all · q quit",
                view_style::hint_style(),
            )),
        };
        f.render_widget(Paragraph::new(footer), footer_area);

        if self.in_category_modal() {
            self.render_modal(f, size);
        }
    }

    fn render_modal(&self, f: &mut Frame, terminal_size: Rect) {
        let rows = self.tracker.rows();
        let modal_rect = self.modal_rect(terminal_size);

        let items: Vec<ListItem> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let label = if i == self.selected_index && self.renaming {
                    format!("{}▏", self.name_input)
                } else {
                    row.name.clone()
                };
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{:<17}", ui_helpers::truncate_label(&label, 16))),
                    Span::styled(
                        format!("{:>9}", time_format::format_hms(row.budget_secs as f64)),
                        view_style::budget_style(),
                    ),
                ]))
            })
            .chain(std::iter::once(ListItem::new(Line::from(
                if self.name_input.is_empty() || self.renaming {
                    "+ Add new...".to_string()
                } else {
                    self.name_input.clone()
                },
            ))))
            .collect();

        let mut list_state = ListState::default();
        list_state.select(Some(self.selected_index));

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title("categories")
                    .title_alignment(Alignment::Center)
                    .border_style(Style::default().fg(view_style::accent_color())),
            )
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        f.render_widget(Clear, modal_rect);
        f.render_stateful_widget(list, modal_rect, &mut list_state);
    }
}
