use crossterm::event::{KeyCode, KeyEvent};

use crate::constants::BUDGET_SETTINGS;

use super::{App, ui_helpers};

impl App {
    pub(super) fn handle_key(&mut self, key: KeyEvent) -> bool {
        self.notice = None;
        self.render_needed = true;

        if self.in_category_modal() {
            self.handle_modal_key(key);
            false
        } else {
            self.handle_normal_key(key)
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Up => {
                self.selected_index =
                    ui_helpers::wrap_prev_index(self.selected_index, self.tracker.category_count());
            }
            KeyCode::Down => {
                self.selected_index =
                    ui_helpers::wrap_next_index(self.selected_index, self.tracker.category_count());
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(),
            KeyCode::Char('p') => self.pause_countdown(),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.adjust_selected(BUDGET_SETTINGS.adjust_step_secs as f64);
            }
            KeyCode::Char('-') | KeyCode::Char('_') => {
                self.adjust_selected(-(BUDGET_SETTINGS.adjust_step_secs as f64));
            }
            KeyCode::Char('R') => self.reset_all(),
            KeyCode::Char('e') => self.open_modal(),
            _ => {}
        }
        false
    }

    fn handle_modal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                if self.renaming {
                    self.renaming = false;
                    self.name_input = String::new();
                } else {
                    self.close_modal();
                }
            }
            KeyCode::Up => {
                let total_rows = self.tracker.category_count() + 1;
                self.selected_index = ui_helpers::wrap_prev_index(self.selected_index, total_rows);
                self.renaming = false;
                self.name_input = String::new();
            }
            KeyCode::Down => {
                let total_rows = self.tracker.category_count() + 1;
                self.selected_index = ui_helpers::wrap_next_index(self.selected_index, total_rows);
                self.renaming = false;
                self.name_input = String::new();
            }
            KeyCode::Enter => {
                if self.renaming {
                    self.apply_rename();
                } else if self.is_on_insert_space() {
                    if !self.name_input.is_empty() {
                        self.add_category();
                    }
                } else {
                    self.start_selected();
                    self.close_modal();
                }
            }
            KeyCode::Backspace => {
                self.name_input.pop();
            }
            KeyCode::Char(c) => {
                if self.renaming || self.is_on_insert_space() {
                    self.name_input.push(c);
                } else {
                    match c {
                        'x' => self.delete_selected(),
                        'r' => self.begin_rename(),
                        '+' | '=' => {
                            self.adjust_selected_default(BUDGET_SETTINGS.default_step_secs);
                        }
                        '-' | '_' => {
                            self.adjust_selected_default(-BUDGET_SETTINGS.default_step_secs);
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
}
