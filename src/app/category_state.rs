use std::time::Instant;

use tracing::warn;

use crate::{constants::BUDGET_SETTINGS, storage};

use super::App;

impl App {
    pub(super) fn persist_timers(&self) {
        let snapshot = self.tracker.snapshot();
        if let Err(e) = storage::write_json_atomic(&storage::get_timers_path(), &snapshot.timers) {
            warn!("could not save timers: {}", e);
        }
    }

    pub(super) fn persist_snapshot(&self) {
        if let Err(e) = storage::save_snapshot(
            &storage::get_categories_path(),
            &storage::get_timers_path(),
            &self.tracker.snapshot(),
        ) {
            warn!("could not save snapshot: {}", e);
        }
    }

    pub(super) fn selected_name(&self) -> Option<String> {
        self.tracker
            .rows()
            .get(self.selected_index)
            .map(|row| row.name.clone())
    }

    /// Row count changes under the selection on add/remove/rename; the modal
    /// has one extra row (the insert space) below the categories.
    pub(super) fn clamp_selection(&mut self) {
        let count = self.tracker.category_count();
        let max = if self.in_category_modal() {
            count
        } else {
            count.saturating_sub(1)
        };
        self.selected_index = self.selected_index.min(max);
    }

    pub(super) fn toggle_selected(&mut self) {
        let Some(name) = self.selected_name() else {
            return;
        };
        if self.tracker.is_running_category(&name) {
            if self.tracker.pause_at(Instant::now()) {
                self.persist_timers();
            }
        } else {
            self.tracker.start_at(&name, Instant::now());
        }
    }

    pub(super) fn pause_countdown(&mut self) {
        if self.tracker.pause_at(Instant::now()) {
            self.persist_timers();
        }
    }

    pub(super) fn adjust_selected(&mut self, delta_secs: f64) {
        let Some(name) = self.selected_name() else {
            return;
        };
        if self.tracker.adjust_remaining_at(&name, delta_secs, Instant::now()) {
            self.persist_timers();
        }
    }

    pub(super) fn adjust_selected_default(&mut self, delta_secs: i64) {
        let Some(name) = self.selected_name() else {
            return;
        };
        let Some(budget) = self.tracker.default_budget(&name) else {
            return;
        };
        let adjusted = budget.saturating_add_signed(delta_secs);
        if self.tracker.set_default_budget(&name, adjusted) {
            self.persist_snapshot();
        }
    }

    pub(super) fn add_category(&mut self) {
        match self
            .tracker
            .add_category(&self.name_input, BUDGET_SETTINGS.new_category_secs)
        {
            Ok(()) => {
                self.name_input = String::new();
                self.persist_snapshot();
                self.clamp_selection();
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    pub(super) fn begin_rename(&mut self) {
        let Some(name) = self.selected_name() else {
            return;
        };
        self.renaming = true;
        self.name_input = name;
    }

    pub(super) fn apply_rename(&mut self) {
        let Some(old) = self.selected_name() else {
            self.renaming = false;
            return;
        };
        match self.tracker.rename_category(&old, &self.name_input) {
            Ok(()) => {
                self.renaming = false;
                self.name_input = String::new();
                self.persist_snapshot();
                self.clamp_selection();
            }
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    pub(super) fn delete_selected(&mut self) {
        let Some(name) = self.selected_name() else {
            return;
        };
        if self.tracker.remove_category(&name) {
            self.persist_snapshot();
            self.clamp_selection();
        }
    }

    pub(super) fn start_selected(&mut self) {
        let Some(name) = self.selected_name() else {
            return;
        };
        self.tracker.start_at(&name, Instant::now());
    }

    pub(super) fn reset_all(&mut self) {
        self.tracker.reset_all();
        self.persist_timers();
    }
}
