use std::{collections::BTreeMap, time::Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    constants::{DEFAULT_CATEGORIES, TIME_SETTINGS},
    countdown::{Countdown, CountdownPhase},
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("category '{0}' already exists")]
    DuplicateName(String),

    #[error("category name cannot be empty")]
    EmptyName,

    #[error("invalid duration '{0}'")]
    InvalidDuration(String),
}

/// The persisted state: two key-value entries, name → default budget and
/// name → remaining seconds. The countdown session is never part of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub categories: BTreeMap<String, u64>,
    pub timers: BTreeMap<String, f64>,
}

#[derive(Debug, Clone)]
pub struct CategoryRow {
    pub name: String,
    pub budget_secs: u64,
    pub remaining_secs: f64,
}

pub fn default_categories() -> BTreeMap<String, u64> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|category| (category.name.to_string(), category.budget_secs))
        .collect()
}

/// Category/timer store plus the countdown it mediates. The countdown holds
/// no timer values of its own; every read and write of remaining time goes
/// through here, so at most one category advances at a time.
pub struct WorkdayTracker {
    categories: BTreeMap<String, u64>,
    timers: BTreeMap<String, f64>,
    countdown: Countdown,
}

impl WorkdayTracker {
    /// Reconciles the timer set against the category set: categories without
    /// a timer get one at their default, timers without a category are
    /// dropped, negatives from hand-edited files are clamped. Runs once at
    /// startup; iteration order is deterministic.
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let Snapshot {
            categories,
            mut timers,
        } = snapshot;

        timers.retain(|name, _| categories.contains_key(name));
        for value in timers.values_mut() {
            *value = value.max(0.0);
        }
        for (name, budget) in &categories {
            timers.entry(name.clone()).or_insert(*budget as f64);
        }

        Self {
            categories,
            timers,
            countdown: Countdown::new(),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            categories: self.categories.clone(),
            timers: self.timers.clone(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn remaining(&self, name: &str) -> Option<f64> {
        self.timers.get(name).copied()
    }

    pub fn default_budget(&self, name: &str) -> Option<u64> {
        self.categories.get(name).copied()
    }

    pub fn rows(&self) -> Vec<CategoryRow> {
        self.categories
            .iter()
            .map(|(name, &budget_secs)| CategoryRow {
                name: name.clone(),
                budget_secs,
                remaining_secs: self.timers.get(name).copied().unwrap_or(budget_secs as f64),
            })
            .collect()
    }

    pub fn phase(&self) -> CountdownPhase {
        self.countdown.phase()
    }

    pub fn active_category(&self) -> Option<&str> {
        self.countdown.active_category()
    }

    pub fn is_running_category(&self, name: &str) -> bool {
        self.countdown.is_running_category(name)
    }

    // ── Store operations ─────────────────────────────────────────────

    pub fn add_category(&mut self, name: &str, budget_secs: u64) -> Result<(), TrackerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::EmptyName);
        }
        if self.categories.contains_key(name) {
            return Err(TrackerError::DuplicateName(name.to_string()));
        }

        self.categories.insert(name.to_string(), budget_secs);
        self.timers.insert(name.to_string(), budget_secs as f64);
        Ok(())
    }

    /// Deletes category and timer. Removing the selected category, running
    /// or paused, drops the countdown back to Idle.
    pub fn remove_category(&mut self, name: &str) -> bool {
        if self.categories.remove(name).is_none() {
            return false;
        }
        self.timers.remove(name);
        if self.countdown.active_category() == Some(name) {
            self.countdown.stop();
        }
        true
    }

    /// Moves both entries to the new key, preserving values. Renaming to an
    /// existing name (including the unchanged name) is a collision; an
    /// unknown source name is a no-op.
    pub fn rename_category(&mut self, old: &str, new: &str) -> Result<(), TrackerError> {
        let new = new.trim();
        if new.is_empty() {
            return Err(TrackerError::EmptyName);
        }
        if self.categories.contains_key(new) {
            return Err(TrackerError::DuplicateName(new.to_string()));
        }

        let Some(budget) = self.categories.remove(old) else {
            return Ok(());
        };
        let remaining = self.timers.remove(old).unwrap_or(budget as f64);
        self.categories.insert(new.to_string(), budget);
        self.timers.insert(new.to_string(), remaining);
        self.countdown.rename(old, new);
        Ok(())
    }

    /// Shifts remaining time, clamped at zero. When `name` is the running
    /// category the countdown re-baselines at the adjusted value, so the
    /// next tick continues from it without a seam.
    pub fn adjust_remaining_at(&mut self, name: &str, delta_secs: f64, now: Instant) -> bool {
        if !self.timers.contains_key(name) {
            return false;
        }

        if self.countdown.is_running_category(name) {
            let current = self.countdown.value_at(now).unwrap_or(0.0);
            let adjusted = (current + delta_secs).max(0.0);
            self.timers.insert(name.to_string(), adjusted);
            self.countdown.rebaseline_at(adjusted, now);
        } else if let Some(value) = self.timers.get_mut(name) {
            *value = (*value + delta_secs).max(0.0);
        }
        true
    }

    /// Updates the default budget. The live timer follows, except for the
    /// active running category, whose in-progress countdown is not clobbered.
    pub fn set_default_budget(&mut self, name: &str, budget_secs: u64) -> bool {
        let Some(budget) = self.categories.get_mut(name) else {
            return false;
        };
        *budget = budget_secs;
        if !self.countdown.is_running_category(name) {
            self.timers.insert(name.to_string(), budget_secs as f64);
        }
        true
    }

    /// Stops the countdown, clears the active category, and returns every
    /// timer to its category's current default.
    pub fn reset_all(&mut self) {
        self.countdown.stop();
        self.timers = self
            .categories
            .iter()
            .map(|(name, &budget)| (name.clone(), budget as f64))
            .collect();
    }

    // ── Countdown mediation ──────────────────────────────────────────

    pub fn start_at(&mut self, name: &str, now: Instant) -> bool {
        if self.countdown.is_running_category(name) {
            return true;
        }
        let Some(&remaining) = self.timers.get(name) else {
            return false;
        };
        self.countdown.start_at(name, remaining, now);
        true
    }

    pub fn pause_at(&mut self, now: Instant) -> bool {
        match self.countdown.pause_at(now) {
            Some((name, value)) => {
                self.timers.insert(name, value);
                true
            }
            None => false,
        }
    }

    /// One scheduler tick. Writes the running category's computed value into
    /// its timer and reports whether anything changed; sub-epsilon movement
    /// is jitter and produces no write.
    pub fn tick_at(&mut self, now: Instant) -> bool {
        let Some(value) = self.countdown.value_at(now) else {
            return false;
        };
        let Some(name) = self.countdown.active_category().map(str::to_owned) else {
            return false;
        };
        let Some(current) = self.timers.get_mut(&name) else {
            return false;
        };

        if (*current - value).abs() <= TIME_SETTINGS.tick_epsilon_secs {
            return false;
        }
        *current = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn tracker_with(categories: &[(&str, u64)]) -> WorkdayTracker {
        WorkdayTracker::from_snapshot(Snapshot {
            categories: categories
                .iter()
                .map(|(name, budget)| (name.to_string(), *budget))
                .collect(),
            timers: BTreeMap::new(),
        })
    }

    #[test]
    fn add_rejects_duplicate_and_empty_names() {
        let mut tracker = tracker_with(&[("Work", 3600)]);

        assert_eq!(
            tracker.add_category("Work", 1800),
            Err(TrackerError::DuplicateName("Work".to_string()))
        );
        assert_eq!(tracker.add_category("   ", 1800), Err(TrackerError::EmptyName));
        assert_eq!(tracker.category_count(), 1);
    }

    #[test]
    fn add_initializes_timer_to_budget() {
        let mut tracker = tracker_with(&[]);
        tracker.add_category("Errands", 900).unwrap();

        assert_eq!(tracker.remaining("Errands"), Some(900.0));
        assert_eq!(tracker.default_budget("Errands"), Some(900));
    }

    #[test]
    fn two_categories_only_active_one_counts_down() {
        let t0 = Instant::now();
        let mut tracker = tracker_with(&[("Work", 3600), ("Chores", 7200)]);

        assert!(tracker.start_at("Work", t0));
        assert!(tracker.tick_at(t0 + Duration::from_secs(10)));

        let work = tracker.remaining("Work").unwrap();
        assert!((work - 3590.0).abs() < 0.1);
        assert_eq!(tracker.remaining("Chores"), Some(7200.0));
    }

    #[test]
    fn epsilon_suppresses_subtick_writes() {
        let t0 = Instant::now();
        let mut tracker = tracker_with(&[("Work", 3600)]);
        tracker.start_at("Work", t0);

        assert!(tracker.tick_at(t0 + Duration::from_secs(10)));
        assert!(!tracker.tick_at(t0 + Duration::from_millis(10_010)));
    }

    #[test]
    fn remaining_never_goes_negative() {
        let t0 = Instant::now();
        let mut tracker = tracker_with(&[("Break", 5)]);
        tracker.start_at("Break", t0);

        tracker.tick_at(t0 + Duration::from_secs(60));
        assert_eq!(tracker.remaining("Break"), Some(0.0));
        assert_eq!(
            tracker.phase(),
            CountdownPhase::Running,
            "clamped at zero but still ticking"
        );
    }

    #[test]
    fn remove_active_running_category_goes_idle() {
        let t0 = Instant::now();
        let mut tracker = tracker_with(&[("Work", 3600), ("Break", 600)]);
        tracker.start_at("Work", t0);

        assert!(tracker.remove_category("Work"));
        assert_eq!(tracker.phase(), CountdownPhase::Idle);
        assert_eq!(tracker.active_category(), None);
        assert!(!tracker.tick_at(t0 + Duration::from_secs(10)));
        assert_eq!(tracker.remaining("Work"), None);
    }

    #[test]
    fn remove_unknown_category_is_refused() {
        let mut tracker = tracker_with(&[("Work", 3600)]);
        assert!(!tracker.remove_category("Nope"));
    }

    #[test]
    fn rename_preserves_remaining_and_rejects_collision() {
        let t0 = Instant::now();
        let mut tracker = tracker_with(&[("Work", 3600), ("Break", 600)]);
        tracker.start_at("Work", t0);
        tracker.tick_at(t0 + Duration::from_secs(10));
        let before = tracker.remaining("Work").unwrap();

        assert_eq!(
            tracker.rename_category("Work", "Break"),
            Err(TrackerError::DuplicateName("Break".to_string()))
        );
        assert_eq!(
            tracker.rename_category("Work", "Work"),
            Err(TrackerError::DuplicateName("Work".to_string()))
        );

        tracker.rename_category("Work", "Deep Work").unwrap();
        assert_eq!(tracker.remaining("Work"), None);
        assert_eq!(tracker.remaining("Deep Work"), Some(before));
        assert_eq!(tracker.active_category(), Some("Deep Work"));
        assert_eq!(tracker.phase(), CountdownPhase::Running);
    }

    #[test]
    fn rename_unknown_source_is_noop() {
        let mut tracker = tracker_with(&[("Work", 3600)]);
        assert_eq!(tracker.rename_category("Nope", "Other"), Ok(()));
        assert_eq!(tracker.category_count(), 1);
    }

    #[test]
    fn adjust_clamps_at_zero() {
        let t0 = Instant::now();
        let mut tracker = tracker_with(&[("Break", 600)]);

        assert!(tracker.adjust_remaining_at("Break", -7200.0, t0));
        assert_eq!(tracker.remaining("Break"), Some(0.0));
        assert!(!tracker.adjust_remaining_at("Nope", 60.0, t0));
    }

    #[test]
    fn adjust_while_running_continues_without_discontinuity() {
        let t0 = Instant::now();
        let mut tracker = tracker_with(&[("Work", 3600)]);
        tracker.start_at("Work", t0);

        let t1 = t0 + Duration::from_secs(10);
        tracker.tick_at(t1);
        tracker.adjust_remaining_at("Work", 900.0, t1);
        let adjusted = tracker.remaining("Work").unwrap();
        assert!((adjusted - 4490.0).abs() < 0.1);

        tracker.tick_at(t1 + Duration::from_secs(1));
        let next = tracker.remaining("Work").unwrap();
        assert!((adjusted - next - 1.0).abs() < 0.01, "one second elapsed, no jump");
    }

    #[test]
    fn adjust_while_paused_is_respected_on_resume() {
        let t0 = Instant::now();
        let mut tracker = tracker_with(&[("Work", 3600)]);
        tracker.start_at("Work", t0);
        tracker.pause_at(t0 + Duration::from_secs(10));

        tracker.adjust_remaining_at("Work", 900.0, t0 + Duration::from_secs(20));
        tracker.start_at("Work", t0 + Duration::from_secs(30));
        tracker.tick_at(t0 + Duration::from_secs(40));

        let value = tracker.remaining("Work").unwrap();
        assert!((value - (3590.0 + 900.0 - 10.0)).abs() < 0.1);
    }

    #[test]
    fn set_default_updates_timer_unless_running() {
        let t0 = Instant::now();
        let mut tracker = tracker_with(&[("Work", 3600), ("Break", 600)]);

        assert!(tracker.set_default_budget("Break", 1200));
        assert_eq!(tracker.remaining("Break"), Some(1200.0));

        tracker.start_at("Work", t0);
        tracker.tick_at(t0 + Duration::from_secs(10));
        let before = tracker.remaining("Work").unwrap();
        assert!(tracker.set_default_budget("Work", 7200));
        assert_eq!(tracker.default_budget("Work"), Some(7200));
        assert_eq!(tracker.remaining("Work"), Some(before));

        tracker.pause_at(t0 + Duration::from_secs(20));
        assert!(tracker.set_default_budget("Work", 1800));
        assert_eq!(tracker.remaining("Work"), Some(1800.0));
    }

    #[test]
    fn reset_all_restores_defaults_and_stops() {
        let t0 = Instant::now();
        let mut tracker = tracker_with(&[("Work", 3600), ("Break", 600)]);
        tracker.start_at("Work", t0);
        tracker.tick_at(t0 + Duration::from_secs(100));

        tracker.reset_all();
        assert_eq!(tracker.phase(), CountdownPhase::Idle);
        assert_eq!(tracker.active_category(), None);

        let snapshot = tracker.snapshot();
        for (name, budget) in &snapshot.categories {
            assert_eq!(snapshot.timers.get(name), Some(&(*budget as f64)));
        }
    }

    #[test]
    fn start_unknown_category_is_refused() {
        let t0 = Instant::now();
        let mut tracker = tracker_with(&[("Work", 3600)]);
        assert!(!tracker.start_at("Nope", t0));
        assert_eq!(tracker.phase(), CountdownPhase::Idle);
    }

    #[test]
    fn from_snapshot_reconciles_timers_against_categories() {
        let tracker = WorkdayTracker::from_snapshot(Snapshot {
            categories: BTreeMap::from([
                ("Work".to_string(), 3600),
                ("Break".to_string(), 600),
            ]),
            timers: BTreeMap::from([
                ("Work".to_string(), 123.5),
                ("Gone".to_string(), 99.0),
                ("Negative".to_string(), -4.0),
            ]),
        });

        assert_eq!(tracker.remaining("Work"), Some(123.5));
        assert_eq!(tracker.remaining("Break"), Some(600.0), "missing timer filled");
        assert_eq!(tracker.remaining("Gone"), None, "orphan timer dropped");
        assert_eq!(tracker.remaining("Negative"), None);
    }

    #[test]
    fn fresh_snapshot_fills_timers_from_defaults() {
        let tracker = WorkdayTracker::from_snapshot(Snapshot {
            categories: default_categories(),
            timers: BTreeMap::new(),
        });
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.categories, default_categories());
        for (name, budget) in &snapshot.categories {
            assert_eq!(snapshot.timers.get(name), Some(&(*budget as f64)));
        }
    }
}
