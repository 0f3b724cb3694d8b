//! Countdown state machine.
//!
//! Wall-clock based and caller-ticked: no internal thread, no scheduled
//! callback. The owning loop asks for the current value periodically and
//! decides what to write. A baseline (instant, seconds) recorded on every
//! start/resume keeps repeated ticks free of cumulative drift.

use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownPhase {
    Idle,
    Running,
    Paused,
}

#[derive(Debug)]
pub struct Countdown {
    active: Option<String>,
    running: bool,
    baseline_at: Option<Instant>,
    baseline_secs: f64,
}

impl Countdown {
    pub fn new() -> Self {
        Self {
            active: None,
            running: false,
            baseline_at: None,
            baseline_secs: 0.0,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> CountdownPhase {
        match (&self.active, self.running) {
            (None, _) => CountdownPhase::Idle,
            (Some(_), true) => CountdownPhase::Running,
            (Some(_), false) => CountdownPhase::Paused,
        }
    }

    pub fn active_category(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_running_category(&self, name: &str) -> bool {
        self.running && self.active.as_deref() == Some(name)
    }

    /// Remaining seconds for the running category at `now`, clamped at zero.
    /// `None` unless running. Never mutates the baseline; the caller owns
    /// the timer map and the epsilon policy for writing into it.
    pub fn value_at(&self, now: Instant) -> Option<f64> {
        if !self.running {
            return None;
        }
        let baseline_at = self.baseline_at?;
        let elapsed = now.saturating_duration_since(baseline_at).as_secs_f64();
        Some((self.baseline_secs - elapsed).max(0.0))
    }

    // ── Transitions ──────────────────────────────────────────────────

    /// Start, resume, or switch to `name`, counting down from
    /// `remaining_secs`. Always re-baselines: a paused category resumes from
    /// its current timer value, and switching away from a running category
    /// leaves its timer at the last computed value.
    pub fn start_at(&mut self, name: &str, remaining_secs: f64, now: Instant) {
        self.active = Some(name.to_string());
        self.running = true;
        self.baseline_at = Some(now);
        self.baseline_secs = remaining_secs.max(0.0);
    }

    /// Stop advancing. Returns the category and its exact remaining value at
    /// `now` so the caller can flush it; the category stays selected.
    pub fn pause_at(&mut self, now: Instant) -> Option<(String, f64)> {
        let value = self.value_at(now)?;
        self.running = false;
        self.baseline_at = None;
        self.active.clone().map(|name| (name, value))
    }

    /// Back to Idle. Subsequent ticks compute nothing.
    pub fn stop(&mut self) {
        self.active = None;
        self.running = false;
        self.baseline_at = None;
        self.baseline_secs = 0.0;
    }

    /// Re-anchor the running countdown at (`now`, `remaining_secs`). Used
    /// when the timer value is edited underneath a running countdown.
    pub fn rebaseline_at(&mut self, remaining_secs: f64, now: Instant) {
        if !self.running {
            return;
        }
        self.baseline_at = Some(now);
        self.baseline_secs = remaining_secs.max(0.0);
    }

    pub fn rename(&mut self, old: &str, new: &str) {
        if self.active.as_deref() == Some(old) {
            self.active = Some(new.to_string());
        }
    }
}
