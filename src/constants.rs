pub const DEFAULT_CATEGORIES: [DefaultCategory; 3] = [
    DefaultCategory {
        name: "Work",
        budget_secs: 6 * 3600,
    },
    DefaultCategory {
        name: "Chores",
        budget_secs: 2 * 3600,
    },
    DefaultCategory {
        name: "Break",
        budget_secs: 2 * 3600,
    },
];

pub const TIME_SETTINGS: TimeSettings = TimeSettings {
    tick_ms: 1000,
    input_poll_ms: 50,
    // Timer writes below this magnitude are sub-tick jitter, not progress.
    tick_epsilon_secs: 0.05,
};

pub const BUDGET_SETTINGS: BudgetSettings = BudgetSettings {
    adjust_step_secs: 3600,
    default_step_secs: 900,
    new_category_secs: 3600,
};

pub struct DefaultCategory {
    pub name: &'static str,
    pub budget_secs: u64,
}

pub struct TimeSettings {
    pub tick_ms: u64,
    pub input_poll_ms: u64,
    pub tick_epsilon_secs: f64,
}

pub struct BudgetSettings {
    pub adjust_step_secs: i64,
    pub default_step_secs: i64,
    pub new_category_secs: u64,
}
