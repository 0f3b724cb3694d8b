use std::{io, time::Instant};

use clap::{CommandFactory, Parser};

use crate::{
    constants::BUDGET_SETTINGS,
    domain::{TrackerError, WorkdayTracker},
    storage,
};

#[derive(Parser, Debug)]
#[command(name = "tagwerk")]
#[command(about = "Countdown budgets for your workday", long_about = None)]
pub enum Cli {
    #[command(about = "Show remaining time per category")]
    Status,

    #[command(about = "Add a category")]
    Add {
        #[arg(help = "Category name")]
        name: String,

        #[arg(help = "Time budget, e.g. 2h, 90m, 1h30m, 3600 (default 1h)")]
        budget: Option<String>,
    },

    #[command(about = "Remove a category")]
    Remove {
        #[arg(help = "Category name")]
        name: String,
    },

    #[command(about = "Rename a category, keeping its remaining time")]
    Rename {
        #[arg(help = "Current name")]
        old: String,

        #[arg(help = "New name")]
        new: String,
    },

    #[command(about = "Shift a category's remaining time")]
    Adjust {
        #[arg(help = "Category name")]
        name: String,

        #[arg(help = "Signed duration, e.g. +15m, -1h, 900", allow_hyphen_values = true)]
        delta: String,
    },

    #[command(about = "Change a category's default budget")]
    SetDefault {
        #[arg(help = "Category name")]
        name: String,

        #[arg(help = "New default budget, e.g. 6h")]
        budget: String,
    },

    #[command(about = "Reset every timer to its default budget")]
    Reset,

    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(help = "Shell type (bash, zsh, fish)")]
        shell: String,
    },
}

/// Accepts plain seconds ("3600") or unit notation ("45s", "90m", "2h",
/// "1h30m"), with an optional leading sign.
pub fn parse_duration(input: &str) -> Result<i64, TrackerError> {
    let invalid = || TrackerError::InvalidDuration(input.trim().to_string());

    let raw = input.trim();
    let (sign, rest) = match raw.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if rest.is_empty() {
        return Err(invalid());
    }

    if rest.chars().all(|c| c.is_ascii_digit()) {
        let secs: i64 = rest.parse().map_err(|_| invalid())?;
        return Ok(sign * secs);
    }

    let mut total: i64 = 0;
    let mut digits = String::new();
    for c in rest.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let unit = match c {
            'h' => 3600,
            'm' => 60,
            's' => 1,
            _ => return Err(invalid()),
        };
        let value: i64 = digits.parse().map_err(|_| invalid())?;
        total = total
            .checked_add(value.checked_mul(unit).ok_or_else(invalid)?)
            .ok_or_else(invalid)?;
        digits.clear();
    }
    if !digits.is_empty() {
        return Err(invalid());
    }
    Ok(sign * total)
}

fn parse_budget(input: &str) -> Result<u64, TrackerError> {
    let secs = parse_duration(input)?;
    if secs < 0 {
        return Err(TrackerError::InvalidDuration(input.trim().to_string()));
    }
    Ok(secs as u64)
}

fn format_hms(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

fn load_tracker() -> WorkdayTracker {
    let snapshot =
        storage::load_snapshot(&storage::get_categories_path(), &storage::get_timers_path());
    WorkdayTracker::from_snapshot(snapshot)
}

fn save_tracker(tracker: &WorkdayTracker) -> Result<(), String> {
    storage::save_snapshot(
        &storage::get_categories_path(),
        &storage::get_timers_path(),
        &tracker.snapshot(),
    )
}

pub fn status() -> Result<(), String> {
    let tracker = load_tracker();
    let rows = tracker.rows();

    println!("{:20} {:>9} {:>9}", "CATEGORY", "LEFT", "BUDGET");
    println!("{}", "-".repeat(40));
    let mut total_left = 0u64;
    let mut total_budget = 0u64;
    for row in &rows {
        println!(
            "{:20} {:>9} {:>9}",
            row.name,
            format_hms(row.remaining_secs as u64),
            format_hms(row.budget_secs)
        );
        total_left += row.remaining_secs as u64;
        total_budget += row.budget_secs;
    }
    println!("{}", "-".repeat(40));
    println!(
        "{:20} {:>9} {:>9}",
        "TOTAL",
        format_hms(total_left),
        format_hms(total_budget)
    );
    Ok(())
}

pub fn add_category(name: &str, budget: Option<&str>) -> Result<(), String> {
    let budget_secs = match budget {
        Some(raw) => parse_budget(raw).map_err(|e| e.to_string())?,
        None => BUDGET_SETTINGS.new_category_secs,
    };

    let mut tracker = load_tracker();
    tracker
        .add_category(name, budget_secs)
        .map_err(|e| e.to_string())?;
    save_tracker(&tracker)?;

    println!(
        "Added category '{}' with budget {}",
        name.trim(),
        format_hms(budget_secs)
    );
    Ok(())
}

pub fn remove_category(name: &str) -> Result<(), String> {
    let mut tracker = load_tracker();
    if !tracker.remove_category(name) {
        return Err(format!("Category '{}' not found", name));
    }
    save_tracker(&tracker)?;

    println!("Removed category '{}'", name);
    Ok(())
}

pub fn rename_category(old: &str, new: &str) -> Result<(), String> {
    let mut tracker = load_tracker();
    if tracker.default_budget(old).is_none() {
        return Err(format!("Category '{}' not found", old));
    }
    tracker.rename_category(old, new).map_err(|e| e.to_string())?;
    save_tracker(&tracker)?;

    println!("Renamed '{}' to '{}'", old, new.trim());
    Ok(())
}

pub fn adjust_remaining(name: &str, delta: &str) -> Result<(), String> {
    let delta_secs = parse_duration(delta).map_err(|e| e.to_string())?;

    let mut tracker = load_tracker();
    if !tracker.adjust_remaining_at(name, delta_secs as f64, Instant::now()) {
        return Err(format!("Category '{}' not found", name));
    }
    save_tracker(&tracker)?;

    let remaining = tracker.remaining(name).unwrap_or(0.0);
    println!("'{}' now has {} left", name, format_hms(remaining as u64));
    Ok(())
}

pub fn set_default_budget(name: &str, budget: &str) -> Result<(), String> {
    let budget_secs = parse_budget(budget).map_err(|e| e.to_string())?;

    let mut tracker = load_tracker();
    if !tracker.set_default_budget(name, budget_secs) {
        return Err(format!("Category '{}' not found", name));
    }
    save_tracker(&tracker)?;

    println!("Default for '{}' is now {}", name, format_hms(budget_secs));
    Ok(())
}

pub fn reset_all() -> Result<(), String> {
    let mut tracker = load_tracker();
    tracker.reset_all();
    save_tracker(&tracker)?;

    println!("All timers reset to their default budgets");
    Ok(())
}

pub fn print_completions(shell: &str) -> Result<(), String> {
    use clap_complete::Shell;
    match shell {
        "bash" => {
            clap_complete::generate(
                Shell::Bash,
                &mut Cli::command(),
                "tagwerk",
                &mut io::stdout(),
            );
        }
        "zsh" => {
            clap_complete::generate(Shell::Zsh, &mut Cli::command(), "tagwerk", &mut io::stdout());
        }
        "fish" => {
            clap_complete::generate(
                Shell::Fish,
                &mut Cli::command(),
                "tagwerk",
                &mut io::stdout(),
            );
        }
        _ => {
            return Err(format!(
                "Unsupported shell: {}. Use bash, zsh, or fish.",
                shell
            ));
        }
    }
    Ok(())
}

pub fn run_cli() {
    let cli = Cli::parse();
    let result = match cli {
        Cli::Status => status(),
        Cli::Add { name, budget } => add_category(&name, budget.as_deref()),
        Cli::Remove { name } => remove_category(&name),
        Cli::Rename { old, new } => rename_category(&old, &new),
        Cli::Adjust { name, delta } => adjust_remaining(&name, &delta),
        Cli::SetDefault { name, budget } => set_default_budget(&name, &budget),
        Cli::Reset => reset_all(),
        Cli::Completions { shell } => print_completions(&shell),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
