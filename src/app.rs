use std::{
    io,
    time::{Duration, Instant},
};

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};

use crate::{constants::TIME_SETTINGS, domain::WorkdayTracker, storage};

mod category_state;
mod event_handlers;
mod render_views;
mod time_format;
mod ui_helpers;
mod view_style;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum UiMode {
    Main,
    CategoryModal,
}

struct App {
    tracker: WorkdayTracker,
    ui_mode: UiMode,
    selected_index: usize,
    name_input: String,
    renaming: bool,
    notice: Option<String>,
    render_needed: bool,
}

impl App {
    fn new() -> Self {
        let snapshot = storage::load_snapshot(
            &storage::get_categories_path(),
            &storage::get_timers_path(),
        );
        let tracker = WorkdayTracker::from_snapshot(snapshot);

        Self {
            tracker,
            ui_mode: UiMode::Main,
            selected_index: 0,
            name_input: String::new(),
            renaming: false,
            notice: None,
            render_needed: true,
        }
    }

    fn open_modal(&mut self) {
        self.ui_mode = UiMode::CategoryModal;
        self.name_input = String::new();
        self.renaming = false;
        self.render_needed = true;
    }

    fn close_modal(&mut self) {
        self.ui_mode = UiMode::Main;
        self.name_input = String::new();
        self.renaming = false;
        self.clamp_selection();
        self.render_needed = true;
    }

    fn in_category_modal(&self) -> bool {
        matches!(self.ui_mode, UiMode::CategoryModal)
    }

    fn is_on_insert_space(&self) -> bool {
        self.in_category_modal() && self.selected_index == self.tracker.category_count()
    }

    fn modal_rect(&self, terminal_size: Rect) -> Rect {
        let target_width = (terminal_size.width / 2).max(30);
        let target_height = (self.tracker.category_count() as u16 + 4).max(8);

        let modal_width = target_width.clamp(1, terminal_size.width.saturating_sub(2).max(1));
        let modal_height = target_height.clamp(1, terminal_size.height.saturating_sub(2).max(1));

        let modal_x = (terminal_size.width.saturating_sub(modal_width)) / 2;
        let modal_y = (terminal_size.height.saturating_sub(modal_height)) / 2;

        Rect::new(modal_x, modal_y, modal_width, modal_height)
    }
}

pub fn run_ui() -> Result<(), io::Error> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new();

    let tick_rate = Duration::from_millis(TIME_SETTINGS.tick_ms);
    let mut last_tick = Instant::now();

    loop {
        if last_tick.elapsed() >= tick_rate {
            if app.tracker.tick_at(Instant::now()) {
                app.persist_timers();
            }
            // The clock in the title advances even when nothing counts down.
            app.render_needed = true;
            last_tick = Instant::now();
        }

        if app.render_needed {
            terminal.draw(|f| {
                app.draw_frame(f);
            })?;
            app.render_needed = false;
        }

        if event::poll(Duration::from_millis(TIME_SETTINGS.input_poll_ms))?
            && let Event::Key(key) = event::read()?
            && app.handle_key(key)
        {
            break;
        }
    }

    // Flush the in-flight partial second; the session itself is not saved.
    app.tracker.pause_at(Instant::now());
    app.persist_timers();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
