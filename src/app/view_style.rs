use ratatui::style::{Color, Modifier, Style};

use crate::countdown::CountdownPhase;

pub(super) fn accent_color() -> Color {
    Color::Rgb(0, 153, 255)
}

pub(super) fn phase_color(phase: CountdownPhase) -> Color {
    match phase {
        CountdownPhase::Running => Color::Rgb(0, 176, 80),
        CountdownPhase::Paused => Color::Rgb(255, 204, 0),
        CountdownPhase::Idle => Color::Gray,
    }
}

pub(super) fn remaining_style(exhausted: bool) -> Style {
    if exhausted {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::White)
    }
}

pub(super) fn budget_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

pub(super) fn notice_style() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::ITALIC)
}

pub(super) fn hint_style() -> Style {
    Style::default().fg(Color::DarkGray)
}
