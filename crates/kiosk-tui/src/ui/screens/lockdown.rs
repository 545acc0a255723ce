//! Lockdown page and the overlay drawn over every other page

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::App;
use crate::ui::layout::centered_rect;

const LOCKDOWN_MESSAGE: &str =
    "Security alert detected.\nThis terminal is out of service.\nPlease contact bank staff.";

/// Draw the dedicated lockdown page
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    draw_notice(frame, centered_rect(60, 50, area), app);
}

/// Cover the current page with the lockdown notice
pub fn draw_overlay(frame: &mut Frame, area: Rect, app: &App) {
    frame.render_widget(Clear, area);
    frame.render_widget(
        Block::default().style(Style::default().bg(app.theme.background)),
        area,
    );
    draw_notice(frame, centered_rect(60, 50, area), app);
}

fn draw_notice(frame: &mut Frame, dialog: Rect, app: &App) {
    let theme = &app.theme;

    let block = Block::default()
        .title(" EMERGENCY LOCKDOWN ")
        .title_style(theme.danger())
        .borders(Borders::ALL)
        .border_style(theme.danger());
    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3), // Icon
            Constraint::Length(4), // Message
            Constraint::Min(0),
            Constraint::Length(1), // Reset hint
        ])
        .split(inner);

    // Blink the icon on the redraw clock
    let icon = if app.tick / 5 % 2 == 0 {
        "⚠  LOCKED  ⚠"
    } else {
        "   LOCKED   "
    };
    frame.render_widget(
        Paragraph::new(icon)
            .style(theme.danger())
            .alignment(Alignment::Center),
        chunks[0],
    );

    frame.render_widget(
        Paragraph::new(LOCKDOWN_MESSAGE)
            .style(theme.text())
            .alignment(Alignment::Center),
        chunks[1],
    );

    if app.config.allow_manual_lockdown_reset {
        frame.render_widget(
            Paragraph::new("[F12] Clear lockdown")
                .style(theme.text_muted())
                .alignment(Alignment::Center),
            chunks[3],
        );
    }
}
