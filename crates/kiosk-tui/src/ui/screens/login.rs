//! Credential entry screen

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{App, Field};
use crate::ui::layout::{centered_rect, section_block};

/// Draw the login screen
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let dialog = centered_rect(50, 60, area);

    let block = section_block("Welcome to GuoBank", theme);
    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Instructions
            Constraint::Length(3), // Username
            Constraint::Length(3), // Password
            Constraint::Min(0),
        ])
        .split(inner);

    let instructions = Paragraph::new("Sign in with your username and password")
        .style(theme.text_secondary())
        .alignment(Alignment::Center);
    frame.render_widget(instructions, chunks[0]);

    let identity_focused = app.form.focus == Field::Identity;
    let identity = Paragraph::new(app.form.identity.as_str())
        .style(theme.input(identity_focused))
        .block(input_block(" Username ", identity_focused, app));
    frame.render_widget(identity, chunks[1]);

    // Password is masked
    let masked = "•".repeat(app.form.credential.chars().count());
    let credential = Paragraph::new(masked)
        .style(theme.input(!identity_focused))
        .block(input_block(" Password ", !identity_focused, app));
    frame.render_widget(credential, chunks[2]);
}

fn input_block<'a>(title: &'a str, focused: bool, app: &App) -> Block<'a> {
    let theme = &app.theme;
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if focused {
            theme.border_focused()
        } else {
            theme.border()
        })
}
