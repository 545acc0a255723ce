//! OTP entry screen with the countdown ring

use kiosk_core::View;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::App;
use crate::ui::components::countdown;
use crate::ui::layout::{centered_rect, section_block};

/// Draw the OTP screen
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let page = app.page();
    let identity = match page.surface().view() {
        Some(View::Otp { identity }) => identity.as_str(),
        _ => "",
    };

    let dialog = centered_rect(60, 80, area);
    let block = section_block("One-Time Passcode", theme);
    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Instructions
            Constraint::Min(6),    // Ring
            Constraint::Length(2), // Code
        ])
        .split(inner);

    let instructions = Paragraph::new(format!(
        "A code was sent to {}'s registered device",
        identity
    ))
    .style(theme.text_secondary())
    .alignment(Alignment::Center);
    frame.render_widget(instructions, chunks[0]);

    if let Some(frame_state) = page.surface().countdown() {
        countdown::render(frame, chunks[1], frame_state, theme);
    }

    // Code boxes, one per expected digit
    let expected = app.config.session.otp_code_length;
    let mut boxes = String::from("[ ");
    for i in 0..expected.max(app.form.otp_input.len()) {
        match app.form.otp_input.chars().nth(i) {
            Some(c) => boxes.push(c),
            None => boxes.push('_'),
        }
        boxes.push(' ');
    }
    boxes.push(']');

    let style = if page.challenge().is_some_and(|c| c.is_expired()) {
        theme.text_muted()
    } else {
        theme.text_highlight()
    };
    frame.render_widget(
        Paragraph::new(boxes).style(style).alignment(Alignment::Center),
        chunks[2],
    );
}
