//! Balance detail screen

use kiosk_core::View;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::App;
use crate::ui::layout::{centered_rect_fixed, section_block};

/// Draw the balance detail
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let Some(View::Balance {
        identity,
        text,
        is_error,
    }) = app.page().surface().view()
    else {
        return;
    };

    let dialog = centered_rect_fixed(44, 9, area);
    let block = section_block("Account Balance", theme);
    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let style = if *is_error {
        theme.danger()
    } else {
        theme.text_highlight()
    };

    let lines = vec![
        Line::styled(format!("Account: {}", identity), theme.text_secondary()),
        Line::raw(""),
        Line::styled(text.clone(), style),
        Line::raw(""),
        Line::styled(
            chrono::Local::now().format("As of %d %b %Y %H:%M").to_string(),
            theme.text_muted(),
        ),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        inner,
    );
}
