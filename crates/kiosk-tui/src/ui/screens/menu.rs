//! Role-specific main menu

use kiosk_core::{Role, View};
use ratatui::prelude::*;
use ratatui::widgets::{List, ListItem, ListState, Paragraph};

use crate::app::App;
use crate::ui::layout::{centered_rect, section_block};

/// Draw the main menu
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let Some(View::Menu {
        identity,
        role,
        actions,
    }) = app.page().surface().view()
    else {
        return;
    };

    let dialog = centered_rect(50, 70, area);
    let title = match role {
        Role::Staff => "Staff Console",
        Role::Customer => "Main Menu",
    };
    let block = section_block(title, theme);
    let inner = block.inner(dialog);
    frame.render_widget(block, dialog);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([Constraint::Length(2), Constraint::Min(1)])
        .split(inner);

    let greeting = Paragraph::new(format!("Hello, {} ({})", identity, role))
        .style(theme.text())
        .alignment(Alignment::Center);
    frame.render_widget(greeting, chunks[0]);

    let items: Vec<ListItem> = actions
        .iter()
        .enumerate()
        .map(|(i, action)| {
            let selected = i == app.form.menu_index;
            let marker = if selected { "▶" } else { " " };
            ListItem::new(format!(" {} {}. {}", marker, i + 1, action.label()))
                .style(theme.menu_item(selected))
        })
        .collect();

    let mut state = ListState::default().with_selected(Some(app.form.menu_index));
    frame.render_stateful_widget(List::new(items), chunks[1], &mut state);
}
