//! UI rendering

pub mod components;
pub mod layout;
pub mod screens;
pub mod theme;

pub use theme::Theme;

use kiosk_core::Page;
use ratatui::prelude::*;
use ratatui::widgets::Block;

use crate::app::App;
use components::status_bar::{self, TerminalStatus};
use layout::{render_footer, ScreenLayout};

/// Main render function - delegates to the screen for the current page
pub fn render(frame: &mut Frame, app: &App) {
    let theme = &app.theme;
    let area = frame.area();
    frame.render_widget(Block::default().style(Style::default().bg(theme.background)), area);

    let layout = ScreenLayout::new(area);
    let page = app.page();
    let surface = page.surface();

    components::header::render(frame, layout.header, page.page().title(), theme);

    match page.page() {
        Page::Login => screens::login::draw(frame, layout.content, app),
        Page::Otp => screens::otp::draw(frame, layout.content, app),
        Page::Menu => screens::menu::draw(frame, layout.content, app),
        Page::Balance => screens::balance::draw(frame, layout.content, app),
        Page::Lockdown => screens::lockdown::draw(frame, layout.content, app),
    }

    let backend = app.backend();
    let status = TerminalStatus {
        maintenance: backend.is_maintenance_mode(),
        ledger_online: backend.is_ledger_online(),
        locked: page.is_locked(),
        delivery: backend.latest_delivery(),
    };
    status_bar::render(frame, layout.status, surface.status(), &status, theme);
    render_footer(frame, layout.footer, &footer_hints(page.page()), theme);

    if surface.overlay_visible() {
        screens::lockdown::draw_overlay(frame, area, app);
    }

    app.notifications.render(frame, area, theme);
}

/// Key hints for the footer
pub fn footer_hints(page: Page) -> Vec<(&'static str, &'static str)> {
    let mut hints = match page {
        Page::Login => vec![("Tab", "Switch field"), ("Enter", "Login"), ("Esc", "Quit")],
        Page::Otp => vec![("0-9", "Code"), ("Enter", "Verify"), ("Esc", "Start over")],
        Page::Menu => vec![("↑↓", "Select"), ("Enter", "Choose"), ("Esc", "Logout")],
        Page::Balance => vec![("Esc", "Back to menu")],
        Page::Lockdown => Vec::new(),
    };
    hints.extend([("F8", "Ledger"), ("F9", "Intrusion"), ("Ctrl+C", "Quit")]);
    hints
}
