//! Header component

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::ui::Theme;

/// Render the header bar
pub fn render(frame: &mut Frame, area: Rect, title: &str, theme: &Theme) {
    let time_str = chrono::Local::now().format("%d %b %Y  %H:%M:%S").to_string();
    let used = 12 + title.chars().count() + time_str.chars().count() + 4;

    let header_text = Line::from(vec![
        Span::styled(
            " GUOBANK ",
            Style::default()
                .fg(Color::Black)
                .bg(theme.brand)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(title.to_string(), theme.text().add_modifier(Modifier::BOLD)),
        Span::raw(" ".repeat((area.width as usize).saturating_sub(used))),
        Span::styled(format!(" {} ", time_str), theme.text_secondary()),
    ]);

    let header = Paragraph::new(header_text).style(Style::default().bg(theme.background));
    frame.render_widget(header, area);
}
