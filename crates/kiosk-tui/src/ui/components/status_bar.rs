//! Status bar component

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::auth::OtpDelivery;
use crate::ui::Theme;

/// Terminal-side indicators shown next to the page status
#[derive(Debug, Default)]
pub struct TerminalStatus {
    pub maintenance: bool,
    pub ledger_online: bool,
    pub locked: bool,
    /// Last code delivered out of band, shown to the operator
    pub delivery: Option<OtpDelivery>,
}

/// Pick a style for a status message by its wording
fn message_style(text: &str, theme: &Theme) -> Style {
    let lower = text.to_lowercase();
    if text.starts_with('❌') || lower.contains("expired") || lower.contains("error") {
        theme.danger()
    } else if text.starts_with('⏰') || lower.contains("unavailable") {
        theme.warning()
    } else {
        theme.text_secondary()
    }
}

/// Render the page status line and terminal indicators
pub fn render(
    frame: &mut Frame,
    area: Rect,
    message: Option<&str>,
    status: &TerminalStatus,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(theme.border());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(inner);

    if let Some(text) = message {
        let widget = Paragraph::new(text).style(message_style(text, theme));
        frame.render_widget(widget, chunks[0]);
    }

    let indicator = |on: bool| if on { "●" } else { "○" };
    let mut spans = vec![
        Span::styled(
            format!("{} Maint ", indicator(status.maintenance)),
            if status.maintenance {
                theme.warning()
            } else {
                theme.text_muted()
            },
        ),
        Span::styled(
            format!("{} Ledger ", indicator(status.ledger_online)),
            if status.ledger_online {
                theme.success()
            } else {
                theme.danger()
            },
        ),
    ];
    if status.locked {
        spans.push(Span::styled("⚠ LOCKED ", theme.danger()));
    }
    if let Some(delivery) = &status.delivery {
        spans.push(Span::styled(
            format!(
                "OTP {} → {} @ {}",
                delivery.code,
                delivery.identity,
                delivery.issued_at.format("%H:%M:%S")
            ),
            theme.info(),
        ));
    }

    let indicators = Paragraph::new(Line::from(spans)).alignment(Alignment::Right);
    frame.render_widget(indicators, chunks[1]);
}
