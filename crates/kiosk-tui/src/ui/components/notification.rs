//! Toast notification component

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::ui::Theme;

/// Notification severity level
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// Toast notification
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
    /// Remaining redraw ticks until dismissal
    pub ttl: u64,
}

impl Notification {
    /// Create a toast that lives for `ttl` redraw ticks
    pub fn new(message: impl Into<String>, level: NotificationLevel, ttl: u64) -> Self {
        Self {
            message: message.into(),
            level,
            ttl,
        }
    }

    /// Operator information, such as an ignored alert
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Info, 30) // ~3 seconds at 10 redraws/s
    }

    /// Confirmation of an operator action
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Success, 30)
    }

    /// Refused action or degraded backend
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Warning, 50)
    }

    /// Lockdown refusals stay up longest
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(message, NotificationLevel::Error, 60)
    }

    /// Whether the toast should be dismissed
    pub fn is_expired(&self) -> bool {
        self.ttl == 0
    }

    /// Count down one redraw
    pub fn tick(&mut self) {
        self.ttl = self.ttl.saturating_sub(1);
    }

    /// Glyph shown before the message
    pub fn icon(&self) -> &'static str {
        match self.level {
            NotificationLevel::Info => "ℹ",
            NotificationLevel::Success => "✓",
            NotificationLevel::Warning => "⚠",
            NotificationLevel::Error => "✗",
        }
    }

    /// Render at the top-right of `area`
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let style = match self.level {
            NotificationLevel::Info => theme.info(),
            NotificationLevel::Success => theme.success(),
            NotificationLevel::Warning => theme.warning(),
            NotificationLevel::Error => theme.danger(),
        };

        let width = ((self.message.chars().count() + 6).min(60) as u16).min(area.width);
        let height = 3.min(area.height);
        let x = area.x + area.width.saturating_sub(width + 2);
        let y = area.y + 1;
        let toast_area = Rect::new(x, y, width, height);

        frame.render_widget(Clear, toast_area);

        let block = Block::default().borders(Borders::ALL).border_style(style);
        let content = Paragraph::new(format!("{} {}", self.icon(), self.message))
            .style(style)
            .alignment(Alignment::Center)
            .block(block);

        frame.render_widget(content, toast_area);
    }
}

/// Stack of active toasts
pub struct NotificationManager {
    notifications: Vec<Notification>,
    max_visible: usize,
}

impl NotificationManager {
    /// Empty stack showing at most three toasts
    pub fn new() -> Self {
        Self {
            notifications: Vec::new(),
            max_visible: 3,
        }
    }

    /// Add a notification, dropping the oldest past the visible limit.
    /// Repeating the newest toast only restarts its timer.
    pub fn push(&mut self, notification: Notification) {
        if let Some(last) = self.notifications.last_mut() {
            if last.message == notification.message && last.level == notification.level {
                last.ttl = last.ttl.max(notification.ttl);
                return;
            }
        }
        tracing::debug!("Toast: {}", notification.message);
        self.notifications.push(notification);
        while self.notifications.len() > self.max_visible {
            self.notifications.remove(0);
        }
    }

    /// Tick all notifications and remove expired
    pub fn tick(&mut self) {
        for n in &mut self.notifications {
            n.tick();
        }
        self.notifications.retain(|n| !n.is_expired());
    }

    /// Whether no toast is showing
    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    /// Number of toasts showing
    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    /// Stack the toasts down the right edge of `area`, newest last
    pub fn render(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        for (i, notification) in self.notifications.iter().enumerate() {
            let offset_y = (i * 4) as u16;
            if offset_y >= area.height {
                break;
            }
            let adjusted_area = Rect::new(
                area.x,
                area.y + offset_y,
                area.width,
                area.height - offset_y,
            );
            notification.render(frame, adjusted_area, theme);
        }
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manager_keeps_most_recent() {
        let mut manager = NotificationManager::new();
        for i in 0..5 {
            manager.push(Notification::info(format!("n{}", i)));
        }
        assert_eq!(manager.len(), 3);
    }

    #[test]
    fn test_repeated_refusal_refreshes_instead_of_stacking() {
        let mut manager = NotificationManager::new();
        manager.push(Notification::error("Terminal is in emergency lockdown"));
        manager.tick();
        manager.push(Notification::error("Terminal is in emergency lockdown"));

        assert_eq!(manager.len(), 1);
        assert_eq!(manager.notifications[0].ttl, 60);

        manager.push(Notification::warning("Terminal is in emergency lockdown"));
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_expired_toasts_are_removed() {
        let mut manager = NotificationManager::new();
        manager.push(Notification::new("short", NotificationLevel::Info, 2));
        manager.push(Notification::error("long"));

        manager.tick();
        manager.tick();

        assert_eq!(manager.len(), 1);
        assert_eq!(manager.notifications[0].level, NotificationLevel::Error);
    }
}
