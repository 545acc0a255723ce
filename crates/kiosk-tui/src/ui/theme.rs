//! Visual theme and color palette

use ratatui::style::{Color, Modifier, Style};

/// GuoBank color palette
pub struct Theme {
    // Branding
    pub brand: Color,
    pub brand_accent: Color,
    pub background: Color,

    // Status colors
    pub success: Color,
    pub warning: Color,
    pub danger: Color,
    pub info: Color,

    // UI element colors
    pub border: Color,
    pub border_focused: Color,
    pub text_primary: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub selection: Color,

    // Countdown ring
    pub ring_track: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            brand: Color::Rgb(0, 150, 136),         // #009688 - Teal
            brand_accent: Color::Rgb(255, 193, 7),  // #FFC107 - Amber
            background: Color::Rgb(24, 28, 32),     // #181C20

            success: Color::Rgb(76, 175, 80), // #4CAF50 - Green
            warning: Color::Rgb(255, 152, 0), // #FF9800 - Orange
            danger: Color::Rgb(244, 67, 54),  // #F44336 - Red
            info: Color::Rgb(33, 150, 243),   // #2196F3 - Blue

            border: Color::Rgb(66, 66, 66),            // #424242
            border_focused: Color::Rgb(0, 150, 136),   // #009688
            text_primary: Color::Rgb(250, 250, 250),   // #FAFAFA
            text_secondary: Color::Rgb(189, 189, 189), // #BDBDBD
            text_muted: Color::Rgb(117, 117, 117),     // #757575
            selection: Color::Rgb(38, 50, 56),         // #263238

            ring_track: Color::Rgb(55, 55, 55),
        }
    }
}

impl Theme {
    pub fn text(&self) -> Style {
        Style::default().fg(self.text_primary)
    }

    pub fn text_secondary(&self) -> Style {
        Style::default().fg(self.text_secondary)
    }

    pub fn text_muted(&self) -> Style {
        Style::default().fg(self.text_muted)
    }

    pub fn text_highlight(&self) -> Style {
        Style::default()
            .fg(self.brand_accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title(&self) -> Style {
        Style::default().fg(self.brand).add_modifier(Modifier::BOLD)
    }

    pub fn border(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    pub fn success(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn warning(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn danger(&self) -> Style {
        Style::default()
            .fg(self.danger)
            .add_modifier(Modifier::BOLD)
    }

    pub fn info(&self) -> Style {
        Style::default().fg(self.info)
    }

    /// Menu item style
    pub fn menu_item(&self, selected: bool) -> Style {
        if selected {
            Style::default()
                .bg(self.selection)
                .fg(self.brand_accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.text_primary)
        }
    }

    /// Input field style
    pub fn input(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.text_primary).bg(self.selection)
        } else {
            Style::default().fg(self.text_secondary)
        }
    }

    /// Countdown color by fraction of the window left
    pub fn countdown(&self, fraction: f64) -> Color {
        if fraction > 0.5 {
            self.success
        } else if fraction > 0.2 {
            self.warning
        } else {
            self.danger
        }
    }
}
