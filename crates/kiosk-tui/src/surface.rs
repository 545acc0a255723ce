//! Terminal display surface
//!
//! Holds whatever the current page has asked to show. The renderer reads it
//! every frame; the page writes it through [`DisplaySurface`].

use kiosk_core::{DisplaySurface, Navigation, Page, View};
use tracing::debug;

/// Last countdown frame drawn by the OTP page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CountdownFrame {
    pub remaining_seconds: u32,
    pub sweep_degrees: f64,
}

impl CountdownFrame {
    /// Remaining time as MM:SS
    pub fn formatted(&self) -> String {
        format!(
            "{:02}:{:02}",
            self.remaining_seconds / 60,
            self.remaining_seconds % 60
        )
    }
}

/// Surface backing one terminal page
#[derive(Debug)]
pub struct TerminalSurface {
    view: Option<View>,
    status: Option<String>,
    countdown: Option<CountdownFrame>,
    has_overlay: bool,
    overlay_visible: bool,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            view: None,
            status: None,
            countdown: None,
            has_overlay: true,
            overlay_visible: false,
        }
    }

    /// Surface for `page`. The balance receipt is printed full screen and
    /// carries no overlay, so a lockdown there leaves for the lockdown page.
    pub fn for_page(page: Page) -> Self {
        Self {
            has_overlay: page != Page::Balance,
            ..Self::new()
        }
    }

    pub fn view(&self) -> Option<&View> {
        self.view.as_ref()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn countdown(&self) -> Option<CountdownFrame> {
        self.countdown
    }

    pub fn overlay_visible(&self) -> bool {
        self.overlay_visible
    }
}

impl DisplaySurface for TerminalSurface {
    fn render_view(&mut self, view: View) {
        self.view = Some(view);
    }

    fn show_status(&mut self, text: &str) {
        self.status = Some(text.to_string());
    }

    fn draw_countdown(&mut self, remaining_seconds: u32, sweep_degrees: f64) {
        self.countdown = Some(CountdownFrame {
            remaining_seconds,
            sweep_degrees,
        });
    }

    fn has_lockdown_overlay(&self) -> bool {
        self.has_overlay
    }

    fn show_lockdown_overlay(&mut self) {
        self.overlay_visible = true;
    }

    // The app follows the machine's departure and swaps in a fresh surface
    fn navigate(&mut self, target: Navigation) {
        debug!("Surface leaving for {}", target);
    }
}
