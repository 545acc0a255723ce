//! Display surface contract
//!
//! The core never draws anything itself. It tells a surface which view to show,
//! what status text to display, how far the OTP countdown has progressed, and
//! where to navigate. The terminal UI implements this trait; tests use
//! [`RecordingSurface`].

use crate::navigation::{Navigation, Page};
use crate::types::{MenuAction, Role};

/// View a page asks the surface to render
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Credential form
    Login,
    /// OTP entry with countdown
    Otp { identity: String },
    /// Role-specific menu
    Menu {
        identity: String,
        role: Role,
        actions: Vec<MenuAction>,
    },
    /// Balance detail
    Balance {
        identity: String,
        text: String,
        is_error: bool,
    },
    /// Full-page lockdown notice
    Lockdown,
}

impl View {
    pub fn page(&self) -> Page {
        match self {
            View::Login => Page::Login,
            View::Otp { .. } => Page::Otp,
            View::Menu { .. } => Page::Menu,
            View::Balance { .. } => Page::Balance,
            View::Lockdown => Page::Lockdown,
        }
    }
}

/// Passive rendering surface the state machine writes into
pub trait DisplaySurface {
    /// Render the view for the current page
    fn render_view(&mut self, view: View);

    /// Replace the status text
    fn show_status(&mut self, text: &str);

    /// Redraw the circular countdown indicator and its text
    fn draw_countdown(&mut self, remaining_seconds: u32, sweep_degrees: f64);

    /// Whether the current page has a lockdown overlay element
    fn has_lockdown_overlay(&self) -> bool;

    /// Make the lockdown overlay visible
    fn show_lockdown_overlay(&mut self);

    /// Leave the current page
    fn navigate(&mut self, target: Navigation);
}

/// Surface that records every call, for tests and headless runs
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    /// Names of the calls received, in order
    pub calls: Vec<&'static str>,
    pub views: Vec<View>,
    pub statuses: Vec<String>,
    pub countdown_frames: Vec<(u32, f64)>,
    pub navigations: Vec<Navigation>,
    pub overlay_visible: bool,
    pub overlay_shows: usize,
    has_overlay: bool,
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            calls: Vec::new(),
            views: Vec::new(),
            statuses: Vec::new(),
            countdown_frames: Vec::new(),
            navigations: Vec::new(),
            overlay_visible: false,
            overlay_shows: 0,
            has_overlay: true,
        }
    }

    /// Surface for a page without a lockdown overlay element
    pub fn without_overlay() -> Self {
        Self {
            has_overlay: false,
            ..Self::new()
        }
    }

    pub fn last_status(&self) -> Option<&str> {
        self.statuses.last().map(String::as_str)
    }

    pub fn last_view(&self) -> Option<&View> {
        self.views.last()
    }

    pub fn last_navigation(&self) -> Option<&Navigation> {
        self.navigations.last()
    }
}

impl DisplaySurface for RecordingSurface {
    fn render_view(&mut self, view: View) {
        self.calls.push("render_view");
        self.views.push(view);
    }

    fn show_status(&mut self, text: &str) {
        self.calls.push("show_status");
        self.statuses.push(text.to_string());
    }

    fn draw_countdown(&mut self, remaining_seconds: u32, sweep_degrees: f64) {
        self.calls.push("draw_countdown");
        self.countdown_frames.push((remaining_seconds, sweep_degrees));
    }

    fn has_lockdown_overlay(&self) -> bool {
        self.has_overlay
    }

    fn show_lockdown_overlay(&mut self) {
        self.calls.push("show_lockdown_overlay");
        self.overlay_visible = true;
        self.overlay_shows += 1;
    }

    fn navigate(&mut self, target: Navigation) {
        self.calls.push("navigate");
        self.navigations.push(target);
    }
}
