//! Input state for the page on screen

use kiosk_core::Page;
use zeroize::Zeroizing;

/// Longest identity the login form accepts
pub const MAX_IDENTITY_LEN: usize = 32;

/// Longest password the login form accepts
pub const MAX_CREDENTIAL_LEN: usize = 64;

/// Longest OTP input buffer; longer than a valid code so the page can reject it
pub const MAX_OTP_INPUT_LEN: usize = 8;

/// Focused login field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Identity,
    Credential,
}

/// Form buffers and selection. Reset on every page change.
#[derive(Default)]
pub struct FormState {
    pub identity: String,
    pub credential: Zeroizing<String>,
    pub focus: Field,
    pub otp_input: String,
    pub menu_index: usize,
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear everything for a freshly loaded page
    pub fn reset_for(&mut self, page: Page) {
        self.identity.clear();
        self.credential.clear();
        self.otp_input.clear();
        self.menu_index = 0;
        self.focus = Field::Identity;
        tracing::debug!("Form reset for {}", page.title());
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Field::Identity => Field::Credential,
            Field::Credential => Field::Identity,
        };
    }

    /// Type into the focused login field
    pub fn push_login_char(&mut self, c: char) {
        match self.focus {
            Field::Identity if self.identity.chars().count() < MAX_IDENTITY_LEN => {
                self.identity.push(c)
            }
            Field::Credential if self.credential.chars().count() < MAX_CREDENTIAL_LEN => {
                self.credential.push(c)
            }
            _ => {}
        }
    }

    pub fn pop_login_char(&mut self) {
        match self.focus {
            Field::Identity => {
                self.identity.pop();
            }
            Field::Credential => {
                self.credential.pop();
            }
        }
    }

    pub fn push_otp_char(&mut self, c: char) {
        if c.is_ascii_digit() && self.otp_input.len() < MAX_OTP_INPUT_LEN {
            self.otp_input.push(c);
        }
    }

    pub fn select_prev(&mut self) {
        self.menu_index = self.menu_index.saturating_sub(1);
    }

    pub fn select_next(&mut self, len: usize) {
        if self.menu_index + 1 < len {
            self.menu_index += 1;
        }
    }
}
