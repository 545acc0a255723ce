//! Page navigation with URL-style parameters
//!
//! Pages share nothing in memory except the session store. Everything else a
//! page needs (identity, role, countdown seed, balance) travels as plain string
//! parameters in the navigation target and is re-parsed on load.

use std::fmt;

use url::Url;

use crate::error::{KioskError, Result};
use crate::types::{BalanceReply, Role};

/// Base used to resolve relative page targets
const NAV_BASE: &str = "kiosk://terminal/";

pub const PARAM_USER: &str = "user";
pub const PARAM_STATUS: &str = "status";
pub const PARAM_COUNTDOWN: &str = "countdown";
pub const PARAM_AMOUNT: &str = "amount";

/// A page of the kiosk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    /// Credential entry
    Login,
    /// OTP challenge
    Otp,
    /// Role-specific menu
    Menu,
    /// Balance detail
    Balance,
    /// Dedicated lockdown page
    Lockdown,
}

impl Page {
    pub fn file_name(&self) -> &'static str {
        match self {
            Page::Login => "index.html",
            Page::Otp => "otp.html",
            Page::Menu => "menu.html",
            Page::Balance => "balance.html",
            Page::Lockdown => "lockdown.html",
        }
    }

    pub fn from_file_name(name: &str) -> Option<Self> {
        match name {
            "" | "index.html" => Some(Page::Login),
            "otp.html" => Some(Page::Otp),
            "menu.html" => Some(Page::Menu),
            "balance.html" => Some(Page::Balance),
            "lockdown.html" => Some(Page::Lockdown),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Login => "Login",
            Page::Otp => "Verification",
            Page::Menu => "Main Menu",
            Page::Balance => "Balance",
            Page::Lockdown => "Lockdown",
        }
    }
}

/// Navigation target: a page plus its string parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub page: Page,
    params: Vec<(String, String)>,
}

impl Navigation {
    pub fn new(page: Page) -> Self {
        Self {
            page,
            params: Vec::new(),
        }
    }

    /// Add a parameter
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.params.push((key.to_string(), value.into()));
        self
    }

    /// First value for a parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn login() -> Self {
        Self::new(Page::Login)
    }

    pub fn otp(identity: &str, role: Role, countdown_seconds: u32) -> Self {
        Self::new(Page::Otp)
            .with(PARAM_USER, identity)
            .with(PARAM_STATUS, role.as_str())
            .with(PARAM_COUNTDOWN, countdown_seconds.to_string())
    }

    pub fn menu(identity: &str, role: Role) -> Self {
        Self::new(Page::Menu)
            .with(PARAM_USER, identity)
            .with(PARAM_STATUS, role.as_str())
    }

    pub fn balance(identity: &str, role: Role, reply: BalanceReply) -> Self {
        Self::new(Page::Balance)
            .with(PARAM_USER, identity)
            .with(PARAM_STATUS, role.as_str())
            .with(PARAM_AMOUNT, reply.to_param())
    }

    pub fn lockdown() -> Self {
        Self::new(Page::Lockdown)
    }

    /// Identity carried by this target, empty when absent
    pub fn identity(&self) -> &str {
        self.param(PARAM_USER).unwrap_or_default()
    }

    /// Role carried by this target, customer when absent
    pub fn role(&self) -> Role {
        self.param(PARAM_STATUS).map(Role::parse).unwrap_or_default()
    }

    /// Countdown seed, if present and numeric
    pub fn countdown(&self) -> Option<u32> {
        self.param(PARAM_COUNTDOWN)
            .and_then(|s| s.trim().parse().ok())
    }

    /// Balance carried to the detail page. Absent means the fetch failed.
    pub fn balance_reply(&self) -> BalanceReply {
        self.param(PARAM_AMOUNT)
            .map(BalanceReply::parse)
            .unwrap_or(BalanceReply::Error)
    }

    /// Encode as a relative URL such as `otp.html?user=alice&status=customer&countdown=60`
    pub fn to_url(&self) -> String {
        if self.params.is_empty() {
            return self.page.file_name().to_string();
        }
        let query = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.params.iter())
            .finish();
        format!("{}?{}", self.page.file_name(), query)
    }

    /// Parse a relative or absolute page URL
    pub fn parse(target: &str) -> Result<Self> {
        let base = Url::parse(NAV_BASE)?;
        let url = base.join(target)?;

        let file = url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .unwrap_or_default();
        let page = Page::from_file_name(file)
            .ok_or_else(|| KioskError::Navigation(format!("unknown page: {}", file)))?;

        let params = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        Ok(Self { page, params })
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_target_url() {
        let nav = Navigation::otp("alice", Role::Customer, 60);
        assert_eq!(nav.to_url(), "otp.html?user=alice&status=customer&countdown=60");
    }

    #[test]
    fn test_parse_reads_params() {
        let nav = Navigation::parse("menu.html?user=bob%20smith&status=staff").unwrap();
        assert_eq!(nav.page, Page::Menu);
        assert_eq!(nav.identity(), "bob smith");
        assert_eq!(nav.role(), Role::Staff);
    }

    #[test]
    fn test_parse_round_trips_encoded_identity() {
        let nav = Navigation::balance("a&b=c", Role::Customer, BalanceReply::Amount(12.5));
        let parsed = Navigation::parse(&nav.to_url()).unwrap();
        assert_eq!(parsed, nav);
        assert_eq!(parsed.identity(), "a&b=c");
        assert_eq!(parsed.balance_reply(), BalanceReply::Amount(12.5));
    }

    #[test]
    fn test_missing_params_fall_back() {
        let nav = Navigation::parse("otp.html?countdown=abc").unwrap();
        assert_eq!(nav.identity(), "");
        assert_eq!(nav.role(), Role::Customer);
        assert_eq!(nav.countdown(), None);

        let nav = Navigation::parse("balance.html").unwrap();
        assert_eq!(nav.balance_reply(), BalanceReply::Error);
    }

    #[test]
    fn test_unknown_page_is_rejected() {
        assert!(matches!(
            Navigation::parse("admin.html"),
            Err(KioskError::Navigation(_))
        ));
    }

    #[test]
    fn test_root_is_login() {
        assert_eq!(Navigation::parse("").unwrap().page, Page::Login);
        assert_eq!(Navigation::parse("index.html").unwrap().page, Page::Login);
    }
}
