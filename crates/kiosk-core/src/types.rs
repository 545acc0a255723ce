//! Shared value types: roles, balances and menu actions

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Sentinel the backend returns in place of a balance when the ledger read fails
pub const BALANCE_ERROR_SENTINEL: &str = "Error";

/// Role attached to an authenticated identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Staff,
}

// Account records carry "Customer"/"Staff"; pages carry lowercase.
impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Role::parse(&s))
    }
}

impl Role {
    /// Parse a role carried as a plain string. Anything unrecognised is a customer.
    pub fn parse(s: &str) -> Self {
        if s.trim().eq_ignore_ascii_case("staff") {
            Role::Staff
        } else {
            Role::Customer
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Staff => "staff",
        }
    }

    /// Actions offered on the authenticated menu for this role
    pub fn menu_actions(&self) -> &'static [MenuAction] {
        match self {
            Role::Staff => &[
                MenuAction::MaintenanceOn,
                MenuAction::MaintenanceOff,
                MenuAction::Logout,
            ],
            Role::Customer => &[
                MenuAction::CheckBalance,
                MenuAction::Withdraw,
                MenuAction::Deposit,
                MenuAction::Logout,
            ],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Action selectable on the authenticated menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    CheckBalance,
    Withdraw,
    Deposit,
    MaintenanceOn,
    MaintenanceOff,
    Logout,
}

impl MenuAction {
    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::CheckBalance => "Check Balance",
            MenuAction::Withdraw => "Withdraw",
            MenuAction::Deposit => "Deposit",
            MenuAction::MaintenanceOn => "Maintenance ON",
            MenuAction::MaintenanceOff => "Maintenance OFF",
            MenuAction::Logout => "Logout",
        }
    }
}

/// Outcome of a balance fetch, either an amount in RM or the error sentinel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BalanceReply {
    Amount(f64),
    Error,
}

impl BalanceReply {
    /// Parse the plain string a page receives as its `amount` parameter
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s == BALANCE_ERROR_SENTINEL {
            return BalanceReply::Error;
        }
        match s.parse::<f64>() {
            Ok(amount) if amount.is_finite() => BalanceReply::Amount(amount),
            _ => BalanceReply::Error,
        }
    }

    /// Value carried as the `amount` navigation parameter
    pub fn to_param(&self) -> String {
        match self {
            BalanceReply::Amount(amount) => amount.to_string(),
            BalanceReply::Error => BALANCE_ERROR_SENTINEL.to_string(),
        }
    }

    /// Text shown on the balance detail page
    pub fn display_text(&self) -> String {
        match self {
            BalanceReply::Amount(amount) => format!("RM {:.2}", amount),
            BalanceReply::Error => "Error retrieving balance".to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, BalanceReply::Error)
    }
}
