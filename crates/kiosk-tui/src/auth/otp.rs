//! One-time passcodes issued after a successful password check

use std::collections::HashMap;
use std::time::Duration;

use kiosk_core::{Role, OTP_CODE_LENGTH};
use rand::Rng;
use tokio::time::Instant;
use zeroize::Zeroizing;

/// Server-side OTP validity
pub const OTP_VALIDITY: Duration = Duration::from_secs(60);

struct IssuedOtp {
    code: Zeroizing<String>,
    expires_at: Instant,
    role: Role,
}

/// Outcome of checking a submitted code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpCheck {
    /// Code matched; the entry is consumed
    Accepted(Role),
    /// Code did not match; the entry stays valid
    Wrong,
    /// Entry exists but its window has passed
    Expired,
    /// Nothing issued for this identity
    Missing,
}

/// Record of a code handed to the out-of-band channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpDelivery {
    pub identity: String,
    pub code: String,
    pub issued_at: chrono::DateTime<chrono::Local>,
}

/// Pending OTPs keyed by identity. A new login replaces the old code.
pub struct OtpLedger {
    pending: HashMap<String, IssuedOtp>,
    validity: Duration,
}

impl Default for OtpLedger {
    fn default() -> Self {
        Self::new(OTP_VALIDITY)
    }
}

impl OtpLedger {
    pub fn new(validity: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            validity,
        }
    }

    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Generate a fresh zero-padded code for `identity`
    pub fn issue(&mut self, identity: &str, role: Role) -> OtpDelivery {
        let max = 10u32.pow(OTP_CODE_LENGTH as u32);
        let code = format!(
            "{:0width$}",
            rand::thread_rng().gen_range(0..max),
            width = OTP_CODE_LENGTH
        );

        self.pending.insert(
            identity.to_string(),
            IssuedOtp {
                code: Zeroizing::new(code.clone()),
                expires_at: Instant::now() + self.validity,
                role,
            },
        );

        OtpDelivery {
            identity: identity.to_string(),
            code,
            issued_at: chrono::Local::now(),
        }
    }

    /// Check a submitted code
    pub fn check(&mut self, identity: &str, code: &str) -> OtpCheck {
        let Some(issued) = self.pending.get(identity) else {
            return OtpCheck::Missing;
        };
        if Instant::now() > issued.expires_at {
            return OtpCheck::Expired;
        }
        if issued.code.as_str() != code {
            return OtpCheck::Wrong;
        }

        let role = issued.role;
        self.pending.remove(identity);
        OtpCheck::Accepted(role)
    }

    pub fn is_pending(&self, identity: &str) -> bool {
        self.pending.contains_key(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_issue_and_accept_once() {
        let mut ledger = OtpLedger::default();
        let delivery = ledger.issue("alice", Role::Customer);

        assert_eq!(delivery.code.len(), 6);
        assert!(delivery.code.chars().all(|c| c.is_ascii_digit()));

        assert_eq!(ledger.check("alice", "not-it"), OtpCheck::Wrong);
        assert_eq!(
            ledger.check("alice", &delivery.code),
            OtpCheck::Accepted(Role::Customer)
        );
        assert_eq!(ledger.check("alice", &delivery.code), OtpCheck::Missing);
    }

    #[tokio::test(start_paused = true)]
    async fn test_code_expires_after_validity() {
        let mut ledger = OtpLedger::default();
        let delivery = ledger.issue("carol", Role::Staff);

        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(ledger.check("carol", &delivery.code), OtpCheck::Expired);
        assert!(ledger.is_pending("carol"));
    }

    #[tokio::test]
    async fn test_relogin_replaces_code() {
        let mut ledger = OtpLedger::default();
        let first = ledger.issue("alice", Role::Customer);
        let second = ledger.issue("alice", Role::Customer);

        if first.code != second.code {
            assert_eq!(ledger.check("alice", &first.code), OtpCheck::Wrong);
        }
        assert_eq!(
            ledger.check("alice", &second.code),
            OtpCheck::Accepted(Role::Customer)
        );
    }
}
