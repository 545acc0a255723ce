//! Session policy knobs shared by every page

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Countdown seed used when the backend does not supply one
pub const DEFAULT_OTP_SECONDS: u32 = 60;

/// Required OTP code length
pub const OTP_CODE_LENGTH: usize = 6;

/// What to do with a code submitted after the client-side countdown expired
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryPolicy {
    /// Forward it anyway; the backend decides
    #[default]
    Permissive,
    /// Reject locally without a backend call
    Block,
}

/// Policy applied by the session state machine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionPolicy {
    /// Countdown seed when the redirect carries none
    #[serde(default = "default_otp_seconds")]
    pub default_otp_seconds: u32,

    /// Countdown tick period in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Handling of submissions after expiry
    #[serde(default)]
    pub expiry_policy: ExpiryPolicy,

    /// Exact OTP code length
    #[serde(default = "default_otp_code_length")]
    pub otp_code_length: usize,
}

fn default_otp_seconds() -> u32 {
    DEFAULT_OTP_SECONDS
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_otp_code_length() -> usize {
    OTP_CODE_LENGTH
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            default_otp_seconds: DEFAULT_OTP_SECONDS,
            tick_interval_ms: default_tick_interval_ms(),
            expiry_policy: ExpiryPolicy::Permissive,
            otp_code_length: OTP_CODE_LENGTH,
        }
    }
}

impl SessionPolicy {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Policy that rejects late OTP submissions locally
    pub fn strict() -> Self {
        Self {
            expiry_policy: ExpiryPolicy::Block,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let policy: SessionPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, SessionPolicy::default());
        assert_eq!(policy.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn test_expiry_policy_serialization() {
        let policy: SessionPolicy =
            serde_json::from_str(r#"{"expiry_policy":"block"}"#).unwrap();
        assert_eq!(policy.expiry_policy, ExpiryPolicy::Block);
        assert_eq!(policy.default_otp_seconds, 60);
    }
}
