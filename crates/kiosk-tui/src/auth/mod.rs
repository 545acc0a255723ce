//! Credential and OTP records held by the simulated bank authority

mod accounts;
mod otp;

pub use accounts::{Account, AccountBook};
pub use otp::{OtpCheck, OtpDelivery, OtpLedger, OTP_VALIDITY};
