//! Screen modules, one per page

pub mod balance;
pub mod lockdown;
pub mod login;
pub mod menu;
pub mod otp;
