//! Kiosk TUI - GuoBank self-service terminal
//!
//! Terminal front end for the kiosk session flow. Pages are driven by the
//! `kiosk-core` session machine; a simulated backend stands in for the bank
//! authority and delivers OTP codes to the operator status line.

pub mod app;
pub mod auth;
pub mod backend;
pub mod surface;
pub mod ui;

pub use app::App;
