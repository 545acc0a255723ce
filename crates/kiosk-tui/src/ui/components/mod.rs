//! Reusable UI components

pub mod countdown;
pub mod header;
pub mod notification;
pub mod status_bar;
