//! Reusable widgets drawn on top of or around the dashboard panels.

pub mod footer;
pub mod toast;
