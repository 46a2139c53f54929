//! Domain state types for the wgmon application.
//!
//! - `output`: bounded buffer behind the output panel
//! - `ui`: UI-specific state like focus and toasts

mod output;
mod ui;

pub use output::{OutputBuffer, OutputLine};
pub use ui::{FocusedPanel, ScrollState, Toast, ToastType};
