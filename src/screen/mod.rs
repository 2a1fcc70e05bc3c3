//! Temperature screen: theme selection and frame layout

pub mod layout;
pub mod theme;

pub use layout::{compose_frame, FrameLayout};
pub use theme::Theme;

/// Trend indicator next to the reading
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Arrow {
    #[default]
    None,
    Up,
    Down,
}
