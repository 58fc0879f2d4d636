//! Live-session navigation
//!
//! - [`navigator`] - next/previous item mutations
//! - [`projector`] - session document to [`NavigationState`](crate::models::NavigationState)

pub mod navigator;
pub mod projector;

pub use navigator::LiveNavigator;
pub use projector::project;
