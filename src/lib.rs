//! pco-live - remote control for Planning Center Services LIVE
//!
//! Drives a plan's live session (next/previous item) over the Services API
//! while respecting its single-controller model, where ownership can only be
//! flipped with a toggle.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`gateway`] - Authenticated REST access and endpoint URLs
//! - [`catalog`] - Service types and upcoming plans, plan lookup
//! - [`control`] - Control ownership state machine
//! - [`live`] - Navigation mutations and projection of the live state
//! - [`session`] - Per-session context and action dispatch
//! - [`models`] - Core data structures and types
//! - [`utils`] - Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use pco_live::config::Config;
//! use pco_live::session::{Action, LiveSession, PlanTarget};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let session = LiveSession::from_config(&config)?;
//!     let target = PlanTarget::NextInServiceType { service_type_id: "123".into() };
//!     let outcome = session.perform(Action::Next, &target).await?;
//!     println!("{:?}", outcome.navigation);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod control;
pub mod error;
pub mod gateway;
pub mod live;
pub mod models;
pub mod session;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::catalog::{Catalog, CatalogCache, CatalogScope};
    pub use crate::config::Config;
    pub use crate::control::{ControlCoordinator, ControlState};
    pub use crate::error::{Error, ErrorCategory, LiveErrorTrait, Result};
    pub use crate::gateway::{HttpGateway, RestGateway};
    pub use crate::models::{ControlToken, Direction, NavigationState};
    pub use crate::session::{Action, LiveSession, PlanTarget, SessionStatus};
}

// Direct re-exports for convenience
pub use models::{ControlToken, Direction, NavigationState};
