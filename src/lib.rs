//! Stagecoach: Staged Process-Lifecycle Coordination
//!
//! Sequences the startup of a multi-process host into ordered phases. Each
//! phase runs a platform pre-hook, shared work, then a platform post-hook. The
//! coordinator owns the execution contexts and the primary UI surface created
//! along the way and tears them down in reverse dependency order.

pub mod cli;
pub mod config;
pub mod context;
pub mod coordinator;
pub mod driver;
pub mod error;
pub mod logging;
pub mod phase;
pub mod platform;
pub mod run_loop;
pub mod ui;

pub use config::StartupParameters;
pub use coordinator::{CoordinatorParts, LifecycleCoordinator};
pub use error::LifecycleError;
pub use phase::{LifecycleState, Phase};
