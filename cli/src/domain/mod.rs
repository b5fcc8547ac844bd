//! Domain layer: pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod action;
pub mod battery;
pub mod config;
pub mod error;
pub mod layout;
pub mod report;
pub mod target;
pub mod topology;

pub use action::{
    ActionHandle, ActionId, ActionOutcome, ActionReport, ActionResult, ActionStatus,
    ArtifactState,
};
pub use battery::{AuxCommand, CommandOutcome, standard_battery};
pub use config::CollectConfig;
pub use error::{ConfigError, ControlPlaneError, TopologyError};
pub use layout::OutputLayout;
pub use report::{DispatchFailure, RunReport};
pub use target::{ModelTarget, Scope};
pub use topology::{ClusterStatus, TargetUnit, UnitName};
