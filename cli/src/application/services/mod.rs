//! Application services: use-case orchestration.
//!
//! Each service module implements one step of a collection run by composing
//! domain logic with port trait calls. Services import only from
//! `crate::domain` and `crate::application::ports`, never from
//! `crate::infra`, `crate::commands`, or `crate::output`.

pub mod battery;
pub mod dispatch;
pub mod poll;
pub mod retrieve;
pub mod supervisor;
pub mod workspace;
