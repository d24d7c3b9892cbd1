//! Simple Entity Component Manager
//!
//! Contains the in-memory component substrate and its cached views:
//! - Entity handles and component declaration
//! - Tombstoning component store
//! - Incrementally maintained views keyed by ordered component lists
//! - Standard component catalog

pub mod components;
pub mod ecs;

pub use ecs::{Component, ComponentTypeId, Ecm, EcmError, Entity};
pub use glam;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
