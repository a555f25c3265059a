//! Error type for world construction and the step pipeline.
//!
//! Creation calls return `Result<_, PhysicsError>`. Problems found while
//! stepping never abort the step; they are collected in
//! [`crate::StepReport::issues`] instead.

use std::fmt;

use crate::types::BodyHandle;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PhysicsError {
    /// A fixed-size store is full (collider slots, body store).
    CapacityExceeded {
        /// What resource was exhausted
        resource: &'static str,
        /// The limit that was hit
        limit: usize,
    },
    /// The handle does not refer to a live body.
    InvalidBody(BodyHandle),
    /// A definition carried an unusable value.
    InvalidConfiguration {
        reason: &'static str,
    },
    /// The body reached the collision phase without any collider; it was
    /// integrated but skipped for collision.
    MissingCollider(BodyHandle),
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { resource, limit } => {
                write!(f, "{resource} capacity exceeded (limit={limit})")
            }
            Self::InvalidBody(handle) => write!(f, "no live body for handle {handle:?}"),
            Self::InvalidConfiguration { reason } => {
                write!(f, "invalid configuration: {reason}")
            }
            Self::MissingCollider(handle) => {
                write!(f, "body {handle:?} has no collider; skipped for collision")
            }
        }
    }
}

impl std::error::Error for PhysicsError {}
