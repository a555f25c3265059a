//! quadphys: 2D rigid-body core (circles + axis-aligned rects, quadtree broad phase)

pub mod types;
pub mod error;
pub mod api;
pub mod narrowphase;
pub mod body;
pub mod quadtree;
pub mod contact;
pub mod world;

pub use crate::types::*;
pub use crate::error::PhysicsError;
pub use crate::api::*;
pub use crate::body::{Body, Collider};
pub use crate::quadtree::QuadTree;
pub use crate::contact::{Contact, ContactEvent, ContactId, ContactManager, ContactRecorder};
pub use crate::world::PhysicsWorld;
