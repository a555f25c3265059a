use glam::Vec2;

use crate::error::PhysicsError;
use crate::types::*;

/// A shape attached to exactly one body.
#[derive(Clone, Debug)]
pub struct Collider {
    shape: Shape,
    restitution: Option<f32>,
    is_sensor: bool,
    user_data: Option<UserKey>,
    body: BodyHandle,
}

impl Collider {
    pub(crate) fn new(def: &ColliderDef, body: BodyHandle) -> Result<Self, PhysicsError> {
        if def.restitution.is_some_and(|r| !r.is_finite()) {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "collider restitution must be finite",
            });
        }
        Ok(Self {
            shape: def.shape,
            restitution: def.restitution.map(|r| r.clamp(0.0, 1.0)),
            is_sensor: def.is_sensor,
            user_data: def.user_data,
            body,
        })
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Per-collider restitution override, if any.
    pub fn restitution(&self) -> Option<f32> {
        self.restitution
    }

    pub fn is_sensor(&self) -> bool {
        self.is_sensor
    }

    pub fn user_data(&self) -> Option<UserKey> {
        self.user_data
    }

    pub fn set_user_data(&mut self, key: Option<UserKey>) {
        self.user_data = key;
    }

    /// The owning body.
    pub fn body(&self) -> BodyHandle {
        self.body
    }
}

/// A point mass with a fixed number of collider slots.
#[derive(Clone, Debug)]
pub struct Body {
    body_type: BodyType,
    position: Vec2,
    linear_velocity: Vec2,
    mass: f32,
    gravity_scale: f32,
    restitution: f32,
    colliders: Vec<ColliderHandle>,
    max_colliders: usize,
    // Local half size around `position`, max over all colliders.
    half_extents: Vec2,
    pub(crate) reported_missing_collider: bool,
}

impl Body {
    pub(crate) fn new(def: &BodyDef, max_colliders: usize) -> Result<Self, PhysicsError> {
        if !(def.position.is_finite() && def.linear_velocity.is_finite()) {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "body position and velocity must be finite",
            });
        }
        if !(def.mass.is_finite() && def.mass >= 0.0) {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "body mass must be finite and non-negative",
            });
        }
        if !def.gravity_scale.is_finite() {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "gravity scale must be finite",
            });
        }
        if !def.restitution.is_finite() {
            return Err(PhysicsError::InvalidConfiguration {
                reason: "body restitution must be finite",
            });
        }
        let linear_velocity = match def.body_type {
            BodyType::Static => Vec2::ZERO,
            BodyType::Dynamic => def.linear_velocity,
        };
        Ok(Self {
            body_type: def.body_type,
            position: def.position,
            linear_velocity,
            mass: def.mass,
            gravity_scale: def.gravity_scale,
            restitution: def.restitution.clamp(0.0, 1.0),
            colliders: Vec::with_capacity(max_colliders),
            max_colliders,
            half_extents: Vec2::ZERO,
            reported_missing_collider: false,
        })
    }

    /// Claim the next collider slot and grow the cached bounds to fit `shape`.
    pub(crate) fn attach_collider(
        &mut self,
        handle: ColliderHandle,
        shape: &Shape,
    ) -> Result<(), PhysicsError> {
        if self.colliders.len() >= self.max_colliders {
            return Err(PhysicsError::CapacityExceeded {
                resource: "collider slots",
                limit: self.max_colliders,
            });
        }
        self.colliders.push(handle);
        self.half_extents = self.half_extents.max(shape.half_extents());
        Ok(())
    }

    pub fn body_type(&self) -> BodyType {
        self.body_type
    }

    pub fn is_static(&self) -> bool {
        self.body_type == BodyType::Static
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Teleport the body. Works for static bodies too.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn linear_velocity(&self) -> Vec2 {
        self.linear_velocity
    }

    pub fn set_linear_velocity(&mut self, velocity: Vec2) {
        self.linear_velocity = velocity;
    }

    /// `v += impulse / mass`, or `v += impulse` for a massless body.
    /// Static bodies ignore impulses.
    pub fn apply_linear_impulse(&mut self, impulse: Vec2) {
        if self.is_static() {
            return;
        }
        if self.mass > 0.0 {
            self.linear_velocity += impulse / self.mass;
        } else {
            self.linear_velocity += impulse;
        }
    }

    pub fn mass(&self) -> f32 {
        self.mass
    }

    pub fn gravity_scale(&self) -> f32 {
        self.gravity_scale
    }

    pub fn set_gravity_scale(&mut self, scale: f32) {
        self.gravity_scale = scale;
    }

    pub fn restitution(&self) -> f32 {
        self.restitution
    }

    pub fn colliders(&self) -> &[ColliderHandle] {
        &self.colliders
    }

    /// Local-space AABB half extents around the body origin.
    pub fn half_extents(&self) -> Vec2 {
        self.half_extents
    }

    pub fn min_position(&self) -> Vec2 {
        self.position - self.half_extents
    }

    pub fn max_position(&self) -> Vec2 {
        self.position + self.half_extents
    }

    /// World-space bounds at the current position.
    pub fn aabb(&self) -> Aabb {
        Aabb::from_center_half_extents(self.position, self.half_extents)
    }

    /// Symplectic Euler: velocity first, then position. No-op for static bodies.
    pub(crate) fn integrate(&mut self, gravity: Vec2, dt: f32) {
        if self.is_static() {
            return;
        }
        self.linear_velocity += gravity * self.gravity_scale * dt;
        self.position += self.linear_velocity * dt;
    }
}
