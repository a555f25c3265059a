use glam::Vec2;

use crate::error::PhysicsError;

/// User-defined opaque key carried through contacts (e.g., pack your entity id).
pub type UserKey = u64;

slotmap::new_key_type! {
    /// Generation-checked handle to a body. Stays valid across store growth;
    /// a handle to a slot that was reused no longer resolves.
    pub struct BodyHandle;

    /// Generation-checked handle to a collider.
    pub struct ColliderHandle;
}

/// Axis-aligned bounding box, Y up: `bottom_left` is the min corner and
/// `top_right` the max corner.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Aabb {
    pub bottom_left: Vec2,
    pub top_right: Vec2,
}

impl Aabb {
    /// Build from two opposite corners. Corners are sorted so the result is
    /// always well formed.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            bottom_left: a.min(b),
            top_right: a.max(b),
        }
    }

    pub fn from_center_half_extents(center: Vec2, half_extents: Vec2) -> Self {
        let h = half_extents.abs();
        Self {
            bottom_left: center - h,
            top_right: center + h,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.bottom_left + self.top_right) * 0.5
    }

    /// Half size along X/Y.
    pub fn extents(&self) -> Vec2 {
        (self.top_right - self.bottom_left) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.top_right - self.bottom_left
    }

    /// Inclusive interval overlap on both axes (touching counts).
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.bottom_left.x <= other.top_right.x
            && self.top_right.x >= other.bottom_left.x
            && self.bottom_left.y <= other.top_right.y
            && self.top_right.y >= other.bottom_left.y
    }

    /// True if `other` lies entirely inside `self` (boundaries included).
    pub fn contains(&self, other: &Aabb) -> bool {
        self.bottom_left.x <= other.bottom_left.x
            && self.bottom_left.y <= other.bottom_left.y
            && self.top_right.x >= other.top_right.x
            && self.top_right.y >= other.top_right.y
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            bottom_left: self.bottom_left.min(other.bottom_left),
            top_right: self.top_right.max(other.top_right),
        }
    }

    pub fn translated(&self, offset: Vec2) -> Aabb {
        Aabb {
            bottom_left: self.bottom_left + offset,
            top_right: self.top_right + offset,
        }
    }
}

/// Supported collider shapes, centered on the owning body's position.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    /// Axis-aligned rectangle; `size` is the full width/height.
    Rect { size: Vec2 },
}

impl Shape {
    pub fn circle(radius: f32) -> Self {
        Shape::Circle { radius }
    }

    pub fn rect(width: f32, height: f32) -> Self {
        Shape::Rect {
            size: Vec2::new(width, height),
        }
    }

    /// Local-space half size of the shape's bounding box.
    pub fn half_extents(&self) -> Vec2 {
        match *self {
            Shape::Circle { radius } => Vec2::splat(radius),
            Shape::Rect { size } => size * 0.5,
        }
    }

    pub(crate) fn validate(&self) -> Result<(), PhysicsError> {
        match *self {
            Shape::Circle { radius } if !(radius.is_finite() && radius >= 0.0) => {
                Err(PhysicsError::InvalidConfiguration {
                    reason: "circle radius must be finite and non-negative",
                })
            }
            Shape::Rect { size } if !(size.is_finite() && size.x >= 0.0 && size.y >= 0.0) => {
                Err(PhysicsError::InvalidConfiguration {
                    reason: "rect size must be finite and non-negative",
                })
            }
            _ => Ok(()),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum BodyType {
    /// Never moved by the step; only by direct API calls.
    Static,
    #[default]
    Dynamic,
}

/// Parameters for [`crate::PhysicsWorld::create_body`].
#[derive(Copy, Clone, Debug)]
pub struct BodyDef {
    pub body_type: BodyType,
    pub position: Vec2,
    pub linear_velocity: Vec2,
    pub mass: f32,
    /// Multiplier on world gravity (1 = full gravity).
    pub gravity_scale: f32,
    /// Default bounce scaling for colliders that don't override it.
    pub restitution: f32,
}

impl Default for BodyDef {
    fn default() -> Self {
        Self {
            body_type: BodyType::Dynamic,
            position: Vec2::ZERO,
            linear_velocity: Vec2::ZERO,
            mass: 1.0,
            gravity_scale: 1.0,
            restitution: 1.0,
        }
    }
}

impl BodyDef {
    pub fn dynamic(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn static_at(position: Vec2) -> Self {
        Self {
            body_type: BodyType::Static,
            position,
            ..Default::default()
        }
    }

    pub fn with_velocity(mut self, linear_velocity: Vec2) -> Self {
        self.linear_velocity = linear_velocity;
        self
    }
}

/// Parameters for [`crate::PhysicsWorld::create_collider`].
#[derive(Copy, Clone, Debug)]
pub struct ColliderDef {
    pub shape: Shape,
    /// Overrides the body restitution when set. Clamped to `[0, 1]`.
    pub restitution: Option<f32>,
    /// Sensors report contacts but never receive a collision response.
    pub is_sensor: bool,
    /// Opaque key owned by the caller, echoed back in contacts.
    pub user_data: Option<UserKey>,
}

impl ColliderDef {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            restitution: None,
            is_sensor: false,
            user_data: None,
        }
    }

    pub fn sensor(mut self) -> Self {
        self.is_sensor = true;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = Some(restitution);
        self
    }

    pub fn with_user_data(mut self, key: UserKey) -> Self {
        self.user_data = Some(key);
        self
    }
}

/// Overlap contact result from the narrow phase.
#[derive(Copy, Clone, Debug)]
pub struct Overlap {
    /// Unit normal pointing from B into A.
    pub normal: Vec2,
    /// Penetration depth (≥ 0).
    pub depth: f32,
    /// A representative contact point.
    pub contact: Vec2,
}

/// Quadtree split thresholds.
#[derive(Copy, Clone, Debug)]
pub struct QuadTreeConfig {
    /// A node splits once it stores more than this many objects.
    pub max_objects: usize,
    /// Nodes at this level never split.
    pub max_levels: u32,
}

impl Default for QuadTreeConfig {
    fn default() -> Self {
        Self {
            max_objects: 10,
            max_levels: 5,
        }
    }
}

/// World-level configuration.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    /// Acceleration applied to dynamic bodies, scaled per body.
    pub gravity: Vec2,
    /// Root bounds of the quadtree (typically the visible play area).
    pub bounds: Aabb,
    pub quadtree: QuadTreeConfig,
    /// Fixed number of collider slots per body.
    pub max_colliders_per_body: usize,
    /// Body slots reserved up front; the store grows past this between steps.
    pub initial_body_capacity: usize,
    /// Hard limit on the body count, if any.
    pub max_bodies: Option<usize>,
    /// Slack added to circle/circle radius sums.
    pub contact_epsilon: f32,
    /// If true, bodies are indexed with the union of their start and end-of-step AABBs.
    pub swept_broadphase: bool,
    /// Enable internal timing instrumentation (adds small overhead when true).
    pub enable_timing: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            bounds: Aabb::new(Vec2::ZERO, Vec2::new(1280.0, 720.0)),
            quadtree: QuadTreeConfig::default(),
            max_colliders_per_body: 4,
            initial_body_capacity: 1000,
            max_bodies: None,
            contact_epsilon: 0.1,
            swept_broadphase: false,
            enable_timing: false,
        }
    }
}

impl WorldConfig {
    /// World covering `(0,0)..screen_resolution` with the given gravity.
    pub fn new(gravity: Vec2, screen_resolution: Vec2) -> Self {
        Self {
            gravity,
            bounds: Aabb::new(Vec2::ZERO, screen_resolution),
            ..Default::default()
        }
    }
}

/// Read-only snapshot of a body for debug drawing.
#[derive(Copy, Clone, Debug)]
pub struct BodyInfo {
    pub handle: BodyHandle,
    pub body_type: BodyType,
    pub position: Vec2,
    pub linear_velocity: Vec2,
    pub aabb: Aabb,
}

/// Timing breakdown for the last step.
#[derive(Copy, Clone, Debug, Default)]
pub struct StepTiming {
    pub step_ms: f64,
    pub integrate_ms: f64,
    pub broadphase_ms: f64,
    pub narrowphase_ms: f64,
}

/// Outcome of one [`crate::PhysicsWorld::step`].
#[derive(Clone, Debug, Default)]
pub struct StepReport {
    pub bodies: usize,
    /// Unique body pairs returned by the broad phase.
    pub candidate_pairs: usize,
    /// Candidate pairs whose AABBs overlapped and went to the narrow phase.
    pub tested_pairs: usize,
    pub contacts_begun: usize,
    pub contacts_ended: usize,
    pub active_contacts: usize,
    /// Non-fatal problems hit during the step (e.g. bodies without colliders).
    pub issues: Vec<PhysicsError>,
    pub timing: Option<StepTiming>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_corners_are_sorted() {
        let b = Aabb::new(Vec2::new(10.0, -5.0), Vec2::new(-2.0, 7.0));
        assert_eq!(b.bottom_left, Vec2::new(-2.0, -5.0));
        assert_eq!(b.top_right, Vec2::new(10.0, 7.0));
        assert_eq!(b.center(), Vec2::new(4.0, 1.0));
        assert_eq!(b.extents(), Vec2::new(6.0, 6.0));
        assert_eq!(b.size(), Vec2::new(12.0, 12.0));
    }

    #[test]
    fn test_aabb_overlap_is_inclusive() {
        let a = Aabb::new(Vec2::ZERO, Vec2::splat(1.0));
        let touching = a.translated(Vec2::new(1.0, 0.0));
        let apart = a.translated(Vec2::new(1.01, 0.0));
        assert!(a.overlaps(&touching) && touching.overlaps(&a));
        assert!(!a.overlaps(&apart));
        let u = a.union(&apart);
        assert!(u.contains(&a) && u.contains(&apart));
        assert!(!a.contains(&u));
    }

    #[test]
    fn test_shape_half_extents_and_validation() {
        assert_eq!(Shape::circle(3.0).half_extents(), Vec2::splat(3.0));
        assert_eq!(Shape::rect(4.0, 2.0).half_extents(), Vec2::new(2.0, 1.0));
        assert!(Shape::circle(f32::NAN).validate().is_err());
        assert!(Shape::rect(-1.0, 1.0).validate().is_err());
        assert!(Shape::circle(0.0).validate().is_ok());
    }
}
