use glam::Vec2;

use crate::contact::Contact;
use crate::error::PhysicsError;
use crate::types::*;

/// Receives contact begin/end notifications from the step.
///
/// Callbacks run synchronously inside [`PhysicsWorldApi::step`]. The world is
/// mutably borrowed for the whole step, so a listener cannot create or destroy
/// bodies from a callback; queue such requests and apply them after the step.
pub trait ContactListener {
    /// First step in which the two colliders overlap.
    fn begin_contact(&mut self, _contact: &Contact) {}

    /// First step in which a previously overlapping pair no longer overlaps.
    fn end_contact(&mut self, _contact: &Contact) {}
}

/// Public API contract for the rigid-body world.
pub trait PhysicsWorldApi {
    /// Construct a new world with the given configuration.
    fn new(cfg: WorldConfig) -> Self
    where
        Self: Sized;

    // --- Creation ----------------------------------------------------------

    /// Add a body. Only valid between steps.
    fn create_body(&mut self, def: BodyDef) -> Result<BodyHandle, PhysicsError>;

    /// Attach a collider to `body`. Fails once the body's collider slots are used up.
    fn create_collider(
        &mut self,
        body: BodyHandle,
        def: ColliderDef,
    ) -> Result<ColliderHandle, PhysicsError>;

    /// Convenience: body + single circle collider.
    fn create_circle(
        &mut self,
        def: BodyDef,
        radius: f32,
        is_sensor: bool,
    ) -> Result<(BodyHandle, ColliderHandle), PhysicsError>;

    /// Convenience: body + single rect collider (full size).
    fn create_rect(
        &mut self,
        def: BodyDef,
        size: Vec2,
        is_sensor: bool,
    ) -> Result<(BodyHandle, ColliderHandle), PhysicsError>;

    // --- Listener ----------------------------------------------------------

    /// Install the single listener used by [`PhysicsWorldApi::step`], replacing any previous one.
    fn set_contact_listener(&mut self, listener: Box<dyn ContactListener>);

    /// Remove and return the installed listener.
    fn clear_contact_listener(&mut self) -> Option<Box<dyn ContactListener>>;

    // --- Simulation --------------------------------------------------------

    /// Advance the simulation by `dt`, notifying the installed listener.
    fn step(&mut self, dt: f32) -> StepReport;

    /// Advance the simulation by `dt`, notifying `listener` instead of the installed one.
    fn step_with_listener(&mut self, dt: f32, listener: &mut dyn ContactListener) -> StepReport;

    // --- Debug queries -----------------------------------------------------

    /// Snapshot of every body (position, velocity, world AABB).
    fn body_infos(&self) -> Vec<BodyInfo>;

    /// Bounds of every quadtree node built by the last step.
    fn quadtree_bounds(&self) -> Vec<Aabb>;
}

/// Shape-pair overlap tests. Centers are world positions; rects are given by half extents.
pub trait NarrowphaseApi {
    /// `|c0 - c1| <= r0 + r1 + slop`.
    fn overlap_circle_circle(c0: Vec2, r0: f32, c1: Vec2, r1: f32, slop: f32) -> Option<Overlap>;

    /// Circle (A) against axis-aligned rect (B).
    fn overlap_circle_rect(c: Vec2, r: f32, box_c: Vec2, box_h: Vec2) -> Option<Overlap>;

    /// Axis-aligned rect against rect; any AABB overlap counts.
    fn overlap_rect_rect(c0: Vec2, h0: Vec2, c1: Vec2, h1: Vec2) -> Option<Overlap>;

    /// Dispatch on the shape pair. `a` and `b` are (shape, world center).
    fn overlap_shapes(a: (Shape, Vec2), b: (Shape, Vec2), slop: f32) -> Option<Overlap>;
}
