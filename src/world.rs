use glam::Vec2;
use slotmap::SlotMap;
use tracing::{debug, warn};

use std::collections::HashSet;
use std::time::Instant;

use crate::api::{ContactListener, NarrowphaseApi, PhysicsWorldApi};
use crate::body::{Body, Collider};
use crate::contact::{Contact, ContactManager};
use crate::error::PhysicsError;
use crate::narrowphase::{FALLBACK_NORMAL, Narrowphase};
use crate::quadtree::QuadTree;
use crate::types::*;

/// Owns every body and collider, the broad-phase index and the active contacts.
///
/// Bodies and colliders live in generation-checked arenas. The arenas may
/// grow (and move their storage) only between steps: both creation and
/// [`PhysicsWorldApi::step`] need `&mut self`, so nothing can hold a body
/// across a reallocation.
pub struct PhysicsWorld {
    pub cfg: WorldConfig,
    pub step_counter: u64,

    bodies: SlotMap<BodyHandle, Body>,
    colliders: SlotMap<ColliderHandle, Collider>,
    quadtree: QuadTree<BodyHandle>,
    contacts: ContactManager,
    listener: Option<Box<dyn ContactListener>>,

    // Per-step scratch
    indexed: Vec<(BodyHandle, Aabb)>,
    seen: HashSet<(BodyHandle, BodyHandle)>,
    touching: HashSet<(ColliderHandle, ColliderHandle)>,
}

/// Used by `step` when no listener is installed.
struct NoopListener;

impl ContactListener for NoopListener {}

/// Collider pair found overlapping by the narrow phase.
struct Hit {
    contact: Contact,
    overlap: Overlap,
    restitution_a: f32,
    restitution_b: f32,
}

impl PhysicsWorldApi for PhysicsWorld {
    fn new(cfg: WorldConfig) -> Self {
        let quadtree = QuadTree::new(cfg.bounds, cfg.quadtree);
        let capacity = cfg.initial_body_capacity;
        Self {
            cfg,
            step_counter: 0,
            bodies: SlotMap::with_capacity_and_key(capacity),
            colliders: SlotMap::with_capacity_and_key(capacity),
            quadtree,
            contacts: ContactManager::new(),
            listener: None,
            indexed: Vec::with_capacity(capacity),
            seen: HashSet::new(),
            touching: HashSet::new(),
        }
    }

    fn create_body(&mut self, def: BodyDef) -> Result<BodyHandle, PhysicsError> {
        if let Some(limit) = self.cfg.max_bodies {
            if self.bodies.len() >= limit {
                warn!(limit, "body store full; rejecting body");
                return Err(PhysicsError::CapacityExceeded {
                    resource: "bodies",
                    limit,
                });
            }
        }
        let body = Body::new(&def, self.cfg.max_colliders_per_body)
            .inspect_err(|e| warn!(%e, "rejecting body"))?;
        let handle = self.bodies.insert(body);
        debug!(?handle, body_type = ?def.body_type, position = ?def.position, "created body");
        Ok(handle)
    }

    fn create_collider(
        &mut self,
        body: BodyHandle,
        def: ColliderDef,
    ) -> Result<ColliderHandle, PhysicsError> {
        def.shape.validate()?;
        let collider = Collider::new(&def, body)?;
        let Some(owner) = self.bodies.get_mut(body) else {
            return Err(PhysicsError::InvalidBody(body));
        };
        let handle = self.colliders.insert(collider);
        if let Err(e) = owner.attach_collider(handle, &def.shape) {
            self.colliders.remove(handle);
            warn!(%e, ?body, "rejecting collider");
            return Err(e);
        }
        debug!(?handle, ?body, shape = ?def.shape, sensor = def.is_sensor, "created collider");
        Ok(handle)
    }

    fn create_circle(
        &mut self,
        def: BodyDef,
        radius: f32,
        is_sensor: bool,
    ) -> Result<(BodyHandle, ColliderHandle), PhysicsError> {
        let body = self.create_body(def)?;
        let collider = self.create_collider(
            body,
            ColliderDef {
                is_sensor,
                ..ColliderDef::new(Shape::Circle { radius })
            },
        )?;
        Ok((body, collider))
    }

    fn create_rect(
        &mut self,
        def: BodyDef,
        size: Vec2,
        is_sensor: bool,
    ) -> Result<(BodyHandle, ColliderHandle), PhysicsError> {
        let body = self.create_body(def)?;
        let collider = self.create_collider(
            body,
            ColliderDef {
                is_sensor,
                ..ColliderDef::new(Shape::Rect { size })
            },
        )?;
        Ok((body, collider))
    }

    fn set_contact_listener(&mut self, listener: Box<dyn ContactListener>) {
        self.listener = Some(listener);
    }

    fn clear_contact_listener(&mut self) -> Option<Box<dyn ContactListener>> {
        self.listener.take()
    }

    fn step(&mut self, dt: f32) -> StepReport {
        // Taken out for the duration of the step so callbacks can borrow it mutably.
        let mut listener = self.listener.take();
        let report = match listener.as_mut() {
            Some(l) => self.run_step(dt, &mut **l),
            None => self.run_step(dt, &mut NoopListener),
        };
        self.listener = listener;
        report
    }

    fn step_with_listener(&mut self, dt: f32, listener: &mut dyn ContactListener) -> StepReport {
        self.run_step(dt, listener)
    }

    fn body_infos(&self) -> Vec<BodyInfo> {
        self.bodies
            .iter()
            .map(|(handle, body)| BodyInfo {
                handle,
                body_type: body.body_type(),
                position: body.position(),
                linear_velocity: body.linear_velocity(),
                aabb: body.aabb(),
            })
            .collect()
    }

    fn quadtree_bounds(&self) -> Vec<Aabb> {
        self.quadtree.node_bounds()
    }
}

fn start_timer(enabled: bool) -> Option<Instant> {
    if enabled { Some(Instant::now()) } else { None }
}

fn elapsed_ms(t: Option<Instant>) -> f64 {
    t.map(|t| t.elapsed().as_secs_f64() * 1000.0).unwrap_or(0.0)
}

/// `(v - 2(v·n)n) * restitution`, with `n` unit length.
fn reflect(v: Vec2, n: Vec2, restitution: f32) -> Vec2 {
    (v - n * (2.0 * v.dot(n))) * restitution
}

impl PhysicsWorld {
    fn run_step<L: ContactListener + ?Sized>(&mut self, dt: f32, listener: &mut L) -> StepReport {
        let mut report = StepReport {
            bodies: self.bodies.len(),
            ..Default::default()
        };
        if !(dt.is_finite() && dt >= 0.0) {
            warn!(dt, "ignoring step with invalid dt");
            report.issues.push(PhysicsError::InvalidConfiguration {
                reason: "step dt must be finite and non-negative",
            });
            report.active_contacts = self.contacts.len();
            return report;
        }

        let timing = self.cfg.enable_timing;
        let t_all = start_timer(timing);
        let mut step_timing = StepTiming::default();

        self.quadtree.clear();
        self.touching.clear();
        self.indexed.clear();
        self.seen.clear();

        // Integrate, remembering where each body started for the broad phase.
        let t_int = start_timer(timing);
        let gravity = self.cfg.gravity;
        let swept = self.cfg.swept_broadphase;
        for (handle, body) in self.bodies.iter_mut() {
            let start = body.aabb();
            body.integrate(gravity, dt);
            if body.colliders().is_empty() {
                if !body.reported_missing_collider {
                    warn!(?handle, "body has no collider; skipping it for collision");
                    body.reported_missing_collider = true;
                }
                report.issues.push(PhysicsError::MissingCollider(handle));
                continue;
            }
            let aabb = if swept { start.union(&body.aabb()) } else { start };
            self.indexed.push((handle, aabb));
        }
        step_timing.integrate_ms = elapsed_ms(t_int);

        let t_insert = start_timer(timing);
        for &(handle, aabb) in &self.indexed {
            self.quadtree.insert(handle, aabb);
        }
        step_timing.broadphase_ms = elapsed_ms(t_insert);

        let mut candidates = Vec::new();
        for i in 0..self.indexed.len() {
            let (handle, query) = self.indexed[i];
            let t_retrieve = start_timer(timing);
            candidates.clear();
            self.quadtree.retrieve(&query, &mut candidates);
            step_timing.broadphase_ms += elapsed_ms(t_retrieve);

            for &other in &candidates {
                if other == handle {
                    continue;
                }
                let key = if handle < other { (handle, other) } else { (other, handle) };
                if !self.seen.insert(key) {
                    continue;
                }
                report.candidate_pairs += 1;
                let t_np = start_timer(timing);
                self.collide_pair(key.0, key.1, listener, &mut report);
                step_timing.narrowphase_ms += elapsed_ms(t_np);
            }
        }

        report.contacts_ended = self.contacts.retain_touching(&self.touching, listener);
        report.active_contacts = self.contacts.len();
        self.step_counter = self.step_counter.wrapping_add(1);

        if t_all.is_some() {
            step_timing.step_ms = elapsed_ms(t_all);
            report.timing = Some(step_timing);
        }
        report
    }

    /// Narrow phase for one body pair: mark touching collider pairs, begin new
    /// contacts and bounce the bodies on the first new solid contact.
    fn collide_pair<L: ContactListener + ?Sized>(
        &mut self,
        a: BodyHandle,
        b: BodyHandle,
        listener: &mut L,
        report: &mut StepReport,
    ) {
        let (Some(body_a), Some(body_b)) = (self.bodies.get(a), self.bodies.get(b)) else {
            return;
        };
        if !body_a.aabb().overlaps(&body_b.aabb()) {
            return;
        }
        report.tested_pairs += 1;

        let mut hits = Vec::new();
        for &ha in body_a.colliders() {
            let Some(col_a) = self.colliders.get(ha) else { continue };
            for &hb in body_b.colliders() {
                let Some(col_b) = self.colliders.get(hb) else { continue };
                let Some(overlap) = Narrowphase::overlap_shapes(
                    (col_a.shape(), body_a.position()),
                    (col_b.shape(), body_b.position()),
                    self.cfg.contact_epsilon,
                ) else {
                    continue;
                };
                hits.push(Hit {
                    contact: Contact {
                        collider_a: ha,
                        collider_b: hb,
                        body_a: a,
                        body_b: b,
                        a_key: col_a.user_data(),
                        b_key: col_b.user_data(),
                        sensor: col_a.is_sensor() || col_b.is_sensor(),
                    },
                    overlap,
                    restitution_a: col_a.restitution().unwrap_or(body_a.restitution()),
                    restitution_b: col_b.restitution().unwrap_or(body_b.restitution()),
                });
            }
        }

        let mut responded = false;
        for hit in hits {
            self.touching.insert(hit.contact.pair());
            let Some(id) = self.contacts.create_contact(hit.contact) else {
                continue;
            };
            debug!(?id, a = ?hit.contact.collider_a, b = ?hit.contact.collider_b, "contact began");
            report.contacts_begun += 1;
            listener.begin_contact(&hit.contact);

            if !hit.contact.sensor && !responded {
                self.respond(a, b, &hit);
                responded = true;
            }
        }
    }

    /// Reflect each dynamic body's velocity about the contact normal, each
    /// scaled by its own restitution. No momentum exchange between the two.
    fn respond(&mut self, a: BodyHandle, b: BodyHandle, hit: &Hit) {
        let normal = hit.overlap.normal.try_normalize().unwrap_or(FALLBACK_NORMAL);
        for (handle, restitution) in [(a, hit.restitution_a), (b, hit.restitution_b)] {
            if let Some(body) = self.bodies.get_mut(handle) {
                if body.is_static() {
                    continue;
                }
                let v = reflect(body.linear_velocity(), normal, restitution);
                body.set_linear_velocity(v);
            }
        }
    }

    // --- Queries -----------------------------------------------------------

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies.get(handle)
    }

    /// Direct access for teleporting or setting velocities between steps.
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies.get_mut(handle)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyHandle, &Body)> + '_ {
        self.bodies.iter()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn collider(&self, handle: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(handle)
    }

    pub fn collider_mut(&mut self, handle: ColliderHandle) -> Option<&mut Collider> {
        self.colliders.get_mut(handle)
    }

    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    /// Broad-phase index as built by the last step.
    pub fn quadtree(&self) -> &QuadTree<BodyHandle> {
        &self.quadtree
    }

    pub fn contacts(&self) -> &ContactManager {
        &self.contacts
    }

    pub fn set_gravity(&mut self, gravity: Vec2) {
        self.cfg.gravity = gravity;
    }
}
