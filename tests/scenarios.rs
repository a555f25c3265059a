use glam::Vec2;
use quadphys::*;
use rand::{Rng, SeedableRng, rngs::StdRng};

const DT: f32 = 1.0 / 60.0;

fn zero_gravity_world() -> PhysicsWorld {
    PhysicsWorld::new(WorldConfig::new(Vec2::ZERO, Vec2::new(800.0, 600.0)))
}

fn swept_world(swept_broadphase: bool) -> PhysicsWorld {
    PhysicsWorld::new(WorldConfig {
        swept_broadphase,
        ..WorldConfig::new(Vec2::ZERO, Vec2::new(800.0, 600.0))
    })
}

fn count(events: &[ContactEvent]) -> (usize, usize) {
    let begins = events.iter().filter(|e| matches!(e, ContactEvent::Begin(_))).count();
    (begins, events.len() - begins)
}

fn head_on_circles_bounce_apart(swept_broadphase: bool) {
    let mut world = swept_world(swept_broadphase);
    let speed = 60.0;
    let (a, _) = world
        .create_circle(
            BodyDef::dynamic(Vec2::new(275.0, 300.0)).with_velocity(Vec2::new(speed, 0.0)),
            100.0,
            false,
        )
        .unwrap();
    let (b, _) = world
        .create_circle(
            BodyDef::dynamic(Vec2::new(525.0, 300.0)).with_velocity(Vec2::new(-speed, 0.0)),
            100.0,
            false,
        )
        .unwrap();

    let mut rec = ContactRecorder::new();
    let distance = |w: &PhysicsWorld| {
        (w.body(a).unwrap().position() - w.body(b).unwrap().position()).length()
    };

    // Close the gap until the circles touch
    let mut steps = 0;
    while count(rec.events()).0 == 0 {
        world.step_with_listener(DT, &mut rec);
        steps += 1;
        assert!(steps < 100, "circles never met");
    }
    assert!(distance(&world) <= 200.1);
    assert_eq!(count(rec.events()), (1, 0));
    let va = world.body(a).unwrap().linear_velocity();
    let vb = world.body(b).unwrap().linear_velocity();
    assert!((va.x + speed).abs() < 1e-3, "a velocity {va:?}");
    assert!((vb.x - speed).abs() < 1e-3, "b velocity {vb:?}");
    assert!(va.y.abs() < 1e-3 && vb.y.abs() < 1e-3);

    // Then they drift apart and the contact ends exactly once
    for _ in 0..60 {
        world.step_with_listener(DT, &mut rec);
    }
    assert!(distance(&world) > 200.0);
    assert_eq!(count(rec.events()), (1, 1));
    assert!(world.contacts().is_empty());
}

#[test]
fn head_on_circles_bounce_apart_start_of_step_broadphase() {
    head_on_circles_bounce_apart(false);
}

#[test]
fn head_on_circles_bounce_apart_swept_broadphase() {
    head_on_circles_bounce_apart(true);
}

#[test]
fn crowded_area_splits_quadtree_without_duplicate_references() {
    let mut world = zero_gravity_world();
    let mut rng = StdRng::seed_from_u64(42);
    let n = 250;
    for _ in 0..n {
        let p = Vec2::new(rng.gen_range(0.0..800.0), rng.gen_range(0.0..600.0));
        let v = Vec2::new(rng.gen_range(0.0..400.0), rng.gen_range(0.0..400.0));
        world
            .create_circle(BodyDef::dynamic(p).with_velocity(v), 10.0, true)
            .unwrap();
    }

    let mut rec = ContactRecorder::new();
    for _ in 0..10 {
        let report = world.step_with_listener(DT, &mut rec);
        assert_eq!(report.bodies, n);
        assert!(report.issues.is_empty());
        assert_eq!(report.active_contacts, world.contacts().len());

        let qt = world.quadtree();
        assert!(qt.is_split(), "root should split past its object threshold");
        assert_eq!(qt.len(), n);

        for info in world.body_infos() {
            let mut out = Vec::new();
            qt.retrieve(&info.aabb, &mut out);
            assert!(out.len() <= n);
        }
    }

    // Every begin is matched by an end or a still-active contact
    let (begins, ends) = count(rec.events());
    assert_eq!(begins - ends, world.contacts().len());
}

/// Brute-force check: every pair that overlaps at the end of a step must be a
/// contact after that step. Without sweeping, the pair's start-of-step boxes
/// must also have overlapped for it to be a broad-phase candidate.
fn broadphase_finds_every_overlapping_pair(swept_broadphase: bool) {
    let mut world = swept_world(swept_broadphase);
    let mut rng = StdRng::seed_from_u64(3);
    let mut handles = Vec::new();
    for _ in 0..150 {
        let p = Vec2::new(rng.gen_range(0.0..800.0), rng.gen_range(0.0..600.0));
        let v = Vec2::new(rng.gen_range(-200.0..200.0), rng.gen_range(-200.0..200.0));
        let r = rng.gen_range(4.0..20.0);
        let (body, collider) = world
            .create_circle(BodyDef::dynamic(p).with_velocity(v), r, true)
            .unwrap();
        handles.push((body, collider, r));
    }

    let mut checked = 0;
    for _ in 0..20 {
        let before: Vec<Aabb> = handles
            .iter()
            .map(|&(body, _, _)| world.body(body).unwrap().aabb())
            .collect();
        world.step(DT);
        for (i, &(ba, ca, ra)) in handles.iter().enumerate() {
            for (j, &(bb, cb, rb)) in handles.iter().enumerate().skip(i + 1) {
                if !swept_broadphase && !before[i].overlaps(&before[j]) {
                    continue;
                }
                let pa = world.body(ba).unwrap().position();
                let pb = world.body(bb).unwrap().position();
                // Stay clear of the epsilon boundary
                if (pa - pb).length() < ra + rb - 0.01 {
                    checked += 1;
                    assert!(
                        world.contacts().get_contact(ca, cb).is_some(),
                        "missed overlapping pair"
                    );
                }
            }
        }
    }
    assert!(checked > 0, "scenario produced no overlapping pairs");
}

#[test]
fn broadphase_finds_every_overlapping_pair_start_of_step() {
    broadphase_finds_every_overlapping_pair(false);
}

#[test]
fn broadphase_finds_every_overlapping_pair_swept() {
    broadphase_finds_every_overlapping_pair(true);
}

#[test]
fn restitution_override_scales_bounce() {
    let mut world = zero_gravity_world();
    let ball = world
        .create_body(BodyDef::dynamic(Vec2::new(100.0, 300.0)).with_velocity(Vec2::new(60.0, 0.0)))
        .unwrap();
    world
        .create_collider(ball, ColliderDef::new(Shape::circle(10.0)).with_restitution(0.5))
        .unwrap();
    world
        .create_rect(BodyDef::static_at(Vec2::new(125.0, 300.0)), Vec2::new(10.0, 100.0), false)
        .unwrap();

    let mut rec = ContactRecorder::new();
    for _ in 0..30 {
        world.step_with_listener(DT, &mut rec);
        if count(rec.events()).0 > 0 {
            break;
        }
    }
    let v = world.body(ball).unwrap().linear_velocity();
    assert!((v.x + 30.0).abs() < 1e-3, "velocity {v:?}");
}
