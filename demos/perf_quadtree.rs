use glam::Vec2;
use quadphys::*;

fn lcg(seed: &mut u32) -> u32 {
    *seed = seed.wrapping_mul(1664525).wrapping_add(1013904223);
    *seed
}

fn unit(seed: &mut u32) -> f32 {
    lcg(seed) as f32 / u32::MAX as f32
}

fn main() -> Result<(), PhysicsError> {
    let mut world = PhysicsWorld::new(WorldConfig {
        enable_timing: true,
        ..WorldConfig::new(Vec2::ZERO, Vec2::new(800.0, 600.0))
    });

    let n = 2_000usize;
    let mut seed = 1u32;
    for i in 0..n {
        let p = Vec2::new(unit(&mut seed) * 800.0, unit(&mut seed) * 600.0);
        let v = Vec2::new(unit(&mut seed) * 200.0 - 100.0, unit(&mut seed) * 200.0 - 100.0);
        let def = BodyDef::dynamic(p).with_velocity(v);
        if i % 2 == 0 {
            world.create_circle(def, 3.0, true)?;
        } else {
            world.create_rect(def, Vec2::splat(5.0), true)?;
        }
    }

    let mut recorder = ContactRecorder::new();
    for frame in 0..10 {
        let report = world.step_with_listener(1.0 / 60.0, &mut recorder);
        let events = recorder.drain().len();
        if let Some(t) = report.timing {
            println!(
                "frame {} N={} step={:.3}ms (integrate={:.3}ms broad={:.3}ms narrow={:.3}ms) candidates={} tested={} events={} nodes={} depth={}",
                frame,
                report.bodies,
                t.step_ms,
                t.integrate_ms,
                t.broadphase_ms,
                t.narrowphase_ms,
                report.candidate_pairs,
                report.tested_pairs,
                events,
                world.quadtree_bounds().len(),
                world.quadtree().depth()
            );
        }
    }
    Ok(())
}
