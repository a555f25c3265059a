use glam::Vec2;
use quadphys::*;

/// Prints contact notifications as they happen.
struct PrintListener;

impl ContactListener for PrintListener {
    fn begin_contact(&mut self, contact: &Contact) {
        println!(
            "Begin: {:?} vs {:?} keys=({:?},{:?}) sensor={}",
            contact.collider_a, contact.collider_b, contact.a_key, contact.b_key, contact.sensor
        );
    }

    fn end_contact(&mut self, contact: &Contact) {
        println!("End:   {:?} vs {:?}", contact.collider_a, contact.collider_b);
    }
}

fn main() -> Result<(), PhysicsError> {
    let mut world = PhysicsWorld::new(WorldConfig::new(Vec2::ZERO, Vec2::new(800.0, 600.0)));
    world.set_contact_listener(Box::new(PrintListener));

    let left = world.create_body(
        BodyDef::dynamic(Vec2::new(275.0, 300.0)).with_velocity(Vec2::new(120.0, 0.0)),
    )?;
    world.create_collider(left, ColliderDef::new(Shape::circle(100.0)).with_user_data(1))?;

    let right = world.create_body(
        BodyDef::dynamic(Vec2::new(525.0, 300.0)).with_velocity(Vec2::new(-120.0, 0.0)),
    )?;
    world.create_collider(right, ColliderDef::new(Shape::circle(100.0)).with_user_data(2))?;

    // A sensor strip the left ball will fly through after bouncing
    world.create_rect(BodyDef::static_at(Vec2::new(50.0, 300.0)), Vec2::new(20.0, 600.0), true)?;

    for frame in 0..180 {
        let report = world.step(1.0 / 60.0);
        if report.contacts_begun + report.contacts_ended > 0 {
            let l = world.body(left).map(Body::position).unwrap_or_default();
            let r = world.body(right).map(Body::position).unwrap_or_default();
            println!(
                "frame {frame}: left=({:.1},{:.1}) right=({:.1},{:.1}) active={}",
                l.x, l.y, r.x, r.y, report.active_contacts
            );
        }
    }
    Ok(())
}
