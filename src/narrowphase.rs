use glam::Vec2;

use crate::api::NarrowphaseApi;
use crate::types::*;

/// Normal used when two centers coincide and no direction can be derived.
pub const FALLBACK_NORMAL: Vec2 = Vec2::X;

/// Narrowphase primitive tests for circle/rect pairs.
pub struct Narrowphase;

impl NarrowphaseApi for Narrowphase {
    fn overlap_circle_circle(c0: Vec2, r0: f32, c1: Vec2, r1: f32, slop: f32) -> Option<Overlap> {
        let delta = c0 - c1;
        let dist2 = delta.length_squared();
        let reach = r0 + r1 + slop;
        if dist2 > reach * reach {
            return None;
        }
        if dist2 == 0.0 {
            // Coincident centers; any direction is as good as another.
            return Some(Overlap {
                normal: FALLBACK_NORMAL,
                depth: r0 + r1,
                contact: c0,
            });
        }
        let dist = dist2.sqrt();
        let normal = delta / dist; // from B into A
        let depth = (r0 + r1 - dist).max(0.0);
        let contact = c0 - normal * r0;
        Some(Overlap {
            normal,
            depth,
            contact,
        })
    }

    fn overlap_circle_rect(c: Vec2, r: f32, box_c: Vec2, box_h: Vec2) -> Option<Overlap> {
        let min = box_c - box_h;
        let max = box_c + box_h;
        let closest = c.clamp(min, max);
        let delta = c - closest;
        let dist2 = delta.length_squared();
        if dist2 > r * r {
            return None;
        }

        if dist2 > 0.0 {
            // Center outside the box: edge or corner region.
            let dist = dist2.sqrt();
            return Some(Overlap {
                normal: delta / dist,
                depth: (r - dist).max(0.0),
                contact: closest,
            });
        }

        // Center inside the box: push out along the shallowest face.
        let d = c - box_c;
        let ox = box_h.x - d.x.abs();
        let oy = box_h.y - d.y.abs();
        let (normal, depth) = if ox <= oy {
            let nx = if d.x >= 0.0 { 1.0 } else { -1.0 };
            (Vec2::new(nx, 0.0), ox + r)
        } else {
            let ny = if d.y >= 0.0 { 1.0 } else { -1.0 };
            (Vec2::new(0.0, ny), oy + r)
        };
        Some(Overlap {
            normal,
            depth,
            contact: c,
        })
    }

    fn overlap_rect_rect(c0: Vec2, h0: Vec2, c1: Vec2, h1: Vec2) -> Option<Overlap> {
        let d = c1 - c0;
        let ox = (h0.x + h1.x) - d.x.abs();
        let oy = (h0.y + h1.y) - d.y.abs();
        if ox < 0.0 || oy < 0.0 {
            return None;
        }

        // Choose axis of minimum penetration
        let (depth, normal, axis_h) = if ox <= oy {
            let nx = if d.x >= 0.0 { -1.0 } else { 1.0 }; // from B into A
            (ox, Vec2::new(nx, 0.0), h0.x)
        } else {
            let ny = if d.y >= 0.0 { -1.0 } else { 1.0 };
            (oy, Vec2::new(0.0, ny), h0.y)
        };

        // Contact point: project A's center onto B's box then move to A's surface along normal
        let mut contact = c0.clamp(c1 - h1, c1 + h1);
        contact -= normal * axis_h;

        Some(Overlap {
            normal,
            depth,
            contact,
        })
    }

    fn overlap_shapes(a: (Shape, Vec2), b: (Shape, Vec2), slop: f32) -> Option<Overlap> {
        match (a, b) {
            ((Shape::Circle { radius: r0 }, c0), (Shape::Circle { radius: r1 }, c1)) => {
                Self::overlap_circle_circle(c0, r0, c1, r1, slop)
            }
            ((Shape::Circle { radius }, c), (rect @ Shape::Rect { .. }, box_c)) => {
                Self::overlap_circle_rect(c, radius, box_c, rect.half_extents())
            }
            ((rect @ Shape::Rect { .. }, box_c), (Shape::Circle { radius }, c)) => {
                // Swap and invert normal so it still points from B into A
                let ov = Self::overlap_circle_rect(c, radius, box_c, rect.half_extents())?;
                Some(Overlap { normal: -ov.normal, ..ov })
            }
            ((r0 @ Shape::Rect { .. }, c0), (r1 @ Shape::Rect { .. }, c1)) => {
                Self::overlap_rect_rect(c0, r0.half_extents(), c1, r1.half_extents())
            }
        }
    }
}
