//! Region quadtree over AABBs, rebuilt from scratch every step.
//!
//! Items are stored at the shallowest node whose quadrant fully contains
//! them. Anything straddling a node's center lines stays at that node, so a
//! query must look at every ancestor on its way down as well as at every child
//! it can reach.

use glam::Vec2;
use tracing::trace;

use crate::types::{Aabb, QuadTreeConfig};

const CHILD_COUNT: usize = 4;

#[derive(Clone, Debug)]
pub struct QuadTree<T> {
    level: u32,
    bounds: Aabb,
    config: QuadTreeConfig,
    objects: Vec<(T, Aabb)>,
    // 0 bottom-left, 1 bottom-right, 2 top-left, 3 top-right
    nodes: Option<Box<[QuadTree<T>; CHILD_COUNT]>>,
}

impl<T: Copy> QuadTree<T> {
    pub fn new(bounds: Aabb, config: QuadTreeConfig) -> Self {
        Self::with_level(0, bounds, config)
    }

    fn with_level(level: u32, bounds: Aabb, config: QuadTreeConfig) -> Self {
        Self {
            level,
            bounds,
            config,
            objects: Vec::new(),
            nodes: None,
        }
    }

    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_split(&self) -> bool {
        self.nodes.is_some()
    }

    /// Children in quadrant order, if this node has been split.
    pub fn children(&self) -> Option<&[QuadTree<T>; CHILD_COUNT]> {
        self.nodes.as_deref()
    }

    /// Items stored directly at this node.
    pub fn objects(&self) -> impl Iterator<Item = &T> + '_ {
        self.objects.iter().map(|(item, _)| item)
    }

    /// Drop every stored item and every child node.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.nodes = None;
    }

    /// Total number of items in this subtree.
    pub fn len(&self) -> usize {
        let below = self
            .nodes
            .as_ref()
            .map_or(0, |nodes| nodes.iter().map(QuadTree::len).sum());
        self.objects.len() + below
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of levels in this subtree (1 for a lone leaf).
    pub fn depth(&self) -> u32 {
        1 + self
            .nodes
            .as_ref()
            .map_or(0, |nodes| nodes.iter().map(QuadTree::depth).max().unwrap_or(0))
    }

    /// Bounds of this node and all its descendants, depth first.
    pub fn node_bounds(&self) -> Vec<Aabb> {
        let mut out = Vec::new();
        self.collect_bounds(&mut out);
        out
    }

    fn collect_bounds(&self, out: &mut Vec<Aabb>) {
        out.push(self.bounds);
        if let Some(nodes) = &self.nodes {
            for node in nodes.iter() {
                node.collect_bounds(out);
            }
        }
    }

    fn split(&mut self) {
        let min = self.bounds.bottom_left;
        let max = self.bounds.top_right;
        let mid = self.bounds.center();
        let level = self.level + 1;
        let config = self.config;
        let child = |lo: Vec2, hi: Vec2| QuadTree::with_level(level, Aabb::new(lo, hi), config);
        trace!(level = self.level, objects = self.objects.len(), "splitting quadtree node");
        self.nodes = Some(Box::new([
            child(min, mid),
            child(Vec2::new(mid.x, min.y), Vec2::new(max.x, mid.y)),
            child(Vec2::new(min.x, mid.y), Vec2::new(mid.x, max.y)),
            child(mid, max),
        ]));
    }

    /// Which child quadrant fully contains `aabb`, if any. Boxes touching a
    /// center line count as straddling.
    fn index_of(&self, aabb: &Aabb) -> Option<usize> {
        let center = self.bounds.center();
        let on_left = aabb.top_right.x < center.x;
        let on_right = aabb.bottom_left.x > center.x;

        if aabb.top_right.y < center.y {
            if on_left {
                return Some(0);
            }
            if on_right {
                return Some(1);
            }
        } else if aabb.bottom_left.y > center.y {
            if on_left {
                return Some(2);
            }
            if on_right {
                return Some(3);
            }
        }
        None
    }

    pub fn insert(&mut self, item: T, aabb: Aabb) {
        if self.nodes.is_some() {
            if let Some(index) = self.index_of(&aabb) {
                if let Some(nodes) = self.nodes.as_mut() {
                    nodes[index].insert(item, aabb);
                }
                return;
            }
        }

        self.objects.push((item, aabb));

        if self.objects.len() > self.config.max_objects && self.level < self.config.max_levels {
            if self.nodes.is_none() {
                self.split();
            }
            self.push_down();
        }
    }

    /// Move every stored item that fits a single child into it. Child inserts
    /// run their own split check, so overflowing children keep subdividing.
    fn push_down(&mut self) {
        let Some(mut nodes) = self.nodes.take() else {
            return;
        };
        let mut i = 0;
        while i < self.objects.len() {
            let (item, aabb) = self.objects[i];
            match self.index_of(&aabb) {
                Some(index) => {
                    nodes[index].insert(item, aabb);
                    self.objects.swap_remove(i);
                }
                None => i += 1,
            }
        }
        self.nodes = Some(nodes);
    }

    /// Append every item that may overlap `aabb`: everything stored on the
    /// path from this node down to the query's quadrant, plus every child
    /// subtree the query reaches into when it straddles a center line.
    /// Each stored item is appended at most once.
    pub fn retrieve(&self, aabb: &Aabb, out: &mut Vec<T>) {
        out.extend(self.objects.iter().map(|(item, _)| *item));

        let Some(nodes) = &self.nodes else {
            return;
        };
        let center = self.bounds.center();
        let left = aabb.bottom_left.x < center.x;
        let right = aabb.top_right.x > center.x;
        let bottom = aabb.bottom_left.y < center.y;
        let top = aabb.top_right.y > center.y;

        if left && bottom {
            nodes[0].retrieve(aabb, out);
        }
        if right && bottom {
            nodes[1].retrieve(aabb, out);
        }
        if left && top {
            nodes[2].retrieve(aabb, out);
        }
        if right && top {
            nodes[3].retrieve(aabb, out);
        }
    }
}
