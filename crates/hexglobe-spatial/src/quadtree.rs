//! Quadtree storing keyed circles.

use std::hash::Hash;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

/// Leaf capacity before a subdivision is attempted.
pub const DEFAULT_MAX_OBJECTS: usize = 5;

/// Depth at which leaves stop subdividing and simply grow.
pub const DEFAULT_MAX_DEPTH: u32 = 8;

/// A circle on the collision plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

impl Circle {
    pub fn new(x: f64, y: f64, radius: f64) -> Self {
        Self { x, y, radius }
    }

    /// Two circles collide when their centres are closer than the sum of radii.
    #[must_use]
    pub fn collides(&self, other: &Circle) -> bool {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let reach = self.radius + other.radius;
        dx * dx + dy * dy < reach * reach
    }

    fn bounding_rect(&self) -> Rect {
        Rect {
            x: self.x - self.radius,
            y: self.y - self.radius,
            width: 2.0 * self.radius,
            height: 2.0 * self.radius,
        }
    }
}

/// Axis-aligned rectangle, `(x, y)` being the minimum corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// The full collision plane: 180 units of latitude by 360 of longitude.
    pub fn lat_lon_plane() -> Self {
        Self::new(0.0, 0.0, 180.0, 360.0)
    }

    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.x + other.width
            && other.x <= self.x + self.width
            && self.y <= other.y + other.height
            && other.y <= self.y + self.height
    }

    /// This rectangle squeezed into `bounds`. A rectangle lying outside
    /// collapses onto the nearest edge, so overlapping rectangles stay
    /// overlapping.
    fn clamped_to(&self, bounds: &Rect) -> Rect {
        let (min_x, max_x) = (bounds.x, bounds.x + bounds.width);
        let (min_y, max_y) = (bounds.y, bounds.y + bounds.height);
        let x0 = self.x.clamp(min_x, max_x);
        let y0 = self.y.clamp(min_y, max_y);
        let x1 = (self.x + self.width).clamp(min_x, max_x);
        let y1 = (self.y + self.height).clamp(min_y, max_y);
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Children ordered `[min-min, max-min, min-max, max-max]`.
    fn quadrants(&self) -> [Rect; 4] {
        let hw = self.width * 0.5;
        let hh = self.height * 0.5;
        [
            Rect::new(self.x, self.y, hw, hh),
            Rect::new(self.x + hw, self.y, hw, hh),
            Rect::new(self.x, self.y + hh, hw, hh),
            Rect::new(self.x + hw, self.y + hh, hw, hh),
        ]
    }
}

#[derive(Debug, Clone)]
enum Node<K> {
    Leaf { bounds: Rect, items: Vec<K> },
    Branch { bounds: Rect, children: Box<[Node<K>; 4]> },
}

struct Limits {
    max_objects: usize,
    max_depth: u32,
}

impl<K: Copy + Eq + Hash> Node<K> {
    fn leaf(bounds: Rect) -> Self {
        Node::Leaf { bounds, items: Vec::new() }
    }

    fn bounds(&self) -> Rect {
        match self {
            Node::Leaf { bounds, .. } | Node::Branch { bounds, .. } => *bounds,
        }
    }

    fn insert(&mut self, key: K, area: &Rect, entries: &FxHashMap<K, Circle>, depth: u32, limits: &Limits) {
        match self {
            Node::Leaf { bounds, items } => {
                items.push(key);
                if items.len() > limits.max_objects && depth < limits.max_depth {
                    let bounds = *bounds;
                    trace!(depth, items = items.len(), "Subdividing quadtree leaf");
                    let items = std::mem::take(items);
                    let mut children = Box::new(bounds.quadrants().map(Node::leaf));
                    for item in items {
                        if let Some(circle) = entries.get(&item) {
                            let area = circle.bounding_rect().clamped_to(&bounds);
                            Self::insert_into_children(&mut children, item, &area, entries, depth, limits);
                        }
                    }
                    *self = Node::Branch { bounds, children };
                }
            }
            Node::Branch { children, .. } => {
                Self::insert_into_children(children, key, area, entries, depth, limits);
            }
        }
    }

    fn insert_into_children(
        children: &mut [Node<K>; 4],
        key: K,
        area: &Rect,
        entries: &FxHashMap<K, Circle>,
        depth: u32,
        limits: &Limits,
    ) {
        for child in children.iter_mut() {
            if child.bounds().intersects(area) {
                child.insert(key, area, entries, depth + 1, limits);
            }
        }
    }

    fn remove(&mut self, key: &K) {
        match self {
            Node::Leaf { items, .. } => items.retain(|k| k != key),
            Node::Branch { children, .. } => {
                for child in children.iter_mut() {
                    child.remove(key);
                }
            }
        }
    }

    fn collect(&self, area: &Rect, out: &mut Vec<K>, seen: &mut FxHashSet<K>) {
        match self {
            Node::Leaf { items, .. } => {
                for key in items {
                    if seen.insert(*key) {
                        out.push(*key);
                    }
                }
            }
            Node::Branch { children, .. } => {
                for child in children.iter() {
                    if child.bounds().intersects(area) {
                        child.collect(area, out, seen);
                    }
                }
            }
        }
    }

    fn depth(&self) -> u32 {
        match self {
            Node::Leaf { .. } => 0,
            Node::Branch { children, .. } => 1 + children.iter().map(Node::depth).max().unwrap_or(0),
        }
    }
}

/// Quadtree of keyed circles.
///
/// Keys identify entries for removal; each key holds at most one circle and
/// re-inserting a key replaces its circle. A circle is stored in every leaf
/// its bounding box touches. Leaves split once they exceed the object limit
/// and never merge back.
#[derive(Debug, Clone)]
pub struct Quadtree<K> {
    root: Node<K>,
    entries: FxHashMap<K, Circle>,
    max_objects: usize,
    max_depth: u32,
}

impl<K: Copy + Eq + Hash> Quadtree<K> {
    pub fn new(bounds: Rect) -> Self {
        Self::with_limits(bounds, DEFAULT_MAX_OBJECTS, DEFAULT_MAX_DEPTH)
    }

    pub fn with_limits(bounds: Rect, max_objects: usize, max_depth: u32) -> Self {
        Self {
            root: Node::leaf(bounds),
            entries: FxHashMap::default(),
            max_objects: max_objects.max(1),
            max_depth,
        }
    }

    /// Tree spanning the whole lat/lon collision plane.
    pub fn lat_lon() -> Self {
        Self::new(Rect::lat_lon_plane())
    }

    pub fn bounds(&self) -> Rect {
        self.root.bounds()
    }

    /// Search box of `circle`, kept on the plane so circles that stray
    /// outside it still land in the leaves nearest to them.
    fn area_of(&self, circle: &Circle) -> Rect {
        circle.bounding_rect().clamped_to(&self.root.bounds())
    }

    pub fn insert(&mut self, key: K, circle: Circle) {
        if self.entries.contains_key(&key) {
            self.remove(&key);
        }
        self.entries.insert(key, circle);
        let limits = Limits {
            max_objects: self.max_objects,
            max_depth: self.max_depth,
        };
        let area = self.area_of(&circle);
        self.root.insert(key, &area, &self.entries, 0, &limits);
    }

    /// Remove `key`, returning its circle if it was present.
    pub fn remove(&mut self, key: &K) -> Option<Circle> {
        let Some(circle) = self.entries.remove(key) else {
            trace!("Quadtree removal found no entry");
            return None;
        };
        self.root.remove(key);
        Some(circle)
    }

    #[must_use]
    pub fn get(&self, key: &K) -> Option<Circle> {
        self.entries.get(key).copied()
    }

    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current subdivision depth of the deepest branch.
    pub fn depth(&self) -> u32 {
        self.root.depth()
    }

    pub fn clear(&mut self) {
        self.root = Node::leaf(self.root.bounds());
        self.entries.clear();
    }

    /// Every stored entry whose circle collides with `circle`.
    #[must_use]
    pub fn query(&self, circle: &Circle) -> Vec<K> {
        let mut candidates = Vec::new();
        let mut seen = FxHashSet::default();
        self.root.collect(&self.area_of(circle), &mut candidates, &mut seen);
        candidates.retain(|k| self.entries.get(k).is_some_and(|c| c.collides(circle)));
        candidates
    }

    /// Entries colliding with the stored entry `key`, excluding `key` itself.
    /// Empty if `key` is not stored.
    #[must_use]
    pub fn query_colliding(&self, key: &K) -> Vec<K> {
        let Some(circle) = self.entries.get(key) else {
            return Vec::new();
        };
        let mut hits = self.query(circle);
        hits.retain(|k| k != key);
        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_uses_sum_of_radii() {
        let a = Circle::new(0.0, 0.0, 2.0);
        assert!(a.collides(&Circle::new(3.9, 0.0, 2.0)));
        assert!(!a.collides(&Circle::new(4.0, 0.0, 2.0)));
    }

    #[test]
    fn test_query_finds_overlaps_and_excludes_self() {
        let mut tree = Quadtree::lat_lon();
        tree.insert(1u32, Circle::new(100.0, 190.0, 3.0));
        tree.insert(2, Circle::new(102.0, 191.0, 3.0));
        tree.insert(3, Circle::new(20.0, 20.0, 3.0));

        assert_eq!(tree.query_colliding(&1), vec![2]);
        assert_eq!(tree.query_colliding(&3), Vec::<u32>::new());
    }

    #[test]
    fn test_insert_then_remove_leaves_no_collision() {
        let mut tree = Quadtree::lat_lon();
        tree.insert(7u32, Circle::new(100.0, 190.0, 5.0));
        assert_eq!(tree.remove(&7), Some(Circle::new(100.0, 190.0, 5.0)));
        assert!(tree.query(&Circle::new(100.0, 190.0, 5.0)).is_empty());
        assert!(tree.is_empty());
        assert_eq!(tree.remove(&7), None);
    }

    #[test]
    fn test_subdivides_past_object_limit() {
        let mut tree = Quadtree::lat_lon();
        for i in 0..40u32 {
            let x = (i % 8) as f64 * 20.0 + 5.0;
            let y = (i / 8) as f64 * 60.0 + 5.0;
            tree.insert(i, Circle::new(x, y, 1.0));
        }
        assert!(tree.depth() >= 1);
        assert_eq!(tree.len(), 40);
        for i in 0..40u32 {
            let c = tree.get(&i).unwrap();
            assert_eq!(tree.query(&c), vec![i], "entry {i}");
        }
    }

    #[test]
    fn test_straddling_circle_is_found_from_every_side() {
        let mut tree = Quadtree::with_limits(Rect::lat_lon_plane(), 1, 4);
        tree.insert(0u32, Circle::new(10.0, 10.0, 1.0));
        tree.insert(1, Circle::new(170.0, 350.0, 1.0));
        // Centre of the plane, overlapping all four quadrants.
        tree.insert(2, Circle::new(90.0, 180.0, 10.0));
        assert!(tree.query(&Circle::new(85.0, 175.0, 1.0)).contains(&2));
        assert!(tree.query(&Circle::new(95.0, 185.0, 1.0)).contains(&2));
        tree.remove(&2);
        assert!(tree.query(&Circle::new(95.0, 185.0, 1.0)).is_empty());
    }

    #[test]
    fn test_reinsert_replaces_previous_circle() {
        let mut tree = Quadtree::lat_lon();
        tree.insert(1u32, Circle::new(10.0, 10.0, 1.0));
        tree.insert(1, Circle::new(150.0, 300.0, 1.0));
        assert_eq!(tree.len(), 1);
        assert!(tree.query(&Circle::new(10.0, 10.0, 1.0)).is_empty());
        assert_eq!(tree.query(&Circle::new(150.0, 300.0, 1.0)), vec![1]);
    }

    #[test]
    fn test_out_of_plane_circles_are_still_stored() {
        let mut tree = Quadtree::with_limits(Rect::lat_lon_plane(), 1, 3);
        tree.insert(1u32, Circle::new(10.0, 10.0, 1.0));
        tree.insert(2, Circle::new(-50.0, -50.0, 1.0));
        tree.insert(3, Circle::new(-50.5, -50.0, 1.0));
        assert_eq!(tree.query_colliding(&2), vec![3]);
    }

    #[test]
    fn test_out_of_plane_circles_meet_across_a_midline() {
        let mut tree = Quadtree::with_limits(Rect::lat_lon_plane(), 1, 4);
        tree.insert(1u32, Circle::new(10.0, 10.0, 1.0));
        tree.insert(2, Circle::new(170.0, 350.0, 1.0));
        assert!(tree.depth() >= 1);
        // Either side of y = 180, both well off the plane.
        tree.insert(3, Circle::new(-50.0, 179.0, 2.0));
        tree.insert(4, Circle::new(-50.0, 182.0, 2.0));
        assert_eq!(tree.query_colliding(&3), vec![4]);
        assert_eq!(tree.query_colliding(&4), vec![3]);

        tree.remove(&4);
        assert!(tree.query_colliding(&3).is_empty());
    }

    #[test]
    fn test_far_apart_out_of_plane_circles_do_not_collide() {
        let mut tree = Quadtree::lat_lon();
        tree.insert(1u32, Circle::new(-50.0, 10.0, 2.0));
        tree.insert(2, Circle::new(-80.0, 10.0, 2.0));
        // Both collapse onto the same edge, but the exact check still applies.
        assert!(tree.query_colliding(&1).is_empty());
    }
}
