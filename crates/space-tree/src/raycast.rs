//! Exact ray/tree intersection.
//!
//! A cast walks the tree looking for the nearest plane the ray crosses next,
//! refines the crossing parameter against that plane alone, then checks
//! whether the whole tree's classification changed there. Crossings that do
//! not change the classification (a bounding wall, an internal cut between
//! two leaves of equal value) advance the ray origin and the walk repeats.
//!
//! Degenerate rays are handled inline: a ray parallel to a plane never
//! crosses it, and a ray starting exactly on a plane crosses it only if a far
//! point along the ray lies on the other side.

use crate::error::CastResult;
use crate::split::side_of;
use crate::{BoundedSolidTree, CastError, ChangePoint, Ray, Side, SpaceNode, SpaceTree, Split};

/// Distance of the probe point used when the ray starts on a plane.
pub const PROBE_DISTANCE: f64 = 1e8;

/// Smallest upper bound for crossing refinement.
pub const MIN_REFINE_SPAN: f64 = 1e-4;

/// Bisection steps used to refine a crossing.
pub const REFINE_ITERATIONS: usize = 32;

/// Leaf values that describe solid versus empty space.
///
/// Used to orient reported normals away from the solid.
pub trait Occupancy {
    fn is_occupied(&self) -> bool;
}

impl Occupancy for bool {
    #[inline]
    fn is_occupied(&self) -> bool {
        *self
    }
}

/// Result of [`SpaceTree::cast_ray_changes`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastOutcome {
    /// First classification change, if any.
    pub hit: Option<ChangePoint>,
    /// Plane crossings visited, including the one producing the hit.
    pub changes: usize,
}

/// A plane the ray crosses next.
#[derive(Debug)]
struct Crossing<'a> {
    split: &'a Split,
    /// Estimated crossing parameter, before refinement.
    t: f64,
    /// Parameter known to lie past the plane.
    t_max: f64,
    /// Side of the plane the ray origin is on.
    leaving: Side,
}

/// Finds the nearest plane crossing below `node`.
///
/// Only the child containing the origin is searched: anything in the other
/// child lies past this node's own plane.
fn next_crossing<'a, T>(node: &'a SpaceNode<T>, ray: &Ray) -> Option<Crossing<'a>> {
    let SpaceNode::Branch { split, left, right } = node else {
        return None;
    };
    let dot = split.dot(&ray.origin);
    let side = side_of(dot, split.threshold());
    let child = match side {
        Side::Left => left,
        Side::Right => right,
    };
    if split.is_parallel(&ray.direction) {
        return next_crossing(child, ray);
    }

    let (t, t_max, crosses) = if dot == split.threshold() {
        (0.0, PROBE_DISTANCE, split.side(&ray.at(PROBE_DISTANCE)) != side)
    } else {
        let t = (split.threshold() - dot) / split.axis().dot(&ray.direction);
        (t, (2.0 * t).max(MIN_REFINE_SPAN), t > 0.0)
    };

    let nested = next_crossing(child, ray);
    if !crosses {
        return nested;
    }
    match nested {
        Some(inner) if inner.t < t => Some(inner),
        _ => Some(Crossing {
            split,
            t,
            t_max,
            leaving: side,
        }),
    }
}

/// Refines a crossing to a parameter strictly past the plane.
///
/// The upper bound starts at `max(2t, MIN_REFINE_SPAN)` and doubles up to
/// the crossing's `t_max` until it lies past the plane, then the interval is
/// bisected.
fn refine(crossing: &Crossing<'_>, ray: &Ray) -> CastResult<f64> {
    let flipped = |t: f64| crossing.split.side(&ray.at(t)) != crossing.leaving;

    if crossing.t > 0.0 && flipped(crossing.t) {
        return Ok(crossing.t);
    }

    let mut lo = crossing.t;
    let mut hi = (2.0 * crossing.t).max(MIN_REFINE_SPAN).min(crossing.t_max);
    while !flipped(hi) {
        if hi >= crossing.t_max {
            return Err(CastError::MissingCrossing {
                t_min: crossing.t,
                t_max: crossing.t_max,
            });
        }
        lo = hi;
        hi = (2.0 * hi).min(crossing.t_max);
    }
    for _ in 0..REFINE_ITERATIONS {
        let mid = (lo + hi) / 2.0;
        if flipped(mid) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    Ok(hi)
}

/// Iterator over every classification change along a ray.
///
/// Created by [`SpaceTree::ray_changes`]. Each item carries the distance
/// from the original ray origin. The first error ends the iteration.
#[derive(Debug)]
pub struct RayChanges<'a, T> {
    tree: &'a SpaceTree<T>,
    ray: Ray,
    value: &'a T,
    travelled: f64,
    changes: usize,
    done: bool,
}

impl<T> RayChanges<'_, T> {
    /// Plane crossings visited so far.
    #[inline]
    pub fn changes(&self) -> usize {
        self.changes
    }
}

impl<T: Occupancy + PartialEq> Iterator for RayChanges<'_, T> {
    type Item = CastResult<ChangePoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let tree = self.tree;
        loop {
            let Some(crossing) = next_crossing(tree.root(), &self.ray) else {
                self.done = true;
                return None;
            };
            let t = match refine(&crossing, &self.ray) {
                Ok(t) => t,
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            };

            self.changes += 1;
            self.travelled += t;
            let point = self.ray.at(t);
            self.ray = self.ray.with_origin(point);

            let value = tree.predict(&point);
            if value != self.value {
                self.value = value;
                let normal = crossing.split.normal_toward(crossing.leaving);
                let normal = if value.is_occupied() { normal } else { -normal };
                return Some(Ok(ChangePoint {
                    point,
                    normal,
                    t: self.travelled,
                }));
            }
        }
    }
}

impl<T: Occupancy + PartialEq> SpaceTree<T> {
    /// Iterates over every classification change along `ray`.
    pub fn ray_changes(&self, ray: &Ray) -> RayChanges<'_, T> {
        RayChanges {
            tree: self,
            ray: *ray,
            value: self.predict(&ray.origin),
            travelled: 0.0,
            changes: 0,
            done: false,
        }
    }

    /// Finds the first point along `ray` whose classification differs from
    /// the ray origin's.
    ///
    /// `Ok(None)` is a miss. An error means the tree geometry broke the
    /// engine's assumptions and no trustworthy answer exists.
    pub fn cast_ray(&self, ray: &Ray) -> CastResult<Option<ChangePoint>> {
        self.ray_changes(ray).next().transpose()
    }

    /// Like [`cast_ray`](Self::cast_ray), also counting the plane crossings
    /// visited on the way.
    pub fn cast_ray_changes(&self, ray: &Ray) -> CastResult<CastOutcome> {
        let mut changes = self.ray_changes(ray);
        let hit = changes.next().transpose()?;
        Ok(CastOutcome {
            hit,
            changes: changes.changes(),
        })
    }
}

impl BoundedSolidTree {
    /// See [`SpaceTree::ray_changes`].
    pub fn ray_changes(&self, ray: &Ray) -> RayChanges<'_, bool> {
        self.tree().ray_changes(ray)
    }

    /// See [`SpaceTree::cast_ray`].
    pub fn cast_ray(&self, ray: &Ray) -> CastResult<Option<ChangePoint>> {
        self.tree().cast_ray(ray)
    }

    /// See [`SpaceTree::cast_ray_changes`].
    pub fn cast_ray_changes(&self, ray: &Ray) -> CastResult<CastOutcome> {
        self.tree().cast_ray_changes(ray)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    fn cube(half: f64, inner: SpaceTree<bool>) -> BoundedSolidTree {
        BoundedSolidTree::new(
            Point3::new(-half, -half, -half),
            Point3::new(half, half, half),
            inner,
        )
    }

    fn unit_cube() -> BoundedSolidTree {
        cube(1.0, SpaceTree::leaf(true))
    }

    fn ray(origin: [f64; 3], direction: [f64; 3]) -> Ray {
        Ray::new(Point3::from(origin), Vector3::from(direction))
    }

    #[test]
    fn box_entry_and_exit() {
        let bounded = unit_cube();
        let r = ray([0.0, 0.0, 5.0], [0.0, 0.0, -1.0]);

        let hit = bounded.cast_ray(&r).unwrap().unwrap();
        assert_relative_eq!(hit.t, 4.0, epsilon = 1e-6);
        assert_relative_eq!(hit.point, Point3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
        assert_relative_eq!(hit.normal, Vector3::z(), epsilon = 1e-12);

        let hits: Vec<ChangePoint> = bounded
            .ray_changes(&r)
            .collect::<CastResult<_>>()
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_relative_eq!(hits[1].t, 6.0, epsilon = 1e-6);
        assert_relative_eq!(hits[1].point, Point3::new(0.0, 0.0, -1.0), epsilon = 1e-6);
        assert_relative_eq!(hits[1].normal, -Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn recast_from_hit_point() {
        let bounded = unit_cube();
        let first = bounded
            .cast_ray(&ray([0.0, 0.0, 5.0], [0.0, 0.0, -1.0]))
            .unwrap()
            .unwrap();
        let next = bounded
            .cast_ray(&Ray::new(first.point, -Vector3::z()))
            .unwrap()
            .unwrap();
        assert_relative_eq!(next.t, 2.0, epsilon = 1e-6);
        assert_relative_eq!(first.t + next.t, 6.0, epsilon = 1e-6);
        assert_relative_eq!(next.normal, -Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn misses() {
        let bounded = unit_cube();
        // Parallel to every z plane, outside the box.
        assert_eq!(bounded.cast_ray(&ray([0.0, 0.0, 5.0], [1.0, 0.0, 0.0])), Ok(None));
        // Heading away.
        assert_eq!(bounded.cast_ray(&ray([5.0, 5.0, 5.0], [1.0, 1.0, 1.0])), Ok(None));
        // Passing beside the box.
        let outcome = bounded
            .cast_ray_changes(&ray([0.0, 3.0, 5.0], [0.0, 0.0, -1.0]))
            .unwrap();
        assert_eq!(outcome.hit, None);
        assert_eq!(outcome.changes, 2);
    }

    #[test]
    fn parallel_ray_on_a_plane() {
        let bounded = unit_cube();
        assert_eq!(bounded.cast_ray(&ray([0.0, 0.0, 1.0], [1.0, 0.0, 0.0])), Ok(None));
    }

    #[test]
    fn origin_on_face_moving_inward_is_detected() {
        let bounded = unit_cube();
        // On the max-z plane, which counts as outside.
        let r = ray([0.0, 0.0, 1.0], [0.0, 0.0, -1.0]);
        assert!(!bounded.predict(&r.origin));
        let hit = bounded.cast_ray(&r).unwrap().unwrap();
        assert!(hit.t > 0.0 && hit.t < 1e-6, "t = {}", hit.t);
        assert_relative_eq!(hit.normal, Vector3::z(), epsilon = 1e-12);
        assert!(bounded.predict(&hit.point));
    }

    #[test]
    fn origin_on_min_face_finds_far_exit() {
        let bounded = unit_cube();
        // On the min-z plane, which counts as inside.
        let r = ray([0.0, 0.0, -1.0], [0.0, 0.0, 1.0]);
        assert!(bounded.predict(&r.origin));
        let hit = bounded.cast_ray(&r).unwrap().unwrap();
        assert_relative_eq!(hit.t, 2.0, epsilon = 1e-6);
        assert_relative_eq!(hit.normal, Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn zero_thickness_box_is_invisible() {
        let flat = BoundedSolidTree::new(
            Point3::new(-1.0, -1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            SpaceTree::leaf(true),
        );
        let outcome = flat
            .cast_ray_changes(&ray([0.0, 0.0, 5.0], [0.0, 0.0, -1.0]))
            .unwrap();
        assert_eq!(outcome.hit, None);
        assert_eq!(outcome.changes, 1);
    }

    #[test]
    fn change_count_is_nested_planes_plus_one() {
        // Solid only for x < 0, behind two planes that separate equal values.
        let inner = SpaceTree::branch(
            Split::new(Vector3::x(), 0.5),
            SpaceTree::branch(
                Split::new(Vector3::x(), 0.0),
                SpaceTree::leaf(true),
                SpaceTree::leaf(false),
            ),
            SpaceTree::leaf(false),
        );
        let bounded = cube(2.0, inner);
        let outcome = bounded
            .cast_ray_changes(&ray([5.0, 0.0, 0.0], [-1.0, 0.0, 0.0]))
            .unwrap();
        let hit = outcome.hit.unwrap();
        assert_eq!(outcome.changes, 3);
        assert_relative_eq!(hit.t, 5.0, epsilon = 1e-6);
        assert_relative_eq!(hit.normal, Vector3::x(), epsilon = 1e-12);
    }

    #[test]
    fn oblique_plane() {
        // Solid where x + y >= 1.
        let tree = SpaceTree::branch(
            Split::new(Vector3::new(1.0, 1.0, 0.0), 1.0),
            SpaceTree::leaf(false),
            SpaceTree::leaf(true),
        );
        let hit = tree
            .cast_ray(&ray([0.0, 0.0, 0.0], [1.0, 0.0, 0.0]))
            .unwrap()
            .unwrap();
        assert_relative_eq!(hit.t, 1.0, epsilon = 1e-6);
        let expected = -Vector3::new(1.0, 1.0, 0.0).normalize();
        assert_relative_eq!(hit.normal, expected, epsilon = 1e-12);
    }

    #[test]
    fn unnormalized_direction_scales_t() {
        let bounded = unit_cube();
        let hit = bounded
            .cast_ray(&ray([0.0, 0.0, 5.0], [0.0, 0.0, -2.0]))
            .unwrap()
            .unwrap();
        assert_relative_eq!(hit.t, 2.0, epsilon = 1e-6);
        assert_relative_eq!(hit.point, Point3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn missing_crossing_is_an_error() {
        let split = Split::new(Vector3::z(), 1.0);
        let r = ray([0.0, 0.0, 5.0], [0.0, 0.0, -1.0]);
        // The plane is actually four units away, not half a unit.
        let wrong = Crossing {
            split: &split,
            t: 0.5,
            t_max: 1.0,
            leaving: Side::Right,
        };
        assert_eq!(
            refine(&wrong, &r),
            Err(CastError::MissingCrossing {
                t_min: 0.5,
                t_max: 1.0
            })
        );
    }

    #[test]
    fn refine_lands_past_the_plane() {
        let split = Split::new(Vector3::z(), 1.0);
        let r = ray([0.0, 0.0, 1.0], [0.0, 0.0, -1.0]);
        let on_plane = Crossing {
            split: &split,
            t: 0.0,
            t_max: PROBE_DISTANCE,
            leaving: Side::Right,
        };
        let t = refine(&on_plane, &r).unwrap();
        assert!(t > 0.0 && t <= MIN_REFINE_SPAN);
        assert_eq!(split.side(&r.at(t)), Side::Left);
    }

    #[test]
    fn origin_on_face_with_tiny_direction() {
        let bounded = unit_cube();
        let r = ray([0.0, 0.0, 1.0], [0.0, 0.0, -1e-13]);
        let hit = bounded.cast_ray(&r).unwrap().unwrap();
        assert!(hit.t > 0.0 && hit.t < 1.0, "t = {}", hit.t);
        assert_relative_eq!(hit.normal, Vector3::z(), epsilon = 1e-12);
        assert!(bounded.predict(&hit.point));
    }

    #[test]
    fn origin_on_face_of_huge_box() {
        let bounded = cube(1e13, SpaceTree::leaf(true));
        let r = ray([0.0, 0.0, 1e13], [0.0, 0.0, -1.0]);
        assert!(!bounded.predict(&r.origin));
        let hit = bounded.cast_ray(&r).unwrap().unwrap();
        assert!(hit.t > 0.0 && hit.t < 1.0, "t = {}", hit.t);
        assert_relative_eq!(hit.normal, Vector3::z(), epsilon = 1e-12);
        assert!(bounded.predict(&hit.point));
    }

    #[test]
    fn far_hit_stays_close_to_the_face() {
        let bounded = cube(1e13, SpaceTree::leaf(true));
        let hit = bounded
            .cast_ray(&ray([0.0, 0.0, 2e13], [0.0, 0.0, -1.0]))
            .unwrap()
            .unwrap();
        let depth = 1e13 - hit.point.z;
        assert!(depth > 0.0 && depth < 5e3, "depth = {depth}");
        assert!(bounded.predict(&hit.point));
    }

    #[test]
    fn exact_crossing_is_kept() {
        // Rounding puts `at(0.9)` just below the plane already.
        let split = Split::new(Vector3::z(), 0.1);
        let r = ray([0.0, 0.0, 1.0], [0.0, 0.0, -1.0]);
        let crossing = Crossing {
            split: &split,
            t: 0.9,
            t_max: 1.8,
            leaving: Side::Right,
        };
        let t = refine(&crossing, &r).unwrap();
        assert_eq!(split.side(&r.at(t)), Side::Left);
        assert!(t >= 0.9 && t < 0.9 + 1e-8);
    }
}
