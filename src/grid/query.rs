//! Neighborhood and ray queries over a built grid
//!
//! Both queries return broad-phase candidates only: a sorted, deduplicated
//! list of object indices. Callers re-check every candidate with an exact
//! test against the current object state.

use glam::{IVec3, Vec3};

use super::UniformGrid;
use super::indexer::GridIndexer;

/// Squared direction length below which a ray query falls back to a
/// neighborhood query at the origin
pub const DEGENERATE_DIRECTION_SQ: f32 = 1.0e-4;

/// Direction components at or below this never advance the traversal
pub const AXIS_EPSILON: f32 = 1.0e-4;

/// One cell entered by a ray traversal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellVisit {
    pub cell: IVec3,
    /// Ray distance at which the cell was entered (0 for the start cell)
    pub t: f32,
}

/// Incremental 3D voxel traversal (Amanatides & Woo).
///
/// Yields the start cell, then every cell the ray enters in order, until the
/// entry distance exceeds `max_distance` or the ray leaves the grid. When the
/// ray crosses two or three boundaries at the same distance, it steps x
/// before y before z.
#[derive(Debug, Clone)]
pub struct RayCells<'a> {
    indexer: &'a GridIndexer,
    cell: IVec3,
    step: IVec3,
    t_max: Vec3,
    t_delta: Vec3,
    max_distance: f32,
    started: bool,
    done: bool,
}

impl<'a> RayCells<'a> {
    /// `direction` must already be normalized, so distances are world units
    fn new(indexer: &'a GridIndexer, origin: Vec3, direction: Vec3, max_distance: f32) -> Self {
        let cell = indexer.cell_of(origin);
        let cell_size = indexer.cell_size();
        let corner = indexer.cell_min_corner(cell);

        let mut step = IVec3::ONE;
        let mut t_max = Vec3::INFINITY;
        let mut t_delta = Vec3::INFINITY;

        for axis in 0..3 {
            let d = direction[axis];
            if d < 0.0 {
                step[axis] = -1;
            }
            if d.abs() > AXIS_EPSILON {
                let boundary = if step[axis] > 0 {
                    corner[axis] + cell_size[axis]
                } else {
                    corner[axis]
                };
                t_max[axis] = (boundary - origin[axis]) / d;
                t_delta[axis] = (cell_size[axis] / d).abs();
            }
        }

        Self {
            indexer,
            cell,
            step,
            t_max,
            t_delta,
            max_distance,
            started: false,
            done: false,
        }
    }

    /// Axis with the smallest `t_max`; ties go to x, then y
    #[inline]
    fn next_axis(&self) -> usize {
        let t = self.t_max;
        if t.x <= t.y && t.x <= t.z {
            0
        } else if t.y <= t.z {
            1
        } else {
            2
        }
    }
}

impl Iterator for RayCells<'_> {
    type Item = CellVisit;

    fn next(&mut self) -> Option<CellVisit> {
        if self.done {
            return None;
        }

        if !self.started {
            self.started = true;
            if self.indexer.is_valid(self.cell) {
                return Some(CellVisit {
                    cell: self.cell,
                    t: 0.0,
                });
            }
            self.done = true;
            return None;
        }

        let axis = self.next_axis();
        let t = self.t_max[axis];
        if !t.is_finite() {
            // Only reachable if every axis is locked, which the degeneracy check rules out
            self.done = true;
            return None;
        }
        self.t_max[axis] += self.t_delta[axis];
        self.cell[axis] += self.step[axis];

        if t > self.max_distance || !self.indexer.is_valid(self.cell) {
            self.done = true;
            return None;
        }

        Some(CellVisit { cell: self.cell, t })
    }
}

impl UniformGrid {
    /// Candidates in the 3x3x3 block of cells around the cell of `position`
    pub fn query(&self, position: Vec3) -> Vec<usize> {
        let mut out = Vec::new();
        self.query_into(position, &mut out);
        out
    }

    /// Like [`query`](Self::query), reusing `out`'s allocation
    pub fn query_into(&self, position: Vec3, out: &mut Vec<usize>) {
        out.clear();
        let center = self.indexer.cell_of(position);
        for dz in -1..=1 {
            for dy in -1..=1 {
                for dx in -1..=1 {
                    let cell = center + IVec3::new(dx, dy, dz);
                    if self.indexer.is_valid(cell) {
                        out.extend_from_slice(self.store.cell(self.indexer.to_linear(cell)));
                    }
                }
            }
        }
        dedup(out);
    }

    /// Cells a ray passes through, in traversal order.
    ///
    /// Returns `None` for a near-zero `direction`.
    pub fn ray_cells(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayCells<'_>> {
        if direction.length_squared() < DEGENERATE_DIRECTION_SQ {
            return None;
        }
        Some(RayCells::new(
            &self.indexer,
            origin,
            direction.normalize(),
            max_distance,
        ))
    }

    /// Candidates stored in every cell the ray touches within `max_distance`.
    ///
    /// `direction` need not be normalized; `max_distance` is in world units.
    /// The direction is normalized first, so `max_distance` is never scaled by
    /// `|direction|`: a half-length direction still reaches `max_distance`
    /// world units, not half of it.
    /// A near-zero direction degrades to [`query`](Self::query) at `origin`.
    pub fn query_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Vec<usize> {
        let mut out = Vec::new();
        self.query_ray_into(origin, direction, max_distance, &mut out);
        out
    }

    /// Like [`query_ray`](Self::query_ray), reusing `out`'s allocation
    pub fn query_ray_into(&self, origin: Vec3, direction: Vec3, max_distance: f32, out: &mut Vec<usize>) {
        let Some(cells) = self.ray_cells(origin, direction, max_distance) else {
            self.query_into(origin, out);
            return;
        };

        out.clear();
        for visit in cells {
            out.extend_from_slice(self.store.cell(self.indexer.to_linear(visit.cell)));
        }
        dedup(out);
    }
}

#[inline]
fn dedup(indices: &mut Vec<usize>) {
    indices.sort_unstable();
    indices.dedup();
}
