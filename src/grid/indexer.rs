//! Grid geometry and cell coordinate math
//!
//! Maps world positions to integer cell coordinates and cell coordinates to
//! linear ids in the flat cell arena. Holds no state beyond the geometry.

use glam::{IVec3, Vec3};

/// Fallback cell size for any axis given a non-positive (or NaN) size
pub const DEFAULT_CELL_SIZE: f32 = 1.0;

/// Upper bound on cells along one axis; finer requests widen the cell size
pub const MAX_DIM_PER_AXIS: i32 = 512;

/// Upper bound on the whole arena (128^3)
pub const MAX_TOTAL_CELLS: usize = 1 << 21;

/// Immutable geometry of a uniform grid
#[derive(Debug, Clone, PartialEq)]
pub struct GridIndexer {
    min: Vec3,
    max: Vec3,
    cell_size: Vec3,
    dims: IVec3,
    total_cells: usize,
}

impl GridIndexer {
    /// Create grid geometry covering `[min, max]`.
    ///
    /// Never fails: each cell size component `<= 0` becomes
    /// [`DEFAULT_CELL_SIZE`], and each dimension is at least one cell, so an
    /// empty or inverted box still yields a 1x1x1 grid. An axis with a
    /// non-finite extent collapses to a single cell. Cell sizes are widened
    /// as needed to stay within [`MAX_DIM_PER_AXIS`] and [`MAX_TOTAL_CELLS`].
    pub fn new(min: Vec3, max: Vec3, cell_size: Vec3) -> Self {
        let mut cell_size = Vec3::new(
            positive_or_default(cell_size.x),
            positive_or_default(cell_size.y),
            positive_or_default(cell_size.z),
        );

        if !(max - min).is_finite() {
            log::warn!("Grid bounds {} .. {} are not finite, collapsing those axes", min, max);
        }
        let (min_x, extent_x) = axis_span(min.x, max.x);
        let (min_y, extent_y) = axis_span(min.y, max.y);
        let (min_z, extent_z) = axis_span(min.z, max.z);
        let min = Vec3::new(min_x, min_y, min_z);
        let extent = Vec3::new(extent_x, extent_y, extent_z);

        let mut dims = IVec3::ONE;
        for axis in 0..3 {
            let wanted = cell_count(extent[axis], cell_size[axis]);
            if wanted > MAX_DIM_PER_AXIS as f32 {
                log::warn!(
                    "Grid axis {} wants {} cells, capping at {}",
                    axis,
                    wanted,
                    MAX_DIM_PER_AXIS
                );
                dims[axis] = MAX_DIM_PER_AXIS;
                cell_size[axis] = extent[axis] / MAX_DIM_PER_AXIS as f32;
            } else {
                dims[axis] = wanted as i32;
            }
        }

        let mut total_cells = cell_product(dims);
        if total_cells > MAX_TOTAL_CELLS {
            log::warn!(
                "Grid wants {} cells, coarsening to at most {}",
                total_cells,
                MAX_TOTAL_CELLS
            );
            while total_cells > MAX_TOTAL_CELLS {
                let axis = widest_axis(dims);
                dims[axis] = (dims[axis] + 1) / 2;
                cell_size[axis] = extent[axis] / dims[axis] as f32;
                total_cells = cell_product(dims);
            }
        }

        Self {
            min,
            max: min + extent,
            cell_size,
            dims,
            total_cells,
        }
    }

    #[inline]
    pub fn min_bounds(&self) -> Vec3 {
        self.min
    }

    #[inline]
    pub fn max_bounds(&self) -> Vec3 {
        self.max
    }

    /// Cell size after clamping
    #[inline]
    pub fn cell_size(&self) -> Vec3 {
        self.cell_size
    }

    /// Number of cells along each axis `(nx, ny, nz)`
    #[inline]
    pub fn dims(&self) -> IVec3 {
        self.dims
    }

    #[inline]
    pub fn total_cells(&self) -> usize {
        self.total_cells
    }

    /// Cell containing `position`, clamped to the nearest boundary cell when
    /// the position lies outside the grid.
    pub fn cell_of(&self, position: Vec3) -> IVec3 {
        let relative = (position - self.min) / self.cell_size;
        // `as` saturates and maps NaN to 0, so the clamp always sees a finite value
        let raw = IVec3::new(
            relative.x.floor() as i32,
            relative.y.floor() as i32,
            relative.z.floor() as i32,
        );
        raw.clamp(IVec3::ZERO, self.dims - IVec3::ONE)
    }

    /// Whether `cell` lies inside `[0, dims)` on every axis
    #[inline]
    pub fn is_valid(&self, cell: IVec3) -> bool {
        cell.cmpge(IVec3::ZERO).all() && cell.cmplt(self.dims).all()
    }

    /// Linear id `ix + iy*nx + iz*nx*ny`.
    ///
    /// Only meaningful for cells that passed [`is_valid`](Self::is_valid) or
    /// came out of [`cell_of`](Self::cell_of).
    #[inline]
    pub fn to_linear(&self, cell: IVec3) -> usize {
        let nx = self.dims.x as usize;
        let ny = self.dims.y as usize;
        cell.x as usize + cell.y as usize * nx + cell.z as usize * nx * ny
    }

    /// World-space lower corner of a cell
    #[inline]
    pub fn cell_min_corner(&self, cell: IVec3) -> Vec3 {
        self.min + cell.as_vec3() * self.cell_size
    }

    /// Inclusive cell range covered by the box `[lo, hi]`, clamped into the grid
    pub fn cell_range(&self, lo: Vec3, hi: Vec3) -> (IVec3, IVec3) {
        (self.cell_of(lo), self.cell_of(hi))
    }
}

#[inline]
fn positive_or_default(size: f32) -> f32 {
    if size > 0.0 { size } else { DEFAULT_CELL_SIZE }
}

/// Lower corner and extent of one axis; a non-finite span becomes empty
fn axis_span(min: f32, max: f32) -> (f32, f32) {
    let extent = max - min;
    if extent.is_finite() {
        (min, extent)
    } else if min.is_finite() {
        (min, 0.0)
    } else {
        (0.0, 0.0)
    }
}

/// Cells needed along one axis, at least one; may exceed `i32` range
#[inline]
fn cell_count(extent: f32, cell_size: f32) -> f32 {
    // f32::max discards NaN, so a NaN ratio lands on one cell
    (extent / cell_size).ceil().max(1.0)
}

#[inline]
fn cell_product(dims: IVec3) -> usize {
    (dims.x as usize)
        .saturating_mul(dims.y as usize)
        .saturating_mul(dims.z as usize)
}

fn widest_axis(dims: IVec3) -> usize {
    if dims.x >= dims.y && dims.x >= dims.z {
        0
    } else if dims.y >= dims.z {
        1
    } else {
        2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_grid() -> GridIndexer {
        GridIndexer::new(Vec3::splat(-50.0), Vec3::splat(50.0), Vec3::splat(10.0))
    }

    #[test]
    fn test_dimensions_from_extent() {
        let grid = scenario_grid();
        assert_eq!(grid.dims(), IVec3::new(10, 10, 10));
        assert_eq!(grid.total_cells(), 1000);
    }

    #[test]
    fn test_partial_cells_round_up() {
        let grid = GridIndexer::new(Vec3::ZERO, Vec3::new(25.0, 10.0, 1.0), Vec3::splat(10.0));
        assert_eq!(grid.dims(), IVec3::new(3, 1, 1));
        assert_eq!(grid.total_cells(), 3);
    }

    #[test]
    fn test_non_positive_cell_size_becomes_one() {
        let grid = GridIndexer::new(Vec3::ZERO, Vec3::splat(4.0), Vec3::new(0.0, -3.0, 2.0));
        assert_eq!(grid.cell_size(), Vec3::new(1.0, 1.0, 2.0));
        assert_eq!(grid.dims(), IVec3::new(4, 4, 2));
    }

    #[test]
    fn test_degenerate_bounds_yield_single_cell() {
        let grid = GridIndexer::new(Vec3::splat(5.0), Vec3::splat(-5.0), Vec3::splat(1.0));
        assert_eq!(grid.dims(), IVec3::ONE);
        assert_eq!(grid.total_cells(), 1);
        assert_eq!(grid.cell_of(Vec3::new(100.0, -100.0, 0.0)), IVec3::ZERO);
    }

    #[test]
    fn test_cell_of_inside() {
        let grid = scenario_grid();
        assert_eq!(grid.cell_of(Vec3::new(5.0, 5.0, 5.0)), IVec3::new(5, 5, 5));
        assert_eq!(grid.cell_of(Vec3::new(-50.0, -45.0, 49.9)), IVec3::new(0, 0, 9));
        assert_eq!(grid.cell_of(Vec3::new(-0.1, 0.0, 0.1)), IVec3::new(4, 5, 5));
    }

    #[test]
    fn test_cell_of_clamps_outside() {
        let grid = scenario_grid();
        assert_eq!(grid.cell_of(Vec3::new(-60.0, 5.0, 5.0)), IVec3::new(0, 5, 5));
        assert_eq!(grid.cell_of(Vec3::splat(1.0e9)), IVec3::splat(9));
        assert_eq!(grid.cell_of(Vec3::splat(f32::NEG_INFINITY)), IVec3::ZERO);
        // Max corner itself belongs to the last cell
        assert_eq!(grid.cell_of(Vec3::splat(50.0)), IVec3::splat(9));
    }

    #[test]
    fn test_cell_of_nan_stays_valid() {
        let grid = scenario_grid();
        let cell = grid.cell_of(Vec3::new(f32::NAN, 0.0, f32::NAN));
        assert!(grid.is_valid(cell));
    }

    #[test]
    fn test_is_valid() {
        let grid = scenario_grid();
        assert!(grid.is_valid(IVec3::ZERO));
        assert!(grid.is_valid(IVec3::splat(9)));
        assert!(!grid.is_valid(IVec3::new(-1, 0, 0)));
        assert!(!grid.is_valid(IVec3::new(0, 10, 0)));
        assert!(!grid.is_valid(IVec3::new(0, 0, 10)));
    }

    #[test]
    fn test_linearization_is_bijective() {
        let grid = GridIndexer::new(Vec3::ZERO, Vec3::new(4.0, 3.0, 2.0), Vec3::ONE);
        let mut seen = vec![false; grid.total_cells()];
        for z in 0..2 {
            for y in 0..3 {
                for x in 0..4 {
                    let id = grid.to_linear(IVec3::new(x, y, z));
                    assert!(id < grid.total_cells());
                    assert!(!seen[id], "id {} produced twice", id);
                    seen[id] = true;
                }
            }
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(grid.to_linear(IVec3::new(1, 2, 1)), 1 + 2 * 4 + 4 * 3);
    }

    #[test]
    fn test_cell_min_corner() {
        let grid = scenario_grid();
        assert_eq!(grid.cell_min_corner(IVec3::new(5, 0, 9)), Vec3::new(0.0, -50.0, 40.0));
    }

    #[test]
    fn test_infinite_bounds_collapse_to_one_cell() {
        let grid = GridIndexer::new(
            Vec3::splat(f32::NEG_INFINITY),
            Vec3::splat(f32::INFINITY),
            Vec3::splat(10.0),
        );
        assert_eq!(grid.dims(), IVec3::ONE);
        assert_eq!(grid.total_cells(), 1);
        assert!(grid.min_bounds().is_finite());
        assert_eq!(grid.cell_of(Vec3::new(1.0e30, -7.0, f32::NAN)), IVec3::ZERO);
    }

    #[test]
    fn test_overflowing_extent_collapses_axis() {
        let grid = GridIndexer::new(
            Vec3::new(-3.0e38, -5.0, f32::NAN),
            Vec3::new(3.0e38, 5.0, 5.0),
            Vec3::splat(1.0),
        );
        assert_eq!(grid.dims(), IVec3::new(1, 10, 1));
        assert_eq!(grid.total_cells(), 10);
    }

    #[test]
    fn test_tiny_cell_size_is_capped() {
        let grid = GridIndexer::new(Vec3::splat(-144.5), Vec3::splat(144.5), Vec3::splat(0.001));
        let dims = grid.dims();
        assert!(dims.max_element() <= MAX_DIM_PER_AXIS);
        assert!(grid.total_cells() <= MAX_TOTAL_CELLS);
        assert_eq!(
            grid.total_cells(),
            dims.x as usize * dims.y as usize * dims.z as usize
        );
        // Widened cells still cover the whole box
        let covered = grid.cell_size() * dims.as_vec3();
        assert!(covered.cmpge(Vec3::splat(289.0 - 1.0e-2)).all());
        assert_eq!(grid.cell_of(Vec3::splat(144.5)), dims - IVec3::ONE);
        assert_eq!(grid.cell_of(Vec3::splat(-144.5)), IVec3::ZERO);
    }

    #[test]
    fn test_single_axis_cap_widens_cell() {
        let grid = GridIndexer::new(Vec3::ZERO, Vec3::new(10_000.0, 1.0, 1.0), Vec3::ONE);
        assert_eq!(grid.dims(), IVec3::new(MAX_DIM_PER_AXIS, 1, 1));
        assert!((grid.cell_size().x - 10_000.0 / MAX_DIM_PER_AXIS as f32).abs() < 1e-3);
        assert_eq!(grid.cell_of(Vec3::new(9_999.0, 0.5, 0.5)).x, MAX_DIM_PER_AXIS - 1);
    }
}
