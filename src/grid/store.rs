//! Cell storage and the wholesale build pass
//!
//! One growable index list per cell, laid out flat by linear cell id. Objects
//! are inserted into every cell their bounding box overlaps, so the same index
//! legitimately appears in several cells.

use glam::{IVec3, Vec3};

use super::indexer::GridIndexer;

/// Radius used for objects reporting a non-positive bounding radius
pub const MIN_BOUNDING_RADIUS: f32 = 0.5;

/// Read-only view of an object the grid can index.
///
/// The object's position in the slice handed to the builder is its stable
/// index; the grid never keeps anything else.
pub trait Bounded {
    fn position(&self) -> Vec3;
    fn bounding_radius(&self) -> f32;
    fn is_active(&self) -> bool;
}

/// Plain snapshot of an object's bounds, for callers without their own entity type
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsSnapshot {
    pub position: Vec3,
    pub radius: f32,
    pub active: bool,
}

impl BoundsSnapshot {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            radius,
            active: true,
        }
    }

    pub fn inactive(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            radius,
            active: false,
        }
    }
}

impl Bounded for BoundsSnapshot {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn bounding_radius(&self) -> f32 {
        self.radius
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Floor a bounding radius so every object covers at least its own cell
#[inline]
pub fn effective_radius(radius: f32) -> f32 {
    if radius > 0.0 { radius } else { MIN_BOUNDING_RADIUS }
}

/// Flat arena of per-cell object index lists
#[derive(Debug, Clone, PartialEq)]
pub struct CellStore {
    cells: Vec<Vec<usize>>,
}

impl CellStore {
    /// Allocate `total_cells` empty cells
    pub fn new(total_cells: usize) -> Self {
        Self {
            cells: vec![Vec::new(); total_cells],
        }
    }

    /// Empty every cell, keeping the per-cell allocations for the next build
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Indices stored in cell `id`.
    ///
    /// An out-of-range id means the caller linearized an unvalidated
    /// coordinate; that is a bug, so it asserts in debug and reads as an empty
    /// cell in release.
    #[inline]
    pub fn cell(&self, id: usize) -> &[usize] {
        debug_assert!(
            id < self.cells.len(),
            "cell id {} out of range ({} cells)",
            id,
            self.cells.len()
        );
        self.cells.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    fn push(&mut self, id: usize, object_index: usize) {
        debug_assert!(id < self.cells.len(), "cell id {} out of range", id);
        if let Some(cell) = self.cells.get_mut(id) {
            cell.push(object_index);
        }
    }

    /// Append `object_index` to every valid cell in the inclusive range
    /// `[lo, hi]`
    pub fn insert_range(&mut self, indexer: &GridIndexer, object_index: usize, lo: IVec3, hi: IVec3) {
        for iz in lo.z..=hi.z {
            for iy in lo.y..=hi.y {
                for ix in lo.x..=hi.x {
                    let cell = IVec3::new(ix, iy, iz);
                    if indexer.is_valid(cell) {
                        self.push(indexer.to_linear(cell), object_index);
                    }
                }
            }
        }
    }

    /// Total stored entries across all cells (an object spanning several
    /// cells counts once per cell)
    pub fn entry_count(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    /// Number of cells holding at least one index
    pub fn occupied_cells(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }
}

/// Insert one object with the box `position ± radius`
pub fn insert_object(
    store: &mut CellStore,
    indexer: &GridIndexer,
    object_index: usize,
    position: Vec3,
    radius: f32,
) {
    let r = Vec3::splat(effective_radius(radius));
    let (lo, hi) = indexer.cell_range(position - r, position + r);
    store.insert_range(indexer, object_index, lo, hi);
}

/// Clear `store` and repopulate it from every object active right now.
///
/// Returns the number of objects inserted. Inactive objects are left out
/// entirely; they reappear only after a later build sees them active again.
pub fn build_all<T: Bounded>(store: &mut CellStore, indexer: &GridIndexer, objects: &[T]) -> usize {
    store.clear();
    let mut inserted = 0;
    for (index, object) in objects.iter().enumerate() {
        if !object.is_active() {
            continue;
        }
        insert_object(store, indexer, index, object.position(), object.bounding_radius());
        inserted += 1;
    }
    inserted
}
