//! Uniform grid spatial index
//!
//! Broad phase for the asteroid field. The grid is built wholesale from a
//! snapshot of object bounds and then read many times per frame:
//! - `query`: candidates near a point (player body collision)
//! - `query_ray`: candidates along a ray (click-to-target)
//!
//! The grid never tracks staleness. When objects move or change activity,
//! the owner must call [`UniformGrid::build_all`] again before relying on
//! query results, and must re-validate every returned index either way.

pub mod indexer;
pub mod query;
pub mod store;

pub use indexer::{DEFAULT_CELL_SIZE, GridIndexer, MAX_DIM_PER_AXIS, MAX_TOTAL_CELLS};
pub use query::{CellVisit, RayCells};
pub use store::{Bounded, BoundsSnapshot, CellStore, MIN_BOUNDING_RADIUS, effective_radius};

use glam::{IVec3, Vec3};

/// Uniform grid over a fixed world-space box, mapping cells to object indices
#[derive(Debug, Clone)]
pub struct UniformGrid {
    indexer: GridIndexer,
    store: CellStore,
}

impl UniformGrid {
    /// Create an empty grid covering `[min, max]` with the given cell size.
    ///
    /// Non-positive cell size components fall back to 1.0.
    pub fn new(min: Vec3, max: Vec3, cell_size: Vec3) -> Self {
        let indexer = GridIndexer::new(min, max, cell_size);
        let store = CellStore::new(indexer.total_cells());
        let dims = indexer.dims();
        log::info!(
            "Uniform grid initialized: dims ({}, {}, {}), {} cells",
            dims.x,
            dims.y,
            dims.z,
            indexer.total_cells()
        );
        Self { indexer, store }
    }

    #[inline]
    pub fn indexer(&self) -> &GridIndexer {
        &self.indexer
    }

    #[inline]
    pub fn store(&self) -> &CellStore {
        &self.store
    }

    #[inline]
    pub fn dims(&self) -> IVec3 {
        self.indexer.dims()
    }

    #[inline]
    pub fn total_cells(&self) -> usize {
        self.indexer.total_cells()
    }

    #[inline]
    pub fn cell_of(&self, position: Vec3) -> IVec3 {
        self.indexer.cell_of(position)
    }

    /// Remove every stored index
    pub fn clear(&mut self) {
        self.store.clear();
    }

    /// Insert one object into every cell its box `position ± radius` overlaps
    pub fn insert(&mut self, object_index: usize, position: Vec3, radius: f32) {
        store::insert_object(&mut self.store, &self.indexer, object_index, position, radius);
    }

    /// Full rebuild from `objects`; only objects active now are indexed.
    ///
    /// Returns the number of objects inserted.
    pub fn build_all<T: Bounded>(&mut self, objects: &[T]) -> usize {
        let inserted = store::build_all(&mut self.store, &self.indexer, objects);
        log::info!(
            "Uniform grid built: {} of {} objects, {} entries in {} occupied cells",
            inserted,
            objects.len(),
            self.store.entry_count(),
            self.store.occupied_cells()
        );
        inserted
    }
}
