//! Reconciles tracked points against successive occupancy grids.
//!
//! Existing points are matched by coordinate through a hash index, so a
//! reconcile is linear in points plus occupied cells.

use std::collections::HashMap;

use super::glyph_mask::OccupancyGrid;

/// A raster cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCoordinate {
    /// Column.
    pub x: i32,
    /// Row, growing downwards.
    pub y: i32,
}

impl GridCoordinate {
    /// Creates a coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A sampled point and its fate in the latest reconcile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedPoint {
    /// Cell this point occupies.
    pub coord: GridCoordinate,
    /// The cell was already tracked before the latest reconcile.
    pub is_carried_over: bool,
    /// The cell is no longer occupied.
    pub marked_for_removal: bool,
}

impl TrackedPoint {
    /// A freshly sampled point.
    #[must_use]
    pub const fn new(coord: GridCoordinate) -> Self {
        Self {
            coord,
            is_carried_over: false,
            marked_for_removal: false,
        }
    }
}

/// Counts from one reconcile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffSummary {
    /// Points that kept their identity.
    pub carried: usize,
    /// Points created for unclaimed cells.
    pub spawned: usize,
    /// Points newly marked for removal.
    pub removed: usize,
    /// Removal-marked points whose cell came back.
    pub revived: usize,
}

/// Maintains the tracked point set across text changes.
#[derive(Debug, Default)]
pub struct PointSetDiffer {
    points: Vec<TrackedPoint>,
    index: HashMap<GridCoordinate, usize>,
}

impl PointSetDiffer {
    /// Creates an empty differ.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current points, spawn order.
    #[must_use]
    pub fn points(&self) -> &[TrackedPoint] {
        &self.points
    }

    /// Point at `coord`, if tracked.
    #[must_use]
    pub fn get(&self, coord: GridCoordinate) -> Option<&TrackedPoint> {
        self.index.get(&coord).map(|&i| &self.points[i])
    }

    /// Number of tracked points, including removal-marked ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if nothing is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Matches the tracked points against `grid`.
    ///
    /// Occupied cells keep their point, vacated cells are marked for
    /// removal, and unclaimed occupied cells become new points in row-major
    /// order. Reconciling the same grid twice spawns and removes nothing.
    pub fn reconcile(&mut self, grid: &OccupancyGrid) -> DiffSummary {
        let mut summary = DiffSummary::default();

        for point in &mut self.points {
            if grid.is_occupied(point.coord.x, point.coord.y) {
                if point.marked_for_removal {
                    point.marked_for_removal = false;
                    summary.revived += 1;
                }
                point.is_carried_over = true;
                summary.carried += 1;
            } else {
                point.is_carried_over = false;
                if !point.marked_for_removal {
                    point.marked_for_removal = true;
                    summary.removed += 1;
                }
            }
        }

        for (x, y) in grid.iter_occupied() {
            let coord = GridCoordinate::new(x, y);
            if self.index.contains_key(&coord) {
                continue;
            }
            self.index.insert(coord, self.points.len());
            self.points.push(TrackedPoint::new(coord));
            summary.spawned += 1;
        }

        tracing::debug!(
            carried = summary.carried,
            spawned = summary.spawned,
            removed = summary.removed,
            revived = summary.revived,
            "Reconciled point set"
        );
        summary
    }

    /// Marks every point for removal. Returns how many were newly marked.
    pub fn mark_all_for_removal(&mut self) -> usize {
        let mut marked = 0;
        for point in &mut self.points {
            point.is_carried_over = false;
            if !point.marked_for_removal {
                point.marked_for_removal = true;
                marked += 1;
            }
        }
        marked
    }

    /// Drops removal-marked points at `coords` once their particles are gone.
    ///
    /// Points that were revived in the meantime stay.
    pub fn forget(&mut self, coords: &[GridCoordinate]) -> usize {
        if coords.is_empty() {
            return 0;
        }
        let before = self.points.len();
        let doomed: std::collections::HashSet<GridCoordinate> = coords.iter().copied().collect();
        self.points
            .retain(|p| !(p.marked_for_removal && doomed.contains(&p.coord)));
        self.rebuild_index();
        before - self.points.len()
    }

    /// Drops everything.
    pub fn clear(&mut self) {
        self.points.clear();
        self.index.clear();
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (i, point) in self.points.iter().enumerate() {
            self.index.insert(point.coord, i);
        }
    }
}
