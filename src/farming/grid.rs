//! Grid state store — per-cell cultivation flags.
//!
//! The grid is sized once from the farm map and never resized. Cells only
//! change their flags; the flag setters refuse any transition that would
//! break `tilled ⇒ farmable`, `watered ⇒ tilled` or `planted ⇒ tilled`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Cell flags
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellFlags {
    farmable: bool,
    tilled: bool,
    watered: bool,
    planted: bool,
}

impl CellFlags {
    pub const FARMABLE: CellFlags = CellFlags {
        farmable: true,
        tilled: false,
        watered: false,
        planted: false,
    };

    pub fn is_farmable(&self) -> bool {
        self.farmable
    }

    pub fn is_tilled(&self) -> bool {
        self.tilled
    }

    pub fn is_watered(&self) -> bool {
        self.watered
    }

    pub fn is_planted(&self) -> bool {
        self.planted
    }

    /// False for flag sets that could only come from a hand-edited save.
    pub fn is_consistent(&self) -> bool {
        (!self.tilled || self.farmable)
            && (!self.watered || self.tilled)
            && (!self.planted || self.tilled)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Read-only watered capability handed to crops
// ─────────────────────────────────────────────────────────────────────────────

/// Answers "is the soil under this point wet right now?".
pub trait WateredSoil {
    fn is_watered_at(&self, point: Vec2) -> bool;
}

// ─────────────────────────────────────────────────────────────────────────────
// Grid
// ─────────────────────────────────────────────────────────────────────────────

/// Hit area of one farmable cell, in map pixels.
#[derive(Debug, Clone, Copy)]
pub struct FarmableRect {
    pub rect: Rect,
    pub pos: GridPos,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct SoilGrid {
    rows: u32,
    cols: u32,
    cells: Vec<CellFlags>,
    hit_rects: Vec<FarmableRect>,
}

impl SoilGrid {
    /// Build a grid of `rows × cols` cells where exactly the listed cells are farmable.
    pub fn from_farmable(rows: u32, cols: u32, farmable: impl IntoIterator<Item = GridPos>) -> Self {
        let mut grid = Self {
            rows,
            cols,
            cells: vec![CellFlags::default(); (rows * cols) as usize],
            hit_rects: Vec::new(),
        };
        for pos in farmable {
            let idx = grid.index(pos);
            grid.cells[idx].farmable = true;
        }
        grid.rebuild_hit_rects();
        grid
    }

    /// Rebuild a grid from stored flags. Returns `None` when the cell count
    /// does not match the dimensions or any flag set is inconsistent.
    pub fn from_cells(rows: u32, cols: u32, cells: Vec<CellFlags>) -> Option<Self> {
        if cells.len() != (rows * cols) as usize || !cells.iter().all(CellFlags::is_consistent) {
            return None;
        }
        let mut grid = Self {
            rows,
            cols,
            cells,
            hit_rects: Vec::new(),
        };
        grid.rebuild_hit_rects();
        Some(grid)
    }

    fn rebuild_hit_rects(&mut self) {
        self.hit_rects = self
            .positions()
            .filter(|&pos| self.flags(pos).farmable)
            .map(|pos| {
                let min = pos.top_left();
                FarmableRect {
                    rect: Rect::from_corners(min, min + Vec2::splat(TILE_SIZE)),
                    pos,
                }
            })
            .collect();
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn cells(&self) -> &[CellFlags] {
        &self.cells
    }

    pub fn contains(&self, pos: GridPos) -> bool {
        pos.row < self.rows && pos.col < self.cols
    }

    fn index(&self, pos: GridPos) -> usize {
        assert!(
            self.contains(pos),
            "cell ({}, {}) is outside the {}x{} soil grid",
            pos.row,
            pos.col,
            self.rows,
            self.cols
        );
        (pos.row * self.cols + pos.col) as usize
    }

    pub fn flags(&self, pos: GridPos) -> CellFlags {
        self.cells[self.index(pos)]
    }

    /// Every cell position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = GridPos> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| GridPos::new(row, col)))
    }

    pub fn farmable_rects(&self) -> &[FarmableRect] {
        &self.hit_rects
    }

    // ── Point resolution ────────────────────────────────────────────────────

    /// The cell under `point`, if the point lies on the grid at all.
    pub fn cell_at(&self, point: Vec2) -> Option<GridPos> {
        if !point.is_finite() || point.x < 0.0 || point.y < 0.0 {
            return None;
        }
        let pos = GridPos::new((point.y / TILE_SIZE) as u32, (point.x / TILE_SIZE) as u32);
        self.contains(pos).then_some(pos)
    }

    /// The farmable cell whose hit rect contains `point` (right/bottom edges excluded).
    pub fn farmable_cell_at(&self, point: Vec2) -> Option<GridPos> {
        self.hit_rects
            .iter()
            .find(|hit| {
                point.x >= hit.rect.min.x
                    && point.x < hit.rect.max.x
                    && point.y >= hit.rect.min.y
                    && point.y < hit.rect.max.y
            })
            .map(|hit| hit.pos)
    }

    // ── Queries ─────────────────────────────────────────────────────────────

    pub fn is_farmable(&self, pos: GridPos) -> bool {
        self.flags(pos).farmable
    }

    pub fn is_tilled(&self, pos: GridPos) -> bool {
        self.flags(pos).tilled
    }

    pub fn is_watered(&self, pos: GridPos) -> bool {
        self.flags(pos).watered
    }

    pub fn is_planted(&self, pos: GridPos) -> bool {
        self.flags(pos).planted
    }

    /// Neighbour lookup that treats anything off the grid as untilled.
    pub fn is_tilled_offset(&self, pos: GridPos, d_row: i64, d_col: i64) -> bool {
        let row = pos.row as i64 + d_row;
        let col = pos.col as i64 + d_col;
        if row < 0 || col < 0 || row >= self.rows as i64 || col >= self.cols as i64 {
            return false;
        }
        self.is_tilled(GridPos::new(row as u32, col as u32))
    }

    pub fn tilled_cells(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.positions().filter(|&pos| self.is_tilled(pos))
    }

    // ── Mutators ────────────────────────────────────────────────────────────
    //
    // Each returns whether the flag actually changed.

    pub fn set_tilled(&mut self, pos: GridPos) -> bool {
        let idx = self.index(pos);
        let cell = &mut self.cells[idx];
        if !cell.farmable || cell.tilled {
            return false;
        }
        cell.tilled = true;
        true
    }

    pub fn set_watered(&mut self, pos: GridPos) -> bool {
        let idx = self.index(pos);
        let cell = &mut self.cells[idx];
        if !cell.tilled || cell.watered {
            return false;
        }
        cell.watered = true;
        true
    }

    pub fn clear_watered(&mut self, pos: GridPos) -> bool {
        let idx = self.index(pos);
        std::mem::replace(&mut self.cells[idx].watered, false)
    }

    pub fn set_planted(&mut self, pos: GridPos) -> bool {
        let idx = self.index(pos);
        let cell = &mut self.cells[idx];
        if !cell.tilled || cell.planted {
            return false;
        }
        cell.planted = true;
        true
    }

    pub fn clear_planted(&mut self, pos: GridPos) -> bool {
        let idx = self.index(pos);
        std::mem::replace(&mut self.cells[idx].planted, false)
    }
}

impl WateredSoil for SoilGrid {
    fn is_watered_at(&self, point: Vec2) -> bool {
        self.cell_at(point).is_some_and(|pos| self.is_watered(pos))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn single_center() -> SoilGrid {
        SoilGrid::from_farmable(3, 3, [GridPos::new(1, 1)])
    }

    #[test]
    fn only_listed_cells_are_farmable() {
        let grid = single_center();
        assert!(grid.is_farmable(GridPos::new(1, 1)));
        assert!(!grid.is_farmable(GridPos::new(0, 0)));
        assert_eq!(grid.farmable_rects().len(), 1);
    }

    #[test]
    fn tilling_requires_farmable_and_happens_once() {
        let mut grid = single_center();
        assert!(!grid.set_tilled(GridPos::new(0, 0)), "Non-farmable cell must stay untilled");
        assert!(grid.set_tilled(GridPos::new(1, 1)));
        assert!(!grid.set_tilled(GridPos::new(1, 1)), "Second till is a no-op");
    }

    #[test]
    fn water_and_plant_need_tilled_soil() {
        let mut grid = single_center();
        let pos = GridPos::new(1, 1);
        assert!(!grid.set_watered(pos));
        assert!(!grid.set_planted(pos));
        grid.set_tilled(pos);
        assert!(grid.set_watered(pos));
        assert!(grid.set_planted(pos));
        assert!(!grid.set_planted(pos), "At most one crop per cell");
        assert!(grid.flags(pos).is_consistent());
    }

    #[test]
    fn clearing_reports_previous_value() {
        let mut grid = single_center();
        let pos = GridPos::new(1, 1);
        grid.set_tilled(pos);
        grid.set_watered(pos);
        assert!(grid.clear_watered(pos));
        assert!(!grid.clear_watered(pos));
        assert!(!grid.clear_planted(pos));
    }

    #[test]
    fn point_resolution_uses_half_open_tiles() {
        let grid = single_center();
        assert_eq!(grid.farmable_cell_at(Vec2::new(64.0, 64.0)), Some(GridPos::new(1, 1)));
        assert_eq!(grid.farmable_cell_at(Vec2::new(127.9, 127.9)), Some(GridPos::new(1, 1)));
        assert_eq!(grid.farmable_cell_at(Vec2::new(128.0, 100.0)), None);
        assert_eq!(grid.cell_at(Vec2::new(10.0, 10.0)), Some(GridPos::new(0, 0)));
        assert_eq!(grid.cell_at(Vec2::new(-1.0, 10.0)), None);
        assert_eq!(grid.cell_at(Vec2::new(10.0, 3.0 * TILE_SIZE)), None);
    }

    #[test]
    fn non_finite_points_hit_no_cell() {
        let mut grid = SoilGrid::from_farmable(3, 3, [GridPos::new(0, 0)]);
        grid.set_tilled(GridPos::new(0, 0));
        grid.set_watered(GridPos::new(0, 0));
        for point in [
            Vec2::new(f32::NAN, 10.0),
            Vec2::new(10.0, f32::NAN),
            Vec2::NAN,
            Vec2::new(f32::INFINITY, 10.0),
        ] {
            assert_eq!(grid.cell_at(point), None, "{point:?}");
            assert_eq!(grid.farmable_cell_at(point), None, "{point:?}");
            assert!(!grid.is_watered_at(point), "{point:?}");
        }
    }

    #[test]
    fn neighbours_off_the_grid_count_as_untilled() {
        let mut grid = SoilGrid::from_farmable(1, 1, [GridPos::new(0, 0)]);
        grid.set_tilled(GridPos::new(0, 0));
        assert!(grid.is_tilled_offset(GridPos::new(0, 0), 0, 0));
        assert!(!grid.is_tilled_offset(GridPos::new(0, 0), -1, 0));
        assert!(!grid.is_tilled_offset(GridPos::new(0, 0), 0, 1));
    }

    #[test]
    #[should_panic(expected = "outside the 3x3 soil grid")]
    fn out_of_bounds_lookup_panics() {
        single_center().is_tilled(GridPos::new(3, 0));
    }

    #[test]
    fn from_cells_rejects_inconsistent_flags() {
        let bad = CellFlags {
            farmable: false,
            tilled: true,
            watered: false,
            planted: false,
        };
        assert!(SoilGrid::from_cells(1, 1, vec![bad]).is_none());
        assert!(SoilGrid::from_cells(1, 2, vec![CellFlags::FARMABLE]).is_none());
        assert!(SoilGrid::from_cells(1, 1, vec![CellFlags::FARMABLE]).is_some());
    }

    #[test]
    fn watered_soil_capability_reads_through_points() {
        let mut grid = single_center();
        let pos = GridPos::new(1, 1);
        grid.set_tilled(pos);
        assert!(!grid.is_watered_at(pos.center()));
        grid.set_watered(pos);
        assert!(grid.is_watered_at(pos.center()));
        assert!(!grid.is_watered_at(Vec2::new(-5.0, -5.0)));
    }
}
