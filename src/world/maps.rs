//! Farm map layout.
//!
//! The farm is a grid of characters, one per 64×64 cell: `F` marks ground the
//! hoe can break, anything else is scenery. Rows may be ragged; short rows are
//! padded with scenery.

use bevy::prelude::*;

use crate::farming::SoilGrid;
use crate::shared::*;

pub const FARMABLE: char = 'F';

/// The farm around the house. Twenty cells wide, twelve tall.
pub const FARM_LAYOUT: &str = "\
....................
....................
..FFFFFFFF..........
..FFFFFFFF....FFFF..
..FFFFFFFF....FFFF..
..FFFFFFFF....FFFF..
..............FFFF..
.....FFFFFF.........
.....FFFFFF.........
.....FFFFFF.........
....................
....................";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapDef {
    pub rows: u32,
    pub cols: u32,
    pub farmable: Vec<GridPos>,
}

impl MapDef {
    /// Parse a character layout. Blank lines at either end are ignored.
    pub fn parse(layout: &str) -> Self {
        let lines: Vec<&str> = layout
            .lines()
            .skip_while(|line| line.trim().is_empty())
            .collect();
        let lines = match lines.iter().rposition(|line| !line.trim().is_empty()) {
            Some(last) => &lines[..=last],
            None => &[][..],
        };

        let rows = lines.len() as u32;
        let cols = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0) as u32;
        let farmable = lines
            .iter()
            .enumerate()
            .flat_map(|(row, line)| {
                line.chars()
                    .enumerate()
                    .filter(|&(_, ch)| ch == FARMABLE)
                    .map(move |(col, _)| GridPos::new(row as u32, col as u32))
            })
            .collect();

        Self { rows, cols, farmable }
    }

    pub fn farm() -> Self {
        Self::parse(FARM_LAYOUT)
    }

    pub fn soil_grid(&self) -> SoilGrid {
        SoilGrid::from_farmable(self.rows, self.cols, self.farmable.iter().copied())
    }

    /// Size of the map in map pixels.
    pub fn pixel_size(&self) -> Vec2 {
        Vec2::new(self.cols as f32 * TILE_SIZE, self.rows as f32 * TILE_SIZE)
    }
}
