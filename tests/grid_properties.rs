//! Property-based tests for the soil grid, the autotile resolver and crop growth.
//!
//! Validates:
//! - No sequence of grid edits leaves a cell watered or planted without being tilled
//! - Only farmable cells are ever tilled
//! - The soil layout has one placement per tilled cell, each resolved from its own neighbours
//! - Crop age follows the growth rate, stops at the last stage and latches harvestable

use bevy::prelude::*;
use proptest::prelude::*;
use sproutfield::data::crops::default_crops;
use sproutfield::farming::{resolve_layout, resolve_variant, Crop, Neighbors, SoilGrid, WateredSoil};
use sproutfield::shared::*;

const ROWS: u32 = 6;
const COLS: u32 = 7;

#[derive(Debug, Clone, Copy)]
enum Edit {
    Till,
    Water,
    Plant,
    Dry,
    Uproot,
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        3 => Just(Edit::Till),
        2 => Just(Edit::Water),
        2 => Just(Edit::Plant),
        1 => Just(Edit::Dry),
        1 => Just(Edit::Uproot),
    ]
}

fn pos() -> impl Strategy<Value = GridPos> {
    (0..ROWS, 0..COLS).prop_map(|(row, col)| GridPos::new(row, col))
}

fn farmable_mask() -> impl Strategy<Value = Vec<bool>> {
    prop::collection::vec(any::<bool>(), (ROWS * COLS) as usize)
}

fn grid_from_mask(mask: &[bool]) -> SoilGrid {
    let farmable = (0..ROWS)
        .flat_map(|row| (0..COLS).map(move |col| GridPos::new(row, col)))
        .zip(mask)
        .filter(|(_, &farmable)| farmable)
        .map(|(pos, _)| pos);
    SoilGrid::from_farmable(ROWS, COLS, farmable)
}

fn apply(grid: &mut SoilGrid, edit: Edit, pos: GridPos) {
    match edit {
        Edit::Till => grid.set_tilled(pos),
        Edit::Water => grid.set_watered(pos),
        Edit::Plant => grid.set_planted(pos),
        Edit::Dry => grid.clear_watered(pos),
        Edit::Uproot => grid.clear_planted(pos),
    };
}

/// Soil that is either wet everywhere or dry everywhere.
struct Uniform(bool);

impl WateredSoil for Uniform {
    fn is_watered_at(&self, _point: Vec2) -> bool {
        self.0
    }
}

fn crop_def(kind: CropKind) -> CropDef {
    default_crops()
        .into_iter()
        .find(|def| def.kind == kind)
        .unwrap_or_else(|| panic!("no default def for {:?}", kind))
}

proptest! {
    /// Property: every cell stays consistent under arbitrary edits
    ///
    /// watered ⇒ tilled, planted ⇒ tilled, tilled ⇒ farmable.
    #[test]
    fn edits_keep_cells_consistent(
        mask in farmable_mask(),
        edits in prop::collection::vec((edit(), pos()), 0..120),
    ) {
        let mut grid = grid_from_mask(&mask);
        for (edit, pos) in edits {
            apply(&mut grid, edit, pos);
            let flags = grid.flags(pos);
            prop_assert!(flags.is_consistent(), "{:?} left {:?} inconsistent: {:?}", edit, pos, flags);
        }

        for pos in grid.positions() {
            let flags = grid.flags(pos);
            prop_assert!(flags.is_consistent(), "cell {:?} inconsistent: {:?}", pos, flags);
            prop_assert_eq!(flags.is_farmable(), mask[(pos.row * COLS + pos.col) as usize]);
        }
    }

    /// Property: a grid rebuilt from its own cells is the same grid
    #[test]
    fn cells_rebuild_the_same_grid(
        mask in farmable_mask(),
        edits in prop::collection::vec((edit(), pos()), 0..60),
    ) {
        let mut grid = grid_from_mask(&mask);
        for (edit, pos) in edits {
            apply(&mut grid, edit, pos);
        }

        let rebuilt = SoilGrid::from_cells(ROWS, COLS, grid.cells().to_vec());
        prop_assert!(rebuilt.is_some());
        let rebuilt = rebuilt.unwrap();
        prop_assert_eq!(rebuilt.cells(), grid.cells());
        prop_assert_eq!(rebuilt.farmable_rects().len(), grid.farmable_rects().len());
    }

    /// Property: one soil placement per tilled cell, each from its own neighbours
    #[test]
    fn layout_matches_tilled_cells(
        tilled in prop::collection::vec(pos(), 0..30),
    ) {
        let mut grid = grid_from_mask(&[true; (ROWS * COLS) as usize]);
        for pos in &tilled {
            grid.set_tilled(*pos);
        }

        let layout = resolve_layout(&grid);
        prop_assert_eq!(layout.len(), grid.tilled_cells().count());
        prop_assert_eq!(&layout, &resolve_layout(&grid));

        for placement in &layout {
            prop_assert!(grid.is_tilled(placement.pos));
            prop_assert_eq!(placement.variant, resolve_variant(Neighbors::of(&grid, placement.pos)));
        }
    }

    /// Property: tilling one more cell only changes the variants of it and its four neighbours
    #[test]
    fn tilling_is_local(
        tilled in prop::collection::vec(pos(), 0..30),
        extra in pos(),
    ) {
        let mut grid = grid_from_mask(&[true; (ROWS * COLS) as usize]);
        for pos in &tilled {
            grid.set_tilled(*pos);
        }
        let before = resolve_layout(&grid);
        grid.set_tilled(extra);
        let after = resolve_layout(&grid);

        for old in &before {
            let near = old.pos.row.abs_diff(extra.row) + old.pos.col.abs_diff(extra.col) <= 1;
            if near {
                continue;
            }
            let new = after.iter().find(|p| p.pos == old.pos);
            prop_assert_eq!(new.map(|p| p.variant), Some(old.variant));
        }
    }

    /// Property: k wet ticks give min(k × rate, max) and harvestable latches at max
    #[test]
    fn wet_growth_follows_rate(
        kind in prop_oneof![Just(CropKind::Corn), Just(CropKind::Tomato)],
        ticks in 0u32..12,
    ) {
        let def = crop_def(kind);
        let mut crop = Crop::new(&def, GridPos::new(1, 1));
        for _ in 0..ticks {
            crop.grow(&Uniform(true));
        }

        let max = def.max_age() as f32;
        let expected = (ticks as f32 * def.growth_rate).min(max);
        prop_assert!(
            (crop.age() - expected).abs() < 1e-4,
            "age {} after {} ticks, expected {}",
            crop.age(), ticks, expected
        );
        prop_assert_eq!(crop.is_harvestable(), crop.age() >= max);
        prop_assert!(crop.frame() <= def.max_age() as usize);
    }

    /// Property: dry soil never advances a crop
    #[test]
    fn dry_soil_never_grows(
        kind in prop_oneof![Just(CropKind::Corn), Just(CropKind::Tomato)],
        start in 0.0f32..4.0,
        ticks in 1u32..10,
    ) {
        let def = crop_def(kind);
        let mut crop = Crop::with_age(&def, GridPos::new(0, 0), start);
        let before = crop.clone();
        for _ in 0..ticks {
            prop_assert!(!crop.grow(&Uniform(false)));
        }
        prop_assert_eq!(crop, before);
    }
}
