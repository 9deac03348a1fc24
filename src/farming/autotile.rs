//! Tile pattern resolver — picks the soil texture for every tilled cell from
//! which of its four cardinal neighbours are tilled too.
//!
//! The rules are evaluated in order and the last one that matches wins. Every
//! rule after `Cross` pins all four sides, so the table is also an exact
//! lookup; keep the order anyway when adding rules that leave a side free.

use serde::{Deserialize, Serialize};

use crate::shared::*;
use super::grid::SoilGrid;

// ─────────────────────────────────────────────────────────────────────────────
// Variants
// ─────────────────────────────────────────────────────────────────────────────

/// Visual shape of a tilled tile. Names describe where the tile's open
/// (untilled) borders are, matching the texture file keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SoilVariant {
    /// `o`: no tilled neighbours.
    Isolated,
    /// `x`: tilled on all four sides.
    Cross,
    /// `l`: left end of a horizontal strip.
    Left,
    /// `r`: right end of a horizontal strip.
    Right,
    /// `lr`: middle of a horizontal strip.
    Horizontal,
    /// `t`: top end of a vertical strip.
    Top,
    /// `b`: bottom end of a vertical strip.
    Bottom,
    /// `tb`: middle of a vertical strip.
    Vertical,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    /// `tbr`: vertical strip with a branch to the right.
    TeeRight,
    /// `tbl`: vertical strip with a branch to the left.
    TeeLeft,
    /// `lrt`: horizontal strip with a branch downward (top edge open).
    TeeTop,
    /// `lrb`: horizontal strip with a branch upward (bottom edge open).
    TeeBottom,
}

impl SoilVariant {
    pub const ALL: [SoilVariant; 16] = [
        SoilVariant::Isolated,
        SoilVariant::Cross,
        SoilVariant::Left,
        SoilVariant::Right,
        SoilVariant::Horizontal,
        SoilVariant::Top,
        SoilVariant::Bottom,
        SoilVariant::Vertical,
        SoilVariant::TopLeft,
        SoilVariant::TopRight,
        SoilVariant::BottomLeft,
        SoilVariant::BottomRight,
        SoilVariant::TeeRight,
        SoilVariant::TeeLeft,
        SoilVariant::TeeTop,
        SoilVariant::TeeBottom,
    ];

    /// Texture key, e.g. `soil/lr.png`.
    pub fn key(self) -> &'static str {
        match self {
            SoilVariant::Isolated => "o",
            SoilVariant::Cross => "x",
            SoilVariant::Left => "l",
            SoilVariant::Right => "r",
            SoilVariant::Horizontal => "lr",
            SoilVariant::Top => "t",
            SoilVariant::Bottom => "b",
            SoilVariant::Vertical => "tb",
            SoilVariant::TopLeft => "tl",
            SoilVariant::TopRight => "tr",
            SoilVariant::BottomLeft => "bl",
            SoilVariant::BottomRight => "br",
            SoilVariant::TeeRight => "tbr",
            SoilVariant::TeeLeft => "tbl",
            SoilVariant::TeeTop => "lrt",
            SoilVariant::TeeBottom => "lrb",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Neighbour rules
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Neighbors {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl Neighbors {
    pub const fn new(top: bool, bottom: bool, left: bool, right: bool) -> Self {
        Self { top, bottom, left, right }
    }

    pub fn of(grid: &SoilGrid, pos: GridPos) -> Self {
        Self {
            top: grid.is_tilled_offset(pos, -1, 0),
            bottom: grid.is_tilled_offset(pos, 1, 0),
            left: grid.is_tilled_offset(pos, 0, -1),
            right: grid.is_tilled_offset(pos, 0, 1),
        }
    }
}

/// A rule matches when every `required` side is tilled and no `forbidden` side is.
struct Rule {
    required: Neighbors,
    forbidden: Neighbors,
    variant: SoilVariant,
}

impl Rule {
    fn matches(&self, n: Neighbors) -> bool {
        let side = |req: bool, forb: bool, actual: bool| (!req || actual) && !(forb && actual);
        side(self.required.top, self.forbidden.top, n.top)
            && side(self.required.bottom, self.forbidden.bottom, n.bottom)
            && side(self.required.left, self.forbidden.left, n.left)
            && side(self.required.right, self.forbidden.right, n.right)
    }
}

const fn rule(
    top: Option<bool>,
    bottom: Option<bool>,
    left: Option<bool>,
    right: Option<bool>,
    variant: SoilVariant,
) -> Rule {
    const fn req(side: Option<bool>) -> bool {
        matches!(side, Some(true))
    }
    const fn forb(side: Option<bool>) -> bool {
        matches!(side, Some(false))
    }
    Rule {
        required: Neighbors::new(req(top), req(bottom), req(left), req(right)),
        forbidden: Neighbors::new(forb(top), forb(bottom), forb(left), forb(right)),
        variant,
    }
}

const Y: Option<bool> = Some(true);
const N: Option<bool> = Some(false);

//                      top bottom left right
const RULES: [Rule; 15] = [
    // all sides
    rule(Y, Y, Y, Y, SoilVariant::Cross),
    // horizontal only
    rule(N, N, Y, N, SoilVariant::Right),
    rule(N, N, N, Y, SoilVariant::Left),
    rule(N, N, Y, Y, SoilVariant::Horizontal),
    // vertical only
    rule(Y, N, N, N, SoilVariant::Bottom),
    rule(N, Y, N, N, SoilVariant::Top),
    rule(Y, Y, N, N, SoilVariant::Vertical),
    // corners
    rule(N, Y, Y, N, SoilVariant::TopRight),
    rule(Y, N, Y, N, SoilVariant::BottomRight),
    rule(N, Y, N, Y, SoilVariant::TopLeft),
    rule(Y, N, N, Y, SoilVariant::BottomLeft),
    // T shapes
    rule(Y, Y, N, Y, SoilVariant::TeeRight),
    rule(Y, Y, Y, N, SoilVariant::TeeLeft),
    rule(N, Y, Y, Y, SoilVariant::TeeTop),
    rule(Y, N, Y, Y, SoilVariant::TeeBottom),
];

/// Variant for a tilled cell with the given neighbours.
pub fn resolve_variant(neighbors: Neighbors) -> SoilVariant {
    RULES
        .iter()
        .filter(|rule| rule.matches(neighbors))
        .last()
        .map_or(SoilVariant::Isolated, |rule| rule.variant)
}

// ─────────────────────────────────────────────────────────────────────────────
// Whole-grid layout
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoilTilePlacement {
    pub pos: GridPos,
    pub variant: SoilVariant,
}

/// One placement per tilled cell, in row-major order. Pure function of the grid.
pub fn resolve_layout(grid: &SoilGrid) -> Vec<SoilTilePlacement> {
    grid.tilled_cells()
        .map(|pos| SoilTilePlacement {
            pos,
            variant: resolve_variant(Neighbors::of(grid, pos)),
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
