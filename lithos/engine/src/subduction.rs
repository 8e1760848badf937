//! Subduction polarity and docking direction for colliding cells.
//!
//! The plate with the greater density offset goes underneath. Every rule here
//! is a pure function of its inputs and gives the same roles whichever cell is
//! passed first; ties fall back to column density, then to plate id.

use std::cmp::Ordering;

use crate::cell::{CellRef, PlateId};

/// True when the candidate's plate strictly outweighs the other and so may
/// go underneath. Equal (or unordered) offsets never subduct.
#[inline]
pub fn can_subduct(candidate_offset: f64, other_offset: f64) -> bool {
    candidate_offset > other_offset
}

/// One side of a colliding pair as seen by the role rules.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contender {
    /// Cell address.
    pub cell: CellRef,
    /// Owning plate's density offset (kg/m³).
    pub density_offset: f64,
    /// Column density (kg/m³).
    pub column_density: f64,
}

/// `(top, bottom)` for a colliding pair.
pub fn collision_roles(a: Contender, b: Contender) -> (CellRef, CellRef) {
    if can_subduct(a.density_offset, b.density_offset) {
        return (b.cell, a.cell);
    }
    if can_subduct(b.density_offset, a.density_offset) {
        return (a.cell, b.cell);
    }
    // tie: denser column under, then higher address under
    let a_under = match a.column_density.partial_cmp(&b.column_density) {
        Some(Ordering::Greater) => true,
        Some(Ordering::Less) => false,
        _ => a.cell > b.cell,
    };
    if a_under {
        (b.cell, a.cell)
    } else {
        (a.cell, b.cell)
    }
}

/// `(subjugating, subjugated)` plates for a docking pair: the lighter plate
/// keeps its identity, ties to the lower id.
pub fn docking_roles(a: (PlateId, f64), b: (PlateId, f64)) -> (PlateId, PlateId) {
    let a_first = match a.1.partial_cmp(&b.1) {
        Some(Ordering::Less) => true,
        Some(Ordering::Greater) => false,
        _ => a.0 <= b.0,
    };
    if a_first {
        (a.0, b.0)
    } else {
        (b.0, a.0)
    }
}
