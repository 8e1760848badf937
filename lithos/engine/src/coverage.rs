//! Which plate cells sit over each world grid id.
//!
//! Every occupied local cell registers at the grid id under it
//! (`Plate::global_id_of`), so each column is seen exactly once no matter how
//! far its plate has rotated. The footprint adds the cells reached through the
//! inverse map (`Plate::local_id_of`), which closes the holes the many-to-one
//! forward lookup leaves behind.

use smallvec::SmallVec;

use crate::cell::CellRef;
use crate::grid::SphereGrid;
use crate::plate::Plate;

/// Cells per grid id, each list sorted by [`CellRef`].
pub type Coverage = Vec<SmallVec<[CellRef; 4]>>;

/// Forward registration of every occupied cell, written into `out`.
pub fn register_into(out: &mut Coverage, plates: &[Plate], grid: &SphereGrid) {
    out.clear();
    out.resize(grid.cells, SmallVec::new());
    // plates are sorted by id and cells by local id, so each list stays sorted
    for plate in plates {
        for (cell, _) in plate.occupied() {
            let Some(g) = plate.global_id_of(cell.id()) else {
                continue;
            };
            if let Some(slot) = out.get_mut(g as usize) {
                slot.push(cell.cell_ref());
            }
        }
    }
}

/// Forward registration only: one entry per occupied cell.
pub fn registrations(plates: &[Plate], grid: &SphereGrid) -> Coverage {
    let mut out = Vec::new();
    register_into(&mut out, plates, grid);
    out
}

/// Registrations plus the occupied cells each plate shows through its inverse map.
pub fn footprint(plates: &[Plate], grid: &SphereGrid) -> Coverage {
    let mut out = registrations(plates, grid);
    for plate in plates {
        for (g, slot) in out.iter_mut().enumerate() {
            let Some(cell) = plate.covering(g as u32) else {
                continue;
            };
            let r = cell.cell_ref();
            if let Err(pos) = slot.binary_search(&r) {
                slot.insert(pos, r);
            }
        }
    }
    out
}
