//! Rift gap filling (deterministic).
//!
//! Plates drifting apart leave world grid ids covered by no plate. Each such id
//! that borders covered ground gets fresh crust on the plate that covers most
//! of its neighbors. One ring is filled per call, decided from a snapshot of
//! coverage taken before any fill. Coverage is the plates' footprint, so the
//! spot under a column that only the forward map reaches is never refilled.

use std::collections::BTreeMap;

use tracing::debug;

use crate::cell::PlateId;
use crate::coverage::footprint;
use crate::grid::SphereGrid;
use crate::plate::{plate_index, Plate};
use crate::rock_column::RockColumn;

/// Stats summary for logs.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
pub struct RiftingStats {
    /// Uncovered grid ids before filling.
    pub gaps: usize,
    /// Cells filled with new crust.
    pub cells_created: usize,
}

/// For each world grid id, whether some plate covers it with an occupied cell.
pub fn coverage_mask(plates: &[Plate], grid: &SphereGrid) -> Vec<bool> {
    footprint(plates, grid).iter().map(|cells| !cells.is_empty()).collect()
}

/// Fill uncovered ids next to covered ones with `template`.
pub fn fill_rifts(plates: &mut [Plate], grid: &SphereGrid, template: &RockColumn) -> RiftingStats {
    let cover = footprint(plates, grid);
    let covered: Vec<bool> = cover.iter().map(|cells| !cells.is_empty()).collect();
    let mut stats = RiftingStats { gaps: covered.iter().filter(|c| !**c).count(), cells_created: 0 };
    if stats.gaps == 0 || plates.is_empty() {
        return stats;
    }

    // decide: (plate, local cell) per gap
    let mut fills: Vec<(PlateId, u32)> = Vec::new();
    for g in 0..grid.cells {
        if covered[g] {
            continue;
        }
        let mut votes: BTreeMap<PlateId, usize> = BTreeMap::new();
        for &n in &grid.n1[g] {
            // one vote per plate per neighbor; lists are sorted so repeats are adjacent
            let mut last = None;
            for r in &cover[n as usize] {
                if last != Some(r.plate) {
                    *votes.entry(r.plate).or_default() += 1;
                    last = Some(r.plate);
                }
            }
        }
        let mut ranked: Vec<(PlateId, usize)> = votes.into_iter().collect();
        // most neighbors first, ties to the lower id
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        let chosen = ranked.into_iter().find_map(|(pid, _)| {
            let plate = &plates[plate_index(plates, pid)?];
            let local = plate.local_id_of(g as u32)?;
            let free = plate.cell(local).is_some_and(|c| !c.is_occupied());
            free.then_some((pid, local))
        });
        if let Some(f) = chosen {
            fills.push(f);
        }
    }

    // commit
    for (pid, local) in fills {
        if let Some(i) = plate_index(plates, pid) {
            let free = plates[i].cell(local).is_some_and(|c| !c.is_occupied());
            if free && plates[i].fill(local, *template) {
                stats.cells_created += 1;
            }
        }
    }
    debug!("[rifting] gaps={} created={}", stats.gaps, stats.cells_created);
    stats
}
