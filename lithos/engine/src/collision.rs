//! Batch collision resolution between plates.
//!
//! Three passes per step:
//! - detect: occupied cells are registered at the world grid id under them;
//!   every id holding cells of two or more plates forms one contact group;
//! - decide: each group gets a single top, the cell no other member can
//!   subduct under (see [`collision_roles`]), and every other member either
//!   subducts under it or docks with it;
//! - commit: accretions and destructions are applied, docking marks are set
//!   and docked plates are merged.
//!
//! A column registers at exactly one grid id, so groups are disjoint and no
//! decision can observe another. Roles depend on offsets and densities only;
//! plate ids matter solely as the final tie-break.

use std::collections::{BTreeMap, HashMap};

use smallvec::SmallVec;
use tracing::{debug, info};

use crate::cell::{CellRef, PlateId};
use crate::config::MaterialDensity;
use crate::coverage::{self, Coverage};
use crate::grid::SphereGrid;
use crate::plate::{plate_index, Plate};
use crate::rock_column::{ColumnError, RockColumn};
use crate::subduction::{collision_roles, docking_roles, Contender};

/// Outcome chosen for one member of a contact group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Decision {
    /// `top` absorbs the sialic part of `bottom`; `bottom` is destroyed.
    Subduct {
        /// Surviving cell.
        top: CellRef,
        /// Destroyed cell.
        bottom: CellRef,
        /// Bottom column as it was when the decision was made.
        bottom_column: RockColumn,
    },
    /// Both columns are continental; their plates merge.
    Dock {
        /// Cell riding over.
        top: CellRef,
        /// Cell marked as subducted by `top`.
        bottom: CellRef,
    },
}

/// Per-pass counters.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CollisionStats {
    /// Colliding `(top, other)` pairs, one per decision.
    pub pairs: usize,
    /// Cells destroyed by subduction.
    pub subducted: usize,
    /// Total thickness welded onto surviving columns (m).
    pub accreted_m: f64,
    /// Plates absorbed by docking.
    pub docked_plates: usize,
}

/// Collision resolver with reusable scratch space.
#[derive(Debug, Default, Clone)]
pub struct CollisionResolver {
    coverage: Coverage,
}

impl CollisionResolver {
    /// New resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Contact groups: cells registered at the same grid id by two or more
    /// plates, each group sorted, groups in grid id order.
    pub fn detect(&mut self, plates: &[Plate], grid: &SphereGrid) -> Vec<SmallVec<[CellRef; 4]>> {
        coverage::register_into(&mut self.coverage, plates, grid);
        self.coverage
            .iter()
            .filter(|cells| cells.first().is_some_and(|a| cells.iter().any(|b| b.plate != a.plate)))
            .cloned()
            .collect()
    }

    /// Choose outcomes from the current, unmodified plates.
    pub fn decide(&self, plates: &[Plate], groups: &[SmallVec<[CellRef; 4]>]) -> Vec<Decision> {
        let mut out = Vec::new();
        for group in groups {
            let members: SmallVec<[(Contender, RockColumn); 4]> = group
                .iter()
                .filter_map(|&r| {
                    let (col, offset) = lookup(plates, r)?;
                    Some((Contender { cell: r, density_offset: offset, column_density: col.density }, col))
                })
                .collect();
            // roles form a total order, so the fold finds the same top from any start
            let Some((top, top_col)) = members
                .iter()
                .copied()
                .reduce(|best, m| if collision_roles(best.0, m.0).0 == best.0.cell { best } else { m })
            else {
                continue;
            };
            for &(m, col) in &members {
                if m.cell.plate == top.cell.plate {
                    continue;
                }
                if top_col.is_continental() && col.is_continental() {
                    out.push(Decision::Dock { top: top.cell, bottom: m.cell });
                } else {
                    out.push(Decision::Subduct { top: top.cell, bottom: m.cell, bottom_column: col });
                }
            }
        }
        out
    }

    /// Apply `decisions` in batch.
    pub fn commit(
        &self,
        plates: &mut Vec<Plate>,
        grid: &SphereGrid,
        decisions: &[Decision],
        materials: &MaterialDensity,
    ) -> Result<CollisionStats, ColumnError> {
        let mut stats = CollisionStats::default();

        for d in decisions {
            if let Decision::Subduct { top, bottom, bottom_column } = *d {
                let gain = match cell_column_mut(plates, top) {
                    Some(col) => col.accrete(&bottom_column, materials)?,
                    None => continue,
                };
                if let Some(i) = plate_index(plates, bottom.plate) {
                    if let Some(cell) = plates[i].cell_mut(bottom.cell) {
                        cell.destroy();
                    }
                }
                stats.subducted += 1;
                stats.accreted_m += gain;
            }
        }

        let mut docks: Vec<(PlateId, PlateId)> = Vec::new();
        for d in decisions {
            if let Decision::Dock { top, bottom } = *d {
                if let Some(i) = plate_index(plates, bottom.plate) {
                    if let Some(cell) = plates[i].cell_mut(bottom.cell) {
                        cell.mark_subducted_by(top);
                    }
                }
                docks.push((top.plate, bottom.plate));
            }
        }

        stats.docked_plates = merge_docked(plates, grid, &docks, materials.mantle);
        Ok(stats)
    }

    /// Detect, decide and commit in one call.
    pub fn resolve(
        &mut self,
        plates: &mut Vec<Plate>,
        grid: &SphereGrid,
        materials: &MaterialDensity,
    ) -> Result<CollisionStats, ColumnError> {
        for plate in plates.iter_mut() {
            for cell in plate.cells_mut() {
                cell.clear_subducted_by();
            }
        }
        let groups = self.detect(plates, grid);
        let decisions = self.decide(plates, &groups);
        let mut stats = self.commit(plates, grid, &decisions, materials)?;
        stats.pairs = decisions.len();
        debug!(
            "[collision] pairs={} subducted={} accreted={:.1} m docked={}",
            stats.pairs, stats.subducted, stats.accreted_m, stats.docked_plates
        );
        Ok(stats)
    }
}

fn lookup(plates: &[Plate], r: CellRef) -> Option<(RockColumn, f64)> {
    let plate = &plates[plate_index(plates, r.plate)?];
    let col = plate.cell(r.cell)?.column()?;
    Some((*col, plate.density_offset))
}

fn cell_column_mut(plates: &mut [Plate], r: CellRef) -> Option<&mut RockColumn> {
    let i = plate_index(plates, r.plate)?;
    plates[i].cell_mut(r.cell)?.column_mut()
}

/// Union-find over docking pairs. Each group collapses into its subjugating
/// plate (lowest offset, then lowest id); members are absorbed in id order.
fn merge_docked(plates: &mut Vec<Plate>, grid: &SphereGrid, docks: &[(PlateId, PlateId)], mantle: f64) -> usize {
    if docks.is_empty() {
        return 0;
    }
    let mut parent: BTreeMap<PlateId, PlateId> = BTreeMap::new();
    fn find(parent: &mut BTreeMap<PlateId, PlateId>, x: PlateId) -> PlateId {
        let mut root = x;
        while let Some(&p) = parent.get(&root) {
            if p == root {
                break;
            }
            root = p;
        }
        let mut cur = x;
        while cur != root {
            let next = parent.get(&cur).copied().unwrap_or(root);
            parent.insert(cur, root);
            cur = next;
        }
        root
    }
    fn offset_of(plates: &[Plate], id: PlateId) -> f64 {
        plate_index(plates, id).map_or(0.0, |i| plates[i].density_offset)
    }

    for &(a, b) in docks {
        parent.entry(a).or_insert(a);
        parent.entry(b).or_insert(b);
        let ra = find(&mut parent, a);
        let rb = find(&mut parent, b);
        if ra == rb {
            continue;
        }
        let (keep, drop) = docking_roles((ra, offset_of(plates.as_slice(), ra)), (rb, offset_of(plates.as_slice(), rb)));
        parent.insert(drop, keep);
    }

    let members: Vec<PlateId> = parent.keys().copied().collect();
    let mut groups: BTreeMap<PlateId, Vec<PlateId>> = BTreeMap::new();
    for id in members {
        let root = find(&mut parent, id);
        if root != id {
            groups.entry(root).or_default().push(id);
        }
    }

    let mut relocated: HashMap<CellRef, CellRef> = HashMap::new();
    let mut absorbed = 0;
    for (root, mut victims) in groups {
        victims.sort_unstable();
        for victim in victims {
            let Some(vi) = plate_index(plates, victim) else {
                continue;
            };
            let plate = plates.remove(vi);
            let Some(ri) = plate_index(plates, root) else {
                plates.insert(vi, plate);
                continue;
            };
            let moved = plates[ri].absorb(plate, grid, mantle);
            info!("[collision] plate {} docked into plate {} ({} cells)", victim, root, moved.len());
            relocated.extend(moved);
            absorbed += 1;
        }
    }

    if !relocated.is_empty() {
        for plate in plates.iter_mut() {
            for cell in plate.cells_mut() {
                if let Some(to) = cell.subducted_by().and_then(|r| relocated.get(&r).copied()) {
                    cell.mark_subducted_by(to);
                }
            }
        }
    }
    absorbed
}
