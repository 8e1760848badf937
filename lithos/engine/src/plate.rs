//! Rigid plates: a full local copy of the grid plus a rotation into world space.
//!
//! Each plate owns one [`Cell`] per grid point in its own frame. Motion only
//! changes `local_to_global`; the two id maps are refreshed by [`Plate::remap`]
//! and tie local cells to the shared world grid.

use smallvec::SmallVec;

use crate::cell::{Cell, CellRef, PlateId};
use crate::config::MotionParams;
use crate::geo;
use crate::grid::SphereGrid;
use crate::rock_column::RockColumn;
use crate::rotation::Rotation;

/// A rigid crustal plate.
#[derive(Debug, Clone)]
pub struct Plate {
    id: PlateId,
    cells: Vec<Cell>,
    /// Added to column densities when ranking plates (kg/m³).
    pub density_offset: f64,
    /// Unit rotation axis.
    pub euler_pole: [f64; 3],
    /// Rotation rate about `euler_pole` (rad/Myr).
    pub angular_speed: f64,
    local_to_global: Rotation,
    global_to_local: Rotation,
    global_ids_of_local_cells: Vec<u32>,
    local_ids_of_global_cells: Vec<u32>,
    steps_since_orthonormalize: u32,
}

impl Plate {
    /// Empty plate over `cell_count` cells with identity placement.
    pub fn new(id: PlateId, cell_count: usize, density_offset: f64, euler_pole: [f64; 3], angular_speed: f64) -> Self {
        let cells = (0..cell_count as u32).map(|i| Cell::new(id, i)).collect();
        let identity: Vec<u32> = (0..cell_count as u32).collect();
        Self {
            id,
            cells,
            density_offset,
            euler_pole: geo::try_normalize(euler_pole).unwrap_or([0.0, 0.0, 1.0]),
            angular_speed,
            local_to_global: Rotation::IDENTITY,
            global_to_local: Rotation::IDENTITY,
            global_ids_of_local_cells: identity.clone(),
            local_ids_of_global_cells: identity,
            steps_since_orthonormalize: 0,
        }
    }

    /// Plate id.
    pub fn id(&self) -> PlateId {
        self.id
    }

    /// All local cells, indexed by local id.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// One local cell.
    pub fn cell(&self, local: u32) -> Option<&Cell> {
        self.cells.get(local as usize)
    }

    /// One local cell, mutably.
    pub fn cell_mut(&mut self, local: u32) -> Option<&mut Cell> {
        self.cells.get_mut(local as usize)
    }

    /// Number of local cells (equals the grid size).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when the plate has no local cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Cells holding crust.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_occupied()).count()
    }

    /// Iterate occupied cells with their columns.
    pub fn occupied(&self) -> impl Iterator<Item = (&Cell, &RockColumn)> + '_ {
        self.cells.iter().filter_map(|c| c.column().map(|col| (c, col)))
    }

    /// Place `column` in local cell `local`. Out-of-range ids are ignored.
    pub fn fill(&mut self, local: u32, column: RockColumn) -> bool {
        match self.cells.get_mut(local as usize) {
            Some(cell) => {
                cell.fill(column);
                true
            }
            None => false,
        }
    }

    /// Local → world rotation.
    pub fn local_to_global(&self) -> &Rotation {
        &self.local_to_global
    }

    /// World → local rotation.
    pub fn global_to_local(&self) -> &Rotation {
        &self.global_to_local
    }

    /// Replace the placement (e.g. restored state). Id maps go stale until [`Plate::remap`].
    pub fn set_rotation(&mut self, local_to_global: Rotation) {
        self.local_to_global = local_to_global;
        self.global_to_local = local_to_global.transpose();
    }

    /// World grid id currently under local cell `local`.
    pub fn global_id_of(&self, local: u32) -> Option<u32> {
        self.global_ids_of_local_cells.get(local as usize).copied()
    }

    /// Local cell currently over world grid id `global`.
    pub fn local_id_of(&self, global: u32) -> Option<u32> {
        self.local_ids_of_global_cells.get(global as usize).copied()
    }

    /// The occupied cell covering world grid id `global`, if any.
    pub fn covering(&self, global: u32) -> Option<&Cell> {
        let local = self.local_id_of(global)?;
        self.cell(local).filter(|c| c.is_occupied())
    }

    /// ω as a vector (rad/Myr).
    pub fn angular_velocity(&self) -> [f64; 3] {
        geo::scale(self.euler_pole, self.angular_speed)
    }

    /// Set pole and speed from ω; a zero vector keeps the pole and stops the plate.
    pub fn set_angular_velocity(&mut self, omega: [f64; 3]) {
        let speed = geo::norm(omega);
        match geo::try_normalize(omega) {
            Some(pole) => {
                self.euler_pole = pole;
                self.angular_speed = speed;
            }
            None => self.angular_speed = 0.0,
        }
    }

    /// Surface velocity `ω × r` at world direction `r_unit` (rad/Myr).
    pub fn velocity_at(&self, r_unit: [f64; 3]) -> [f64; 3] {
        geo::cross(self.angular_velocity(), r_unit)
    }

    /// World position of local cell `local`.
    pub fn world_pos(&self, grid: &SphereGrid, local: u32) -> [f64; 3] {
        self.local_to_global.apply(grid.pos_xyz[local as usize])
    }

    /// Sum of column masses (kg/m² per unit cell area).
    pub fn total_mass(&self) -> f64 {
        self.occupied().map(|(_, col)| col.mass()).sum()
    }

    /// Mass-weighted centroid of occupied cells in world space, normalized.
    pub fn center_of_mass(&self, grid: &SphereGrid) -> Option<[f64; 3]> {
        let mut acc = [0.0f64; 3];
        for (cell, col) in self.occupied() {
            let w = col.mass() * grid.area[cell.id() as usize];
            acc = geo::add(acc, geo::scale(self.world_pos(grid, cell.id()), w));
        }
        geo::try_normalize(acc)
    }

    /// Rotate by `angular_speed·dt` about the Euler pole.
    pub fn advance(&mut self, dt_myr: f64, params: &MotionParams) {
        let angle = self.angular_speed * dt_myr;
        if angle != 0.0 && angle.is_finite() {
            let step = Rotation::from_axis_angle(self.euler_pole, angle);
            self.local_to_global = step.then_after(&self.local_to_global);
        }
        self.steps_since_orthonormalize += 1;
        if self.steps_since_orthonormalize >= params.orthonormalize_every.max(1) {
            self.local_to_global.orthonormalize();
            self.steps_since_orthonormalize = 0;
        }
        self.global_to_local = self.local_to_global.transpose();
    }

    /// Recompute both id maps against the world grid.
    pub fn remap(&mut self, grid: &SphereGrid) {
        let index = grid.index();
        for (i, p) in grid.pos_xyz.iter().enumerate() {
            self.global_ids_of_local_cells[i] = index.nearest_unit(self.local_to_global.apply(*p));
            self.local_ids_of_global_cells[i] = index.nearest_unit(self.global_to_local.apply(*p));
        }
    }

    /// Cut along the great circle with unit `normal`; cells on the positive
    /// side move, content intact, to a new plate `new_id` with the same placement.
    pub fn split(&mut self, new_id: PlateId, normal: [f64; 3], grid: &SphereGrid) -> Plate {
        let mut other = Plate::new(new_id, self.cells.len(), self.density_offset, self.euler_pole, self.angular_speed);
        other.local_to_global = self.local_to_global;
        other.global_to_local = self.global_to_local;
        other.global_ids_of_local_cells.clone_from(&self.global_ids_of_local_cells);
        other.local_ids_of_global_cells.clone_from(&self.local_ids_of_global_cells);
        other.steps_since_orthonormalize = self.steps_since_orthonormalize;

        for i in 0..self.cells.len() {
            if !self.cells[i].is_occupied() {
                continue;
            }
            if geo::dot(self.world_pos(grid, i as u32), normal) > 0.0 {
                let mark = self.cells[i].subducted_by();
                if let Some(col) = self.cells[i].destroy() {
                    other.cells[i].fill(col);
                    if let Some(m) = mark {
                        other.cells[i].mark_subducted_by(m);
                    }
                }
            }
        }
        other
    }

    /// Move every occupied cell of `other` onto this plate at the same world
    /// position. A cell landing on occupied ground takes the first empty
    /// neighbor, otherwise it is stacked. Returns `(old, new)` addresses.
    pub(crate) fn absorb(&mut self, mut other: Plate, grid: &SphereGrid, mantle_density: f64) -> Vec<(CellRef, CellRef)> {
        let mut moved = Vec::new();
        for i in 0..other.cells.len() {
            let mark = other.cells[i].subducted_by();
            let old = other.cells[i].cell_ref();
            let Some(col) = other.cells[i].destroy() else {
                continue;
            };
            let global = other.global_ids_of_local_cells[i];
            let target = self.local_ids_of_global_cells[global as usize];
            let slot = self.landing_slot(target, grid);
            let cell = &mut self.cells[slot as usize];
            if cell.is_occupied() {
                if let Some(existing) = cell.column_mut() {
                    existing.stack(&col, mantle_density);
                }
            } else {
                cell.fill(col);
                if let Some(m) = mark {
                    cell.mark_subducted_by(m);
                }
            }
            moved.push((old, CellRef::new(self.id, slot)));
        }
        moved
    }

    fn landing_slot(&self, target: u32, grid: &SphereGrid) -> u32 {
        if !self.cells[target as usize].is_occupied() {
            return target;
        }
        let ring: &SmallVec<[u32; 8]> = &grid.n1[target as usize];
        ring.iter().copied().find(|&n| !self.cells[n as usize].is_occupied()).unwrap_or(target)
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

}

/// Position of plate `id` in a slice sorted by id.
pub(crate) fn plate_index(plates: &[Plate], id: PlateId) -> Option<usize> {
    plates.binary_search_by_key(&id, Plate::id).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_keeps_rotation_orthonormal() {
        let mut p = Plate::new(0, 4, 0.0, [0.3, 0.4, 0.5], 0.01);
        let params = MotionParams::default();
        for _ in 0..5000 {
            p.advance(1.0, &params);
        }
        assert!(p.local_to_global().orthonormality_error() < 1e-9);
        let back = p.global_to_local().then_after(p.local_to_global());
        assert!(back.orthonormality_error() < 1e-9);
        assert!(back.m[0][0] > 1.0 - 1e-9);
    }

    #[test]
    fn velocity_is_tangent() {
        let p = Plate::new(0, 1, 0.0, [0.0, 0.0, 1.0], 0.02);
        let v = p.velocity_at([1.0, 0.0, 0.0]);
        assert!((v[1] - 0.02).abs() < 1e-15);
        assert!(v[0].abs() < 1e-15 && v[2].abs() < 1e-15);
    }
}
