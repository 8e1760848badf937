//! World state export and re-import.
//!
//! Only thickness and density are persisted per occupied cell; elevation is
//! re-derived by isostasy on import, so a restored world reproduces the same
//! fields bit for bit. The types derive serde traits and leave the wire format
//! to the caller.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::cell::PlateId;
use crate::config::WorldConfig;
use crate::grid::SphereGrid;
use crate::plate::Plate;
use crate::rock_column::RockColumn;
use crate::rotation::Rotation;
use crate::supercontinent::SupercontinentCycle;
use crate::world::{Clock, World, WorldError};

/// Supercontinent cycle `{duration, age}` in Myr.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CycleState {
    /// Cycle length.
    pub duration: f64,
    /// Time since the last restart.
    pub age: f64,
}

/// One occupied local cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColumnRecord {
    /// Local cell id on the plate.
    pub local_id: u32,
    /// Crust thickness (m).
    pub thickness: f64,
    /// Crust density (kg/m³).
    pub density: f64,
}

/// One plate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlateState {
    /// Plate id.
    pub id: PlateId,
    /// Local → world rotation rows.
    pub rotation: [[f64; 3]; 3],
    /// Density offset (kg/m³).
    pub density_offset: f64,
    /// Unit Euler pole.
    pub euler_pole: [f64; 3],
    /// Angular speed (rad/Myr).
    pub angular_speed: f64,
    /// Occupied cells only, ascending local id.
    pub cells: Vec<ColumnRecord>,
}

/// Whole-world state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// Grid points.
    pub point_count: usize,
    /// Cube raster samples per face edge.
    pub raster_dim: u32,
    /// Number of plates (must equal `plates.len()`).
    pub plate_count: usize,
    /// Cycle timer.
    pub cycle: CycleState,
    /// Simulation time (Myr).
    pub t_myr: f64,
    /// Completed steps.
    pub step_idx: u64,
    /// Id the next new plate will get; never below `last id + 1` on import.
    #[serde(default)]
    pub next_plate_id: u32,
    /// Plates sorted by id.
    pub plates: Vec<PlateState>,
}

impl World {
    /// Capture the persistent state.
    pub fn export_state(&self) -> WorldState {
        let plates = self
            .plates
            .iter()
            .map(|p| PlateState {
                id: p.id(),
                rotation: p.local_to_global().m,
                density_offset: p.density_offset,
                euler_pole: p.euler_pole,
                angular_speed: p.angular_speed,
                cells: p
                    .occupied()
                    .map(|(cell, col)| ColumnRecord { local_id: cell.id(), thickness: col.thickness, density: col.density })
                    .collect(),
            })
            .collect();
        WorldState {
            point_count: self.grid.cells,
            raster_dim: self.grid.raster_dim(),
            plate_count: self.plates.len(),
            cycle: CycleState { duration: self.cycle.duration(), age: self.cycle.age() },
            t_myr: self.clock.t_myr,
            step_idx: self.clock.step_idx,
            next_plate_id: self.next_plate_id,
            plates,
        }
    }

    /// Rebuild a world from `state`. Grid size and raster come from the state;
    /// everything else from `config`. The RNG is reseeded from
    /// `config.seed ^ step_idx`.
    pub fn from_state(config: WorldConfig, state: &WorldState) -> Result<World, WorldError> {
        let mut config = config;
        config.point_count = state.point_count;
        config.raster_dim = Some(state.raster_dim);
        config.validate()?;
        if state.plate_count != state.plates.len() {
            return Err(WorldError::StateMismatch(format!(
                "plate_count {} but {} plates listed",
                state.plate_count,
                state.plates.len()
            )));
        }
        if state.plates.windows(2).any(|w| w[0].id >= w[1].id) {
            return Err(WorldError::StateMismatch("plate ids must be unique and ascending".into()));
        }

        let grid = SphereGrid::with_resolution(state.point_count, state.raster_dim)?;
        let cycle = SupercontinentCycle::restore(state.cycle.age, state.cycle.duration, config.cycle)?;
        let rng = StdRng::seed_from_u64(config.seed ^ state.step_idx);
        let mantle = config.materials.mantle;
        let n = grid.cells;

        let mut plates = Vec::with_capacity(state.plates.len());
        for ps in &state.plates {
            let mut plate = Plate::new(ps.id, n, ps.density_offset, ps.euler_pole, ps.angular_speed);
            plate.euler_pole = ps.euler_pole;
            plate.set_rotation(Rotation::from_rows(ps.rotation));
            for rec in &ps.cells {
                if rec.local_id as usize >= n {
                    return Err(WorldError::StateMismatch(format!(
                        "plate {} cell {} outside grid of {}",
                        ps.id, rec.local_id, n
                    )));
                }
                plate.fill(rec.local_id, RockColumn::with_isostasy(rec.thickness, rec.density, mantle));
            }
            plate.remap(&grid);
            plates.push(plate);
        }

        let mut world = World::assemble(grid, config, rng, cycle);
        world.plates = plates;
        world.clock = Clock { t_myr: state.t_myr, step_idx: state.step_idx };
        let after_last = state.plates.last().map_or(0, |p| u32::from(p.id) + 1);
        world.next_plate_id = state.next_plate_id.max(after_last);
        world.refresh();
        Ok(world)
    }
}
