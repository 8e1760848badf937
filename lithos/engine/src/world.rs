//! World state container, constructors and the per-step driver.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, LogNormal, Normal, UnitSphere};
use tracing::{debug, info, warn};

use crate::cell::PlateId;
use crate::collision::{CollisionResolver, CollisionStats};
use crate::config::{ConfigError, WorldConfig};
use crate::coverage::footprint;
use crate::force_balance;
use crate::geo;
use crate::grid::{default_raster_dim, GridError, SphereGrid};
use crate::plate::{plate_index, Plate};
use crate::rifting::{self, RiftingStats};
use crate::rock_column::ColumnError;
use crate::supercontinent::SupercontinentCycle;

/// Simulation clock information.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Clock {
    /// Current simulation time in Myr.
    pub t_myr: f64,
    /// Step index (starts at 0, increments per step).
    pub step_idx: u64,
}

/// Errors surfaced by world construction and stepping.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum WorldError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Grid construction or lookup failure.
    #[error(transparent)]
    Grid(#[from] GridError),
    /// Column arithmetic failure.
    #[error(transparent)]
    Column(#[from] ColumnError),
    /// Timesteps must be finite and non-negative.
    #[error("timestep {0} must be finite and non-negative")]
    InvalidTimestep(f64),
    /// No plate with this id.
    #[error("unknown plate id {0}")]
    UnknownPlate(PlateId),
    /// All `u16` plate ids are in use.
    #[error("plate ids exhausted")]
    PlateIdsExhausted,
    /// Persisted state does not describe a valid world.
    #[error("state mismatch: {0}")]
    StateMismatch(String),
}

/// Summary of one [`World::update`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepStats {
    /// Collision pass counters.
    pub collisions: CollisionStats,
    /// Rift filling counters.
    pub rifting: RiftingStats,
    /// The supercontinent cycle restarted this step.
    pub cycle_fired: bool,
    /// Plate created by a split, if any.
    pub split: Option<PlateId>,
    /// Plates after the step.
    pub plate_count: usize,
}

/// Which invariant repairs have already been reported.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct InvariantLog {
    thickness: bool,
    density: bool,
}

/// The complete world state required for stepping.
#[derive(Debug, Clone)]
pub struct World {
    pub(crate) grid: SphereGrid,
    pub(crate) plates: Vec<Plate>,
    pub(crate) cycle: SupercontinentCycle,
    pub(crate) config: WorldConfig,
    pub(crate) rng: StdRng,
    resolver: CollisionResolver,
    /// Simulation clock.
    pub clock: Clock,
    pub(crate) next_plate_id: u32,
    top_plate: Vec<Option<PlateId>>,
    elevation_m: Vec<f64>,
    density: Vec<f64>,
    logged: InvariantLog,
}

impl World {
    /// Build a populated world: random plates with ocean crust and continental shields.
    pub fn new(config: WorldConfig) -> Result<Self, WorldError> {
        let mut world = Self::empty(config)?;
        world.seed_plates()?;
        Ok(world)
    }

    /// Grid, RNG and cycle only; add plates with [`World::add_plate`].
    pub fn empty(config: WorldConfig) -> Result<Self, WorldError> {
        config.validate()?;
        let dim = config.raster_dim.unwrap_or_else(|| default_raster_dim(config.point_count));
        let grid = SphereGrid::with_resolution(config.point_count, dim)?;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let cycle = SupercontinentCycle::new(config.cycle, &mut rng);
        Ok(Self::assemble(grid, config, rng, cycle))
    }

    pub(crate) fn assemble(grid: SphereGrid, config: WorldConfig, rng: StdRng, cycle: SupercontinentCycle) -> Self {
        let n = grid.cells;
        let mantle = config.materials.mantle;
        Self {
            grid,
            plates: Vec::new(),
            cycle,
            config,
            rng,
            resolver: CollisionResolver::new(),
            clock: Clock::default(),
            next_plate_id: 0,
            top_plate: vec![None; n],
            elevation_m: vec![0.0; n],
            density: vec![mantle; n],
            logged: InvariantLog::default(),
        }
    }

    fn seed_plates(&mut self) -> Result<(), WorldError> {
        let n = self.grid.cells;
        let seeds = rand::seq::index::sample(&mut self.rng, n, self.config.plates).into_vec();
        let mut seed_pos = Vec::with_capacity(seeds.len());
        for &s in &seeds {
            let (pole, speed, offset) = self.draw_motion()?;
            self.add_plate(offset, pole, speed)?;
            seed_pos.push(self.grid.pos_xyz[s]);
        }

        let shields: Vec<[f64; 3]> = (0..self.config.continents).map(|_| UnitSphere.sample(&mut self.rng)).collect();
        let shield_rad = self.config.continent_radius_km / self.config.radius_km;
        let mantle = self.config.materials.mantle;
        let ocean = self.config.ocean.column(mantle);
        let land = self.config.land.column(mantle);

        for g in 0..n {
            let p = self.grid.pos_xyz[g];
            let mut owner = 0usize;
            let mut best = f64::NEG_INFINITY;
            for (k, s) in seed_pos.iter().enumerate() {
                let d = geo::dot(p, *s);
                if d > best {
                    best = d;
                    owner = k;
                }
            }
            let on_land = shields.iter().any(|c| geo::angle_between(p, *c) <= shield_rad);
            self.plates[owner].fill(g as u32, if on_land { land } else { ocean });
        }

        self.remap_plates();
        self.refresh();
        info!(
            "[world] seeded {} plates, {} shields on {} cells (raster {})",
            self.plates.len(),
            shields.len(),
            n,
            self.grid.raster_dim()
        );
        Ok(())
    }

    /// Random `(pole, speed rad/Myr, density offset)` for a new plate.
    fn draw_motion(&mut self) -> Result<([f64; 3], f64, f64), WorldError> {
        let cfg = &self.config;
        let speed = LogNormal::new(cfg.speed_log_mean, cfg.speed_log_std)
            .map_err(|_| ConfigError::InvalidParameter { name: "speed_log_std", value: cfg.speed_log_std })?;
        let offset = Normal::new(0.0, cfg.density_offset_std)
            .map_err(|_| ConfigError::InvalidParameter { name: "density_offset_std", value: cfg.density_offset_std })?;
        let pole: [f64; 3] = UnitSphere.sample(&mut self.rng);
        let km_per_myr = speed.sample(&mut self.rng);
        let density_offset = offset.sample(&mut self.rng);
        Ok((pole, km_per_myr / cfg.radius_km, density_offset))
    }

    /// Hand out the next plate id. Ids only grow, so one absorbed by docking
    /// never comes back for a different plate.
    fn allocate_plate_id(&mut self) -> Result<PlateId, WorldError> {
        let id = PlateId::try_from(self.next_plate_id).map_err(|_| WorldError::PlateIdsExhausted)?;
        self.next_plate_id += 1;
        Ok(id)
    }

    /// Add an empty plate with identity placement; returns its id.
    pub fn add_plate(&mut self, density_offset: f64, euler_pole: [f64; 3], angular_speed: f64) -> Result<PlateId, WorldError> {
        let id = self.allocate_plate_id()?;
        self.plates.push(Plate::new(id, self.grid.cells, density_offset, euler_pole, angular_speed));
        Ok(id)
    }

    /// Plate by id.
    pub fn plate(&self, id: PlateId) -> Option<&Plate> {
        plate_index(&self.plates, id).map(|i| &self.plates[i])
    }

    /// Plate by id, mutably.
    pub fn plate_mut(&mut self, id: PlateId) -> Result<&mut Plate, WorldError> {
        let i = plate_index(&self.plates, id).ok_or(WorldError::UnknownPlate(id))?;
        Ok(&mut self.plates[i])
    }

    /// All plates, sorted by id.
    pub fn plates(&self) -> &[Plate] {
        &self.plates
    }

    /// Number of plates.
    pub fn plate_count(&self) -> usize {
        self.plates.len()
    }

    /// Shared grid.
    pub fn grid(&self) -> &SphereGrid {
        &self.grid
    }

    /// Configuration the world was built with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Supercontinent cycle state.
    pub fn cycle(&self) -> &SupercontinentCycle {
        &self.cycle
    }

    /// Advance by `timestep` Myr: motion, remap, collisions, rifting, cycle, fields.
    pub fn update(&mut self, timestep: f64) -> Result<StepStats, WorldError> {
        if !timestep.is_finite() || timestep < 0.0 {
            return Err(WorldError::InvalidTimestep(timestep));
        }
        let mut stats = StepStats { plate_count: self.plates.len(), ..Default::default() };
        if timestep == 0.0 {
            return Ok(stats);
        }
        let motion = self.config.motion;
        let materials = self.config.materials;

        for plate in &mut self.plates {
            let torque = force_balance::plate_torque(plate, &self.grid, &materials, &motion);
            force_balance::apply_force_balance(plate, torque, timestep, &motion);
            plate.advance(timestep, &motion);
        }
        self.remap_plates();

        stats.collisions = self.resolver.resolve(&mut self.plates, &self.grid, &materials)?;
        stats.rifting = self.fill_rifts();

        if self.cycle.update(timestep, &mut self.rng) {
            stats.cycle_fired = true;
            stats.split = self.reorganize()?;
        }

        self.refresh();
        self.clock.t_myr += timestep;
        self.clock.step_idx += 1;
        stats.plate_count = self.plates.len();
        debug!(
            "[world] step={} t={:.1} Myr plates={} subducted={} rifted={}",
            self.clock.step_idx,
            self.clock.t_myr,
            stats.plate_count,
            stats.collisions.subducted,
            stats.rifting.cells_created
        );
        Ok(stats)
    }

    /// Run one collision pass on the current placement and refresh fields.
    pub fn resolve_collisions(&mut self) -> Result<CollisionStats, WorldError> {
        let materials = self.config.materials;
        let stats = self.resolver.resolve(&mut self.plates, &self.grid, &materials)?;
        self.refresh();
        Ok(stats)
    }

    /// Fill rift gaps with fresh crust.
    pub fn fill_rifts(&mut self) -> RiftingStats {
        let template = self.config.rifting.column(self.config.materials.mantle);
        rifting::fill_rifts(&mut self.plates, &self.grid, &template)
    }

    /// Recompute every plate's id maps.
    pub fn remap_plates(&mut self) {
        for plate in &mut self.plates {
            plate.remap(&self.grid);
        }
    }

    /// Split the largest plate when the plate count is at or below target.
    /// Returns the new plate's id.
    pub fn reorganize(&mut self) -> Result<Option<PlateId>, WorldError> {
        if self.plates.len() > self.config.target_plate_count {
            return Ok(None);
        }
        let mut largest: Option<(usize, usize)> = None;
        for (i, p) in self.plates.iter().enumerate() {
            let count = p.occupied_count();
            if count >= 2 && largest.map_or(true, |(_, best)| count > best) {
                largest = Some((i, count));
            }
        }
        let Some((idx, _)) = largest else {
            return Ok(None);
        };
        let Some(com) = self.plates[idx].center_of_mass(&self.grid) else {
            return Ok(None);
        };

        // great circle through the center of mass with a random orientation
        let v: [f64; 3] = UnitSphere.sample(&mut self.rng);
        let normal = geo::try_normalize(geo::sub(v, geo::scale(com, geo::dot(com, v))))
            .unwrap_or_else(|| geo::any_perpendicular(com));

        let (pole, speed, offset) = self.draw_motion()?;
        let new_id = self.allocate_plate_id()?;
        let parent = self.plates[idx].id();
        let mut fresh = self.plates[idx].split(new_id, normal, &self.grid);
        fresh.euler_pole = pole;
        fresh.angular_speed = speed;
        fresh.density_offset = offset;
        info!(
            "[world] supercontinent cycle: split plate {} -> {} ({} cells moved)",
            parent,
            new_id,
            fresh.occupied_count()
        );
        self.plates.push(fresh);
        Ok(Some(new_id))
    }

    /// Repair invalid columns and rebuild the per-cell consumer fields.
    pub fn refresh(&mut self) {
        let mantle = self.config.materials.mantle;
        let mut seen = InvariantLog::default();
        for plate in &mut self.plates {
            for cell in plate.cells_mut() {
                if let Some(col) = cell.column_mut() {
                    let v = col.sanitize(mantle);
                    seen.thickness |= v.thickness;
                    seen.density |= v.density;
                }
            }
        }
        if seen.thickness && !self.logged.thickness {
            warn!("[world] negative or non-finite crust thickness clamped to 0");
            self.logged.thickness = true;
        }
        if seen.density && !self.logged.density {
            warn!("[world] non-positive or non-finite crust density reset to mantle density");
            self.logged.density = true;
        }

        let cover = footprint(&self.plates, &self.grid);
        for (g, cells) in cover.iter().enumerate() {
            // lightest effective density on top, ties to the lowest address
            let mut best: Option<(f64, PlateId, f64, f64)> = None;
            for r in cells {
                let Some(plate) = plate_index(&self.plates, r.plate).map(|i| &self.plates[i]) else {
                    continue;
                };
                let Some(col) = plate.cell(r.cell).and_then(|c| c.column()) else {
                    continue;
                };
                let key = col.density + plate.density_offset;
                if best.as_ref().map_or(true, |b| key < b.0) {
                    best = Some((key, plate.id(), col.elevation, col.density));
                }
            }
            match best {
                Some((_, id, elevation, density)) => {
                    self.top_plate[g] = Some(id);
                    self.elevation_m[g] = elevation;
                    self.density[g] = density;
                }
                None => {
                    self.top_plate[g] = None;
                    self.elevation_m[g] = 0.0;
                    self.density[g] = mantle;
                }
            }
        }
    }

    /// Elevation of the top column at grid id (m above the isostatic datum; 0 where bare).
    pub fn elevation_at(&self, id: u32) -> Option<f64> {
        self.elevation_m.get(id as usize).copied()
    }

    /// Density of the top column at grid id (mantle density where bare).
    pub fn density_at(&self, id: u32) -> Option<f64> {
        self.density.get(id as usize).copied()
    }

    /// Top plate at grid id, `None` where no plate covers it.
    pub fn plate_at(&self, id: u32) -> Option<PlateId> {
        self.top_plate.get(id as usize).copied().flatten()
    }

    /// Surface velocity of the top plate at grid id (rad/Myr; multiply by radius for km/Myr).
    pub fn velocity_at(&self, id: u32) -> Option<[f64; 3]> {
        let plate = self.plate(self.plate_at(id)?)?;
        Some(plate.velocity_at(self.grid.pos_xyz[id as usize]))
    }

    /// Elevation field, one value per grid id.
    pub fn elevation_m(&self) -> &[f64] {
        &self.elevation_m
    }

    /// Density field, one value per grid id.
    pub fn density(&self) -> &[f64] {
        &self.density
    }

    /// Top plate per grid id.
    pub fn top_plate_map(&self) -> &[Option<PlateId>] {
        &self.top_plate
    }

    /// Isostatic elevation of sea level implied by the ocean template.
    pub fn sea_level_m(&self) -> f64 {
        self.config.ocean.sea_level(self.config.materials.mantle)
    }

    /// Total crust mass over all plates (kg/m² × unit-sphere area).
    pub fn total_crust_mass(&self) -> f64 {
        self.plates
            .iter()
            .flat_map(|p| p.occupied().map(|(cell, col)| col.mass() * self.grid.area[cell.id() as usize]))
            .sum()
    }
}
