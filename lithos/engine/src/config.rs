//! Configuration types for world construction and stepping.
//!
//! Plain parameter structs with defaults carrying the reference model's
//! constants. `WorldConfig::validate` is the single gate run by `World::new`.

use crate::rock_column::RockColumn;
use crate::supercontinent::DurationPolicy;

/// Errors raised for configurations that cannot produce a valid world.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Grid needs at least one point.
    #[error("point_count must be positive")]
    NoPoints,
    /// At least one plate is required to cover the grid.
    #[error("plates must be at least 1")]
    NoPlates,
    /// Each plate needs a seed cell and ids are `u16`.
    #[error("{plates} plates cannot be seeded on {points} points")]
    TooManyPlates {
        /// Requested plates.
        plates: usize,
        /// Grid points.
        points: usize,
    },
    /// Accretion divides by `crust − mantle`; crust must be lighter.
    #[error("crust density {crust} must be below mantle density {mantle}")]
    DensityOrdering {
        /// Sial density (kg/m³).
        crust: f64,
        /// Mantle density (kg/m³).
        mantle: f64,
    },
    /// A numeric parameter is out of range or not finite.
    #[error("parameter `{name}` has invalid value {value}")]
    InvalidParameter {
        /// Field name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// Cycle duration bounds must be positive and ordered.
    #[error("cycle duration range [{min}, {max}] is invalid")]
    InvalidDuration {
        /// Lower bound (Myr).
        min: f64,
        /// Upper bound (Myr).
        max: f64,
    },
}

/// Reference densities (kg/m³).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialDensity {
    /// Mantle density.
    pub mantle: f64,
    /// Sialic (continental) crust density.
    pub crust: f64,
}

impl Default for MaterialDensity {
    fn default() -> Self {
        Self { mantle: 3300.0, crust: 2700.0 }
    }
}

impl MaterialDensity {
    /// Both positive and finite, crust strictly lighter than mantle.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive("materials.mantle", self.mantle)?;
        check_positive("materials.crust", self.crust)?;
        if self.crust >= self.mantle {
            return Err(ConfigError::DensityOrdering { crust: self.crust, mantle: self.mantle });
        }
        Ok(())
    }
}

/// Initial crust column for a class of terrain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColumnTemplate {
    /// Nominal surface elevation relative to sea level (m).
    pub elevation: f64,
    /// Crust thickness (m).
    pub thickness: f64,
    /// Crust density (kg/m³).
    pub density: f64,
}

impl ColumnTemplate {
    /// Oceanic crust.
    pub const OCEAN: Self = Self { elevation: -3682.0, thickness: 7100.0, density: 2890.0 };
    /// Continental shield.
    pub const LAND: Self = Self { elevation: 840.0, thickness: 36900.0, density: 2700.0 };

    /// A column with isostatic elevation above the mantle datum.
    pub fn column(&self, mantle_density: f64) -> RockColumn {
        RockColumn::with_isostasy(self.thickness, self.density, mantle_density)
    }

    /// Offset from the isostatic datum to sea level implied by this template.
    pub fn sea_level(&self, mantle_density: f64) -> f64 {
        self.column(mantle_density).elevation - self.elevation
    }

    fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        check_positive(name, self.thickness)?;
        check_positive(name, self.density)?;
        if !self.elevation.is_finite() {
            return Err(ConfigError::InvalidParameter { name, value: self.elevation });
        }
        Ok(())
    }
}

/// Parameters for buoyancy-driven angular velocity updates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionParams {
    /// Torque-to-angular-acceleration gain (rad/Myr² per unit torque).
    pub gain: f64,
    /// Linear damping on ω (1/Myr).
    pub damp_per_myr: f64,
    /// Max |Δω| per step (rad/Myr).
    pub max_domega: f64,
    /// Max |ω| (rad/Myr).
    pub max_omega: f64,
    /// Gravitational acceleration (m/s²).
    pub surface_gravity: f64,
    /// Re-orthonormalize plate rotations every N steps (>= 1).
    pub orthonormalize_every: u32,
}

impl Default for MotionParams {
    fn default() -> Self {
        Self {
            gain: 1.0e-6,
            damp_per_myr: 0.0,
            max_domega: 1.0e-3,
            max_omega: 0.03,
            surface_gravity: 9.8,
            orthonormalize_every: 16,
        }
    }
}

impl MotionParams {
    fn validate(&self) -> Result<(), ConfigError> {
        check_non_negative("motion.gain", self.gain)?;
        check_non_negative("motion.damp_per_myr", self.damp_per_myr)?;
        check_non_negative("motion.max_domega", self.max_domega)?;
        check_non_negative("motion.max_omega", self.max_omega)?;
        check_non_negative("motion.surface_gravity", self.surface_gravity)?;
        if self.orthonormalize_every == 0 {
            return Err(ConfigError::InvalidParameter { name: "motion.orthonormalize_every", value: 0.0 });
        }
        Ok(())
    }
}

/// Everything needed to build a [`crate::world::World`].
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    /// Grid points on the sphere.
    pub point_count: usize,
    /// Cube raster samples per face edge; `None` uses the grid default.
    pub raster_dim: Option<u32>,
    /// Plates created by `World::new`.
    pub plates: usize,
    /// Splits happen only while the plate count is at or below this.
    pub target_plate_count: usize,
    /// Continental shields painted at startup.
    pub continents: usize,
    /// Shield radius (km).
    pub continent_radius_km: f64,
    /// Planet radius (km).
    pub radius_km: f64,
    /// Reference densities.
    pub materials: MaterialDensity,
    /// Oceanic crust template.
    pub ocean: ColumnTemplate,
    /// Continental crust template.
    pub land: ColumnTemplate,
    /// Crust created in rift gaps.
    pub rifting: ColumnTemplate,
    /// Plate motion parameters.
    pub motion: MotionParams,
    /// Supercontinent cycle duration policy. One split per cycle against
    /// docking that may merge several plates per step: with the 150 Myr
    /// default a world settles at a few plates; shorter cycles keep more.
    pub cycle: DurationPolicy,
    /// Mean of ln(plate speed in km/Myr).
    pub speed_log_mean: f64,
    /// Std-dev of ln(plate speed in km/Myr).
    pub speed_log_std: f64,
    /// Std-dev of plate density offsets (kg/m³).
    pub density_offset_std: f64,
    /// Seed for the world RNG.
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            point_count: 10_000,
            raster_dim: None,
            plates: 7,
            target_plate_count: 8,
            continents: 3,
            continent_radius_km: 1250.0,
            radius_km: 6367.0,
            materials: MaterialDensity::default(),
            ocean: ColumnTemplate::OCEAN,
            land: ColumnTemplate::LAND,
            rifting: ColumnTemplate::OCEAN,
            motion: MotionParams::default(),
            cycle: DurationPolicy::default(),
            speed_log_mean: 3.492,
            speed_log_std: 0.771,
            density_offset_std: 40.0,
            seed: 42,
        }
    }
}

impl WorldConfig {
    /// Set the grid point count.
    pub fn with_point_count(mut self, point_count: usize) -> Self {
        self.point_count = point_count;
        self
    }

    /// Set an explicit raster resolution.
    pub fn with_raster_dim(mut self, raster_dim: u32) -> Self {
        self.raster_dim = Some(raster_dim);
        self
    }

    /// Set the initial plate count.
    pub fn with_plates(mut self, plates: usize) -> Self {
        self.plates = plates;
        self
    }

    /// Set the split threshold.
    pub fn with_target_plate_count(mut self, target: usize) -> Self {
        self.target_plate_count = target;
        self
    }

    /// Set the number of continental shields.
    pub fn with_continents(mut self, continents: usize) -> Self {
        self.continents = continents;
        self
    }

    /// Set the cycle duration policy.
    pub fn with_cycle(mut self, cycle: DurationPolicy) -> Self {
        self.cycle = cycle;
        self
    }

    /// Set motion parameters.
    pub fn with_motion(mut self, motion: MotionParams) -> Self {
        self.motion = motion;
        self
    }

    /// Set reference densities.
    pub fn with_materials(mut self, materials: MaterialDensity) -> Self {
        self.materials = materials;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check every field; construction refuses configs that fail here.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.point_count == 0 {
            return Err(ConfigError::NoPoints);
        }
        if self.plates == 0 {
            return Err(ConfigError::NoPlates);
        }
        if self.plates > self.point_count || self.plates > u16::MAX as usize {
            return Err(ConfigError::TooManyPlates { plates: self.plates, points: self.point_count });
        }
        if let Some(dim) = self.raster_dim {
            if dim < 2 {
                return Err(ConfigError::InvalidParameter { name: "raster_dim", value: dim as f64 });
            }
        }
        self.materials.validate()?;
        self.ocean.validate("ocean")?;
        self.land.validate("land")?;
        self.rifting.validate("rifting")?;
        self.motion.validate()?;
        self.cycle.validate()?;
        check_positive("radius_km", self.radius_km)?;
        check_non_negative("continent_radius_km", self.continent_radius_km)?;
        if !self.speed_log_mean.is_finite() {
            return Err(ConfigError::InvalidParameter { name: "speed_log_mean", value: self.speed_log_mean });
        }
        check_non_negative("speed_log_std", self.speed_log_std)?;
        check_non_negative("density_offset_std", self.density_offset_std)?;
        Ok(())
    }
}

pub(crate) fn check_positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}

fn check_non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(WorldConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_inverted_densities() {
        let cfg = WorldConfig::default()
            .with_materials(MaterialDensity { mantle: 2700.0, crust: 2700.0 });
        assert!(matches!(cfg.validate(), Err(ConfigError::DensityOrdering { .. })));
    }

    #[test]
    fn rejects_zero_points_and_plates() {
        assert_eq!(WorldConfig::default().with_point_count(0).validate(), Err(ConfigError::NoPoints));
        assert_eq!(WorldConfig::default().with_plates(0).validate(), Err(ConfigError::NoPlates));
    }
}
