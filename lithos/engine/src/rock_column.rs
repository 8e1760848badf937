//! Crust columns: thickness, density and isostatic elevation.
//!
//! Elevation is `t − t·ρ/ρ_mantle` (Airy isostasy above the mantle datum) and
//! is refreshed after every mutation.

use crate::config::MaterialDensity;

/// Columns thicker than this are continental (m).
pub const CONTINENTAL_THICKNESS_M: f64 = 17_000.0;

/// Errors from column arithmetic.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ColumnError {
    /// `crust − mantle` is zero or positive, so the sialic fraction is undefined.
    #[error("sialic fraction undefined: crust density {crust} is not below mantle density {mantle}")]
    DegenerateSialDensity {
        /// Sial density (kg/m³).
        crust: f64,
        /// Mantle density (kg/m³).
        mantle: f64,
    },
}

/// Which invariants [`RockColumn::sanitize`] had to repair.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ColumnViolations {
    /// Thickness was negative or not finite.
    pub thickness: bool,
    /// Density was non-positive or not finite.
    pub density: bool,
}

impl ColumnViolations {
    /// True when nothing was clamped.
    pub fn is_clean(&self) -> bool {
        !self.thickness && !self.density
    }
}

/// One vertical crust column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RockColumn {
    /// Surface elevation above the isostatic datum (m).
    pub elevation: f64,
    /// Crust thickness (m).
    pub thickness: f64,
    /// Mean crust density (kg/m³).
    pub density: f64,
}

/// Isostatic elevation of a column.
#[inline]
pub fn isostatic_elevation(thickness: f64, density: f64, mantle_density: f64) -> f64 {
    thickness - thickness * density / mantle_density
}

impl RockColumn {
    /// Column with the given values; elevation is taken as-is.
    pub fn new(elevation: f64, thickness: f64, density: f64) -> Self {
        Self { elevation, thickness, density }
    }

    /// Column with elevation derived from isostasy.
    pub fn with_isostasy(thickness: f64, density: f64, mantle_density: f64) -> Self {
        let mut c = Self::new(0.0, thickness, density);
        c.isostasy(mantle_density);
        c
    }

    /// Thick enough to float as continental crust.
    pub fn is_continental(&self) -> bool {
        self.thickness > CONTINENTAL_THICKNESS_M
    }

    /// Mass per unit area (kg/m²).
    pub fn mass(&self) -> f64 {
        self.thickness * self.density
    }

    /// Recompute elevation from thickness and density.
    pub fn isostasy(&mut self, mantle_density: f64) {
        self.elevation = isostatic_elevation(self.thickness, self.density, mantle_density);
    }

    /// Share of `other` that is buoyant sial: `(ρ_other − ρ_m)/(ρ_c − ρ_m)` in `[0, 1]`.
    pub fn sial_fraction(other: &RockColumn, materials: &MaterialDensity) -> Result<f64, ColumnError> {
        let denom = materials.crust - materials.mantle;
        if denom.is_nan() || denom >= 0.0 {
            return Err(ColumnError::DegenerateSialDensity { crust: materials.crust, mantle: materials.mantle });
        }
        Ok(((other.density - materials.mantle) / denom).clamp(0.0, 1.0))
    }

    /// Weld the sialic fraction of `other` onto this column and return the
    /// thickness gained. The remainder of `other` is left to subduct.
    pub fn accrete(&mut self, other: &RockColumn, materials: &MaterialDensity) -> Result<f64, ColumnError> {
        let fraction = Self::sial_fraction(other, materials)?;
        let gain = other.thickness.max(0.0) * fraction;
        let total = self.thickness + gain;
        if total > 0.0 {
            self.density = (self.thickness * self.density + gain * materials.crust) / total;
        }
        self.thickness = total;
        self.isostasy(materials.mantle);
        Ok(gain)
    }

    /// Pile `other` on top of this column, conserving mass.
    pub fn stack(&mut self, other: &RockColumn, mantle_density: f64) {
        let total = self.thickness + other.thickness;
        if total > 0.0 {
            self.density = (self.mass() + other.mass()) / total;
        }
        self.thickness = total;
        self.isostasy(mantle_density);
    }

    /// Clamp broken values back into range and report what was repaired.
    pub fn sanitize(&mut self, mantle_density: f64) -> ColumnViolations {
        let mut v = ColumnViolations::default();
        if !self.thickness.is_finite() || self.thickness < 0.0 {
            self.thickness = 0.0;
            v.thickness = true;
        }
        if !self.density.is_finite() || self.density <= 0.0 {
            self.density = mantle_density;
            v.density = true;
        }
        self.isostasy(mantle_density);
        v
    }
}
