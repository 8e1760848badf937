//! Lithos engine: rigid crustal plates on a unit sphere.
//!
//! Plates carry columns of crust over a shared Fibonacci grid, rotate about
//! Euler poles under buoyancy-driven torque, subduct and accrete where they
//! overlap, dock when continents meet and split on a supercontinent cycle.
#![deny(missing_docs)]
#![deny(clippy::unwrap_used, clippy::expect_used, clippy::dbg_macro, clippy::large_enum_variant)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod cell;
pub mod collision;
pub mod config;
pub mod coverage;
pub mod force_balance;
pub mod geo;
pub mod grid;
pub mod plate;
pub mod rifting;
pub mod rock_column;
pub mod rotation;
pub mod snapshot;
pub mod subduction;
pub mod supercontinent;
pub mod world;

pub use cell::{Cell, CellContent, CellRef, PlateId};
pub use collision::{CollisionResolver, CollisionStats, Decision};
pub use config::{ColumnTemplate, ConfigError, MaterialDensity, MotionParams, WorldConfig};
pub use grid::{generate_points, GridError, GridPoint, SpatialIndex, SphereGrid};
pub use plate::Plate;
pub use rock_column::{ColumnError, RockColumn};
pub use rotation::Rotation;
pub use snapshot::{ColumnRecord, CycleState, PlateState, WorldState};
pub use supercontinent::{DurationPolicy, SupercontinentCycle};
pub use world::{Clock, StepStats, World, WorldError};

/// Returns the engine version string from Cargo metadata.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
