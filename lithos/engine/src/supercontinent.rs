//! Supercontinent cycle timer.
//!
//! The cycle starts due (`age = duration`). Each `update` ages it; reaching the
//! duration fires a restart, which resets the age and redraws the duration.
//! The world reacts to a fire by splitting its largest plate.

use rand::Rng;

use crate::config::{check_positive, ConfigError};

/// Relative slack on `age ≥ duration` so summed float timesteps still fire on time.
const FIRE_TOLERANCE: f64 = 1e-9;

/// How a cycle duration is chosen (Myr).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DurationPolicy {
    /// Always the same duration.
    Fixed(f64),
    /// Uniform draw from `[min, max]`.
    Uniform {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
}

impl Default for DurationPolicy {
    fn default() -> Self {
        DurationPolicy::Fixed(150.0)
    }
}

impl DurationPolicy {
    /// Draw a duration.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            DurationPolicy::Fixed(d) => d,
            DurationPolicy::Uniform { min, max } if max > min => rng.gen_range(min..=max),
            DurationPolicy::Uniform { min, .. } => min,
        }
    }

    /// Durations must be positive and finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            DurationPolicy::Fixed(d) => check_positive("cycle.duration", d),
            DurationPolicy::Uniform { min, max } => {
                if min.is_finite() && max.is_finite() && min > 0.0 && max >= min {
                    Ok(())
                } else {
                    Err(ConfigError::InvalidDuration { min, max })
                }
            }
        }
    }
}

/// Cycle state `{age, duration}` in Myr.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SupercontinentCycle {
    age: f64,
    duration: f64,
    policy: DurationPolicy,
}

impl SupercontinentCycle {
    /// A cycle that is due immediately.
    pub fn new<R: Rng + ?Sized>(policy: DurationPolicy, rng: &mut R) -> Self {
        let duration = policy.draw(rng);
        Self { age: duration, duration, policy }
    }

    /// Rebuild persisted state; requires `0 ≤ age ≤ duration`.
    pub fn restore(age: f64, duration: f64, policy: DurationPolicy) -> Result<Self, ConfigError> {
        policy.validate()?;
        check_positive("cycle.duration", duration)?;
        if !age.is_finite() || age < 0.0 || age > duration {
            return Err(ConfigError::InvalidParameter { name: "cycle.age", value: age });
        }
        Ok(Self { age, duration, policy })
    }

    /// Time since the last restart (Myr).
    pub fn age(&self) -> f64 {
        self.age
    }

    /// Current cycle length (Myr).
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Duration policy.
    pub fn policy(&self) -> DurationPolicy {
        self.policy
    }

    /// Whether the next update fires regardless of timestep.
    pub fn is_due(&self) -> bool {
        self.age + FIRE_TOLERANCE * self.duration >= self.duration
    }

    /// Age by `timestep`; returns true when a restart fired.
    pub fn update<R: Rng + ?Sized>(&mut self, timestep: f64, rng: &mut R) -> bool {
        self.age += timestep;
        if self.is_due() {
            self.restart(rng);
            return true;
        }
        false
    }

    /// Reset the age and redraw the duration.
    pub fn restart<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.age = 0.0;
        self.duration = self.policy.draw(rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn uniform_draws_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let policy = DurationPolicy::Uniform { min: 100.0, max: 200.0 };
        for _ in 0..100 {
            let d = policy.draw(&mut rng);
            assert!((100.0..=200.0).contains(&d));
        }
    }

    #[test]
    fn restore_rejects_age_past_duration() {
        assert!(SupercontinentCycle::restore(151.0, 150.0, DurationPolicy::default()).is_err());
        assert!(SupercontinentCycle::restore(-1.0, 150.0, DurationPolicy::default()).is_err());
        let c = SupercontinentCycle::restore(20.0, 150.0, DurationPolicy::default()).unwrap();
        assert_eq!(c.age(), 20.0);
    }
}
