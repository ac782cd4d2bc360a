//! Measurement instrument contract and simulated potentiostat

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::BenchError;

/// Electrochemical features the station can measure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    /// Open circuit potential
    Ocp,
    /// Cyclic voltammetry
    Cv,
    /// Chronoamperometry
    Ca,
}

impl Feature {
    pub fn label(&self) -> &'static str {
        match self {
            Feature::Ocp => "OCP",
            Feature::Cv => "CV",
            Feature::Ca => "CA",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Feature::Ocp | Feature::Cv => "V",
            Feature::Ca => "A",
        }
    }
}

/// Narrow imperative contract for the measurement device: run one
/// measurement on the sample currently at the station, return the
/// numeric reading.
pub trait Potentiostat {
    fn measure(&mut self, feature: Feature) -> Result<f64, BenchError>;
}

/// Simulated potentiostat returning pseudo-random readings in [0, 1)
pub struct SimulatedPotentiostat {
    rng: ChaCha8Rng,
}

impl SimulatedPotentiostat {
    /// A fixed `seed` makes the reading sequence reproducible across runs
    pub fn new(seed: Option<u64>) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(seed.unwrap_or_else(rand::random));
        Self { rng }
    }
}

impl Potentiostat for SimulatedPotentiostat {
    fn measure(&mut self, feature: Feature) -> Result<f64, BenchError> {
        let value: f64 = self.rng.gen_range(0.0..1.0);
        tracing::info!(
            "{} measurement done: {:.3} {}",
            feature.label(),
            value,
            feature.unit()
        );
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_readings_are_deterministic() {
        let mut a = SimulatedPotentiostat::new(Some(42));
        let mut b = SimulatedPotentiostat::new(Some(42));
        for _ in 0..3 {
            assert_eq!(
                a.measure(Feature::Ocp).unwrap(),
                b.measure(Feature::Ocp).unwrap()
            );
        }
    }

    #[test]
    fn test_readings_stay_in_range() {
        let mut cell = SimulatedPotentiostat::new(Some(7));
        for _ in 0..100 {
            let v = cell.measure(Feature::Cv).unwrap();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_feature_labels_and_units() {
        assert_eq!(Feature::Ocp.label(), "OCP");
        assert_eq!(Feature::Ca.unit(), "A");
        assert_eq!(Feature::Cv.unit(), "V");
    }
}
