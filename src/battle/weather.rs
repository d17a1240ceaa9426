//! Battlefield weather

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Current weather condition. Battles open sunny.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Weather {
    #[default]
    Sunny,
    Rain,
    Cloudy,
    Storm,
}

impl Weather {
    pub fn all() -> [Weather; 4] {
        [Weather::Sunny, Weather::Rain, Weather::Cloudy, Weather::Storm]
    }

    /// Uniform draw over all conditions
    pub fn random(rng: &mut impl Rng) -> Self {
        Self::all()[rng.gen_range(0..4)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_default_is_sunny() {
        assert_eq!(Weather::default(), Weather::Sunny);
    }

    #[test]
    fn test_random_covers_all() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let seen: Vec<Weather> = (0..200).map(|_| Weather::random(&mut rng)).collect();
        for w in Weather::all() {
            assert!(seen.contains(&w), "{w:?} never drawn");
        }
    }
}
