//! The production `RandomSource` adapter (A2): `uuid` v4 for GUIDs, `rand`
//! for integer draws. Tests should inject a fixed `RandomSource` instead.

use rand::RngExt;
use uuid::Uuid;

use crate::domain::RandomSource;

/// Draws from the process-wide thread RNG and generates real v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn guid(&self) -> Uuid {
        Uuid::new_v4()
    }

    fn random_int(&self, min: i64, max_exclusive: i64) -> i64 {
        rand::rng().random_range(min..max_exclusive)
    }
}
