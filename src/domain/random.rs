//! Port for the injected randomness capability (spec §4.6 "Determinism hook").

use uuid::Uuid;

/// A source of randomness, injected so tests can pin RNG output.
pub trait RandomSource: Send + Sync {
    /// Generate a random v4 UUID for `{{$guid}}`.
    fn guid(&self) -> Uuid;

    /// Draw an integer uniformly from `[min, max)` for `{{$randomInt min max}}`.
    ///
    /// Callers must ensure `min < max`; implementations may panic otherwise,
    /// since the caller (`system_vars::evaluate`) already validates that.
    fn random_int(&self, min: i64, max_exclusive: i64) -> i64;
}
