//! Port for the injected clock capability (spec §4.6 "Determinism hook").
//!
//! IMPORTANT: this module must have ZERO concrete-time dependencies beyond
//! the `chrono` types it hands back — the adapter that actually reads the
//! system clock lives in `infrastructure::system_clock`.

use chrono::{DateTime, Local, Utc};

/// A source of "now", injected so tests can pin time.
pub trait Clock: Send + Sync {
    /// The current UTC time.
    fn now_utc(&self) -> DateTime<Utc>;

    /// The current local time.
    fn now_local(&self) -> DateTime<Local>;
}
