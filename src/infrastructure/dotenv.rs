//! The `.env` snapshot loader (A3) for `{{$dotenv NAME}}`.
//!
//! Uses `dotenvy`'s iterator API rather than its `dotenv()`/`from_path()`
//! entry points: those mutate the process environment globally, which would
//! violate the "read-only snapshot taken once per resolution session" rule
//! (spec §5).

use std::collections::BTreeMap;
use std::path::Path;

/// Parse the `.env` file at `path` into a snapshot map, without touching
/// `std::env`. Returns an empty map if the file doesn't exist or fails to
/// parse — a missing `.env` is normal, not an error condition worth
/// propagating through the diagnostic model.
#[must_use]
pub fn load_snapshot(path: &Path) -> BTreeMap<String, String> {
    match dotenvy::from_path_iter(path) {
        Ok(iter) => iter.filter_map(Result::ok).collect(),
        Err(_) => BTreeMap::new(),
    }
}

/// Parse the nearest `.env` file found by walking up from the current
/// working directory, the same discovery rule `dotenvy::dotenv()` uses.
#[must_use]
pub fn load_default_snapshot() -> BTreeMap<String, String> {
    match dotenvy::dotenv_iter() {
        Ok(iter) => iter.filter_map(Result::ok).collect(),
        Err(_) => BTreeMap::new(),
    }
}
