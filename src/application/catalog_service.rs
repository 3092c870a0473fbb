//! The `project` entry point. Thin on purpose: `Catalog` already *is* an
//! ordered sequence of `TestCase`s by construction (the projection from
//! `Request` to `TestCase` happens during `parse`, inside C8), so this just
//! hands back its iterator.

use crate::domain::{Catalog, TestCase};

/// Iterate a catalog's test cases in source order.
pub fn project(catalog: &Catalog) -> impl Iterator<Item = &TestCase> {
    catalog.iter()
}
