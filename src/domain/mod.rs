//! Domain layer: plain data and the ports (traits) infrastructure adapts.
//!
//! IMPORTANT: modules here must stay free of concrete infrastructure —
//! no `chrono::Utc::now()`, no `rand::rng()`, no filesystem access. Each
//! capability the domain needs from the outside world is a trait; the
//! `infrastructure` module provides the adapters.

pub mod cancellation;
pub mod clock;
pub mod diagnostics;
pub mod model;
pub mod prior_results;
pub mod random;
pub mod variable_store;

pub use cancellation::{CancellationToken, NeverCancelled};
pub use clock::Clock;
pub use diagnostics::{Diagnostic, DiagnosticKind, sort_diagnostics};
pub use model::{Body, Catalog, ExpectedResponse, Request, SourcePosition, TestCase};
pub use prior_results::{InMemoryPriorResults, PriorResultsProvider, RecordedResponse, ResponseField};
pub use random::RandomSource;
pub use variable_store::VariableStore;
