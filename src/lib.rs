//! `httpfile-core` — a parser and resolver for `.http` request files.
//!
//! This crate turns `.http` source text into an ordered catalog of request
//! test cases, and resolves `{{...}}` templates (plain variables, prior
//! response references, and system functions like `$guid`/`$timestamp`)
//! against a caller-supplied context. It does not execute HTTP requests;
//! that is left to a caller that consumes the catalog this crate produces.
//!
//! The crate is split into three layers:
//!
//! - [`domain`] — plain data and the ports (`Clock`, `RandomSource`,
//!   `CancellationToken`, `PriorResultsProvider`) the rest of the crate is
//!   built against. Free of any concrete I/O.
//! - [`infrastructure`] — the line reader, classifier, parser, validator,
//!   and projector that make up the parsing pipeline, plus the concrete
//!   adapters (`SystemClock`, `SystemRandom`, `.env` loading) and the
//!   template resolver.
//! - [`application`] — the three public entry points: [`parse`], [`resolve`],
//!   and [`project`].
//!
//! # Example
//!
//! ```
//! use httpfile_core::{NeverCancelled, ResolutionContext, SystemClock, SystemRandom, VariableStore};
//!
//! let text = "# @name get-users\nGET {{host}}/users\n";
//! let catalog = httpfile_core::parse(text).expect("valid catalog");
//! let test_case = catalog.get("get-users").unwrap();
//!
//! let mut variables = VariableStore::default();
//! variables.define("host", "https://api.example.com");
//!
//! let clock = SystemClock;
//! let random = SystemRandom;
//! let env = Default::default();
//! let dotenv = Default::default();
//! let cancellation = NeverCancelled;
//! let ctx = ResolutionContext {
//!     variables: &variables,
//!     clock: &clock,
//!     random: &random,
//!     env_snapshot: &env,
//!     dotenv_snapshot: &dotenv,
//!     prior_results: None,
//!     cancellation: &cancellation,
//! };
//!
//! let mut diagnostics = Vec::new();
//! let url = httpfile_core::resolve(&test_case.request.url, &ctx, &mut diagnostics);
//! assert_eq!(url, "https://api.example.com/users");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{file_variables, parse, project};
pub use domain::{
    Body, CancellationToken, Catalog, Clock, Diagnostic, DiagnosticKind, ExpectedResponse,
    InMemoryPriorResults, NeverCancelled, PriorResultsProvider, RandomSource, RecordedResponse,
    Request, ResponseField, SourcePosition, TestCase, VariableStore,
};
pub use infrastructure::{ResolutionContext, SystemClock, SystemRandom, resolve};
