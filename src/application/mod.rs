//! Application layer: the three public entry points (`parse`, `resolve`,
//! `project`) that orchestrate the domain and infrastructure layers.

mod catalog_service;
mod parse_service;

pub use catalog_service::project;
pub use parse_service::{file_variables, parse};
