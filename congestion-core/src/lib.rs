//! Core library for the `congestion` CLI.
//!
//! This crate defines:
//! - Configuration of the Seoul Open API `citydata` service
//! - The congestion lookup pipeline: fetch, validate, parse, enrich
//! - A static coordinate registry for the areas the service covers
//! - Shared domain models and the error taxonomy
//!
//! It is used by `congestion-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod provider;
pub mod registry;

pub use config::ApiConfig;
pub use error::CongestionError;
pub use model::{CongestionLevel, CongestionRecord, Coordinates};
pub use provider::{CongestionProvider, citydata::SeoulCityDataProvider, provider_from_config};
