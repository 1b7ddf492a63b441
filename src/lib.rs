pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::ServiceConfig;
pub use core::{coordinate::LookupQuery, lookup::PlanningLookup};
pub use domain::model::{Coordinate, LookupReport, PlanningSummary};
pub use utils::error::{LookupError, Result};
