pub mod assembler;
pub mod coordinate;
pub mod lookup;
pub mod merge;

pub use crate::domain::model::{Coordinate, LookupReport, PlanningSummary};
pub use crate::domain::ports::{FallbackProvider, Geocoder, PrimaryProvider};
pub use crate::utils::error::Result;
