// Adapters layer: concrete clients for the upstream providers.

pub mod arcgis;
pub mod http;
pub mod nominatim;
pub mod point;

pub use arcgis::ArcGisClient;
pub use nominatim::NominatimClient;
pub use point::PointClient;
