use crate::domain::model::Coordinate;
use crate::utils::error::{LookupError, Result};

/// Inbound query string: `?lat=..&lon=..&address=..`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LookupQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub address: Option<String>,
}

impl LookupQuery {
    /// 重複的鍵只取第一個值，未知的鍵忽略
    pub fn from_query_string(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        let pairs = url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes());

        for (key, value) in pairs {
            let slot = match key.as_ref() {
                "lat" => &mut query.lat,
                "lon" => &mut query.lon,
                "address" => &mut query.address,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        query
    }

    pub fn coordinate(&self) -> Result<Coordinate> {
        Coordinate::parse(self.lat.as_deref(), self.lon.as_deref())
    }

    /// 地址只用於顯示；空字串視為未提供
    pub fn display_address(&self) -> Option<&str> {
        self.address
            .as_deref()
            .map(str::trim)
            .filter(|address| !address.is_empty())
    }
}

impl Coordinate {
    pub fn parse(lat: Option<&str>, lon: Option<&str>) -> Result<Self> {
        let lat = lat.map(str::trim).filter(|value| !value.is_empty());
        let lon = lon.map(str::trim).filter(|value| !value.is_empty());

        let (Some(lat), Some(lon)) = (lat, lon) else {
            return Err(LookupError::invalid_input("lat/lon required"));
        };

        match (parse_degrees(lat), parse_degrees(lon)) {
            (Some(lat), Some(lon)) => Ok(Self { lat, lon }),
            _ => Err(LookupError::invalid_input("lat/lon must be numbers")),
        }
    }
}

// 不做範圍檢查，只要求有限數值
fn parse_degrees(value: &str) -> Option<f64> {
    value.parse::<f64>().ok().filter(|number| number.is_finite())
}
