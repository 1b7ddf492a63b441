use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute mapping of a single upstream feature, provider specific.
pub type ProviderAttributes = serde_json::Map<String, serde_json::Value>;

/// WGS84 point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControlType {
    Zoning,
    Fsr,
    Hob,
}

impl ControlType {
    pub const ALL: [ControlType; 3] = [ControlType::Zoning, ControlType::Fsr, ControlType::Hob];

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlType::Zoning => "zoning",
            ControlType::Fsr => "fsr",
            ControlType::Hob => "hob",
        }
    }
}

/// zoning / FSR / HOB 三項規劃控制
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningSummary {
    pub zoning: Option<String>,
    pub fsr: Option<String>,
    pub hob: Option<String>,
}

impl PlanningSummary {
    pub fn get(&self, control: ControlType) -> Option<&String> {
        match control {
            ControlType::Zoning => self.zoning.as_ref(),
            ControlType::Fsr => self.fsr.as_ref(),
            ControlType::Hob => self.hob.as_ref(),
        }
    }

    pub fn set(&mut self, control: ControlType, value: Option<String>) {
        match control {
            ControlType::Zoning => self.zoning = value,
            ControlType::Fsr => self.fsr = value,
            ControlType::Hob => self.hob = value,
        }
    }

    /// 三個欄位皆為 null
    pub fn is_empty(&self) -> bool {
        self.zoning.is_none() && self.fsr.is_none() && self.hob.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overlays {
    pub bushfire: Option<String>,
    pub flood: Option<String>,
    pub heritage: Option<String>,
    pub easements: Option<String>,
}

/// Fields extracted from a successful primary provider response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrimaryAttributes {
    pub summary: PlanningSummary,
    pub overlays: Overlays,
    pub full_address: Option<String>,
    pub raw: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryOutcome {
    Found(PrimaryAttributes),
    /// 上游非成功回應或連線失敗；不會讓整個請求失敗
    Failed { status: Option<u16>, body: String },
}

impl PrimaryOutcome {
    pub fn summary(&self) -> Option<&PlanningSummary> {
        match self {
            PrimaryOutcome::Found(attrs) => Some(&attrs.summary),
            PrimaryOutcome::Failed { .. } => None,
        }
    }

    pub fn attributes(&self) -> Option<&PrimaryAttributes> {
        match self {
            PrimaryOutcome::Found(attrs) => Some(attrs),
            PrimaryOutcome::Failed { .. } => None,
        }
    }
}

/// Result of the three public layer queries. Failed layers resolve to null
/// and leave their error message behind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FallbackAttributes {
    #[serde(flatten)]
    pub summary: PlanningSummary,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldSource {
    Primary,
    Fallback,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldSources {
    pub zoning: Option<FieldSource>,
    pub fsr: Option<FieldSource>,
    pub hob: Option<FieldSource>,
}

impl FieldSources {
    pub fn set(&mut self, control: ControlType, source: Option<FieldSource>) {
        match control {
            ControlType::Zoning => self.zoning = source,
            ControlType::Fsr => self.fsr = source,
            ControlType::Hob => self.hob = source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeppRuleResult {
    pub label: String,
    pub pass: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeppCompliance {
    #[serde(rename = "Duplex")]
    pub duplex: Vec<SeppRuleResult>,
    #[serde(rename = "Townhouse")]
    pub townhouse: Vec<SeppRuleResult>,
    #[serde(rename = "Manor")]
    pub manor: Vec<SeppRuleResult>,
    #[serde(rename = "RFB")]
    pub rfb: Vec<SeppRuleResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeasibilityRow {
    pub option: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gdv: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Raw upstream material kept for operator inspection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arcgis: Option<FallbackAttributes>,
    pub sources: FieldSources,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupReport {
    pub ok: bool,
    pub address: String,
    pub coords: Coordinate,
    pub zoning: Option<String>,
    pub fsr: Option<String>,
    pub hob: Option<String>,
    pub overlays: Overlays,
    pub sepp_compliance: SeppCompliance,
    pub feasibility: Vec<FeasibilityRow>,
    pub recommendations: Vec<String>,
    pub overall_recommendation: String,
    pub diagnostics: Diagnostics,
}

/// Text form of an upstream attribute value. Null and empty strings count as absent.
pub fn attribute_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) if text.is_empty() => None,
        serde_json::Value::String(text) => Some(text.clone()),
        // f64 Display drops a zero fraction: 12.0 -> "12"
        serde_json::Value::Number(number) if number.is_f64() => {
            number.as_f64().map(|float| float.to_string())
        }
        other => Some(other.to_string()),
    }
}
