use crate::core::merge::MergeOutcome;
use crate::domain::model::{
    Coordinate, Diagnostics, FallbackAttributes, FeasibilityRow, LookupReport, Overlays,
    SeppCompliance, SeppRuleResult,
};

const ADDRESS_PLACEHOLDER: &str = "Address TBC";
const OVERALL_RECOMMENDATION: &str = "Further due diligence";
const RECOMMENDATIONS: [&str; 3] = [
    "Obtain survey for precise setbacks/width/depth",
    "Run LMR/Housing SEPP variant with measured site geometry",
    "Confirm overlays with council GIS",
];

/// 組裝回應所需的所有輸入
#[derive(Debug, Clone)]
pub struct ReportParts<'a> {
    pub coordinate: Coordinate,
    pub requested_address: Option<&'a str>,
    pub provider_address: Option<&'a str>,
    pub merged: MergeOutcome,
    pub overlays: Overlays,
    pub point_diagnostics: Option<serde_json::Value>,
    pub arcgis_diagnostics: Option<FallbackAttributes>,
}

pub fn assemble(parts: ReportParts<'_>) -> LookupReport {
    let address = parts
        .requested_address
        .or(parts.provider_address)
        .unwrap_or(ADDRESS_PLACEHOLDER)
        .to_string();

    let MergeOutcome { summary, sources } = parts.merged;

    LookupReport {
        ok: true,
        address,
        coords: parts.coordinate,
        zoning: summary.zoning,
        fsr: summary.fsr,
        hob: summary.hob,
        overlays: parts.overlays,
        sepp_compliance: sepp_compliance(),
        feasibility: feasibility(),
        recommendations: RECOMMENDATIONS.iter().map(|r| r.to_string()).collect(),
        overall_recommendation: OVERALL_RECOMMENDATION.to_string(),
        diagnostics: Diagnostics {
            point: parts.point_diagnostics,
            arcgis: parts.arcgis_diagnostics,
            sources,
        },
    }
}

fn rule(label: &str, pass: bool, details: Option<&str>) -> SeppRuleResult {
    SeppRuleResult {
        label: label.to_string(),
        pass,
        details: details.map(String::from),
    }
}

/// Placeholder rule outcomes; nothing here is evaluated against the site.
pub fn sepp_compliance() -> SeppCompliance {
    SeppCompliance {
        duplex: vec![rule("Front setback meets control", true, Some("placeholder"))],
        townhouse: vec![rule("Landscaping % achieved", false, Some("calc pending"))],
        manor: vec![rule("Solar access 2hrs", false, None)],
        rfb: vec![
            rule("ADG 3F-1 separation", false, None),
            rule("Rear setback ≥ 6m", false, None),
        ],
    }
}

pub fn feasibility() -> Vec<FeasibilityRow> {
    ["Duplex", "RFB 3F"]
        .into_iter()
        .map(|option| FeasibilityRow {
            option: option.to_string(),
            gdv: None,
            build_cost: None,
            margin: None,
            margin_pct: None,
            notes: Some("placeholder".to_string()),
        })
        .collect()
}
