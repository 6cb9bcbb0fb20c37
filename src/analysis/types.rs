//! Result payloads returned by an analysis provider.
//!
//! These are the contract a real vision service would fill. The mock
//! provider returns fixed instances of them.

use serde::{Deserialize, Serialize};

use crate::core::locale::LocalizedText;

// ── Component identification ────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComponentType {
    Inductor,
    Capacitor,
    Resistor,
    Unknown,
}

impl ComponentType {
    pub fn label(self) -> &'static str {
        match self {
            ComponentType::Inductor => "Inductor",
            ComponentType::Capacitor => "Capacitor",
            ComponentType::Resistor => "Resistor",
            ComponentType::Unknown => "Unknown",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeasurementMode {
    Series,
    Parallel,
}

impl MeasurementMode {
    pub fn label(self) -> &'static str {
        match self {
            MeasurementMode::Series => "Series",
            MeasurementMode::Parallel => "Parallel",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkingRange {
    pub recommended_frequency_band: LocalizedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub srf_estimate: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<LocalizedText>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FrequencySuggestion {
    pub label: LocalizedText,
    pub value: LocalizedText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<LocalizedText>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RecommendedSetup {
    pub mode: MeasurementMode,
    pub primary_params: Vec<LocalizedText>,
    pub test_frequency_suggestions: Vec<FrequencySuggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_level: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dc_bias: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixture: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compensation: Vec<LocalizedText>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DutResult {
    pub component_type: ComponentType,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_guess: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_working_range: Option<WorkingRange>,
    pub recommended_setup: RecommendedSetup,
    pub what_to_confirm: Vec<LocalizedText>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<LocalizedText>,
}

// ── Graph / sweep interpretation ────────────────────────────────────────────

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectedFeatureKind {
    Resonance,
    #[serde(rename = "Anti-resonance")]
    AntiResonance,
    #[serde(rename = "Q-peak")]
    QPeak,
    #[serde(rename = "ESR-min")]
    EsrMin,
    #[serde(rename = "Parasitic-dominant")]
    ParasiticDominant,
    #[serde(rename = "Noise/aliasing")]
    NoiseAliasing,
    #[serde(rename = "Inductance-drop")]
    InductanceDrop,
}

impl DetectedFeatureKind {
    pub fn label(self) -> &'static str {
        match self {
            DetectedFeatureKind::Resonance => "Resonance",
            DetectedFeatureKind::AntiResonance => "Anti-resonance",
            DetectedFeatureKind::QPeak => "Q-peak",
            DetectedFeatureKind::EsrMin => "ESR-min",
            DetectedFeatureKind::ParasiticDominant => "Parasitic-dominant",
            DetectedFeatureKind::NoiseAliasing => "Noise/aliasing",
            DetectedFeatureKind::InductanceDrop => "Inductance-drop",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DetectedFeature {
    pub feature: DetectedFeatureKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Default,
    Info,
    Warning,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SummaryCard {
    pub label: LocalizedText,
    pub value: LocalizedText,
    #[serde(default)]
    pub tone: Tone,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NextTest {
    pub action: String,
    pub why: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Quantity {
    pub value: f64,
    pub unit: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
    pub unit: String,
}

impl AxisRange {
    pub fn new(min: f64, max: f64, unit: &str) -> Self {
        Self {
            min,
            max,
            unit: unit.to_string(),
        }
    }

    /// Upper bound, widened by one unit when the range is degenerate.
    pub fn effective_max(&self) -> f64 {
        if self.max == self.min {
            self.min + 1.0
        } else {
            self.max
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AxisRanges {
    pub current: AxisRange,
    pub inductance: AxisRange,
}

/// Plot area inside the source image, as fractions of width/height.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PlotAreaPct {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct DropPoint {
    pub percent: f64,
    pub current: f64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct CurvePoint {
    pub current: f64,
    pub inductance: f64,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ac_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweep: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
}

/// Data needed to locate the saturation point on an L vs I curve.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DcBiasMeta {
    pub l0: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_range: Option<AxisRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub axis_range: Option<AxisRanges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_area_pct: Option<PlotAreaPct>,
    pub drop_points: Vec<DropPoint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub curve_points: Vec<CurvePoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_conditions: Option<TestConditions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knee_point: Option<CurvePoint>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GraphResult {
    pub graph_type_guess: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<LocalizedText>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resonance_frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation_current: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub summary_cards: Vec<SummaryCard>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_text: Option<LocalizedText>,
    pub detected_features: Vec<DetectedFeature>,
    pub interpretation: Vec<String>,
    pub recommended_next_tests: Vec<NextTest>,
    pub recommended_measurement_band: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dc_bias_meta: Option<DcBiasMeta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_equivalent_circuit: Option<String>,
}

impl GraphResult {
    /// Whether this result describes an L vs DC-bias saturation curve.
    pub fn is_dc_bias(&self) -> bool {
        self.graph_type_guess.to_lowercase().contains("dc bias")
            || (self.saturation_current.is_some() && self.resonance_frequency.is_none())
    }
}

/// The structured part of an assistant reply.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisResult {
    ComponentIdentification(Box<DutResult>),
    GraphInterpretation(Box<GraphResult>),
}

/// Everything an assistant turn appends: a text line and a result card.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AnalysisReply {
    pub text: LocalizedText,
    pub result: AnalysisResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_graph(guess: &str) -> GraphResult {
        GraphResult {
            graph_type_guess: guess.to_string(),
            title: None,
            confidence: 0.5,
            resonance_frequency: None,
            saturation_current: None,
            summary_cards: Vec::new(),
            summary_text: None,
            detected_features: Vec::new(),
            interpretation: Vec::new(),
            recommended_next_tests: Vec::new(),
            recommended_measurement_band: String::new(),
            source_image_url: None,
            dc_bias_meta: None,
            suggested_equivalent_circuit: None,
        }
    }

    #[test]
    fn test_is_dc_bias_by_guess() {
        assert!(bare_graph("L vs DC Bias current").is_dc_bias());
        assert!(!bare_graph("|Z| & phase sweep").is_dc_bias());
    }

    #[test]
    fn test_is_dc_bias_by_saturation_without_resonance() {
        let mut graph = bare_graph("L(I)");
        graph.saturation_current = Some("2.4 A".into());
        assert!(graph.is_dc_bias());
        graph.resonance_frequency = Some("6.8 MHz".into());
        assert!(!graph.is_dc_bias());
    }

    #[test]
    fn test_feature_kind_wire_names() {
        let json = serde_json::to_string(&DetectedFeatureKind::QPeak).unwrap();
        assert_eq!(json, r#""Q-peak""#);
        let kind: DetectedFeatureKind = serde_json::from_str(r#""Inductance-drop""#).unwrap();
        assert_eq!(kind, DetectedFeatureKind::InductanceDrop);
    }

    #[test]
    fn test_degenerate_axis_is_widened() {
        assert_eq!(AxisRange::new(2.0, 2.0, "A").effective_max(), 3.0);
        assert_eq!(AxisRange::new(0.0, 4.0, "A").effective_max(), 4.0);
    }
}
