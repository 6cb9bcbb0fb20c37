//! One-line summaries of result payloads.
//!
//! Used by "copy summary" and "insert summary". Both are localized through
//! the same [`LocalizedText::resolve`](crate::core::locale::LocalizedText::resolve)
//! rule the cards use, so what is copied always matches what is shown.

use super::types::{DutResult, GraphResult};
use crate::core::format::join_present;
use crate::core::locale::{Locale, resolve_opt};

/// `{type}[ ({package})]. Recommended band: {band}. Mode: {mode}. Primary: {p1, p2}.`
pub fn dut_summary(result: &DutResult, locale: Locale) -> String {
    let package = resolve_opt(result.package_guess.as_ref(), locale);
    let package = if package.is_empty() {
        String::new()
    } else {
        format!(" ({package})")
    };

    let band = result
        .estimated_working_range
        .as_ref()
        .map(|r| r.recommended_frequency_band.resolve(locale))
        .filter(|b| !b.is_empty())
        .unwrap_or("—");

    let setup = &result.recommended_setup;
    let primary = setup
        .primary_params
        .iter()
        .take(2)
        .map(|p| p.resolve(locale))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{}{package}. Recommended band: {band}. Mode: {}. Primary: {primary}.",
        result.component_type.label(),
        setup.mode.label(),
    )
}

/// Title (or graph type), resonance, saturation and free summary text,
/// joined with `". "` and skipping whichever are absent.
pub fn graph_summary(result: &GraphResult, locale: Locale) -> String {
    let title = resolve_opt(result.title.as_ref(), locale);
    let heading = if title.is_empty() {
        result.graph_type_guess.clone()
    } else {
        title.to_string()
    };

    let resonance = result.resonance_frequency.as_deref().map(|f| match locale {
        Locale::Zh => format!("共振頻率 {f}"),
        Locale::En => format!("Resonance {f}"),
    });
    let saturation = result.saturation_current.as_deref().map(|c| match locale {
        Locale::Zh => format!("飽和電流 {c}"),
        Locale::En => format!("Saturation {c}"),
    });
    let text = resolve_opt(result.summary_text.as_ref(), locale);

    join_present(
        [
            Some(heading.as_str()),
            resonance.as_deref(),
            saturation.as_deref(),
            Some(text),
        ],
        ". ",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::mock::canned_reply;
    use crate::analysis::types::AnalysisResult;
    use crate::core::locale::LocalizedText;
    use crate::core::types::AnalysisMode;

    fn dut() -> DutResult {
        match canned_reply(AnalysisMode::IdentifyDut).result {
            AnalysisResult::ComponentIdentification(dut) => *dut,
            other => panic!("unexpected fixture: {other:?}"),
        }
    }

    fn graph(mode: AnalysisMode) -> GraphResult {
        match canned_reply(mode).result {
            AnalysisResult::GraphInterpretation(graph) => *graph,
            other => panic!("unexpected fixture: {other:?}"),
        }
    }

    #[test]
    fn test_dut_summary_shape() {
        let summary = dut_summary(&dut(), Locale::En);
        assert!(summary.starts_with("Inductor ("));
        assert!(summary.contains(". Recommended band: "));
        assert!(summary.contains(". Mode: Series. Primary: "));
        assert!(summary.ends_with('.'));
    }

    #[test]
    fn test_dut_summary_without_band_uses_dash() {
        let mut result = dut();
        result.estimated_working_range = None;
        result.package_guess = None;
        let summary = dut_summary(&result, Locale::En);
        assert!(summary.starts_with("Inductor. Recommended band: —."));
    }

    #[test]
    fn test_dut_summary_takes_two_primary_params() {
        let mut result = dut();
        result.recommended_setup.primary_params =
            vec!["Ls".into(), "Q".into(), LocalizedText::from("Rdc")];
        let summary = dut_summary(&result, Locale::En);
        assert!(summary.ends_with("Primary: Ls, Q."));
    }

    #[test]
    fn test_graph_summary_localizes_resonance() {
        let result = graph(AnalysisMode::InterpretGraph);
        let en = graph_summary(&result, Locale::En);
        let zh = graph_summary(&result, Locale::Zh);
        assert!(en.contains("Resonance "));
        assert!(zh.contains("共振頻率 "));
    }

    #[test]
    fn test_graph_summary_skips_missing_parts() {
        let mut result = graph(AnalysisMode::InterpretGraph);
        result.title = None;
        result.resonance_frequency = None;
        result.saturation_current = None;
        result.summary_text = None;
        assert_eq!(graph_summary(&result, Locale::En), result.graph_type_guess);
    }

    #[test]
    fn test_dc_bias_summary_mentions_saturation() {
        let result = graph(AnalysisMode::DcBiasSaturation);
        let summary = graph_summary(&result, Locale::En);
        assert!(summary.contains("Saturation ~2.45 A"));
        assert!(!summary.contains("Resonance"));
    }
}
