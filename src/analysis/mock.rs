//! Canned analysis replies.
//!
//! [`MockProvider`] waits for a fixed "typing" delay and returns the fixture
//! for the request's mode. The payloads are representative of what a vision
//! service would return for a TDK power inductor photo, an impedance sweep
//! and an L vs DC-bias curve.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use super::dc_bias::DEFAULT_DROP_PERCENT;
use super::provider::{AnalysisError, AnalysisProvider, AnalysisRequest};
use super::types::*;
use crate::core::locale::LocalizedText;
use crate::core::types::AnalysisMode;

/// Delay before a canned reply is delivered.
pub const DEFAULT_TYPING_DELAY: Duration = Duration::from_millis(800);

pub struct MockProvider {
    delay: Duration,
}

impl MockProvider {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(DEFAULT_TYPING_DELAY)
    }
}

#[async_trait]
impl AnalysisProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisReply, AnalysisError> {
        debug!(
            "mock analysis for thread {} ({:?}, {} image(s))",
            request.thread_id,
            request.mode,
            request.images.len()
        );
        tokio::time::sleep(self.delay).await;
        Ok(canned_reply(request.mode))
    }
}

/// The fixed reply for `mode`.
pub fn canned_reply(mode: AnalysisMode) -> AnalysisReply {
    match mode {
        AnalysisMode::IdentifyDut => AnalysisReply {
            text: LocalizedText::both(
                "已辨識元件類型，可由照片/編號對照資料表，並提供建議量測設定與日常 working range。",
                "Component identified. Cross-check the marking against the datasheet; suggested setup and daily working range below.",
            ),
            result: AnalysisResult::ComponentIdentification(Box::new(tdk_inductor())),
        },
        AnalysisMode::InterpretGraph => AnalysisReply {
            text: LocalizedText::both(
                "此掃頻圖適合等效電路分析，已整理 2/3/4 元件模型建議。",
                "This sweep suits equivalent-circuit fitting. 2/3/4-element model suggestions below.",
            ),
            result: AnalysisResult::GraphInterpretation(Box::new(equivalent_circuit())),
        },
        AnalysisMode::DcBiasSaturation => AnalysisReply {
            text: LocalizedText::both(
                "已解析 L–I 曲線，並標示電感下降 20% 的飽和電流。",
                "L vs DC-bias curve parsed. The current at a 20% inductance drop is marked below.",
            ),
            result: AnalysisResult::GraphInterpretation(Box::new(dc_bias_saturation())),
        },
    }
}

fn text(value: &str) -> LocalizedText {
    LocalizedText::from(value)
}

fn suggestion(label: (&str, &str), value: &str, rationale: (&str, &str)) -> FrequencySuggestion {
    FrequencySuggestion {
        label: LocalizedText::both(label.0, label.1),
        value: text(value),
        rationale: Some(LocalizedText::both(rationale.0, rationale.1)),
    }
}

fn tdk_inductor() -> DutResult {
    DutResult {
        component_type: ComponentType::Inductor,
        confidence: 0.83,
        package_guess: Some(LocalizedText::both(
            "TDK SMD 功率電感（偵測到標記，4.7–10 µH 級）",
            "TDK SMD power inductor (marking detected, 4.7–10 µH class)",
        )),
        estimated_working_range: Some(WorkingRange {
            recommended_frequency_band: LocalizedText::both(
                "20 kHz – 300 kHz（日常），驗證至 1 MHz",
                "20 kHz – 300 kHz (daily), validate to 1 MHz",
            ),
            srf_estimate: Some(LocalizedText::both(
                "約 15–40 MHz（依封裝等級估計）",
                "~15–40 MHz (estimate from package class)",
            )),
            notes: Some(LocalizedText::both(
                "日常工作範圍：20–300 kHz、0.2–0.5 Vrms、環境 25°C。料號或標記可修正 SRF 與 DCR，請以掃頻確認。",
                "Daily working range: 20–300 kHz, 0.2–0.5 Vrms, ambient 25°C. Part number/marking can refine SRF & DCR; confirm with a sweep.",
            )),
        }),
        recommended_setup: RecommendedSetup {
            mode: MeasurementMode::Series,
            primary_params: vec![text("Ls-Rs"), text("Q"), text("|Z|")],
            test_frequency_suggestions: vec![
                suggestion(("主要", "Primary"), "100 kHz", ("典型電源轉換", "typical power conversion")),
                suggestion(("掃頻", "Sweep"), "10 kHz – 2 MHz", ("擷取 SRF 與 L(f)", "capture SRF and L(f)")),
                suggestion(("DC 偏壓", "DC bias"), "0 A → rated current step", ("飽和檢查", "saturation check")),
            ],
            test_level: Some(LocalizedText::both(
                "0.2–0.5 Vrms（若發熱或飽和請降低）",
                "0.2–0.5 Vrms (reduce if heating/saturation observed)",
            )),
            dc_bias: Some(LocalizedText::both(
                "從 0 A 起，視需要掃至額定電流",
                "Start 0 A, sweep to rated current if applicable",
            )),
            fixture: Some(LocalizedText::both(
                "四端對 / Kelvin 夾具或 SMD 治具",
                "4-terminal pair / Kelvin clip or SMD fixture",
            )),
            compensation: vec![text("OPEN"), text("SHORT"), LocalizedText::both("LOAD（選用）", "LOAD (optional)")],
        },
        what_to_confirm: vec![
            LocalizedText::both(
                "照片標記（如 4R7）或確切 TDK 料號，以確認 SRF 與 DCR？",
                "Photo marking (e.g. 4R7) or exact TDK part number to confirm SRF and DCR?",
            ),
            LocalizedText::both("額定電流與最高工作溫度？", "Rated current and max operating temperature?"),
            LocalizedText::both("目標應用頻段？", "Target application frequency band?"),
        ],
        warnings: vec![
            LocalizedText::both("無法僅由照片推論額定電流。", "Cannot infer rated current from photo alone."),
            LocalizedText::both("SRF 為目視估計，請量測確認。", "SRF estimate is visual only; measure to confirm."),
        ],
    }
}

fn feature(kind: DetectedFeatureKind, frequency: &str, notes: &str) -> DetectedFeature {
    DetectedFeature {
        feature: kind,
        frequency: Some(frequency.to_string()),
        notes: Some(notes.to_string()),
    }
}

fn next_test(action: &str, why: &str) -> NextTest {
    NextTest {
        action: action.to_string(),
        why: why.to_string(),
    }
}

fn equivalent_circuit() -> GraphResult {
    GraphResult {
        graph_type_guess: "|Z| & phase sweep".to_string(),
        title: Some(LocalizedText::both("等效電路建議", "Equivalent circuit guidance")),
        confidence: 0.84,
        resonance_frequency: Some("~6.8 MHz".to_string()),
        saturation_current: None,
        summary_cards: vec![
            SummaryCard {
                label: LocalizedText::both("共振頻率", "Resonance"),
                value: text("~6.8 MHz"),
                tone: Tone::Info,
            },
            SummaryCard {
                label: LocalizedText::both("擬合頻段", "Fitting band"),
                value: text("0.1–3 MHz"),
                tone: Tone::Default,
            },
        ],
        summary_text: Some(LocalizedText::both(
            "建議以 2 元件 series Ls-Rs 起步",
            "Start with a 2-element series Ls-Rs fit",
        )),
        detected_features: vec![
            feature(DetectedFeatureKind::QPeak, "~4.2 MHz", "usable band"),
            feature(DetectedFeatureKind::Resonance, "~6.8 MHz", "phase crosses zero"),
            feature(DetectedFeatureKind::ParasiticDominant, "> ~10 MHz", "ESL dominates"),
        ],
        interpretation: vec![
            "建議先用 2 元件 series Ls-Rs 擬合 0.1–3 MHz。".to_string(),
            "若相位提前翻轉，改用 3 元件 (Ls-Rs + Cp) 模型。".to_string(),
            "若出現次級峰值，再升級到 4 元件 RLC 模型。".to_string(),
        ],
        recommended_next_tests: vec![
            next_test(
                "選擇模型複雜度（2/3/4 元件）並分頻段擬合",
                "提高參數穩定性並避免共振區域失真。",
            ),
            next_test("套用 OPEN/SHORT 補償", "移除治具寄生影響，讓等效電路更準確。"),
        ],
        recommended_measurement_band: "100 kHz – 5 MHz for fitting; avoid resonance peak".to_string(),
        source_image_url: None,
        dc_bias_meta: None,
        suggested_equivalent_circuit: Some(
            "建議電路：2 元件 series Ls-Rs 起步，必要時加入 Cp（3 元件），若有次峰則用 4 元件 RLC。"
                .to_string(),
        ),
    }
}

fn curve(samples: &[(f64, f64)]) -> Vec<CurvePoint> {
    samples
        .iter()
        .map(|&(current, inductance)| CurvePoint { current, inductance })
        .collect()
}

fn dc_bias_saturation() -> GraphResult {
    let curve_points = curve(&[
        (0.0, 10.0),
        (0.5, 9.95),
        (1.0, 9.8),
        (1.5, 9.5),
        (2.0, 8.9),
        (2.5, 7.9),
        (3.0, 7.0),
        (3.5, 6.2),
        (4.0, 5.6),
    ]);

    GraphResult {
        graph_type_guess: "L vs DC Bias current".to_string(),
        title: Some(LocalizedText::both("DC Bias 飽和電流", "DC bias saturation")),
        confidence: 0.88,
        resonance_frequency: None,
        saturation_current: Some("~2.45 A".to_string()),
        summary_cards: vec![
            SummaryCard {
                label: LocalizedText::both("L0", "L0"),
                value: text("10 µH"),
                tone: Tone::Default,
            },
            SummaryCard {
                label: LocalizedText::both("飽和電流 (-20%)", "Saturation (-20%)"),
                value: text("~2.45 A"),
                tone: Tone::Warning,
            },
        ],
        summary_text: Some(LocalizedText::both(
            "建議工作電流低於 2 A 以保留裕度",
            "Keep operating current below 2 A for margin",
        )),
        detected_features: vec![
            feature(DetectedFeatureKind::InductanceDrop, "~2.0 A", "knee, L starts falling"),
            feature(DetectedFeatureKind::InductanceDrop, "~2.45 A", "-20% from L0"),
        ],
        interpretation: vec![
            "L0 約 10 µH，2 A 前電感大致持平。".to_string(),
            "2 A 之後進入飽和區，電感快速下降。".to_string(),
            "以 -20% 準則，飽和電流約 2.45 A。".to_string(),
        ],
        recommended_next_tests: vec![
            next_test("在 1.5–3 A 區間加密 DC 偏壓步階", "更精準定位飽和點。"),
            next_test("於 25°C 與 85°C 重複量測", "飽和電流會隨溫度下降。"),
        ],
        recommended_measurement_band: "0 A – 4 A DC bias at 100 kHz".to_string(),
        source_image_url: None,
        dc_bias_meta: Some(DcBiasMeta {
            l0: Quantity {
                value: 10.0,
                unit: "µH".to_string(),
            },
            current_range: Some(AxisRange::new(0.0, 4.0, "A")),
            axis_range: Some(AxisRanges {
                current: AxisRange::new(0.0, 4.0, "A"),
                inductance: AxisRange::new(5.0, 10.5, "µH"),
            }),
            plot_area_pct: None,
            drop_points: vec![
                DropPoint { percent: 10.0, current: 2.05 },
                DropPoint { percent: DEFAULT_DROP_PERCENT, current: 2.45 },
                DropPoint { percent: 30.0, current: 3.0 },
            ],
            curve_points,
            test_conditions: Some(TestConditions {
                ac_level: Some("0.5 Vrms".to_string()),
                sweep: Some("0–4 A, 0.5 A step".to_string()),
                frequency: Some("100 kHz".to_string()),
            }),
            knee_point: Some(CurvePoint {
                current: 2.0,
                inductance: 8.9,
            }),
        }),
        suggested_equivalent_circuit: None,
    }
}
