//! # Result Cards
//!
//! Turns a result payload into the [`Part`]s a [`Message`](super::message::Message)
//! draws. Sections are stacked top to bottom; the DC-bias card adds a
//! braille canvas with the L–I curve and the saturation crosshair.
//!
//! ```text
//! ╭ Result · DC Bias Analysis · 86% ─────────────────────────────╮
//! │ L vs DC Bias current                                         │
//! │ Saturation current  ~2.45 A                                  │
//! │ -20% (L = 0.80 * L0)                                         │
//! │ │⠉⠉⠉⠒⠒⠤⢄⣀    I@-20% = 2.37 A                                │
//! │ │        ⠉⠑⠢⢄ ⡇                                              │
//! │ │0.80*L0 ──────╯⠑⠤⣀                                          │
//! ╰──────────────────────────────────────────────────────────────╯
//! ```

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine, Points};
use ratatui::widgets::{Block, Borders, Widget};

use super::message::{Part, Row};
use crate::analysis::dc_bias::{Annotation, annotate};
use crate::analysis::{DutResult, GraphResult};
use crate::analysis::types::Tone;
use crate::core::format::format_number;
use crate::core::locale::{Locale, resolve_opt};

/// Rows taken by the DC-bias plot, axes included.
pub const CHART_HEIGHT: u16 = 12;

fn pick(locale: Locale, zh: &'static str, en: &'static str) -> &'static str {
    match locale {
        Locale::Zh => zh,
        Locale::En => en,
    }
}

fn section(title: &str) -> Row {
    Row::styled(
        title,
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    )
}

fn bullet(text: &str) -> Row {
    Row::new(format!("• {text}"))
}

fn confidence(value: f64, locale: Locale) -> String {
    let pct = (value * 100.0).round();
    match locale {
        Locale::Zh => format!("信心 {pct}%"),
        Locale::En => format!("{pct}% confidence"),
    }
}

/// Short kind label used in the message title.
pub fn dut_kind(locale: Locale) -> &'static str {
    pick(locale, "元件辨識", "Identified Component")
}

pub fn graph_kind(result: &GraphResult, locale: Locale) -> &'static str {
    if result.is_dc_bias() {
        pick(locale, "DC Bias 分析", "DC Bias Analysis")
    } else {
        pick(locale, "掃頻解析", "Sweep Interpretation")
    }
}

/// Keyboard hints for the actions that target the latest card.
pub fn action_row(locale: Locale) -> Row {
    Row::styled(
        pick(
            locale,
            "Ctrl+G 複製 JSON · Ctrl+Y 複製摘要 · Ctrl+T 插入摘要",
            "Ctrl+G Copy JSON · Ctrl+Y Copy summary · Ctrl+T Insert summary",
        ),
        Style::default().fg(Color::DarkGray),
    )
}

pub fn dut_parts(result: &DutResult, locale: Locale) -> Vec<Part> {
    let mut rows = Vec::new();

    let package = resolve_opt(result.package_guess.as_ref(), locale);
    let heading = if package.is_empty() {
        result.component_type.label().to_string()
    } else {
        format!("{} — {package}", result.component_type.label())
    };
    rows.push(Row::styled(
        heading,
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ));
    rows.push(Row::styled(
        confidence(result.confidence, locale),
        Style::default().fg(Color::DarkGray),
    ));

    if let Some(range) = &result.estimated_working_range {
        rows.push(Row::blank());
        rows.push(section(pick(locale, "工作範圍", "Working Range")));
        rows.push(Row::pair(
            pick(locale, "建議頻段", "Recommended frequency band"),
            range.recommended_frequency_band.resolve(locale),
        ));
        let srf = resolve_opt(range.srf_estimate.as_ref(), locale);
        if !srf.is_empty() {
            rows.push(Row::pair(pick(locale, "自振頻率估計", "Self-resonance estimate"), srf));
        }
        let notes = resolve_opt(range.notes.as_ref(), locale);
        if !notes.is_empty() {
            rows.push(Row::styled(notes, Style::default().fg(Color::Gray)));
        }
    }

    let setup = &result.recommended_setup;
    rows.push(Row::blank());
    rows.push(section(pick(locale, "建議設定", "Recommended Setup")));
    let params = setup
        .primary_params
        .iter()
        .map(|p| p.resolve(locale))
        .collect::<Vec<_>>()
        .join(", ");
    rows.push(Row::new(format!("{} — {params}", setup.mode.label())));
    if !setup.test_frequency_suggestions.is_empty() {
        rows.push(Row::styled(
            pick(locale, "測試頻率建議", "Test frequency suggestions"),
            Style::default().fg(Color::DarkGray),
        ));
        for s in &setup.test_frequency_suggestions {
            let rationale = resolve_opt(s.rationale.as_ref(), locale);
            let mut line = format!("{}: {}", s.label.resolve(locale), s.value.resolve(locale));
            if !rationale.is_empty() {
                line.push_str(&format!(" ({rationale})"));
            }
            rows.push(bullet(&line));
        }
    }
    for (label, value) in [
        (pick(locale, "測試電平", "Test level"), &setup.test_level),
        ("DC bias", &setup.dc_bias),
        (pick(locale, "治具", "Fixture"), &setup.fixture),
    ] {
        let value = resolve_opt(value.as_ref(), locale);
        if !value.is_empty() {
            rows.push(Row::pair(label, value));
        }
    }
    if !setup.compensation.is_empty() {
        let steps = setup
            .compensation
            .iter()
            .map(|c| c.resolve(locale))
            .collect::<Vec<_>>()
            .join(", ");
        rows.push(Row::pair(pick(locale, "補償", "Compensation"), steps));
    }

    if !result.what_to_confirm.is_empty() {
        rows.push(Row::blank());
        rows.push(section(pick(locale, "待確認事項", "What to Confirm")));
        rows.extend(result.what_to_confirm.iter().map(|q| bullet(q.resolve(locale))));
    }

    if !result.warnings.is_empty() {
        rows.push(Row::blank());
        rows.push(section(pick(locale, "注意事項", "Warnings")));
        rows.extend(result.warnings.iter().map(|w| {
            Row::styled(
                format!("⚠ {}", w.resolve(locale)),
                Style::default().fg(Color::Yellow),
            )
        }));
    }

    vec![Part::Rows(rows)]
}

fn tone_style(tone: Tone) -> Style {
    match tone {
        Tone::Warning => Style::default().fg(Color::Yellow),
        Tone::Info => Style::default().fg(Color::LightBlue),
        Tone::Default => Style::default().fg(Color::White),
    }
}

pub fn graph_parts(result: &GraphResult, locale: Locale, drop_percent: f64) -> Vec<Part> {
    let is_dc_bias = result.is_dc_bias();
    let mut rows = Vec::new();

    let title = resolve_opt(result.title.as_ref(), locale);
    rows.push(Row::styled(
        if title.is_empty() { result.graph_type_guess.as_str() } else { title },
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    ));
    rows.push(Row::styled(
        confidence(result.confidence, locale),
        Style::default().fg(Color::DarkGray),
    ));

    if let Some(f) = &result.resonance_frequency {
        rows.push(Row::pair(pick(locale, "共振頻率", "Resonance frequency"), f.as_str()));
    }
    if let Some(c) = &result.saturation_current {
        rows.push(Row::pair(pick(locale, "飽和電流", "Saturation current"), c.as_str()));
    }

    if !result.summary_cards.is_empty() {
        rows.push(Row::blank());
        for card in &result.summary_cards {
            let mut row = Row::pair(card.label.resolve(locale), card.value.resolve(locale));
            row.style = tone_style(card.tone);
            rows.push(row);
        }
    }

    if !result.recommended_measurement_band.is_empty() {
        let label = if is_dc_bias {
            pick(locale, "建議掃描範圍", "Recommended sweep range")
        } else {
            pick(locale, "有效擬合頻段", "Valid modeling band")
        };
        rows.push(Row::pair(label, result.recommended_measurement_band.as_str()));
    }
    let summary = resolve_opt(result.summary_text.as_ref(), locale);
    if !summary.is_empty() {
        rows.push(Row::pair(pick(locale, "摘要", "Summary"), summary));
    }

    if !result.detected_features.is_empty() {
        rows.push(Row::blank());
        rows.push(section(pick(locale, "偵測特徵", "Detected features")));
        for feature in &result.detected_features {
            let mut line = feature.feature.label().to_string();
            if let Some(f) = &feature.frequency {
                line.push_str(&format!(" @ {f}"));
            }
            if let Some(n) = &feature.notes {
                line.push_str(&format!(" — {n}"));
            }
            rows.push(bullet(&line));
        }
    }
    if !result.interpretation.is_empty() {
        rows.push(Row::blank());
        rows.push(section(pick(locale, "解讀", "Interpretation")));
        rows.extend(result.interpretation.iter().map(|i| bullet(i)));
    }
    if let Some(circuit) = &result.suggested_equivalent_circuit {
        rows.push(Row::pair(
            pick(locale, "建議等效電路", "Suggested equivalent circuit"),
            circuit.as_str(),
        ));
    }
    if !result.recommended_next_tests.is_empty() {
        rows.push(Row::blank());
        rows.push(section(pick(locale, "下一步測試", "Recommended next tests")));
        for t in &result.recommended_next_tests {
            rows.push(Row::new(format!("→ {} ({})", t.action, t.why)));
        }
    }

    let mut parts = Vec::new();
    let meta = result.dc_bias_meta.as_ref().filter(|_| is_dc_bias);
    let Some(meta) = meta else {
        parts.push(Part::Rows(rows));
        return parts;
    };

    if let Some(tc) = &meta.test_conditions {
        let conditions: Vec<String> = [
            tc.ac_level
                .as_ref()
                .map(|v| format!("{} {v}", pick(locale, "AC 電平", "AC test level"))),
            tc.sweep
                .as_ref()
                .map(|v| format!("{} {v}", pick(locale, "掃描", "Sweep"))),
            tc.frequency
                .as_ref()
                .map(|v| format!("{} {v}", pick(locale, "頻率", "Frequency"))),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !conditions.is_empty() {
            rows.push(Row::pair(
                pick(locale, "測試條件", "Testing conditions"),
                conditions.join(" · "),
            ));
        }
    }
    if let Some(knee) = &meta.knee_point {
        let unit = meta
            .axis_range
            .as_ref()
            .map(|a| a.current.unit.as_str())
            .unwrap_or("A");
        rows.push(Row::pair(
            pick(locale, "Knee 電流", "Knee current"),
            format!(
                "{} {unit} · {} {} {}",
                format_number(knee.current, 2),
                pick(locale, "L 值", "L value"),
                format_number(knee.inductance, 2),
                meta.l0.unit
            ),
        ));
    }

    match annotate(meta, drop_percent, &result.recommended_measurement_band) {
        Some(annotation) => {
            rows.push(Row::blank());
            rows.push(section(&annotation.header(locale)));
            parts.push(Part::Rows(rows));
            let mut curve: Vec<(f64, f64)> = meta
                .curve_points
                .iter()
                .map(|p| (p.current, p.inductance))
                .collect();
            // Plotted in ascending current.
            curve.sort_by(|a, b| a.0.total_cmp(&b.0));
            parts.push(Part::Chart(DcBiasChart {
                curve,
                knee: meta.knee_point.map(|k| (k.current, k.inductance)),
                annotation: annotation.clone(),
                locale,
            }));
            parts.push(Part::Rows(annotation_rows(&annotation, locale)));
        }
        None => {
            rows.push(Row::styled(
                pick(locale, "無法標註飽和點", "Saturation point unavailable"),
                Style::default().fg(Color::DarkGray),
            ));
            parts.push(Part::Rows(rows));
        }
    }
    parts
}

fn annotation_rows(annotation: &Annotation, locale: Locale) -> Vec<Row> {
    vec![
        Row::styled(annotation.current_label(locale), Style::default().fg(Color::Yellow)),
        Row::styled(annotation.inductance_label(), Style::default().fg(Color::Yellow)),
        Row::styled(
            format!(
                "{} = {} {}",
                pick(locale, "L0 參考", "L0 reference"),
                format_number(annotation.l0, 2),
                annotation.l0_unit
            ),
            Style::default().fg(Color::DarkGray),
        ),
    ]
}

/// L vs I plot with the drop crosshair.
#[derive(Debug, Clone, PartialEq)]
pub struct DcBiasChart {
    pub curve: Vec<(f64, f64)>,
    pub knee: Option<(f64, f64)>,
    pub annotation: Annotation,
    pub locale: Locale,
}

impl Widget for &DcBiasChart {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let a = &self.annotation;
        let (x0, x1) = (a.current_axis.min, a.current_axis.effective_max());
        let (y0, y1) = (a.inductance_axis.min, a.inductance_axis.effective_max());
        let marker_style = Style::default().fg(Color::Yellow);
        let current_label = a.current_label(self.locale);
        let inductance_label = a.inductance_label();
        let axis_label = format!(
            "{}–{} {} / {}–{} {}",
            format_number(x0, 1),
            format_number(x1, 1),
            a.current_axis.unit,
            format_number(y0, 1),
            format_number(y1, 1),
            a.inductance_axis.unit,
        );

        Canvas::default()
            .block(
                Block::default()
                    .borders(Borders::LEFT | Borders::BOTTOM)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title_bottom(Span::styled(axis_label, Style::default().fg(Color::DarkGray))),
            )
            .marker(Marker::Braille)
            .x_bounds([x0, x1])
            .y_bounds([y0, y1])
            .paint(|ctx| {
                for pair in self.curve.windows(2) {
                    let (p, q) = (pair[0], pair[1]);
                    ctx.draw(&CanvasLine::new(p.0, p.1, q.0, q.1, Color::Cyan));
                }
                if let Some(knee) = self.knee {
                    ctx.draw(&Points {
                        coords: &[knee],
                        color: Color::Magenta,
                    });
                }
                ctx.layer();
                ctx.draw(&CanvasLine::new(a.current, y0, a.current, a.target_inductance, Color::Yellow));
                ctx.draw(&CanvasLine::new(x0, a.target_inductance, a.current, a.target_inductance, Color::Yellow));
                ctx.print(a.current, y1, Span::styled(current_label.clone(), marker_style));
                ctx.print(x0, a.target_inductance, Span::styled(inductance_label.clone(), marker_style));
            })
            .render(area, buf);
    }
}
