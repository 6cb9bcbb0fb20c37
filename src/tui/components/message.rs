use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph, Widget};

use super::result_card::{self, CHART_HEIGHT, DcBiasChart};
use crate::core::composer::ImageHandles;
use crate::core::format::format_time;
use crate::core::locale::{Locale, labels};
use crate::core::types::{Message as ChatMessage, MessageBody};
use crate::tui::component::Component;

/// Horizontal padding (per side) between the border and text content.
const CONTENT_PAD_H: u16 = 1;
/// Total horizontal space consumed by borders (1 left + 1 right) and padding.
pub const HORIZONTAL_OVERHEAD: u16 = 2 + CONTENT_PAD_H * 2;
/// Total vertical space consumed by borders (1 top + 1 bottom).
pub const VERTICAL_OVERHEAD: u16 = 2;

/// Pulse intensity threshold above which the border transitions from normal to BOLD.
const PULSE_BOLD_THRESHOLD: f32 = 0.6;
/// Pulse intensity threshold above which the border transitions from DIM to normal.
const PULSE_NORMAL_THRESHOLD: f32 = 0.2;

/// Wrapping used both for height prediction and for drawing, so the two
/// always agree.
fn wrap_options(width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// One logical line of a card, optionally led by a dim label.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub label: Option<String>,
    pub text: String,
    pub style: Style,
}

impl Row {
    pub fn new(text: impl Into<String>) -> Self {
        Self::styled(text, Style::default())
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            label: None,
            text: text.into(),
            style,
        }
    }

    pub fn pair(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            text: text.into(),
            style: Style::default(),
        }
    }

    pub fn blank() -> Self {
        Self::new("")
    }

    /// Wrap to `width` columns. Never returns an empty vec.
    pub fn wrap(&self, width: u16) -> Vec<Line<'static>> {
        let full = match &self.label {
            Some(label) => format!("{label}  {}", self.text),
            None => self.text.clone(),
        };
        if full.is_empty() || width == 0 {
            return vec![Line::default()];
        }

        let label_style = Style::default().fg(Color::DarkGray);
        let mut lines: Vec<Line<'static>> = textwrap::wrap(&full, wrap_options(width))
            .into_iter()
            .enumerate()
            .map(|(i, segment)| match &self.label {
                // The label only ever starts the first wrapped line
                Some(label) if i == 0 && segment.starts_with(label.as_str()) => Line::from(vec![
                    Span::styled(label.clone(), label_style),
                    Span::styled(segment[label.len()..].to_string(), self.style),
                ]),
                _ => Line::from(Span::styled(segment.into_owned(), self.style)),
            })
            .collect();
        if lines.is_empty() {
            lines.push(Line::default());
        }
        lines
    }
}

/// A vertical slice of a message body.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Rows(Vec<Row>),
    Chart(DcBiasChart),
}

impl Part {
    fn height(&self, width: u16) -> u16 {
        match self {
            Part::Rows(rows) => rows.iter().map(|r| r.wrap(width).len() as u16).sum(),
            Part::Chart(_) => CHART_HEIGHT,
        }
    }
}

/// Per-frame context for turning a chat message into a widget.
pub struct MessageProps<'a> {
    pub locale: Locale,
    pub drop_percent: f64,
    pub handles: &'a ImageHandles,
    /// Whether the action hints are shown under this result card.
    pub show_actions: bool,
}

/// A single chat message: rounded border, role title, stacked parts.
///
/// Built fresh each frame from a core message, a typing placeholder or a
/// failure notice. [`height`](Self::height) wraps with the same options as
/// rendering, so the parent list can lay out scroll positions without
/// drawing anything.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub title: String,
    pub accent: Color,
    pub parts: Vec<Part>,
    /// Current pulse intensity (0.0 to 1.0) while the reply is pending.
    pub pulse_intensity: f32,
}

impl Message {
    pub fn from_chat(message: &ChatMessage, props: &MessageProps) -> Self {
        let labels = labels(props.locale);
        let time = format_time(message.created_at);
        let locale = props.locale;

        let (title, accent, parts) = match &message.body {
            MessageBody::UserText { text } => (
                format!("{} · {time}", labels.user),
                Color::Green,
                vec![Part::Rows(vec![Row::new(text.trim())])],
            ),
            MessageBody::UserImage {
                image_url, mode, ..
            } => {
                // Handles are released with their thread; fall back to the raw URL
                let name = props
                    .handles
                    .resolve(image_url)
                    .and_then(|p| p.file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| image_url.clone());
                (
                    format!("{} · {time}", labels.user),
                    Color::Green,
                    vec![Part::Rows(vec![Row::pair(
                        format!("[{}]", mode.badge()),
                        format!("▣ {name}"),
                    )])],
                )
            }
            MessageBody::AssistantText { text } => (
                format!("{} · {time}", labels.assistant),
                Color::Blue,
                vec![Part::Rows(vec![Row::new(text.resolve(locale))])],
            ),
            MessageBody::DutResult { result } => (
                format!("{} · {}", labels.result, result_card::dut_kind(locale)),
                Color::Magenta,
                result_card::dut_parts(result, locale),
            ),
            MessageBody::GraphResult { result } => (
                format!("{} · {}", labels.result, result_card::graph_kind(result, locale)),
                Color::Magenta,
                result_card::graph_parts(result, locale, props.drop_percent),
            ),
        };

        let mut parts = parts;
        if props.show_actions && message.is_result() {
            parts.push(Part::Rows(vec![Row::blank(), result_card::action_row(locale)]));
        }

        Self {
            title,
            accent,
            parts,
            pulse_intensity: 0.0,
        }
    }

    /// Placeholder shown while the thread waits for its reply.
    pub fn typing(locale: Locale, pulse_intensity: f32) -> Self {
        let labels = labels(locale);
        Self {
            title: labels.assistant.to_string(),
            accent: Color::Blue,
            parts: vec![Part::Rows(vec![Row::styled(
                labels.analyzing,
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            )])],
            pulse_intensity,
        }
    }

    pub fn failed(locale: Locale, error: &str) -> Self {
        let labels = labels(locale);
        Self {
            title: labels.assistant.to_string(),
            accent: Color::Red,
            parts: vec![Part::Rows(vec![Row::styled(
                format!("{}: {error} · {}", labels.failed, labels.retry_hint),
                Style::default().fg(Color::Red),
            )])],
            pulse_intensity: 0.0,
        }
    }

    /// Rows needed to draw this message at `width`, borders included.
    pub fn height(&self, width: u16) -> u16 {
        let content_width = width.saturating_sub(HORIZONTAL_OVERHEAD);
        if content_width == 0 {
            // Too narrow for borders and padding; still occupy a row
            return 1;
        }
        let body: u16 = self.parts.iter().map(|p| p.height(content_width)).sum();
        body.max(1) + VERTICAL_OVERHEAD
    }

    fn border_style(&self) -> Style {
        let mut style = Style::default().fg(self.accent).add_modifier(Modifier::DIM);
        // Three-phase breathing: DIM → normal → BOLD
        if self.pulse_intensity > PULSE_BOLD_THRESHOLD {
            style = style.remove_modifier(Modifier::DIM).add_modifier(Modifier::BOLD);
        } else if self.pulse_intensity > PULSE_NORMAL_THRESHOLD {
            style = style.remove_modifier(Modifier::DIM);
        }
        style
    }
}

impl Widget for &Message {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = self.border_style();
        let block = Block::bordered()
            .title(format!(" {} ", self.title))
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title_style(border_style.fg(self.accent))
            .padding(Padding::horizontal(CONTENT_PAD_H));
        let inner = block.inner(area);
        block.render(area, buf);

        let mut y = inner.y;
        for part in &self.parts {
            if y >= inner.bottom() {
                break;
            }
            let height = part.height(inner.width).min(inner.bottom() - y);
            let slot = Rect::new(inner.x, y, inner.width, height);
            match part {
                Part::Rows(rows) => {
                    let lines: Vec<Line> = rows.iter().flat_map(|r| r.wrap(inner.width)).collect();
                    Paragraph::new(lines).render(slot, buf);
                }
                Part::Chart(chart) => chart.render(slot, buf),
            }
            y += height;
        }
    }
}

impl Component for Message {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(&*self, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::canned_reply;
    use crate::analysis::AnalysisResult;
    use crate::core::types::AnalysisMode;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn props(handles: &ImageHandles) -> MessageProps<'_> {
        MessageProps {
            locale: Locale::En,
            drop_percent: 20.0,
            handles,
            show_actions: false,
        }
    }

    fn text_message(text: &str) -> ChatMessage {
        ChatMessage::new(MessageBody::UserText { text: text.into() })
    }

    fn render_to_string(message: &Message, width: u16) -> String {
        let height = message.height(width);
        let backend = TestBackend::new(width, height);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| f.render_widget(message, f.area()))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn row_wrap_never_empty() {
        assert_eq!(Row::blank().wrap(10).len(), 1);
        assert_eq!(Row::new("hello").wrap(0).len(), 1);
    }

    #[test]
    fn row_wrap_breaks_long_words() {
        // 12 chars at width 5 → "abcde" | "fghij" | "kl"
        assert_eq!(Row::new("abcdefghijkl").wrap(5).len(), 3);
    }

    #[test]
    fn row_label_is_styled_separately() {
        let lines = Row::pair("Band", "100 kHz").wrap(40);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].spans[0].content, "Band");
        assert_eq!(lines[0].spans[1].content, "  100 kHz");
    }

    #[test]
    fn height_single_line_fits() {
        let handles = ImageHandles::default();
        let message = Message::from_chat(&text_message("Hello"), &props(&handles));
        assert_eq!(message.height(80), 1 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn height_wraps_at_width_boundary() {
        let handles = ImageHandles::default();
        let message = Message::from_chat(&text_message("Hello world"), &props(&handles));
        // content width 9 - 4 = 5 → "Hello" | "world"
        assert_eq!(message.height(9), 2 + VERTICAL_OVERHEAD);
    }

    #[test]
    fn height_degenerate_width_returns_minimum() {
        let handles = ImageHandles::default();
        let message = Message::from_chat(&text_message("Hello"), &props(&handles));
        assert_eq!(message.height(HORIZONTAL_OVERHEAD), 1);
    }

    #[test]
    fn result_card_includes_chart_height() {
        let handles = ImageHandles::default();
        let reply = canned_reply(AnalysisMode::DcBiasSaturation);
        let AnalysisResult::GraphInterpretation(result) = reply.result else {
            panic!("expected graph result");
        };
        let message = Message::from_chat(
            &ChatMessage::new(MessageBody::GraphResult { result }),
            &props(&handles),
        );
        assert!(message.height(100) > CHART_HEIGHT + VERTICAL_OVERHEAD);
    }

    #[test]
    fn actions_only_when_requested() {
        let handles = ImageHandles::default();
        let reply = canned_reply(AnalysisMode::IdentifyDut);
        let AnalysisResult::ComponentIdentification(result) = reply.result else {
            panic!("expected dut result");
        };
        let chat = ChatMessage::new(MessageBody::DutResult { result });
        let plain = Message::from_chat(&chat, &props(&handles));
        let mut with = props(&handles);
        with.show_actions = true;
        let actions = Message::from_chat(&chat, &with);

        assert!(!render_to_string(&plain, 100).contains("Ctrl+G"));
        assert!(render_to_string(&actions, 100).contains("Ctrl+G Copy JSON"));
    }

    #[test]
    fn image_message_shows_file_name_and_badge() {
        let mut handles = ImageHandles::default();
        let url = handles.register(std::path::Path::new("/tmp/scope/l_vs_i.png"));
        let chat = ChatMessage::new(MessageBody::UserImage {
            image_url: url,
            caption: None,
            mode: AnalysisMode::DcBiasSaturation,
        });
        let text = render_to_string(&Message::from_chat(&chat, &props(&handles)), 60);
        assert!(text.contains("[DC Bias]"));
        assert!(text.contains("l_vs_i.png"));
        assert!(text.contains("User"));
    }

    #[test]
    fn failed_message_has_retry_hint() {
        let text = render_to_string(&Message::failed(Locale::En, "timed out"), 80);
        assert!(text.contains("Analysis failed: timed out"));
        assert!(text.contains("Ctrl+R to retry"));
    }

    #[test]
    fn pulse_thresholds() {
        let mut message = Message::typing(Locale::En, 0.0);
        assert!(message.border_style().add_modifier.contains(Modifier::DIM));
        message.pulse_intensity = 0.4;
        assert!(!message.border_style().add_modifier.contains(Modifier::DIM));
        message.pulse_intensity = 0.9;
        assert!(message.border_style().add_modifier.contains(Modifier::BOLD));
    }
}
