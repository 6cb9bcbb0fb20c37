//! # Domain Model
//!
//! Threads, messages, local images and analysis modes.
//!
//! ```text
//! Thread ──< Message
//!              ├── UserText        (text)
//!              ├── UserImage       (image_url, caption, mode)
//!              ├── AssistantText   (LocalizedText)
//!              ├── DutResult       (analysis::DutResult)
//!              └── GraphResult     (analysis::GraphResult)
//! ```
//!
//! Messages are immutable after creation. The only way to remove one is to
//! clear the whole thread.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::analysis::{DutResult, GraphResult};
use crate::core::locale::{Locale, LocalizedText};

pub type ThreadId = String;

/// Generate a new UUID v4 identifier.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Which canned analysis behavior a thread is tagged with.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    #[default]
    IdentifyDut,
    InterpretGraph,
    DcBiasSaturation,
}

impl AnalysisMode {
    pub const ALL: [AnalysisMode; 3] = [
        AnalysisMode::IdentifyDut,
        AnalysisMode::InterpretGraph,
        AnalysisMode::DcBiasSaturation,
    ];

    pub fn title(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (AnalysisMode::IdentifyDut, Locale::Zh) => "被測元件測量建議",
            (AnalysisMode::IdentifyDut, Locale::En) => "DUT Measurement Setup",
            (AnalysisMode::InterpretGraph, Locale::Zh) => "等效電路",
            (AnalysisMode::InterpretGraph, Locale::En) => "Equivalent Circuit",
            (AnalysisMode::DcBiasSaturation, Locale::Zh) => "DC Bias 飽和電流",
            (AnalysisMode::DcBiasSaturation, Locale::En) => "DC Bias Saturation",
        }
    }

    pub fn description(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (AnalysisMode::IdentifyDut, Locale::Zh) => {
                "辨識 R/L/C，帶出建議量測模式、頻率、電平與工作範圍。"
            }
            (AnalysisMode::IdentifyDut, Locale::En) => {
                "Identify R/L/C and suggest measurement mode, frequency, level, and working range."
            }
            (AnalysisMode::InterpretGraph, Locale::Zh) => {
                "掃頻圖辨識後，建議 2/3/4 元件模型與分析說明。"
            }
            (AnalysisMode::InterpretGraph, Locale::En) => {
                "From a sweep plot, recommend 2/3/4-element equivalent circuit models."
            }
            (AnalysisMode::DcBiasSaturation, Locale::Zh) => {
                "解析 L–I 曲線，標示電感下降 20% 的飽和電流。"
            }
            (AnalysisMode::DcBiasSaturation, Locale::En) => {
                "Read an L vs DC-bias curve and mark the current at a 20% inductance drop."
            }
        }
    }

    /// Short badge shown next to image messages and in the sidebar.
    pub fn badge(self) -> &'static str {
        match self {
            AnalysisMode::IdentifyDut => "DUT",
            AnalysisMode::InterpretGraph => "Sweep",
            AnalysisMode::DcBiasSaturation => "DC Bias",
        }
    }

    pub fn parse(value: &str) -> Option<AnalysisMode> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "identify_dut" => Some(AnalysisMode::IdentifyDut),
            "interpret_graph" => Some(AnalysisMode::InterpretGraph),
            "dc_bias_saturation" => Some(AnalysisMode::DcBiasSaturation),
            _ => None,
        }
    }
}

/// An image attached from the local filesystem.
///
/// `url` is a `local://` handle registered in the composer's handle table;
/// `path` is where the bytes live.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LocalImage {
    pub id: String,
    pub url: String,
    pub path: PathBuf,
}

impl LocalImage {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.url.clone())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Thread {
    pub id: ThreadId,
    pub title: String,
    pub mode: AnalysisMode,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_draft: bool,
    /// True until the title is replaced by a rename or by the first send.
    #[serde(skip)]
    pub placeholder_title: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageBody {
    #[serde(rename = "text")]
    UserText { text: String },
    #[serde(rename = "image")]
    UserImage {
        image_url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
        mode: AnalysisMode,
    },
    #[serde(rename = "assistant_text")]
    AssistantText { text: LocalizedText },
    DutResult { result: Box<DutResult> },
    GraphResult { result: Box<GraphResult> },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Message {
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(flatten)]
    pub body: MessageBody,
}

impl Message {
    pub fn new(body: MessageBody) -> Self {
        Self {
            id: new_id(),
            created_at: Utc::now(),
            body,
        }
    }

    pub fn role(&self) -> Role {
        match self.body {
            MessageBody::UserText { .. } | MessageBody::UserImage { .. } => Role::User,
            MessageBody::AssistantText { .. }
            | MessageBody::DutResult { .. }
            | MessageBody::GraphResult { .. } => Role::Assistant,
        }
    }

    pub fn is_result(&self) -> bool {
        matches!(
            self.body,
            MessageBody::DutResult { .. } | MessageBody::GraphResult { .. }
        )
    }
}
